//! Market - commodity prices shared by all players

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{Commodity, TradeDirection};
use crate::signal::GameEvent;

/// Base prices of the tradable commodities and the pricing rules around them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    base: AHashMap<Commodity, i32>,
    fee_percent: i32,
    price_step: i32,
    min_price: i32,
    max_price: i32,
}

impl Market {
    pub fn new(config: &EngineConfig) -> Self {
        let base = Commodity::ALL
            .into_iter()
            .filter(Commodity::is_tradable)
            .map(|c| (c, config.initial_commodity_price))
            .collect();

        Self {
            base,
            fee_percent: config.market_fee_percent,
            price_step: config.price_step,
            min_price: config.min_price,
            max_price: config.max_price,
        }
    }

    pub fn base_price(&self, commodity: Commodity) -> Option<i32> {
        self.base.get(&commodity).copied()
    }

    /// Gold paid for one lot; None for gold itself
    pub fn buy_price(&self, commodity: Commodity) -> Option<i32> {
        self.base_price(commodity)
            .map(|base| base * (100 + self.fee_percent) / 100)
    }

    /// Gold received for one lot; None for gold itself
    pub fn sell_price(&self, commodity: Commodity) -> Option<i32> {
        self.base_price(commodity)
            .map(|base| base * (100 - self.fee_percent) / 100)
    }

    pub fn price(&self, commodity: Commodity, direction: TradeDirection) -> Option<i32> {
        match direction {
            TradeDirection::Buy => self.buy_price(commodity),
            TradeDirection::Sell => self.sell_price(commodity),
        }
    }

    /// Set a base price directly, returns the price event if anything changed
    pub fn set_base_price(&mut self, commodity: Commodity, price: i32) -> Option<GameEvent> {
        let price = price.clamp(self.min_price, self.max_price);
        let entry = self.base.get_mut(&commodity)?;
        if *entry == price {
            return None;
        }
        *entry = price;
        self.price_event(commodity)
    }

    /// Move the base price after a completed trade
    pub fn record_trade(&mut self, commodity: Commodity, direction: TradeDirection) -> Option<GameEvent> {
        let base = self.base_price(commodity)?;
        let next = match direction {
            TradeDirection::Buy => base + self.price_step,
            TradeDirection::Sell => base - self.price_step,
        };
        self.set_base_price(commodity, next)
    }

    fn price_event(&self, commodity: Commodity) -> Option<GameEvent> {
        Some(GameEvent::TradingPriceChanged {
            commodity,
            buy: self.buy_price(commodity)?,
            sell: self.sell_price(commodity)?,
        })
    }
}
