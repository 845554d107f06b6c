//! Resource, escrow, goal and market predicates

use tracing::debug;

use crate::conditions::{compare, ChangeSignal, Condition, Latch, RuleContext};
use crate::core::types::{Commodity, GoalId, ObjectTypeId, PlayerId, RelOp, ResourceType, TradeDirection};
use crate::game::{Cost, GameState};
use crate::signal::{EventKind, GameEvent, Listener, Subscription};

/// Live resource amount compared to a target
///
/// Debounced: emits only when the comparison result flips.
#[derive(Debug)]
pub struct ResourceValue {
    resource: ResourceType,
    op: RelOp,
    target: i32,
    player: PlayerId,
    value: i32,
    latch: Latch,
    _subscription: Subscription,
}

impl ResourceValue {
    pub fn new(
        resource: ResourceType,
        op: RelOp,
        target: i32,
        player: PlayerId,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let value = state.resource(player, resource);
        Self {
            resource,
            op,
            target,
            player,
            value,
            latch: Latch::new(compare(value, op, target)),
            _subscription: listener.connect(EventKind::ResourceChanged),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Condition for ResourceValue {
    fn satisfied(&self, ctx: &RuleContext) -> bool {
        // The owner's age is read through the rule context
        let value = if self.resource == ResourceType::CurrentAge && self.player == ctx.player {
            ctx.current_age().ordinal()
        } else {
            self.value
        };
        compare(value, self.op, self.target)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let GameEvent::ResourceChanged { player, resource, value } = *event else {
            return ChangeSignal::Quiet;
        };
        if player != self.player || resource != self.resource {
            return ChangeSignal::Quiet;
        }

        self.value = value;
        let signal = self.latch.update(compare(value, self.op, self.target));
        if signal.is_changed() {
            debug!(
                "{:?} {} {} {} now {}",
                self.resource,
                self.op,
                self.target,
                self.player,
                self.latch.get()
            );
        }
        signal
    }
}

/// Which difference a headroom predicate watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadroomKind {
    /// Population cap minus housing capacity
    Population,
    /// Housing capacity minus population
    Housing,
}

impl HeadroomKind {
    /// (minuend, subtrahend)
    fn resources(&self) -> (ResourceType, ResourceType) {
        match self {
            HeadroomKind::Population => (ResourceType::PopulationCap, ResourceType::HousingCapacity),
            HeadroomKind::Housing => (ResourceType::HousingCapacity, ResourceType::Population),
        }
    }
}

/// Difference of two live resources compared to a target
#[derive(Debug)]
pub struct PopulationHeadroom {
    kind: HeadroomKind,
    op: RelOp,
    target: i32,
    player: PlayerId,
    upper: i32,
    lower: i32,
    latch: Latch,
    _subscription: Subscription,
}

impl PopulationHeadroom {
    pub fn new(
        kind: HeadroomKind,
        op: RelOp,
        target: i32,
        player: PlayerId,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let (upper, lower) = kind.resources();
        let mut headroom = Self {
            kind,
            op,
            target,
            player,
            upper: state.resource(player, upper),
            lower: state.resource(player, lower),
            latch: Latch::new(false),
            _subscription: listener.connect(EventKind::ResourceChanged),
        };
        headroom.latch = Latch::new(headroom.evaluate());
        headroom
    }

    pub fn headroom(&self) -> i32 {
        self.upper - self.lower
    }

    fn evaluate(&self) -> bool {
        compare(self.headroom(), self.op, self.target)
    }
}

impl Condition for PopulationHeadroom {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.evaluate()
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let GameEvent::ResourceChanged { player, resource, value } = *event else {
            return ChangeSignal::Quiet;
        };
        if player != self.player {
            return ChangeSignal::Quiet;
        }

        let (upper, lower) = self.kind.resources();
        if resource == upper {
            self.upper = value;
        } else if resource == lower {
            self.lower = value;
        } else {
            return ChangeSignal::Quiet;
        }
        self.latch.update(self.evaluate())
    }
}

/// Cached commodity stockpile and escrow of one player
#[derive(Debug, Clone, Copy, Default)]
struct Purse {
    stock: [i32; 4],
    escrow: [i32; 4],
}

impl Purse {
    fn hydrate(state: &GameState, player: PlayerId) -> Self {
        let mut purse = Self::default();
        for commodity in Commodity::ALL {
            purse.stock[commodity.index()] = state.resource(player, commodity.resource());
            purse.escrow[commodity.index()] = state.escrow(player, commodity);
        }
        purse
    }

    /// Apply a stockpile or escrow event; returns whether it was relevant
    fn apply(&mut self, owner: PlayerId, event: &GameEvent) -> bool {
        match *event {
            GameEvent::ResourceChanged { player, resource, value } if player == owner => {
                match resource.commodity() {
                    Some(commodity) => {
                        self.stock[commodity.index()] = value;
                        true
                    }
                    None => false,
                }
            }
            GameEvent::EscrowChanged { player, commodity, amount } if player == owner => {
                self.escrow[commodity.index()] = amount;
                true
            }
            _ => false,
        }
    }

    fn available(&self, commodity: Commodity, include_escrow: bool) -> i32 {
        let stock = self.stock[commodity.index()];
        if include_escrow {
            stock
        } else {
            stock - self.escrow[commodity.index()]
        }
    }

    fn can_afford(&self, cost: &Cost, include_escrow: bool) -> bool {
        cost.components()
            .all(|(commodity, amount)| self.available(commodity, include_escrow) >= amount)
    }
}

/// Whether the player can pay for at least one of a set of object types
#[derive(Debug)]
pub struct CanTrainOrBuild {
    costs: Vec<Cost>,
    player: PlayerId,
    include_escrow: bool,
    purse: Purse,
    latch: Latch,
    _subscriptions: Vec<Subscription>,
}

impl CanTrainOrBuild {
    pub fn new(
        type_ids: &[ObjectTypeId],
        player: PlayerId,
        include_escrow: bool,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let mut condition = Self {
            costs: state.catalog().costs_of(type_ids).collect(),
            player,
            include_escrow,
            purse: Purse::hydrate(state, player),
            latch: Latch::new(false),
            _subscriptions: listener.connect_all(&[EventKind::ResourceChanged, EventKind::EscrowChanged]),
        };
        condition.latch = Latch::new(condition.affordable());
        condition
    }

    fn affordable(&self) -> bool {
        self.costs
            .iter()
            .any(|cost| self.purse.can_afford(cost, self.include_escrow))
    }
}

impl Condition for CanTrainOrBuild {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.affordable()
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        if !self.purse.apply(self.player, event) {
            return ChangeSignal::Quiet;
        }
        self.latch.update(self.affordable())
    }
}

/// Script goal variable compared to a target
///
/// Emits on every update of the goal, whether or not the result changed.
#[derive(Debug)]
pub struct Goal {
    goal: GoalId,
    op: RelOp,
    target: i32,
    player: PlayerId,
    value: i32,
    _subscription: Subscription,
}

impl Goal {
    pub fn new(goal: GoalId, op: RelOp, target: i32, player: PlayerId, state: &GameState, listener: &Listener) -> Self {
        Self {
            goal,
            op,
            target,
            player,
            value: state.goal(player, goal),
            _subscription: listener.connect(EventKind::GoalChanged),
        }
    }
}

impl Condition for Goal {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        compare(self.value, self.op, self.target)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        match *event {
            GameEvent::GoalChanged { player, goal, value } if player == self.player && goal == self.goal => {
                self.value = value;
                ChangeSignal::Changed
            }
            _ => ChangeSignal::Quiet,
        }
    }
}

/// Escrowed amount of a commodity compared to a target
///
/// Emits on every escrow update, whether or not the result changed.
#[derive(Debug)]
pub struct EscrowAmount {
    commodity: Commodity,
    op: RelOp,
    target: i32,
    player: PlayerId,
    amount: i32,
    _subscription: Subscription,
}

impl EscrowAmount {
    pub fn new(
        commodity: Commodity,
        op: RelOp,
        target: i32,
        player: PlayerId,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        Self {
            commodity,
            op,
            target,
            player,
            amount: state.escrow(player, commodity),
            _subscription: listener.connect(EventKind::EscrowChanged),
        }
    }
}

impl Condition for EscrowAmount {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        compare(self.amount, self.op, self.target)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        match *event {
            GameEvent::EscrowChanged { player, commodity, amount }
                if player == self.player && commodity == self.commodity =>
            {
                self.amount = amount;
                ChangeSignal::Changed
            }
            _ => ChangeSignal::Quiet,
        }
    }
}

/// Market price of a commodity compared to a target
///
/// The cached result is authoritative; `satisfied` does not recompute.
#[derive(Debug)]
pub struct TradingPrice {
    commodity: Commodity,
    direction: TradeDirection,
    op: RelOp,
    target: i32,
    price: i32,
    latch: Latch,
    _subscription: Subscription,
}

impl TradingPrice {
    pub fn new(
        commodity: Commodity,
        direction: TradeDirection,
        op: RelOp,
        target: i32,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let price = state.market().price(commodity, direction).unwrap_or(0);
        Self {
            commodity,
            direction,
            op,
            target,
            price,
            latch: Latch::new(compare(price, op, target)),
            _subscription: listener.connect(EventKind::TradingPriceChanged),
        }
    }

    pub fn price(&self) -> i32 {
        self.price
    }
}

impl Condition for TradingPrice {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.latch.get()
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let GameEvent::TradingPriceChanged { commodity, buy, sell } = *event else {
            return ChangeSignal::Quiet;
        };
        if commodity != self.commodity {
            return ChangeSignal::Quiet;
        }

        self.price = match self.direction {
            TradeDirection::Buy => buy,
            TradeDirection::Sell => sell,
        };
        self.latch.update(compare(self.price, self.op, self.target))
    }
}

/// Whether one lot of a commodity can be bought or sold right now
#[derive(Debug)]
pub struct CanTrade {
    commodity: Commodity,
    direction: TradeDirection,
    player: PlayerId,
    lot: i32,
    price: Option<i32>,
    purse: Purse,
    latch: Latch,
    _subscriptions: Vec<Subscription>,
}

impl CanTrade {
    pub fn new(
        commodity: Commodity,
        direction: TradeDirection,
        player: PlayerId,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let mut condition = Self {
            commodity,
            direction,
            player,
            lot: state.trade_lot(),
            price: state.market().price(commodity, direction),
            purse: Purse::hydrate(state, player),
            latch: Latch::new(false),
            _subscriptions: listener.connect_all(&[
                EventKind::ResourceChanged,
                EventKind::EscrowChanged,
                EventKind::TradingPriceChanged,
            ]),
        };
        condition.latch = Latch::new(condition.viable());
        condition
    }

    fn viable(&self) -> bool {
        let Some(price) = self.price else {
            return false;
        };
        match self.direction {
            TradeDirection::Buy => self.purse.available(Commodity::Gold, false) >= price,
            TradeDirection::Sell => self.purse.available(self.commodity, false) >= self.lot,
        }
    }
}

impl Condition for CanTrade {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.viable()
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let relevant = match *event {
            GameEvent::TradingPriceChanged { commodity, buy, sell } if commodity == self.commodity => {
                self.price = Some(match self.direction {
                    TradeDirection::Buy => buy,
                    TradeDirection::Sell => sell,
                });
                true
            }
            _ => self.purse.apply(self.player, event),
        };
        if !relevant {
            return ChangeSignal::Quiet;
        }
        self.latch.update(self.viable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::test_support::{listener, state, ENEMY, ME};
    use crate::core::types::{Age, ResearchId};

    fn food(value: i32) -> GameEvent {
        GameEvent::ResourceChanged { player: ME, resource: ResourceType::Food, value }
    }

    #[test]
    fn test_resource_value_debounces() {
        let state = state();
        let (_hub, listener) = listener();
        let mut condition =
            ResourceValue::new(ResourceType::Food, RelOp::GreaterOrEqual, 100, ME, &state, &listener);

        let emissions = [50, 99, 100, 150, 100]
            .into_iter()
            .filter(|value| condition.notify(&food(*value)).is_changed())
            .count();

        assert_eq!(emissions, 1);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
        assert_eq!(condition.value(), 100);
    }

    #[test]
    fn test_resource_value_ignores_other_players_and_resources() {
        let state = state();
        let (_hub, listener) = listener();
        let mut condition = ResourceValue::new(ResourceType::Food, RelOp::GreaterThan, 0, ME, &state, &listener);

        let other_player = GameEvent::ResourceChanged { player: ENEMY, resource: ResourceType::Food, value: 9 };
        let other_resource = GameEvent::ResourceChanged { player: ME, resource: ResourceType::Wood, value: 9 };
        assert_eq!(condition.notify(&other_player), ChangeSignal::Quiet);
        assert_eq!(condition.notify(&other_resource), ChangeSignal::Quiet);
        assert_eq!(condition.value(), 0);
    }

    #[test]
    fn test_resource_value_hydrates_and_releases() {
        let mut state = state();
        state.add_commodity(ME, Commodity::Gold, 300).unwrap();
        let (hub, listener) = listener();

        let condition = ResourceValue::new(ResourceType::Gold, RelOp::Equal, 300, ME, &state, &listener);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
        assert_eq!(hub.subscription_count(), 1);

        drop(condition);
        assert_eq!(hub.subscription_count(), 0);
    }

    #[test]
    fn test_owner_age_comes_from_context() {
        let mut state = state();
        let (_hub, listener) = listener();
        let condition = ResourceValue::new(
            ResourceType::CurrentAge,
            RelOp::GreaterOrEqual,
            Age::Feudal.ordinal(),
            ME,
            &state,
            &listener,
        );
        assert!(!condition.satisfied(&RuleContext::new(ME, &state)));

        // No event delivered, the context still sees the new age
        state.complete_research(ME, ResearchId(101)).unwrap();
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_out_of_range_age_agrees_with_context() {
        let mut state = state();
        let (_hub, listener) = listener();
        let mut condition = ResourceValue::new(
            ResourceType::CurrentAge,
            RelOp::Equal,
            Age::Imperial.ordinal(),
            ME,
            &state,
            &listener,
        );

        let events = state.set_resource(ME, ResourceType::CurrentAge, 7).unwrap();
        let changed = events.iter().filter(|event| condition.notify(event).is_changed()).count();
        assert_eq!(changed, 1);
        assert_eq!(condition.value(), Age::Imperial.ordinal());
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_housing_headroom() {
        let mut state = state();
        let (_hub, listener) = listener();
        let mut condition =
            PopulationHeadroom::new(HeadroomKind::Housing, RelOp::GreaterThan, 0, ME, &state, &listener);
        assert_eq!(condition.headroom(), 0);

        let (_, events) = state.spawn_object(ME, ObjectTypeId(70));
        let signals: Vec<_> = events.iter().map(|e| condition.notify(e)).collect();
        assert!(signals.contains(&ChangeSignal::Changed));
        assert_eq!(condition.headroom(), 5);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_population_headroom_starts_at_cap() {
        let state = state();
        let (_hub, listener) = listener();
        let condition =
            PopulationHeadroom::new(HeadroomKind::Population, RelOp::Equal, 200, ME, &state, &listener);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_can_train_respects_escrow() {
        let mut state = state();
        let (_hub, listener) = listener();
        let villager = [ObjectTypeId(83)];
        let mut without = CanTrainOrBuild::new(&villager, ME, false, &state, &listener);
        let mut with = CanTrainOrBuild::new(&villager, ME, true, &state, &listener);

        state.set_escrow_percentage(ME, Commodity::Food, 50).unwrap();
        for event in state.add_commodity(ME, Commodity::Food, 80).unwrap() {
            without.notify(&event);
            with.notify(&event);
        }

        let ctx = RuleContext::new(ME, &state);
        assert!(!without.satisfied(&ctx));
        assert!(with.satisfied(&ctx));
    }

    #[test]
    fn test_can_train_unknown_type_is_false() {
        let mut state = state();
        state.add_commodity(ME, Commodity::Food, 1000).unwrap();
        let (_hub, listener) = listener();
        let condition = CanTrainOrBuild::new(&[ObjectTypeId(9999)], ME, true, &state, &listener);
        assert!(!condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_goal_emits_on_every_update() {
        let mut state = state();
        let (_hub, listener) = listener();
        let mut condition = Goal::new(GoalId(1), RelOp::Equal, 5, ME, &state, &listener);

        let mut emissions = 0;
        for value in [3, 3, 5, 5] {
            for event in state.set_goal(ME, GoalId(1), value).unwrap() {
                if condition.notify(&event).is_changed() {
                    emissions += 1;
                }
            }
        }

        assert_eq!(emissions, 4);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));

        let other_goal = GameEvent::GoalChanged { player: ME, goal: GoalId(2), value: 5 };
        assert_eq!(condition.notify(&other_goal), ChangeSignal::Quiet);
    }

    #[test]
    fn test_escrow_emits_on_every_update() {
        let state = state();
        let (_hub, listener) = listener();
        let mut condition = EscrowAmount::new(Commodity::Gold, RelOp::LessThan, 100, ME, &state, &listener);

        let emissions = [10, 20, 30]
            .into_iter()
            .map(|amount| GameEvent::EscrowChanged { player: ME, commodity: Commodity::Gold, amount })
            .filter(|event| condition.notify(event).is_changed())
            .count();

        assert_eq!(emissions, 3);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_trading_price_returns_cached_result() {
        let mut state = state();
        let (_hub, listener) = listener();
        let mut condition =
            TradingPrice::new(Commodity::Stone, TradeDirection::Buy, RelOp::GreaterThan, 131, &state, &listener);
        assert_eq!(condition.price(), 130);

        // The market moves but nothing is delivered: the cache still answers
        state.set_market_price(Commodity::Stone, 200);
        assert!(!condition.satisfied(&RuleContext::new(ME, &state)));

        let events = state.set_market_price(Commodity::Stone, 103);
        assert_eq!(condition.notify(&events[0]), ChangeSignal::Changed);
        assert_eq!(condition.price(), 133);
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_can_trade_tracks_gold_and_price() {
        let mut state = state();
        let (_hub, listener) = listener();
        let mut buy = CanTrade::new(Commodity::Wood, TradeDirection::Buy, ME, &state, &listener);
        let mut sell = CanTrade::new(Commodity::Wood, TradeDirection::Sell, ME, &state, &listener);
        let gold = CanTrade::new(Commodity::Gold, TradeDirection::Buy, ME, &state, &listener);

        for event in state.add_commodity(ME, Commodity::Gold, 130).unwrap() {
            assert_eq!(buy.notify(&event), ChangeSignal::Changed);
            assert_eq!(sell.notify(&event), ChangeSignal::Quiet);
        }
        let ctx = RuleContext::new(ME, &state);
        assert!(buy.satisfied(&ctx));
        assert!(!sell.satisfied(&ctx));
        assert!(!gold.satisfied(&ctx));

        for event in state.set_market_price(Commodity::Wood, 150) {
            assert_eq!(buy.notify(&event), ChangeSignal::Changed);
        }
        assert!(!buy.satisfied(&RuleContext::new(ME, &state)));
    }
}
