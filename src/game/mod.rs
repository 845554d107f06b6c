//! Live game state read by the rule engine
//!
//! These are the state collaborators the predicates observe: per-player
//! ledgers, the object registry and the market. Every mutation returns the
//! [`GameEvent`]s it caused so the caller can deliver them to rule sets
//! before doing anything else.

pub mod catalog;
pub mod ledger;
pub mod market;
pub mod objects;

pub use catalog::{Cost, ObjectCatalog, ObjectSpec, ResearchSpec};
pub use ledger::Ledger;
pub use market::Market;
pub use objects::ObjectRegistry;

use std::collections::BTreeMap;

use crate::core::config::EngineConfig;
use crate::core::error::{AiError, Result};
use crate::core::types::{
    Age, Commodity, GoalId, ObjectId, ObjectTypeId, PlayerId, ResearchId, ResourceType,
    TradeDirection, UnitGroup,
};
use crate::signal::{GameEvent, ObjectInfo};

/// The complete observable state of a match
#[derive(Debug, Clone)]
pub struct GameState {
    catalog: ObjectCatalog,
    ledgers: BTreeMap<PlayerId, Ledger>,
    objects: ObjectRegistry,
    market: Market,
    trade_lot: i32,
    population_cap: i32,
}

impl GameState {
    /// Empty match using the standard catalog
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_catalog(config, ObjectCatalog::standard())
    }

    pub fn with_catalog(config: &EngineConfig, catalog: ObjectCatalog) -> Self {
        Self {
            catalog,
            ledgers: BTreeMap::new(),
            objects: ObjectRegistry::new(),
            market: Market::new(config),
            trade_lot: config.trade_lot,
            population_cap: config.default_population_cap,
        }
    }

    /// Register a player with an empty ledger at the default population cap
    pub fn add_player(&mut self, player: PlayerId) -> Vec<GameEvent> {
        self.ledgers.entry(player).or_default();
        let mut events = Vec::new();
        self.write_resource(player, ResourceType::PopulationCap, self.population_cap, &mut events);
        events
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.ledgers.keys().copied()
    }

    pub fn catalog(&self) -> &ObjectCatalog {
        &self.catalog
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn trade_lot(&self) -> i32 {
        self.trade_lot
    }

    pub fn ledger(&self, player: PlayerId) -> Option<&Ledger> {
        self.ledgers.get(&player)
    }

    fn ledger_mut(&mut self, player: PlayerId) -> Result<&mut Ledger> {
        self.ledgers
            .get_mut(&player)
            .ok_or(AiError::UnknownPlayer(player))
    }

    // === QUERIES ===

    /// Resource amount; unknown players read as zero
    pub fn resource(&self, player: PlayerId, resource: ResourceType) -> i32 {
        self.ledger(player).map_or(0, |l| l.get(resource))
    }

    pub fn escrow(&self, player: PlayerId, commodity: Commodity) -> i32 {
        self.ledger(player).map_or(0, |l| l.escrow(commodity))
    }

    pub fn goal(&self, player: PlayerId, goal: GoalId) -> i32 {
        self.ledger(player).map_or(0, |l| l.goal(goal))
    }

    pub fn has_researched(&self, player: PlayerId, research: ResearchId) -> bool {
        self.ledger(player).is_some_and(|l| l.has_researched(research))
    }

    pub fn current_age(&self, player: PlayerId) -> Age {
        self.ledger(player).map_or(Age::Dark, Ledger::current_age)
    }

    // === ECONOMY ===

    /// Overwrite a resource value
    pub fn set_resource(&mut self, player: PlayerId, resource: ResourceType, value: i32) -> Result<Vec<GameEvent>> {
        self.ledger_mut(player)?;
        let mut events = Vec::new();
        self.write_resource(player, resource, value, &mut events);
        Ok(events)
    }

    /// Add gathered or received resources, diverting the escrow percentage
    pub fn add_commodity(&mut self, player: PlayerId, commodity: Commodity, amount: i32) -> Result<Vec<GameEvent>> {
        let ledger = self.ledger_mut(player)?;
        let stock = ledger.get(commodity.resource());
        let diverted = if amount > 0 {
            let share = i64::from(amount) * i64::from(ledger.escrow_percent(commodity)) / 100;
            i32::try_from(share).unwrap_or(i32::MAX)
        } else {
            0
        };

        let mut events = Vec::new();
        self.write_resource(player, commodity.resource(), stock.saturating_add(amount), &mut events);
        if diverted > 0 {
            let escrow = self.escrow(player, commodity);
            self.write_escrow(player, commodity, escrow.saturating_add(diverted), &mut events);
        }
        Ok(events)
    }

    /// Pay a cost, taking unreserved resources first
    ///
    /// Returns `Ok(None)` when the player cannot afford it.
    pub fn spend(&mut self, player: PlayerId, cost: &Cost, include_escrow: bool) -> Result<Option<Vec<GameEvent>>> {
        let ledger = self.ledger_mut(player)?;
        if !ledger.can_afford(cost, include_escrow) {
            return Ok(None);
        }

        let mut events = Vec::new();
        for (commodity, amount) in cost.components() {
            let stock = self.resource(player, commodity.resource());
            let escrow = self.escrow(player, commodity);
            let from_escrow = (amount - (stock - escrow)).max(0);
            self.write_resource(player, commodity.resource(), stock - amount, &mut events);
            if from_escrow > 0 {
                self.write_escrow(player, commodity, escrow - from_escrow, &mut events);
            }
        }
        Ok(Some(events))
    }

    pub fn set_escrow_percentage(&mut self, player: PlayerId, commodity: Commodity, percent: i32) -> Result<()> {
        self.ledger_mut(player)?.set_escrow_percent(commodity, percent);
        Ok(())
    }

    /// Return escrowed resources to the general stockpile
    pub fn release_escrow(&mut self, player: PlayerId, commodity: Commodity) -> Result<Vec<GameEvent>> {
        self.ledger_mut(player)?;
        let mut events = Vec::new();
        self.write_escrow(player, commodity, 0, &mut events);
        Ok(events)
    }

    /// Give resources to another player
    pub fn tribute(&mut self, from: PlayerId, to: PlayerId, commodity: Commodity, amount: i32) -> Result<Option<Vec<GameEvent>>> {
        self.ledger_mut(to)?;
        let available = self.ledger_mut(from)?.available(commodity, false);
        if amount <= 0 || available < amount {
            return Ok(None);
        }

        let mut events = Vec::new();
        let stock = self.resource(from, commodity.resource());
        self.write_resource(from, commodity.resource(), stock - amount, &mut events);
        events.extend(self.add_commodity(to, commodity, amount)?);
        Ok(Some(events))
    }

    /// Buy or sell one lot of a commodity at the market
    pub fn trade(&mut self, player: PlayerId, commodity: Commodity, direction: TradeDirection) -> Result<Option<Vec<GameEvent>>> {
        let lot = self.trade_lot;
        let price = self.market.price(commodity, direction);
        let ledger = self.ledger_mut(player)?;
        let Some(price) = price else {
            return Ok(None);
        };

        let (pay, pay_amount, receive, receive_amount) = match direction {
            TradeDirection::Buy => (Commodity::Gold, price, commodity, lot),
            TradeDirection::Sell => (commodity, lot, Commodity::Gold, price),
        };
        if ledger.available(pay, false) < pay_amount {
            return Ok(None);
        }

        let mut events = Vec::new();
        let paid = self.resource(player, pay.resource()) - pay_amount;
        self.write_resource(player, pay.resource(), paid, &mut events);
        let received = self.resource(player, receive.resource()) + receive_amount;
        self.write_resource(player, receive.resource(), received, &mut events);
        events.extend(self.market.record_trade(commodity, direction));
        Ok(Some(events))
    }

    pub fn set_market_price(&mut self, commodity: Commodity, base: i32) -> Vec<GameEvent> {
        self.market.set_base_price(commodity, base).into_iter().collect()
    }

    // === RESEARCH AND GOALS ===

    /// Mark a research complete; age research also advances the current age
    pub fn complete_research(&mut self, player: PlayerId, research: ResearchId) -> Result<Vec<GameEvent>> {
        let mut events = Vec::new();
        if !self.ledger_mut(player)?.mark_researched(research) {
            return Ok(events);
        }

        events.push(GameEvent::ResearchCompleted { player, research });
        if let Some(age) = Age::from_research(research) {
            if age > self.current_age(player) {
                self.write_resource(player, ResourceType::CurrentAge, age.ordinal(), &mut events);
            }
        }
        Ok(events)
    }

    /// Set a goal; always notifies, even when the value is unchanged
    pub fn set_goal(&mut self, player: PlayerId, goal: GoalId, value: i32) -> Result<Vec<GameEvent>> {
        self.ledger_mut(player)?.set_goal(goal, value);
        Ok(vec![GameEvent::GoalChanged { player, goal, value }])
    }

    // === OBJECTS ===

    /// Create an object; owner population and housing follow
    pub fn spawn_object(&mut self, owner: PlayerId, type_id: ObjectTypeId) -> (ObjectInfo, Vec<GameEvent>) {
        let info = self.objects.spawn(&self.catalog, owner, type_id);
        let mut events = vec![GameEvent::ObjectCreated(info)];
        self.apply_presence(&info, owner, 1, &mut events);
        (info, events)
    }

    /// Remove an object; the dying notification precedes removal
    pub fn kill_object(&mut self, id: ObjectId) -> Vec<GameEvent> {
        let Some(info) = self.objects.get(id).copied() else {
            return Vec::new();
        };
        let mut events = vec![GameEvent::ObjectDying(info)];
        self.objects.remove(id);
        self.apply_presence(&info, info.owner, -1, &mut events);
        events
    }

    /// Transfer ownership, as a plain change or as a capture/conversion
    pub fn change_owner(&mut self, id: ObjectId, new_owner: PlayerId, captured: bool) -> Vec<GameEvent> {
        let Some((object, old_owner)) = self.objects.set_owner(id, new_owner) else {
            return Vec::new();
        };
        if old_owner == new_owner {
            return Vec::new();
        }

        let mut events = vec![if captured {
            GameEvent::ObjectCaptured { object, old_owner }
        } else {
            GameEvent::ObjectOwnerChanged { object, old_owner }
        }];
        self.apply_presence(&object, old_owner, -1, &mut events);
        self.apply_presence(&object, new_owner, 1, &mut events);
        events
    }

    pub fn set_group(&mut self, id: ObjectId, group: UnitGroup) -> Vec<GameEvent> {
        match self.objects.set_group(id, group) {
            Some((object, old_group)) if old_group != group => {
                vec![GameEvent::ObjectGroupChanged { object, old_group }]
            }
            _ => Vec::new(),
        }
    }

    // === INTERNALS ===

    fn apply_presence(&mut self, info: &ObjectInfo, owner: PlayerId, sign: i32, events: &mut Vec<GameEvent>) {
        if !self.ledgers.contains_key(&owner) {
            return;
        }
        if info.class.takes_population() {
            let population = self.resource(owner, ResourceType::Population) + sign;
            self.write_resource(owner, ResourceType::Population, population, events);
        }
        let housing = self.catalog.object(info.type_id).map_or(0, |spec| spec.housing);
        if housing != 0 {
            let capacity = self.resource(owner, ResourceType::HousingCapacity) + sign * housing;
            self.write_resource(owner, ResourceType::HousingCapacity, capacity, events);
        }
    }

    fn write_resource(&mut self, player: PlayerId, resource: ResourceType, value: i32, events: &mut Vec<GameEvent>) {
        let Some(ledger) = self.ledgers.get_mut(&player) else {
            return;
        };
        let value = if resource == ResourceType::CurrentAge {
            value.clamp(Age::Dark.ordinal(), Age::Imperial.ordinal())
        } else {
            value
        };
        if ledger.set(resource, value) {
            events.push(GameEvent::ResourceChanged { player, resource, value });
        }

        // Escrow never exceeds the stockpile it is reserved from
        if let Some(commodity) = resource.commodity() {
            if ledger.escrow(commodity) > value {
                self.write_escrow(player, commodity, value, events);
            }
        }
    }

    fn write_escrow(&mut self, player: PlayerId, commodity: Commodity, amount: i32, events: &mut Vec<GameEvent>) {
        let Some(ledger) = self.ledgers.get_mut(&player) else {
            return;
        };
        if ledger.set_escrow(commodity, amount) {
            events.push(GameEvent::EscrowChanged {
                player,
                commodity,
                amount: ledger.escrow(commodity),
            });
        }
    }
}
