//! Ledger - per-player resource stockpile, escrow, research and goals

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{Age, Commodity, GoalId, ResearchId, ResourceType};
use crate::game::catalog::Cost;

/// Everything the rule engine reads about one player's economy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    resources: AHashMap<ResourceType, i32>,
    /// Reserved part of each commodity stockpile (included in `resources`)
    escrow: AHashMap<Commodity, i32>,
    escrow_percent: AHashMap<Commodity, i32>,
    researched: AHashSet<ResearchId>,
    goals: AHashMap<GoalId, i32>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current amount of a resource
    pub fn get(&self, resource: ResourceType) -> i32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// Set a resource, returns true if the value changed
    pub fn set(&mut self, resource: ResourceType, value: i32) -> bool {
        let entry = self.resources.entry(resource).or_insert(0);
        let changed = *entry != value;
        *entry = value;
        changed
    }

    pub fn escrow(&self, commodity: Commodity) -> i32 {
        self.escrow.get(&commodity).copied().unwrap_or(0)
    }

    /// Set the escrowed amount, clamped to the stockpile; returns true if it changed
    pub fn set_escrow(&mut self, commodity: Commodity, amount: i32) -> bool {
        let amount = amount.clamp(0, self.get(commodity.resource()).max(0));
        let entry = self.escrow.entry(commodity).or_insert(0);
        let changed = *entry != amount;
        *entry = amount;
        changed
    }

    pub fn escrow_percent(&self, commodity: Commodity) -> i32 {
        self.escrow_percent.get(&commodity).copied().unwrap_or(0)
    }

    pub fn set_escrow_percent(&mut self, commodity: Commodity, percent: i32) {
        self.escrow_percent.insert(commodity, percent.clamp(0, 100));
    }

    /// Amount of a commodity that may be spent
    ///
    /// Without escrow only the unreserved part counts.
    pub fn available(&self, commodity: Commodity, include_escrow: bool) -> i32 {
        let stock = self.get(commodity.resource());
        if include_escrow {
            stock
        } else {
            stock - self.escrow(commodity)
        }
    }

    /// Check if the ledger can pay a cost
    pub fn can_afford(&self, cost: &Cost, include_escrow: bool) -> bool {
        cost.components()
            .all(|(commodity, amount)| self.available(commodity, include_escrow) >= amount)
    }

    pub fn has_researched(&self, research: ResearchId) -> bool {
        self.researched.contains(&research)
    }

    /// Record a research, returns true if it was new
    pub fn mark_researched(&mut self, research: ResearchId) -> bool {
        self.researched.insert(research)
    }

    pub fn goal(&self, goal: GoalId) -> i32 {
        self.goals.get(&goal).copied().unwrap_or(0)
    }

    pub fn set_goal(&mut self, goal: GoalId, value: i32) {
        self.goals.insert(goal, value);
    }

    pub fn current_age(&self) -> Age {
        Age::from_ordinal(self.get(ResourceType::CurrentAge)).unwrap_or(Age::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut ledger = Ledger::new();
        assert!(ledger.set(ResourceType::Food, 200));
        assert!(!ledger.set(ResourceType::Food, 200));
        assert_eq!(ledger.get(ResourceType::Food), 200);
        assert_eq!(ledger.get(ResourceType::Gold), 0);
    }

    #[test]
    fn test_available_excludes_escrow() {
        let mut ledger = Ledger::new();
        ledger.set(ResourceType::Wood, 300);
        ledger.set_escrow(Commodity::Wood, 120);

        assert_eq!(ledger.available(Commodity::Wood, false), 180);
        assert_eq!(ledger.available(Commodity::Wood, true), 300);
    }

    #[test]
    fn test_escrow_clamped_to_stockpile() {
        let mut ledger = Ledger::new();
        ledger.set(ResourceType::Gold, 40);
        ledger.set_escrow(Commodity::Gold, 100);
        assert_eq!(ledger.escrow(Commodity::Gold), 40);
    }

    #[test]
    fn test_can_afford_with_and_without_escrow() {
        let mut ledger = Ledger::new();
        ledger.set(ResourceType::Food, 60);
        ledger.set(ResourceType::Gold, 20);
        ledger.set_escrow(Commodity::Food, 10);

        let militia = Cost::new(60, 0, 0, 20);
        assert!(!ledger.can_afford(&militia, false));
        assert!(ledger.can_afford(&militia, true));
    }

    #[test]
    fn test_age_defaults_to_dark() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.current_age(), Age::Dark);
        ledger.set(ResourceType::CurrentAge, Age::Castle.ordinal());
        assert_eq!(ledger.current_age(), Age::Castle);
    }
}
