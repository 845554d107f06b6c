//! Reactive predicates over live game state
//!
//! A rule's condition is a tree of [`Condition`]s. Leaves observe one piece of
//! state: they hydrate from [`GameState`] when built, keep the subscriptions
//! they registered, and update their cached values from delivered events.
//! [`Condition::notify`] is the change channel: a leaf returns
//! [`ChangeSignal::Changed`] when its owning rule should be re-evaluated, and
//! combinators pass that signal upward.
//!
//! Emission policies differ per leaf:
//! - debounced through a [`Latch`]: only an actual flip of the result emits
//! - unconditional: goal and escrow leaves emit on every matching event
//! - monotonic: tech leaves emit once, when the research completes

pub mod economy;
pub mod logic;
pub mod military;
pub mod research;

pub use economy::{
    CanTrade, CanTrainOrBuild, EscrowAmount, Goal, HeadroomKind, PopulationHeadroom,
    ResourceValue, TradingPrice,
};
pub use logic::{and, not, operand_or_default, or, And, Compare, Constant, Not, Or};
pub use military::{CombatCategory, CombatUnitsCount, UnitTypeCount};
pub use research::TechAvailable;

use std::fmt;

use crate::core::types::{Age, PlayerId, RelOp};
use crate::game::GameState;
use crate::signal::GameEvent;

/// Compare two integers under a relational operator
pub fn compare(value: i32, op: RelOp, target: i32) -> bool {
    match op {
        RelOp::Equal => value == target,
        RelOp::NotEqual => value != target,
        RelOp::LessThan => value < target,
        RelOp::LessOrEqual => value <= target,
        RelOp::GreaterThan => value > target,
        RelOp::GreaterOrEqual => value >= target,
    }
}

/// Result of delivering an event to a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSignal {
    Quiet,
    Changed,
}

impl ChangeSignal {
    pub fn is_changed(self) -> bool {
        self == ChangeSignal::Changed
    }

    /// Changed if either side changed
    pub fn merge(self, other: ChangeSignal) -> ChangeSignal {
        if self.is_changed() || other.is_changed() {
            ChangeSignal::Changed
        } else {
            ChangeSignal::Quiet
        }
    }
}

/// Read-only view handed to `satisfied`
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub player: PlayerId,
    pub state: &'a GameState,
}

impl<'a> RuleContext<'a> {
    pub fn new(player: PlayerId, state: &'a GameState) -> Self {
        Self { player, state }
    }

    /// Age of the player owning the rule
    pub fn current_age(&self) -> Age {
        self.state.current_age(self.player)
    }
}

/// A node of a rule's condition tree
pub trait Condition: fmt::Debug {
    /// Whether the condition holds; never mutates anything
    fn satisfied(&self, ctx: &RuleContext) -> bool;

    /// Deliver a game event and report whether the owner should re-evaluate
    fn notify(&mut self, event: &GameEvent) -> ChangeSignal;
}

/// Cached boolean that signals only when it flips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    value: bool,
}

impl Latch {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn get(&self) -> bool {
        self.value
    }

    pub fn update(&mut self, value: bool) -> ChangeSignal {
        if value == self.value {
            return ChangeSignal::Quiet;
        }
        self.value = value;
        ChangeSignal::Changed
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for condition tests

    use crate::core::config::EngineConfig;
    use crate::core::types::{PlayerId, RuleId};
    use crate::game::GameState;
    use crate::signal::{Listener, SignalHub};

    pub const ME: PlayerId = PlayerId(1);
    pub const ENEMY: PlayerId = PlayerId(2);

    pub fn state() -> GameState {
        let mut state = GameState::new(&EngineConfig::default());
        state.add_player(ME);
        state.add_player(ENEMY);
        state
    }

    pub fn listener() -> (SignalHub, Listener) {
        let hub = SignalHub::new();
        let listener = hub.listener(RuleId(1));
        (hub, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_all_operators() {
        assert!(compare(5, RelOp::Equal, 5));
        assert!(!compare(5, RelOp::NotEqual, 5));
        assert!(compare(4, RelOp::LessThan, 5));
        assert!(compare(5, RelOp::LessOrEqual, 5));
        assert!(!compare(5, RelOp::GreaterThan, 5));
        assert!(compare(5, RelOp::GreaterOrEqual, 5));
        assert!(!compare(4, RelOp::GreaterOrEqual, 5));
    }

    #[test]
    fn test_latch_signals_only_flips() {
        let mut latch = Latch::new(false);
        assert_eq!(latch.update(false), ChangeSignal::Quiet);
        assert_eq!(latch.update(true), ChangeSignal::Changed);
        assert_eq!(latch.update(true), ChangeSignal::Quiet);
        assert!(latch.get());
    }

    #[test]
    fn test_merge() {
        assert_eq!(ChangeSignal::Quiet.merge(ChangeSignal::Quiet), ChangeSignal::Quiet);
        assert_eq!(ChangeSignal::Quiet.merge(ChangeSignal::Changed), ChangeSignal::Changed);
        assert_eq!(ChangeSignal::Changed.merge(ChangeSignal::Quiet), ChangeSignal::Changed);
    }
}
