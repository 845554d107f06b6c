//! Resolved script actions
//!
//! The resolver turns an [`ActionType`] plus typed arguments into a
//! [`ScriptAction`]. Script bookkeeping actions are carried out by the AI
//! player itself; everything else is handed to an executor.

pub mod catalog;

pub use catalog::{ActionCategory, ActionType};

use serde::{Deserialize, Serialize};

use crate::core::types::{Commodity, GoalId, ResearchId, TradeDirection};
use crate::script::{
    Building, DifficultyParameter, DiplomaticStance, PlayerNumber, StrategicNumber, Unit, WallType,
};

/// Audience of a chat action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatTarget {
    All,
    OwnerOnly,
    Player(PlayerNumber),
}

/// A fully resolved action, ready to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptAction {
    DoNothing,
    Resign,
    AttackNow,
    DisableSelf,
    Chat { target: ChatTarget, text: String },
    Train(Unit),
    Build(Building),
    BuildWall { perimeter: i32, wall: WallType },
    Research(ResearchId),
    Trade { commodity: Commodity, direction: TradeDirection },
    ReleaseEscrow(Commodity),
    SetGoal { goal: GoalId, value: i32 },
    SetEscrowPercentage { commodity: Commodity, percent: i32 },
    SetStrategicNumber { number: StrategicNumber, value: i32 },
    Tribute { to: PlayerNumber, commodity: Commodity, amount: i32 },
    SetStance { player: PlayerNumber, stance: DiplomaticStance },
    SetDifficultyParameter { parameter: DifficultyParameter, value: i32 },
}

impl ScriptAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            ScriptAction::DoNothing => ActionType::DoNothing,
            ScriptAction::Resign => ActionType::Resign,
            ScriptAction::AttackNow => ActionType::AttackNow,
            ScriptAction::DisableSelf => ActionType::DisableSelf,
            ScriptAction::Chat { target, .. } => match target {
                ChatTarget::All => ActionType::ChatToAll,
                ChatTarget::OwnerOnly => ActionType::ChatLocalToSelf,
                ChatTarget::Player(_) => ActionType::ChatToPlayer,
            },
            ScriptAction::Train(_) => ActionType::Train,
            ScriptAction::Build(_) => ActionType::Build,
            ScriptAction::BuildWall { .. } => ActionType::BuildWall,
            ScriptAction::Research(_) => ActionType::Research,
            ScriptAction::Trade { direction, .. } => match direction {
                TradeDirection::Buy => ActionType::BuyCommodity,
                TradeDirection::Sell => ActionType::SellCommodity,
            },
            ScriptAction::ReleaseEscrow(_) => ActionType::ReleaseEscrow,
            ScriptAction::SetGoal { .. } => ActionType::SetGoal,
            ScriptAction::SetEscrowPercentage { .. } => ActionType::SetEscrowPercentage,
            ScriptAction::SetStrategicNumber { .. } => ActionType::SetStrategicNumber,
            ScriptAction::Tribute { .. } => ActionType::TributeToPlayer,
            ScriptAction::SetStance { .. } => ActionType::SetStance,
            ScriptAction::SetDifficultyParameter { .. } => ActionType::SetDifficultyParameter,
        }
    }

    /// Handled by the AI player rather than the game
    pub fn is_script_internal(&self) -> bool {
        self.action_type().category() == ActionCategory::Script
    }
}
