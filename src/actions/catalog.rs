//! Action verbs and their categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verb of a scripted action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    DoNothing,
    Resign,
    AttackNow,
    DisableSelf,
    DisableTimer,
    ChatToAll,
    ChatLocalToSelf,
    ChatToPlayer,
    Train,
    Build,
    BuildForward,
    BuildWall,
    Research,
    BuyCommodity,
    SellCommodity,
    ReleaseEscrow,
    SetEscrowPercentage,
    SetGoal,
    SetStrategicNumber,
    TributeToPlayer,
    SetStance,
    SetDifficultyParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    /// Bookkeeping inside the AI player itself
    Script,
    Production,
    Market,
    Military,
    Diplomacy,
    Chat,
}

impl ActionType {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionType::DoNothing
            | ActionType::DisableSelf
            | ActionType::DisableTimer
            | ActionType::SetGoal
            | ActionType::SetStrategicNumber
            | ActionType::SetEscrowPercentage
            | ActionType::ReleaseEscrow
            | ActionType::SetDifficultyParameter => ActionCategory::Script,
            ActionType::Train
            | ActionType::Build
            | ActionType::BuildForward
            | ActionType::BuildWall
            | ActionType::Research => ActionCategory::Production,
            ActionType::BuyCommodity | ActionType::SellCommodity => ActionCategory::Market,
            ActionType::AttackNow => ActionCategory::Military,
            ActionType::Resign | ActionType::TributeToPlayer | ActionType::SetStance => {
                ActionCategory::Diplomacy
            }
            ActionType::ChatToAll | ActionType::ChatLocalToSelf | ActionType::ChatToPlayer => {
                ActionCategory::Chat
            }
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
