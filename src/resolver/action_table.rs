//! Action signatures and their builders

use ahash::AHashMap;
use std::sync::LazyLock;
use tracing::warn;

use crate::actions::{ActionType, ChatTarget, ScriptAction};
use crate::core::types::{GoalId, TradeDirection};
use crate::script::{Arg, ArgKind};

type ActionBuilder = fn(ActionType, &[Arg]) -> Option<ScriptAction>;

use ArgKind as K;

const ACTIONS: &[(ActionType, &[ArgKind], ActionBuilder)] = &[
    (ActionType::DoNothing, &[], plain),
    (ActionType::Resign, &[], plain),
    (ActionType::AttackNow, &[], plain),
    (ActionType::DisableSelf, &[], plain),
    (ActionType::ChatToAll, &[K::Text], chat),
    (ActionType::ChatLocalToSelf, &[K::Text], chat),
    (ActionType::ChatToPlayer, &[K::PlayerNumber, K::Text], chat),
    (ActionType::Train, &[K::Unit], train),
    (ActionType::Build, &[K::Building], build),
    (ActionType::BuildWall, &[K::Int, K::WallType], build_wall),
    (ActionType::Research, &[K::ResearchItem], research),
    (ActionType::Research, &[K::Age], research),
    (ActionType::BuyCommodity, &[K::Commodity], trade),
    (ActionType::SellCommodity, &[K::Commodity], trade),
    (ActionType::ReleaseEscrow, &[K::Commodity], release_escrow),
    (ActionType::SetGoal, &[K::Int, K::Int], set_goal),
    (ActionType::SetEscrowPercentage, &[K::Commodity, K::Int], set_escrow_percentage),
    (ActionType::SetStrategicNumber, &[K::StrategicNumber, K::Int], set_strategic_number),
    (ActionType::TributeToPlayer, &[K::PlayerNumber, K::Commodity, K::Int], tribute),
    (ActionType::SetStance, &[K::PlayerNumber, K::DiplomaticStance], set_stance),
    (ActionType::SetDifficultyParameter, &[K::DifficultyParameter, K::Int], set_difficulty_parameter),
];

pub(super) static ACTION_TABLE: LazyLock<AHashMap<(ActionType, Vec<ArgKind>), ActionBuilder>> =
    LazyLock::new(|| {
        ACTIONS
            .iter()
            .map(|(action, kinds, build)| ((*action, kinds.to_vec()), *build))
            .collect()
    });

fn plain(action: ActionType, _args: &[Arg]) -> Option<ScriptAction> {
    match action {
        ActionType::DoNothing => Some(ScriptAction::DoNothing),
        ActionType::Resign => Some(ScriptAction::Resign),
        ActionType::AttackNow => Some(ScriptAction::AttackNow),
        ActionType::DisableSelf => Some(ScriptAction::DisableSelf),
        _ => None,
    }
}

fn chat(action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let (target, text) = match (action, args) {
        (ActionType::ChatToAll, [Arg::Text(text)]) => (ChatTarget::All, text),
        (ActionType::ChatLocalToSelf, [Arg::Text(text)]) => (ChatTarget::OwnerOnly, text),
        (ActionType::ChatToPlayer, [Arg::PlayerNumber(player), Arg::Text(text)]) => {
            (ChatTarget::Player(*player), text)
        }
        _ => return None,
    };
    Some(ScriptAction::Chat { target, text: text.clone() })
}

fn train(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Unit(unit)] = args else {
        return None;
    };
    Some(ScriptAction::Train(*unit))
}

fn build(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Building(building)] = args else {
        return None;
    };
    Some(ScriptAction::Build(*building))
}

fn build_wall(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Int(perimeter), Arg::WallType(wall)] = args else {
        return None;
    };
    if !(1..=2).contains(perimeter) {
        warn!("wall perimeter must be 1 or 2, got {}", perimeter);
        return None;
    }
    Some(ScriptAction::BuildWall { perimeter: *perimeter, wall: *wall })
}

fn research(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    match args {
        [Arg::ResearchItem(item)] => Some(ScriptAction::Research(item.research_id())),
        [Arg::Age(age)] => {
            let id = age.research_id();
            if id.is_none() {
                warn!("{:?} cannot be researched", age);
            }
            id.map(ScriptAction::Research)
        }
        _ => None,
    }
}

fn trade(action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Commodity(commodity)] = args else {
        return None;
    };
    let direction = match action {
        ActionType::BuyCommodity => TradeDirection::Buy,
        ActionType::SellCommodity => TradeDirection::Sell,
        _ => return None,
    };
    Some(ScriptAction::Trade { commodity: *commodity, direction })
}

fn release_escrow(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Commodity(commodity)] = args else {
        return None;
    };
    Some(ScriptAction::ReleaseEscrow(*commodity))
}

fn set_goal(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Int(goal), Arg::Int(value)] = args else {
        return None;
    };
    Some(ScriptAction::SetGoal { goal: GoalId(*goal), value: *value })
}

fn set_escrow_percentage(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::Commodity(commodity), Arg::Int(percent)] = args else {
        return None;
    };
    if !(0..=100).contains(percent) {
        warn!("escrow percentage out of range: {}", percent);
        return None;
    }
    Some(ScriptAction::SetEscrowPercentage { commodity: *commodity, percent: *percent })
}

fn set_strategic_number(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::StrategicNumber(number), Arg::Int(value)] = args else {
        return None;
    };
    Some(ScriptAction::SetStrategicNumber { number: *number, value: *value })
}

fn tribute(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::PlayerNumber(to), Arg::Commodity(commodity), Arg::Int(amount)] = args else {
        return None;
    };
    if *amount <= 0 {
        warn!("tribute amount must be positive, got {}", amount);
        return None;
    }
    Some(ScriptAction::Tribute { to: *to, commodity: *commodity, amount: *amount })
}

fn set_stance(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::PlayerNumber(player), Arg::DiplomaticStance(stance)] = args else {
        return None;
    };
    Some(ScriptAction::SetStance { player: *player, stance: *stance })
}

fn set_difficulty_parameter(_action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let [Arg::DifficultyParameter(parameter), Arg::Int(value)] = args else {
        return None;
    };
    Some(ScriptAction::SetDifficultyParameter { parameter: *parameter, value: *value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Age, Commodity};
    use crate::resolver::{has_action, resolve_action};
    use crate::script::{NamedPlayer, PlayerNumber, ResearchItem, Unit, WallType};

    #[test]
    fn test_every_entry_is_unique() {
        assert_eq!(ACTION_TABLE.len(), ACTIONS.len());
    }

    #[test]
    fn test_unregistered_verbs_miss() {
        assert!(!has_action(ActionType::DisableTimer, &[K::Int]));
        assert!(!has_action(ActionType::BuildForward, &[K::Building]));
        assert!(resolve_action(ActionType::Train, &[Arg::Int(4)]).is_none());
    }

    #[test]
    fn test_train_resolves_unit_line() {
        let action = resolve_action(ActionType::Train, &[Arg::Unit(Unit::Villager)]).unwrap();
        assert_eq!(action, ScriptAction::Train(Unit::Villager));
    }

    #[test]
    fn test_research_accepts_item_or_age() {
        let loom = resolve_action(ActionType::Research, &[Arg::ResearchItem(ResearchItem::Loom)]);
        assert_eq!(loom, Some(ScriptAction::Research(ResearchItem::Loom.research_id())));

        let feudal = resolve_action(ActionType::Research, &[Arg::Age(Age::Feudal)]).unwrap();
        assert_eq!(feudal, ScriptAction::Research(crate::core::types::ResearchId(101)));

        assert!(resolve_action(ActionType::Research, &[Arg::Age(Age::Dark)]).is_none());
    }

    #[test]
    fn test_chat_to_player_keeps_target() {
        let target = PlayerNumber::Named(NamedPlayer::MyPlayer);
        let action = resolve_action(
            ActionType::ChatToPlayer,
            &[Arg::PlayerNumber(target), Arg::Text("gg".into())],
        )
        .unwrap();
        assert_eq!(action, ScriptAction::Chat { target: ChatTarget::Player(target), text: "gg".into() });
    }

    #[test]
    fn test_range_checked_arguments() {
        let wall = [Arg::Int(3), Arg::WallType(WallType::StoneWall)];
        assert!(resolve_action(ActionType::BuildWall, &wall).is_none());

        let escrow = [Arg::Commodity(Commodity::Gold), Arg::Int(150)];
        assert!(resolve_action(ActionType::SetEscrowPercentage, &escrow).is_none());

        let escrow = [Arg::Commodity(Commodity::Gold), Arg::Int(50)];
        assert_eq!(
            resolve_action(ActionType::SetEscrowPercentage, &escrow),
            Some(ScriptAction::SetEscrowPercentage { commodity: Commodity::Gold, percent: 50 })
        );
    }
}
