//! Fact signatures and their condition builders

use ahash::AHashMap;
use std::sync::LazyLock;
use tracing::warn;

use crate::conditions::{
    CanTrade, CanTrainOrBuild, CombatCategory, CombatUnitsCount, Compare, Condition, Constant,
    EscrowAmount, Goal, HeadroomKind, PopulationHeadroom, ResourceValue, TechAvailable,
    TradingPrice, UnitTypeCount,
};
use crate::core::types::{GoalId, ObjectTypeId, PlayerId, ResourceType, TradeDirection};
use crate::resolver::ResolveContext;
use crate::script::{Arg, ArgKind, Fact, PlayerNumber};

type ConditionBuilder = fn(Fact, &[Arg], &ResolveContext) -> Option<Box<dyn Condition>>;

use ArgKind as K;

const CONDITIONS: &[(Fact, &[ArgKind], ConditionBuilder)] = &[
    (Fact::True, &[], constant),
    (Fact::False, &[], constant),
    (Fact::Difficulty, &[K::RelOp, K::DifficultyLevel], difficulty),
    (Fact::StartingResources, &[K::RelOp, K::StartingResources], starting_resources),
    (Fact::FoodAmount, &[K::RelOp, K::Int], resource_amount),
    (Fact::WoodAmount, &[K::RelOp, K::Int], resource_amount),
    (Fact::StoneAmount, &[K::RelOp, K::Int], resource_amount),
    (Fact::GoldAmount, &[K::RelOp, K::Int], resource_amount),
    (Fact::Population, &[K::RelOp, K::Int], resource_amount),
    (Fact::CurrentAge, &[K::RelOp, K::Age], current_age),
    (Fact::PlayersCurrentAge, &[K::PlayerNumber, K::RelOp, K::Age], players_current_age),
    (Fact::PlayersStockpile, &[K::PlayerNumber, K::Commodity, K::RelOp, K::Int], players_stockpile),
    (Fact::PopulationHeadroom, &[K::RelOp, K::Int], headroom),
    (Fact::HousingHeadroom, &[K::RelOp, K::Int], headroom),
    (Fact::UnitTypeCount, &[K::Unit, K::RelOp, K::Int], unit_count),
    (Fact::UnitTypeCountTotal, &[K::Unit, K::RelOp, K::Int], unit_count),
    (Fact::BuildingTypeCount, &[K::Building, K::RelOp, K::Int], unit_count),
    (Fact::BuildingTypeCountTotal, &[K::Building, K::RelOp, K::Int], unit_count),
    (Fact::PlayersUnitTypeCount, &[K::PlayerNumber, K::Unit, K::RelOp, K::Int], players_unit_count),
    (Fact::PlayersBuildingTypeCount, &[K::PlayerNumber, K::Building, K::RelOp, K::Int], players_unit_count),
    (Fact::CanTrain, &[K::Unit], can_produce),
    (Fact::CanTrainWithEscrow, &[K::Unit], can_produce),
    (Fact::CanBuild, &[K::Building], can_produce),
    (Fact::CanBuildWithEscrow, &[K::Building], can_produce),
    (Fact::CanBuildWall, &[K::WallType], can_produce),
    (Fact::CanBuildWallWithEscrow, &[K::WallType], can_produce),
    (Fact::ResearchCompleted, &[K::ResearchItem], research_completed),
    (Fact::ResearchCompleted, &[K::Age], research_completed),
    (Fact::SoldierCount, &[K::RelOp, K::Int], combat_count),
    (Fact::AttackSoldierCount, &[K::RelOp, K::Int], combat_count),
    (Fact::DefendSoldierCount, &[K::RelOp, K::Int], combat_count),
    (Fact::WarboatCount, &[K::RelOp, K::Int], combat_count),
    (Fact::AttackWarboatCount, &[K::RelOp, K::Int], combat_count),
    (Fact::DefendWarboatCount, &[K::RelOp, K::Int], combat_count),
    (Fact::Goal, &[K::Int, K::RelOp, K::Int], goal),
    (Fact::EscrowAmount, &[K::Commodity, K::RelOp, K::Int], escrow_amount),
    (Fact::CommodityBuyingPrice, &[K::Commodity, K::RelOp, K::Int], trading_price),
    (Fact::CommoditySellingPrice, &[K::Commodity, K::RelOp, K::Int], trading_price),
    (Fact::CanBuyCommodity, &[K::Commodity], can_trade),
    (Fact::CanSellCommodity, &[K::Commodity], can_trade),
];

pub(super) static CONDITION_TABLE: LazyLock<AHashMap<(Fact, Vec<ArgKind>), ConditionBuilder>> =
    LazyLock::new(|| {
        CONDITIONS
            .iter()
            .map(|(fact, kinds, build)| ((*fact, kinds.to_vec()), *build))
            .collect()
    });

fn boxed(condition: impl Condition + 'static) -> Option<Box<dyn Condition>> {
    Some(Box::new(condition))
}

/// A concrete player for facts that cannot watch "any player"
fn single_player(fact: Fact, player: &PlayerNumber, owner: PlayerId) -> Option<PlayerId> {
    let resolved = player.resolve(owner);
    if resolved.is_none() {
        warn!("{} needs a single player, got {:?}", fact, player);
    }
    resolved
}

fn constant(fact: Fact, _args: &[Arg], _cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    boxed(Constant(fact == Fact::True))
}

fn difficulty(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::DifficultyLevel(level)] = args else {
        return None;
    };
    boxed(Compare::new(cx.config.difficulty as i32, *op, *level as i32))
}

fn starting_resources(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::StartingResources(setting)] = args else {
        return None;
    };
    boxed(Compare::new(cx.config.starting_resources as i32, *op, *setting as i32))
}

fn resource_amount(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let resource = match fact {
        Fact::FoodAmount => ResourceType::Food,
        Fact::WoodAmount => ResourceType::Wood,
        Fact::StoneAmount => ResourceType::Stone,
        Fact::GoldAmount => ResourceType::Gold,
        Fact::Population => ResourceType::Population,
        _ => return None,
    };
    boxed(ResourceValue::new(resource, *op, *target, cx.player, cx.state, cx.listener))
}

fn current_age(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::Age(age)] = args else {
        return None;
    };
    boxed(ResourceValue::new(
        ResourceType::CurrentAge,
        *op,
        age.ordinal(),
        cx.player,
        cx.state,
        cx.listener,
    ))
}

fn players_current_age(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::PlayerNumber(player), Arg::RelOp(op), Arg::Age(age)] = args else {
        return None;
    };
    let player = single_player(fact, player, cx.player)?;
    boxed(ResourceValue::new(
        ResourceType::CurrentAge,
        *op,
        age.ordinal(),
        player,
        cx.state,
        cx.listener,
    ))
}

fn players_stockpile(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::PlayerNumber(player), Arg::Commodity(commodity), Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let player = single_player(fact, player, cx.player)?;
    boxed(ResourceValue::new(commodity.resource(), *op, *target, player, cx.state, cx.listener))
}

fn headroom(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let kind = match fact {
        Fact::PopulationHeadroom => HeadroomKind::Population,
        Fact::HousingHeadroom => HeadroomKind::Housing,
        _ => return None,
    };
    boxed(PopulationHeadroom::new(kind, *op, *target, cx.player, cx.state, cx.listener))
}

/// Type ids named by a unit, building or wall argument
fn object_types(arg: &Arg) -> Option<&'static [ObjectTypeId]> {
    match arg {
        Arg::Unit(unit) => Some(unit.type_ids()),
        Arg::Building(building) => Some(building.type_ids()),
        Arg::WallType(wall) => Some(wall.type_ids()),
        _ => None,
    }
}

fn unit_count(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [object, Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let type_ids = object_types(object)?;
    boxed(UnitTypeCount::new(type_ids, *op, *target, Some(cx.player), cx.state, cx.listener))
}

fn players_unit_count(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::PlayerNumber(player), object, Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let type_ids = object_types(object)?;
    let player = player.resolve(cx.player);
    boxed(UnitTypeCount::new(type_ids, *op, *target, player, cx.state, cx.listener))
}

fn can_produce(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [object] = args else {
        return None;
    };
    let type_ids = object_types(object)?;
    let include_escrow = matches!(
        fact,
        Fact::CanTrainWithEscrow | Fact::CanBuildWithEscrow | Fact::CanBuildWallWithEscrow
    );
    boxed(CanTrainOrBuild::new(type_ids, cx.player, include_escrow, cx.state, cx.listener))
}

fn research_completed(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let research = match args {
        [Arg::ResearchItem(item)] => item.research_id(),
        [Arg::Age(age)] => match age.research_id() {
            Some(research) => research,
            // Everyone starts in the first age
            None => return boxed(Constant(true)),
        },
        _ => return None,
    };
    boxed(TechAvailable::new(research, cx.player, cx.state, cx.listener))
}

fn combat_count(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let category = match fact {
        Fact::SoldierCount => CombatCategory::Soldier,
        Fact::AttackSoldierCount => CombatCategory::AttackSoldier,
        Fact::DefendSoldierCount => CombatCategory::DefendSoldier,
        Fact::WarboatCount => CombatCategory::Warboat,
        Fact::AttackWarboatCount => CombatCategory::AttackWarboat,
        Fact::DefendWarboatCount => CombatCategory::DefendWarboat,
        _ => return None,
    };
    boxed(CombatUnitsCount::new(category, *op, *target, cx.player, cx.state, cx.listener))
}

fn goal(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::Int(goal), Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    boxed(Goal::new(GoalId(*goal), *op, *target, cx.player, cx.state, cx.listener))
}

fn escrow_amount(_fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::Commodity(commodity), Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    boxed(EscrowAmount::new(*commodity, *op, *target, cx.player, cx.state, cx.listener))
}

fn trade_direction(fact: Fact) -> Option<TradeDirection> {
    match fact {
        Fact::CommodityBuyingPrice | Fact::CanBuyCommodity => Some(TradeDirection::Buy),
        Fact::CommoditySellingPrice | Fact::CanSellCommodity => Some(TradeDirection::Sell),
        _ => None,
    }
}

fn trading_price(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::Commodity(commodity), Arg::RelOp(op), Arg::Int(target)] = args else {
        return None;
    };
    let direction = trade_direction(fact)?;
    boxed(TradingPrice::new(*commodity, direction, *op, *target, cx.state, cx.listener))
}

fn can_trade(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let [Arg::Commodity(commodity)] = args else {
        return None;
    };
    let direction = trade_direction(fact)?;
    boxed(CanTrade::new(*commodity, direction, cx.player, cx.state, cx.listener))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::test_support::{listener, state, ME};
    use crate::conditions::RuleContext;
    use crate::core::config::EngineConfig;
    use crate::core::types::{Age, Commodity, DifficultyLevel, RelOp};
    use crate::resolver::{has_condition, resolve_condition};
    use crate::script::{NamedPlayer, Unit};

    #[test]
    fn test_every_entry_is_unique() {
        assert_eq!(CONDITION_TABLE.len(), CONDITIONS.len());
    }

    #[test]
    fn test_registered_signatures() {
        assert!(has_condition(Fact::FoodAmount, &[K::RelOp, K::Int]));
        assert!(has_condition(Fact::ResearchCompleted, &[K::Age]));
        assert!(!has_condition(Fact::FoodAmount, &[K::Int, K::RelOp]));
        assert!(!has_condition(Fact::Timer, &[K::Int]));
    }

    #[test]
    fn test_resolve_builds_hydrated_leaf() {
        let mut state = state();
        state.add_commodity(ME, Commodity::Wood, 250).unwrap();
        let (hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let condition = resolve_condition(
            Fact::WoodAmount,
            &[Arg::RelOp(RelOp::GreaterOrEqual), Arg::Int(200)],
            &cx,
        )
        .unwrap();

        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
        assert_eq!(hub.subscription_count(), 1);
    }

    #[test]
    fn test_difficulty_uses_match_setting() {
        let state = state();
        let (hub, listener) = listener();
        let config = EngineConfig { difficulty: DifficultyLevel::Hard, ..EngineConfig::default() };
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let condition = resolve_condition(
            Fact::Difficulty,
            &[Arg::RelOp(RelOp::GreaterThan), Arg::DifficultyLevel(DifficultyLevel::Moderate)],
            &cx,
        )
        .unwrap();

        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
        assert_eq!(hub.subscription_count(), 0);
    }

    #[test]
    fn test_dark_age_is_always_reached() {
        let state = state();
        let (_hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let condition = resolve_condition(Fact::ResearchCompleted, &[Arg::Age(Age::Dark)], &cx).unwrap();
        assert!(condition.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_any_player_rejected_where_single_player_needed() {
        let state = state();
        let (_hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let any = Arg::PlayerNumber(PlayerNumber::Named(NamedPlayer::AnyPlayer));
        let age = resolve_condition(
            Fact::PlayersCurrentAge,
            &[any.clone(), Arg::RelOp(RelOp::Equal), Arg::Age(Age::Dark)],
            &cx,
        );
        assert!(age.is_none());

        let count = resolve_condition(
            Fact::PlayersUnitTypeCount,
            &[any, Arg::Unit(Unit::KnightLine), Arg::RelOp(RelOp::Equal), Arg::Int(0)],
            &cx,
        );
        assert!(count.is_some());
    }
}
