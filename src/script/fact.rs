//! Fact verbs of the script language

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verb of a scripted condition
///
/// The vocabulary is wider than what the resolver can build; facts without a
/// registered signature resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fact {
    True,
    False,

    // Match settings
    Difficulty,
    StartingResources,
    CheatsEnabled,
    MapSize,
    CivSelected,

    // Own economy
    FoodAmount,
    WoodAmount,
    StoneAmount,
    GoldAmount,
    Population,
    CurrentAge,
    PopulationHeadroom,
    HousingHeadroom,

    // Other players
    PlayersCurrentAge,
    PlayersStockpile,
    PlayersUnitTypeCount,
    PlayersBuildingTypeCount,
    PlayersStance,

    // Object counts
    UnitTypeCount,
    UnitTypeCountTotal,
    BuildingTypeCount,
    BuildingTypeCountTotal,
    SoldierCount,
    AttackSoldierCount,
    DefendSoldierCount,
    WarboatCount,
    AttackWarboatCount,
    DefendWarboatCount,

    // Production
    CanTrain,
    CanTrainWithEscrow,
    CanBuild,
    CanBuildWithEscrow,
    CanBuildWall,
    CanBuildWallWithEscrow,
    CanResearch,
    ResearchCompleted,

    // Script state
    Goal,
    StrategicNumber,
    Timer,
    EscrowAmount,

    // Market
    CommodityBuyingPrice,
    CommoditySellingPrice,
    CanBuyCommodity,
    CanSellCommodity,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
