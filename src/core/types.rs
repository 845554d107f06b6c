//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player slot in a match (1-based like the game's player numbers, 0 is gaia)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const GAIA: PlayerId = PlayerId(0);

    pub fn new(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Unique identifier for a live game object (unit, building, wall piece)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Game-data type id of an object (the dat file's unit id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectTypeId(pub u16);

/// Game-data id of a research item (ages are research items too)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResearchId(pub u16);

/// Script-defined integer variable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalId(pub i32);

/// Identifier of a compiled rule within one player's rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{}", self.0)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Per-player tracked quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Food,
    Wood,
    Stone,
    Gold,
    /// Current population (units alive)
    Population,
    /// Population supported by houses and town centers
    HousingCapacity,
    /// Hard population limit of the match
    PopulationCap,
    /// Current age as its ordinal (dark age = 0)
    CurrentAge,
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Food,
        ResourceType::Wood,
        ResourceType::Stone,
        ResourceType::Gold,
        ResourceType::Population,
        ResourceType::HousingCapacity,
        ResourceType::PopulationCap,
        ResourceType::CurrentAge,
    ];

    /// The commodity this resource is stockpiled as, if it is one
    pub fn commodity(&self) -> Option<Commodity> {
        match self {
            ResourceType::Food => Some(Commodity::Food),
            ResourceType::Wood => Some(Commodity::Wood),
            ResourceType::Stone => Some(Commodity::Stone),
            ResourceType::Gold => Some(Commodity::Gold),
            _ => None,
        }
    }
}

/// Stockpiled resources that can be escrowed, traded and paid as cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commodity {
    Food,
    Wood,
    Stone,
    Gold,
}

impl Commodity {
    pub const ALL: [Commodity; 4] = [Commodity::Food, Commodity::Wood, Commodity::Stone, Commodity::Gold];

    pub fn resource(&self) -> ResourceType {
        match self {
            Commodity::Food => ResourceType::Food,
            Commodity::Wood => ResourceType::Wood,
            Commodity::Stone => ResourceType::Stone,
            Commodity::Gold => ResourceType::Gold,
        }
    }

    /// Position in fixed-size per-commodity arrays
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Gold is the market currency; only the other three are traded
    pub fn is_tradable(&self) -> bool {
        !matches!(self, Commodity::Gold)
    }
}

/// Technological ages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Age {
    Dark,
    Feudal,
    Castle,
    Imperial,
}

impl Age {
    /// Ordinal stored in the CurrentAge resource
    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    pub fn from_ordinal(value: i32) -> Option<Age> {
        match value {
            0 => Some(Age::Dark),
            1 => Some(Age::Feudal),
            2 => Some(Age::Castle),
            3 => Some(Age::Imperial),
            _ => None,
        }
    }

    /// The research item whose completion moves a player into this age
    pub fn research_id(&self) -> Option<ResearchId> {
        match self {
            Age::Dark => None,
            Age::Feudal => Some(ResearchId(101)),
            Age::Castle => Some(ResearchId(102)),
            Age::Imperial => Some(ResearchId(103)),
        }
    }

    pub fn from_research(id: ResearchId) -> Option<Age> {
        match id.0 {
            101 => Some(Age::Feudal),
            102 => Some(Age::Castle),
            103 => Some(Age::Imperial),
            _ => None,
        }
    }
}

/// Broad object category used by military counts and the cost table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectClass {
    Civilian,
    Infantry,
    Archer,
    Cavalry,
    Siege,
    Warship,
    FishingBoat,
    TradeUnit,
    Building,
    Wall,
}

impl ObjectClass {
    pub fn is_land_military(&self) -> bool {
        matches!(
            self,
            ObjectClass::Infantry | ObjectClass::Archer | ObjectClass::Cavalry | ObjectClass::Siege
        )
    }

    pub fn is_warship(&self) -> bool {
        matches!(self, ObjectClass::Warship)
    }

    /// Units count against population, buildings do not
    pub fn takes_population(&self) -> bool {
        !matches!(self, ObjectClass::Building | ObjectClass::Wall)
    }
}

/// Military grouping of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitGroup {
    #[default]
    Ungrouped,
    Attack,
    Defend,
}

/// Market direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Match difficulty, easiest first so relational comparisons read naturally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyLevel {
    Easiest,
    Easy,
    #[default]
    Moderate,
    Hard,
    Hardest,
}

/// Starting resource setting of the match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartingResources {
    #[default]
    Low,
    Medium,
    High,
}

impl StartingResources {
    /// Amount of each commodity a player starts with
    pub fn stockpile(&self) -> i32 {
        match self {
            StartingResources::Low => 200,
            StartingResources::Medium => 500,
            StartingResources::High => 1000,
        }
    }
}

/// Relational operator of a scripted comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelOp {
    #[serde(alias = "==")]
    Equal,
    #[serde(alias = "!=")]
    NotEqual,
    #[serde(alias = "<")]
    LessThan,
    #[serde(alias = "<=")]
    LessOrEqual,
    #[serde(alias = ">")]
    GreaterThan,
    #[serde(alias = ">=")]
    GreaterOrEqual,
}

impl RelOp {
    pub const ALL: [RelOp; 6] = [
        RelOp::Equal,
        RelOp::NotEqual,
        RelOp::LessThan,
        RelOp::LessOrEqual,
        RelOp::GreaterThan,
        RelOp::GreaterOrEqual,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Equal => "==",
            RelOp::NotEqual => "!=",
            RelOp::LessThan => "<",
            RelOp::LessOrEqual => "<=",
            RelOp::GreaterThan => ">",
            RelOp::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
