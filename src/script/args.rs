//! Typed fact and action arguments
//!
//! A script line carries an ordered list of [`Arg`]s; the ordered list of
//! their [`ArgKind`]s is the signature the resolver dispatches on. Unit and
//! building arguments name whole upgrade lines and expand to every game-data
//! type id of that line.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{
    Age, Commodity, DifficultyLevel, ObjectTypeId, PlayerId, RelOp, ResearchId, StartingResources,
};

/// One typed argument of a fact or action call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arg {
    Int(i32),
    Text(String),
    RelOp(RelOp),
    Age(Age),
    Unit(Unit),
    Building(Building),
    WallType(WallType),
    #[serde(rename = "research")]
    ResearchItem(ResearchItem),
    Commodity(Commodity),
    #[serde(rename = "player")]
    PlayerNumber(PlayerNumber),
    #[serde(rename = "difficulty")]
    DifficultyLevel(DifficultyLevel),
    StartingResources(StartingResources),
    StrategicNumber(StrategicNumber),
    #[serde(rename = "stance")]
    DiplomaticStance(DiplomaticStance),
    DifficultyParameter(DifficultyParameter),
}

/// Type of an [`Arg`], the unit of a dispatch signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgKind {
    Int,
    Text,
    RelOp,
    Age,
    Unit,
    Building,
    WallType,
    ResearchItem,
    Commodity,
    PlayerNumber,
    DifficultyLevel,
    StartingResources,
    StrategicNumber,
    DiplomaticStance,
    DifficultyParameter,
}

impl Arg {
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Int(_) => ArgKind::Int,
            Arg::Text(_) => ArgKind::Text,
            Arg::RelOp(_) => ArgKind::RelOp,
            Arg::Age(_) => ArgKind::Age,
            Arg::Unit(_) => ArgKind::Unit,
            Arg::Building(_) => ArgKind::Building,
            Arg::WallType(_) => ArgKind::WallType,
            Arg::ResearchItem(_) => ArgKind::ResearchItem,
            Arg::Commodity(_) => ArgKind::Commodity,
            Arg::PlayerNumber(_) => ArgKind::PlayerNumber,
            Arg::DifficultyLevel(_) => ArgKind::DifficultyLevel,
            Arg::StartingResources(_) => ArgKind::StartingResources,
            Arg::StrategicNumber(_) => ArgKind::StrategicNumber,
            Arg::DiplomaticStance(_) => ArgKind::DiplomaticStance,
            Arg::DifficultyParameter(_) => ArgKind::DifficultyParameter,
        }
    }
}

/// Ordered argument kinds of a call
pub fn signature(args: &[Arg]) -> Vec<ArgKind> {
    args.iter().map(Arg::kind).collect()
}

/// Human-readable signature, e.g. `(RelOp, Int)`
pub struct SignatureDisplay<'a>(pub &'a [ArgKind]);

impl fmt::Display for SignatureDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", kind)?;
        }
        f.write_str(")")
    }
}

/// Player argument: a slot number or a relative selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerNumber {
    Number(u8),
    Named(NamedPlayer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedPlayer {
    MyPlayer,
    AnyPlayer,
}

impl PlayerNumber {
    /// The concrete player, or `None` for "any player"
    pub fn resolve(&self, owner: PlayerId) -> Option<PlayerId> {
        match self {
            PlayerNumber::Number(n) => Some(PlayerId(*n)),
            PlayerNumber::Named(NamedPlayer::MyPlayer) => Some(owner),
            PlayerNumber::Named(NamedPlayer::AnyPlayer) => None,
        }
    }
}

const fn ids<const N: usize>(raw: [u16; N]) -> [ObjectTypeId; N] {
    let mut out = [ObjectTypeId(0); N];
    let mut i = 0;
    while i < N {
        out[i] = ObjectTypeId(raw[i]);
        i += 1;
    }
    out
}

static VILLAGER_IDS: [ObjectTypeId; 22] = ids([
    83, 293, 56, 57, 118, 120, 122, 123, 124, 156, 212, 214, 216, 218, 220, 222, 259, 354, 579,
    581, 590, 592,
]);
static MILITIA_IDS: [ObjectTypeId; 5] = ids([74, 75, 77, 473, 567]);
static SPEARMAN_IDS: [ObjectTypeId; 3] = ids([93, 358, 359]);
static ARCHER_IDS: [ObjectTypeId; 3] = ids([4, 24, 492]);
static SKIRMISHER_IDS: [ObjectTypeId; 2] = ids([7, 6]);
static SCOUT_IDS: [ObjectTypeId; 3] = ids([448, 546, 441]);
static KNIGHT_IDS: [ObjectTypeId; 3] = ids([38, 283, 569]);
static MANGONEL_IDS: [ObjectTypeId; 3] = ids([280, 550, 588]);
static RAM_IDS: [ObjectTypeId; 3] = ids([35, 422, 548]);
static GALLEY_IDS: [ObjectTypeId; 3] = ids([539, 21, 442]);
static FISHING_SHIP_IDS: [ObjectTypeId; 1] = ids([13]);
static TRADE_COG_IDS: [ObjectTypeId; 2] = ids([17, 128]);

/// Trainable unit line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    Villager,
    MilitiaLine,
    SpearmanLine,
    ArcherLine,
    SkirmisherLine,
    ScoutCavalryLine,
    KnightLine,
    MangonelLine,
    BatteringRamLine,
    GalleyLine,
    FishingShip,
    TradeCog,
}

impl Unit {
    /// Every type id of the line; the first one is the type that gets trained
    pub fn type_ids(&self) -> &'static [ObjectTypeId] {
        match self {
            Unit::Villager => &VILLAGER_IDS,
            Unit::MilitiaLine => &MILITIA_IDS,
            Unit::SpearmanLine => &SPEARMAN_IDS,
            Unit::ArcherLine => &ARCHER_IDS,
            Unit::SkirmisherLine => &SKIRMISHER_IDS,
            Unit::ScoutCavalryLine => &SCOUT_IDS,
            Unit::KnightLine => &KNIGHT_IDS,
            Unit::MangonelLine => &MANGONEL_IDS,
            Unit::BatteringRamLine => &RAM_IDS,
            Unit::GalleyLine => &GALLEY_IDS,
            Unit::FishingShip => &FISHING_SHIP_IDS,
            Unit::TradeCog => &TRADE_COG_IDS,
        }
    }
}

/// Constructible building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Building {
    House,
    TownCenter,
    Barracks,
    ArcheryRange,
    Stable,
    SiegeWorkshop,
    Market,
    Mill,
    LumberCamp,
    MiningCamp,
    Dock,
    Blacksmith,
    Monastery,
    University,
    Farm,
    WatchTower,
    Castle,
}

static BUILDING_IDS: [ObjectTypeId; 17] = ids([
    70, 109, 12, 87, 101, 49, 84, 68, 562, 584, 45, 103, 104, 209, 50, 79, 82,
]);

impl Building {
    pub fn type_ids(&self) -> &'static [ObjectTypeId] {
        let index = *self as usize;
        &BUILDING_IDS[index..index + 1]
    }
}

/// Wall material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WallType {
    PalisadeWall,
    StoneWall,
    FortifiedWall,
}

static WALL_IDS: [ObjectTypeId; 3] = ids([72, 117, 155]);

impl WallType {
    pub fn type_ids(&self) -> &'static [ObjectTypeId] {
        let index = *self as usize;
        &WALL_IDS[index..index + 1]
    }
}

/// Researchable technology (ages are passed as [`Arg::Age`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchItem {
    Loom,
    Wheelbarrow,
    HandCart,
    DoubleBitAxe,
    BowSaw,
    HorseCollar,
    GoldMining,
    StoneMining,
    Fletching,
    TownWatch,
    Forging,
}

impl ResearchItem {
    pub fn research_id(&self) -> ResearchId {
        ResearchId(match self {
            ResearchItem::Loom => 22,
            ResearchItem::Wheelbarrow => 213,
            ResearchItem::HandCart => 249,
            ResearchItem::DoubleBitAxe => 202,
            ResearchItem::BowSaw => 203,
            ResearchItem::HorseCollar => 14,
            ResearchItem::GoldMining => 55,
            ResearchItem::StoneMining => 278,
            ResearchItem::Fletching => 199,
            ResearchItem::TownWatch => 8,
            ResearchItem::Forging => 67,
        })
    }
}

/// Tunable script parameter read by the unit-control layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategicNumber {
    PercentCivilianExplorers,
    PercentCivilianBuilders,
    PercentCivilianGatherers,
    CapCivilianExplorers,
    FoodGathererPercentage,
    WoodGathererPercentage,
    StoneGathererPercentage,
    GoldGathererPercentage,
    MinimumAttackGroupSize,
    NumberAttackGroups,
    MaximumTownSize,
    TaskUngroupedSoldiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiplomaticStance {
    Ally,
    Neutral,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyParameter {
    AbilityToDodgeMissiles,
    AbilityToMaintainDistance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Call {
        args: Vec<Arg>,
    }

    #[test]
    fn test_args_parse_from_toml() {
        let call: Call = toml::from_str(
            r#"args = [{ player = "my-player" }, { unit = "archer-line" }, { rel-op = ">=" }, { int = 5 }]"#,
        )
        .unwrap();

        assert_eq!(
            signature(&call.args),
            vec![ArgKind::PlayerNumber, ArgKind::Unit, ArgKind::RelOp, ArgKind::Int]
        );
        assert_eq!(call.args[1], Arg::Unit(Unit::ArcherLine));
    }

    #[test]
    fn test_player_number_resolution() {
        let call: Call = toml::from_str(r#"args = [{ player = 3 }, { player = "any-player" }]"#).unwrap();
        let owner = PlayerId(1);

        let [Arg::PlayerNumber(third), Arg::PlayerNumber(any)] = call.args.as_slice() else {
            panic!("unexpected args {:?}", call.args);
        };
        assert_eq!(third.resolve(owner), Some(PlayerId(3)));
        assert_eq!(any.resolve(owner), None);
        assert_eq!(PlayerNumber::Named(NamedPlayer::MyPlayer).resolve(owner), Some(owner));
    }

    #[test]
    fn test_lines_expand_to_type_ids() {
        assert_eq!(Unit::ArcherLine.type_ids(), &[ObjectTypeId(4), ObjectTypeId(24), ObjectTypeId(492)]);
        assert_eq!(Building::House.type_ids(), &[ObjectTypeId(70)]);
        assert_eq!(Building::Castle.type_ids(), &[ObjectTypeId(82)]);
        assert_eq!(WallType::StoneWall.type_ids(), &[ObjectTypeId(117)]);
        assert_eq!(ResearchItem::Loom.research_id(), ResearchId(22));
    }

    #[test]
    fn test_signature_display() {
        let text = SignatureDisplay(&[ArgKind::Commodity, ArgKind::RelOp, ArgKind::Int]).to_string();
        assert_eq!(text, "(Commodity, RelOp, Int)");
    }
}
