//! Object and research catalog - costs, classes and housing per game-data id
//!
//! The standard catalog carries the default genie data ids so scripts that
//! name unit lines resolve against real type ids.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Commodity, ObjectClass, ObjectTypeId, ResearchId};

/// Resource cost of producing one object or researching one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cost {
    pub food: i32,
    pub wood: i32,
    pub stone: i32,
    pub gold: i32,
}

impl Cost {
    pub const fn new(food: i32, wood: i32, stone: i32, gold: i32) -> Self {
        Self { food, wood, stone, gold }
    }

    pub fn get(&self, commodity: Commodity) -> i32 {
        match commodity {
            Commodity::Food => self.food,
            Commodity::Wood => self.wood,
            Commodity::Stone => self.stone,
            Commodity::Gold => self.gold,
        }
    }

    /// Non-zero components
    pub fn components(&self) -> impl Iterator<Item = (Commodity, i32)> + '_ {
        Commodity::ALL
            .into_iter()
            .map(move |c| (c, self.get(c)))
            .filter(|(_, amount)| *amount > 0)
    }
}

/// Static data for one object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub type_id: ObjectTypeId,
    pub name: String,
    pub class: ObjectClass,
    #[serde(default)]
    pub cost: Cost,
    /// Housing provided while the object stands
    #[serde(default)]
    pub housing: i32,
}

/// Static data for one research item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSpec {
    pub id: ResearchId,
    pub name: String,
    #[serde(default)]
    pub cost: Cost,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    object: Vec<ObjectSpec>,
    #[serde(default)]
    research: Vec<ResearchSpec>,
}

/// Catalog of all known object types and research items
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    objects: AHashMap<ObjectTypeId, ObjectSpec>,
    research: AHashMap<ResearchId, ResearchSpec>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the default game data
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        for &(ids, name, class, cost, housing) in STANDARD_OBJECTS {
            for &id in ids {
                catalog.add_object(ObjectSpec {
                    type_id: ObjectTypeId(id),
                    name: name.to_string(),
                    class,
                    cost,
                    housing,
                });
            }
        }

        for &(id, name, cost) in STANDARD_RESEARCH {
            catalog.add_research(ResearchSpec {
                id: ResearchId(id),
                name: name.to_string(),
                cost,
            });
        }

        catalog
    }

    /// Parse a catalog from TOML (`[[object]]` and `[[research]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::new();
        for spec in file.object {
            catalog.add_object(spec);
        }
        for spec in file.research {
            catalog.add_research(spec);
        }
        Ok(catalog)
    }

    pub fn add_object(&mut self, spec: ObjectSpec) {
        self.objects.insert(spec.type_id, spec);
    }

    pub fn add_research(&mut self, spec: ResearchSpec) {
        self.research.insert(spec.id, spec);
    }

    pub fn object(&self, type_id: ObjectTypeId) -> Option<&ObjectSpec> {
        self.objects.get(&type_id)
    }

    pub fn research(&self, id: ResearchId) -> Option<&ResearchSpec> {
        self.research.get(&id)
    }

    /// Class of a type id; unknown ids are treated as civilians
    pub fn class_of(&self, type_id: ObjectTypeId) -> ObjectClass {
        self.object(type_id)
            .map(|spec| spec.class)
            .unwrap_or(ObjectClass::Civilian)
    }

    /// Costs of the known types among `type_ids`, in the order given
    pub fn costs_of<'a>(&'a self, type_ids: &'a [ObjectTypeId]) -> impl Iterator<Item = Cost> + 'a {
        type_ids
            .iter()
            .filter_map(move |id| self.object(*id))
            .map(|spec| spec.cost)
    }
}

type ObjectRow = (&'static [u16], &'static str, ObjectClass, Cost, i32);

const STANDARD_OBJECTS: &[ObjectRow] = &[
    (
        &[
            83, 293, 56, 57, 118, 120, 122, 123, 124, 156, 212, 214, 216, 218, 220, 222, 259, 354,
            579, 581, 590, 592,
        ],
        "Villager",
        ObjectClass::Civilian,
        Cost::new(50, 0, 0, 0),
        0,
    ),
    (&[74, 75, 77, 473, 567], "Militia", ObjectClass::Infantry, Cost::new(60, 0, 0, 20), 0),
    (&[93, 358, 359], "Spearman", ObjectClass::Infantry, Cost::new(35, 25, 0, 0), 0),
    (&[4, 24, 492], "Archer", ObjectClass::Archer, Cost::new(0, 25, 0, 45), 0),
    (&[7, 6], "Skirmisher", ObjectClass::Archer, Cost::new(25, 35, 0, 0), 0),
    (&[448, 546, 441], "Scout Cavalry", ObjectClass::Cavalry, Cost::new(80, 0, 0, 0), 0),
    (&[38, 283, 569], "Knight", ObjectClass::Cavalry, Cost::new(60, 0, 0, 75), 0),
    (&[280, 550, 588], "Mangonel", ObjectClass::Siege, Cost::new(0, 160, 0, 135), 0),
    (&[35, 422, 548], "Battering Ram", ObjectClass::Siege, Cost::new(0, 160, 0, 75), 0),
    (&[539, 21, 442], "Galley", ObjectClass::Warship, Cost::new(0, 90, 0, 30), 0),
    (&[13], "Fishing Ship", ObjectClass::FishingBoat, Cost::new(0, 75, 0, 0), 0),
    (&[17, 128], "Trade Cog", ObjectClass::TradeUnit, Cost::new(0, 100, 0, 50), 0),
    (&[70], "House", ObjectClass::Building, Cost::new(0, 25, 0, 0), 5),
    (&[109], "Town Center", ObjectClass::Building, Cost::new(0, 275, 100, 0), 5),
    (&[12], "Barracks", ObjectClass::Building, Cost::new(0, 175, 0, 0), 0),
    (&[87], "Archery Range", ObjectClass::Building, Cost::new(0, 175, 0, 0), 0),
    (&[101], "Stable", ObjectClass::Building, Cost::new(0, 175, 0, 0), 0),
    (&[49], "Siege Workshop", ObjectClass::Building, Cost::new(0, 200, 0, 0), 0),
    (&[84], "Market", ObjectClass::Building, Cost::new(0, 175, 0, 0), 0),
    (&[68], "Mill", ObjectClass::Building, Cost::new(0, 100, 0, 0), 0),
    (&[562], "Lumber Camp", ObjectClass::Building, Cost::new(0, 100, 0, 0), 0),
    (&[584], "Mining Camp", ObjectClass::Building, Cost::new(0, 100, 0, 0), 0),
    (&[45], "Dock", ObjectClass::Building, Cost::new(0, 150, 0, 0), 0),
    (&[103], "Blacksmith", ObjectClass::Building, Cost::new(0, 150, 0, 0), 0),
    (&[104], "Monastery", ObjectClass::Building, Cost::new(0, 175, 0, 0), 0),
    (&[209], "University", ObjectClass::Building, Cost::new(0, 200, 0, 0), 0),
    (&[50], "Farm", ObjectClass::Building, Cost::new(0, 60, 0, 0), 0),
    (&[79], "Watch Tower", ObjectClass::Building, Cost::new(0, 25, 125, 0), 0),
    (&[82], "Castle", ObjectClass::Building, Cost::new(0, 0, 650, 0), 0),
    (&[72], "Palisade Wall", ObjectClass::Wall, Cost::new(0, 2, 0, 0), 0),
    (&[117], "Stone Wall", ObjectClass::Wall, Cost::new(0, 0, 5, 0), 0),
    (&[155], "Fortified Wall", ObjectClass::Wall, Cost::new(0, 0, 5, 0), 0),
    (&[487], "Gate", ObjectClass::Wall, Cost::new(0, 0, 30, 0), 0),
];

const STANDARD_RESEARCH: &[(u16, &str, Cost)] = &[
    (22, "Loom", Cost::new(0, 0, 0, 50)),
    (213, "Wheelbarrow", Cost::new(175, 50, 0, 0)),
    (249, "Hand Cart", Cost::new(300, 200, 0, 0)),
    (202, "Double-Bit Axe", Cost::new(100, 50, 0, 0)),
    (203, "Bow Saw", Cost::new(150, 100, 0, 0)),
    (14, "Horse Collar", Cost::new(75, 75, 0, 0)),
    (55, "Gold Mining", Cost::new(100, 75, 0, 0)),
    (278, "Stone Mining", Cost::new(100, 75, 0, 0)),
    (199, "Fletching", Cost::new(100, 0, 0, 50)),
    (8, "Town Watch", Cost::new(75, 0, 0, 0)),
    (67, "Forging", Cost::new(150, 0, 0, 0)),
    (101, "Feudal Age", Cost::new(500, 0, 0, 0)),
    (102, "Castle Age", Cost::new(800, 0, 0, 200)),
    (103, "Imperial Age", Cost::new(1000, 0, 0, 800)),
];
