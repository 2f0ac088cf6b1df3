//! Static catalog data: building types, technologies and ages.
//!
//! The catalog is loaded once and read by everything else. `Catalog::standard`
//! is the built-in stone to iron table; `Catalog::from_json` loads a custom one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::components::{cost, BlockKind, Footprint, Profession, ResourceCost, ResourceKind};

/// Ordered technological tier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Age {
    #[default]
    Stone,
    Tribal,
    Bronze,
    Iron,
}

impl Age {
    pub const ALL: [Age; 4] = [Age::Stone, Age::Tribal, Age::Bronze, Age::Iron];

    pub fn name(&self) -> &'static str {
        match self {
            Age::Stone => "Stone",
            Age::Tribal => "Tribal",
            Age::Bronze => "Bronze",
            Age::Iron => "Iron",
        }
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Worker-driven output of a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSpec {
    pub resource: ResourceKind,
    pub rate_per_worker: f32,
    pub required_profession: Profession,
}

/// Catalog entry for something a settlement can build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingType {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub cost: ResourceCost,
    /// Seconds of work to finish
    pub build_time: f32,
    #[serde(default)]
    pub size: Footprint,
    #[serde(default)]
    pub work_slots: u32,
    #[serde(default)]
    pub age: Age,
    #[serde(default)]
    pub production: Option<ProductionSpec>,
    #[serde(default)]
    pub housing_capacity: u32,
    #[serde(default)]
    pub storage_capacity: f32,
    /// Flat contribution to the happiness target
    #[serde(default)]
    pub happiness: f32,
    /// Research points granted each production pass
    #[serde(default)]
    pub research: u32,
    #[serde(default)]
    pub block: BlockKind,
}

impl BuildingType {
    fn base(key: &str, name: &str, age: Age, build_time: f32) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            cost: ResourceCost::new(),
            build_time,
            size: Footprint::default(),
            work_slots: 0,
            age,
            production: None,
            housing_capacity: 0,
            storage_capacity: 0.0,
            happiness: 0.0,
            research: 0,
            block: BlockKind::Planks,
        }
    }

    /// Whether finished buildings of this type employ the given profession
    pub fn employs(&self, profession: Profession) -> bool {
        self.production
            .as_ref()
            .is_some_and(|p| p.required_profession == profession)
    }
}

/// What unlocking a technology opens up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unlocks {
    #[serde(default)]
    pub buildings: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Unlocking moves the civilization into this age if it is later
    #[serde(default)]
    pub advances_to: Option<Age>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub key: String,
    pub name: String,
    /// Research points
    pub cost: u32,
    #[serde(default)]
    pub age: Age,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub unlocks: Unlocks,
}

impl Technology {
    fn base(key: &str, name: &str, age: Age, cost: u32, prerequisites: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            cost,
            age,
            prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
            unlocks: Unlocks::default(),
        }
    }

    fn unlocking(mut self, buildings: &[&str]) -> Self {
        self.unlocks.buildings = buildings.iter().map(|b| b.to_string()).collect();
        self
    }

    fn with_features(mut self, features: &[&str]) -> Self {
        self.unlocks.features = features.iter().map(|f| f.to_string()).collect();
        self
    }

    fn advancing_to(mut self, age: Age) -> Self {
        self.unlocks.advances_to = Some(age);
        self
    }

    pub fn gates(&self, building: &str) -> bool {
        self.unlocks.buildings.iter().any(|b| b == building)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{owner}` references unknown key `{key}`")]
    DanglingReference { owner: String, key: String },
    #[error("starting technology `{0}` is not in the catalog")]
    MissingStartingTechnology(String),
}

/// On-disk layout: plain lists, keyed on load
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    starting_technology: String,
    buildings: Vec<BuildingType>,
    technologies: Vec<Technology>,
}

/// Immutable building and technology tables
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    buildings: BTreeMap<String, BuildingType>,
    technologies: BTreeMap<String, Technology>,
    starting_technology: String,
}

impl Catalog {
    /// Build a catalog from entries, checking every cross reference
    pub fn new(
        buildings: Vec<BuildingType>,
        technologies: Vec<Technology>,
        starting_technology: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            buildings: buildings.into_iter().map(|b| (b.key.clone(), b)).collect(),
            technologies: technologies.into_iter().map(|t| (t.key.clone(), t)).collect(),
            starting_technology: starting_technology.into(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.buildings, file.technologies, file.starting_technology)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            starting_technology: self.starting_technology.clone(),
            buildings: self.buildings.values().cloned().collect(),
            technologies: self.technologies.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !self.technologies.contains_key(&self.starting_technology) {
            return Err(CatalogError::MissingStartingTechnology(
                self.starting_technology.clone(),
            ));
        }
        for tech in self.technologies.values() {
            for prerequisite in &tech.prerequisites {
                if !self.technologies.contains_key(prerequisite) {
                    return Err(CatalogError::DanglingReference {
                        owner: tech.key.clone(),
                        key: prerequisite.clone(),
                    });
                }
            }
            for building in &tech.unlocks.buildings {
                if !self.buildings.contains_key(building) {
                    return Err(CatalogError::DanglingReference {
                        owner: tech.key.clone(),
                        key: building.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn building(&self, key: &str) -> Option<&BuildingType> {
        self.buildings.get(key)
    }

    pub fn technology(&self, key: &str) -> Option<&Technology> {
        self.technologies.get(key)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &BuildingType> {
        self.buildings.values()
    }

    pub fn technologies(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    pub fn starting_technology(&self) -> &str {
        &self.starting_technology
    }

    /// Every technology listing `building` under `unlocks.buildings`
    pub fn gating_technologies<'a>(
        &'a self,
        building: &'a str,
    ) -> impl Iterator<Item = &'a Technology> + 'a {
        self.technologies.values().filter(move |t| t.gates(building))
    }

    /// Built-in content table
    pub fn standard() -> Self {
        use Age::{Bronze, Iron, Tribal};
        use ResourceKind::*;

        let buildings = vec![
            BuildingType {
                cost: cost(&[(Wood, 5.0)]),
                happiness: 2.0,
                research: 1,
                block: BlockKind::Cobblestone,
                ..BuildingType::base("campfire", "Campfire", Age::Stone, 10.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 10.0)]),
                size: Footprint::new(3, 3, 3),
                housing_capacity: 4,
                block: BlockKind::Thatch,
                ..BuildingType::base("hut", "Hut", Age::Stone, 20.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 5.0)]),
                size: Footprint::new(4, 1, 4),
                work_slots: 2,
                production: Some(ProductionSpec {
                    resource: Food,
                    rate_per_worker: 1.0,
                    required_profession: Profession::Farmer,
                }),
                block: BlockKind::Farmland,
                ..BuildingType::base("farm_plot", "Farm Plot", Age::Stone, 15.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 8.0), (Stone, 2.0)]),
                size: Footprint::new(3, 2, 3),
                work_slots: 2,
                production: Some(ProductionSpec {
                    resource: Wood,
                    rate_per_worker: 1.0,
                    required_profession: Profession::Gatherer,
                }),
                ..BuildingType::base("lumber_camp", "Lumber Camp", Age::Stone, 20.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 10.0)]),
                size: Footprint::new(2, 1, 2),
                storage_capacity: 100.0,
                ..BuildingType::base("storage_pit", "Storage Pit", Age::Stone, 15.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 15.0)]),
                size: Footprint::new(4, 1, 4),
                work_slots: 3,
                production: Some(ProductionSpec {
                    resource: Stone,
                    rate_per_worker: 0.8,
                    required_profession: Profession::Miner,
                }),
                block: BlockKind::Cobblestone,
                ..BuildingType::base("quarry", "Quarry", Tribal, 30.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 30.0), (Stone, 10.0)]),
                size: Footprint::new(6, 4, 3),
                housing_capacity: 10,
                happiness: 2.0,
                ..BuildingType::base("longhouse", "Longhouse", Tribal, 45.0)
            },
            BuildingType {
                cost: cost(&[(Stone, 20.0)]),
                size: Footprint::new(2, 3, 2),
                happiness: 5.0,
                research: 2,
                block: BlockKind::Cobblestone,
                ..BuildingType::base("shrine", "Shrine", Tribal, 30.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 20.0), (Stone, 20.0)]),
                size: Footprint::new(4, 3, 4),
                storage_capacity: 300.0,
                ..BuildingType::base("granary", "Granary", Tribal, 40.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 20.0), (Stone, 20.0)]),
                size: Footprint::new(3, 2, 3),
                work_slots: 3,
                production: Some(ProductionSpec {
                    resource: Ore,
                    rate_per_worker: 0.5,
                    required_profession: Profession::Miner,
                }),
                block: BlockKind::Cobblestone,
                ..BuildingType::base("mine", "Mine", Bronze, 50.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 25.0), (Stone, 15.0), (Ore, 5.0)]),
                size: Footprint::new(3, 3, 3),
                work_slots: 2,
                production: Some(ProductionSpec {
                    resource: Tools,
                    rate_per_worker: 0.5,
                    required_profession: Profession::Crafter,
                }),
                research: 1,
                ..BuildingType::base("workshop", "Workshop", Bronze, 50.0)
            },
            BuildingType {
                cost: cost(&[(Stone, 30.0), (Ore, 20.0)]),
                size: Footprint::new(3, 3, 3),
                work_slots: 2,
                production: Some(ProductionSpec {
                    resource: Tools,
                    rate_per_worker: 1.0,
                    required_profession: Profession::Crafter,
                }),
                block: BlockKind::Brick,
                ..BuildingType::base("smithy", "Smithy", Iron, 60.0)
            },
            BuildingType {
                cost: cost(&[(Wood, 40.0), (Stone, 40.0), (Tools, 10.0)]),
                size: Footprint::new(6, 4, 4),
                work_slots: 4,
                housing_capacity: 6,
                block: BlockKind::Brick,
                ..BuildingType::base("barracks", "Barracks", Iron, 80.0)
            },
        ];

        let technologies = vec![
            Technology::base("foraging", "Foraging", Age::Stone, 0, &[]),
            Technology::base("masonry", "Masonry", Age::Stone, 30, &["foraging"])
                .unlocking(&["quarry"]),
            Technology::base("carpentry", "Carpentry", Age::Stone, 40, &["foraging"])
                .unlocking(&["longhouse"]),
            Technology::base(
                "tribal_council",
                "Tribal Council",
                Age::Stone,
                60,
                &["masonry", "carpentry"],
            )
            .with_features(&["work_orders"])
            .advancing_to(Tribal),
            Technology::base("spirituality", "Spirituality", Tribal, 50, &["tribal_council"])
                .unlocking(&["shrine"]),
            Technology::base("agriculture", "Agriculture", Tribal, 80, &["tribal_council"])
                .unlocking(&["granary"])
                .with_features(&["irrigation"]),
            Technology::base("mining", "Mining", Tribal, 100, &["masonry"]).unlocking(&["mine"]),
            Technology::base("bronze_working", "Bronze Working", Tribal, 150, &["mining"])
                .unlocking(&["workshop"])
                .advancing_to(Bronze),
            Technology::base("iron_working", "Iron Working", Bronze, 250, &["bronze_working"])
                .unlocking(&["smithy", "barracks"])
                .advancing_to(Iron),
        ];

        Self {
            buildings: buildings.into_iter().map(|b| (b.key.clone(), b)).collect(),
            technologies: technologies
                .into_iter()
                .map(|t| (t.key.clone(), t))
                .collect(),
            starting_technology: "foraging".to_string(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
