//! Save/Load functionality for persisting civilization state
//!
//! Uses bincode for compact binary saves and JSON for readable ones.
//! Villager entities are flattened per settlement in roster order and
//! respawned on load; hecs entity ids are not persisted.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{Read, Write};
use thiserror::Error;

use crate::catalog::Age;
use crate::components::*;
use crate::engine::Civilization;
use crate::settlement::Settlement;
use crate::systems::{Milestone, Stockpile, WorkOrderQueue};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the civilization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    pub stockpile: Stockpile,
    pub research_points: u32,
    pub unlocked_technologies: Vec<String>,
    pub current_age: Age,
    pub milestones: Vec<Milestone>,
    pub happiness: f32,
    /// Pending work orders in dispatch order
    pub work_orders: Vec<WorkOrder>,
    pub settlements: Vec<SavedSettlement>,
    pub next_settlement_id: u32,
    pub next_villager_id: u32,
    pub next_build_order_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSettlement {
    pub id: SettlementId,
    pub name: String,
    pub center: Vec3,
    pub radius: f32,
    pub founded_at: f64,
    pub buildings: Vec<Building>,
    pub build_queue: Vec<BuildOrder>,
    /// Roster order
    pub villagers: Vec<SavedVillager>,
}

/// Every component of a villager entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVillager {
    pub villager: Villager,
    pub profession: Profession,
    pub assignment: Assignment,
    pub timers: TaskTimers,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Save references unknown building type `{0}`")]
    UnknownBuilding(String),
    #[error("Save lists settlement {0} more than once")]
    DuplicateSettlement(SettlementId),
    #[error("Save has non-finite {field}: {value}")]
    InvalidValue { field: String, value: f32 },
}

fn save_villagers(world: &World, settlement: &Settlement) -> Vec<SavedVillager> {
    let mut saved = Vec::with_capacity(settlement.villagers.len());
    for &entity in &settlement.villagers {
        let Ok(mut query) =
            world.query_one::<(&Villager, &Profession, &Assignment, &TaskTimers)>(entity)
        else {
            continue;
        };
        if let Some((villager, profession, assignment, timers)) = query.get() {
            saved.push(SavedVillager {
                villager: villager.clone(),
                profession: *profession,
                assignment: assignment.clone(),
                timers: *timers,
            });
        }
    }
    saved
}

impl Civilization {
    /// Snapshot the full civilization state
    pub fn serialize(&self) -> SaveData {
        let settlements = self
            .settlements
            .values()
            .map(|s| SavedSettlement {
                id: s.id,
                name: s.name.clone(),
                center: s.center,
                radius: s.radius,
                founded_at: s.founded_at,
                buildings: s.buildings.clone(),
                build_queue: s.build_queue.iter().cloned().collect(),
                villagers: save_villagers(&self.world, s),
            })
            .collect();

        SaveData {
            version: SAVE_VERSION,
            sim_time: self.sim_time,
            stockpile: self.stockpile.clone(),
            research_points: self.research_points,
            unlocked_technologies: self.unlocked.iter().cloned().collect(),
            current_age: self.current_age,
            milestones: self.milestones.iter().copied().collect(),
            happiness: self.happiness,
            work_orders: self.work_orders.to_vec(),
            settlements,
            next_settlement_id: self.next_settlement_id,
            next_villager_id: self.next_villager_id,
            next_build_order_id: self.next_build_order_id,
        }
    }

    /// Replace the civilization state with a snapshot. Catalog, config,
    /// collaborators and RNG are kept. On error nothing changes.
    pub fn deserialize(&mut self, data: SaveData) -> Result<(), SaveError> {
        if data.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: data.version,
            });
        }
        let mut seen = BTreeSet::new();
        for saved in &data.settlements {
            if !seen.insert(saved.id) {
                return Err(SaveError::DuplicateSettlement(saved.id));
            }
            if let Some(order) = saved
                .build_queue
                .iter()
                .find(|o| self.catalog.building(&o.building_type).is_none())
            {
                return Err(SaveError::UnknownBuilding(order.building_type.clone()));
            }
        }
        if let Some((kind, value)) = data.stockpile.iter().find(|(_, a)| !a.is_finite()) {
            return Err(SaveError::InvalidValue {
                field: kind.name().to_string(),
                value,
            });
        }
        if !data.happiness.is_finite() {
            return Err(SaveError::InvalidValue {
                field: "happiness".to_string(),
                value: data.happiness,
            });
        }

        let mut world = World::new();
        let mut settlements = BTreeMap::new();
        for saved in data.settlements {
            let mut settlement = Settlement::new(
                saved.id,
                saved.name,
                saved.center,
                saved.radius,
                saved.founded_at,
            );
            settlement.buildings = saved.buildings;
            settlement.build_queue = VecDeque::from(saved.build_queue);
            for v in saved.villagers {
                let entity = world.spawn((v.villager, v.profession, v.assignment, v.timers));
                settlement.villagers.push(entity);
            }
            settlements.insert(settlement.id, settlement);
        }
        let population: u32 = settlements
            .values()
            .map(|s| s.villagers.len() as u32)
            .sum();
        let mut stockpile = data.stockpile;
        stockpile.clamp_negative();

        self.world = world;
        self.settlements = settlements;
        self.population = population;
        self.sim_time = data.sim_time;
        self.stockpile = stockpile;
        self.research_points = data.research_points;
        self.unlocked = data.unlocked_technologies.into_iter().collect();
        self.current_age = data.current_age;
        self.milestones = data.milestones.into_iter().collect();
        self.happiness = data.happiness.clamp(0.0, 100.0);
        self.work_orders = WorkOrderQueue::from_orders(data.work_orders);
        self.next_settlement_id = data.next_settlement_id;
        self.next_villager_id = data.next_villager_id;
        self.next_build_order_id = data.next_build_order_id;

        // Reset update timers
        self.production_timer = 0.0;
        self.happiness_timer = 0.0;
        self.growth_timer = 0.0;
        self.drain_events();

        log::info!(
            "Loaded civilization at t={:.1}s: {} settlements, population {}",
            self.sim_time,
            self.settlements.len(),
            self.population
        );
        Ok(())
    }

    /// Save to a writer as bincode
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        bincode::serialize_into(writer, &self.serialize())?;
        Ok(())
    }

    /// Load bincode written by `save`
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let data: SaveData = bincode::deserialize_from(reader)?;
        self.deserialize(data)
    }
}
