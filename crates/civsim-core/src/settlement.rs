//! Settlements - one cluster of villagers, finished buildings and a build queue

use hecs::{Entity, World};
use std::collections::VecDeque;

use crate::catalog::Catalog;
use crate::components::{
    Assignment, BuildOrder, Building, Profession, ResourceTally, SettlementId, Vec3, WorkOrder,
};
use crate::config::SimConfig;
use crate::host::WorldHost;
use crate::systems::{advance_construction, auto_assign, execute_tasks, LaborPolicy};
use crate::SimRng;

/// A named cluster of villagers, buildings and queued construction.
///
/// Villagers live in the ECS world; the roster keeps their insertion order,
/// which is the iteration order for labor assignment and work orders.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub center: Vec3,
    /// Territory radius. Advisory only, nothing is spatially enforced.
    pub radius: f32,
    pub founded_at: f64,
    pub villagers: Vec<Entity>,
    pub buildings: Vec<Building>,
    pub build_queue: VecDeque<BuildOrder>,
}

/// Borrowed engine state a settlement needs for one tick
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub catalog: &'a Catalog,
    pub config: &'a SimConfig,
    pub rng: &'a mut SimRng,
    pub host: &'a mut dyn WorldHost,
    pub sim_time: f64,
    pub delta: f32,
}

/// What a settlement tick produced, for the engine to apply
#[derive(Debug, Default)]
pub struct SettlementReport {
    pub yields: ResourceTally,
    pub completed: Vec<Building>,
    pub finished_work: Vec<WorkOrder>,
    pub assigned: usize,
}

impl Settlement {
    pub fn new(
        id: SettlementId,
        name: impl Into<String>,
        center: Vec3,
        radius: f32,
        founded_at: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            center,
            radius,
            founded_at,
            villagers: Vec::new(),
            buildings: Vec::new(),
            build_queue: VecDeque::new(),
        }
    }

    pub fn population(&self) -> usize {
        self.villagers.len()
    }

    /// Base capacity plus every finished building's housing
    pub fn housing_capacity(&self, base: u32) -> u32 {
        base + self
            .buildings
            .iter()
            .map(|b| b.kind.housing_capacity)
            .sum::<u32>()
    }

    pub fn building_happiness(&self) -> f32 {
        self.buildings.iter().map(|b| b.kind.happiness).sum()
    }

    pub fn storage_capacity(&self) -> f32 {
        self.buildings.iter().map(|b| b.kind.storage_capacity).sum()
    }

    pub fn count_buildings(&self, key: &str) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.building_type == key)
            .count()
    }

    /// Work slots across finished buildings of one type
    pub fn work_slots(&self, key: &str) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.building_type == key)
            .map(|b| b.kind.work_slots)
            .sum()
    }

    /// Villagers currently staffing the given building type
    pub fn workers_at(&self, world: &World, key: &str) -> usize {
        self.villagers
            .iter()
            .filter(|&&e| {
                world
                    .get::<&Assignment>(e)
                    .map(|a| a.workplace.as_deref() == Some(key))
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn count_profession(&self, world: &World, profession: Profession) -> usize {
        self.villagers
            .iter()
            .filter(|&&e| {
                world
                    .get::<&Profession>(e)
                    .map(|p| *p == profession)
                    .unwrap_or(false)
            })
            .count()
    }

    /// One simulation step: construction, labor assignment, then task execution
    pub fn update(&mut self, ctx: &mut TickContext<'_>) -> SettlementReport {
        let mut report = SettlementReport::default();

        if let Some(building) = advance_construction(
            ctx.world,
            self,
            ctx.catalog,
            ctx.delta,
            ctx.config.builder_speed_bonus,
            ctx.sim_time,
            ctx.host,
        ) {
            report.completed.push(building);
        }

        if ctx.config.auto_assign_labor {
            let policy = LaborPolicy::from_config(ctx.config);
            report.assigned = auto_assign(ctx.world, self, &policy);
        }

        let (yields, finished) = execute_tasks(ctx.world, self, ctx.delta, ctx.rng);
        report.yields = yields;
        report.finished_work = finished;
        report
    }
}
