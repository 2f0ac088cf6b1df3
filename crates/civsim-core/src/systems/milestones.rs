//! Milestones - one-shot achievements over aggregate civilization state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregate state milestones are evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilestoneContext {
    pub population: u32,
    pub buildings: usize,
    pub food: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    FirstVillager,
    Population10,
    FirstBuilding,
    Food500,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::FirstVillager,
        Milestone::Population10,
        Milestone::FirstBuilding,
        Milestone::Food500,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Milestone::FirstVillager => "first_villager",
            Milestone::Population10 => "population_10",
            Milestone::FirstBuilding => "first_building",
            Milestone::Food500 => "food_500",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Milestone::FirstVillager => "The first villager has arrived",
            Milestone::Population10 => "The population has reached ten",
            Milestone::FirstBuilding => "The first building is complete",
            Milestone::Food500 => "Five hundred food stored",
        }
    }

    /// Research points granted when reached
    pub fn reward(&self) -> u32 {
        match self {
            Milestone::Population10 => 50,
            Milestone::Food500 => 100,
            Milestone::FirstVillager | Milestone::FirstBuilding => 0,
        }
    }

    pub fn is_met(&self, ctx: &MilestoneContext) -> bool {
        match self {
            Milestone::FirstVillager => ctx.population >= 1,
            Milestone::Population10 => ctx.population >= 10,
            Milestone::FirstBuilding => ctx.buildings >= 1,
            Milestone::Food500 => ctx.food >= 500.0,
        }
    }
}

/// Milestones satisfied now that have not fired before, in declaration order
pub fn newly_reached(fired: &BTreeSet<Milestone>, ctx: &MilestoneContext) -> Vec<Milestone> {
    Milestone::ALL
        .into_iter()
        .filter(|m| !fired.contains(m) && m.is_met(ctx))
        .collect()
}
