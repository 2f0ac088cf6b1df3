//! Simulation tuning. Everything has a default; a JSON file may override any subset.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::{cost, ResourceCost, ResourceKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Seconds between production passes
    pub production_interval: f32,
    /// Seconds between happiness passes
    pub happiness_interval: f32,
    /// Seconds between growth passes
    pub growth_interval: f32,
    /// Food eaten per villager per production pass
    pub food_per_capita: f32,
    /// Happiness lost when a production pass leaves no food
    pub starvation_penalty: f32,
    /// Housing every settlement has before buildings
    pub base_housing: u32,
    /// Chance per eligible settlement per growth pass
    pub growth_chance: f64,
    pub initial_happiness: f32,
    pub starting_resources: ResourceCost,
    /// Villagers recruited into a newly founded settlement
    pub founding_villagers: u32,
    /// Run greedy labor assignment every tick
    pub auto_assign_labor: bool,
    pub max_builders: usize,
    /// Extra construction speed per assigned builder
    pub builder_speed_bonus: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            production_interval: 5.0,
            happiness_interval: 10.0,
            growth_interval: 60.0,
            food_per_capita: 0.1,
            starvation_penalty: 5.0,
            base_housing: 5,
            growth_chance: 0.1,
            initial_happiness: 50.0,
            starting_resources: cost(&[
                (ResourceKind::Wood, 50.0),
                (ResourceKind::Stone, 20.0),
                (ResourceKind::Food, 100.0),
            ]),
            founding_villagers: 3,
            auto_assign_labor: true,
            max_builders: 2,
            builder_speed_bonus: 0.5,
        }
    }
}

impl SimConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "seed": 42, "growth_chance": 1.0 }"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.growth_chance, 1.0);
        assert_eq!(config.production_interval, 5.0);
        assert_eq!(config.starting_resources.get(&ResourceKind::Food), Some(&100.0));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            SimConfig::from_json("{ seed: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimConfig::load("/nonexistent/civsim.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
