//! CivSim Core - Settlement Simulation Engine
//!
//! A tick-driven simulation of a growing civilization: a shared resource
//! stockpile, population and happiness dynamics, building construction,
//! villager labor and a technology tree gated by ages.
//!
//! # Architecture
//!
//! Villagers live in an Entity Component System world via `hecs`:
//! - **Entities**: villagers
//! - **Components**: pure data on entities (Villager, Profession, Assignment, TaskTimers)
//! - **Systems**: logic over components and settlements (economy, labor, construction, ...)
//!
//! | Module        | Role                                                      |
//! |---------------|-----------------------------------------------------------|
//! | `catalog`     | building types, technologies, ages                        |
//! | `settlement`  | one cluster: roster, buildings, build queue               |
//! | `engine`      | `Civilization`, the owner of all state and the tick loop  |
//! | `host`        | world, villager factory and notifier seams                |
//! | `persistence` | bincode and JSON saves                                    |
//!
//! # Example
//!
//! ```rust,no_run
//! use civsim_core::prelude::*;
//!
//! let mut civ = Civilization::new(Catalog::standard(), SimConfig::seeded(42));
//! let home = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
//! civ.queue_building(home, "hut", Vec3::new(4.0, 0.0, 4.0)).ok();
//!
//! loop {
//!     civ.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod host;
pub mod persistence;
pub mod settlement;
pub mod systems;

/// Seeded random source shared by every random draw in the simulation
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::{Age, Catalog};
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::{CivStats, Civilization};
    pub use crate::error::ActionError;
    pub use crate::host::{CivEvent, Hosts};
}
