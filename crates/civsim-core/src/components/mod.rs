//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities or owned by
//! settlements. They have no behavior - that lives in systems.

mod common;
mod ids;
mod orders;
mod resources;
mod villager;

pub use common::*;
pub use ids::*;
pub use orders::*;
pub use resources::*;
pub use villager::*;
