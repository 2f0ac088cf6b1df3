//! Generation - procedural names for villagers

mod names;

pub use names::*;
