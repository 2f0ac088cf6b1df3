//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// 3D world position. `y` is height; settlements are laid out on the x/z plane.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same position with a different height
    pub fn with_height(self, y: f32) -> Self {
        Self { y, ..self }
    }
}

/// Building size in blocks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Footprint {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Block placed on the ground when a building is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Planks,
    Cobblestone,
    Farmland,
    Thatch,
    Brick,
}

/// Name given to a villager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub given: String,
    pub family: String,
}

impl Name {
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            family: family.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given, self.family)
    }
}
