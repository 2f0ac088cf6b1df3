//! Resource kinds and resource amount bundles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of resource held in the global stockpile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Food,
    Ore,
    Tools,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Food,
        ResourceKind::Ore,
        ResourceKind::Tools,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Wood => "Wood",
            ResourceKind::Stone => "Stone",
            ResourceKind::Food => "Food",
            ResourceKind::Ore => "Ore",
            ResourceKind::Tools => "Tools",
        }
    }
}

/// Resource amounts keyed by kind (costs, starting resources)
pub type ResourceCost = BTreeMap<ResourceKind, f32>;

/// Build a cost map from `(kind, amount)` pairs
pub fn cost(pairs: &[(ResourceKind, f32)]) -> ResourceCost {
    pairs.iter().copied().collect()
}

/// Partial sums of resources produced during one pass or tick.
///
/// Settlements return a tally instead of writing to the stockpile; the engine
/// applies it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTally {
    amounts: BTreeMap<ResourceKind, f32>,
}

impl ResourceTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f32) {
        if amount != 0.0 {
            *self.amounts.entry(kind).or_insert(0.0) += amount;
        }
    }

    pub fn merge(&mut self, other: &ResourceTally) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    pub fn get(&self, kind: ResourceKind) -> f32 {
        self.amounts.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f32)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }
}
