//! Rejected operations. Every variant leaves the civilization unchanged.

use thiserror::Error;

use crate::catalog::Age;
use crate::components::{ResourceKind, SettlementId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("unknown building type `{0}`")]
    UnknownBuilding(String),
    #[error("unknown technology `{0}`")]
    UnknownTechnology(String),
    #[error("no settlement with id {0}")]
    UnknownSettlement(SettlementId),
    #[error("settlement {settlement} has no villager at index {index}")]
    UnknownVillager {
        settlement: SettlementId,
        index: usize,
    },
    #[error("not enough resources for `{key}`")]
    InsufficientResources {
        key: String,
        missing: Vec<(ResourceKind, f32)>,
    },
    #[error("`{key}` requires the {required} age")]
    AgeLocked { key: String, required: Age },
    #[error("`{key}` is locked behind technology `{technology}`")]
    TechnologyLocked { key: String, technology: String },
    #[error("technology `{key}` requires `{prerequisite}`")]
    MissingPrerequisite { key: String, prerequisite: String },
    #[error("technology `{key}` costs {cost} research points, {available} available")]
    InsufficientResearch {
        key: String,
        cost: u32,
        available: u32,
    },
    #[error("technology `{0}` is already unlocked")]
    AlreadyUnlocked(String),
    #[error("every work slot at `{0}` is taken")]
    NoFreeWorkSlot(String),
    #[error("villager factory declined to create a villager")]
    SpawnDeclined,
}

impl ActionError {
    /// Unknown catalog key, settlement or villager
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActionError::UnknownBuilding(_)
                | ActionError::UnknownTechnology(_)
                | ActionError::UnknownSettlement(_)
                | ActionError::UnknownVillager { .. }
        )
    }
}
