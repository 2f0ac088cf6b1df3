//! Construction records and work orders.

use serde::{Deserialize, Serialize};

use super::common::Vec3;
use super::ids::BuildOrderId;
use crate::catalog::BuildingType;

/// A queued construction request. Only the head of a settlement's queue
/// accrues progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub id: BuildOrderId,
    pub building_type: String,
    pub position: Vec3,
    /// Seconds of work accrued
    pub progress: f32,
    /// Seconds of work required
    pub build_time: f32,
    pub queued_at: f64,
}

impl BuildOrder {
    pub fn new(id: BuildOrderId, building: &BuildingType, position: Vec3, queued_at: f64) -> Self {
        Self {
            id,
            building_type: building.key.clone(),
            position,
            progress: 0.0,
            build_time: building.build_time,
            queued_at,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.build_time
    }
}

/// A finished building. Keeps the catalog entry it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building_type: String,
    pub position: Vec3,
    pub completed_at: f64,
    pub kind: BuildingType,
}

/// Backlog entry any idle villager in any settlement can claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub kind: String,
    /// Opaque data for whoever posted the order
    pub payload: String,
    pub priority: i32,
    pub created_at: f64,
    /// Seconds of work before the order counts as done
    pub work_time: f32,
}

impl WorkOrder {
    pub fn new(kind: impl Into<String>, priority: i32, created_at: f64) -> Self {
        Self {
            kind: kind.into(),
            payload: String::new(),
            priority,
            created_at,
            work_time: 10.0,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_work_time(mut self, seconds: f32) -> Self {
        self.work_time = seconds.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_build_order_progress() {
        let catalog = Catalog::standard();
        let hut = catalog.building("hut").unwrap();
        let mut order = BuildOrder::new(BuildOrderId(1), hut, Vec3::ZERO, 0.0);
        assert!(!order.is_complete());

        order.progress = hut.build_time / 2.0;
        assert!(!order.is_complete());

        order.progress = hut.build_time;
        assert!(order.is_complete());
    }

    #[test]
    fn test_work_order_builder() {
        let order = WorkOrder::new("haul", 5, 12.0)
            .with_payload("granary")
            .with_work_time(-3.0);
        assert_eq!(order.kind, "haul");
        assert_eq!(order.payload, "granary");
        assert_eq!(order.work_time, 0.0);
    }
}
