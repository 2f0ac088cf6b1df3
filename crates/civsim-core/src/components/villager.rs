//! Villager components: identity, profession, assignment, task timers.

use serde::{Deserialize, Serialize};

use super::common::{Name, Vec3};
use super::ids::{BuildOrderId, SettlementId, VillagerId};
use super::orders::WorkOrder;
use super::resources::ResourceKind;

/// Identity component - which settlement a villager belongs to and where it arrived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub id: VillagerId,
    pub name: Name,
    pub settlement: SettlementId,
    pub position: Vec3,
    /// Handle returned by the external villager factory
    pub handle: Option<u64>,
    /// Simulation time (seconds) the villager joined
    pub joined_at: f64,
}

/// A villager's labor role. Exactly one at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    #[default]
    Idle,
    Gatherer,
    Farmer,
    Miner,
    Crafter,
    Builder,
    Guard,
    Hunter,
}

/// What a profession's timer produces when it fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskYield {
    /// One kind drawn uniformly from `kinds`, amount uniform in `min..=max`
    Random {
        kinds: &'static [ResourceKind],
        min: u32,
        max: u32,
    },
    /// Fixed bundle
    Fixed(&'static [(ResourceKind, f32)]),
}

/// Timer-driven behaviour attached to a profession
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskCycle {
    /// Seconds of accumulated work per yield
    pub interval: f32,
    pub output: TaskYield,
}

const GATHER_KINDS: &[ResourceKind] = &[ResourceKind::Wood, ResourceKind::Stone, ResourceKind::Food];
const FARM_YIELD: &[(ResourceKind, f32)] = &[(ResourceKind::Food, 5.0)];
const MINE_YIELD: &[(ResourceKind, f32)] = &[(ResourceKind::Ore, 2.0), (ResourceKind::Stone, 1.0)];

impl Profession {
    pub const ALL: [Profession; 8] = [
        Profession::Idle,
        Profession::Gatherer,
        Profession::Farmer,
        Profession::Miner,
        Profession::Crafter,
        Profession::Builder,
        Profession::Guard,
        Profession::Hunter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Profession::Idle => "Idle",
            Profession::Gatherer => "Gatherer",
            Profession::Farmer => "Farmer",
            Profession::Miner => "Miner",
            Profession::Crafter => "Crafter",
            Profession::Builder => "Builder",
            Profession::Guard => "Guard",
            Profession::Hunter => "Hunter",
        }
    }

    /// Per-villager timed output. Builders work through construction speed,
    /// guards and hunters have no timed output yet.
    pub fn task_cycle(&self) -> Option<TaskCycle> {
        match self {
            Profession::Gatherer => Some(TaskCycle {
                interval: 10.0,
                output: TaskYield::Random {
                    kinds: GATHER_KINDS,
                    min: 1,
                    max: 3,
                },
            }),
            Profession::Farmer => Some(TaskCycle {
                interval: 15.0,
                output: TaskYield::Fixed(FARM_YIELD),
            }),
            Profession::Miner => Some(TaskCycle {
                interval: 20.0,
                output: TaskYield::Fixed(MINE_YIELD),
            }),
            Profession::Idle
            | Profession::Crafter
            | Profession::Builder
            | Profession::Guard
            | Profession::Hunter => None,
        }
    }
}

/// What a villager is currently busy with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    /// Working on a queued building
    Construct(BuildOrderId),
    /// Claimed from the civilization's work order queue
    WorkOrder { order: WorkOrder, elapsed: f32 },
}

impl Task {
    pub fn constructs(&self, order: BuildOrderId) -> bool {
        matches!(self, Task::Construct(id) if *id == order)
    }
}

/// Current task and workplace of a villager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub task: Option<Task>,
    /// Building type key whose production this villager staffs
    pub workplace: Option<String>,
}

impl Assignment {
    pub fn is_free(&self) -> bool {
        self.task.is_none()
    }
}

/// Accumulated work time per timed task
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTimers {
    pub gather: f32,
    pub farm: f32,
    pub mine: f32,
}

impl TaskTimers {
    /// Timer driving the given profession's cycle
    pub fn for_profession(&mut self, profession: Profession) -> Option<&mut f32> {
        match profession {
            Profession::Gatherer => Some(&mut self.gather),
            Profession::Farmer => Some(&mut self.farm),
            Profession::Miner => Some(&mut self.mine),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_match_timers() {
        let mut timers = TaskTimers::default();
        for profession in Profession::ALL {
            assert_eq!(
                profession.task_cycle().is_some(),
                timers.for_profession(profession).is_some(),
                "{} cycle/timer mismatch",
                profession.name()
            );
        }
    }

    #[test]
    fn test_farmer_cycle() {
        let cycle = Profession::Farmer.task_cycle().unwrap();
        assert_eq!(cycle.interval, 15.0);
        assert_eq!(cycle.output, TaskYield::Fixed(&[(ResourceKind::Food, 5.0)]));
    }

    #[test]
    fn test_task_constructs() {
        let task = Task::Construct(BuildOrderId(3));
        assert!(task.constructs(BuildOrderId(3)));
        assert!(!task.constructs(BuildOrderId(4)));
    }
}
