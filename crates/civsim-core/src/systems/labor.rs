//! Labor allocation - greedy auto-assignment of idle villagers
//!
//! Villagers are visited in roster order and each assignment updates the
//! counts seen by the next villager, so the result depends on that order.
//! For each idle villager with no task:
//! 1. builder, if the build queue is non-empty and builders < `max_builders`
//! 2. farmer, if farmers < farm buildings
//! 3. gatherer otherwise. Topping gatherers up to three and the unbounded
//!    default both land here.

use hecs::World;

use crate::components::{Assignment, Profession, Task};
use crate::config::SimConfig;
use crate::settlement::Settlement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaborPolicy {
    pub max_builders: usize,
}

impl LaborPolicy {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            max_builders: config.max_builders,
        }
    }
}

impl Default for LaborPolicy {
    fn default() -> Self {
        Self { max_builders: 2 }
    }
}

/// Running head counts used by the greedy choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaborCounts {
    pub builders: usize,
    pub farmers: usize,
    pub gatherers: usize,
    /// Finished buildings that employ farmers
    pub farms: usize,
}

impl LaborCounts {
    pub fn survey(world: &World, settlement: &Settlement) -> Self {
        let mut counts = Self {
            farms: settlement
                .buildings
                .iter()
                .filter(|b| b.kind.employs(Profession::Farmer))
                .count(),
            ..Self::default()
        };
        for &entity in &settlement.villagers {
            if let Ok(profession) = world.get::<&Profession>(entity) {
                counts.record(*profession);
            }
        }
        counts
    }

    fn record(&mut self, profession: Profession) {
        match profession {
            Profession::Builder => self.builders += 1,
            Profession::Farmer => self.farmers += 1,
            Profession::Gatherer => self.gatherers += 1,
            _ => {}
        }
    }
}

/// Pick a profession for one idle villager
pub fn choose_profession(counts: &LaborCounts, has_queued_work: bool, policy: &LaborPolicy) -> Profession {
    if has_queued_work && counts.builders < policy.max_builders {
        Profession::Builder
    } else if counts.farmers < counts.farms {
        Profession::Farmer
    } else {
        Profession::Gatherer
    }
}

/// Assign every idle, task-free villager. Returns how many were assigned.
pub fn auto_assign(world: &mut World, settlement: &Settlement, policy: &LaborPolicy) -> usize {
    let mut counts = LaborCounts::survey(world, settlement);
    let head = settlement.build_queue.front().map(|o| o.id);
    let farm_key = settlement
        .buildings
        .iter()
        .find(|b| b.kind.employs(Profession::Farmer))
        .map(|b| b.building_type.clone());

    let mut assigned = 0;
    for &entity in &settlement.villagers {
        let Ok((profession, assignment)) =
            world.query_one_mut::<(&mut Profession, &mut Assignment)>(entity)
        else {
            continue;
        };
        if *profession != Profession::Idle || !assignment.is_free() {
            continue;
        }

        let choice = choose_profession(&counts, head.is_some(), policy);
        *profession = choice;
        match choice {
            Profession::Builder => assignment.task = head.map(Task::Construct),
            Profession::Farmer => assignment.workplace = farm_key.clone(),
            _ => {}
        }
        counts.record(choice);
        assigned += 1;
    }

    if assigned > 0 {
        log::debug!(
            "Settlement {} assigned {} villagers (builders={}, farmers={}, gatherers={})",
            settlement.id,
            assigned,
            counts.builders,
            counts.farmers,
            counts.gatherers
        );
    }
    assigned
}
