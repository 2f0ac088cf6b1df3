//! Task execution - per-villager profession timers and claimed work orders

use hecs::World;
use rand::Rng;

use crate::components::{Assignment, Profession, ResourceTally, Task, TaskTimers, TaskYield, WorkOrder};
use crate::settlement::Settlement;

/// Accumulate `delta` on the profession's timer; yield once when it reaches the interval.
pub fn run_cycle(
    profession: Profession,
    timers: &mut TaskTimers,
    delta: f32,
    rng: &mut impl Rng,
) -> ResourceTally {
    let mut tally = ResourceTally::new();
    let (Some(cycle), Some(timer)) = (profession.task_cycle(), timers.for_profession(profession))
    else {
        return tally;
    };

    *timer += delta;
    if *timer < cycle.interval {
        return tally;
    }
    *timer = 0.0;

    match cycle.output {
        TaskYield::Random { kinds, min, max } => {
            if !kinds.is_empty() {
                let kind = kinds[rng.gen_range(0..kinds.len())];
                let amount = rng.gen_range(min..=max);
                tally.add(kind, amount as f32);
            }
        }
        TaskYield::Fixed(bundle) => {
            for &(kind, amount) in bundle {
                tally.add(kind, amount);
            }
        }
    }
    tally
}

/// Run every villager's task for one tick, in roster order.
///
/// Returns the resources produced and the work orders finished this tick.
pub fn execute_tasks(
    world: &mut World,
    settlement: &Settlement,
    delta: f32,
    rng: &mut impl Rng,
) -> (ResourceTally, Vec<WorkOrder>) {
    let mut yields = ResourceTally::new();
    let mut finished = Vec::new();

    for &entity in &settlement.villagers {
        let Ok((profession, assignment, timers)) =
            world.query_one_mut::<(&Profession, &mut Assignment, &mut TaskTimers)>(entity)
        else {
            continue;
        };

        yields.merge(&run_cycle(*profession, timers, delta, rng));

        if let Some(Task::WorkOrder { order, elapsed }) = assignment.task.as_mut() {
            *elapsed += delta;
            if *elapsed >= order.work_time {
                if let Some(Task::WorkOrder { order, .. }) = assignment.task.take() {
                    finished.push(order);
                }
            }
        }
    }

    (yields, finished)
}
