//! Construction system - advances the head of a settlement's build queue

use hecs::World;

use crate::catalog::Catalog;
use crate::components::{Assignment, BuildOrderId, Building, Profession, Task};
use crate::host::WorldHost;
use crate::settlement::Settlement;

/// Builders whose current task references `order`
pub fn builders_on(world: &World, settlement: &Settlement, order: BuildOrderId) -> usize {
    settlement
        .villagers
        .iter()
        .filter(|&&entity| {
            let Ok(mut query) = world.query_one::<(&Profession, &Assignment)>(entity) else {
                return false;
            };
            query.get().is_some_and(|(profession, assignment)| {
                *profession == Profession::Builder
                    && assignment.task.as_ref().is_some_and(|t| t.constructs(order))
            })
        })
        .count()
}

/// Advance only the head order. Returns the finished building when the head completes.
///
/// Progress per tick is `delta * (1 + bonus * builders)`. On completion the
/// footprint is placed through the world host before the building is returned.
pub fn advance_construction(
    world: &mut World,
    settlement: &mut Settlement,
    catalog: &Catalog,
    delta: f32,
    builder_bonus: f32,
    sim_time: f64,
    host: &mut dyn WorldHost,
) -> Option<Building> {
    let head_id = settlement.build_queue.front()?.id;
    let builders = builders_on(world, settlement, head_id);

    let head = settlement.build_queue.front_mut()?;
    head.progress += delta * (1.0 + builder_bonus * builders as f32);
    if !head.is_complete() {
        return None;
    }

    let order = settlement.build_queue.pop_front()?;
    let next_head = settlement.build_queue.front().map(|o| o.id);
    release_builders(world, settlement, order.id, next_head);

    let Some(kind) = catalog.building(&order.building_type) else {
        log::warn!(
            "Settlement {} dropped build order {} for unknown type `{}`",
            settlement.id,
            order.id,
            order.building_type
        );
        return None;
    };

    let building = Building {
        building_type: order.building_type,
        position: order.position,
        completed_at: sim_time,
        kind: kind.clone(),
    };
    place_footprint(host, &building);
    settlement.buildings.push(building.clone());
    Some(building)
}

/// Move builders off a finished order: onto the next head, or back to idle
fn release_builders(
    world: &mut World,
    settlement: &Settlement,
    finished: BuildOrderId,
    next: Option<BuildOrderId>,
) {
    for &entity in &settlement.villagers {
        let Ok((profession, assignment)) =
            world.query_one_mut::<(&mut Profession, &mut Assignment)>(entity)
        else {
            continue;
        };
        if !assignment.task.as_ref().is_some_and(|t| t.constructs(finished)) {
            continue;
        }
        match next {
            Some(next_id) => assignment.task = Some(Task::Construct(next_id)),
            None => {
                assignment.task = None;
                *profession = Profession::Idle;
            }
        }
    }
}

/// Lay the building's ground blocks, following terrain height where the host knows it
pub fn place_footprint(host: &mut dyn WorldHost, building: &Building) {
    let origin = building.position;
    for dx in 0..building.kind.size.width {
        for dz in 0..building.kind.size.depth {
            let x = origin.x + dx as f32;
            let z = origin.z + dz as f32;
            let y = host.height_at(x, z).unwrap_or(origin.y);
            host.set_block(
                x.floor() as i32,
                y.floor() as i32,
                z.floor() as i32,
                building.kind.block,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BlockKind, BuildOrder, SettlementId, TaskTimers, Vec3};
    use crate::host::NoWorld;

    #[derive(Default)]
    struct BlockRecorder {
        placed: Vec<(i32, i32, i32, BlockKind)>,
    }

    impl WorldHost for BlockRecorder {
        fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
            Some(7.0)
        }

        fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockKind) {
            self.placed.push((x, y, z, block));
        }
    }

    fn settlement_with_order(catalog: &Catalog, key: &str) -> Settlement {
        let mut settlement = Settlement::new(SettlementId(1), "Test", Vec3::ZERO, 20.0, 0.0);
        let kind = catalog.building(key).unwrap();
        settlement
            .build_queue
            .push_back(BuildOrder::new(BuildOrderId(1), kind, Vec3::new(2.0, 0.0, 3.0), 0.0));
        settlement
    }

    fn spawn(world: &mut World, settlement: &mut Settlement, profession: Profession, task: Option<Task>) {
        let entity = world.spawn((
            profession,
            Assignment {
                task,
                workplace: None,
            },
            TaskTimers::default(),
        ));
        settlement.villagers.push(entity);
    }

    #[test]
    fn test_progress_without_builders() {
        let catalog = Catalog::standard();
        let mut world = World::new();
        let mut settlement = settlement_with_order(&catalog, "hut");

        let done = advance_construction(&mut world, &mut settlement, &catalog, 5.0, 0.5, 5.0, &mut NoWorld);
        assert!(done.is_none());
        assert_eq!(settlement.build_queue[0].progress, 5.0);
    }

    #[test]
    fn test_builders_speed_up_head_only() {
        let catalog = Catalog::standard();
        let mut world = World::new();
        let mut settlement = settlement_with_order(&catalog, "hut");
        let hut = catalog.building("hut").unwrap();
        settlement
            .build_queue
            .push_back(BuildOrder::new(BuildOrderId(2), hut, Vec3::ZERO, 0.0));

        spawn(&mut world, &mut settlement, Profession::Builder, Some(Task::Construct(BuildOrderId(1))));
        spawn(&mut world, &mut settlement, Profession::Builder, Some(Task::Construct(BuildOrderId(1))));
        // Not a builder, does not count
        spawn(&mut world, &mut settlement, Profession::Gatherer, Some(Task::Construct(BuildOrderId(1))));

        advance_construction(&mut world, &mut settlement, &catalog, 2.0, 0.5, 2.0, &mut NoWorld);
        assert_eq!(settlement.build_queue[0].progress, 4.0);
        assert_eq!(settlement.build_queue[1].progress, 0.0);
    }

    #[test]
    fn test_completion_places_footprint_and_releases_builders() {
        let catalog = Catalog::standard();
        let mut world = World::new();
        let mut settlement = settlement_with_order(&catalog, "farm_plot");
        spawn(&mut world, &mut settlement, Profession::Builder, Some(Task::Construct(BuildOrderId(1))));

        let mut host = BlockRecorder::default();
        let built = advance_construction(&mut world, &mut settlement, &catalog, 100.0, 0.5, 42.0, &mut host)
            .expect("farm should complete");

        assert_eq!(built.building_type, "farm_plot");
        assert_eq!(built.completed_at, 42.0);
        assert!(settlement.build_queue.is_empty());
        assert_eq!(settlement.buildings.len(), 1);

        // 4x4 farm footprint at terrain height 7
        assert_eq!(host.placed.len(), 16);
        assert!(host.placed.iter().all(|&(_, y, _, b)| y == 7 && b == BlockKind::Farmland));
        assert!(host.placed.contains(&(2, 7, 3, BlockKind::Farmland)));
        assert!(host.placed.contains(&(5, 7, 6, BlockKind::Farmland)));

        let entity = settlement.villagers[0];
        assert_eq!(*world.get::<&Profession>(entity).unwrap(), Profession::Idle);
        assert!(world.get::<&Assignment>(entity).unwrap().task.is_none());
    }

    #[test]
    fn test_builders_move_to_next_order() {
        let catalog = Catalog::standard();
        let mut world = World::new();
        let mut settlement = settlement_with_order(&catalog, "campfire");
        let hut = catalog.building("hut").unwrap();
        settlement
            .build_queue
            .push_back(BuildOrder::new(BuildOrderId(2), hut, Vec3::ZERO, 0.0));
        spawn(&mut world, &mut settlement, Profession::Builder, Some(Task::Construct(BuildOrderId(1))));

        advance_construction(&mut world, &mut settlement, &catalog, 100.0, 0.5, 1.0, &mut NoWorld);

        let entity = settlement.villagers[0];
        assert_eq!(*world.get::<&Profession>(entity).unwrap(), Profession::Builder);
        assert_eq!(
            world.get::<&Assignment>(entity).unwrap().task,
            Some(Task::Construct(BuildOrderId(2)))
        );
    }
}
