//! Civilization engine - main entry point for running the simulation
//!
//! `Civilization::update` is the only place time advances. Each call:
//! 1. accumulates the production, growth and happiness timers and runs any
//!    pass whose interval elapsed
//! 2. updates every settlement in id order (construction, labor, tasks)
//! 3. hands queued work orders to idle villagers
//! 4. checks milestones

use hecs::{Entity, World};
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Age, Catalog, Technology};
use crate::components::*;
use crate::config::SimConfig;
use crate::error::ActionError;
use crate::generation::generate_name;
use crate::host::{CivEvent, Hosts};
use crate::settlement::{Settlement, SettlementReport, TickContext};
use crate::systems::*;
use crate::SimRng;

/// Read-only snapshot for UI polling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CivStats {
    pub population: u32,
    /// Happiness rounded to the nearest whole point
    pub happiness: u32,
    pub resources: BTreeMap<ResourceKind, f32>,
    pub research_points: u32,
    pub age: Age,
    pub settlements: usize,
    pub technologies: usize,
    pub milestones: usize,
    /// Storage provided by finished buildings across every settlement
    pub storage_capacity: f32,
}

/// One roster entry, in roster order
#[derive(Debug, Clone, PartialEq)]
pub struct VillagerInfo {
    pub entity: Entity,
    pub id: VillagerId,
    pub name: String,
    pub profession: Profession,
    pub task: Option<Task>,
    pub workplace: Option<String>,
}

/// The civilization: global stockpile, technology, milestones, work orders
/// and every settlement
pub struct Civilization {
    /// ECS world holding every villager
    pub(crate) world: World,
    pub(crate) catalog: Catalog,
    pub(crate) config: SimConfig,
    pub(crate) hosts: Hosts,
    pub(crate) rng: SimRng,

    pub(crate) stockpile: Stockpile,
    pub(crate) research_points: u32,
    pub(crate) unlocked: BTreeSet<String>,
    pub(crate) current_age: Age,
    pub(crate) milestones: BTreeSet<Milestone>,
    pub(crate) work_orders: WorkOrderQueue,
    pub(crate) settlements: BTreeMap<SettlementId, Settlement>,
    /// Always equal to the summed roster lengths
    pub(crate) population: u32,
    pub(crate) happiness: f32,
    /// Seconds since the civilization started
    pub(crate) sim_time: f64,

    // Pass timers
    pub(crate) production_timer: f32,
    pub(crate) happiness_timer: f32,
    pub(crate) growth_timer: f32,

    // Id counters
    pub(crate) next_settlement_id: u32,
    pub(crate) next_villager_id: u32,
    pub(crate) next_build_order_id: u32,

    events: Vec<CivEvent>,
}

impl Civilization {
    /// Create a civilization with no settlements and headless collaborators
    pub fn new(catalog: Catalog, config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_entropy(),
        };
        let mut unlocked = BTreeSet::new();
        unlocked.insert(catalog.starting_technology().to_string());

        Self {
            world: World::new(),
            stockpile: Stockpile::from_amounts(&config.starting_resources),
            happiness: config.initial_happiness.clamp(0.0, 100.0),
            catalog,
            config,
            hosts: Hosts::default(),
            rng,
            research_points: 0,
            unlocked,
            current_age: Age::Stone,
            milestones: BTreeSet::new(),
            work_orders: WorkOrderQueue::new(),
            settlements: BTreeMap::new(),
            population: 0,
            sim_time: 0.0,
            production_timer: 0.0,
            happiness_timer: 0.0,
            growth_timer: 0.0,
            next_settlement_id: 1,
            next_villager_id: 1,
            next_build_order_id: 1,
            events: Vec::new(),
        }
    }

    /// Attach world, villager factory and notifier
    pub fn with_hosts(mut self, hosts: Hosts) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn set_hosts(&mut self, hosts: Hosts) {
        self.hosts = hosts;
    }

    /// Advance the simulation by `delta_seconds`. Non-positive or
    /// non-finite deltas are ignored.
    pub fn update(&mut self, delta_seconds: f32) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        self.sim_time += delta_seconds as f64;

        // Timers reset to zero: overshoot is dropped and each pass runs at
        // most once per update.
        self.production_timer += delta_seconds;
        if self.production_timer >= self.config.production_interval {
            self.production_timer = 0.0;
            self.run_production_pass();
        }

        self.growth_timer += delta_seconds;
        if self.growth_timer >= self.config.growth_interval {
            self.growth_timer = 0.0;
            self.run_growth_pass();
        }

        self.happiness_timer += delta_seconds;
        if self.happiness_timer >= self.config.happiness_interval {
            self.happiness_timer = 0.0;
            self.run_happiness_pass();
        }

        self.update_settlements(delta_seconds);

        let claimed = dispatch_work_orders(
            &mut self.world,
            self.settlements.values(),
            &mut self.work_orders,
        );
        if claimed > 0 {
            log::debug!("{} work orders claimed, {} pending", claimed, self.work_orders.len());
        }

        self.check_milestones();
    }

    fn update_settlements(&mut self, delta: f32) {
        let mut reports: Vec<(SettlementId, SettlementReport)> =
            Vec::with_capacity(self.settlements.len());

        for (id, settlement) in self.settlements.iter_mut() {
            let mut ctx = TickContext {
                world: &mut self.world,
                catalog: &self.catalog,
                config: &self.config,
                rng: &mut self.rng,
                host: self.hosts.world.as_mut(),
                sim_time: self.sim_time,
                delta,
            };
            reports.push((*id, settlement.update(&mut ctx)));
        }

        for (settlement, report) in reports {
            self.stockpile.credit_all(&report.yields);
            for building in report.completed {
                log::info!(
                    "Settlement {} completed {} at ({:.1}, {:.1}, {:.1})",
                    settlement,
                    building.building_type,
                    building.position.x,
                    building.position.y,
                    building.position.z
                );
                self.emit(CivEvent::BuildingCompleted {
                    settlement,
                    building: building.building_type,
                    position: building.position,
                });
            }
            for order in report.finished_work {
                log::info!("Settlement {} finished work order `{}`", settlement, order.kind);
                self.emit(CivEvent::WorkOrderCompleted { settlement, order });
            }
        }
    }

    /// Credit building output and research, then feed the population
    pub fn run_production_pass(&mut self) {
        let mut produced = ResourceTally::new();
        let mut research = 0u32;
        for settlement in self.settlements.values() {
            let output = settlement_output(&self.world, settlement);
            produced.merge(&output.resources);
            research = research.saturating_add(output.research);
        }
        self.stockpile.credit_all(&produced);
        self.research_points = self.research_points.saturating_add(research);

        let starving = consume_food(&mut self.stockpile, self.population, self.config.food_per_capita);
        if starving {
            self.happiness = apply_starvation(self.happiness, self.config.starvation_penalty);
            log::warn!(
                "Food stores empty (population {}), happiness down to {:.1}",
                self.population,
                self.happiness
            );
            self.emit(CivEvent::Starvation);
        }
    }

    /// Recompute the happiness target and blend it into the running value
    pub fn run_happiness_pass(&mut self) {
        let inputs = HappinessInputs {
            food: self.stockpile.get(ResourceKind::Food),
            population: self.population,
            housing_capacity: self.housing_capacity(),
            building_effects: self
                .settlements
                .values()
                .map(|s| s.building_happiness())
                .sum(),
        };
        let target = target_happiness(&inputs);
        self.happiness = blend(self.happiness, target);
        log::debug!("Happiness {:.1} (target {:.1})", self.happiness, target);
    }

    /// One growth trial per eligible settlement
    pub fn run_growth_pass(&mut self) {
        let ids: Vec<SettlementId> = self.settlements.keys().copied().collect();
        for id in ids {
            let Some(settlement) = self.settlements.get(&id) else {
                continue;
            };
            let eligible = can_grow(
                settlement.population(),
                settlement.housing_capacity(self.config.base_housing),
                self.happiness,
                self.stockpile.get(ResourceKind::Food),
                self.population,
            );
            if eligible && roll_growth(&mut self.rng, self.config.growth_chance) {
                if let Err(err) = self.spawn_villager(id) {
                    log::debug!("Growth in settlement {} skipped: {}", id, err);
                }
            }
        }
    }

    /// Found a settlement and recruit the configured founding villagers
    pub fn found_settlement(&mut self, name: impl Into<String>, center: Vec3, radius: f32) -> SettlementId {
        let id = SettlementId(self.next_settlement_id);
        self.next_settlement_id += 1;

        let settlement = Settlement::new(id, name, center, radius, self.sim_time);
        log::info!(
            "Founded settlement {} `{}` at ({:.1}, {:.1})",
            id,
            settlement.name,
            center.x,
            center.z
        );
        self.settlements.insert(id, settlement);

        for _ in 0..self.config.founding_villagers {
            if let Err(err) = self.spawn_villager(id) {
                log::debug!("Founding villager for settlement {} skipped: {}", id, err);
            }
        }
        id
    }

    /// Add one idle villager to a settlement
    pub fn recruit_villager(&mut self, settlement: SettlementId) -> Result<VillagerId, ActionError> {
        self.spawn_villager(settlement)
    }

    fn spawn_villager(&mut self, settlement_id: SettlementId) -> Result<VillagerId, ActionError> {
        let center = self
            .settlements
            .get(&settlement_id)
            .map(|s| s.center)
            .ok_or(ActionError::UnknownSettlement(settlement_id))?;

        let position = self.hosts.world.safe_spawn_point(center).unwrap_or(center);
        let handle = self
            .hosts
            .villagers
            .create_villager(settlement_id, position)
            .ok_or(ActionError::SpawnDeclined)?;

        let id = VillagerId(self.next_villager_id);
        self.next_villager_id += 1;
        let villager = Villager {
            id,
            name: generate_name(&mut self.rng),
            settlement: settlement_id,
            position,
            handle: Some(handle),
            joined_at: self.sim_time,
        };
        log::info!(
            "{} joined settlement {}",
            villager.name.full_name(),
            settlement_id
        );

        let entity = self.world.spawn((
            villager,
            Profession::Idle,
            Assignment::default(),
            TaskTimers::default(),
        ));
        if let Some(settlement) = self.settlements.get_mut(&settlement_id) {
            settlement.villagers.push(entity);
        }
        self.population += 1;
        self.emit(CivEvent::VillagerJoined {
            settlement: settlement_id,
            villager: id,
        });
        Ok(id)
    }

    /// Why a building type can or cannot be built right now
    pub fn building_availability(&self, key: &str) -> Result<(), ActionError> {
        let building = self
            .catalog
            .building(key)
            .ok_or_else(|| ActionError::UnknownBuilding(key.to_string()))?;

        if building.age > self.current_age {
            return Err(ActionError::AgeLocked {
                key: key.to_string(),
                required: building.age,
            });
        }
        if let Some(tech) = self
            .catalog
            .gating_technologies(key)
            .find(|t| !self.unlocked.contains(&t.key))
        {
            return Err(ActionError::TechnologyLocked {
                key: key.to_string(),
                technology: tech.key.clone(),
            });
        }
        if !self.stockpile.can_afford(&building.cost) {
            return Err(ActionError::InsufficientResources {
                key: key.to_string(),
                missing: self.stockpile.missing(&building.cost),
            });
        }
        Ok(())
    }

    /// Age, technology gate and affordability all pass
    pub fn can_build_building(&self, key: &str) -> bool {
        self.building_availability(key).is_ok()
    }

    /// Queue a building, paying its cost now. Construction cannot be cancelled.
    pub fn queue_building(
        &mut self,
        settlement: SettlementId,
        key: &str,
        position: Vec3,
    ) -> Result<BuildOrderId, ActionError> {
        if !self.settlements.contains_key(&settlement) {
            return Err(ActionError::UnknownSettlement(settlement));
        }
        if let Err(err) = self.building_availability(key) {
            log::debug!("Cannot queue `{}` in settlement {}: {}", key, settlement, err);
            if let ActionError::InsufficientResources { key, missing } = &err {
                self.emit(CivEvent::InsufficientResources {
                    building: key.clone(),
                    missing: missing.clone(),
                });
            }
            return Err(err);
        }
        let building = self
            .catalog
            .building(key)
            .ok_or_else(|| ActionError::UnknownBuilding(key.to_string()))?;

        let id = BuildOrderId(self.next_build_order_id);
        let order = BuildOrder::new(id, building, position, self.sim_time);
        self.stockpile.spend(&building.cost);
        self.next_build_order_id += 1;

        let Some(target) = self.settlements.get_mut(&settlement) else {
            return Err(ActionError::UnknownSettlement(settlement));
        };
        target.build_queue.push_back(order);
        if target.build_queue.len() == 1 {
            // Builders left without a target pick up the new head
            for &entity in &target.villagers {
                if let Ok((profession, assignment)) =
                    self.world.query_one_mut::<(&Profession, &mut Assignment)>(entity)
                {
                    if *profession == Profession::Builder && assignment.is_free() {
                        assignment.task = Some(Task::Construct(id));
                    }
                }
            }
        }

        log::info!("Settlement {} queued {} (order {})", settlement, key, id);
        self.emit(CivEvent::BuildingQueued {
            settlement,
            building: key.to_string(),
        });
        Ok(id)
    }

    /// Unlock a technology. Either the cost is paid and the key added, or nothing changes.
    pub fn unlock_technology(&mut self, key: &str) -> Result<(), ActionError> {
        let tech = self
            .catalog
            .technology(key)
            .ok_or_else(|| ActionError::UnknownTechnology(key.to_string()))?;

        if self.unlocked.contains(key) {
            return Err(ActionError::AlreadyUnlocked(key.to_string()));
        }
        if let Some(missing) = tech
            .prerequisites
            .iter()
            .find(|p| !self.unlocked.contains(p.as_str()))
        {
            return Err(ActionError::MissingPrerequisite {
                key: key.to_string(),
                prerequisite: missing.clone(),
            });
        }
        if self.research_points < tech.cost {
            let (cost, available) = (tech.cost, self.research_points);
            self.emit(CivEvent::InsufficientResearch {
                technology: key.to_string(),
                cost,
                available,
            });
            return Err(ActionError::InsufficientResearch {
                key: key.to_string(),
                cost,
                available,
            });
        }

        let cost = tech.cost;
        let advances_to = tech.unlocks.advances_to;
        self.research_points -= cost;
        self.unlocked.insert(key.to_string());
        log::info!("Unlocked technology {} for {} research", key, cost);
        self.emit(CivEvent::TechnologyUnlocked {
            technology: key.to_string(),
        });

        if let Some(age) = advances_to {
            if age > self.current_age {
                self.current_age = age;
                log::info!("Civilization entered the {} age", age);
                self.emit(CivEvent::AgeAdvanced { age });
            }
        }
        Ok(())
    }

    pub fn is_technology_unlocked(&self, key: &str) -> bool {
        self.unlocked.contains(key)
    }

    /// Whether any unlocked technology lists `feature` under `unlocks.features`
    pub fn is_feature_unlocked(&self, feature: &str) -> bool {
        self.unlocked
            .iter()
            .filter_map(|key| self.catalog.technology(key))
            .any(|t| t.unlocks.features.iter().any(|f| f == feature))
    }

    /// Locked technologies whose prerequisites are met and whose age has been reached
    pub fn available_technologies(&self) -> Vec<&Technology> {
        self.catalog
            .technologies()
            .filter(|t| !self.unlocked.contains(&t.key))
            .filter(|t| t.age <= self.current_age)
            .filter(|t| t.prerequisites.iter().all(|p| self.unlocked.contains(p)))
            .collect()
    }

    /// Add an order to the civilization-wide backlog
    pub fn post_work_order(&mut self, order: WorkOrder) {
        log::debug!("Work order `{}` posted (priority {})", order.kind, order.priority);
        self.work_orders.push(order);
    }

    /// Manually set a villager's profession. Changing profession clears the
    /// workplace; becoming a builder targets the head build order.
    pub fn assign_profession(
        &mut self,
        settlement: SettlementId,
        index: usize,
        profession: Profession,
    ) -> Result<(), ActionError> {
        let entity = self.villager_entity(settlement, index)?;
        let head = self
            .settlements
            .get(&settlement)
            .and_then(|s| s.build_queue.front())
            .map(|o| o.id);

        let (current, assignment) = self
            .world
            .query_one_mut::<(&mut Profession, &mut Assignment)>(entity)
            .map_err(|_| ActionError::UnknownVillager { settlement, index })?;

        if *current != profession {
            assignment.workplace = None;
        }
        *current = profession;
        let on_work_order = matches!(assignment.task, Some(Task::WorkOrder { .. }));
        if profession == Profession::Builder {
            if !on_work_order {
                assignment.task = head.map(Task::Construct);
            }
        } else if matches!(assignment.task, Some(Task::Construct(_))) {
            assignment.task = None;
        }
        log::debug!(
            "Settlement {} villager {} is now a {}",
            settlement,
            index,
            profession.name()
        );
        Ok(())
    }

    /// Staff a building type. Rejected when every work slot of that type in
    /// the settlement is taken.
    pub fn assign_workplace(
        &mut self,
        settlement: SettlementId,
        index: usize,
        building: &str,
    ) -> Result<(), ActionError> {
        let entity = self.villager_entity(settlement, index)?;
        if self.catalog.building(building).is_none() {
            return Err(ActionError::UnknownBuilding(building.to_string()));
        }

        let already_there = self
            .world
            .get::<&Assignment>(entity)
            .map(|a| a.workplace.as_deref() == Some(building))
            .unwrap_or(false);
        if already_there {
            return Ok(());
        }

        let Some(target) = self.settlements.get(&settlement) else {
            return Err(ActionError::UnknownSettlement(settlement));
        };
        let slots = target.work_slots(building) as usize;
        if target.workers_at(&self.world, building) >= slots {
            return Err(ActionError::NoFreeWorkSlot(building.to_string()));
        }

        let mut assignment = self
            .world
            .get::<&mut Assignment>(entity)
            .map_err(|_| ActionError::UnknownVillager { settlement, index })?;
        assignment.workplace = Some(building.to_string());
        Ok(())
    }

    fn villager_entity(&self, settlement: SettlementId, index: usize) -> Result<Entity, ActionError> {
        let target = self
            .settlements
            .get(&settlement)
            .ok_or(ActionError::UnknownSettlement(settlement))?;
        target
            .villagers
            .get(index)
            .copied()
            .ok_or(ActionError::UnknownVillager { settlement, index })
    }

    fn check_milestones(&mut self) {
        let ctx = MilestoneContext {
            population: self.population,
            buildings: self.settlements.values().map(|s| s.buildings.len()).sum(),
            food: self.stockpile.get(ResourceKind::Food),
        };
        for milestone in newly_reached(&self.milestones, &ctx) {
            self.milestones.insert(milestone);
            let reward = milestone.reward();
            self.research_points = self.research_points.saturating_add(reward);
            log::info!("Milestone reached: {} (+{} research)", milestone.key(), reward);
            self.emit(CivEvent::MilestoneReached { milestone, reward });
        }
    }

    fn emit(&mut self, event: CivEvent) {
        self.hosts.notifier.notify(&event);
        self.events.push(event);
    }

    /// Events emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<CivEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_research_points(&mut self, points: u32) {
        self.research_points = self.research_points.saturating_add(points);
    }

    /// Override the running happiness, clamped to [0, 100]
    pub fn set_happiness(&mut self, happiness: f32) {
        self.happiness = happiness.clamp(0.0, 100.0);
    }

    pub fn can_afford(&self, costs: &ResourceCost) -> bool {
        self.stockpile.can_afford(costs)
    }

    /// Unconditional; check `can_afford` first
    pub fn spend_resources(&mut self, costs: &ResourceCost) {
        self.stockpile.spend(costs);
    }

    pub fn credit_resources(&mut self, kind: ResourceKind, amount: f32) {
        self.stockpile.credit(kind, amount);
    }

    pub fn stats(&self) -> CivStats {
        CivStats {
            population: self.population,
            happiness: self.happiness.round() as u32,
            resources: self.stockpile.snapshot(),
            research_points: self.research_points,
            age: self.current_age,
            settlements: self.settlements.len(),
            technologies: self.unlocked.len(),
            milestones: self.milestones.len(),
            storage_capacity: self.storage_capacity(),
        }
    }

    /// Base housing plus building housing, across every settlement
    pub fn housing_capacity(&self) -> u32 {
        self.settlements
            .values()
            .map(|s| s.housing_capacity(self.config.base_housing))
            .sum()
    }

    pub fn storage_capacity(&self) -> f32 {
        self.settlements.values().map(|s| s.storage_capacity()).sum()
    }

    /// Villagers of a settlement in roster order
    pub fn roster(&self, settlement: SettlementId) -> Result<Vec<VillagerInfo>, ActionError> {
        let target = self
            .settlements
            .get(&settlement)
            .ok_or(ActionError::UnknownSettlement(settlement))?;

        let mut roster = Vec::with_capacity(target.villagers.len());
        for &entity in &target.villagers {
            let Ok(mut query) = self
                .world
                .query_one::<(&Villager, &Profession, &Assignment)>(entity)
            else {
                continue;
            };
            if let Some((villager, profession, assignment)) = query.get() {
                roster.push(VillagerInfo {
                    entity,
                    id: villager.id,
                    name: villager.name.full_name(),
                    profession: *profession,
                    task: assignment.task.clone(),
                    workplace: assignment.workplace.clone(),
                });
            }
        }
        Ok(roster)
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stockpile(&self) -> &Stockpile {
        &self.stockpile
    }

    pub fn research_points(&self) -> u32 {
        self.research_points
    }

    pub fn happiness(&self) -> f32 {
        self.happiness
    }

    pub fn current_age(&self) -> Age {
        self.current_age
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn unlocked_technologies(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    pub fn milestones(&self) -> &BTreeSet<Milestone> {
        &self.milestones
    }

    pub fn work_orders(&self) -> &WorkOrderQueue {
        &self.work_orders
    }

    /// Simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

impl Default for Civilization {
    fn default() -> Self {
        Self::new(Catalog::standard(), SimConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VillagerFactory;

    fn civ() -> Civilization {
        Civilization::new(Catalog::standard(), SimConfig::seeded(11))
    }

    fn finished(catalog: &Catalog, key: &str) -> Building {
        Building {
            building_type: key.to_string(),
            position: Vec3::ZERO,
            completed_at: 0.0,
            kind: catalog.building(key).unwrap().clone(),
        }
    }

    struct Refusing;

    impl VillagerFactory for Refusing {
        fn create_villager(&mut self, _settlement: SettlementId, _position: Vec3) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_engine_creation() {
        let civ = civ();
        let stats = civ.stats();
        assert_eq!(stats.population, 0);
        assert_eq!(stats.happiness, 50);
        assert_eq!(stats.technologies, 1);
        assert_eq!(stats.age, Age::Stone);
        assert_eq!(civ.stockpile().get(ResourceKind::Food), 100.0);
        assert!(civ.is_technology_unlocked("foraging"));
    }

    #[test]
    fn test_found_settlement_recruits() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        assert_eq!(civ.population(), 3);
        assert_eq!(civ.settlement(id).unwrap().population(), 3);

        let joined = civ
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, CivEvent::VillagerJoined { .. }))
            .count();
        assert_eq!(joined, 3);
        assert!(civ.drain_events().is_empty());
    }

    #[test]
    fn test_declined_spawn_is_a_no_op() {
        let hosts = Hosts::default().with_villagers(Refusing);
        let mut civ = civ().with_hosts(hosts);
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        assert_eq!(civ.population(), 0);
        assert_eq!(civ.recruit_villager(id), Err(ActionError::SpawnDeclined));
    }

    #[test]
    fn test_update_ignores_bad_deltas() {
        let mut civ = civ();
        civ.update(-1.0);
        civ.update(f32::NAN);
        civ.update(0.0);
        assert_eq!(civ.sim_time(), 0.0);
    }

    #[test]
    fn test_queue_building_deducts_at_enqueue() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.queue_building(id, "hut", Vec3::new(4.0, 0.0, 4.0)).unwrap();
        assert_eq!(civ.stockpile().get(ResourceKind::Wood), 40.0);
        assert_eq!(civ.settlement(id).unwrap().build_queue.len(), 1);
    }

    #[test]
    fn test_queue_building_rejections() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);

        let err = civ.queue_building(id, "castle", Vec3::ZERO).unwrap_err();
        assert!(err.is_not_found());

        let err = civ.queue_building(id, "quarry", Vec3::ZERO).unwrap_err();
        assert_eq!(
            err,
            ActionError::AgeLocked {
                key: "quarry".into(),
                required: Age::Tribal
            }
        );

        civ.current_age = Age::Tribal;
        let err = civ.queue_building(id, "quarry", Vec3::ZERO).unwrap_err();
        assert!(matches!(err, ActionError::TechnologyLocked { ref technology, .. } if technology == "masonry"));

        assert!(matches!(
            civ.queue_building(SettlementId(99), "hut", Vec3::ZERO),
            Err(ActionError::UnknownSettlement(SettlementId(99)))
        ));
        assert_eq!(civ.stockpile().get(ResourceKind::Wood), 50.0);
    }

    #[test]
    fn test_unaffordable_building_notifies() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.drain_events();
        civ.spend_resources(&cost(&[(ResourceKind::Wood, 45.0)]));

        let err = civ.queue_building(id, "hut", Vec3::ZERO).unwrap_err();
        assert!(matches!(err, ActionError::InsufficientResources { .. }));
        assert_eq!(
            civ.drain_events(),
            vec![CivEvent::InsufficientResources {
                building: "hut".into(),
                missing: vec![(ResourceKind::Wood, 5.0)],
            }]
        );
        assert_eq!(civ.stockpile().get(ResourceKind::Wood), 5.0);
    }

    #[test]
    fn test_builders_finish_and_release() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.queue_building(id, "hut", Vec3::ZERO).unwrap();

        civ.update(1.0);
        let professions: Vec<Profession> =
            civ.roster(id).unwrap().iter().map(|v| v.profession).collect();
        assert_eq!(
            professions,
            vec![Profession::Builder, Profession::Builder, Profession::Gatherer]
        );

        // 1s solo, then 2s of progress per tick with two builders
        for _ in 0..10 {
            civ.update(1.0);
        }
        let settlement = civ.settlement(id).unwrap();
        assert!(settlement.build_queue.is_empty());
        assert_eq!(settlement.count_buildings("hut"), 1);
        assert_eq!(civ.housing_capacity(), 9);
        assert!(civ
            .drain_events()
            .iter()
            .any(|e| matches!(e, CivEvent::BuildingCompleted { building, .. } if building == "hut")));
    }

    #[test]
    fn test_unlock_is_atomic() {
        let mut civ = civ();
        civ.add_research_points(29);
        assert!(matches!(
            civ.unlock_technology("masonry"),
            Err(ActionError::InsufficientResearch { cost: 30, available: 29, .. })
        ));
        assert_eq!(civ.research_points(), 29);
        assert!(!civ.is_technology_unlocked("masonry"));

        civ.add_research_points(1000);
        assert!(matches!(
            civ.unlock_technology("tribal_council"),
            Err(ActionError::MissingPrerequisite { .. })
        ));
        assert_eq!(civ.research_points(), 1029);
        assert!(!civ.is_technology_unlocked("tribal_council"));
    }

    #[test]
    fn test_unlock_advances_age() {
        let mut civ = civ();
        civ.add_research_points(130);
        civ.unlock_technology("masonry").unwrap();
        civ.unlock_technology("carpentry").unwrap();
        assert_eq!(
            civ.unlock_technology("masonry"),
            Err(ActionError::AlreadyUnlocked("masonry".into()))
        );
        civ.unlock_technology("tribal_council").unwrap();

        assert_eq!(civ.research_points(), 0);
        assert_eq!(civ.current_age(), Age::Tribal);
        assert!(civ.drain_events().contains(&CivEvent::AgeAdvanced { age: Age::Tribal }));
        assert!(civ.can_build_building("quarry"));
    }

    #[test]
    fn test_available_technologies() {
        let civ = civ();
        let keys: Vec<&str> = civ
            .available_technologies()
            .into_iter()
            .map(|t| t.key.as_str())
            .collect();
        assert_eq!(keys, vec!["carpentry", "masonry"]);
    }

    #[test]
    fn test_starvation_penalty() {
        let mut civ = civ();
        civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.spend_resources(&cost(&[(ResourceKind::Food, 100.0)]));
        civ.set_happiness(3.0);
        civ.run_production_pass();
        assert_eq!(civ.happiness(), 0.0);
        assert_eq!(civ.stockpile().get(ResourceKind::Food), 0.0);
    }

    #[test]
    fn test_farm_output_needs_staffed_farmers() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        let farm = finished(&civ.catalog, "farm_plot");
        civ.settlements.get_mut(&id).unwrap().buildings.push(farm);

        civ.assign_profession(id, 0, Profession::Farmer).unwrap();
        civ.assign_profession(id, 1, Profession::Farmer).unwrap();
        civ.assign_workplace(id, 0, "farm_plot").unwrap();
        civ.assign_workplace(id, 1, "farm_plot").unwrap();
        assert_eq!(
            civ.assign_workplace(id, 2, "farm_plot"),
            Err(ActionError::NoFreeWorkSlot("farm_plot".into()))
        );

        civ.run_production_pass();
        // 2 farmers x 1.0, minus 0.1 x 3 eaten
        assert!((civ.stockpile().get(ResourceKind::Food) - 101.7).abs() < 1e-3);
    }

    #[test]
    fn test_features_follow_unlocked_technologies() {
        let mut civ = civ();
        assert!(!civ.is_feature_unlocked("work_orders"));

        civ.add_research_points(130);
        civ.unlock_technology("masonry").unwrap();
        civ.unlock_technology("carpentry").unwrap();
        assert!(!civ.is_feature_unlocked("work_orders"));

        civ.unlock_technology("tribal_council").unwrap();
        assert!(civ.is_feature_unlocked("work_orders"));
        assert!(!civ.is_feature_unlocked("irrigation"));
    }

    #[test]
    fn test_stats_report_storage_capacity() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        assert_eq!(civ.stats().storage_capacity, 0.0);

        let pit = finished(&civ.catalog, "storage_pit");
        civ.settlements.get_mut(&id).unwrap().buildings.push(pit);
        assert_eq!(civ.stats().storage_capacity, 100.0);
    }

    #[test]
    fn test_second_farm_does_not_double_output() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        for _ in 0..2 {
            let farm = finished(&civ.catalog, "farm_plot");
            civ.settlements.get_mut(&id).unwrap().buildings.push(farm);
        }
        for index in 0..2 {
            civ.assign_profession(id, index, Profession::Farmer).unwrap();
            civ.assign_workplace(id, index, "farm_plot").unwrap();
        }

        civ.run_production_pass();
        // 2 farmers x 1.0, minus 0.1 x 3 eaten
        assert!((civ.stockpile().get(ResourceKind::Food) - 101.7).abs() < 1e-3);
    }

    #[test]
    fn test_changing_profession_clears_workplace() {
        let mut civ = civ();
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        let farm = finished(&civ.catalog, "farm_plot");
        civ.settlements.get_mut(&id).unwrap().buildings.push(farm);

        civ.assign_profession(id, 0, Profession::Farmer).unwrap();
        civ.assign_workplace(id, 0, "farm_plot").unwrap();
        civ.assign_profession(id, 0, Profession::Guard).unwrap();
        assert_eq!(civ.roster(id).unwrap()[0].workplace, None);
        assert!(matches!(
            civ.assign_profession(id, 7, Profession::Guard),
            Err(ActionError::UnknownVillager { index: 7, .. })
        ));
    }

    #[test]
    fn test_work_orders_go_to_idle_villagers() {
        let config = SimConfig {
            auto_assign_labor: false,
            ..SimConfig::seeded(3)
        };
        let mut civ = Civilization::new(Catalog::standard(), config);
        let id = civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.post_work_order(WorkOrder::new("haul", 1, 0.0).with_work_time(3.0));
        civ.post_work_order(WorkOrder::new("clear", 5, 0.0).with_work_time(3.0));

        civ.update(1.0);
        let roster = civ.roster(id).unwrap();
        assert!(matches!(&roster[0].task, Some(Task::WorkOrder { order, .. }) if order.kind == "clear"));
        assert!(matches!(&roster[1].task, Some(Task::WorkOrder { order, .. }) if order.kind == "haul"));
        assert!(roster[2].task.is_none());
        assert!(civ.work_orders().is_empty());

        for _ in 0..3 {
            civ.update(1.0);
        }
        let done: Vec<String> = civ
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                CivEvent::WorkOrderCompleted { order, .. } => Some(order.kind),
                _ => None,
            })
            .collect();
        assert_eq!(done, vec!["clear", "haul"]);
    }

    #[test]
    fn test_milestones_fire_once_with_rewards() {
        let mut civ = civ();
        civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.credit_resources(ResourceKind::Food, 500.0);
        civ.update(0.5);
        assert!(civ.milestones().contains(&Milestone::FirstVillager));
        assert!(civ.milestones().contains(&Milestone::Food500));
        assert_eq!(civ.research_points(), 100);

        civ.update(0.5);
        assert_eq!(civ.research_points(), 100);
        assert_eq!(civ.stats().milestones, 2);
    }

    #[test]
    fn test_stats_are_idempotent() {
        let mut civ = civ();
        civ.found_settlement("Ashford", Vec3::ZERO, 30.0);
        civ.update(7.0);
        assert_eq!(civ.stats(), civ.stats());
    }
}
