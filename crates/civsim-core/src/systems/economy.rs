//! Resource economy - the global stockpile and the periodic production pass

use hecs::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::BuildingType;
use crate::components::{Assignment, Profession, ResourceCost, ResourceKind, ResourceTally};
use crate::settlement::Settlement;

/// Global resource stockpile (singleton, owned by the engine).
///
/// Quantities never go below zero: `debit` clamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stockpile {
    amounts: BTreeMap<ResourceKind, f32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_amounts(amounts: &ResourceCost) -> Self {
        let mut stockpile = Self::new();
        for (kind, amount) in amounts {
            stockpile.credit(*kind, *amount);
        }
        stockpile
    }

    pub fn get(&self, kind: ResourceKind) -> f32 {
        self.amounts.get(&kind).copied().unwrap_or(0.0)
    }

    /// Add to a resource. Negative amounts are treated as a debit.
    pub fn credit(&mut self, kind: ResourceKind, amount: f32) {
        if amount < 0.0 {
            self.debit(kind, -amount);
            return;
        }
        *self.amounts.entry(kind).or_insert(0.0) += amount;
    }

    /// Remove from a resource, clamping at zero
    pub fn debit(&mut self, kind: ResourceKind, amount: f32) {
        let current = self.get(kind);
        self.amounts.insert(kind, (current - amount.max(0.0)).max(0.0));
    }

    /// Raise any negative amount to zero
    pub fn clamp_negative(&mut self) {
        for amount in self.amounts.values_mut() {
            if *amount < 0.0 {
                *amount = 0.0;
            }
        }
    }

    pub fn credit_all(&mut self, tally: &ResourceTally) {
        for (kind, amount) in tally.iter() {
            self.credit(kind, amount);
        }
    }

    /// True iff every listed amount is covered
    pub fn can_afford(&self, costs: &ResourceCost) -> bool {
        costs.iter().all(|(kind, amount)| self.get(*kind) >= *amount)
    }

    /// Subtract every listed amount. Callers check `can_afford` first.
    pub fn spend(&mut self, costs: &ResourceCost) {
        for (kind, amount) in costs {
            self.debit(*kind, *amount);
        }
    }

    /// Shortfall per resource for an unaffordable cost
    pub fn missing(&self, costs: &ResourceCost) -> Vec<(ResourceKind, f32)> {
        costs
            .iter()
            .filter_map(|(kind, amount)| {
                let have = self.get(*kind);
                (have < *amount).then(|| (*kind, *amount - have))
            })
            .collect()
    }

    pub fn snapshot(&self) -> BTreeMap<ResourceKind, f32> {
        self.amounts.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f32)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }
}

/// Output of one settlement's buildings for a single production pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionOutput {
    pub resources: ResourceTally,
    pub research: u32,
}

/// Sum production per building type over the villagers staffing it.
///
/// A villager counts toward a type when its profession matches the type's
/// required profession and its workplace is that type's key. Staff beyond
/// the type's combined work slots produce nothing. Research is flat per
/// finished building.
pub fn settlement_output(world: &World, settlement: &Settlement) -> ProductionOutput {
    let mut output = ProductionOutput::default();
    let mut types: BTreeMap<&str, &BuildingType> = BTreeMap::new();
    for building in &settlement.buildings {
        output.research += building.kind.research;
        types.entry(building.building_type.as_str()).or_insert(&building.kind);
    }

    let mut staff: BTreeMap<&str, usize> = BTreeMap::new();
    for &entity in &settlement.villagers {
        let Ok(mut query) = world.query_one::<(&Profession, &Assignment)>(entity) else {
            continue;
        };
        let Some((profession, assignment)) = query.get() else {
            continue;
        };
        let Some(workplace) = assignment.workplace.as_deref() else {
            continue;
        };
        let Some((&key, kind)) = types.get_key_value(workplace) else {
            continue;
        };
        if kind.employs(*profession) {
            *staff.entry(key).or_insert(0) += 1;
        }
    }

    for (key, kind) in &types {
        let Some(production) = &kind.production else {
            continue;
        };
        let workers = staff
            .get(key)
            .copied()
            .unwrap_or(0)
            .min(settlement.work_slots(key) as usize);
        output
            .resources
            .add(production.resource, production.rate_per_worker * workers as f32);
    }
    output
}

/// Eat `per_capita` food per villager. Returns true if the store is empty afterwards.
pub fn consume_food(stockpile: &mut Stockpile, population: u32, per_capita: f32) -> bool {
    stockpile.debit(ResourceKind::Food, per_capita * population as f32);
    stockpile.get(ResourceKind::Food) <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::components::{cost, Building, SettlementId, Vec3};

    fn farm_settlement(farms: usize, farmers: usize) -> (World, Settlement) {
        let catalog = Catalog::standard();
        let farm = catalog.building("farm_plot").unwrap();
        let mut world = World::new();
        let mut settlement = Settlement::new(SettlementId(1), "Test", Vec3::ZERO, 20.0, 0.0);
        for _ in 0..farms {
            settlement.buildings.push(Building {
                building_type: farm.key.clone(),
                position: Vec3::ZERO,
                completed_at: 0.0,
                kind: farm.clone(),
            });
        }
        for _ in 0..farmers {
            let assignment = Assignment {
                task: None,
                workplace: Some("farm_plot".to_string()),
            };
            settlement.villagers.push(world.spawn((Profession::Farmer, assignment)));
        }
        (world, settlement)
    }

    #[test]
    fn test_debit_clamps_at_zero() {
        let mut stockpile = Stockpile::new();
        stockpile.credit(ResourceKind::Wood, 3.0);
        stockpile.debit(ResourceKind::Wood, 10.0);
        assert_eq!(stockpile.get(ResourceKind::Wood), 0.0);

        stockpile.credit(ResourceKind::Stone, -4.0);
        assert_eq!(stockpile.get(ResourceKind::Stone), 0.0);
    }

    #[test]
    fn test_can_afford_and_spend() {
        let mut stockpile = Stockpile::from_amounts(&cost(&[
            (ResourceKind::Wood, 10.0),
            (ResourceKind::Stone, 2.0),
        ]));
        let price = cost(&[(ResourceKind::Wood, 10.0), (ResourceKind::Stone, 1.0)]);

        assert!(stockpile.can_afford(&price));
        stockpile.spend(&price);
        assert_eq!(stockpile.get(ResourceKind::Wood), 0.0);
        assert_eq!(stockpile.get(ResourceKind::Stone), 1.0);
        assert!(!stockpile.can_afford(&price));
    }

    #[test]
    fn test_missing_lists_shortfall() {
        let stockpile = Stockpile::from_amounts(&cost(&[(ResourceKind::Wood, 4.0)]));
        let price = cost(&[(ResourceKind::Wood, 10.0), (ResourceKind::Ore, 1.0)]);
        let missing = stockpile.missing(&price);
        assert_eq!(
            missing,
            vec![(ResourceKind::Wood, 6.0), (ResourceKind::Ore, 1.0)]
        );
    }

    #[test]
    fn test_consume_food_without_population() {
        let mut stockpile = Stockpile::from_amounts(&cost(&[(ResourceKind::Food, 100.0)]));
        let starving = consume_food(&mut stockpile, 0, 0.1);
        assert!(!starving);
        assert_eq!(stockpile.get(ResourceKind::Food), 100.0);
    }

    #[test]
    fn test_consume_food_reports_empty_store() {
        let mut stockpile = Stockpile::from_amounts(&cost(&[(ResourceKind::Food, 0.5)]));
        assert!(consume_food(&mut stockpile, 10, 0.1));
        assert_eq!(stockpile.get(ResourceKind::Food), 0.0);
    }

    #[test]
    fn test_workers_count_once_per_building_type() {
        let (world, settlement) = farm_settlement(2, 2);
        let output = settlement_output(&world, &settlement);
        assert_eq!(output.resources.get(ResourceKind::Food), 2.0);
    }

    #[test]
    fn test_staff_beyond_work_slots_idle() {
        // One farm plot has two slots
        let (world, settlement) = farm_settlement(1, 3);
        let output = settlement_output(&world, &settlement);
        assert_eq!(output.resources.get(ResourceKind::Food), 2.0);
    }

    #[test]
    fn test_wrong_profession_does_not_staff() {
        let (mut world, settlement) = farm_settlement(1, 1);
        let entity = settlement.villagers[0];
        *world.get::<&mut Profession>(entity).unwrap() = Profession::Gatherer;
        let output = settlement_output(&world, &settlement);
        assert_eq!(output.resources.get(ResourceKind::Food), 0.0);
    }
}
