//! External collaborators - world blocks, villager bodies, user-facing messages.
//!
//! Every collaborator is optional. The defaults do nothing (or, for the
//! villager factory, hand out plain numeric handles) so a headless
//! simulation runs without any of them.

use crate::catalog::Age;
use crate::components::{BlockKind, ResourceKind, SettlementId, Vec3, VillagerId, WorkOrder};
use crate::systems::Milestone;

/// Voxel world the settlements sit in
pub trait WorldHost {
    /// A safe place to put a new villager near `near`
    fn safe_spawn_point(&mut self, _near: Vec3) -> Option<Vec3> {
        None
    }

    /// Terrain height at a column
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        None
    }

    fn set_block(&mut self, _x: i32, _y: i32, _z: i32, _block: BlockKind) {}
}

/// No world attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorld;

impl WorldHost for NoWorld {}

/// Creates the outward representation of a villager.
///
/// Returning `None` means no villager can be created right now; the spawn is skipped.
pub trait VillagerFactory {
    fn create_villager(&mut self, settlement: SettlementId, position: Vec3) -> Option<u64>;
}

/// Always succeeds with sequential handles
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    next_handle: u64,
}

impl VillagerFactory for HeadlessFactory {
    fn create_villager(&mut self, _settlement: SettlementId, _position: Vec3) -> Option<u64> {
        self.next_handle += 1;
        Some(self.next_handle)
    }
}

/// Something user-visible happened
#[derive(Debug, Clone, PartialEq)]
pub enum CivEvent {
    InsufficientResources {
        building: String,
        missing: Vec<(ResourceKind, f32)>,
    },
    InsufficientResearch {
        technology: String,
        cost: u32,
        available: u32,
    },
    BuildingQueued {
        settlement: SettlementId,
        building: String,
    },
    BuildingCompleted {
        settlement: SettlementId,
        building: String,
        position: Vec3,
    },
    TechnologyUnlocked {
        technology: String,
    },
    AgeAdvanced {
        age: Age,
    },
    MilestoneReached {
        milestone: Milestone,
        reward: u32,
    },
    VillagerJoined {
        settlement: SettlementId,
        villager: VillagerId,
    },
    WorkOrderCompleted {
        settlement: SettlementId,
        order: WorkOrder,
    },
    Starvation,
}

impl CivEvent {
    /// One-line message for a UI log
    pub fn message(&self) -> String {
        match self {
            CivEvent::InsufficientResources { building, missing } => {
                let needs: Vec<String> = missing
                    .iter()
                    .map(|(kind, amount)| format!("{:.0} {}", amount, kind.name()))
                    .collect();
                format!("Not enough resources for {}: need {}", building, needs.join(", "))
            }
            CivEvent::InsufficientResearch {
                technology,
                cost,
                available,
            } => format!(
                "{} needs {} research points, {} available",
                technology, cost, available
            ),
            CivEvent::BuildingQueued { building, .. } => format!("Construction of {} started", building),
            CivEvent::BuildingCompleted { building, .. } => format!("{} completed", building),
            CivEvent::TechnologyUnlocked { technology } => format!("Technology unlocked: {}", technology),
            CivEvent::AgeAdvanced { age } => format!("Entered the {} age", age),
            CivEvent::MilestoneReached { milestone, reward } if *reward > 0 => {
                format!("{} (+{} research)", milestone.description(), reward)
            }
            CivEvent::MilestoneReached { milestone, .. } => milestone.description().to_string(),
            CivEvent::VillagerJoined { settlement, .. } => {
                format!("A new villager joined settlement {}", settlement)
            }
            CivEvent::WorkOrderCompleted { order, .. } => format!("Work order `{}` done", order.kind),
            CivEvent::Starvation => "The food stores are empty".to_string(),
        }
    }
}

/// Fire-and-forget sink for user-visible events
pub trait Notifier {
    fn notify(&mut self, _event: &CivEvent) {}
}

/// No UI attached
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {}

/// Injected collaborators
pub struct Hosts {
    pub world: Box<dyn WorldHost>,
    pub villagers: Box<dyn VillagerFactory>,
    pub notifier: Box<dyn Notifier>,
}

impl Hosts {
    pub fn with_world(mut self, world: impl WorldHost + 'static) -> Self {
        self.world = Box::new(world);
        self
    }

    pub fn with_villagers(mut self, factory: impl VillagerFactory + 'static) -> Self {
        self.villagers = Box::new(factory);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            world: Box::new(NoWorld),
            villagers: Box::new(HeadlessFactory::default()),
            notifier: Box::new(Silent),
        }
    }
}

impl std::fmt::Debug for Hosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hosts").finish_non_exhaustive()
    }
}
