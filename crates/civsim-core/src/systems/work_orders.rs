//! Work order queue - civilization-wide backlog claimed by idle villagers

use hecs::World;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::components::{Assignment, Profession, Task, WorkOrder};
use crate::settlement::Settlement;

#[derive(Debug, Clone)]
struct QueuedOrder {
    sequence: u64,
    order: WorkOrder,
}

impl QueuedOrder {
    fn rank(&self) -> (i32, Reverse<u64>) {
        (self.order.priority, Reverse(self.sequence))
    }
}

impl PartialEq for QueuedOrder {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for QueuedOrder {}

impl PartialOrd for QueuedOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Highest priority first; equal priorities come out in insertion order
#[derive(Debug, Clone, Default)]
pub struct WorkOrderQueue {
    heap: BinaryHeap<QueuedOrder>,
    next_sequence: u64,
}

impl WorkOrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: WorkOrder) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedOrder { sequence, order });
    }

    pub fn peek(&self) -> Option<&WorkOrder> {
        self.heap.peek().map(|q| &q.order)
    }

    pub fn pop(&mut self) -> Option<WorkOrder> {
        self.heap.pop().map(|q| q.order)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending orders in dispatch order
    pub fn to_vec(&self) -> Vec<WorkOrder> {
        let mut queued: Vec<&QueuedOrder> = self.heap.iter().collect();
        queued.sort_by(|a, b| b.cmp(a));
        queued.into_iter().map(|q| q.order.clone()).collect()
    }

    /// Rebuild from orders already in dispatch order
    pub fn from_orders(orders: Vec<WorkOrder>) -> Self {
        let mut queue = Self::new();
        for order in orders {
            queue.push(order);
        }
        queue
    }
}

/// Hand the queue head to each idle, task-free villager, settlement by
/// settlement in roster order. Returns the number of orders claimed.
pub fn dispatch_work_orders<'a>(
    world: &mut World,
    settlements: impl IntoIterator<Item = &'a Settlement>,
    queue: &mut WorkOrderQueue,
) -> usize {
    let mut claimed = 0;
    for settlement in settlements {
        for &entity in &settlement.villagers {
            if queue.is_empty() {
                return claimed;
            }
            let Ok((profession, assignment)) =
                world.query_one_mut::<(&Profession, &mut Assignment)>(entity)
            else {
                continue;
            };
            if *profession != Profession::Idle || !assignment.is_free() {
                continue;
            }
            if let Some(order) = queue.pop() {
                assignment.task = Some(Task::WorkOrder { order, elapsed: 0.0 });
                claimed += 1;
            }
        }
    }
    claimed
}
