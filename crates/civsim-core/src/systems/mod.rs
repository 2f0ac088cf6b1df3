//! Systems - logic that operates on components

mod construction;
mod economy;
mod growth;
mod happiness;
mod labor;
mod milestones;
mod tasks;
mod work_orders;

pub use construction::*;
pub use economy::*;
pub use growth::*;
pub use happiness::*;
pub use labor::*;
pub use milestones::*;
pub use tasks::*;
pub use work_orders::*;
