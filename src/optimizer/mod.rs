//! Rolling-blackout scheduling
//!
//! - `greedy`: priority-then-rotation cut selection for one hour
//! - `rotation`: per-area fairness history across generations
//! - `scheduler`: 24-hour schedule generation around a strategy

pub mod greedy;
pub mod rotation;
pub mod scheduler;
pub mod types;

pub use greedy::GreedyRotation;
pub use rotation::{RotationHistory, RotationKey, RotationMode};
pub use scheduler::{RollingBlackoutScheduler, SchedulerConfig};
pub use types::*;
