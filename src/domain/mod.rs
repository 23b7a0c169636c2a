pub mod maintenance;
pub mod priority;
pub mod schedule;
pub mod topology;
pub mod types;

pub use maintenance::*;
pub use priority::*;
pub use schedule::*;
pub use topology::*;
pub use types::*;
