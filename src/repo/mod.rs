use crate::config::Config;

pub mod maintenance;
pub mod topology;

pub use maintenance::{MaintenanceQueue, TicketFilter};
pub use topology::{FeederRemoval, TopologySnapshot, TopologyStore};

/// Stores shared by the controller
pub struct Repositories {
    pub topology: TopologyStore,
    pub maintenance: MaintenanceQueue,
}

impl Repositories {
    pub fn new(cfg: &Config) -> Self {
        Self {
            topology: TopologyStore::new(cfg.topology.default_feeder_capacity_kw),
            maintenance: MaintenanceQueue::new(),
        }
    }
}
