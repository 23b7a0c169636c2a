//! Demand aggregation and network views
//!
//! Everything in this module is a pure function of a topology snapshot and,
//! for the network view, the current schedule.

pub mod demand;
pub mod snapshot;

pub use demand::{aggregate, feeder_demand, DemandTotals, FeederDemand, FeederLoad};
pub use snapshot::{AreaNode, FeederNode, NetworkSnapshot, PlantNode};
