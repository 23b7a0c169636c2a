use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{Area, Feeder, FeederId};

/// Load and area count summed for one feeder
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeederLoad {
    pub load_kw: f64,
    pub area_count: usize,
}

/// Network-wide and per-feeder demand, assuming every area is served
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemandTotals {
    pub total_demand_kw: f64,
    pub per_feeder: BTreeMap<FeederId, FeederLoad>,
}

impl DemandTotals {
    pub fn feeder(&self, id: FeederId) -> FeederLoad {
        self.per_feeder.get(&id).copied().unwrap_or_default()
    }
}

/// Sum area loads into their feeders, then feeders into the network total
pub fn aggregate<'a>(areas: impl IntoIterator<Item = &'a Area>) -> DemandTotals {
    let mut per_feeder: BTreeMap<FeederId, FeederLoad> = BTreeMap::new();
    for area in areas {
        let slot = per_feeder.entry(area.feeder_id).or_default();
        slot.load_kw += area.load_kw;
        slot.area_count += 1;
    }
    let total_demand_kw = per_feeder.values().map(|f| f.load_kw).sum();
    DemandTotals {
        total_demand_kw,
        per_feeder,
    }
}

/// Feeder listing row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeederDemand {
    #[serde(flatten)]
    pub feeder: Feeder,
    pub area_count: usize,
    pub load_kw: f64,
    /// Load as a fraction of capacity; absent for zero-capacity feeders
    pub utilization: Option<f64>,
    pub overloaded: bool,
}

/// One row per feeder, including feeders without areas
pub fn feeder_demand(feeders: &[Feeder], totals: &DemandTotals, epsilon_kw: f64) -> Vec<FeederDemand> {
    feeders
        .iter()
        .map(|feeder| {
            let load = totals.feeder(feeder.id);
            FeederDemand {
                feeder: feeder.clone(),
                area_count: load.area_count,
                load_kw: load.load_kw,
                utilization: (feeder.capacity_kw > 0.0).then(|| load.load_kw / feeder.capacity_kw),
                overloaded: load.load_kw > feeder.capacity_kw + epsilon_kw,
            }
        })
        .collect()
}
