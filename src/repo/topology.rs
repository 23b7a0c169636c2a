//! In-memory topology store.
//!
//! Feeders and areas live behind a single `RwLock`. Every structural
//! mutation (including the feeder-reference check of an area insert) runs
//! under the write lock, and readers take cloned snapshots, so a schedule
//! generation can never observe a half-deleted feeder.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::domain::{Area, AreaId, AreaUpdate, Feeder, FeederId, NewArea, NewFeeder};
use crate::error::{Entity, PlannerError, PlannerResult};

/// Immutable copy of the topology at one instant, ordered by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologySnapshot {
    pub feeders: Vec<Feeder>,
    pub areas: Vec<Area>,
}

impl TopologySnapshot {
    pub fn feeder(&self, id: FeederId) -> Option<&Feeder> {
        self.feeders.iter().find(|f| f.id == id)
    }

    pub fn feeder_name(&self, id: FeederId) -> Option<&str> {
        self.feeder(id).map(|f| f.name.as_str())
    }
}

/// Feeder removed together with the areas it owned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeederRemoval {
    pub feeder: Feeder,
    pub removed_areas: Vec<AreaId>,
}

#[derive(Debug, Default)]
struct Topology {
    feeders: BTreeMap<FeederId, Feeder>,
    areas: BTreeMap<AreaId, Area>,
    last_feeder_id: u64,
    last_area_id: u64,
}

pub struct TopologyStore {
    inner: RwLock<Topology>,
    default_capacity_kw: f64,
}

impl TopologyStore {
    pub fn new(default_capacity_kw: f64) -> Self {
        Self {
            inner: RwLock::new(Topology::default()),
            default_capacity_kw,
        }
    }

    pub fn snapshot(&self) -> TopologySnapshot {
        let topo = self.inner.read();
        TopologySnapshot {
            feeders: topo.feeders.values().cloned().collect(),
            areas: topo.areas.values().cloned().collect(),
        }
    }

    pub fn feeder(&self, id: FeederId) -> Option<Feeder> {
        self.inner.read().feeders.get(&id).cloned()
    }

    pub fn area(&self, id: AreaId) -> Option<Area> {
        self.inner.read().areas.get(&id).cloned()
    }

    pub fn create_feeder(&self, input: NewFeeder) -> PlannerResult<Feeder> {
        let mut topo = self.inner.write();
        let id = FeederId(topo.last_feeder_id + 1);
        let feeder = input.into_feeder(id, self.default_capacity_kw)?;
        topo.last_feeder_id = id.get();
        topo.feeders.insert(id, feeder.clone());
        info!(feeder_id = %id, name = %feeder.name, capacity_kw = feeder.capacity_kw, "feeder created");
        Ok(feeder)
    }

    /// Delete a feeder and cascade to its areas
    pub fn delete_feeder(&self, id: FeederId) -> PlannerResult<FeederRemoval> {
        let mut topo = self.inner.write();
        let feeder = topo
            .feeders
            .remove(&id)
            .ok_or_else(|| PlannerError::not_found(Entity::Feeder, id))?;

        let removed_areas: Vec<AreaId> = topo
            .areas
            .values()
            .filter(|a| a.feeder_id == id)
            .map(|a| a.id)
            .collect();
        for area in &removed_areas {
            topo.areas.remove(area);
        }

        info!(feeder_id = %id, removed_areas = removed_areas.len(), "feeder deleted");
        Ok(FeederRemoval {
            feeder,
            removed_areas,
        })
    }

    pub fn create_area(&self, input: NewArea) -> PlannerResult<Area> {
        let mut topo = self.inner.write();
        if !topo.feeders.contains_key(&input.feeder_id) {
            return Err(PlannerError::not_found(Entity::Feeder, input.feeder_id));
        }
        let id = AreaId(topo.last_area_id + 1);
        let area = input.into_area(id)?;
        topo.last_area_id = id.get();
        topo.areas.insert(id, area.clone());
        info!(area_id = %id, feeder_id = %area.feeder_id, load_kw = area.load_kw, "area created");
        Ok(area)
    }

    pub fn update_area(&self, id: AreaId, update: &AreaUpdate) -> PlannerResult<Area> {
        let mut topo = self.inner.write();
        let current = topo
            .areas
            .get(&id)
            .ok_or_else(|| PlannerError::not_found(Entity::Area, id))?;
        let next = update.applied_to(current)?;
        if !topo.feeders.contains_key(&next.feeder_id) {
            return Err(PlannerError::not_found(Entity::Feeder, next.feeder_id));
        }
        topo.areas.insert(id, next.clone());
        info!(area_id = %id, load_kw = next.load_kw, "area updated");
        Ok(next)
    }

    pub fn delete_area(&self, id: AreaId) -> PlannerResult<Area> {
        let area = self
            .inner
            .write()
            .areas
            .remove(&id)
            .ok_or_else(|| PlannerError::not_found(Entity::Area, id))?;
        info!(area_id = %id, "area deleted");
        Ok(area)
    }
}
