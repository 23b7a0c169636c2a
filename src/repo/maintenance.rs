use chrono::Utc;
use itertools::Itertools;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use super::topology::TopologyStore;
use crate::domain::{AnnotatedTicket, AreaId, ClassifiedArea, MaintenanceTicket, TicketId};
use crate::error::{Entity, PlannerError, PlannerResult};

/// Which tickets a listing returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketFilter {
    #[default]
    All,
    Open,
}

#[derive(Debug, Default)]
struct Tickets {
    by_id: BTreeMap<TicketId, MaintenanceTicket>,
    last_id: u64,
}

/// Maintenance tickets, listed most critical area first
#[derive(Debug, Default)]
pub struct MaintenanceQueue {
    inner: Mutex<Tickets>,
}

impl MaintenanceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, topology: &TopologyStore, area_id: AreaId, issue: &str) -> PlannerResult<MaintenanceTicket> {
        let issue = issue.trim();
        if issue.is_empty() {
            return Err(PlannerError::validation("issue", "must not be blank"));
        }
        if topology.area(area_id).is_none() {
            return Err(PlannerError::not_found(Entity::Area, area_id));
        }

        let mut tickets = self.inner.lock();
        let id = TicketId(tickets.last_id + 1);
        tickets.last_id = id.get();
        let ticket = MaintenanceTicket::open(id, area_id, issue.to_string(), Utc::now());
        tickets.by_id.insert(id, ticket.clone());
        info!(ticket_id = %id, area_id = %area_id, "maintenance ticket submitted");
        Ok(ticket)
    }

    /// Resolve a ticket; resolving an already resolved ticket is a no-op
    pub fn resolve(&self, id: TicketId) -> PlannerResult<MaintenanceTicket> {
        let mut tickets = self.inner.lock();
        let ticket = tickets
            .by_id
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found(Entity::Ticket, id))?;
        if ticket.resolve(Utc::now()) {
            info!(ticket_id = %id, "maintenance ticket resolved");
        }
        Ok(ticket.clone())
    }

    pub fn get(&self, id: TicketId) -> PlannerResult<MaintenanceTicket> {
        self.inner
            .lock()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| PlannerError::not_found(Entity::Ticket, id))
    }

    /// Tickets annotated with their area's current name and tier, ordered by
    /// tier, then creation time, then id. Tickets of deleted areas come last.
    pub fn list(&self, areas: &[ClassifiedArea], filter: TicketFilter) -> Vec<AnnotatedTicket> {
        let lookup: HashMap<AreaId, &ClassifiedArea> = areas.iter().map(|a| (a.id(), a)).collect();
        let tickets: Vec<MaintenanceTicket> = self.inner.lock().by_id.values().cloned().collect();

        tickets
            .into_iter()
            .filter(|t| filter == TicketFilter::All || !t.resolved)
            .map(|ticket| {
                let area = lookup.get(&ticket.area_id);
                AnnotatedTicket {
                    area_name: area.map(|a| a.area.name.clone()),
                    area_priority: area.map(|a| a.priority),
                    ticket,
                }
            })
            .sorted_by_key(|t| {
                (
                    t.area_priority.map_or(u8::MAX, |p| p.level()),
                    t.ticket.created_at,
                    t.ticket.id,
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
