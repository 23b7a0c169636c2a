use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::priority::PriorityTier;
use super::types::{AreaId, TicketId};

/// Maintenance issue reported against an area.
///
/// Tickets only ever move from open to resolved; they are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTicket {
    pub id: TicketId,
    pub area_id: AreaId,
    pub issue: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl MaintenanceTicket {
    pub fn open(id: TicketId, area_id: AreaId, issue: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            area_id,
            issue,
            created_at,
            resolved: false,
            resolved_at: None,
        }
    }

    /// Mark resolved. Returns false when the ticket was already resolved,
    /// in which case the first resolution time is kept.
    pub fn resolve(&mut self, at: DateTime<Utc>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(at);
        true
    }
}

/// Ticket annotated with the referenced area's current name and tier.
///
/// Both annotations are absent when the area has been deleted since the
/// ticket was filed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedTicket {
    #[serde(flatten)]
    pub ticket: MaintenanceTicket,
    pub area_name: Option<String>,
    pub area_priority: Option<PriorityTier>,
}
