use thiserror::Error;

/// Kind of record an operation referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
    Feeder,
    Area,
    Ticket,
}

/// Errors surfaced by the planner core.
///
/// A capacity shortfall is not an error: it is reported as unmet demand on
/// the affected schedule entries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// Malformed or missing input, rejected before any mutation
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Reference to a record that does not exist (or no longer exists)
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: u64 },
}

impl PlannerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: Entity, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Field name for validation failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::NotFound { .. } => None,
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
