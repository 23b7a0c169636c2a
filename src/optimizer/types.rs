use serde::Serialize;

use super::rotation::RotationKey;
use crate::domain::{AreaId, PriorityTier};

/// Area eligible for cutting in one hour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub area_id: AreaId,
    pub tier: PriorityTier,
    pub load_kw: f64,
    pub rotation: RotationKey,
}

/// Cut decision for a single hour
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourPlan {
    pub cut: Vec<AreaId>,
    pub shed_kw: f64,
    pub unmet_kw: f64,
}

/// Picks which candidates to disconnect to cover a shortfall.
///
/// Implementations must never return a tier 1 area and must report any
/// shortfall they cannot cover as `unmet_kw`.
pub trait SheddingStrategy: Send + Sync {
    /// Identifier recorded on generated schedules
    fn name(&self) -> &'static str;

    fn select(&self, candidates: &[Candidate], shortfall_kw: f64, epsilon_kw: f64) -> HourPlan;
}
