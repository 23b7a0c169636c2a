use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

use super::types::{Candidate, HourPlan, SheddingStrategy};
use crate::domain::PriorityTier;

/// Greedy rolling-blackout strategy:
/// - Lowest priority tier is cut first, critical areas never
/// - Within a tier, areas cut least recently and least often go first
/// - Remaining ties go to the larger load, then to the lower area id
///
/// Cutting stops as soon as the shed load covers the shortfall.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRotation;

impl GreedyRotation {
    pub const NAME: &'static str = "greedy-rotation-v1";

    /// Order within a single tier
    fn compare(a: &Candidate, b: &Candidate) -> Ordering {
        a.rotation
            .cmp(&b.rotation)
            .then_with(|| OrderedFloat(b.load_kw).cmp(&OrderedFloat(a.load_kw)))
            .then_with(|| a.area_id.cmp(&b.area_id))
    }

    /// Sheddable candidates in the order they would be cut
    pub fn cutting_order(candidates: &[Candidate]) -> Vec<&Candidate> {
        PriorityTier::shedding_order()
            .flat_map(|tier| {
                candidates
                    .iter()
                    .filter(move |c| c.tier == tier)
                    .sorted_by(|a, b| Self::compare(a, b))
            })
            .collect()
    }
}

impl SheddingStrategy for GreedyRotation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn select(&self, candidates: &[Candidate], shortfall_kw: f64, epsilon_kw: f64) -> HourPlan {
        let mut plan = HourPlan::default();
        if shortfall_kw <= epsilon_kw {
            return plan;
        }

        for candidate in Self::cutting_order(candidates) {
            if plan.shed_kw >= shortfall_kw - epsilon_kw {
                break;
            }
            // nothing to gain from disconnecting an idle area
            if candidate.load_kw <= 0.0 {
                continue;
            }
            plan.cut.push(candidate.area_id);
            plan.shed_kw += candidate.load_kw;
        }

        let residual = shortfall_kw - plan.shed_kw;
        plan.unmet_kw = if residual > epsilon_kw { residual } else { 0.0 };
        plan
    }
}
