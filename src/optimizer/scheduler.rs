use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::greedy::GreedyRotation;
use super::rotation::{RotationHistory, RotationKey, RotationMode};
use super::types::{Candidate, HourPlan, SheddingStrategy};
use crate::domain::{clock_label, AreaId, ClassifiedArea, PowerBudget, Schedule, ScheduleEntry, HOURS_PER_DAY};
use crate::error::PlannerResult;
use crate::power_flow::aggregate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tolerance for float comparisons on power figures (kW)
    pub epsilon_kw: f64,
    /// Generations of cut history that count towards rotation (K)
    pub history_generations: usize,
    pub rotation: RotationMode,
    /// Clock hour at which hour index 0 starts
    pub day_start_hour: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            epsilon_kw: 1e-6,
            history_generations: 7,
            rotation: RotationMode::Generation,
            day_start_hour: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.epsilon_kw.is_finite() && self.epsilon_kw > 0.0) {
            return Err(format!("scheduler.epsilon_kw must be > 0, got {}", self.epsilon_kw));
        }
        if self.history_generations == 0 {
            return Err("scheduler.history_generations must be >= 1".to_string());
        }
        if self.day_start_hour >= HOURS_PER_DAY {
            return Err(format!(
                "scheduler.day_start_hour must be in 0..=23, got {}",
                self.day_start_hour
            ));
        }
        Ok(())
    }
}

/// Builds 24-hour rolling-blackout schedules from a classified snapshot
pub struct RollingBlackoutScheduler {
    config: SchedulerConfig,
    strategy: Box<dyn SheddingStrategy>,
}

impl RollingBlackoutScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_strategy(config, Box::new(GreedyRotation))
    }

    pub fn with_strategy(config: SchedulerConfig, strategy: Box<dyn SheddingStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Empty history sized for this scheduler's rotation window
    pub fn new_history(&self) -> RotationHistory {
        RotationHistory::new(self.config.history_generations)
    }

    pub fn strategy_name(&self) -> String {
        format!("{}/{}", self.strategy.name(), self.config.rotation)
    }

    /// Plan a schedule against `history` without recording it
    pub fn plan(
        &self,
        areas: &[ClassifiedArea],
        budget: PowerBudget,
        history: &RotationHistory,
    ) -> PlannerResult<Schedule> {
        let available_power_kw = budget.hourly_power_kw()?;
        let eps = self.config.epsilon_kw;
        let total_demand_kw = aggregate(areas.iter().map(|a| &a.area)).total_demand_kw;
        let raw_shortfall = total_demand_kw - available_power_kw;
        let shortfall_kw = if raw_shortfall > eps { raw_shortfall } else { 0.0 };
        let generation = history.generation();

        let mut keys: HashMap<AreaId, RotationKey> = areas
            .iter()
            .filter(|a| a.is_sheddable())
            .map(|a| (a.id(), history.key(a.id())))
            .collect();

        let mut entries = Vec::with_capacity(usize::from(HOURS_PER_DAY));
        for hour in 0..HOURS_PER_DAY {
            let plan = if shortfall_kw > 0.0 {
                let candidates: Vec<Candidate> = areas
                    .iter()
                    .filter_map(|a| {
                        keys.get(&a.id()).map(|key| Candidate {
                            area_id: a.id(),
                            tier: a.priority,
                            load_kw: a.load_kw(),
                            rotation: *key,
                        })
                    })
                    .collect();
                self.strategy.select(&candidates, shortfall_kw, eps)
            } else {
                HourPlan::default()
            };
            debug_assert!(plan.cut.iter().all(|id| keys.contains_key(id)));

            if self.config.rotation == RotationMode::Hourly {
                let tick = RotationHistory::tick(generation, hour);
                for id in &plan.cut {
                    if let Some(key) = keys.get_mut(id) {
                        *key = key.after_cut(tick);
                    }
                }
            }

            debug!(hour, cut = plan.cut.len(), shed_kw = plan.shed_kw, unmet_kw = plan.unmet_kw, "hour planned");
            entries.push(ScheduleEntry {
                hour,
                start_time: clock_label(self.config.day_start_hour, hour),
                end_time: clock_label(self.config.day_start_hour, hour + 1),
                cut_areas: plan.cut,
                shortfall_kw,
                shed_kw: plan.shed_kw,
                unmet_kw: plan.unmet_kw,
            });
        }

        Ok(Schedule {
            id: Uuid::new_v4(),
            generation,
            generated_at: Utc::now(),
            budget,
            available_power_kw,
            total_demand_kw,
            entries,
            strategy: self.strategy_name(),
        })
    }

    /// Plan a schedule and fold it into `history`
    pub fn generate(
        &self,
        areas: &[ClassifiedArea],
        budget: PowerBudget,
        history: &mut RotationHistory,
    ) -> PlannerResult<Schedule> {
        let schedule = self.plan(areas, budget, history)?;
        history.record(&schedule, areas.iter().map(ClassifiedArea::id));

        let unmet_hours = schedule.unmet_hours();
        info!(
            schedule_id = %schedule.id,
            generation = schedule.generation,
            total_demand_kw = schedule.total_demand_kw,
            available_power_kw = schedule.available_power_kw,
            cut_areas = schedule.cut_hours_by_area().len(),
            unmet_hours,
            "Generated rolling-blackout schedule"
        );
        if unmet_hours > 0 {
            warn!(
                unmet_hours,
                max_unmet_kw = schedule.max_unmet_kw(),
                "Shortfall exceeds sheddable load"
            );
        }
        Ok(schedule)
    }
}
