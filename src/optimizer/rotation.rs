//! Fairness state for the rolling-blackout scheduler.
//!
//! The history is owned by the scheduling side and keyed by area id. Area ids
//! are never reused, so deleting and recreating an area starts it with a
//! clean record.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::domain::{AreaId, Schedule, HOURS_PER_DAY};

/// How rotation keys evolve while a schedule is being generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RotationMode {
    /// Keys are frozen for a generation: every hour of one schedule cuts the
    /// same areas and the burden rotates between regenerations
    #[default]
    Generation,
    /// Cuts made earlier in the day count against an area for later hours,
    /// so equal-tier siblings alternate within one schedule
    Hourly,
}

/// Candidate ordering key within a tier: fewer recent cut hours first, then
/// least recently cut (never-cut areas first)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RotationKey {
    pub recent_cut_hours: u32,
    pub last_cut_tick: Option<u64>,
}

impl RotationKey {
    /// Key after the area is cut at `tick`
    pub fn after_cut(self, tick: u64) -> Self {
        Self {
            recent_cut_hours: self.recent_cut_hours + 1,
            last_cut_tick: Some(tick),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CutLog {
    /// Cut hours per generation, oldest first, at most `window` long
    per_generation: VecDeque<u32>,
    last_cut_tick: Option<u64>,
}

impl CutLog {
    fn recent(&self) -> u32 {
        self.per_generation.iter().sum()
    }
}

/// Bounded per-area record of the last K generations
#[derive(Debug, Clone)]
pub struct RotationHistory {
    window: usize,
    generation: u64,
    logs: HashMap<AreaId, CutLog>,
}

impl RotationHistory {
    pub fn new(window_generations: usize) -> Self {
        Self {
            window: window_generations.max(1),
            generation: 0,
            logs: HashMap::new(),
        }
    }

    /// Number of generations recorded so far, i.e. the index of the next one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Monotonic hour counter across generations
    pub fn tick(generation: u64, hour: u8) -> u64 {
        generation * u64::from(HOURS_PER_DAY) + u64::from(hour)
    }

    pub fn key(&self, area: AreaId) -> RotationKey {
        self.logs
            .get(&area)
            .map(|log| RotationKey {
                recent_cut_hours: log.recent(),
                last_cut_tick: log.last_cut_tick,
            })
            .unwrap_or_default()
    }

    pub fn recent_cut_hours(&self, area: AreaId) -> u32 {
        self.key(area).recent_cut_hours
    }

    pub fn tracked_areas(&self) -> usize {
        self.logs.len()
    }

    /// Fold a generated schedule into the history.
    ///
    /// `live_areas` are the areas the schedule was generated for; records of
    /// any other area are dropped.
    pub fn record(&mut self, schedule: &Schedule, live_areas: impl IntoIterator<Item = AreaId>) {
        let cut_hours = schedule.cut_hours_by_area();
        let mut last_ticks: HashMap<AreaId, u64> = HashMap::new();
        for entry in &schedule.entries {
            let tick = Self::tick(schedule.generation, entry.hour);
            for area in &entry.cut_areas {
                last_ticks
                    .entry(*area)
                    .and_modify(|t| *t = (*t).max(tick))
                    .or_insert(tick);
            }
        }

        let mut next: HashMap<AreaId, CutLog> = HashMap::new();
        for area in live_areas {
            let mut log = self.logs.remove(&area).unwrap_or_default();
            log.per_generation.push_back(cut_hours.get(&area).copied().unwrap_or(0));
            while log.per_generation.len() > self.window {
                log.per_generation.pop_front();
            }
            if let Some(tick) = last_ticks.get(&area) {
                log.last_cut_tick = Some(*tick);
            }
            next.insert(area, log);
        }

        self.logs = next;
        self.generation = schedule.generation + 1;
    }
}
