use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::types::{is_non_negative, AreaId, HOURS_PER_DAY};
use crate::error::{PlannerError, PlannerResult};

/// Supply figure a schedule is generated from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PowerBudget {
    /// Power available in every hour (kW)
    Power { available_power_kw: f64 },
    /// Energy available for the whole day (kWh), spread evenly over the hours
    DailyEnergy { available_energy_kwh: f64 },
}

impl PowerBudget {
    pub fn power_kw(available_power_kw: f64) -> Self {
        Self::Power { available_power_kw }
    }

    pub fn daily_energy_kwh(available_energy_kwh: f64) -> Self {
        Self::DailyEnergy {
            available_energy_kwh,
        }
    }

    /// Uniform hourly power implied by this budget
    pub fn hourly_power_kw(&self) -> PlannerResult<f64> {
        match *self {
            Self::Power { available_power_kw } => {
                if is_non_negative(available_power_kw) {
                    Ok(available_power_kw)
                } else {
                    Err(PlannerError::validation(
                        "available_power_kw",
                        format!("must be a finite value >= 0, got {available_power_kw}"),
                    ))
                }
            }
            Self::DailyEnergy {
                available_energy_kwh,
            } => {
                if is_non_negative(available_energy_kwh) {
                    Ok(available_energy_kwh / f64::from(HOURS_PER_DAY))
                } else {
                    Err(PlannerError::validation(
                        "available_energy_kwh",
                        format!("must be a finite value >= 0, got {available_energy_kwh}"),
                    ))
                }
            }
        }
    }
}

/// 24-hour cut plan; immutable once generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    /// Sequence number of the generation that produced this plan
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
    pub budget: PowerBudget,
    pub available_power_kw: f64,
    pub total_demand_kw: f64,
    pub entries: Vec<ScheduleEntry>,
    pub strategy: String,
}

/// Cut decision for one hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub hour: u8,
    pub start_time: String,
    pub end_time: String,
    /// Areas disconnected during this hour, in selection order
    pub cut_areas: Vec<AreaId>,
    pub shortfall_kw: f64,
    pub shed_kw: f64,
    /// Shortfall left after every eligible area was cut
    pub unmet_kw: f64,
}

impl ScheduleEntry {
    pub fn is_cut(&self) -> bool {
        !self.cut_areas.is_empty()
    }

    pub fn has_unmet_demand(&self) -> bool {
        self.unmet_kw > 0.0
    }

    pub fn cuts(&self, area: AreaId) -> bool {
        self.cut_areas.contains(&area)
    }

    /// `"HH:00-HH:00"`
    pub fn interval_label(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

impl Schedule {
    pub fn entry(&self, hour: u8) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.hour == hour)
    }

    pub fn unmet_hours(&self) -> usize {
        self.entries.iter().filter(|e| e.has_unmet_demand()).count()
    }

    pub fn has_unmet_demand(&self) -> bool {
        self.unmet_hours() > 0
    }

    pub fn max_unmet_kw(&self) -> f64 {
        self.entries.iter().map(|e| e.unmet_kw).fold(0.0, f64::max)
    }

    /// Hours each area spends disconnected; areas never cut are absent
    pub fn cut_hours_by_area(&self) -> BTreeMap<AreaId, u32> {
        let mut hours = BTreeMap::new();
        for area in self.entries.iter().flat_map(|e| &e.cut_areas) {
            *hours.entry(*area).or_insert(0) += 1;
        }
        hours
    }

    /// Off intervals of one area, in hour order
    pub fn off_intervals(&self, area: AreaId) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.cuts(area))
            .map(ScheduleEntry::interval_label)
            .collect()
    }
}

/// Clock label of the start of `hour`, offset by the day start hour
pub fn clock_label(day_start_hour: u8, hour: u8) -> String {
    format!("{:02}:00", (u16::from(day_start_hour) + u16::from(hour)) % u16::from(HOURS_PER_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hour: u8, cut: Vec<AreaId>, unmet_kw: f64) -> ScheduleEntry {
        ScheduleEntry {
            hour,
            start_time: clock_label(0, hour),
            end_time: clock_label(0, hour + 1),
            cut_areas: cut,
            shortfall_kw: 0.0,
            shed_kw: 0.0,
            unmet_kw,
        }
    }

    fn schedule(entries: Vec<ScheduleEntry>) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            generation: 0,
            generated_at: Utc::now(),
            budget: PowerBudget::power_kw(100.0),
            available_power_kw: 100.0,
            total_demand_kw: 150.0,
            entries,
            strategy: "test".into(),
        }
    }

    #[test]
    fn test_clock_label_wraps_midnight() {
        assert_eq!(clock_label(0, 0), "00:00");
        assert_eq!(clock_label(0, 24), "00:00");
        assert_eq!(clock_label(6, 17), "23:00");
        assert_eq!(clock_label(6, 18), "00:00");
        assert_eq!(clock_label(23, 23), "22:00");
    }

    #[test]
    fn test_daily_energy_spreads_over_hours() {
        let budget = PowerBudget::daily_energy_kwh(2400.0);
        assert_eq!(budget.hourly_power_kw().unwrap(), 100.0);
    }

    #[test]
    fn test_budget_rejects_negative_values() {
        let err = PowerBudget::power_kw(-1.0).hourly_power_kw().unwrap_err();
        assert_eq!(err.field(), Some("available_power_kw"));
        let err = PowerBudget::daily_energy_kwh(f64::NAN).hourly_power_kw().unwrap_err();
        assert_eq!(err.field(), Some("available_energy_kwh"));
    }

    #[test]
    fn test_budget_json_is_tagged() {
        let json = serde_json::to_value(PowerBudget::power_kw(5.0)).unwrap();
        assert_eq!(json["mode"], "power");
        assert_eq!(json["available_power_kw"], 5.0);
    }

    #[test]
    fn test_cut_hours_and_off_intervals() {
        let s = schedule(vec![
            entry(0, vec![AreaId(1)], 0.0),
            entry(1, vec![AreaId(1), AreaId(2)], 0.0),
            entry(2, vec![], 0.0),
        ]);
        let hours = s.cut_hours_by_area();
        assert_eq!(hours[&AreaId(1)], 2);
        assert_eq!(hours[&AreaId(2)], 1);
        assert!(!hours.contains_key(&AreaId(3)));
        assert_eq!(s.off_intervals(AreaId(2)), vec!["01:00-02:00".to_string()]);
    }

    #[test]
    fn test_unmet_summary() {
        let s = schedule(vec![entry(0, vec![], 0.0), entry(1, vec![AreaId(1)], 25.0)]);
        assert_eq!(s.unmet_hours(), 1);
        assert!(s.has_unmet_demand());
        assert_eq!(s.max_unmet_kw(), 25.0);
        assert!(s.entry(1).unwrap().is_cut());
        assert!(s.entry(7).is_none());
    }
}
