use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{AreaId, ClassifiedArea, Feeder, FeederId, PriorityTier, Schedule, HOURS_PER_DAY};

/// Plant → feeder → area hierarchy with per-node attributes.
///
/// Served energy is what each node receives over the day under the current
/// schedule (load × hours connected); without a schedule every area is
/// assumed connected all day. No layout geometry is included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub schedule_id: Option<Uuid>,
    pub plant: PlantNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantNode {
    pub name: String,
    pub load_kw: f64,
    pub served_energy_kwh: f64,
    pub feeders: Vec<FeederNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeederNode {
    pub id: FeederId,
    pub name: String,
    pub capacity_kw: f64,
    pub load_kw: f64,
    pub served_energy_kwh: f64,
    pub areas: Vec<AreaNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaNode {
    pub id: AreaId,
    pub name: String,
    pub load_kw: f64,
    pub priority: PriorityTier,
    pub cut_hours: u32,
    pub served_energy_kwh: f64,
    /// `"HH:00-HH:00"` intervals during which the area is disconnected
    pub off_intervals: Vec<String>,
}

pub const PLANT_NAME: &str = "Power Plant";

impl NetworkSnapshot {
    pub fn build(feeders: &[Feeder], areas: &[ClassifiedArea], schedule: Option<&Schedule>) -> Self {
        let cut_hours = schedule.map(Schedule::cut_hours_by_area).unwrap_or_default();

        let mut by_feeder: BTreeMap<FeederId, Vec<AreaNode>> = BTreeMap::new();
        for classified in areas {
            let area = &classified.area;
            let hours_cut = cut_hours.get(&area.id).copied().unwrap_or(0);
            let hours_on = u32::from(HOURS_PER_DAY).saturating_sub(hours_cut);
            by_feeder.entry(area.feeder_id).or_default().push(AreaNode {
                id: area.id,
                name: area.name.clone(),
                load_kw: area.load_kw,
                priority: classified.priority,
                cut_hours: hours_cut,
                served_energy_kwh: area.load_kw * f64::from(hours_on),
                off_intervals: schedule.map(|s| s.off_intervals(area.id)).unwrap_or_default(),
            });
        }

        let feeder_nodes: Vec<FeederNode> = feeders
            .iter()
            .map(|feeder| {
                let areas = by_feeder.remove(&feeder.id).unwrap_or_default();
                FeederNode {
                    id: feeder.id,
                    name: feeder.name.clone(),
                    capacity_kw: feeder.capacity_kw,
                    load_kw: areas.iter().map(|a| a.load_kw).sum(),
                    served_energy_kwh: areas.iter().map(|a| a.served_energy_kwh).sum(),
                    areas,
                }
            })
            .collect();

        Self {
            schedule_id: schedule.map(|s| s.id),
            plant: PlantNode {
                name: PLANT_NAME.to_string(),
                load_kw: feeder_nodes.iter().map(|f| f.load_kw).sum(),
                served_energy_kwh: feeder_nodes.iter().map(|f| f.served_energy_kwh).sum(),
                feeders: feeder_nodes,
            },
        }
    }

    pub fn area(&self, id: AreaId) -> Option<&AreaNode> {
        self.plant
            .feeders
            .iter()
            .flat_map(|f| &f.areas)
            .find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{clock_label, Area, FacilityCounts, PowerBudget, ScheduleEntry};
    use chrono::Utc;

    fn classified(id: u64, feeder: u64, load_kw: f64, priority: PriorityTier) -> ClassifiedArea {
        ClassifiedArea {
            area: Area {
                id: AreaId(id),
                feeder_id: FeederId(feeder),
                name: format!("A{id}"),
                load_kw,
                population: 0,
                facilities: FacilityCounts::default(),
            },
            priority,
        }
    }

    fn schedule_cutting(area: AreaId, hours: &[u8]) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            generation: 0,
            generated_at: Utc::now(),
            budget: PowerBudget::power_kw(0.0),
            available_power_kw: 0.0,
            total_demand_kw: 0.0,
            entries: (0..HOURS_PER_DAY)
                .map(|hour| ScheduleEntry {
                    hour,
                    start_time: clock_label(0, hour),
                    end_time: clock_label(0, hour + 1),
                    cut_areas: if hours.contains(&hour) { vec![area] } else { vec![] },
                    shortfall_kw: 0.0,
                    shed_kw: 0.0,
                    unmet_kw: 0.0,
                })
                .collect(),
            strategy: "test".into(),
        }
    }

    fn feeders() -> Vec<Feeder> {
        vec![
            Feeder {
                id: FeederId(1),
                name: "North".into(),
                capacity_kw: 1000.0,
            },
            Feeder {
                id: FeederId(2),
                name: "Empty".into(),
                capacity_kw: 500.0,
            },
        ]
    }

    #[test]
    fn test_without_schedule_everything_is_served() {
        let areas = [
            classified(1, 1, 10.0, PriorityTier::Critical),
            classified(2, 1, 5.0, PriorityTier::Low),
        ];
        let net = NetworkSnapshot::build(&feeders(), &areas, None);

        assert_eq!(net.schedule_id, None);
        assert_eq!(net.plant.load_kw, 15.0);
        assert_eq!(net.plant.served_energy_kwh, 15.0 * 24.0);
        assert_eq!(net.plant.feeders.len(), 2);
        assert!(net.plant.feeders[1].areas.is_empty());
        assert!(net.area(AreaId(2)).unwrap().off_intervals.is_empty());
    }

    #[test]
    fn test_schedule_reduces_served_energy_and_lists_off_intervals() {
        let areas = [
            classified(1, 1, 10.0, PriorityTier::Critical),
            classified(2, 1, 5.0, PriorityTier::Low),
        ];
        let schedule = schedule_cutting(AreaId(2), &[0, 23]);
        let net = NetworkSnapshot::build(&feeders(), &areas, Some(&schedule));

        let cut = net.area(AreaId(2)).unwrap();
        assert_eq!(cut.cut_hours, 2);
        assert_eq!(cut.served_energy_kwh, 5.0 * 22.0);
        assert_eq!(cut.off_intervals, vec!["00:00-01:00", "23:00-00:00"]);
        assert_eq!(net.plant.feeders[0].served_energy_kwh, 240.0 + 110.0);
        assert_eq!(net.schedule_id, Some(schedule.id));
    }
}
