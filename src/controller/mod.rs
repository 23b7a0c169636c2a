use anyhow::Result;
use chrono::{DateTime, Local, Timelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::config::Config;
use crate::domain::{
    AnnotatedTicket, Area, AreaId, AreaUpdate, AreaView, ClassifiedArea, Feeder, FeederId, MaintenanceTicket, NewArea,
    NewFeeder, PowerBudget, PriorityClassifier, Schedule, TicketId, TierCounts,
};
use crate::error::{Entity, PlannerError, PlannerResult};
use crate::optimizer::{RollingBlackoutScheduler, RotationHistory};
use crate::power_flow::{aggregate, feeder_demand, FeederDemand, NetworkSnapshot};
use crate::repo::{FeederRemoval, Repositories, TicketFilter, TopologySnapshot};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub controller: Arc<SheddingController>,
    pub repos: Arc<Repositories>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        cfg.validate()?;
        let repos = Arc::new(Repositories::new(&cfg));
        let controller = Arc::new(SheddingController::new(&cfg, repos.clone()));
        Ok(Self {
            cfg,
            controller,
            repos,
        })
    }
}

/// Figures shown on the operator dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_demand_kw: f64,
    /// Hourly supply of the current schedule, absent until one is generated
    pub available_power_kw: Option<f64>,
    pub tier_counts: TierCounts,
    pub feeder_count: usize,
    pub area_count: usize,
    /// Local wall-clock hour (0-23)
    pub current_hour: u32,
    pub unmet_hours: usize,
    pub schedule_generated_at: Option<DateTime<Utc>>,
}

/// Ties the topology, classifier and scheduler together and publishes the
/// current schedule
pub struct SheddingController {
    repos: Arc<Repositories>,
    classifier: PriorityClassifier,
    scheduler: RollingBlackoutScheduler,
    /// Held for the whole generation so history and published schedule agree
    history: Mutex<RotationHistory>,
    schedule: RwLock<Option<Arc<Schedule>>>,
}

impl SheddingController {
    pub fn new(cfg: &Config, repos: Arc<Repositories>) -> Self {
        let scheduler = RollingBlackoutScheduler::new(cfg.scheduler.clone());
        let history = Mutex::new(scheduler.new_history());
        Self {
            repos,
            classifier: PriorityClassifier::new(cfg.classifier.clone()),
            scheduler,
            history,
            schedule: RwLock::new(None),
        }
    }

    fn epsilon_kw(&self) -> f64 {
        self.scheduler.config().epsilon_kw
    }

    /// Consistent snapshot with every area classified
    fn classified(&self) -> (TopologySnapshot, Vec<ClassifiedArea>) {
        let snapshot = self.repos.topology.snapshot();
        let areas = self.classifier.classify_all(&snapshot.areas);
        (snapshot, areas)
    }

    fn view(&self, area: Area, snapshot: Option<&TopologySnapshot>) -> AreaView {
        let feeder_name = match snapshot {
            Some(s) => s.feeder_name(area.feeder_id).map(str::to_string),
            None => self.repos.topology.feeder(area.feeder_id).map(|f| f.name),
        }
        .unwrap_or_default();
        AreaView {
            area: self.classifier.classify_area(area),
            feeder_name,
        }
    }

    fn annotate(&self, ticket: MaintenanceTicket) -> AnnotatedTicket {
        let area = self
            .repos
            .topology
            .area(ticket.area_id)
            .map(|a| self.classifier.classify_area(a));
        AnnotatedTicket {
            area_name: area.as_ref().map(|a| a.area.name.clone()),
            area_priority: area.map(|a| a.priority),
            ticket,
        }
    }

    // ========================================================================
    // Topology
    // ========================================================================

    pub fn list_feeders(&self) -> Vec<FeederDemand> {
        let snapshot = self.repos.topology.snapshot();
        let totals = aggregate(&snapshot.areas);
        feeder_demand(&snapshot.feeders, &totals, self.epsilon_kw())
    }

    pub fn create_feeder(&self, input: NewFeeder) -> PlannerResult<Feeder> {
        self.repos.topology.create_feeder(input)
    }

    pub fn delete_feeder(&self, id: FeederId) -> PlannerResult<FeederRemoval> {
        self.repos.topology.delete_feeder(id)
    }

    pub fn list_areas(&self) -> Vec<AreaView> {
        let snapshot = self.repos.topology.snapshot();
        snapshot
            .areas
            .iter()
            .cloned()
            .map(|area| self.view(area, Some(&snapshot)))
            .collect()
    }

    pub fn get_area(&self, id: AreaId) -> PlannerResult<AreaView> {
        let area = self
            .repos
            .topology
            .area(id)
            .ok_or_else(|| PlannerError::not_found(Entity::Area, id))?;
        Ok(self.view(area, None))
    }

    pub fn create_area(&self, input: NewArea) -> PlannerResult<AreaView> {
        let area = self.repos.topology.create_area(input)?;
        Ok(self.view(area, None))
    }

    pub fn update_area(&self, id: AreaId, update: &AreaUpdate) -> PlannerResult<AreaView> {
        let area = self.repos.topology.update_area(id, update)?;
        Ok(self.view(area, None))
    }

    pub fn delete_area(&self, id: AreaId) -> PlannerResult<Area> {
        self.repos.topology.delete_area(id)
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Generate and publish a new schedule, replacing the previous one
    pub async fn generate_schedule(&self, budget: PowerBudget) -> PlannerResult<Arc<Schedule>> {
        let mut history = self.history.lock().await;
        let (_, areas) = self.classified();
        let schedule = Arc::new(self.scheduler.generate(&areas, budget, &mut history)?);
        *self.schedule.write().await = Some(schedule.clone());
        Ok(schedule)
    }

    pub async fn current_schedule(&self) -> Option<Arc<Schedule>> {
        self.schedule.read().await.clone()
    }

    pub async fn network(&self) -> NetworkSnapshot {
        let (snapshot, areas) = self.classified();
        let schedule = self.current_schedule().await;
        NetworkSnapshot::build(&snapshot.feeders, &areas, schedule.as_deref())
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        let (snapshot, areas) = self.classified();
        let schedule = self.current_schedule().await;
        DashboardSummary {
            total_demand_kw: aggregate(&snapshot.areas).total_demand_kw,
            available_power_kw: schedule.as_ref().map(|s| s.available_power_kw),
            tier_counts: areas.iter().collect(),
            feeder_count: snapshot.feeders.len(),
            area_count: snapshot.areas.len(),
            current_hour: Local::now().hour(),
            unmet_hours: schedule.as_ref().map_or(0, |s| s.unmet_hours()),
            schedule_generated_at: schedule.as_ref().map(|s| s.generated_at),
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    pub fn submit_ticket(&self, area_id: AreaId, issue: &str) -> PlannerResult<AnnotatedTicket> {
        let ticket = self
            .repos
            .maintenance
            .submit(&self.repos.topology, area_id, issue)?;
        Ok(self.annotate(ticket))
    }

    pub fn list_tickets(&self, filter: TicketFilter) -> Vec<AnnotatedTicket> {
        let (_, areas) = self.classified();
        self.repos.maintenance.list(&areas, filter)
    }

    pub fn get_ticket(&self, id: TicketId) -> PlannerResult<AnnotatedTicket> {
        Ok(self.annotate(self.repos.maintenance.get(id)?))
    }

    pub fn resolve_ticket(&self, id: TicketId) -> PlannerResult<AnnotatedTicket> {
        let ticket = self.repos.maintenance.resolve(id)?;
        info!(ticket_id = %id, area_id = %ticket.area_id, "ticket closed");
        Ok(self.annotate(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FacilityCounts, PriorityTier};

    fn state() -> AppState {
        AppState::new(Config::default()).unwrap()
    }

    fn new_area(feeder_id: FeederId, name: &str, load_kw: f64, facilities: FacilityCounts) -> NewArea {
        NewArea {
            feeder_id,
            name: name.to_string(),
            load_kw,
            population: 0,
            facilities,
        }
    }

    /// North: A hospital (300), B school (200), C plain (150)
    fn north(ctl: &SheddingController) -> (FeederId, [AreaId; 3]) {
        let feeder = ctl.create_feeder(NewFeeder::new("North", Some(1000.0))).unwrap();
        let a = ctl
            .create_area(new_area(
                feeder.id,
                "A",
                300.0,
                FacilityCounts {
                    hospitals: 1,
                    ..Default::default()
                },
            ))
            .unwrap();
        let b = ctl
            .create_area(new_area(
                feeder.id,
                "B",
                200.0,
                FacilityCounts {
                    schools: 1,
                    ..Default::default()
                },
            ))
            .unwrap();
        let c = ctl
            .create_area(new_area(feeder.id, "C", 150.0, FacilityCounts::default()))
            .unwrap();
        (feeder.id, [a.area.id(), b.area.id(), c.area.id()])
    }

    #[tokio::test]
    async fn test_generate_publishes_schedule() {
        let state = state();
        let ctl = &state.controller;
        let (_, [_, _, c]) = north(ctl);

        assert!(ctl.current_schedule().await.is_none());
        let schedule = ctl.generate_schedule(PowerBudget::power_kw(500.0)).await.unwrap();
        assert!(schedule.entries.iter().all(|e| e.cut_areas == vec![c]));

        let current = ctl.current_schedule().await.unwrap();
        assert_eq!(current.id, schedule.id);
    }

    #[tokio::test]
    async fn test_invalid_budget_keeps_previous_schedule() {
        let state = state();
        let ctl = &state.controller;
        north(ctl);

        let first = ctl.generate_schedule(PowerBudget::power_kw(500.0)).await.unwrap();
        let err = ctl.generate_schedule(PowerBudget::power_kw(-10.0)).await.unwrap_err();
        assert_eq!(err.field(), Some("available_power_kw"));
        assert_eq!(ctl.current_schedule().await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_dashboard_reflects_topology_and_schedule() {
        let state = state();
        let ctl = &state.controller;
        north(ctl);

        let before = ctl.dashboard().await;
        assert_eq!(before.total_demand_kw, 650.0);
        assert_eq!(before.available_power_kw, None);
        assert_eq!(before.tier_counts.get(PriorityTier::Critical), 1);
        assert_eq!(before.tier_counts.get(PriorityTier::Medium), 1);
        assert_eq!(before.tier_counts.get(PriorityTier::Low), 1);
        assert_eq!(before.area_count, 3);
        assert!(before.current_hour < 24);

        ctl.generate_schedule(PowerBudget::power_kw(250.0)).await.unwrap();
        let after = ctl.dashboard().await;
        assert_eq!(after.available_power_kw, Some(250.0));
        assert_eq!(after.unmet_hours, 24);
    }

    #[tokio::test]
    async fn test_feeder_delete_cascades_to_listings() {
        let state = state();
        let ctl = &state.controller;
        let (feeder, _) = north(ctl);
        let other = ctl.create_feeder(NewFeeder::new("South", None)).unwrap();
        ctl.create_area(new_area(other.id, "D", 10.0, FacilityCounts::default()))
            .unwrap();

        let removal = ctl.delete_feeder(feeder).unwrap();
        assert_eq!(removal.removed_areas.len(), 3);

        let areas = ctl.list_areas();
        assert_eq!(areas.len(), 1);
        assert!(areas.iter().all(|a| a.area.area.feeder_id != feeder));
        assert_eq!(areas[0].feeder_name, "South");

        let feeders = ctl.list_feeders();
        assert_eq!(feeders.len(), 1);
        assert_eq!(feeders[0].feeder.capacity_kw, 1000.0);
        assert_eq!(feeders[0].load_kw, 10.0);
    }

    #[tokio::test]
    async fn test_update_reclassifies_area() {
        let state = state();
        let ctl = &state.controller;
        let (_, [_, _, c]) = north(ctl);

        let update = AreaUpdate {
            facilities: Some(FacilityCounts {
                emergency_services: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        let view = ctl.update_area(c, &update).unwrap();
        assert_eq!(view.area.priority, PriorityTier::Critical);

        let schedule = ctl.generate_schedule(PowerBudget::power_kw(500.0)).await.unwrap();
        assert!(schedule.entries.iter().all(|e| !e.cuts(c)));
    }

    #[tokio::test]
    async fn test_network_reports_served_energy() {
        let state = state();
        let ctl = &state.controller;
        let (_, [_, _, c]) = north(ctl);
        ctl.generate_schedule(PowerBudget::power_kw(500.0)).await.unwrap();

        let net = ctl.network().await;
        let node = net.area(c).unwrap();
        assert_eq!(node.cut_hours, 24);
        assert_eq!(node.served_energy_kwh, 0.0);
        assert_eq!(net.plant.served_energy_kwh, 500.0 * 24.0);
    }

    #[tokio::test]
    async fn test_tickets_are_annotated() {
        let state = state();
        let ctl = &state.controller;
        let (_, [a, _, c]) = north(ctl);

        let low = ctl.submit_ticket(c, "  transformer hum ").unwrap();
        assert_eq!(low.ticket.issue, "transformer hum");
        assert_eq!(low.area_priority, Some(PriorityTier::Low));
        let critical = ctl.submit_ticket(a, "backup generator test").unwrap();

        let listed: Vec<TicketId> = ctl
            .list_tickets(TicketFilter::All)
            .iter()
            .map(|t| t.ticket.id)
            .collect();
        assert_eq!(listed, vec![critical.ticket.id, low.ticket.id]);

        let resolved = ctl.resolve_ticket(low.ticket.id).unwrap();
        assert!(resolved.ticket.resolved);
        assert_eq!(ctl.list_tickets(TicketFilter::Open).len(), 1);
        assert_eq!(ctl.get_ticket(low.ticket.id).unwrap().area_name.as_deref(), Some("C"));
    }
}
