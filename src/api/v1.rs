use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    api::{areas, feeders, health, maintenance, schedule, status},
    controller::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/feeders", get(feeders::list_feeders).post(feeders::create_feeder))
        .route("/feeders/:id", axum::routing::delete(feeders::delete_feeder))
        .route("/areas", get(areas::list_areas).post(areas::create_area))
        .route(
            "/areas/:id",
            get(areas::get_area)
                .put(areas::update_area)
                .delete(areas::delete_area),
        )
        .route("/schedule", get(schedule::get_schedule))
        .route("/schedule/generate", post(schedule::generate_schedule))
        .route("/network", get(status::get_network))
        .route("/dashboard", get(status::get_dashboard))
        .route(
            "/maintenance",
            get(maintenance::list_tickets).post(maintenance::submit_ticket),
        )
        .route("/maintenance/:id", get(maintenance::get_ticket))
        .route("/maintenance/:id/resolve", post(maintenance::resolve_ticket))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/healthz", get(health::liveness_check))
        .with_state(state)
}
