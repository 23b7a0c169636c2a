use axum::{extract::State, Json};

use crate::{
    api::response::{success, ApiResponse},
    controller::{AppState, DashboardSummary},
    power_flow::NetworkSnapshot,
};

/// GET /api/v1/network - Plant, feeder and area hierarchy under the current schedule
pub async fn get_network(State(state): State<AppState>) -> Json<ApiResponse<NetworkSnapshot>> {
    Json(success(state.controller.network().await))
}

/// GET /api/v1/dashboard - Demand, supply and tier summary
pub async fn get_dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardSummary>> {
    Json(success(state.controller.dashboard().await))
}
