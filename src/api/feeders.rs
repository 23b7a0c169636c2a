use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{
        error::ApiError,
        extract::ApiJson,
        response::{listing, success, ApiResponse},
    },
    controller::AppState,
    domain::{FeederId, NewFeeder},
    power_flow::FeederDemand,
    repo::FeederRemoval,
};

/// Request to create a feeder
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeederRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Defaults to the configured feeder capacity
    #[validate(range(min = 0.0))]
    pub capacity_kw: Option<f64>,
}

/// GET /api/v1/feeders - Feeders with area count and aggregated load
pub async fn list_feeders(State(state): State<AppState>) -> Json<ApiResponse<Vec<FeederDemand>>> {
    Json(listing(state.controller.list_feeders()))
}

/// POST /api/v1/feeders - Create a feeder
pub async fn create_feeder(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateFeederRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let feeder = state
        .controller
        .create_feeder(NewFeeder::new(request.name, request.capacity_kw))?;
    Ok(success(feeder).created())
}

/// DELETE /api/v1/feeders/:id - Delete a feeder and every area it owns
pub async fn delete_feeder(
    State(state): State<AppState>,
    Path(id): Path<FeederId>,
) -> Result<Json<ApiResponse<FeederRemoval>>, ApiError> {
    let removal = state.controller.delete_feeder(id)?;
    Ok(Json(success(removal)))
}
