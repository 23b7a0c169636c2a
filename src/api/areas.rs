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
    domain::{Area, AreaId, AreaUpdate, AreaView, FacilityCounts, FeederId, NewArea},
};

/// Request to create an area; facility counts and population default to 0
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAreaRequest {
    pub feeder_id: FeederId,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub load_kw: f64,
    #[serde(default)]
    pub population: u64,
    #[serde(flatten)]
    pub facilities: FacilityCounts,
}

impl From<CreateAreaRequest> for NewArea {
    fn from(request: CreateAreaRequest) -> Self {
        NewArea {
            feeder_id: request.feeder_id,
            name: request.name,
            load_kw: request.load_kw,
            population: request.population,
            facilities: request.facilities,
        }
    }
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAreaRequest {
    pub feeder_id: Option<FeederId>,
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub load_kw: Option<f64>,
    pub population: Option<u64>,
    /// Replaces all facility counts at once
    pub facilities: Option<FacilityCounts>,
}

impl From<UpdateAreaRequest> for AreaUpdate {
    fn from(request: UpdateAreaRequest) -> Self {
        AreaUpdate {
            feeder_id: request.feeder_id,
            name: request.name,
            load_kw: request.load_kw,
            population: request.population,
            facilities: request.facilities,
        }
    }
}

/// GET /api/v1/areas - Areas with their tier and feeder name
pub async fn list_areas(State(state): State<AppState>) -> Json<ApiResponse<Vec<AreaView>>> {
    Json(listing(state.controller.list_areas()))
}

/// GET /api/v1/areas/:id
pub async fn get_area(
    State(state): State<AppState>,
    Path(id): Path<AreaId>,
) -> Result<Json<ApiResponse<AreaView>>, ApiError> {
    Ok(Json(success(state.controller.get_area(id)?)))
}

/// POST /api/v1/areas - Create an area, returning it with its derived tier
pub async fn create_area(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAreaRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let view = state.controller.create_area(request.into())?;
    Ok(success(view).created())
}

/// PUT /api/v1/areas/:id - Update an area; its tier is recomputed
pub async fn update_area(
    State(state): State<AppState>,
    Path(id): Path<AreaId>,
    ApiJson(request): ApiJson<UpdateAreaRequest>,
) -> Result<Json<ApiResponse<AreaView>>, ApiError> {
    request.validate()?;
    let view = state.controller.update_area(id, &request.into())?;
    Ok(Json(success(view)))
}

/// DELETE /api/v1/areas/:id
pub async fn delete_area(
    State(state): State<AppState>,
    Path(id): Path<AreaId>,
) -> Result<Json<ApiResponse<Area>>, ApiError> {
    Ok(Json(success(state.controller.delete_area(id)?)))
}
