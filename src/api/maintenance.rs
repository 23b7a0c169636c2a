use axum::{
    extract::{Path, Query, State},
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
    domain::{AnnotatedTicket, AreaId, TicketId},
    repo::TicketFilter,
};

/// Request to open a maintenance ticket
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitTicketRequest {
    pub area_id: AreaId,
    #[validate(length(min = 1, max = 2000))]
    pub issue: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    /// `all` (default) or `open`
    #[serde(default)]
    pub status: TicketFilter,
}

/// GET /api/v1/maintenance - Tickets, most critical area first
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Json<ApiResponse<Vec<AnnotatedTicket>>> {
    Json(listing(state.controller.list_tickets(query.status)))
}

/// POST /api/v1/maintenance - Submit a ticket against an area
pub async fn submit_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubmitTicketRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let ticket = state.controller.submit_ticket(request.area_id, &request.issue)?;
    Ok(success(ticket).created())
}

/// GET /api/v1/maintenance/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<Json<ApiResponse<AnnotatedTicket>>, ApiError> {
    Ok(Json(success(state.controller.get_ticket(id)?)))
}

/// POST /api/v1/maintenance/:id/resolve - Mark a ticket resolved (idempotent)
pub async fn resolve_ticket(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<Json<ApiResponse<AnnotatedTicket>>, ApiError> {
    Ok(Json(success(state.controller.resolve_ticket(id)?)))
}
