use axum::{extract::State, Json};
use serde::Deserialize;
use std::{sync::Arc, time::Instant};

use crate::{
    api::{
        error::ApiError,
        extract::ApiJson,
        response::{success, ApiResponse},
    },
    controller::AppState,
    domain::{PowerBudget, Schedule},
    error::{PlannerError, PlannerResult},
};

/// Request to generate a schedule; exactly one supply figure must be given
#[derive(Debug, Default, Deserialize)]
pub struct GenerateScheduleRequest {
    /// Power available in every hour (kW)
    pub available_power_kw: Option<f64>,
    /// Energy available over the whole day (kWh)
    pub available_energy_kwh: Option<f64>,
}

impl GenerateScheduleRequest {
    pub fn budget(&self) -> PlannerResult<PowerBudget> {
        match (self.available_power_kw, self.available_energy_kwh) {
            (Some(power), None) => Ok(PowerBudget::power_kw(power)),
            (None, Some(energy)) => Ok(PowerBudget::daily_energy_kwh(energy)),
            (Some(_), Some(_)) => Err(PlannerError::validation(
                "available_power_kw",
                "give either available_power_kw or available_energy_kwh, not both",
            )),
            (None, None) => Err(PlannerError::validation(
                "available_power_kw",
                "available_power_kw or available_energy_kwh is required",
            )),
        }
    }
}

/// POST /api/v1/schedule/generate - Generate and publish a 24-hour schedule
pub async fn generate_schedule(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateScheduleRequest>,
) -> Result<Json<ApiResponse<Arc<Schedule>>>, ApiError> {
    let budget = request.budget()?;
    let start = Instant::now();
    let schedule = state.controller.generate_schedule(budget).await?;
    let duration_ms = start.elapsed().as_millis() as u64;
    Ok(Json(success(schedule).with_duration(duration_ms)))
}

/// GET /api/v1/schedule - The most recently generated schedule
pub async fn get_schedule(State(state): State<AppState>) -> Result<Json<ApiResponse<Arc<Schedule>>>, ApiError> {
    state
        .controller
        .current_schedule()
        .await
        .map(|schedule| Json(success(schedule)))
        .ok_or_else(|| ApiError::NotFound("no schedule has been generated yet".to_string()))
}
