use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::time::Instant;

use crate::controller::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    topology: ComponentHealth,
    scheduler: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: u64, detail: Option<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(latency_ms),
            detail,
        }
    }
}

/// GET /health - Health of the topology store and scheduler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let dashboard = state.controller.dashboard().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let schedule_detail = match dashboard.schedule_generated_at {
        Some(at) => format!("last generated {}", at.to_rfc3339()),
        None => "no schedule generated".to_string(),
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks {
            topology: ComponentHealth::healthy(
                latency_ms,
                Some(format!(
                    "{} feeders, {} areas",
                    dashboard.feeder_count, dashboard.area_count
                )),
            ),
            scheduler: ComponentHealth::healthy(latency_ms, Some(schedule_detail)),
        },
    };

    tracing::debug!(duration_ms = latency_ms, "Health check completed");
    (StatusCode::OK, Json(response))
}

/// GET /health/live - Liveness probe
///
/// Returns 200 if the application is running
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
