pub mod areas;
pub mod error;
pub mod extract;
pub mod feeders;
pub mod health;
pub mod maintenance;
pub mod response;
pub mod schedule;
pub mod status;
pub mod v1;

use axum::{http::HeaderValue, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::{config::Config, controller::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new().nest("/api/v1", v1::router(state));

    if cfg.server.enable_cors {
        match cfg.server.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([
                        axum::http::Method::GET,
                        axum::http::Method::POST,
                        axum::http::Method::PUT,
                        axum::http::Method::DELETE,
                    ])
                    .allow_headers([axum::http::header::CONTENT_TYPE]);
                router = router.layer(cors);
            }
            Err(err) => {
                warn!(origin = %cfg.server.cors_origin, error = %err, "invalid CORS origin, CORS disabled");
            }
        }
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(cfg.server.request_timeout_secs))),
        )
        .layer(TraceLayer::new_for_http())
}
