use anyhow::Result;
use gridshed::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }
    init_tracing();

    let cfg = Config::load()?;
    let app_state = controller::AppState::new(cfg.clone())?;
    let app = api::router(app_state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "Server binding to 0.0.0.0 - service will be accessible from network! \
            For production, bind to 127.0.0.1 unless behind a firewall/reverse proxy."
        );
    }

    info!(
        %addr,
        rotation = %cfg.scheduler.rotation,
        history_generations = cfg.scheduler.history_generations,
        "starting gridshed"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
