use std::net::SocketAddr;

use anyhow::Context;
use house_points::bootstrap::initialize_record_store;
use house_points::state::AppState;
use house_points::{app, config::APP_CONFIG, utils::tracing::init_standard_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = APP_CONFIG.clone();
    init_standard_tracing(env!("CARGO_CRATE_NAME"), &config.log_level);

    tracing::info!("Starting application...");

    let state = AppState::from_config(config)?;

    tracing::info!("Checking record store...");
    if let Err(e) = initialize_record_store(&state).await {
        tracing::error!("{:#}", e);
        tracing::warn!("Continuing with demo data until the record store is reachable...");
    }

    let http_address = format!("0.0.0.0:{}", state.config.port);
    let app = app::create_app(state);

    tracing::info!("HTTP server listening on {}", &http_address);
    let listener = tokio::net::TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("Failed to bind {}", http_address))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server stopped")?;

    Ok(())
}
