use std::sync::Arc;

use catchat::adapters::http::app_router;
use catchat::application::{Registry, RelayService};
use catchat::config::AppConfig;
use catchat::domain::chat::MessageFilter;
use catchat::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;

    telemetry::init(&config.server.log_level, config.is_production())?;

    tracing::info!("CatChat relay starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(Registry::new());
    let relay = RelayService::new(registry, MessageFilter::default(), config.relay.settings());
    let app = app_router(relay, &config.server.static_dir);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        static_dir = %config.server.static_dir.display(),
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
