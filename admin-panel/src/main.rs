use admin_panel::config::get_configuration;
use admin_panel::startup::build_router;
use admin_panel::AppState;
use dotenvy::dotenv;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "admin-panel",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    admin_panel::services::metrics::init_metrics()?;

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    info!(api_base_url = %configuration.api.base_url, "Upstream API configured");

    let state = AppState::new(configuration)
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting admin-panel on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
