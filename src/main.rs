use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use api_shared::auth::api_key_from_env_value;
use worklist_core::{
    SnapshotSource, WorklistConfig, fetch_timeout_from_env_value, reference_zone_from_env_value,
};

/// Main entry point for the worklist application
///
/// Loads the care snapshot once, resolves configuration from the environment and serves the REST
/// API (with OpenAPI/Swagger UI) until interrupted.
///
/// # Environment Variables
/// - `WORKLIST_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WORKLIST_SNAPSHOT`: Care snapshot file backing the providers (required)
/// - `WORKLIST_TIMEZONE`: Reference timezone for "today" (default: "Asia/Ho_Chi_Minh")
/// - `WORKLIST_FETCH_TIMEOUT_MS`: Per-fetch timeout in milliseconds (default: 5000)
/// - `API_KEY`: API key every worklist request must present in `x-api-key` (required)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("worklist_run=info".parse()?)
                .add_directive("worklist_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WORKLIST_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let reference_zone = reference_zone_from_env_value(std::env::var("WORKLIST_TIMEZONE").ok())?;
    let fetch_timeout =
        fetch_timeout_from_env_value(std::env::var("WORKLIST_FETCH_TIMEOUT_MS").ok())?;
    let cfg = Arc::new(WorklistConfig::new(reference_zone, fetch_timeout)?);

    let api_key = api_key_from_env_value(std::env::var("API_KEY").ok())?;

    let snapshot_path = std::env::var("WORKLIST_SNAPSHOT")
        .map(PathBuf::from)
        .map_err(|_| anyhow::anyhow!("WORKLIST_SNAPSHOT must point to a care snapshot file"))?;
    if !snapshot_path.exists() {
        anyhow::bail!(
            "Care snapshot file does not exist: {}",
            snapshot_path.display()
        );
    }
    let source = SnapshotSource::load(&snapshot_path)?;

    tracing::info!(
        zone = %cfg.reference_zone(),
        timeout_ms = cfg.fetch_timeout().as_millis() as u64,
        snapshot = %snapshot_path.display(),
        "++ Starting worklist REST on {}",
        rest_addr
    );

    let app = router(AppState::new(cfg, source, api_key));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Worklist REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
