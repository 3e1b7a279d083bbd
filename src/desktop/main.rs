/**
 * Timetrack Sync Agent Entry Point
 *
 * Headless runner for the offline save pipeline. Loads configuration, checks
 * the project API, drains whatever the desktop app left queued and keeps the
 * periodic watcher running until Ctrl-C.
 */
use std::sync::Arc;
use timetrack::desktop::{CheckOptions, Config, DrainAttempt, HttpProjectApi, SyncOrchestrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = Config::load()?;
    tracing::info!("[STARTUP] Data directory: {}", config.data_dir().display());
    match config.api_base() {
        Some(base) => tracing::info!("[STARTUP] Project API: {}", base),
        None => tracing::warn!("[STARTUP] No project API configured, saves stay local"),
    }

    let api = Arc::new(HttpProjectApi::new(config.clone())?);
    let sync = SyncOrchestrator::from_config(&config, api);

    let mut events = sync.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => tracing::info!("[EVENT] {}", json),
                    Err(e) => tracing::warn!("[EVENT] Unserializable event: {}", e),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[EVENT] Skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    match sync.check_queue(CheckOptions::default()).await {
        Ok(DrainAttempt::Skipped(reason)) => {
            tracing::info!("[STARTUP] Initial queue check skipped: {}", reason.code());
        }
        Ok(attempt) => tracing::info!("[STARTUP] Initial drain saved {} project(s)", attempt.drained()),
        Err(e) => tracing::error!("[STARTUP] Initial queue check failed: {}", e),
    }

    sync.start_watcher();
    tokio::signal::ctrl_c().await?;

    tracing::info!("[SHUTDOWN] Stopping queue watcher");
    sync.stop_watcher();
    event_logger.abort();

    let snapshot = sync.connectivity().await;
    tracing::info!(
        "[SHUTDOWN] Status {:?}, {:?} save(s) still queued",
        snapshot.status,
        snapshot.pending
    );
    Ok(())
}
