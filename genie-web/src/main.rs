use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use genie_infrastructure::ConfigService;
use genie_web::app::AppBootstrap;
use tracing_subscriber::EnvFilter;

const EVICTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config_service = ConfigService::new(config_path).context("Failed to resolve config path")?;
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    init_tracing(&config.log_level);
    tracing::info!("Starting genie-chat v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Config file: {}", config_service.path().display());

    let bootstrap = AppBootstrap::new(&config)?;
    bootstrap
        .app_state
        .clients
        .start_eviction_scheduler(EVICTION_SWEEP_INTERVAL);
    let app = genie_web::router(Arc::new(bootstrap.app_state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level plus debug for this crate.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{log_level},genie_web=debug")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
