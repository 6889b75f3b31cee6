use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use genie_application::ClientStore;
use genie_infrastructure::ServerConfig;
use genie_interaction::{GenieApiAgent, ServingEndpointAgent, WorkspaceSettings};

use crate::app::AppState;

pub struct AppBootstrap {
    pub app_state: AppState,
}

impl AppBootstrap {
    /// Builds the remote clients from config and wires the application.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let workspace = WorkspaceSettings::from_env_with_defaults(
            config.databricks_host.clone(),
            config.serving_endpoint_name.clone(),
            config.databricks_token.clone(),
        );

        match workspace.resolve() {
            Ok(env) => tracing::info!(
                "[Bootstrap] Workspace host: {}, serving endpoint: {}",
                env.host,
                env.serving_endpoint_name.as_deref().unwrap_or("<unset>")
            ),
            Err(e) => tracing::warn!("[Bootstrap] {}; remote calls will fail until it is set", e),
        }

        let mut genie_agent = GenieApiAgent::new(workspace.clone())
            .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
            .with_max_poll_attempts(config.max_poll_attempts);
        let mut serving_agent = ServingEndpointAgent::new(workspace.clone());

        if let Some(secs) = config.request_timeout_secs {
            let timeout = Duration::from_secs(secs);
            genie_agent = genie_agent
                .with_request_timeout(timeout)
                .context("Failed to configure Genie client")?;
            serving_agent = serving_agent
                .with_request_timeout(timeout)
                .context("Failed to configure serving endpoint client")?;
        }

        let clients =
            ClientStore::with_idle_timeout(Duration::from_secs(config.client_idle_timeout_secs));
        let app_state = AppState::new(Arc::new(genie_agent), Arc::new(serving_agent), workspace)?
            .with_clients(clients);
        tracing::info!("[Bootstrap] Application state ready");
        Ok(Self { app_state })
    }
}
