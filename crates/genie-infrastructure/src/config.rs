use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 600;
pub const DEFAULT_CLIENT_IDLE_TIMEOUT_SECS: u64 = 60 * 60;

/// Server configuration loaded from `config.toml`.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    /// Workspace host; `DATABRICKS_HOST` takes precedence at call time
    pub databricks_host: Option<String>,
    pub serving_endpoint_name: Option<String>,
    /// Token used when a request carries no forwarded access token
    pub databricks_token: Option<String>,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    /// Per-request timeout for remote calls; none when unset
    pub request_timeout_secs: Option<u64>,
    /// Browser state untouched for this long is dropped
    pub client_idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            databricks_host: None,
            serving_endpoint_name: None,
            databricks_token: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout_secs: None,
            client_idle_timeout_secs: DEFAULT_CLIENT_IDLE_TIMEOUT_SECS,
        }
    }
}
