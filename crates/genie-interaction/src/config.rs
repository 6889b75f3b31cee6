//! Workspace connection settings.
//!
//! The workspace host, serving endpoint and fallback token are read from the
//! process environment each time a remote call is made, so a redeployed
//! environment takes effect without a restart. Values from the config file
//! act as defaults underneath the environment.

use genie_core::{GenieError, Result};
use std::env;

pub const HOST_ENV: &str = "DATABRICKS_HOST";
pub const SERVING_ENDPOINT_ENV: &str = "SERVING_ENDPOINT_NAME";
pub const TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Where to find the workspace, before the environment is consulted.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSettings {
    host: Option<String>,
    serving_endpoint_name: Option<String>,
    token: Option<String>,
    read_env: bool,
}

/// Settings resolved for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEnv {
    /// Base URL with scheme and without a trailing slash
    pub host: String,
    pub serving_endpoint_name: Option<String>,
    /// Token used when the request carries no forwarded token
    pub token: Option<String>,
}

impl WorkspaceEnv {
    /// Picks the forwarded token when present, else the fallback token.
    pub fn bearer<'a>(&'a self, forwarded: Option<&'a str>) -> Option<&'a str> {
        forwarded.or(self.token.as_deref())
    }
}

impl WorkspaceSettings {
    /// Settings that consult the environment first and fall back to the
    /// given values.
    pub fn from_env_with_defaults(
        host: Option<String>,
        serving_endpoint_name: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            host,
            serving_endpoint_name,
            token,
            read_env: true,
        }
    }

    /// Settings pinned to a host, ignoring the environment.
    pub fn fixed(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            serving_endpoint_name: None,
            token: None,
            read_env: false,
        }
    }

    pub fn with_serving_endpoint(mut self, name: impl Into<String>) -> Self {
        self.serving_endpoint_name = Some(name.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolves the settings for a call.
    ///
    /// # Errors
    ///
    /// Returns a config error when no host is configured anywhere.
    pub fn resolve(&self) -> Result<WorkspaceEnv> {
        let host = self
            .lookup(HOST_ENV, &self.host)
            .ok_or_else(|| GenieError::config(format!("{HOST_ENV} is not set")))?;

        Ok(WorkspaceEnv {
            host: normalize_host(&host),
            serving_endpoint_name: self
                .lookup(SERVING_ENDPOINT_ENV, &self.serving_endpoint_name),
            token: self.lookup(TOKEN_ENV, &self.token),
        })
    }

    /// The login page of the workspace, used as the logout target.
    pub fn login_url(&self) -> Option<String> {
        self.resolve()
            .ok()
            .map(|env| format!("{}/login.html", env.host))
    }

    fn lookup(&self, key: &str, fallback: &Option<String>) -> Option<String> {
        let from_env = if self.read_env {
            env::var(key).ok()
        } else {
            None
        };
        from_env
            .or_else(|| fallback.clone())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Adds `https://` to bare host names and strips trailing slashes.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
