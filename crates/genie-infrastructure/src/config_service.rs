//! Configuration service implementation.
//!
//! Loads [`ServerConfig`] from the config file and caches it. A missing file
//! yields the defaults; a malformed file is an error.

use crate::config::ServerConfig;
use crate::paths::GeniePaths;
use genie_core::{GenieError, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides the bind address at startup.
pub const BIND_ADDR_ENV: &str = "GENIE_BIND_ADDR";

/// Configuration service that loads and caches the server configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ServerConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the resolved config file path.
    pub fn new(explicit_path: Option<PathBuf>) -> Result<Self> {
        let path = GeniePaths::resolve_config_file(explicit_path)
            .map_err(|e| GenieError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading from a specific file.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ServerConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| GenieError::internal("config cache lock poisoned"))?;
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let mut loaded = Self::load_config(&self.path)?;
        apply_env_overrides(&mut loaded);

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| GenieError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(path: &Path) -> Result<ServerConfig> {
        if !path.exists() {
            tracing::info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(ServerConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

fn apply_env_overrides(config: &mut ServerConfig) {
    if let Some(addr) = env::var(BIND_ADDR_ENV).ok().filter(|a| !a.trim().is_empty()) {
        config.bind_addr = addr.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service.get_config().expect("defaults should load");
        assert_eq!(config.max_poll_attempts, 600);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_loads_and_caches_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "serving_endpoint_name = \"insights-llm\"\npoll_interval_ms = 250\n",
        )
        .unwrap();

        let service = ConfigService::with_path(config_path.clone());
        let config = service.get_config().unwrap();
        assert_eq!(config.serving_endpoint_name.as_deref(), Some("insights-llm"));
        assert_eq!(config.poll_interval_ms, 250);

        // Cached value survives a file change until invalidated.
        std::fs::write(&config_path, "poll_interval_ms = 500\n").unwrap();
        assert_eq!(service.get_config().unwrap().poll_interval_ms, 250);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().poll_interval_ms, 500);
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "poll_interval_ms = \"fast\"\n").unwrap();

        let err = ConfigService::with_path(config_path).get_config().unwrap_err();
        assert!(matches!(err, GenieError::Serialization { .. }));
    }
}
