//! Path management for genie-chat configuration files.
//!
//! ```text
//! ~/.config/genie-chat/        # Config directory (platform dependent)
//! └── config.toml              # Server configuration
//! ```

use std::env;
use std::path::PathBuf;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GENIE_CHAT_CONFIG";

const APP_DIR_NAME: &str = "genie-chat";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct GeniePaths;

impl GeniePaths {
    /// Returns the genie-chat configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the default config file path.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Resolves the config file to read.
    ///
    /// Priority:
    /// 1. `explicit` (command-line argument)
    /// 2. `GENIE_CHAT_CONFIG`
    /// 3. `<config_dir>/genie-chat/config.toml`
    pub fn resolve_config_file(explicit: Option<PathBuf>) -> Result<PathBuf, PathError> {
        if let Some(path) = explicit {
            return Ok(path);
        }
        if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Self::config_file()
    }
}
