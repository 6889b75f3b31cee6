//! Filesystem-backed infrastructure: config file location and loading.

pub mod config;
pub mod config_service;
pub mod paths;

pub use config::ServerConfig;
pub use config_service::ConfigService;
pub use paths::{GeniePaths, PathError};
