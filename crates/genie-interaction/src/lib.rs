//! HTTP clients for the Databricks workspace.
//!
//! - [`GenieApiAgent`]: conversations with a Genie space
//! - [`ServingEndpointAgent`]: chat completions used for table insights

pub mod config;
pub mod genie_api_agent;
pub mod serving_endpoint_agent;
pub mod sql_format;

pub use config::{WorkspaceEnv, WorkspaceSettings};
pub use genie_api_agent::GenieApiAgent;
pub use serving_endpoint_agent::ServingEndpointAgent;
pub use sql_format::format_sql;
