//! Genie Chat web front end.
//!
//! - `app`: composition root and shared state
//! - `commands`: HTTP handlers
//! - `view`: view model, templates and markdown rendering

pub mod app;
pub mod commands;
pub mod view;

pub use commands::router;
