//! Domain layer for Genie Chat.
//!
//! Pure types and interfaces: chat sessions and their transcripts, query
//! results, spaces and the selection lifecycle, forwarded user identity, and
//! the traits for the two remote services the application depends on.

pub mod agent;
pub mod error;
pub mod session;
pub mod space;
pub mod table;
pub mod user;

// Re-export common error type
pub use error::{GenieError, Result};
