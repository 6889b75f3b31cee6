//! Chat session domain module.
//!
//! This module contains the conversation thread model, the typed transcript
//! widgets, the submit-to-fetch handoff signal and user input types.
//!
//! # Module Structure
//!
//! - `model`: One conversation thread (`ChatSession`)
//! - `message`: Transcript entries (`MessageWidget`, `BotContent`, `SqlPanel`)
//! - `trigger`: Handoff signal between the submit and fetch stages (`ChatTrigger`)
//! - `user_input`: Free text or canned suggestions (`UserInput`)

mod message;
mod model;
mod trigger;
mod user_input;

// Re-export public API
pub use message::{BotContent, MessageWidget, QUERY_CANCELLED_TEXT, SqlPanel};
pub use model::ChatSession;
pub use trigger::ChatTrigger;
pub use user_input::{SUGGESTIONS, UserInput};
