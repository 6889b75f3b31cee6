//! Transcript entry types.
//!
//! Entries are kept as typed widgets rather than markup so that the view layer
//! decides how they look and tests can assert on their shape.

use crate::table::ResultTable;
use serde::{Deserialize, Serialize};

pub const QUERY_CANCELLED_TEXT: &str = "Query cancelled: the agent was changed.";

/// A collapsible panel holding the SQL that produced an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPanel {
    /// Element index used by the page to toggle this panel
    pub index: String,
    /// Pretty-printed SQL text
    pub sql: String,
}

/// Body of a bot reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotContent {
    /// Markdown prose
    Prose { markdown: String },
    /// A single value collapsed out of a 1x1 table
    Value {
        text: String,
        sql: Option<SqlPanel>,
    },
    /// A data table with a lazily resolved insight action
    Table {
        table_id: String,
        table: ResultTable,
        sql: Option<SqlPanel>,
    },
    /// A failed turn
    Error { message: String },
}

/// A single entry in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageWidget {
    /// What the user asked
    User { text: String },
    /// Provisional placeholder shown while the agent works
    Thinking,
    /// The agent's reply
    Bot { content: BotContent },
}

impl MessageWidget {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn bot(content: BotContent) -> Self {
        Self::Bot { content }
    }

    /// Builds the error bubble shown when a turn fails.
    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self::Bot {
            content: BotContent::Error {
                message: format!(
                    "Sorry, I encountered an error: {detail}. Please try again later."
                ),
            },
        }
    }

    /// Bubble left in place of a reply the user walked away from.
    pub fn cancelled() -> Self {
        Self::Bot {
            content: BotContent::Error {
                message: QUERY_CANCELLED_TEXT.to_string(),
            },
        }
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, Self::Thinking)
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, Self::Bot { .. })
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}
