//! Chat session domain model.

use super::message::{BotContent, MessageWidget};
use crate::table::ResultTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One conversation thread.
///
/// A session contains:
/// - The rendered transcript, in display order
/// - The raw queries the user asked, in order (the first one is the title)
/// - Insights generated for tables in this transcript, keyed by table id
/// - Creation timestamp
///
/// Sessions live for as long as the browser session that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Raw user queries, oldest first
    pub queries: Vec<String>,
    /// Transcript widgets, oldest first
    pub messages: Vec<MessageWidget>,
    /// Generated insight text keyed by table id
    #[serde(default)]
    pub insights: HashMap<String, String>,
    /// Remote conversation this session continues, once one was started
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
}

impl ChatSession {
    /// Creates an empty session with a fresh id.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            queries: Vec::new(),
            messages: Vec::new(),
            insights: HashMap::new(),
            conversation_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Sidebar title: the first query asked in this session.
    pub fn title(&self) -> &str {
        self.queries.first().map(String::as_str).unwrap_or_default()
    }

    /// Appends the user's message followed by a thinking placeholder.
    pub fn push_user_turn(&mut self, text: &str) {
        self.queries.push(text.to_string());
        self.messages.push(MessageWidget::user(text));
        self.messages.push(MessageWidget::Thinking);
    }

    /// True while a thinking placeholder waits for its reply.
    pub fn has_pending_reply(&self) -> bool {
        self.messages.iter().any(MessageWidget::is_thinking)
    }

    /// Replaces the most recent thinking placeholder with `reply`.
    ///
    /// When no placeholder is present the reply is appended instead.
    pub fn resolve_pending(&mut self, reply: MessageWidget) {
        match self.messages.iter().rposition(MessageWidget::is_thinking) {
            Some(pos) => self.messages[pos] = reply,
            None => self.messages.push(reply),
        }
    }

    /// Finds a table rendered in this transcript by its id.
    pub fn table(&self, table_id: &str) -> Option<&ResultTable> {
        self.messages.iter().find_map(|message| match message {
            MessageWidget::Bot {
                content: BotContent::Table { table_id: id, table, .. },
            } if id == table_id => Some(table),
            _ => None,
        })
    }

    /// Records the insight generated for a table.
    pub fn set_insight(&mut self, table_id: impl Into<String>, text: impl Into<String>) {
        self.insights.insert(table_id.into(), text.into());
    }

    pub fn insight(&self, table_id: &str) -> Option<&str> {
        self.insights.get(table_id).map(String::as_str)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
