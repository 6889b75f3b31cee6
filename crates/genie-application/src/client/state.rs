use genie_core::session::{ChatSession, ChatTrigger, MessageWidget};
use genie_core::space::{SelectionError, SelectionState, Space};
use genie_core::table::ResultTable;
use genie_core::{GenieError, Result};

/// Everything the server remembers about one browser session.
///
/// Sessions are ordered most-recent-first. The visible transcript is always
/// the current session's messages, so the two cannot drift apart.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    /// Agent selection lifecycle
    pub selection: SelectionState,
    /// Message shown on the selection overlay after a failed confirm
    pub selection_error: Option<String>,
    /// Conversation sessions, most recent first
    pub sessions: Vec<ChatSession>,
    /// Id of the session shown in the transcript
    pub current_session: Option<String>,
    /// Remote conversation handle for the current session
    pub conversation_id: Option<String>,
    /// Handoff from the submit stage to the fetch stage
    pub trigger: ChatTrigger,
    /// Set while a query is in flight
    pub query_running: bool,
    /// Id of the session waiting for the in-flight reply
    pub pending_session: Option<String>,
    /// Whether the history sidebar is expanded
    pub sidebar_open: bool,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        let id = self.current_session.as_deref()?;
        self.session(id)
    }

    pub fn session(&self, session_id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn session_mut(&mut self, session_id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == session_id)
    }

    /// Position of the current session in the sidebar list.
    pub fn current_index(&self) -> Option<usize> {
        let id = self.current_session.as_deref()?;
        self.sessions.iter().position(|s| s.id == id)
    }

    /// The visible transcript; empty when no session is current.
    pub fn transcript(&self) -> &[MessageWidget] {
        self.current().map(|s| s.messages.as_slice()).unwrap_or_default()
    }

    /// Sidebar titles in display order.
    pub fn session_titles(&self) -> Vec<&str> {
        self.sessions.iter().map(ChatSession::title).collect()
    }

    /// Returns the current session, starting a new one at the top of the
    /// list when none is current.
    pub fn ensure_current_session(&mut self) -> &mut ChatSession {
        let exists = self
            .current_session
            .as_deref()
            .is_some_and(|id| self.sessions.iter().any(|s| s.id == id));

        if !exists {
            let session = ChatSession::new();
            self.current_session = Some(session.id.clone());
            self.sessions.insert(0, session);
        }

        let index = self.current_index().unwrap_or(0);
        &mut self.sessions[index]
    }

    /// Finds a table by id in any session.
    pub fn find_table(&self, table_id: &str) -> Option<(&ChatSession, &ResultTable)> {
        self.sessions
            .iter()
            .find_map(|session| session.table(table_id).map(|table| (session, table)))
    }

    /// Serializes a transcript table for download.
    pub fn table_csv(&self, table_id: &str) -> Result<String> {
        let (_, table) = self
            .find_table(table_id)
            .ok_or_else(|| GenieError::not_found("table", table_id))?;
        table.to_csv()
    }

    /// Makes session `index` current. Out-of-range indexes are ignored.
    pub fn select_session(&mut self, index: usize) -> bool {
        let Some(session) = self.sessions.get(index) else {
            return false;
        };
        self.current_session = Some(session.id.clone());
        self.conversation_id = session.conversation_id.clone();
        true
    }

    /// Starts over with an empty transcript; the session list is kept.
    ///
    /// Refused while a query runs. Returns whether the chat was reset.
    pub fn new_chat(&mut self) -> bool {
        if self.query_running {
            return false;
        }
        self.reset_conversation();
        true
    }

    /// Like [`new_chat`](Self::new_chat), and brings back the selection overlay.
    ///
    /// Always allowed: a waiting turn is abandoned first.
    pub fn change_space(&mut self) {
        self.abandon_turn();
        self.reset_conversation();
        self.selection.clear();
        self.selection_error = None;
    }

    fn reset_conversation(&mut self) {
        self.current_session = None;
        self.conversation_id = None;
    }

    /// Resolves the waiting placeholder with a cancellation notice.
    ///
    /// An armed trigger is discarded and the turn ends here. When the fetch
    /// already took the trigger, the turn stays running until that reply
    /// lands, so a second query cannot start alongside it.
    fn abandon_turn(&mut self) {
        if !self.query_running {
            return;
        }
        if let Some(id) = self.pending_session.clone()
            && let Some(session) = self.session_mut(&id)
            && session.has_pending_reply()
        {
            session.resolve_pending(MessageWidget::cancelled());
        }
        if self.trigger.take().is_some() {
            self.query_running = false;
            self.pending_session = None;
        }
    }

    pub fn logout(&mut self) {
        self.selection.clear();
        self.selection_error = None;
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    /// Confirms the picked space, or records the overlay message.
    pub fn confirm_space(&mut self, space_id: Option<&str>) -> std::result::Result<Space, SelectionError> {
        match self.selection.confirm(space_id) {
            Ok(space) => {
                self.selection_error = None;
                Ok(space)
            }
            Err(err) => {
                self.selection_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
