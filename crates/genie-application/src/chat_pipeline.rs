//! The chat turn pipeline.
//!
//! A turn runs through three stages that hand off via [`ChatEvent`]s:
//!
//! 1. **submit**: validates input, appends the user message and a thinking
//!    placeholder to the current session, arms the trigger.
//! 2. **fetch**: consumes the trigger and calls the agent. The client lock is
//!    not held across the remote call.
//! 3. **render**: turns the answer (or the failure) into a transcript widget
//!    and commits it into the session that asked.
//!
//! Fetch only runs after submit has committed, and it consumes the trigger
//! before calling out, so two fetches can never race for one placeholder.

use crate::client::ClientState;
use genie_core::agent::{AgentResponse, GenieAgent};
use genie_core::session::{BotContent, ChatTrigger, MessageWidget, SqlPanel, UserInput};
use genie_core::table::QueryPayload;
use genie_core::GenieError;
use genie_interaction::format_sql;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Typed handoff between pipeline stages.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Input accepted; the session now waits for a reply.
    Submitted { session_id: String, message: String },
    /// Input ignored: blank, no agent selected, or a query already running.
    Ignored,
    /// The agent answered.
    Answered {
        session_id: String,
        response: AgentResponse,
    },
    /// The remote call failed.
    Failed {
        session_id: String,
        error: GenieError,
    },
}

impl ChatEvent {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

pub struct ChatPipeline {
    agent: Arc<dyn GenieAgent>,
}

impl ChatPipeline {
    pub fn new(agent: Arc<dyn GenieAgent>) -> Self {
        Self { agent }
    }

    /// Submit stage.
    ///
    /// Ignored input leaves the transcript, the session list and the trigger
    /// untouched.
    pub fn submit(state: &mut ClientState, input: &UserInput) -> ChatEvent {
        if state.query_running || !state.selection.is_active() {
            return ChatEvent::Ignored;
        }
        let Some(message) = input.resolve() else {
            return ChatEvent::Ignored;
        };

        let session = state.ensure_current_session();
        session.push_user_turn(&message);
        let session_id = session.id.clone();

        state.trigger = ChatTrigger::fire(message.clone());
        state.query_running = true;
        state.pending_session = Some(session_id.clone());

        tracing::debug!(session_id = %session_id, "Submitted chat message");
        ChatEvent::Submitted {
            session_id,
            message,
        }
    }

    /// Fetch stage. Returns `None` when the trigger is not armed.
    pub async fn fetch(
        &self,
        client: &Mutex<ClientState>,
        access_token: Option<&str>,
    ) -> Option<ChatEvent> {
        let (message, session_id, space_id, conversation_id) = {
            let mut state = client.lock().await;
            let message = state.trigger.take()?;
            let Some(session_id) = state.pending_session.clone() else {
                state.query_running = false;
                return None;
            };
            let space_id = state
                .selection
                .active_space()
                .map(|space| space.space_id.clone());
            let conversation_id = state
                .session(&session_id)
                .and_then(|session| session.conversation_id.clone());
            (message, session_id, space_id, conversation_id)
        };

        let Some(space_id) = space_id else {
            return Some(ChatEvent::Failed {
                session_id,
                error: GenieError::config("no agent selected"),
            });
        };

        tracing::info!(
            space_id = %space_id,
            conversation_id = conversation_id.as_deref().unwrap_or("<new>"),
            "Querying agent"
        );

        let event = match self
            .agent
            .query(&message, access_token, &space_id, conversation_id.as_deref())
            .await
        {
            Ok(response) => ChatEvent::Answered {
                session_id,
                response,
            },
            Err(error) => ChatEvent::Failed { session_id, error },
        };
        Some(event)
    }

    /// Render stage: commits the reply and clears the in-flight markers.
    ///
    /// Returns the committed widget, or `None` for events that carry no reply
    /// and for replies to a turn that was abandoned.
    pub fn render(state: &mut ClientState, event: ChatEvent) -> Option<MessageWidget> {
        let (session_id, widget, conversation_id) = match event {
            ChatEvent::Answered {
                session_id,
                response,
            } => {
                let panel_index = format!(
                    "{}-{}",
                    state.sessions.len(),
                    state
                        .session(&session_id)
                        .map(|s| s.messages.len())
                        .unwrap_or_default()
                );
                let conversation_id = response.conversation_id.clone();
                let widget = render_response(response, panel_index);
                (session_id, widget, Some(conversation_id))
            }
            ChatEvent::Failed { session_id, error } => {
                tracing::warn!(session_id = %session_id, "Agent query failed: {}", error);
                (session_id, MessageWidget::error(&error), None)
            }
            ChatEvent::Submitted { .. } | ChatEvent::Ignored => return None,
        };

        let committed = match state.session_mut(&session_id) {
            Some(session) => {
                if let Some(conversation_id) = &conversation_id {
                    session.conversation_id = Some(conversation_id.clone());
                }
                if session.has_pending_reply() {
                    session.resolve_pending(widget.clone());
                    true
                } else {
                    tracing::debug!(session_id = %session_id, "Reply for abandoned turn dropped");
                    false
                }
            }
            None => {
                tracing::warn!(session_id = %session_id, "Reply for unknown session dropped");
                false
            }
        };

        if state.current_session.as_deref() == Some(session_id.as_str()) {
            if let Some(conversation_id) = conversation_id {
                state.conversation_id = Some(conversation_id);
            }
        }

        let owns_turn = state
            .pending_session
            .as_deref()
            .is_none_or(|pending| pending == session_id);
        if owns_turn {
            state.trigger = ChatTrigger::reset();
            state.query_running = false;
            state.pending_session = None;
        }

        committed.then_some(widget)
    }

    /// Runs fetch then render for the armed trigger, if any.
    pub async fn fetch_and_render(
        &self,
        client: &Mutex<ClientState>,
        access_token: Option<&str>,
    ) -> Option<MessageWidget> {
        let event = self.fetch(client, access_token).await?;
        let mut state = client.lock().await;
        Self::render(&mut state, event)
    }
}

/// Maps an agent answer onto a transcript widget.
fn render_response(response: AgentResponse, panel_index: String) -> MessageWidget {
    let sql = response.sql.map(|sql| SqlPanel {
        index: panel_index,
        sql: format_sql(&sql),
    });

    let content = match response.payload {
        QueryPayload::Text(text) => BotContent::Prose {
            markdown: text.replace('`', ""),
        },
        QueryPayload::Table(table) => match table.single_value() {
            Some(text) => BotContent::Value { text, sql },
            None => BotContent::Table {
                table_id: uuid::Uuid::new_v4().to_string(),
                table,
                sql,
            },
        },
    };

    MessageWidget::bot(content)
}
