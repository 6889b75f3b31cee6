//! Outbound service interfaces.
//!
//! The application layer talks to the remote agent and the chat-completion
//! endpoint only through these traits; `genie-interaction` provides the HTTP
//! implementations.

use crate::error::Result;
use crate::space::Space;
use crate::table::QueryPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the agent answered for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Conversation handle to pass with the next message
    pub conversation_id: String,
    /// The answer
    pub payload: QueryPayload,
    /// SQL that produced a tabular answer, if the agent ran one
    pub sql: Option<String>,
}

/// A remote Genie data-analysis agent.
#[async_trait]
pub trait GenieAgent: Send + Sync {
    /// Sends `message` to the space and waits for the answer.
    ///
    /// `conversation_id == None` starts a new remote conversation.
    async fn query(
        &self,
        message: &str,
        access_token: Option<&str>,
        space_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<AgentResponse>;

    /// Lists the spaces visible to the caller.
    async fn list_spaces(&self, access_token: Option<&str>) -> Result<Vec<Space>>;
}

/// A chat-completion endpoint.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a single user prompt and returns the reply text.
    async fn complete(&self, prompt: &str, access_token: Option<&str>) -> Result<String>;
}
