//! GenieApiAgent - REST client for Databricks Genie spaces.
//!
//! A question is sent either as the opening message of a new conversation or
//! as a follow-up, then the message is polled until the agent finishes. When
//! the answer carries a query attachment, its result rows are fetched as a
//! second step.

use crate::config::{WorkspaceEnv, WorkspaceSettings};
use async_trait::async_trait;
use genie_core::agent::{AgentResponse, GenieAgent};
use genie_core::space::Space;
use genie_core::table::{QueryPayload, ResultTable};
use genie_core::{GenieError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const GENIE_API_PREFIX: &str = "/api/2.0/genie/spaces";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 600;
/// Upper bound on pages followed while listing spaces.
const MAX_SPACE_PAGES: usize = 100;
const NO_RESPONSE_TEXT: &str = "No response available";

/// Agent implementation that talks to the Genie HTTP API.
#[derive(Clone)]
pub struct GenieApiAgent {
    client: Client,
    settings: WorkspaceSettings,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl GenieApiAgent {
    /// Creates a new agent for the given workspace settings.
    pub fn new(settings: WorkspaceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }

    /// Sets the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets how many status polls are made before giving up.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts.max(1);
        self
    }

    /// Applies a per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GenieError::config(format!("Failed to build HTTP client: {err}")))?;
        Ok(self)
    }

    fn space_url(env: &WorkspaceEnv, space_id: &str) -> String {
        format!("{}{GENIE_API_PREFIX}/{space_id}", env.host)
    }

    fn message_url(env: &WorkspaceEnv, space_id: &str, conversation_id: &str, message_id: &str) -> String {
        format!(
            "{}/conversations/{conversation_id}/messages/{message_id}",
            Self::space_url(env, space_id)
        )
    }

    async fn start_conversation(
        &self,
        env: &WorkspaceEnv,
        token: Option<&str>,
        space_id: &str,
        message: &str,
    ) -> Result<(String, String)> {
        let url = format!("{}/start-conversation", Self::space_url(env, space_id));
        let request = authorize(self.client.post(url), token).json(&MessageRequest { content: message });
        let started: StartConversationResponse = send_json(request).await?;

        let conversation_id = started
            .conversation_id
            .or(started.conversation.map(|c| c.id))
            .ok_or_else(|| GenieError::internal("start-conversation returned no conversation id"))?;
        let message_id = started
            .message_id
            .or(started.message.map(|m| m.id))
            .ok_or_else(|| GenieError::internal("start-conversation returned no message id"))?;

        Ok((conversation_id, message_id))
    }

    async fn create_message(
        &self,
        env: &WorkspaceEnv,
        token: Option<&str>,
        space_id: &str,
        conversation_id: &str,
        message: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/conversations/{conversation_id}/messages",
            Self::space_url(env, space_id)
        );
        let request = authorize(self.client.post(url), token).json(&MessageRequest { content: message });
        let created: GenieMessage = send_json(request).await?;

        created
            .message_id
            .or(created.id)
            .ok_or_else(|| GenieError::internal("create-message returned no message id"))
    }

    async fn wait_for_message(
        &self,
        env: &WorkspaceEnv,
        token: Option<&str>,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage> {
        let url = Self::message_url(env, space_id, conversation_id, message_id);

        for attempt in 1..=self.max_poll_attempts {
            let message: GenieMessage = send_json(authorize(self.client.get(&url), token)).await?;
            let status = message.status.as_deref().unwrap_or_default();

            match status {
                "COMPLETED" => {
                    tracing::debug!(
                        "[GenieApiAgent] Message {} completed after {} poll(s)",
                        message_id,
                        attempt
                    );
                    return Ok(message);
                }
                "FAILED" | "CANCELLED" | "QUERY_RESULT_EXPIRED" => {
                    let detail = message
                        .error
                        .and_then(|e| e.error)
                        .unwrap_or_else(|| format!("message status {status}"));
                    return Err(GenieError::QueryFailed(detail));
                }
                _ => {
                    tracing::trace!("[GenieApiAgent] Message {} status {}", message_id, status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(GenieError::Timeout(format!(
            "message {message_id} did not complete after {} polls",
            self.max_poll_attempts
        )))
    }

    async fn fetch_query_result(
        &self,
        env: &WorkspaceEnv,
        token: Option<&str>,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<ResultTable> {
        let url = format!(
            "{}/query-result/{attachment_id}",
            Self::message_url(env, space_id, conversation_id, message_id)
        );
        let result: QueryResultResponse = send_json(authorize(self.client.get(url), token)).await?;
        Ok(result.statement_response.into_table())
    }

    async fn answer(
        &self,
        env: &WorkspaceEnv,
        token: Option<&str>,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
        message: GenieMessage,
    ) -> Result<(QueryPayload, Option<String>)> {
        for attachment in &message.attachments {
            if let Some(query) = &attachment.query {
                let attachment_id = attachment.attachment_id.as_deref().ok_or_else(|| {
                    GenieError::internal("query attachment has no attachment id")
                })?;
                let table = self
                    .fetch_query_result(env, token, space_id, conversation_id, message_id, attachment_id)
                    .await?;
                return Ok((QueryPayload::Table(table), query.query.clone()));
            }
            if let Some(text) = attachment.text.as_ref().and_then(|t| t.content.clone()) {
                return Ok((QueryPayload::Text(text), None));
            }
        }

        let fallback = message
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());
        Ok((QueryPayload::Text(fallback), None))
    }
}

#[async_trait]
impl GenieAgent for GenieApiAgent {
    async fn query(
        &self,
        message: &str,
        access_token: Option<&str>,
        space_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<AgentResponse> {
        let env = self.settings.resolve()?;
        let token = env.bearer(access_token);

        let (conversation_id, message_id) = match conversation_id {
            Some(existing) => {
                let message_id = self
                    .create_message(&env, token, space_id, existing, message)
                    .await?;
                (existing.to_string(), message_id)
            }
            None => {
                let (conversation_id, message_id) =
                    self.start_conversation(&env, token, space_id, message).await?;
                tracing::info!(
                    "[GenieApiAgent] Started conversation {} in space {}",
                    conversation_id,
                    space_id
                );
                (conversation_id, message_id)
            }
        };

        let completed = self
            .wait_for_message(&env, token, space_id, &conversation_id, &message_id)
            .await?;
        let (payload, sql) = self
            .answer(&env, token, space_id, &conversation_id, &message_id, completed)
            .await?;

        Ok(AgentResponse {
            conversation_id,
            payload,
            sql,
        })
    }

    async fn list_spaces(&self, access_token: Option<&str>) -> Result<Vec<Space>> {
        let env = self.settings.resolve()?;
        let token = env.bearer(access_token);
        let url = format!("{}{GENIE_API_PREFIX}", env.host);

        let mut spaces = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_SPACE_PAGES {
            let mut request = authorize(self.client.get(&url), token);
            if let Some(page) = &page_token {
                request = request.query(&[("page_token", page.as_str())]);
            }
            let page: ListSpacesResponse = send_json(request).await?;
            spaces.extend(page.spaces);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("[GenieApiAgent] Listed {} space(s)", spaces.len());
        Ok(spaces)
    }
}

/// Adds the bearer header when a token is available.
pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Sends the request and decodes a JSON success body.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|err| GenieError::transport(format!("request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(map_http_error(status, body_text));
    }

    response
        .json()
        .await
        .map_err(|err| GenieError::transport(format!("Failed to parse response: {err}")))
}

pub(crate) fn map_http_error(status: StatusCode, body: String) -> GenieError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|wrapper| wrapper.message)
        .unwrap_or(body);
    GenieError::api(status.as_u16(), message)
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct IdHolder {
    id: String,
}

#[derive(Deserialize)]
struct StartConversationResponse {
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    conversation: Option<IdHolder>,
    #[serde(default)]
    message: Option<IdHolder>,
}

#[derive(Deserialize)]
struct GenieMessage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    attachments: Vec<MessageAttachment>,
    #[serde(default)]
    error: Option<MessageError>,
}

#[derive(Deserialize)]
struct MessageAttachment {
    #[serde(default, alias = "id")]
    attachment_id: Option<String>,
    #[serde(default)]
    query: Option<QueryAttachment>,
    #[serde(default)]
    text: Option<TextAttachment>,
}

#[derive(Deserialize)]
struct QueryAttachment {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Deserialize)]
struct TextAttachment {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct MessageError {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct QueryResultResponse {
    statement_response: StatementResponse,
}

#[derive(Deserialize)]
struct StatementResponse {
    #[serde(default)]
    manifest: Option<Manifest>,
    #[serde(default)]
    result: Option<StatementResult>,
}

impl StatementResponse {
    fn into_table(self) -> ResultTable {
        let columns = self
            .manifest
            .map(|m| m.schema.columns.into_iter().map(|c| c.name).collect())
            .unwrap_or_default();
        let rows = self.result.map(|r| r.data_array).unwrap_or_default();
        ResultTable::from_json_rows(columns, &rows)
    }
}

#[derive(Deserialize)]
struct Manifest {
    schema: Schema,
}

#[derive(Deserialize)]
struct Schema {
    #[serde(default)]
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct Column {
    name: String,
}

#[derive(Deserialize)]
struct StatementResult {
    #[serde(default)]
    data_array: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ListSpacesResponse {
    #[serde(default)]
    spaces: Vec<Space>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}
