//! ServingEndpointAgent - chat completions against a model serving endpoint.

use crate::config::WorkspaceSettings;
use crate::genie_api_agent::{authorize, send_json};
use async_trait::async_trait;
use genie_core::agent::CompletionService;
use genie_core::{GenieError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Agent implementation that calls `/serving-endpoints/{name}/invocations`.
#[derive(Clone)]
pub struct ServingEndpointAgent {
    client: Client,
    settings: WorkspaceSettings,
}

impl ServingEndpointAgent {
    pub fn new(settings: WorkspaceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Applies a per-request timeout.
    pub fn with_request_timeout(mut self, timeout: std::time::Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GenieError::config(format!("Failed to build HTTP client: {err}")))?;
        Ok(self)
    }
}

#[async_trait]
impl CompletionService for ServingEndpointAgent {
    async fn complete(&self, prompt: &str, access_token: Option<&str>) -> Result<String> {
        let env = self.settings.resolve()?;
        let endpoint = env
            .serving_endpoint_name
            .as_deref()
            .ok_or_else(|| GenieError::config("SERVING_ENDPOINT_NAME is not set"))?;

        let url = format!("{}/serving-endpoints/{endpoint}/invocations", env.host);
        let body = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!("[ServingEndpointAgent] Invoking endpoint {}", endpoint);
        let request = authorize(self.client.post(url), env.bearer(access_token)).json(&body);
        let response: ChatCompletionResponse = send_json(request).await?;
        extract_text_response(response)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenieError::internal("Serving endpoint returned no content in the response"))
}
