use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use genie_application::ChatPipeline;
use genie_core::session::UserInput;
use serde::Deserialize;

use super::extract::{ApiResult, ClientSession, Forwarded, respond};
use crate::app::AppState;
use crate::view::ViewState;

/// Typed text, or a welcome suggestion by index.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestion: Option<usize>,
}

impl SubmitRequest {
    fn into_input(self) -> UserInput {
        match self.suggestion {
            Some(index) => UserInput::Suggestion(index),
            None => UserInput::Text(self.message.unwrap_or_default()),
        }
    }
}

/// Submit stage: records the user turn and arms the trigger.
pub async fn submit_message(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    let input = request.into_input();
    {
        let mut state = session.handle.lock().await;
        if ChatPipeline::submit(&mut state, &input).is_ignored() {
            tracing::debug!(client = %session.id, "Submission ignored");
        }
    }
    respond(&app, session, &user).await
}

/// Fetch and render stages for the armed trigger.
pub async fn fetch_response(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    app.chat_pipeline
        .fetch_and_render(&session.handle, user.access_token.as_deref())
        .await;
    respond(&app, session, &user).await
}

pub async fn new_chat(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    if !session.handle.lock().await.new_chat() {
        tracing::debug!(client = %session.id, "New chat refused while a query runs");
    }
    respond(&app, session, &user).await
}
