use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::extract::{ApiResult, ClientSession, Forwarded, respond};
use crate::app::AppState;
use crate::view::ViewState;

#[derive(Debug, Default, Deserialize)]
pub struct SelectSpaceRequest {
    #[serde(default)]
    pub space_id: Option<String>,
}

/// Lists the caller's spaces into the overlay.
pub async fn fetch_spaces(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    let count = app
        .space_service
        .refresh(&session.handle, user.access_token.as_deref())
        .await;
    tracing::debug!(client = %session.id, "Listed {} space(s)", count);
    respond(&app, session, &user).await
}

/// Confirms the picked space; an empty pick leaves the overlay up with a message.
pub async fn select_space(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
    Json(request): Json<SelectSpaceRequest>,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    {
        let mut state = session.handle.lock().await;
        match state.confirm_space(request.space_id.as_deref()) {
            Ok(space) => tracing::info!(space_id = %space.space_id, "Agent selected"),
            Err(e) => tracing::debug!("Agent selection rejected: {}", e),
        }
    }
    respond(&app, session, &user).await
}

pub async fn change_space(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    session.handle.lock().await.change_space();
    respond(&app, session, &user).await
}
