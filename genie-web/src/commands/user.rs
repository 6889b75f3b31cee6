use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;

use super::extract::{ApiResult, ClientSession, Forwarded, respond};
use crate::app::AppState;
use crate::view::ViewState;

/// Clears the agent selection and points the browser at the workspace login page.
pub async fn logout(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    session.handle.lock().await.logout();
    let (jar, Json(view)) = respond(&app, session, &user).await?;
    Ok((jar, Json(view.with_redirect(app.workspace.login_url()))))
}
