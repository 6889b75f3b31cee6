use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Html;
use axum_extra::extract::CookieJar;

use super::extract::{ApiResult, ClientSession, Forwarded, internal_error, render_view, respond};
use crate::app::AppState;
use crate::view::ViewState;

/// Serves the page for the calling browser.
pub async fn index(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Html<String>)> {
    let view = {
        let state = session.handle.lock().await;
        render_view(&app, &state, &user)?
    };
    let page = app.templates.render_page(&view).map_err(internal_error)?;
    Ok((session.jar, Html(page)))
}

pub async fn get_state(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    respond(&app, session, &user).await
}

pub async fn toggle_sidebar(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    session.handle.lock().await.toggle_sidebar();
    respond(&app, session, &user).await
}

/// Shows session `index` from the sidebar; unknown indexes change nothing.
pub async fn select_session(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
    Path(index): Path<usize>,
) -> ApiResult<(CookieJar, Json<ViewState>)> {
    session.handle.lock().await.select_session(index);
    respond(&app, session, &user).await
}
