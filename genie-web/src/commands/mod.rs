//! HTTP request handlers.
//!
//! Every mutating endpoint answers with the refreshed [`ViewState`](crate::view::ViewState).

pub mod chat;
pub mod extract;
pub mod insights;
pub mod layout;
pub mod spaces;
pub mod user;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(layout::index))
        .route("/health", get(health_check))
        .route("/api/state", get(layout::get_state))
        .route("/api/spaces/fetch", post(spaces::fetch_spaces))
        .route("/api/spaces/select", post(spaces::select_space))
        .route("/api/spaces/change", post(spaces::change_space))
        .route("/api/logout", post(user::logout))
        .route("/api/chat/submit", post(chat::submit_message))
        .route("/api/chat/fetch", post(chat::fetch_response))
        .route("/api/chat/new", post(chat::new_chat))
        .route("/api/sessions/{index}/select", post(layout::select_session))
        .route("/api/sidebar/toggle", post(layout::toggle_sidebar))
        .route("/api/insights/{table_id}", post(insights::generate_insight))
        .route(
            "/api/tables/{table_id}/export.csv",
            get(insights::export_table_csv),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
