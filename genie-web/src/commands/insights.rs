use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use genie_application::InsightOutcome;
use serde::Serialize;

use super::extract::{ApiResult, ClientSession, Forwarded, internal_error};
use crate::app::AppState;
use crate::view::markdown;

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub table_id: String,
    /// False when the table is unknown
    pub found: bool,
    pub text: String,
    /// Panel markup for the insight slot
    pub html: String,
}

pub async fn generate_insight(
    State(app): State<Arc<AppState>>,
    session: ClientSession,
    Forwarded(user): Forwarded,
    Path(table_id): Path<String>,
) -> ApiResult<(CookieJar, Json<InsightResponse>)> {
    tracing::info!(table_id = %table_id, "Generating insights");
    let outcome = app
        .insight_service
        .generate(&session.handle, &table_id, user.access_token.as_deref())
        .await;

    let html = match &outcome {
        InsightOutcome::Generated(text) => app
            .templates
            .render_insight(Some(&markdown::to_html(text)), None),
        InsightOutcome::NoData => app.templates.render_insight(None, Some(outcome.text())),
    }
    .map_err(internal_error)?;

    Ok((
        session.jar,
        Json(InsightResponse {
            table_id,
            found: outcome != InsightOutcome::NoData,
            text: outcome.text().to_string(),
            html,
        }),
    ))
}

/// Downloads a transcript table as CSV.
pub async fn export_table_csv(
    session: ClientSession,
    Path(table_id): Path<String>,
) -> ApiResult<Response> {
    let csv = session
        .handle
        .lock()
        .await
        .table_csv(&table_id)
        .map_err(|e| {
            if e.is_not_found() {
                (StatusCode::NOT_FOUND, e.to_string())
            } else {
                internal_error(e)
            }
        })?;

    Ok((
        session.jar,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{table_id}.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}
