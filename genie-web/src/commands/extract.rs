//! Request extractors shared by the handlers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use genie_application::{ClientHandle, ClientState};
use genie_core::user::{FORWARDED_TOKEN_HEADER, FORWARDED_USERNAME_HEADER, ForwardedUser};

use crate::app::AppState;
use crate::view::ViewState;

/// Cookie that ties a browser to its server-side state.
pub const SESSION_COOKIE: &str = "genie_session";

pub type ApiResult<T> = Result<T, (StatusCode, String)>;

/// The calling browser's state, created on first contact.
pub struct ClientSession {
    pub id: String,
    pub handle: ClientHandle,
    /// Carries the session cookie back when it was just issued
    pub jar: CookieJar,
}

impl FromRequestParts<Arc<AppState>> for ClientSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let existing = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| uuid::Uuid::parse_str(value).is_ok());

        let (id, jar) = match existing {
            Some(id) => (id, jar),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax);
                (id, jar.add(cookie))
            }
        };

        let handle = state.clients.get_or_create(&id).await;
        Ok(Self { id, handle, jar })
    }
}

/// Identity forwarded by the proxy in front of the app.
pub struct Forwarded(pub ForwardedUser);

impl<S: Send + Sync> FromRequestParts<S> for Forwarded {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = header_value(parts, FORWARDED_USERNAME_HEADER);
        let user =
            ForwardedUser::from_headers(username, header_value(parts, FORWARDED_TOKEN_HEADER));

        if let Some(raw) = username
            && user.display_name.is_none()
        {
            tracing::error!("Error parsing username {:?}", raw);
        }
        Ok(Self(user))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

/// Builds the view for a client, with the transcript rendered.
pub fn render_view(
    app: &AppState,
    state: &ClientState,
    user: &ForwardedUser,
) -> ApiResult<ViewState> {
    let mut view = ViewState::build(state, user);
    view.transcript_html = app
        .templates
        .render_transcript(&view.transcript)
        .map_err(internal_error)?;
    Ok(view)
}

pub fn internal_error(err: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Answers with the refreshed view, returning the cookie jar alongside.
pub async fn respond(
    app: &AppState,
    session: ClientSession,
    user: &ForwardedUser,
) -> ApiResult<(CookieJar, axum::Json<ViewState>)> {
    let view = {
        let state = session.handle.lock().await;
        render_view(app, &state, user)?
    };
    Ok((session.jar, axum::Json(view)))
}
