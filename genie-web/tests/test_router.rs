use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use genie_application::ClientStore;
use genie_core::agent::{AgentResponse, CompletionService, GenieAgent};
use genie_core::space::Space;
use genie_core::table::{QueryPayload, ResultTable};
use genie_core::{GenieError, Result};
use genie_interaction::WorkspaceSettings;
use genie_web::app::AppState;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StubAgent;

#[async_trait]
impl GenieAgent for StubAgent {
    async fn query(
        &self,
        message: &str,
        _access_token: Option<&str>,
        _space_id: &str,
        _conversation_id: Option<&str>,
    ) -> Result<AgentResponse> {
        if message == "break" {
            return Err(GenieError::transport("connection refused"));
        }
        Ok(AgentResponse {
            conversation_id: "conv-1".into(),
            payload: QueryPayload::Table(ResultTable::new(
                vec!["region".into(), "total".into()],
                vec![
                    vec![Some("EMEA".into()), Some("10".into())],
                    vec![Some("APAC".into()), None],
                ],
            )),
            sql: Some("select region, total from sales".into()),
        })
    }

    async fn list_spaces(&self, _access_token: Option<&str>) -> Result<Vec<Space>> {
        Ok(vec![Space {
            space_id: "space-1".into(),
            title: Some("Sales Agent".into()),
            description: Some("Ask about revenue".into()),
        }])
    }
}

struct StubCompletion;

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, _prompt: &str, _access_token: Option<&str>) -> Result<String> {
        Ok("**EMEA** leads.".into())
    }
}

fn state() -> AppState {
    AppState::new(
        Arc::new(StubAgent),
        Arc::new(StubCompletion),
        WorkspaceSettings::fixed("example.cloud.databricks.com"),
    )
    .expect("state should build")
}

fn app() -> Router {
    genie_web::router(Arc::new(state()))
}

/// Minimal browser: remembers the session cookie between requests.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new() -> Self {
        Self {
            app: app(),
            cookie: None,
        }
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Forwarded-Preferred-Username", "jane.doe@example.com");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&mut self, method: &str, uri: &str, body: Option<Value>) -> Value {
        let (status, bytes) = self.send(method, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&bytes));
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn enter_space(&mut self) -> Value {
        self.json("POST", "/api/spaces/fetch", None).await;
        self.json("POST", "/api/spaces/select", Some(json!({"space_id": "space-1"})))
            .await
    }
}

#[tokio::test]
async fn test_health() {
    let mut browser = Browser::new();
    let body = browser.json("GET", "/health", None).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_index_issues_cookie_and_shows_overlay() {
    let mut browser = Browser::new();
    let (status, bytes) = browser.send("GET", "/", None).await;
    let html = String::from_utf8(bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(browser.cookie.as_deref().unwrap().starts_with("genie_session="));
    assert!(html.contains("Loading Agents..."));
    assert!(html.contains("no_spaces_found"));
    assert!(html.contains("Jane Doe"));
}

#[tokio::test]
async fn test_space_selection_flow() {
    let mut browser = Browser::new();

    let view = browser.json("POST", "/api/spaces/fetch", None).await;
    assert_eq!(view["overlay"]["title"], "Select an Agent");
    assert_eq!(view["overlay"]["options"][0]["label"], "Sales Agent");

    let view = browser
        .json("POST", "/api/spaces/select", Some(json!({"space_id": null})))
        .await;
    assert_eq!(view["overlay"]["visible"], true);
    assert_eq!(view["overlay"]["error"], "Please select an Agent.");

    let view = browser
        .json("POST", "/api/spaces/select", Some(json!({"space_id": "space-1"})))
        .await;
    assert_eq!(view["overlay"]["visible"], false);
    assert_eq!(view["layout"]["chat_visible"], true);
    assert_eq!(view["welcome"]["title"], "Sales Agent");
    assert_eq!(view["welcome"]["description"], "Ask about revenue");

    let view = browser.json("POST", "/api/spaces/change", None).await;
    assert_eq!(view["overlay"]["visible"], true);
}

#[tokio::test]
async fn test_chat_turn_table_export_and_insight() {
    let mut browser = Browser::new();
    browser.enter_space().await;

    let view = browser
        .json("POST", "/api/chat/submit", Some(json!({"message": "Sales by region"})))
        .await;
    assert_eq!(view["trigger"]["trigger"], true);
    assert_eq!(view["query_running"], true);
    assert_eq!(view["input"]["tooltip_class"], "query-tooltip query-tooltip-active");
    assert_eq!(view["transcript"][1]["kind"], "thinking");
    assert_eq!(view["sessions"][0]["title"], "Sales by region");

    let view = browser.json("POST", "/api/chat/fetch", None).await;
    assert_eq!(view["trigger"]["trigger"], false);
    assert_eq!(view["query_running"], false);
    assert_eq!(view["welcome"]["class"], "welcome-container hidden");

    let table = &view["transcript"][1];
    assert_eq!(table["kind"], "table");
    assert_eq!(table["sql"]["index"], "1-2");
    assert!(table["sql"]["sql"].as_str().unwrap().contains("SELECT"));
    let table_id = table["table_id"].as_str().unwrap().to_string();
    assert!(view["transcript_html"].as_str().unwrap().contains("Generate Insights"));

    let (status, csv) = browser
        .send("GET", &format!("/api/tables/{table_id}/export.csv"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(csv).unwrap(), "region,total\nEMEA,10\nAPAC,\n");

    let insight = browser
        .json("POST", &format!("/api/insights/{table_id}"), None)
        .await;
    assert_eq!(insight["found"], true);
    assert!(insight["html"].as_str().unwrap().contains("<strong>EMEA</strong>"));

    // The insight stays with the transcript.
    let view = browser.json("GET", "/api/state", None).await;
    assert!(view["transcript"][1]["insight_html"].as_str().unwrap().contains("EMEA"));
}

#[tokio::test]
async fn test_failed_turn_renders_error_bubble() {
    let mut browser = Browser::new();
    browser.enter_space().await;

    browser
        .json("POST", "/api/chat/submit", Some(json!({"message": "break"})))
        .await;
    let view = browser.json("POST", "/api/chat/fetch", None).await;

    let bubble = &view["transcript"][1];
    assert_eq!(bubble["kind"], "error");
    assert!(bubble["message"]
        .as_str()
        .unwrap()
        .starts_with("Sorry, I encountered an error:"));
    assert_eq!(view["query_running"], false);
}

#[tokio::test]
async fn test_blank_submit_and_session_navigation() {
    let mut browser = Browser::new();
    browser.enter_space().await;

    let view = browser
        .json("POST", "/api/chat/submit", Some(json!({"message": "   "})))
        .await;
    assert_eq!(view["sessions"].as_array().unwrap().len(), 0);
    assert_eq!(view["trigger"]["trigger"], false);

    browser
        .json("POST", "/api/chat/submit", Some(json!({"suggestion": 2})))
        .await;
    browser.json("POST", "/api/chat/fetch", None).await;

    let view = browser.json("POST", "/api/chat/new", None).await;
    assert_eq!(view["transcript"].as_array().unwrap().len(), 0);
    assert_eq!(view["welcome"]["class"], "welcome-container visible");
    assert_eq!(view["sessions"][0]["class"], "chat-item");

    let view = browser.json("POST", "/api/sessions/0/select", None).await;
    assert_eq!(view["sessions"][0]["class"], "chat-item active");
    assert_eq!(
        view["transcript"][0]["text"],
        "Explain the dataset behind this Agent."
    );

    let view = browser.json("POST", "/api/sessions/5/select", None).await;
    assert_eq!(view["sessions"][0]["class"], "chat-item active");
}

#[tokio::test]
async fn test_sidebar_toggle_and_logout() {
    let mut browser = Browser::new();
    browser.enter_space().await;

    let view = browser.json("POST", "/api/sidebar/toggle", None).await;
    assert_eq!(view["layout"]["sidebar_class"], "sidebar sidebar-open");
    assert_eq!(view["layout"]["show_sidebar_new_chat"], true);

    let view = browser.json("POST", "/api/logout", None).await;
    assert_eq!(
        view["redirect"],
        "https://example.cloud.databricks.com/login.html"
    );
    assert_eq!(view["overlay"]["visible"], true);
}

#[tokio::test]
async fn test_unknown_table_export_is_not_found() {
    let mut browser = Browser::new();
    let (status, _) = browser
        .send("GET", "/api/tables/nope/export.csv", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let insight = browser.json("POST", "/api/insights/nope", None).await;
    assert_eq!(insight["found"], false);
    assert_eq!(insight["text"], "No data available for insights.");
}

#[tokio::test]
async fn test_new_chat_refused_while_query_runs() {
    let mut browser = Browser::new();
    browser.enter_space().await;

    browser
        .json("POST", "/api/chat/submit", Some(json!({"message": "Sales by region"})))
        .await;
    let view = browser.json("POST", "/api/chat/new", None).await;
    assert_eq!(view["query_running"], true);
    assert_eq!(view["trigger"]["trigger"], true);
    assert_eq!(view["transcript"][1]["kind"], "thinking");

    let view = browser.json("POST", "/api/chat/fetch", None).await;
    assert_eq!(view["transcript"].as_array().unwrap().len(), 2);
    assert_eq!(view["transcript"][1]["kind"], "table");
}

#[tokio::test]
async fn test_idle_browser_state_is_evicted() {
    let state = Arc::new(state().with_clients(ClientStore::with_idle_timeout(Duration::ZERO)));
    let mut browser = Browser {
        app: genie_web::router(state.clone()),
        cookie: None,
    };

    browser.send("GET", "/", None).await;
    browser.send("GET", "/health", None).await;
    assert_eq!(state.clients.len().await, 1);

    assert_eq!(state.clients.evict_idle().await, 1);
    assert!(state.clients.is_empty().await);

    // A returning browser starts over with fresh state.
    let view = browser.json("GET", "/api/state", None).await;
    assert_eq!(view["overlay"]["visible"], true);
    assert_eq!(state.clients.len().await, 1);
}
