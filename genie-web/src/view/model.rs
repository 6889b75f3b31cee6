//! View model: what the page shows for one browser session.
//!
//! The page applies a [`ViewState`] as-is; every class name and visibility
//! decision is made here.

use super::markdown;
use genie_application::ClientState;
use genie_core::session::{BotContent, ChatSession, ChatTrigger, MessageWidget, SUGGESTIONS, SqlPanel};
use genie_core::space::{NO_SPACES_SENTINEL, WelcomeBanner};
use genie_core::user::ForwardedUser;
use serde::Serialize;

pub const OVERLAY_TITLE_READY: &str = "Select an Agent";
pub const OVERLAY_TITLE_LOADING: &str = "Loading Agents...";
pub const NO_SPACES_LABEL: &str = "No available agents";

#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub user: UserView,
    pub overlay: OverlayView,
    pub layout: LayoutView,
    pub welcome: WelcomeView,
    pub input: InputView,
    pub sessions: Vec<SessionItemView>,
    pub transcript: Vec<WidgetView>,
    /// Rendered transcript markup, filled in by the template layer
    pub transcript_html: String,
    pub trigger: ChatTrigger,
    pub query_running: bool,
    /// Where the browser should navigate next, if anywhere
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayView {
    pub visible: bool,
    pub title: &'static str,
    pub loading: bool,
    pub options: Vec<SpaceOption>,
    pub selected: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceOption {
    pub label: String,
    pub value: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutView {
    /// Chat UI shown instead of the overlay
    pub chat_visible: bool,
    pub sidebar_class: &'static str,
    pub left_component_class: &'static str,
    pub nav_left_class: &'static str,
    pub logo_container_class: &'static str,
    pub main_content_class: &'static str,
    pub show_top_new_chat: bool,
    pub show_change_agent: bool,
    pub show_sidebar_new_chat: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeView {
    pub class: &'static str,
    pub title: String,
    pub description: String,
    pub suggestions: [&'static str; 4],
}

#[derive(Debug, Clone, Serialize)]
pub struct InputView {
    pub input_disabled: bool,
    pub send_disabled: bool,
    pub new_chat_disabled: bool,
    pub tooltip_class: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionItemView {
    pub index: usize,
    pub title: String,
    pub class: &'static str,
}

/// A transcript entry prepared for the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetView {
    User {
        text: String,
    },
    Thinking,
    Prose {
        html: String,
    },
    Value {
        html: String,
        sql: Option<SqlPanel>,
    },
    Table {
        table_id: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        sql: Option<SqlPanel>,
        insight_html: Option<String>,
    },
    Error {
        message: String,
    },
}

impl WidgetView {
    fn from_widget(widget: &MessageWidget, session: &ChatSession) -> Self {
        match widget {
            MessageWidget::User { text } => Self::User { text: text.clone() },
            MessageWidget::Thinking => Self::Thinking,
            MessageWidget::Bot { content } => match content {
                BotContent::Prose { markdown: text } => Self::Prose {
                    html: markdown::to_html(text),
                },
                BotContent::Value { text, sql } => Self::Value {
                    html: markdown::to_html(text),
                    sql: sql.clone(),
                },
                BotContent::Table {
                    table_id,
                    table,
                    sql,
                } => Self::Table {
                    table_id: table_id.clone(),
                    columns: table.columns.clone(),
                    rows: table
                        .rows
                        .iter()
                        .map(|row| row.iter().map(|c| c.clone().unwrap_or_default()).collect())
                        .collect(),
                    sql: sql.clone(),
                    insight_html: session.insight(table_id).map(markdown::to_html),
                },
                BotContent::Error { message } => Self::Error {
                    message: message.clone(),
                },
            },
        }
    }
}

impl ViewState {
    pub fn build(state: &ClientState, user: &ForwardedUser) -> Self {
        let spaces = state.selection.spaces();
        let chat_visible = state.selection.is_active();
        let open = state.sidebar_open;
        let running = state.query_running;
        let active_index = state.current_index();

        let options = if spaces.is_empty() {
            vec![SpaceOption {
                label: NO_SPACES_LABEL.to_string(),
                value: NO_SPACES_SENTINEL.to_string(),
                disabled: true,
            }]
        } else {
            spaces
                .iter()
                .map(|space| SpaceOption {
                    label: space.label().to_string(),
                    value: space.space_id.clone(),
                    disabled: false,
                })
                .collect()
        };

        let banner = WelcomeBanner::for_space(state.selection.active_space());
        let transcript = state
            .current()
            .map(|session| {
                session
                    .messages
                    .iter()
                    .map(|widget| WidgetView::from_widget(widget, session))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            user: UserView {
                display_name: user.display_name.clone(),
            },
            overlay: OverlayView {
                visible: !chat_visible,
                title: if spaces.is_empty() {
                    OVERLAY_TITLE_LOADING
                } else {
                    OVERLAY_TITLE_READY
                },
                loading: spaces.is_empty(),
                options,
                selected: state
                    .selection
                    .active_space()
                    .map(|space| space.space_id.clone()),
                error: state.selection_error.clone(),
            },
            layout: LayoutView {
                chat_visible,
                sidebar_class: if open { "sidebar sidebar-open" } else { "sidebar" },
                left_component_class: if open {
                    "left-component left-component-open"
                } else {
                    "left-component"
                },
                nav_left_class: if open { "nav-left nav-left-open" } else { "nav-left" },
                logo_container_class: if open {
                    "logo-container logo-container-open"
                } else {
                    "logo-container"
                },
                main_content_class: if open {
                    "main-content main-content-shifted"
                } else {
                    "main-content"
                },
                show_top_new_chat: !open,
                show_change_agent: !open,
                show_sidebar_new_chat: open,
            },
            welcome: WelcomeView {
                class: if state.transcript().is_empty() {
                    "welcome-container visible"
                } else {
                    "welcome-container hidden"
                },
                title: banner.title,
                description: banner.description,
                suggestions: SUGGESTIONS,
            },
            input: InputView {
                input_disabled: running,
                send_disabled: running,
                new_chat_disabled: running,
                tooltip_class: if running {
                    "query-tooltip query-tooltip-active"
                } else {
                    "query-tooltip"
                },
            },
            sessions: state
                .sessions
                .iter()
                .enumerate()
                .map(|(index, session)| SessionItemView {
                    index,
                    title: session.title().to_string(),
                    class: if Some(index) == active_index {
                        "chat-item active"
                    } else {
                        "chat-item"
                    },
                })
                .collect(),
            transcript,
            transcript_html: String::new(),
            trigger: state.trigger.clone(),
            query_running: running,
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, target: Option<String>) -> Self {
        self.redirect = target;
        self
    }
}
