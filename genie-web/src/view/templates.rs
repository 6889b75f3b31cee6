//! HTML rendering with minijinja.

use super::model::{ViewState, WidgetView};
use minijinja::{Environment, context};

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");
const TRANSCRIPT_TEMPLATE: &str = include_str!("../../templates/transcript.html");
const INSIGHT_TEMPLATE: &str = include_str!("../../templates/insight.html");

/// Compiled page and fragment templates.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("page.html", PAGE_TEMPLATE)?;
        env.add_template("transcript.html", TRANSCRIPT_TEMPLATE)?;
        env.add_template("insight.html", INSIGHT_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Renders the full page with the initial view embedded for the script.
    pub fn render_page(&self, view: &ViewState) -> Result<String, minijinja::Error> {
        let view_json = serde_json::to_string(view)
            .map_err(|e| {
                minijinja::Error::new(minijinja::ErrorKind::BadSerialization, e.to_string())
            })?
            .replace("</", "<\\/");
        self.env
            .get_template("page.html")?
            .render(context! { view => view, view_json => view_json })
    }

    pub fn render_transcript(&self, messages: &[WidgetView]) -> Result<String, minijinja::Error> {
        self.env
            .get_template("transcript.html")?
            .render(context! { messages => messages })
    }

    /// Renders an insight panel body; `html` is trusted markup.
    pub fn render_insight(&self, html: Option<&str>, notice: Option<&str>) -> Result<String, minijinja::Error> {
        self.env
            .get_template("insight.html")?
            .render(context! { html => html, notice => notice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_escapes_user_text() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_transcript(&[
                WidgetView::User {
                    text: "<b>hi</b>".into(),
                },
                WidgetView::Thinking,
            ])
            .unwrap();

        assert!(html.contains("user-message message"));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("Thinking..."));
    }

    #[test]
    fn test_table_widget_markup() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_transcript(&[WidgetView::Table {
                table_id: "t-1".into(),
                columns: vec!["region".into()],
                rows: vec![vec!["EMEA".into()], vec!["APAC".into()]],
                sql: Some(genie_core::session::SqlPanel {
                    index: "1-2".into(),
                    sql: "SELECT\n  region\nFROM\n  sales".into(),
                }),
                insight_html: None,
            }])
            .unwrap();

        assert!(html.contains("<th>region</th>"));
        assert!(html.contains("/api/tables/t-1/export.csv"));
        assert!(html.contains("Generate Insights"));
        assert!(html.contains("query-code-container hidden"));
        assert!(html.contains("data-index=\"1-2\""));
    }

    #[test]
    fn test_insight_notice() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_insight(None, Some("No data available for insights."))
            .unwrap();
        assert!(html.contains("insight-error"));
        assert!(html.contains("No data available for insights."));
    }
}
