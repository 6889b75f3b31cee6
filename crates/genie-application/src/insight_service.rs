//! On-demand table insights from the chat-completion endpoint.

use crate::client::ClientState;
use genie_core::agent::CompletionService;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shown when the table behind an insight action cannot be found.
pub const NO_INSIGHT_DATA_TEXT: &str = "No data available for insights.";

const INSIGHT_PROMPT: &str = "You are a professional data analyst. Given the following table data, provide deep, actionable analysis for\
1. Key insights and trends.\
2. Notable patterns\
3. Business implications.\
Be thorough, professional, and concise.\n\n";

/// Result of an insight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    /// Markdown text; either the analysis or an `Error generating insights` note
    Generated(String),
    /// The table id is unknown
    NoData,
}

impl InsightOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::NoData => NO_INSIGHT_DATA_TEXT,
        }
    }
}

pub struct InsightService {
    completion: Arc<dyn CompletionService>,
}

impl InsightService {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Builds the full prompt for a CSV rendering of a table.
    pub fn build_prompt(csv: &str) -> String {
        format!("{INSIGHT_PROMPT}Table data:\n{csv}")
    }

    /// Generates (and remembers) the insight for `table_id`.
    ///
    /// Failures never propagate: they come back as prose.
    pub async fn generate(
        &self,
        client: &Mutex<ClientState>,
        table_id: &str,
        access_token: Option<&str>,
    ) -> InsightOutcome {
        let (session_id, csv) = {
            let state = client.lock().await;
            let Some((session, table)) = state.find_table(table_id) else {
                tracing::warn!(table_id = %table_id, "Insight requested for unknown table");
                return InsightOutcome::NoData;
            };
            (session.id.clone(), table.to_csv())
        };

        let text = match csv {
            Ok(csv) => self.complete(&Self::build_prompt(&csv), access_token).await,
            Err(e) => format!("Error generating insights: {e}"),
        };

        let mut state = client.lock().await;
        if let Some(session) = state.session_mut(&session_id) {
            session.set_insight(table_id, text.clone());
        }
        InsightOutcome::Generated(text)
    }

    async fn complete(&self, prompt: &str, access_token: Option<&str>) -> String {
        match self.completion.complete(prompt, access_token).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Insight generation failed: {}", e);
                format!("Error generating insights: {e}")
            }
        }
    }
}
