//! User input types.

use serde::{Deserialize, Serialize};

/// Canned prompts offered on the welcome banner.
pub const SUGGESTIONS: [&str; 4] = [
    "What is the purpose of this Agent? Give me a short summary.",
    "How to converse with the Agent? Give me an example prompt.",
    "Explain the dataset behind this Agent.",
    "What columns or fields are available in this dataset?",
];

/// Something the user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInput {
    /// Typed into the input box
    Text(String),
    /// One of the welcome suggestions, by index
    Suggestion(usize),
}

impl UserInput {
    /// Resolves the input to the text that will be sent to the agent.
    ///
    /// Returns `None` for blank text or an unknown suggestion index.
    pub fn resolve(&self) -> Option<String> {
        match self {
            UserInput::Text(text) if !text.trim().is_empty() => Some(text.clone()),
            UserInput::Text(_) => None,
            UserInput::Suggestion(index) => SUGGESTIONS.get(*index).map(|s| s.to_string()),
        }
    }
}
