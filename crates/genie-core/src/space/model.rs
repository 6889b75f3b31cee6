use serde::{Deserialize, Serialize};

pub const DEFAULT_WELCOME_TITLE: &str = "Welcome to Your Data Assistant";
pub const DEFAULT_WELCOME_DESCRIPTION: &str = "Explore and analyze your data with AI-powered insights. Ask questions, discover trends, and make data-driven decisions.";

/// A configured Genie space, i.e. one data-analysis agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub space_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Space {
    /// A space known only by its id.
    pub fn bare(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            title: None,
            description: None,
        }
    }

    /// Display label for pickers; empty when the space has no title.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Heading and blurb shown above the suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeBanner {
    pub title: String,
    pub description: String,
}

impl WelcomeBanner {
    /// Uses the space's own title and description, falling back to the
    /// defaults for anything missing or blank.
    pub fn for_space(space: Option<&Space>) -> Self {
        let pick = |value: Option<&String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            title: pick(space.and_then(|s| s.title.as_ref()), DEFAULT_WELCOME_TITLE),
            description: pick(
                space.and_then(|s| s.description.as_ref()),
                DEFAULT_WELCOME_DESCRIPTION,
            ),
        }
    }
}

impl Default for WelcomeBanner {
    fn default() -> Self {
        Self::for_space(None)
    }
}
