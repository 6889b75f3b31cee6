use serde::{Deserialize, Serialize};

pub const FORWARDED_TOKEN_HEADER: &str = "X-Forwarded-Access-Token";
pub const FORWARDED_USERNAME_HEADER: &str = "X-Forwarded-Preferred-Username";

/// Identity forwarded by the proxy for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedUser {
    /// Human-readable name, e.g. "Jane Doe" for `jane.doe@example.com`
    pub display_name: Option<String>,
    /// Bearer token used for calls made on the user's behalf
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl ForwardedUser {
    pub fn from_headers(username: Option<&str>, access_token: Option<&str>) -> Self {
        Self {
            display_name: display_name_from_username(username.unwrap_or_default()),
            access_token: access_token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }
}

/// Turns `first.last@domain` into `First Last`.
///
/// Only the first character of each dot-separated part is upper-cased. An
/// empty username, or one with an empty part, has no display name.
pub fn display_name_from_username(username: &str) -> Option<String> {
    let local = username.split('@').next().unwrap_or_default();
    let mut parts = Vec::new();
    for part in local.split('.') {
        let mut chars = part.chars();
        let first = chars.next()?;
        parts.push(first.to_uppercase().chain(chars).collect::<String>());
    }
    Some(parts.join(" "))
}
