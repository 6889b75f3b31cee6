use serde::{Deserialize, Serialize};

/// Handoff signal from the submit stage to the fetch stage.
///
/// An armed trigger carries the message that still needs an answer. It is
/// reset to `{false, ""}` once the fetch stage consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTrigger {
    pub trigger: bool,
    pub message: String,
}

impl ChatTrigger {
    /// Creates an armed trigger for `message`.
    pub fn fire(message: impl Into<String>) -> Self {
        Self {
            trigger: true,
            message: message.into(),
        }
    }

    /// Returns the idle trigger.
    pub fn reset() -> Self {
        Self::default()
    }

    /// True when there is a pending, non-empty message.
    pub fn is_armed(&self) -> bool {
        self.trigger && !self.message.is_empty()
    }

    /// Takes the pending message and leaves the trigger idle.
    pub fn take(&mut self) -> Option<String> {
        if !self.is_armed() {
            return None;
        }
        let message = std::mem::take(&mut self.message);
        self.trigger = false;
        Some(message)
    }
}
