//! Interaction lifecycle and mode types.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Where the voice interaction currently is.
///
/// Exactly one value is current at a time; the orchestrator owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionState {
    /// Waiting for the user to start speaking.
    #[default]
    Idle,
    /// Speech capture is running.
    Recording,
    /// A transcript has been sent to the answerer.
    Processing,
    /// An answer was appended and is on screen.
    Responding,
    /// The last answerer call failed; cleared by the next start.
    Error,
}

impl InteractionState {
    /// Whether a new recording may begin from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Responding | Self::Error)
    }
}

/// Which flow a transcript is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AppMode {
    /// Emergency and information assistance.
    #[default]
    Kiosk,
    /// Two-speaker translation.
    Conversation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_start() {
        assert!(InteractionState::Idle.can_start());
        assert!(InteractionState::Responding.can_start());
        assert!(InteractionState::Error.can_start());
        assert!(!InteractionState::Recording.can_start());
        assert!(!InteractionState::Processing.can_start());
    }

    #[test]
    fn test_display() {
        assert_eq!(InteractionState::Processing.to_string(), "PROCESSING");
        assert_eq!(AppMode::Conversation.to_string(), "CONVERSATION");
    }
}
