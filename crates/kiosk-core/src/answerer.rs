//! Generative answerer contract.
//!
//! The kiosk never interprets language itself; it hands a prompt to an
//! answerer and gets free text back. Grounding and model choice are part of
//! the request so that fakes can assert on them.

use async_trait::async_trait;

use crate::error::Result;
use crate::geo::Position;

/// Location-aware retrieval attached to a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grounding {
    /// Plain generation.
    None,
    /// Maps retrieval without an explicit anchor point.
    Maps,
    /// Maps retrieval anchored at the given coordinates.
    MapsAt(Position),
}

impl Grounding {
    pub fn is_grounded(&self) -> bool {
        !matches!(self, Grounding::None)
    }
}

/// Which configured model serves the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Model that supports maps retrieval.
    Grounded,
    /// General-purpose model for ungrounded replies and translation.
    General,
}

/// One prompt-in, text-out request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRequest {
    pub contents: String,
    pub system_instruction: Option<String>,
    pub grounding: Grounding,
    pub tier: ModelTier,
}

impl AnswerRequest {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            system_instruction: None,
            grounding: Grounding::None,
            tier: ModelTier::General,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Attaches grounding and switches to the grounded model tier.
    pub fn grounded(mut self, grounding: Grounding) -> Self {
        self.grounding = grounding;
        if grounding.is_grounded() {
            self.tier = ModelTier::Grounded;
        }
        self
    }
}

/// An external generative-answering service.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// Sends the request and returns the reply text (may be empty).
    async fn generate(&self, request: AnswerRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounding_selects_grounded_tier() {
        let pos = Position::new(28.6, 77.2);
        let request = AnswerRequest::new("find food").grounded(Grounding::MapsAt(pos));
        assert_eq!(request.tier, ModelTier::Grounded);

        let plain = AnswerRequest::new("hello").grounded(Grounding::None);
        assert_eq!(plain.tier, ModelTier::General);
    }
}
