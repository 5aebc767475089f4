//! Reverse geocoding into a short area label.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_core::Position;
use kiosk_core::answerer::{AnswerRequest, Answerer, Grounding};
use kiosk_core::place::{AreaLabel, AreaLabeler};

/// Label used when the answerer replies but names nothing.
pub const UNNAMED_AREA_LABEL: &str = "Station Sector";

pub struct ReverseGeocodeClient {
    answerer: Arc<dyn Answerer>,
}

impl ReverseGeocodeClient {
    pub fn new(answerer: Arc<dyn Answerer>) -> Self {
        Self { answerer }
    }

    fn build_request(position: Position) -> AnswerRequest {
        AnswerRequest::new(format!(
            "Location: {}, {}. Name the neighborhood or station sector. max 2 words.",
            position.lat, position.lng
        ))
        .grounded(Grounding::Maps)
    }
}

#[async_trait]
impl AreaLabeler for ReverseGeocodeClient {
    async fn label(&self, position: Position) -> AreaLabel {
        match self.answerer.generate(Self::build_request(position)).await {
            Ok(text) if text.trim().is_empty() => AreaLabel::new(UNNAMED_AREA_LABEL),
            Ok(text) => AreaLabel::new(text),
            Err(e) => {
                tracing::warn!("[Geocode] falling back for {}: {}", position, e);
                AreaLabel::fallback()
            }
        }
    }
}
