//! Place and area-label models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;
use crate::geo::Position;

/// Label used when the neighbourhood cannot be resolved.
pub const FALLBACK_AREA_LABEL: &str = "Railway Hub";

/// Label shown before the first reverse-geocode completes.
pub const LOCATING_AREA_LABEL: &str = "Locating...";

/// One discovered point of interest.
///
/// `id` is only unique within the lookup batch that produced it. Use
/// [`Place::stable_id`] when identity must survive a refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coords: Position,
    pub category: Category,
    /// Presentation-only rating; never sourced from the answerer.
    pub rating: Option<f32>,
}

impl Place {
    /// Content-derived identifier (UUID v5 over name and coordinates).
    pub fn stable_id(&self) -> Uuid {
        let key = format!("{}|{}|{}", self.name, self.coords.lat, self.coords.lng);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
    }
}

/// A short human-readable description of the user's neighbourhood.
///
/// Never empty: blank input collapses to [`FALLBACK_AREA_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaLabel(String);

impl AreaLabel {
    pub fn new(text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            Self::fallback()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn fallback() -> Self {
        Self(FALLBACK_AREA_LABEL.to_string())
    }

    pub fn locating() -> Self {
        Self(LOCATING_AREA_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AreaLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
