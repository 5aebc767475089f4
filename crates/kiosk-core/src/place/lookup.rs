//! Lookup contracts for nearby places and area labels.

use async_trait::async_trait;
use thiserror::Error;

use super::{AreaLabel, Category, Place};
use crate::error::KioskError;
use crate::geo::Position;

/// Why a places lookup produced nothing cacheable.
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    /// The answerer replied but no line parsed into a place.
    #[error("no places could be parsed from the response")]
    Empty,
    /// The request itself failed.
    #[error(transparent)]
    Failed(#[from] KioskError),
}

/// Finds points of interest of one category near a position.
///
/// Implementations must not panic on malformed upstream data; the empty
/// case is reported as [`LookupError::Empty`].
#[async_trait]
pub trait PlacesLookup: Send + Sync {
    async fn lookup(
        &self,
        category: Category,
        position: Position,
    ) -> std::result::Result<Vec<Place>, LookupError>;
}

/// Resolves a position into a short neighbourhood label.
///
/// Infallible by contract: failures resolve to [`AreaLabel::fallback`].
#[async_trait]
pub trait AreaLabeler: Send + Sync {
    async fn label(&self, position: Position) -> AreaLabel;
}
