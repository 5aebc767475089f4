//! Domain layer for the transit kiosk.
//!
//! Holds the shared types (positions, places, messages, interaction state),
//! the workspace error type, configuration models, and the traits through
//! which the application layer talks to its external collaborators.

pub mod answerer;
pub mod config;
pub mod directions;
pub mod error;
pub mod geo;
pub mod place;
pub mod position;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::{KioskError, Result};
pub use geo::Position;
