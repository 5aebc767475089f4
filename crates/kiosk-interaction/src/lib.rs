//! External collaborators for the kiosk.
//!
//! - [`GeminiApiAgent`]: the generative answerer over the Gemini REST API
//! - [`PlacesLookupClient`]: nearby places by category, parsed from free text
//! - [`ReverseGeocodeClient`]: short neighbourhood labels
//! - [`presets`]: prompt templates and location-intent detection

pub mod gemini_api_agent;
pub mod geocode;
pub mod places;
pub mod presets;

pub use gemini_api_agent::GeminiApiAgent;
pub use geocode::ReverseGeocodeClient;
pub use places::{PlacesLookupClient, RatingPolicy, parse_places};
pub use presets::{PromptPresets, is_location_intent};
