//! Interaction session domain module.
//!
//! # Module Structure
//!
//! - `state`: lifecycle and routing enums (`InteractionState`, `AppMode`)
//! - `message`: log types (`MessageRole`, `Message`, `MessageLog`)
//! - `language`: the fixed language list used for capture and translation

mod language;
mod message;
mod state;

pub use language::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE, LANGUAGES, Language, find_language};
pub use message::{Message, MessageLog, MessageRole};
pub use state::{AppMode, InteractionState};
