//! Error types for the kiosk application.

use thiserror::Error;

/// A shared error type for the entire kiosk workspace.
///
/// Collaborator failures (answerer, lookups) and local concerns (storage,
/// configuration, state machine misuse) all funnel into this enum.
#[derive(Error, Debug, Clone)]
pub enum KioskError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The generative answerer rejected or failed the request.
    #[error("Answerer error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Answerer {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// A places or geocode lookup failed for the given context.
    #[error("Lookup failed for {context}: {message}")]
    Lookup { context: String, message: String },

    /// An interaction action was invoked from a state that does not allow it.
    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KioskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a non-retryable Answerer error without an HTTP status.
    pub fn answerer(message: impl Into<String>) -> Self {
        Self::Answerer {
            status: None,
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a Lookup error; `context` names what was being looked up.
    pub fn lookup(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidTransition error
    pub fn invalid_transition(action: &'static str, state: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            action,
            state: state.to_string(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Answerer { retryable: true, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KioskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KioskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KioskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KioskError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for KioskError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, KioskError>`.
pub type Result<T> = std::result::Result<T, KioskError>;
