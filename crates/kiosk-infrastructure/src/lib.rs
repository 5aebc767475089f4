//! Infrastructure layer for the transit kiosk.
//!
//! File locations, configuration and secret storage, and tracing setup.

pub mod config_service;
pub mod logging;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use config_service::ConfigService;
pub use logging::init_file_logging;
pub use paths::{KioskPaths, PathError};
pub use secret_service::{GEMINI_API_KEY_ENV, SecretServiceImpl};
