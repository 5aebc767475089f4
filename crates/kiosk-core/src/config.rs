//! Configuration models.
//!
//! `RootConfig` mirrors `config.toml`; every section has defaults so a
//! missing or partial file still yields a usable kiosk. `SecretConfig`
//! mirrors `secret.json`.

use serde::{Deserialize, Serialize};

use crate::error::{KioskError, Result};
use crate::geo::{DEFAULT_PREFETCH_THRESHOLD, Position};
use crate::session::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE, find_language};

pub const DEFAULT_GROUNDED_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GENERAL_MODEL: &str = "gemini-3-flash-preview";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RootConfig {
    #[serde(default)]
    pub kiosk: KioskSite,
    #[serde(default)]
    pub languages: LanguageSettings,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub interaction: InteractionSettings,
}

impl RootConfig {
    /// Rejects values the kiosk cannot run with.
    pub fn validate(&self) -> Result<()> {
        for code in [&self.languages.source, &self.languages.target] {
            if find_language(code).is_none() {
                return Err(KioskError::config(format!("unsupported language code '{code}'")));
            }
        }
        if !(self.discovery.prefetch_threshold.is_finite() && self.discovery.prefetch_threshold > 0.0) {
            return Err(KioskError::config("discovery.prefetch_threshold must be positive"));
        }
        if self.discovery.places_per_lookup == 0 {
            return Err(KioskError::config("discovery.places_per_lookup must be at least 1"));
        }
        Ok(())
    }
}

/// The physical kiosk this installation serves.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KioskSite {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl KioskSite {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }
}

impl Default for KioskSite {
    fn default() -> Self {
        Self {
            id: "NDLS-001".to_string(),
            name: "New Delhi Railway Station".to_string(),
            lat: 28.6415,
            lng: 77.2197,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LanguageSettings {
    pub source: String,
    pub target: String,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    /// Model used for maps-grounded requests.
    pub grounded: String,
    /// Model used for plain replies and translation.
    pub general: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            grounded: DEFAULT_GROUNDED_MODEL.to_string(),
            general: DEFAULT_GENERAL_MODEL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DiscoverySettings {
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: f64,
    #[serde(default = "default_places_per_lookup")]
    pub places_per_lookup: u32,
    #[serde(default = "default_true")]
    pub synthetic_ratings: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            prefetch_threshold: default_prefetch_threshold(),
            places_per_lookup: default_places_per_lookup(),
            synthetic_ratings: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct InteractionSettings {
    /// Seconds an answer stays on screen before returning to idle.
    #[serde(default = "default_auto_idle_secs")]
    pub auto_idle_secs: u64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            auto_idle_secs: default_auto_idle_secs(),
        }
    }
}

fn default_prefetch_threshold() -> f64 {
    DEFAULT_PREFETCH_THRESHOLD
}

fn default_places_per_lookup() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_auto_idle_secs() -> u64 {
    5
}

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [discovery]
            prefetch_threshold = 0.01
            "#,
        )
        .unwrap();

        assert_eq!(config.discovery.prefetch_threshold, 0.01);
        assert_eq!(config.discovery.places_per_lookup, 4);
        assert!(config.discovery.synthetic_ratings);
        assert_eq!(config.kiosk.id, "NDLS-001");
        assert_eq!(config.interaction.auto_idle_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_language() {
        let mut config = RootConfig::default();
        config.languages.target = "xx-XX".to_string();
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_validate_rejects_non_positive_threshold() {
        let mut config = RootConfig::default();
        config.discovery.prefetch_threshold = 0.0;
        assert!(config.validate().is_err());
    }
}
