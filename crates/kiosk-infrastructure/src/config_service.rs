//! `config.toml` loading and persistence.

use std::path::PathBuf;

use kiosk_core::config::RootConfig;
use kiosk_core::{KioskError, Result};

use crate::paths::KioskPaths;
use crate::storage::{AtomicTomlError, AtomicTomlFile};

impl From<AtomicTomlError> for KioskError {
    fn from(e: AtomicTomlError) -> Self {
        match e {
            AtomicTomlError::Io(e) => KioskError::from(e),
            AtomicTomlError::Parse(e) => KioskError::from(e),
            AtomicTomlError::Serialize(e) => KioskError::from(e),
            AtomicTomlError::Lock(message) => KioskError::io(message),
            AtomicTomlError::Rejected(message) => KioskError::config(message),
        }
    }
}

pub struct ConfigService {
    file: AtomicTomlFile<RootConfig>,
}

impl ConfigService {
    pub fn new(paths: &KioskPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Loads and validates the configuration. A missing file yields the
    /// defaults.
    pub fn load(&self) -> Result<RootConfig> {
        let config = match self.file.load()? {
            Some(config) => config,
            None => {
                tracing::info!(
                    "[Config] {} not found, using defaults",
                    self.file.path().display()
                );
                RootConfig::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates, then writes atomically.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        Ok(())
    }

    /// Applies `f` under the file lock. Nothing is written if the result
    /// does not validate.
    pub fn update<F>(&self, f: F) -> Result<RootConfig>
    where
        F: FnOnce(&mut RootConfig),
    {
        let updated = self.file.update(RootConfig::default(), |config| {
            f(config);
            config
                .validate()
                .map_err(|e| AtomicTomlError::Rejected(e.to_string()))
        })?;
        Ok(updated)
    }

    /// Persists the language visitors speak.
    pub fn save_source_language(&self, code: &str) -> Result<RootConfig> {
        let updated = self.update(|config| config.languages.source = code.to_string())?;
        tracing::info!("[Config] source language saved as {}", code);
        Ok(updated)
    }

    /// Persists the language translations are rendered into.
    pub fn save_target_language(&self, code: &str) -> Result<RootConfig> {
        let updated = self.update(|config| config.languages.target = code.to_string())?;
        tracing::info!("[Config] target language saved as {}", code);
        Ok(updated)
    }

    /// Writes the defaults if no file exists yet, so operators have something
    /// to edit.
    pub fn ensure_exists(&self) -> Result<RootConfig> {
        if self.file.load()?.is_none() {
            let defaults = RootConfig::default();
            self.file.save(&defaults)?;
            tracing::info!("[Config] wrote default {}", self.file.path().display());
        }
        self.load()
    }
}
