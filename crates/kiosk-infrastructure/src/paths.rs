//! Path management for kiosk configuration files.
//!
//! ```text
//! ~/.config/transit-kiosk/     # Config directory
//! ├── config.toml              # Site, languages, models, discovery, interaction
//! ├── secret.json              # API keys
//! └── logs/                    # Daily log files
//!     └── transit-kiosk.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use kiosk_core::config::{DEFAULT_GROUNDED_MODEL, GeminiConfig, SecretConfig};

const APP_DIR_NAME: &str = "transit-kiosk";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// No platform config directory could be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine the config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of every kiosk file.
///
/// A base directory may be given to relocate everything (tests, portable
/// installs); otherwise the platform config directory is used.
#[derive(Debug, Clone)]
pub struct KioskPaths {
    root: PathBuf,
}

impl KioskPaths {
    pub fn new(base: Option<&Path>) -> Result<Self, PathError> {
        let root = match base {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR_NAME),
        };
        Ok(Self { root })
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to `secret.json`. Keep it at mode 600.
    pub fn secret_file(&self) -> PathBuf {
        self.root.join("secret.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Writes a `secret.json` template with an empty key if none exists.
    ///
    /// On Unix the file is created with mode 600.
    pub fn ensure_secret_file(&self) -> std::io::Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.root)?;

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_GROUNDED_MODEL.to_string()),
            }),
        };
        let template_json = serde_json::to_string_pretty(&template).map_err(std::io::Error::other)?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_root_is_named_for_the_app() {
        let paths = KioskPaths::new(None).unwrap();
        assert!(paths.config_dir().ends_with("transit-kiosk"));
    }

    #[test]
    fn test_files_live_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KioskPaths::new(Some(temp_dir.path())).unwrap();

        assert_eq!(paths.config_file(), temp_dir.path().join("config.toml"));
        assert_eq!(paths.secret_file(), temp_dir.path().join("secret.json"));
        assert!(paths.logs_dir().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KioskPaths::new(Some(&temp_dir.path().join("nested"))).unwrap();

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(template.gemini.unwrap().api_key, "");

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_template_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let paths = KioskPaths::new(Some(temp_dir.path())).unwrap();
        let path = paths.ensure_secret_file().unwrap();

        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
