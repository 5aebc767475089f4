//! Secret service backed by `secret.json` with an environment override.

use std::sync::{Arc, RwLock};

use kiosk_core::config::{GeminiConfig, SecretConfig};
use kiosk_core::secret::SecretService;

use crate::paths::KioskPaths;
use crate::storage::{SecretStorage, SecretStorageError};

/// Environment variable that overrides the Gemini API key from the file.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Loads secrets once and serves them from memory afterwards.
///
/// The environment key replaces `gemini.api_key`; when only the environment
/// is set, the file may be absent.
#[derive(Clone)]
pub struct SecretServiceImpl {
    storage: Arc<SecretStorage>,
    env_api_key: Option<String>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(paths: &KioskPaths) -> Self {
        Self::with_storage(SecretStorage::new(paths.secret_file()))
            .with_env_api_key(std::env::var(GEMINI_API_KEY_ENV).ok())
    }

    pub fn with_storage(storage: SecretStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            env_api_key: None,
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let loaded = match (self.storage.load(), &self.env_api_key) {
            (Ok(mut secrets), Some(api_key)) => {
                tracing::info!("[Secrets] {} overrides the file key", GEMINI_API_KEY_ENV);
                let model_name = secrets.gemini.take().and_then(|gemini| gemini.model_name);
                secrets.gemini = Some(GeminiConfig {
                    api_key: api_key.clone(),
                    model_name,
                });
                secrets
            }
            (Ok(secrets), None) => secrets,
            (Err(SecretStorageError::NotFound(_)), Some(api_key)) => SecretConfig {
                gemini: Some(GeminiConfig {
                    api_key: api_key.clone(),
                    model_name: None,
                }),
            },
            (Err(e), _) => return Err(format!("Failed to load secrets: {}", e)),
        };

        if let Ok(mut cache) = self.secrets.write() {
            *cache = Some(loaded.clone());
        }
        Ok(loaded)
    }

    fn read_cache(&self) -> Option<SecretConfig> {
        self.secrets.read().ok().and_then(|cache| cache.clone())
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(temp_dir: &TempDir, env_key: Option<&str>) -> SecretServiceImpl {
        SecretServiceImpl::with_storage(SecretStorage::new(temp_dir.path().join("secret.json")))
            .with_env_api_key(env_key.map(str::to_string))
    }

    fn write_secret(temp_dir: &TempDir, content: &str) {
        fs::write(temp_dir.path().join("secret.json"), content).unwrap();
    }

    #[tokio::test]
    async fn test_loads_key_from_file() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, r#"{"gemini":{"api_key":"from-file"}}"#);

        let service = service(&temp_dir, None);
        let secrets = service.load_secrets().await.unwrap();

        assert_eq!(secrets.gemini.unwrap().api_key, "from-file");
        assert!(service.secret_file_exists().await);
    }

    #[tokio::test]
    async fn test_env_key_overrides_file_but_keeps_model() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, r#"{"gemini":{"api_key":"from-file","model_name":"gemini-2.5-pro"}}"#);

        let gemini = service(&temp_dir, Some("from-env"))
            .load_secrets()
            .await
            .unwrap()
            .gemini
            .unwrap();

        assert_eq!(gemini.api_key, "from-env");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-pro"));
    }

    #[tokio::test]
    async fn test_env_key_alone_is_enough() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, Some("from-env"));

        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "from-env");
        assert!(!service.secret_file_exists().await);
    }

    #[tokio::test]
    async fn test_missing_everything_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = service(&temp_dir, Some("  ")).load_secrets().await.unwrap_err();
        assert!(err.contains("not found"));
    }

    #[tokio::test]
    async fn test_secrets_are_cached_after_first_load() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, r#"{"gemini":{"api_key":"first"}}"#);
        let service = service(&temp_dir, None);

        service.load_secrets().await.unwrap();
        write_secret(&temp_dir, r#"{"gemini":{"api_key":"second"}}"#);

        assert_eq!(service.load_secrets().await.unwrap().gemini.unwrap().api_key, "first");
    }
}
