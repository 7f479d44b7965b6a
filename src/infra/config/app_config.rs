use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::infra::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_id: Option<String>,
    pub api_hash: Option<String>,
    pub use_test_dc: bool,
    pub database_encryption_key: String,
    pub log_verbosity: i32,
    pub system_language_code: String,
    pub device_model: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_id: None,
            api_hash: None,
            use_test_dc: false,
            database_encryption_key: String::new(),
            log_verbosity: 1,
            system_language_code: "en".to_owned(),
            device_model: "Desktop".to_owned(),
        }
    }
}

/// Application credentials issued by my.telegram.org.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"[REDACTED]")
            .finish()
    }
}

impl TelegramConfig {
    /// Validates the credential pair; both values must be present and non-blank.
    pub fn credentials(&self) -> Result<Credentials, AppError> {
        let api_id = non_blank(self.api_id.as_deref());
        let api_hash = non_blank(self.api_hash.as_deref());

        let (Some(api_id), Some(api_hash)) = (api_id, api_hash) else {
            return Err(AppError::MissingCredentials);
        };

        let api_id = api_id
            .parse::<i32>()
            .map_err(|_| AppError::InvalidApiId {
                value: api_id.to_owned(),
            })?;

        Ok(Credentials {
            api_id,
            api_hash: api_hash.to_owned(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StorageConfig {
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    pub shutdown_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 5_000,
        }
    }
}
