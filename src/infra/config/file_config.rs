use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{AppConfig, EngineConfig, LogConfig, StorageConfig, TelegramConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub telegram: Option<FileTelegramConfig>,
    pub storage: Option<FileStorageConfig>,
    pub engine: Option<FileEngineConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(telegram) = self.telegram {
            telegram.merge_into(&mut config.telegram);
        }

        if let Some(storage) = self.storage {
            storage.merge_into(&mut config.storage);
        }

        if let Some(engine) = self.engine {
            engine.merge_into(&mut config.engine);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

/// `api_id` is accepted both as a TOML integer and as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FileApiId {
    Number(i64),
    Text(String),
}

impl FileApiId {
    fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTelegramConfig {
    pub api_id: Option<FileApiId>,
    pub api_hash: Option<String>,
    pub use_test_dc: Option<bool>,
    pub database_encryption_key: Option<String>,
    pub log_verbosity: Option<i32>,
    pub system_language_code: Option<String>,
    pub device_model: Option<String>,
}

impl FileTelegramConfig {
    fn merge_into(self, config: &mut TelegramConfig) {
        if let Some(api_id) = self.api_id {
            config.api_id = Some(api_id.into_string());
        }

        if let Some(api_hash) = self.api_hash {
            config.api_hash = Some(api_hash);
        }

        if let Some(use_test_dc) = self.use_test_dc {
            config.use_test_dc = use_test_dc;
        }

        if let Some(key) = self.database_encryption_key {
            config.database_encryption_key = key;
        }

        if let Some(verbosity) = self.log_verbosity {
            config.log_verbosity = verbosity;
        }

        if let Some(code) = self.system_language_code {
            config.system_language_code = code;
        }

        if let Some(model) = self.device_model {
            config.device_model = model;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileStorageConfig {
    pub state_dir: Option<PathBuf>,
}

impl FileStorageConfig {
    fn merge_into(self, config: &mut StorageConfig) {
        if let Some(state_dir) = self.state_dir {
            config.state_dir = Some(state_dir);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileEngineConfig {
    pub shutdown_timeout_ms: Option<u64>,
}

impl FileEngineConfig {
    fn merge_into(self, config: &mut EngineConfig) {
        if let Some(timeout_ms) = self.shutdown_timeout_ms {
            config.shutdown_timeout_ms = timeout_ms;
        }
    }
}
