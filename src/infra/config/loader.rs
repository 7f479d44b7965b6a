use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const CONFIG_DIR_NAME: &str = "telertx";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const API_ID_ENV: &str = "TELEGRAM_API_ID";
pub const API_HASH_ENV: &str = "TELEGRAM_API_HASH";
pub const STATE_DIR_ENV: &str = "TELERTX_STATE_DIR";

/// Values picked up from the process environment; they win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub api_id: Option<String>,
    pub api_hash: Option<String>,
    pub state_dir: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_id: lookup(API_ID_ENV),
            api_hash: lookup(API_HASH_ENV),
            state_dir: lookup(STATE_DIR_ENV)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    fn apply(self, config: &mut AppConfig) {
        if let Some(api_id) = self.api_id {
            config.telegram.api_id = Some(api_id);
        }

        if let Some(api_hash) = self.api_hash {
            config.telegram.api_hash = Some(api_hash);
        }

        if let Some(state_dir) = self.state_dir {
            config.storage.state_dir = Some(state_dir);
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load(path: Option<&Path>, env: EnvOverrides) -> Result<AppConfig, AppError> {
    let mut config = load_file(path)?;
    env.apply(&mut config);
    Ok(config)
}

fn load_file(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::default();

    let Some(config_path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return Ok(config);
    };

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}
