use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "Missing Telegram API credentials. Please set TELEGRAM_API_ID and TELEGRAM_API_HASH environment variables.\nGet your credentials from https://my.telegram.org"
    )]
    MissingCredentials,
    #[error("TELEGRAM_API_ID must be an integer, got `{value}`")]
    InvalidApiId { value: String },
    #[error("storage path resolution failed: {details}")]
    StoragePathResolution { details: String },
    #[error("failed to create storage directory at {path}: {source}")]
    StorageDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open session lock at {path}: {source}")]
    SessionLockCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store at {path} is in use by another telertx process")]
    SessionStoreBusy { path: PathBuf },
    #[error("failed to initialize logging: {0}")]
    LoggingInit(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
