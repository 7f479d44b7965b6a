use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

/// Keeps the file writer flushing until the command finishes.
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

pub fn init(config: &LogConfig) -> Result<LoggingGuard, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                AppError::LoggingInit(format!("log file path has no file name: {}", path.display()).into())
            })?;

            std::fs::create_dir_all(directory).map_err(|source| AppError::StorageDirCreate {
                path: directory.to_path_buf(),
                source,
            })?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(AppError::LoggingInit)?;

            Ok(LoggingGuard { _file: Some(guard) })
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(io::stderr)
                .try_init()
                .map_err(AppError::LoggingInit)?;

            Ok(LoggingGuard::default())
        }
    }
}
