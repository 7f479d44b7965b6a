use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;

use crate::infra::{config::StorageConfig, error::AppError};

const STATE_DIR_NAME: &str = ".telertx";
const LOCK_FILE_NAME: &str = "telertx.lock";

/// On-disk layout of the session store. Only `state_dir` is created here;
/// the engine owns everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub state_dir: PathBuf,
    pub database_dir: PathBuf,
    pub files_dir: PathBuf,
}

impl StorageLayout {
    pub fn resolve(config: &StorageConfig) -> Result<Self, AppError> {
        let state_dir = match &config.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .map(|home| home.join(STATE_DIR_NAME))
                .ok_or_else(|| AppError::StoragePathResolution {
                    details: "unable to resolve home directory".into(),
                })?,
        };

        Ok(Self::at(state_dir))
    }

    pub fn at(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            database_dir: state_dir.join("db"),
            files_dir: state_dir.join("files"),
            state_dir,
        }
    }

    pub fn ensure_state_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.state_dir).map_err(|source| AppError::StorageDirCreate {
            path: self.state_dir.clone(),
            source,
        })
    }

    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE_NAME)
    }
}

/// Exclusive advisory lock over the session store; released on drop.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl SessionLock {
    pub fn acquire(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|source| AppError::SessionLockCreate {
                path: path.to_path_buf(),
                source,
            })?;

        file.try_lock_exclusive()
            .map_err(|_| AppError::SessionStoreBusy {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), %error, "failed to release session lock");
        }
    }
}
