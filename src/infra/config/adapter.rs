use std::path::{Path, PathBuf};

use crate::infra::{
    config::{load, AppConfig, EnvOverrides},
    contracts::ConfigAdapter,
    error::AppError,
};

#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
    env: EnvOverrides,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>, env: EnvOverrides) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            env,
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig, AppError> {
        load(self.path.as_deref(), self.env.clone())
    }
}
