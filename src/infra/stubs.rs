use crate::infra::{config::AppConfig, contracts::ConfigAdapter, error::AppError};

/// Config adapter that yields a fixed configuration, used by bootstrap tests.
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter {
    pub config: AppConfig,
}

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig, AppError> {
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let adapter = StubConfigAdapter::default();
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }
}
