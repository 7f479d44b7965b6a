use std::path::Path;

use crate::{
    infra::{
        self,
        config::{EnvOverrides, FileConfigAdapter},
        contracts::ConfigAdapter,
        error::AppError,
        logging::LoggingGuard,
        storage_layout::StorageLayout,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<(AppContext, LoggingGuard), AppError> {
    let config_adapter = FileConfigAdapter::new(config_path, EnvOverrides::from_process_env());
    let context = build_context(&config_adapter)?;
    let logging = infra::logging::init(&context.config.logging)?;

    Ok((context, logging))
}

fn build_context(config_adapter: &dyn ConfigAdapter) -> Result<AppContext, AppError> {
    let config = config_adapter.load()?;
    let layout = StorageLayout::resolve(&config.storage)?;

    Ok(AppContext::new(config, layout))
}
