use std::{error::Error, process::ExitCode, sync::Arc};

use catering_core::{config::ConfigManager, http, storage::JsonStorage, utils};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "catering server stopped");
            eprintln!("catering_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load()?;
    config.apply_env_overrides()?;
    utils::init_tracing_with(&config.log_filter);

    let data_dir = config.resolve_data_dir(manager.base_dir());
    tracing::info!(data_dir = %data_dir.display(), "opening JSON store");
    let store = JsonStorage::new(data_dir, Some(config.backup_retention))?;
    http::serve(&config, Arc::new(store)).await?;
    Ok(())
}
