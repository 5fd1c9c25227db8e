pub mod browse;
pub mod config;
pub mod details;
pub mod prompts;
pub mod render;
pub mod search;
pub mod ui;
pub mod watched;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, FileStore, PathManager};
use popcorn_core::App;
use popcorn_sources::{MovieApi, OmdbClient};
use std::sync::Arc;
use tracing::debug;

/// Paths and configuration every command starts from
pub struct Session {
    pub paths: PathManager,
    pub config: Config,
}

impl Session {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        debug!("Using configuration from {}", config_file.display());
        Ok(Self { paths, config })
    }

    pub fn open_store(&self) -> Result<FileStore> {
        self.paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
        let store_file = self.paths.store_file();
        FileStore::open(store_file.clone())
            .map_err(|e| eyre!("Failed to open store at {}: {}", store_file.display(), e))
    }

    /// OMDb client built from the validated configuration
    pub fn api(&self) -> Result<Arc<dyn MovieApi>> {
        self.config.validate().map_err(|e| eyre!("{}", e))?;
        let client = OmdbClient::from_config(&self.config.omdb)
            .map_err(|e| eyre!("Failed to create OMDb client: {}", e))?;
        debug!("Movie source '{}' ready ({})", client.source_name(), client.base_url());
        Ok(Arc::new(client))
    }

    /// Must be called inside the Tokio runtime
    pub fn app(&self) -> Result<App<FileStore>> {
        let api = self.api()?;
        let store = self.open_store()?;
        Ok(App::new(api, store, &self.config))
    }
}
