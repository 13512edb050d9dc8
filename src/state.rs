use crate::config::ConsoleConfig;
use crate::directory::{DirectoryApi, DirectoryClient};
use crate::error::AppResult;
use crate::launcher::{ProcessLauncher, SessionLauncher};
use crate::lookup::LookupSession;
use std::sync::Arc;

/// Global application state
pub struct AppState {
    pub config: Arc<ConsoleConfig>,
    pub directory: Arc<dyn DirectoryApi>,
    pub session: Arc<LookupSession>,
}

impl AppState {
    /// Build the state from the discovered configuration file
    pub fn load() -> AppResult<Self> {
        Self::new(ConsoleConfig::discover()?)
    }

    pub fn new(config: ConsoleConfig) -> AppResult<Self> {
        config.validate()?;
        let directory = Arc::new(DirectoryClient::from_config(&config)?);
        let launcher = Arc::new(ProcessLauncher::from_config(&config)?);
        Ok(Self::with_parts(config, directory, launcher))
    }

    pub fn with_parts(
        config: ConsoleConfig,
        directory: Arc<dyn DirectoryApi>,
        launcher: Arc<dyn SessionLauncher>,
    ) -> Self {
        let session = LookupSession::new(directory.clone(), launcher, config.roles.clone());
        tracing::info!(
            "Console ready (servers: {}, users: {})",
            config.server_data_api,
            config.user_data_api
        );

        Self {
            config: Arc::new(config),
            directory,
            session: Arc::new(session),
        }
    }
}
