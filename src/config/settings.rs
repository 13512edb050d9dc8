use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the console configuration file
pub const CONFIG_FILE_NAME: &str = "opconsole.toml";

/// Placeholder substituted with the SID fragment in the OC templates
pub const SID_PLACEHOLDER: &str = "[sid]";

/// Role-name mapping: which directory usernames stand for which login purpose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default)]
    pub default_login_user: String,
    #[serde(default)]
    pub default_login_su: String,
    #[serde(default)]
    pub default_login_win: String,
    #[serde(default)]
    pub default_login_oc_user_template: String,
    #[serde(default)]
    pub default_login_oc_id_template: String,
    #[serde(default)]
    pub default_login_oc_url: String,
}

/// Console configuration snapshot, read once per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_ttpmacro_path")]
    pub ttpmacro_path: String,
    pub server_data_api: String,
    pub user_data_api: String,
    #[serde(flatten)]
    pub roles: RoleConfig,
    #[serde(default = "default_su_password_prompt")]
    pub su_password_prompt: String,
    #[serde(default)]
    pub macro_dir: Option<PathBuf>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_ttpmacro_path() -> String {
    "ttpmacro.exe".to_string()
}

fn default_su_password_prompt() -> String {
    "assword".to_string()
}

impl ConsoleConfig {
    pub fn new(server_data_api: impl Into<String>, user_data_api: impl Into<String>) -> Self {
        Self {
            ttpmacro_path: default_ttpmacro_path(),
            server_data_api: server_data_api.into(),
            user_data_api: user_data_api.into(),
            roles: RoleConfig::default(),
            su_password_prompt: default_su_password_prompt(),
            macro_dir: None,
            request_timeout_secs: None,
        }
    }

    pub fn with_roles(mut self, roles: RoleConfig) -> Self {
        self.roles = roles;
        self
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: ConsoleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!("Loaded console config from {:?}", path);
        Ok(config)
    }

    /// Find and load the configuration file.
    ///
    /// The current working directory wins over the per-user config directory.
    pub fn discover() -> AppResult<Self> {
        let mut candidates = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Ok(dir) = super::get_config_dir() {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }

        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Err(AppError::Config(format!(
                "{} not found (searched: {:?})",
                CONFIG_FILE_NAME, candidates
            ))),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.server_data_api.trim().is_empty() {
            return Err(AppError::Config("server_data_api must not be empty".to_string()));
        }
        if self.user_data_api.trim().is_empty() {
            return Err(AppError::Config("user_data_api must not be empty".to_string()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(AppError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Directory that receives the generated terminal macros
    pub fn macro_dir(&self) -> AppResult<PathBuf> {
        match &self.macro_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}
