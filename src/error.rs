use crate::credentials::LoginRole;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("No account configured for the {0} login")]
    RoleNotConfigured(LoginRole),

    #[error("No su account configured for this host")]
    SuRoleNotConfigured,

    #[error("Launch rejected: {0}")]
    LaunchRejected(String),

    #[error("No server selected")]
    NoServerSelected,

    #[error("Accounts for the selected server are not resolved")]
    CredentialsNotResolved,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether the operator can simply retry the same action later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::DirectoryUnavailable(_)
                | AppError::LaunchRejected(_)
                | AppError::CredentialsNotResolved
        )
    }
}

/// Serializable error for frontend
#[derive(Debug, Serialize)]
pub struct SerializableError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for SerializableError {
    fn from(err: &AppError) -> Self {
        let (code, message, details) = match err {
            AppError::DirectoryUnavailable(msg) => (
                "DIRECTORY_UNAVAILABLE",
                "Directory service is unavailable".to_string(),
                Some(msg.clone()),
            ),
            AppError::RoleNotConfigured(role) => (
                "ROLE_NOT_CONFIGURED",
                format!("Cannot log in as {}: no matching account", role),
                None,
            ),
            AppError::SuRoleNotConfigured => (
                "SU_ROLE_NOT_CONFIGURED",
                "Cannot log in with su: no matching su account".to_string(),
                None,
            ),
            AppError::LaunchRejected(reason) => ("LAUNCH_REJECTED", reason.clone(), None),
            AppError::NoServerSelected => ("NO_SERVER_SELECTED", err.to_string(), None),
            AppError::CredentialsNotResolved => (
                "CREDENTIALS_NOT_RESOLVED",
                "Account lookup for the selected server has not completed".to_string(),
                None,
            ),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Io(e) => ("IO_ERROR", e.to_string(), None),
            AppError::Serialization(msg) => ("SERIALIZATION_ERROR", msg.clone(), None),
        };

        SerializableError {
            code: code.to_string(),
            message,
            details,
        }
    }
}

// Implement Serialize for AppError so Tauri can send it to frontend
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SerializableError::from(self).serialize(serializer)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::DirectoryUnavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
