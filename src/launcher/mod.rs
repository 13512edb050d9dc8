//! Session launch boundary
//!
//! The core hands a fully resolved credential set to a `SessionLauncher` and
//! does nothing else: no retries, no queueing. Each call is independent.

#[cfg(feature = "desktop")]
pub mod commands;
mod rdp;
mod teraterm;

pub use teraterm::{build_macro, encode_macro_password};

use crate::config::ConsoleConfig;
use crate::credentials::{Credential, LoginRole};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Presentation hints passed through to the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHints {
    /// Background color as `r,g,b`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Follow-up `oc login` performed inside the terminal session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcLogin {
    pub url: String,
    pub credential: Credential,
}

/// Everything an external launcher needs to open one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub ip: String,
    pub role: LoginRole,
    pub primary: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oc: Option<OcLogin>,
}

impl LaunchRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.ip.trim().is_empty() {
            return Err(AppError::LaunchRejected("Target address is empty".to_string()));
        }
        if self.role == LoginRole::Su && self.secondary.is_none() {
            return Err(AppError::SuRoleNotConfigured);
        }
        Ok(())
    }
}

/// Operator options for one launch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    /// Log into the OC console after connecting, when an OC account is resolved
    #[serde(default)]
    pub oc: bool,
    #[serde(default)]
    pub bg_color: Option<String>,
}

/// External process-launch capability
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Open the session. Failures surface as `LaunchRejected`.
    async fn launch(&self, request: &LaunchRequest) -> AppResult<()>;
}

/// Launches Tera Term (ssh roles) and the Windows RDP client (win role)
pub struct ProcessLauncher {
    ttpmacro_path: String,
    macro_dir: PathBuf,
    su_prompt: String,
}

impl ProcessLauncher {
    pub fn new(ttpmacro_path: impl Into<String>, macro_dir: PathBuf, su_prompt: impl Into<String>) -> Self {
        Self {
            ttpmacro_path: ttpmacro_path.into(),
            macro_dir,
            su_prompt: su_prompt.into(),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> AppResult<Self> {
        Ok(Self::new(
            config.ttpmacro_path.clone(),
            config.macro_dir()?,
            config.su_password_prompt.clone(),
        ))
    }
}

#[async_trait]
impl SessionLauncher for ProcessLauncher {
    async fn launch(&self, request: &LaunchRequest) -> AppResult<()> {
        request.validate()?;
        tracing::info!(
            "Launching {} session to {} as {}",
            request.role,
            request.ip,
            request.primary.username
        );

        match request.role {
            LoginRole::Default | LoginRole::Su => {
                let content = build_macro(request, &self.su_prompt)?;
                teraterm::run_macro(&self.ttpmacro_path, &self.macro_dir, &content).await
            }
            LoginRole::Win => rdp::launch(&request.ip, &request.primary).await,
        }
    }
}

/// Map a spawn/exit outcome to `LaunchRejected`
pub(crate) fn check_exit(
    program: &str,
    result: std::io::Result<std::process::ExitStatus>,
) -> AppResult<()> {
    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(AppError::LaunchRejected(format!(
            "{} exited with {}",
            program, status
        ))),
        Err(e) => Err(AppError::LaunchRejected(format!(
            "Failed to start {}: {}",
            program, e
        ))),
    }
}
