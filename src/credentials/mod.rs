//! Login credential resolution
//!
//! Partitions the accounts of a host into role slots by matching usernames
//! against the configured role names, and synthesizes the operator-console
//! ("OC") account from the SID-derived templates.

mod resolver;

pub use resolver::*;

use crate::config::{RoleConfig, SID_PLACEHOLDER};
use crate::directory::UserRecord;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Login variant the operator can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginRole {
    Default,
    Su,
    Win,
}

impl std::fmt::Display for LoginRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginRole::Default => write!(f, "default"),
            LoginRole::Su => write!(f, "su"),
            LoginRole::Win => write!(f, "win"),
        }
    }
}

/// A username/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&UserRecord> for Credential {
    fn from(user: &UserRecord) -> Self {
        Self::new(user.username.clone(), user.password.clone())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Credentials for one launch: the login account and, for su, the target account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCredentials {
    pub primary: Credential,
    pub secondary: Option<Credential>,
}

/// Resolved role slots of one host.
///
/// `su` is never populated without `default`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCredentialSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub su: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oc: Option<Credential>,
}

impl ResolvedCredentialSet {
    /// Fill the default/su/win slots from a host's accounts (first match wins)
    pub fn from_users(users: &[UserRecord], roles: &RoleConfig) -> Self {
        let default = find_role_user(users, &roles.default_login_user).map(Credential::from);
        let su = default
            .as_ref()
            .and(find_role_user(users, &roles.default_login_su))
            .map(Credential::from);
        let win = find_role_user(users, &roles.default_login_win).map(Credential::from);

        Self {
            default,
            su,
            win,
            oc: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.su.is_none() && self.win.is_none() && self.oc.is_none()
    }

    /// Replace one role slot. Clearing `default` also clears `su`.
    pub fn assign(&mut self, role: LoginRole, credential: Option<Credential>) {
        match role {
            LoginRole::Default => {
                if credential.is_none() {
                    self.su = None;
                }
                self.default = credential;
            }
            LoginRole::Su => {
                self.su = if self.default.is_some() { credential } else { None };
            }
            LoginRole::Win => self.win = credential,
        }
    }

    /// Credentials needed to launch `role`
    pub fn credential_for(&self, role: LoginRole) -> AppResult<RoleCredentials> {
        match role {
            LoginRole::Default => {
                let primary = self
                    .default
                    .clone()
                    .ok_or(AppError::RoleNotConfigured(LoginRole::Default))?;
                Ok(RoleCredentials { primary, secondary: None })
            }
            LoginRole::Su => {
                let primary = self
                    .default
                    .clone()
                    .ok_or(AppError::RoleNotConfigured(LoginRole::Default))?;
                let secondary = self.su.clone().ok_or(AppError::SuRoleNotConfigured)?;
                Ok(RoleCredentials {
                    primary,
                    secondary: Some(secondary),
                })
            }
            LoginRole::Win => {
                let primary = self
                    .win
                    .clone()
                    .ok_or(AppError::RoleNotConfigured(LoginRole::Win))?;
                Ok(RoleCredentials { primary, secondary: None })
            }
        }
    }
}

/// First account whose username equals `role_name`. An empty role name matches nothing.
pub fn find_role_user<'a>(users: &'a [UserRecord], role_name: &str) -> Option<&'a UserRecord> {
    if role_name.is_empty() {
        return None;
    }
    users.iter().find(|user| user.username == role_name)
}

/// SID fragment used by the OC templates: characters 2..=4 of a 6-character SID,
/// the whole SID otherwise; lower-cased.
pub fn sid_fragment(sid: &str) -> String {
    if sid.chars().count() == 6 {
        sid.chars().skip(2).take(3).collect::<String>().to_lowercase()
    } else {
        sid.to_lowercase()
    }
}

/// Replace every `[sid]` placeholder in `template` with `fragment`
pub fn apply_template(template: &str, fragment: &str) -> String {
    template.replace(SID_PLACEHOLDER, fragment)
}

/// Username and directory id of the OC account for `sid`, when both templates are configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcAccount {
    pub username: String,
    pub id: String,
}

impl OcAccount {
    pub fn for_sid(sid: &str, roles: &RoleConfig) -> Option<Self> {
        if roles.default_login_oc_user_template.is_empty()
            || roles.default_login_oc_id_template.is_empty()
        {
            return None;
        }
        let fragment = sid_fragment(sid);
        Some(Self {
            username: apply_template(&roles.default_login_oc_user_template, &fragment),
            id: apply_template(&roles.default_login_oc_id_template, &fragment),
        })
    }
}
