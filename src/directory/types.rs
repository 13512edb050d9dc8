use serde::{Deserialize, Serialize};

/// A server as stored in the directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub sid: String,
    pub ip: String,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl ServerRecord {
    pub fn new(sid: impl Into<String>, ip: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            ip: ip.into(),
            hostname: hostname.into(),
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// An account on a server. Several records share `(sid, hostname)`, one per role.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub hostname: String,
    pub username: String,
    /// Opaque handle assigned by the directory; present means "update" on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl UserRecord {
    pub fn new(
        sid: impl Into<String>,
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            sid: sid.into(),
            hostname: hostname.into(),
            username: username.into(),
            id: None,
            password: password.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Durable identity of an account: `{sid}_{username}_{hostname}`
    pub fn identity_key(&self) -> String {
        identity_key(&self.sid, &self.username, &self.hostname)
    }
}

pub fn identity_key(sid: &str, username: &str, hostname: &str) -> String {
    format!("{}_{}_{}", sid, username, hostname)
}

// SECURITY: never print passwords through Debug
impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("sid", &self.sid)
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
