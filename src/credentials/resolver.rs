use super::{Credential, OcAccount, ResolvedCredentialSet};
use crate::config::RoleConfig;
use crate::directory::{DirectoryApi, UserRecord};
use crate::error::AppResult;
use std::sync::Arc;

/// Outcome of resolving one host
#[derive(Debug, Clone)]
pub struct Resolution {
    pub hostname: String,
    /// Every account of the host, in directory order
    pub users: Vec<UserRecord>,
    pub credentials: ResolvedCredentialSet,
}

/// Resolves the role slots of a host against the directory
#[derive(Clone)]
pub struct CredentialResolver {
    directory: Arc<dyn DirectoryApi>,
}

impl CredentialResolver {
    pub fn new(directory: Arc<dyn DirectoryApi>) -> Self {
        Self { directory }
    }

    pub async fn resolve(
        &self,
        hostname: &str,
        sid: &str,
        roles: &RoleConfig,
    ) -> AppResult<ResolvedCredentialSet> {
        Ok(self.resolve_with_users(hostname, sid, roles).await?.credentials)
    }

    /// Resolve the slots and keep the host's account list.
    ///
    /// The account listing and the OC lookup run concurrently; the result is
    /// only returned once both have completed.
    pub async fn resolve_with_users(
        &self,
        hostname: &str,
        sid: &str,
        roles: &RoleConfig,
    ) -> AppResult<Resolution> {
        let oc_account = OcAccount::for_sid(sid, roles);

        let users_lookup = self.directory.query_users(hostname);
        let oc_lookup = async {
            match &oc_account {
                Some(account) => Some(self.directory.query_user_by_id(&account.id).await),
                None => None,
            }
        };
        let (users, oc_records) = tokio::join!(users_lookup, oc_lookup);
        let users = users?;

        let mut credentials = ResolvedCredentialSet::from_users(&users, roles);
        credentials.oc = match (oc_account, oc_records) {
            (Some(account), Some(Ok(records))) => records
                .into_iter()
                .next()
                .map(|record| Credential::new(account.username, record.password)),
            (Some(account), Some(Err(e))) => {
                tracing::warn!("OC account lookup for {} failed: {}", account.id, e);
                None
            }
            _ => None,
        };

        tracing::info!(
            "Resolved {} accounts on {} (default: {}, su: {}, win: {}, oc: {})",
            users.len(),
            hostname,
            credentials.default.is_some(),
            credentials.su.is_some(),
            credentials.win.is_some(),
            credentials.oc.is_some()
        );

        Ok(Resolution {
            hostname: hostname.to_string(),
            users,
            credentials,
        })
    }
}
