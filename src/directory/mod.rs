//! Directory service access
//!
//! The directory is an external REST backend holding server and user records.
//! `DirectoryApi` is the seam the resolver and the lookup session talk to;
//! `DirectoryClient` is the HTTP implementation.

pub mod client;
#[cfg(test)]
pub mod memory;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod types;

pub use client::DirectoryClient;
#[cfg(test)]
pub use memory::MemoryDirectory;
pub use types::*;

use crate::error::AppResult;
use async_trait::async_trait;

/// Read/write access to server and user records
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Servers matching `sid` (empty filter returns all). No post-filtering.
    async fn query_servers(&self, sid: &str) -> AppResult<Vec<ServerRecord>>;

    /// Servers registered under `hostname`
    async fn query_servers_by_hostname(&self, hostname: &str) -> AppResult<Vec<ServerRecord>>;

    /// All accounts of `hostname`, in directory order
    async fn query_users(&self, hostname: &str) -> AppResult<Vec<UserRecord>>;

    /// Zero or one account with the given directory id
    async fn query_user_by_id(&self, id: &str) -> AppResult<Vec<UserRecord>>;

    async fn upsert_server(&self, record: &ServerRecord) -> AppResult<()>;

    /// Update by `record.id` when present, create otherwise
    async fn upsert_user(&self, record: &UserRecord) -> AppResult<()>;

    /// Look up an account by its durable `(sid, username, hostname)` identity
    async fn find_user(
        &self,
        sid: &str,
        username: &str,
        hostname: &str,
    ) -> AppResult<Option<UserRecord>> {
        let key = identity_key(sid, username, hostname);
        Ok(self.query_user_by_id(&key).await?.into_iter().next())
    }
}

/// Write an account back, updating the existing record when one with the same
/// `(sid, username, hostname)` identity is already registered.
pub async fn save_user(directory: &dyn DirectoryApi, mut record: UserRecord) -> AppResult<()> {
    if record.id.is_none() {
        if let Some(existing) = directory
            .find_user(&record.sid, &record.username, &record.hostname)
            .await?
        {
            record.id = existing.id;
        }
    }
    directory.upsert_user(&record).await
}
