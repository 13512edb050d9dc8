//! In-process directory backed by vectors, standing in for the REST backend in unit tests.

use super::{DirectoryApi, ServerRecord, UserRecord};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Directory kept in memory, with exact-match filters and empty filters returning all
pub struct MemoryDirectory {
    servers: RwLock<Vec<ServerRecord>>,
    users: RwLock<Vec<UserRecord>>,
    available: AtomicBool,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl MemoryDirectory {
    pub fn new(servers: Vec<ServerRecord>, users: Vec<UserRecord>) -> Self {
        Self {
            servers: RwLock::new(servers),
            users: RwLock::new(users),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: every call fails with `DirectoryUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn users(&self) -> Vec<UserRecord> {
        self.users.read().clone()
    }

    pub fn servers(&self) -> Vec<ServerRecord> {
        self.servers.read().clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::DirectoryUnavailable("directory offline".to_string()))
        }
    }
}

fn filter_matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

#[async_trait]
impl DirectoryApi for MemoryDirectory {
    async fn query_servers(&self, sid: &str) -> AppResult<Vec<ServerRecord>> {
        self.check()?;
        Ok(self
            .servers
            .read()
            .iter()
            .filter(|s| filter_matches(sid, &s.sid))
            .cloned()
            .collect())
    }

    async fn query_servers_by_hostname(&self, hostname: &str) -> AppResult<Vec<ServerRecord>> {
        self.check()?;
        Ok(self
            .servers
            .read()
            .iter()
            .filter(|s| filter_matches(hostname, &s.hostname))
            .cloned()
            .collect())
    }

    async fn query_users(&self, hostname: &str) -> AppResult<Vec<UserRecord>> {
        self.check()?;
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| filter_matches(hostname, &u.hostname))
            .cloned()
            .collect())
    }

    async fn query_user_by_id(&self, id: &str) -> AppResult<Vec<UserRecord>> {
        self.check()?;
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| u.id.as_deref() == Some(id))
            .take(1)
            .cloned()
            .collect())
    }

    async fn upsert_server(&self, record: &ServerRecord) -> AppResult<()> {
        self.check()?;
        let mut servers = self.servers.write();
        match servers.iter_mut().find(|s| s.hostname == record.hostname) {
            Some(existing) => *existing = record.clone(),
            None => servers.push(record.clone()),
        }
        Ok(())
    }

    async fn upsert_user(&self, record: &UserRecord) -> AppResult<()> {
        self.check()?;
        let mut users = self.users.write();
        if let Some(id) = record.id.as_deref() {
            if let Some(existing) = users.iter_mut().find(|u| u.id.as_deref() == Some(id)) {
                *existing = record.clone();
                return Ok(());
            }
        }
        // Create: the directory side assigns the handle
        let mut created = record.clone();
        if created.id.is_none() {
            created.id = Some(created.identity_key());
        }
        users.push(created);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_user_create_then_update() {
        let directory = MemoryDirectory::default();
        directory
            .upsert_user(&UserRecord::new("AB1234", "h1", "root", "old"))
            .await
            .unwrap();

        let created = directory.find_user("AB1234", "root", "h1").await.unwrap().unwrap();
        assert_eq!(created.id.as_deref(), Some("AB1234_root_h1"));

        let mut changed = created.clone();
        changed.password = "new".to_string();
        directory.upsert_user(&changed).await.unwrap();

        let users = directory.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].password, "new");
    }

    #[tokio::test]
    async fn test_offline_directory_fails_reads() {
        let directory = MemoryDirectory::new(vec![ServerRecord::new("AB1234", "10.0.0.5", "h1")], vec![]);
        directory.set_available(false);
        assert!(matches!(
            directory.query_servers("AB1234").await,
            Err(AppError::DirectoryUnavailable(_))
        ));
        directory.set_available(true);
        assert_eq!(directory.query_servers("").await.unwrap().len(), 1);
    }
}
