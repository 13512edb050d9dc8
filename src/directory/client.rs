use super::{DirectoryApi, ServerRecord, UserRecord};
use crate::config::ConsoleConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client for the directory service
pub struct DirectoryClient {
    server_api: String,
    user_api: String,
    client: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(server_api: &str, user_api: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            server_api: server_api.to_string(),
            user_api: user_api.to_string(),
            client,
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> AppResult<Self> {
        Self::new(
            &config.server_data_api,
            &config.user_data_api,
            config.request_timeout(),
        )
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        key: &str,
        value: &str,
    ) -> AppResult<Vec<T>> {
        let response = self
            .client
            .get(endpoint)
            .header("Content-Type", "application/json")
            .query(&[(key, value)])
            .send()
            .await
            .map_err(|e| AppError::DirectoryUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DirectoryUnavailable(format!(
                "Directory returned {} for {}",
                response.status(),
                endpoint
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::DirectoryUnavailable(format!("Failed to parse response: {}", e)))
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: Option<(&str, &str)>,
        body: &T,
    ) -> AppResult<()> {
        let mut request = self.client.post(endpoint).json(body);
        if let Some(pair) = query {
            request = request.query(&[pair]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::DirectoryUnavailable(format!("Write failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::DirectoryUnavailable(format!(
                "Directory rejected write with {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    async fn query_servers(&self, sid: &str) -> AppResult<Vec<ServerRecord>> {
        let servers: Vec<ServerRecord> = self.get_list(&self.server_api, "sid", sid).await?;
        tracing::debug!("Directory returned {} servers for sid {:?}", servers.len(), sid);
        Ok(servers)
    }

    async fn query_servers_by_hostname(&self, hostname: &str) -> AppResult<Vec<ServerRecord>> {
        self.get_list(&self.server_api, "hostname", hostname).await
    }

    async fn query_users(&self, hostname: &str) -> AppResult<Vec<UserRecord>> {
        let users: Vec<UserRecord> = self.get_list(&self.user_api, "hostname", hostname).await?;
        tracing::debug!("Directory returned {} users for host {}", users.len(), hostname);
        Ok(users)
    }

    async fn query_user_by_id(&self, id: &str) -> AppResult<Vec<UserRecord>> {
        self.get_list(&self.user_api, "id", id).await
    }

    async fn upsert_server(&self, record: &ServerRecord) -> AppResult<()> {
        tracing::info!("Upserting server {} ({})", record.hostname, record.sid);
        self.post(&self.server_api, Some(("hostname", record.hostname.as_str())), record)
            .await
    }

    async fn upsert_user(&self, record: &UserRecord) -> AppResult<()> {
        match record.id.as_deref() {
            Some(id) => {
                tracing::info!("Updating user {} on {}", record.username, record.hostname);
                self.post(&self.user_api, Some(("id", id)), record).await
            }
            None => {
                tracing::info!("Creating user {} on {}", record.username, record.hostname);
                self.post(&self.user_api, None, record).await
            }
        }
    }
}
