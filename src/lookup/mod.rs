//! Lookup session: SID search, server selection, credential resolution, launch
//!
//! Phases: `Idle -> ServersLoaded -> ServerSelected -> CredentialsResolved`.
//! A new search or clear always drops the selection and any resolved
//! credentials, and a resolution that finishes after its selection was
//! superseded is discarded instead of committed.

#[cfg(feature = "desktop")]
pub mod commands;

use crate::config::RoleConfig;
use crate::credentials::{
    Credential, CredentialResolver, LoginRole, ResolvedCredentialSet,
};
use crate::directory::{DirectoryApi, ServerRecord, UserRecord};
use crate::error::{AppError, AppResult};
use crate::launcher::{DisplayHints, LaunchOptions, LaunchRequest, OcLogin, SessionLauncher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupPhase {
    #[default]
    Idle,
    ServersLoaded,
    ServerSelected,
    CredentialsResolved,
}

/// Operator actions coming from the login screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConsoleAction {
    /// The operator picked another account for a login role
    LoginRoleSelected { role: LoginRole, username: String },
}

#[derive(Debug, Default)]
struct SessionState {
    phase: LookupPhase,
    sid: String,
    servers: Vec<ServerRecord>,
    selected_server: Option<ServerRecord>,
    host_users: Vec<UserRecord>,
    credentials: Option<ResolvedCredentialSet>,
    /// Bumped by search/clear; guards server list commits
    search_epoch: u64,
    /// Bumped by search/clear/select; guards credential commits
    selection_epoch: u64,
}

impl SessionState {
    fn drop_selection(&mut self) {
        self.selection_epoch += 1;
        self.selected_server = None;
        self.host_users.clear();
        self.credentials = None;
    }

    /// Selected server and its committed credentials. A selection whose
    /// resolution failed or is still pending has no usable credentials.
    fn require_resolved(&self) -> AppResult<(&ServerRecord, &ResolvedCredentialSet)> {
        let server = self
            .selected_server
            .as_ref()
            .ok_or(AppError::NoServerSelected)?;
        match (&self.credentials, self.phase) {
            (Some(credentials), LookupPhase::CredentialsResolved) => Ok((server, credentials)),
            _ => Err(AppError::CredentialsNotResolved),
        }
    }

    fn reset(&mut self, sid: &str) {
        self.search_epoch += 1;
        self.drop_selection();
        self.phase = LookupPhase::Idle;
        self.sid = sid.to_string();
        self.servers.clear();
    }
}

/// Serializable view of the session for the frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: LookupPhase,
    pub sid: String,
    pub servers: Vec<ServerRecord>,
    pub selected_server: Option<ServerRecord>,
    /// Usernames available on the selected host, in directory order
    pub usernames: Vec<String>,
    pub credentials: Option<ResolvedCredentialSet>,
}

/// One operator's lookup flow. Shared by reference; all methods take `&self`.
pub struct LookupSession {
    directory: Arc<dyn DirectoryApi>,
    resolver: CredentialResolver,
    launcher: Arc<dyn SessionLauncher>,
    roles: RoleConfig,
    state: RwLock<SessionState>,
}

impl LookupSession {
    pub fn new(
        directory: Arc<dyn DirectoryApi>,
        launcher: Arc<dyn SessionLauncher>,
        roles: RoleConfig,
    ) -> Self {
        Self {
            resolver: CredentialResolver::new(directory.clone()),
            directory,
            launcher,
            roles,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn roles(&self) -> &RoleConfig {
        &self.roles
    }

    /// Search servers by SID. Always discards the previous selection first.
    ///
    /// An empty result leaves the session `Idle`. On failure the session is
    /// `Idle` and the error is returned for display. Returns `Ok(None)` when a
    /// newer search or clear started before this one completed.
    pub async fn search(&self, sid: &str) -> AppResult<Option<Vec<ServerRecord>>> {
        let epoch = {
            let mut state = self.state.write();
            state.reset(sid);
            state.search_epoch
        };
        tracing::info!("Searching servers for sid {:?}", sid);

        let result = self.directory.query_servers(sid).await;

        let mut state = self.state.write();
        if state.search_epoch != epoch {
            tracing::debug!("Discarding superseded server search for {:?}", sid);
            return Ok(None);
        }
        match result {
            Ok(servers) => {
                state.phase = if servers.is_empty() {
                    LookupPhase::Idle
                } else {
                    LookupPhase::ServersLoaded
                };
                state.servers = servers.clone();
                Ok(Some(servers))
            }
            Err(e) => {
                tracing::warn!("Server search failed: {}", e);
                Err(e)
            }
        }
    }

    /// Reset everything back to `Idle`
    pub fn clear(&self) {
        self.state.write().reset("");
        tracing::debug!("Lookup session cleared");
    }

    /// Select a server and resolve its credentials.
    ///
    /// Returns `Ok(None)` when the resolution was superseded by a newer
    /// search, clear or selection before it completed.
    pub async fn select(&self, server: ServerRecord) -> AppResult<Option<ResolvedCredentialSet>> {
        let (epoch, sid) = {
            let mut state = self.state.write();
            state.drop_selection();
            state.selected_server = Some(server.clone());
            state.phase = LookupPhase::ServerSelected;
            (state.selection_epoch, active_sid(&state.sid, &server))
        };
        tracing::info!("Selected server {} ({})", server.hostname, server.ip);

        let result = self
            .resolver
            .resolve_with_users(&server.hostname, &sid, &self.roles)
            .await;

        let mut state = self.state.write();
        let current = state.selection_epoch == epoch
            && state
                .selected_server
                .as_ref()
                .is_some_and(|s| s.hostname == server.hostname);
        if !current {
            tracing::debug!("Discarding stale resolution for {}", server.hostname);
            return Ok(None);
        }

        let resolution = result?;
        state.host_users = resolution.users;
        state.credentials = Some(resolution.credentials.clone());
        state.phase = LookupPhase::CredentialsResolved;
        Ok(Some(resolution.credentials))
    }

    /// Apply an operator action to the resolved credentials
    pub fn apply(&self, action: ConsoleAction) -> AppResult<ResolvedCredentialSet> {
        let mut state = self.state.write();
        state.require_resolved()?;

        match action {
            ConsoleAction::LoginRoleSelected { role, username } => {
                let credential = state
                    .host_users
                    .iter()
                    .find(|u| u.username == username)
                    .map(Credential::from);
                tracing::debug!("Role {} set to {:?}", role, username);
                let credentials = state.credentials.get_or_insert_with(Default::default);
                credentials.assign(role, credential);
                Ok(credentials.clone())
            }
        }
    }

    /// Loaded servers whose hostname contains `filter` (case-insensitive)
    pub fn displayed_servers(&self, filter: &str) -> Vec<ServerRecord> {
        filter_servers(&self.state.read().servers, filter)
    }

    pub fn phase(&self) -> LookupPhase {
        self.state.read().phase
    }

    pub fn sid(&self) -> String {
        self.state.read().sid.clone()
    }

    pub fn selected_server(&self) -> Option<ServerRecord> {
        self.state.read().selected_server.clone()
    }

    pub fn credentials(&self) -> Option<ResolvedCredentialSet> {
        self.state.read().credentials.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            phase: state.phase,
            sid: state.sid.clone(),
            servers: state.servers.clone(),
            selected_server: state.selected_server.clone(),
            usernames: state.host_users.iter().map(|u| u.username.clone()).collect(),
            credentials: state.credentials.clone(),
        }
    }

    /// Launch a session against the selected server
    pub async fn launch(&self, role: LoginRole, options: &LaunchOptions) -> AppResult<()> {
        let request = {
            let state = self.state.read();
            let (server, credentials) = state.require_resolved()?;
            build_launch_request(server, credentials, role, options, &self.roles)?
        };
        self.launcher.launch(&request).await
    }

    /// One-click launch from the server list: resolve `server` and launch
    /// without touching the current selection.
    pub async fn launch_server(
        &self,
        server: &ServerRecord,
        role: LoginRole,
        options: &LaunchOptions,
    ) -> AppResult<()> {
        let sid = active_sid(&self.state.read().sid, server);
        let credentials = self
            .resolver
            .resolve(&server.hostname, &sid, &self.roles)
            .await?;
        let request = build_launch_request(server, &credentials, role, options, &self.roles)?;
        self.launcher.launch(&request).await
    }
}

/// The searched SID drives the OC templates; a blank search falls back to the server's own SID
fn active_sid(searched: &str, server: &ServerRecord) -> String {
    if searched.is_empty() {
        server.sid.clone()
    } else {
        searched.to_string()
    }
}

pub fn filter_servers(servers: &[ServerRecord], filter: &str) -> Vec<ServerRecord> {
    let needle = filter.to_lowercase();
    servers
        .iter()
        .filter(|s| needle.is_empty() || s.hostname.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Assemble the launch request for `role` from a resolved credential set
pub fn build_launch_request(
    server: &ServerRecord,
    credentials: &ResolvedCredentialSet,
    role: LoginRole,
    options: &LaunchOptions,
    roles: &RoleConfig,
) -> AppResult<LaunchRequest> {
    let creds = credentials.credential_for(role)?;

    let oc = if options.oc && role != LoginRole::Win && !roles.default_login_oc_url.is_empty() {
        credentials.oc.clone().map(|credential| OcLogin {
            url: roles.default_login_oc_url.clone(),
            credential,
        })
    } else {
        None
    };

    Ok(LaunchRequest {
        ip: server.ip.clone(),
        role,
        primary: creds.primary,
        secondary: creds.secondary,
        display: Some(DisplayHints {
            bg_color: options.bg_color.clone(),
            title: Some(format!("{} ({})", server.hostname, server.sid)),
        }),
        oc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    /// Records requests; optionally refuses them
    #[derive(Default)]
    struct RecordingLauncher {
        requests: Mutex<Vec<LaunchRequest>>,
        reject: bool,
    }

    #[async_trait]
    impl SessionLauncher for RecordingLauncher {
        async fn launch(&self, request: &LaunchRequest) -> AppResult<()> {
            self.requests.lock().push(request.clone());
            if self.reject {
                return Err(AppError::LaunchRejected("terminal not installed".to_string()));
            }
            Ok(())
        }
    }

    /// Holds `query_servers` for one SID or `query_users` for one host until
    /// released, to model a slow directory
    struct GatedDirectory {
        inner: MemoryDirectory,
        gate: &'static str,
        entered: Notify,
        release: Notify,
    }

    impl GatedDirectory {
        fn new(gate: &'static str) -> Self {
            Self {
                inner: directory(),
                gate,
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl DirectoryApi for GatedDirectory {
        async fn query_servers(&self, sid: &str) -> AppResult<Vec<ServerRecord>> {
            if sid == self.gate {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.query_servers(sid).await
        }
        async fn query_servers_by_hostname(&self, hostname: &str) -> AppResult<Vec<ServerRecord>> {
            self.inner.query_servers_by_hostname(hostname).await
        }
        async fn query_users(&self, hostname: &str) -> AppResult<Vec<UserRecord>> {
            if hostname == self.gate {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.query_users(hostname).await
        }
        async fn query_user_by_id(&self, id: &str) -> AppResult<Vec<UserRecord>> {
            self.inner.query_user_by_id(id).await
        }
        async fn upsert_server(&self, record: &ServerRecord) -> AppResult<()> {
            self.inner.upsert_server(record).await
        }
        async fn upsert_user(&self, record: &UserRecord) -> AppResult<()> {
            self.inner.upsert_user(record).await
        }
    }

    fn roles() -> RoleConfig {
        RoleConfig {
            default_login_user: "operator".to_string(),
            default_login_su: "root".to_string(),
            default_login_win: "Administrator".to_string(),
            default_login_oc_user_template: "oc-[sid]".to_string(),
            default_login_oc_id_template: "oc-id-[sid]".to_string(),
            default_login_oc_url: "https://oc.example:6443".to_string(),
        }
    }

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new(
            vec![
                ServerRecord::new("AB1234", "10.0.0.5", "web01"),
                ServerRecord::new("AB1234", "10.0.0.6", "db01").with_memo("primary"),
                ServerRecord::new("XY5678", "10.0.1.5", "app01"),
            ],
            vec![
                UserRecord::new("AB1234", "web01", "operator", "op-pw"),
                UserRecord::new("AB1234", "web01", "root", "root-pw"),
                UserRecord::new("AB1234", "web01", "deploy", "deploy-pw"),
                UserRecord::new("AB1234", "db01", "Administrator", "win-pw"),
                UserRecord::new("AB1234", "", "oc", "oc-pw").with_id("oc-id-123"),
            ],
        )
    }

    fn session() -> (LookupSession, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::default());
        let session = LookupSession::new(Arc::new(directory()), launcher.clone(), roles());
        (session, launcher)
    }

    #[tokio::test]
    async fn test_search_loads_servers() {
        let (session, _) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(session.phase(), LookupPhase::ServersLoaded);
        assert_eq!(session.sid(), "AB1234");
        assert!(session.selected_server().is_none());
    }

    #[tokio::test]
    async fn test_search_without_match_stays_idle() {
        let (session, _) = session();
        let servers = session.search("ZZ0000").await.unwrap().unwrap();
        assert!(servers.is_empty());
        assert_eq!(session.phase(), LookupPhase::Idle);
        assert!(session.selected_server().is_none());
        assert!(session.credentials().is_none());
    }

    #[tokio::test]
    async fn test_search_failure_surfaces_error() {
        let directory = Arc::new(directory());
        let session = LookupSession::new(
            directory.clone(),
            Arc::new(RecordingLauncher::default()),
            roles(),
        );
        session.search("AB1234").await.unwrap();

        directory.set_available(false);
        let err = session.search("AB1234").await.unwrap_err();
        assert!(matches!(err, AppError::DirectoryUnavailable(_)));
        assert_eq!(session.phase(), LookupPhase::Idle);
        assert!(session.displayed_servers("").is_empty());
    }

    #[tokio::test]
    async fn test_select_resolves_credentials() {
        let (session, _) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();

        let credentials = session.select(servers[0].clone()).await.unwrap().unwrap();
        assert_eq!(credentials.default, Some(Credential::new("operator", "op-pw")));
        assert_eq!(credentials.su, Some(Credential::new("root", "root-pw")));
        assert!(credentials.win.is_none());
        assert_eq!(credentials.oc, Some(Credential::new("oc-123", "oc-pw")));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, LookupPhase::CredentialsResolved);
        assert_eq!(snapshot.usernames, vec!["operator", "root", "deploy"]);
        assert_eq!(snapshot.selected_server.unwrap().hostname, "web01");
    }

    #[tokio::test]
    async fn test_new_search_discards_selection() {
        let (session, _) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        session.select(servers[0].clone()).await.unwrap();

        session.search("XY5678").await.unwrap();
        assert_eq!(session.phase(), LookupPhase::ServersLoaded);
        assert!(session.selected_server().is_none());
        assert!(session.credentials().is_none());
        assert!(session.snapshot().usernames.is_empty());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let (session, _) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        session.select(servers[1].clone()).await.unwrap();

        session.clear();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, LookupPhase::Idle);
        assert_eq!(snapshot.sid, "");
        assert!(snapshot.servers.is_empty());
        assert!(snapshot.selected_server.is_none());
        assert!(snapshot.credentials.is_none());
    }

    #[tokio::test]
    async fn test_late_resolution_does_not_overwrite_new_search() {
        let directory = Arc::new(GatedDirectory::new("web01"));
        let session = LookupSession::new(
            directory.clone(),
            Arc::new(RecordingLauncher::default()),
            roles(),
        );
        let servers = session.search("AB1234").await.unwrap().unwrap();

        let pending = session.select(servers[0].clone());
        let interrupt = async {
            directory.entered.notified().await;
            session.search("XY5678").await.unwrap();
            directory.release.notify_one();
        };
        let (stale, _) = tokio::join!(pending, interrupt);

        assert!(stale.unwrap().is_none());
        assert_eq!(session.sid(), "XY5678");
        assert_eq!(session.phase(), LookupPhase::ServersLoaded);
        assert!(session.selected_server().is_none());
        assert!(session.credentials().is_none());
    }

    #[tokio::test]
    async fn test_superseded_search_returns_nothing() {
        let directory = Arc::new(GatedDirectory::new("AB1234"));
        let session = LookupSession::new(
            directory.clone(),
            Arc::new(RecordingLauncher::default()),
            roles(),
        );

        let first = session.search("AB1234");
        let second = async {
            directory.entered.notified().await;
            let found = session.search("XY5678").await;
            directory.release.notify_one();
            found
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.unwrap().is_none());
        assert_eq!(second.unwrap().unwrap().len(), 1);
        assert_eq!(session.sid(), "XY5678");
        let shown = session.displayed_servers("");
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].hostname, "app01");
    }

    #[tokio::test]
    async fn test_late_resolution_does_not_overwrite_newer_selection() {
        let directory = Arc::new(GatedDirectory::new("web01"));
        let session = LookupSession::new(
            directory.clone(),
            Arc::new(RecordingLauncher::default()),
            roles(),
        );
        let servers = session.search("AB1234").await.unwrap().unwrap();

        let first = session.select(servers[0].clone());
        let second = async {
            directory.entered.notified().await;
            let resolved = session.select(servers[1].clone()).await;
            directory.release.notify_one();
            resolved
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.unwrap().is_none());
        let second = second.unwrap().unwrap();
        assert_eq!(second.win, Some(Credential::new("Administrator", "win-pw")));
        assert_eq!(session.selected_server().unwrap().hostname, "db01");
        assert_eq!(session.credentials().unwrap(), second);
    }

    #[tokio::test]
    async fn test_apply_role_selection() {
        let (session, _) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        session.select(servers[0].clone()).await.unwrap();

        let updated = session
            .apply(ConsoleAction::LoginRoleSelected {
                role: LoginRole::Default,
                username: "deploy".to_string(),
            })
            .unwrap();
        assert_eq!(updated.default, Some(Credential::new("deploy", "deploy-pw")));
        assert_eq!(updated.su, Some(Credential::new("root", "root-pw")));

        let cleared = session
            .apply(ConsoleAction::LoginRoleSelected {
                role: LoginRole::Default,
                username: "nobody".to_string(),
            })
            .unwrap();
        assert!(cleared.default.is_none());
        assert!(cleared.su.is_none());
    }

    #[test]
    fn test_apply_requires_resolved_credentials() {
        let (session, _) = session();
        let err = session
            .apply(ConsoleAction::LoginRoleSelected {
                role: LoginRole::Win,
                username: "Administrator".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::NoServerSelected));
    }

    #[test]
    fn test_console_action_wire_format() {
        let action: ConsoleAction = serde_json::from_str(
            r#"{"kind":"loginRoleSelected","role":"su","username":"root"}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            ConsoleAction::LoginRoleSelected {
                role: LoginRole::Su,
                username: "root".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_displayed_servers_filter() {
        let (session, _) = session();
        session.search("").await.unwrap();
        let shown = session.displayed_servers("DB");
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].hostname, "db01");
        assert_eq!(session.displayed_servers("").len(), 3);
    }

    #[tokio::test]
    async fn test_launch_su_sends_both_credentials() {
        let (session, launcher) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        session.select(servers[0].clone()).await.unwrap();

        let options = LaunchOptions {
            oc: true,
            bg_color: Some("10,20,30".to_string()),
        };
        session.launch(LoginRole::Su, &options).await.unwrap();

        let requests = launcher.requests.lock();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.ip, "10.0.0.5");
        assert_eq!(request.role, LoginRole::Su);
        assert_eq!(request.primary, Credential::new("operator", "op-pw"));
        assert_eq!(request.secondary, Some(Credential::new("root", "root-pw")));
        assert_eq!(request.oc.as_ref().unwrap().credential.username, "oc-123");
        let display = request.display.as_ref().unwrap();
        assert_eq!(display.bg_color.as_deref(), Some("10,20,30"));
        assert_eq!(display.title.as_deref(), Some("web01 (AB1234)"));
    }

    #[tokio::test]
    async fn test_launch_missing_role_is_not_submitted() {
        let (session, launcher) = session();
        let servers = session.search("AB1234").await.unwrap().unwrap();
        session.select(servers[0].clone()).await.unwrap();

        let err = session
            .launch(LoginRole::Win, &LaunchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotConfigured(LoginRole::Win)));
        assert!(launcher.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_launch_without_selection() {
        let (session, _) = session();
        let err = session
            .launch(LoginRole::Default, &LaunchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoServerSelected));
    }

    #[tokio::test]
    async fn test_launch_after_failed_resolution() {
        let directory = Arc::new(directory());
        let launcher = Arc::new(RecordingLauncher::default());
        let session = LookupSession::new(directory.clone(), launcher.clone(), roles());
        let servers = session.search("AB1234").await.unwrap().unwrap();

        directory.set_available(false);
        let err = session.select(servers[0].clone()).await.unwrap_err();
        assert!(matches!(err, AppError::DirectoryUnavailable(_)));
        assert_eq!(session.phase(), LookupPhase::ServerSelected);

        let err = session
            .launch(LoginRole::Default, &LaunchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CredentialsNotResolved));
        assert!(launcher.requests.lock().is_empty());

        let err = session
            .apply(ConsoleAction::LoginRoleSelected {
                role: LoginRole::Default,
                username: "operator".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::CredentialsNotResolved));
    }

    #[tokio::test]
    async fn test_launch_while_resolution_pending() {
        let directory = Arc::new(GatedDirectory::new("web01"));
        let launcher = Arc::new(RecordingLauncher::default());
        let session = LookupSession::new(directory.clone(), launcher.clone(), roles());
        let servers = session.search("AB1234").await.unwrap().unwrap();

        let pending = session.select(servers[0].clone());
        let early_launch = async {
            directory.entered.notified().await;
            let launched = session
                .launch(LoginRole::Default, &LaunchOptions::default())
                .await;
            directory.release.notify_one();
            launched
        };
        let (resolved, launched) = tokio::join!(pending, early_launch);

        assert!(matches!(launched, Err(AppError::CredentialsNotResolved)));
        assert!(resolved.unwrap().is_some());
        assert!(launcher.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_launch_rejection_is_surfaced_and_not_retried() {
        let launcher = Arc::new(RecordingLauncher {
            reject: true,
            ..Default::default()
        });
        let session = LookupSession::new(Arc::new(directory()), launcher.clone(), roles());
        let servers = session.search("AB1234").await.unwrap().unwrap();

        let err = session
            .launch_server(&servers[1], LoginRole::Win, &LaunchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LaunchRejected(ref msg) if msg == "terminal not installed"));
        assert_eq!(launcher.requests.lock().len(), 1);
        // One-click launch leaves the selection alone
        assert!(session.selected_server().is_none());
        assert_eq!(session.phase(), LookupPhase::ServersLoaded);
    }

    #[test]
    fn test_build_request_skips_oc_for_rdp() {
        let server = ServerRecord::new("AB1234", "10.0.0.6", "db01");
        let credentials = ResolvedCredentialSet {
            win: Some(Credential::new("Administrator", "pw")),
            oc: Some(Credential::new("oc-123", "oc-pw")),
            ..Default::default()
        };
        let options = LaunchOptions {
            oc: true,
            bg_color: None,
        };
        let request =
            build_launch_request(&server, &credentials, LoginRole::Win, &options, &roles()).unwrap();
        assert!(request.oc.is_none());
        assert!(request.secondary.is_none());
    }
}
