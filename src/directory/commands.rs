//! Directory maintenance commands (server/user data screens)

use super::{DirectoryApi, ServerRecord, UserRecord};
use crate::error::AppResult;
use crate::state::AppState;
use std::sync::Arc;
use tauri::State;

#[tauri::command]
pub async fn find_server(
    state: State<'_, Arc<AppState>>,
    hostname: String,
) -> AppResult<Option<ServerRecord>> {
    let servers = state.directory.query_servers_by_hostname(&hostname).await?;
    Ok(servers.into_iter().next())
}

#[tauri::command]
pub async fn find_user(
    state: State<'_, Arc<AppState>>,
    sid: String,
    username: String,
    hostname: String,
) -> AppResult<Option<UserRecord>> {
    state.directory.find_user(&sid, &username, &hostname).await
}

#[tauri::command]
pub async fn save_server(state: State<'_, Arc<AppState>>, record: ServerRecord) -> AppResult<()> {
    state.directory.upsert_server(&record).await
}

#[tauri::command]
pub async fn save_user(state: State<'_, Arc<AppState>>, record: UserRecord) -> AppResult<()> {
    super::save_user(state.directory.as_ref(), record).await
}
