use super::{ConsoleAction, SessionSnapshot};
use crate::credentials::ResolvedCredentialSet;
use crate::directory::ServerRecord;
use crate::error::AppResult;
use crate::state::AppState;
use std::sync::Arc;
use tauri::State;

/// `None` when a newer search superseded this one
#[tauri::command]
pub async fn search_servers(
    state: State<'_, Arc<AppState>>,
    sid: String,
) -> AppResult<Option<Vec<ServerRecord>>> {
    state.session.search(&sid).await
}

#[tauri::command]
pub async fn clear_lookup(state: State<'_, Arc<AppState>>) -> AppResult<()> {
    state.session.clear();
    Ok(())
}

#[tauri::command]
pub async fn select_server(
    state: State<'_, Arc<AppState>>,
    server: ServerRecord,
) -> AppResult<Option<ResolvedCredentialSet>> {
    state.session.select(server).await
}

#[tauri::command]
pub async fn apply_console_action(
    state: State<'_, Arc<AppState>>,
    action: ConsoleAction,
) -> AppResult<ResolvedCredentialSet> {
    state.session.apply(action)
}

#[tauri::command]
pub async fn displayed_servers(
    state: State<'_, Arc<AppState>>,
    filter: String,
) -> AppResult<Vec<ServerRecord>> {
    Ok(state.session.displayed_servers(&filter))
}

#[tauri::command]
pub async fn get_lookup_snapshot(state: State<'_, Arc<AppState>>) -> AppResult<SessionSnapshot> {
    Ok(state.session.snapshot())
}
