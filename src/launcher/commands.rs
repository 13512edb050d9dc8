use super::LaunchOptions;
use crate::credentials::LoginRole;
use crate::directory::ServerRecord;
use crate::error::AppResult;
use crate::state::AppState;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, State};

/// Event carrying user-facing launch notices
pub const LAUNCH_EVENT: &str = "launch_event";

fn notify_launched(app_handle: &AppHandle, role: LoginRole, target: &str) {
    let message = format!("{} login to {} completed", role, target);
    if let Err(e) = app_handle.emit(LAUNCH_EVENT, message) {
        tracing::warn!("Failed to emit launch event: {}", e);
    }
}

/// Launch against the selected server
#[tauri::command]
pub async fn launch_session(
    app_handle: AppHandle,
    state: State<'_, Arc<AppState>>,
    role: LoginRole,
    options: Option<LaunchOptions>,
) -> AppResult<()> {
    let options = options.unwrap_or_default();
    let target = state
        .session
        .selected_server()
        .map(|s| s.hostname)
        .unwrap_or_default();
    state.session.launch(role, &options).await?;
    notify_launched(&app_handle, role, &target);
    Ok(())
}

/// One-click launch from the server list
#[tauri::command]
pub async fn launch_server(
    app_handle: AppHandle,
    state: State<'_, Arc<AppState>>,
    server: ServerRecord,
    role: LoginRole,
    options: Option<LaunchOptions>,
) -> AppResult<()> {
    let options = options.unwrap_or_default();
    state.session.launch_server(&server, role, &options).await?;
    notify_launched(&app_handle, role, &server.hostname);
    Ok(())
}
