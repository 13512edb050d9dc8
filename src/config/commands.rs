use super::ConsoleConfig;
use crate::error::AppResult;
use crate::state::AppState;
use std::sync::Arc;
use tauri::State;

/// Read-only configuration snapshot for the frontend
#[tauri::command]
pub async fn get_config(state: State<'_, Arc<AppState>>) -> AppResult<ConsoleConfig> {
    Ok(state.config.as_ref().clone())
}
