//! Operator console core: directory lookup and login credential resolution.
//!
//! Looks up servers by SID in a remote directory, resolves the accounts to use
//! for each login role and hands the result to a session launcher. With the
//! `desktop` feature the operations are exposed as Tauri commands.

pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod lookup;
pub mod state;

#[cfg(feature = "desktop")]
pub use desktop::create_app;

#[cfg(feature = "desktop")]
mod desktop {
    use crate::state::AppState;
    use crate::{config, directory, launcher, lookup};
    use std::sync::Arc;
    use tauri::Manager;

    /// Create and configure the Tauri application
    pub fn create_app() -> tauri::Builder<tauri::Wry> {
        crate::logging::init_tracing();

        tauri::Builder::default()
            .setup(|app| {
                let state = AppState::load()
                    .map_err(|e| anyhow::anyhow!("Failed to load console config: {}", e))?;
                tracing::info!("Using directory at {}", state.config.server_data_api);
                app.manage(Arc::new(state));
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                // Config
                config::commands::get_config,
                // Lookup flow
                lookup::commands::search_servers,
                lookup::commands::clear_lookup,
                lookup::commands::select_server,
                lookup::commands::apply_console_action,
                lookup::commands::displayed_servers,
                lookup::commands::get_lookup_snapshot,
                // Launch
                launcher::commands::launch_session,
                launcher::commands::launch_server,
                // Directory maintenance
                directory::commands::find_server,
                directory::commands::find_user,
                directory::commands::save_server,
                directory::commands::save_user,
            ])
    }
}
