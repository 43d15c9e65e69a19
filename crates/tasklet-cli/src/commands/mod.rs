pub mod add;
pub mod auth;
pub mod config;
pub mod delete;
pub mod list;
pub mod toggle;

pub use add::run as add;
pub use config::run as config;
pub use delete::run as delete;
pub use list::run as list;
pub use toggle::run as toggle;

use anyhow::{Context, Result};
use tasklet_core::{
    AppWrapper, Config, RemoteApp, Screen, SessionStore, SyncConfig, TaskApp, TaskProvider,
    TaskletError,
};

/// Resolve the sync settings and build the flow controller for them.
pub fn load_wrapper(config: &Config) -> Result<AppWrapper<RemoteApp>> {
    let sync = SyncConfig::install(config.sync_config()?);
    let wrapper = AppWrapper::new(sync, || {
        let session_path =
            Config::session_path().map_err(|e| TaskletError::Config(e.to_string()))?;
        Ok(RemoteApp::from_sync_config(sync)?.with_session_store(SessionStore::new(session_path)))
    })?;
    Ok(wrapper)
}

/// Open the task store for a one-shot command.
///
/// With sync enabled this needs a signed-in user; an anonymous login is
/// attempted first when the app allows it.
pub async fn open_task_app(config: &Config) -> Result<TaskApp> {
    let mut wrapper = load_wrapper(config)?;
    wrapper.ensure_anonymous_login().await;

    let Screen::Tasks(props) = wrapper.screen() else {
        anyhow::bail!("Not logged in. Run `tasklet login` or `tasklet register` first.");
    };

    let db_path = config.local_db_path()?;
    let provider = TaskProvider::open(&db_path, wrapper.sync_binding())
        .await
        .with_context(|| format!("Failed to open task store: {}", db_path.display()))?;

    Ok(TaskApp::new(provider, props))
}
