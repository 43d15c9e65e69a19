//! Root task view.
//!
//! `TaskApp` owns a mounted [`TaskProvider`] and a live query over it, and
//! turns the three user intents (add, toggle, delete) into single write
//! transactions.

use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{LiveQuery, Results};
use crate::models::Task;
use crate::provider::TaskProvider;
use crate::{Result, TaskletError};

/// What the task screen needs to know about the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppProps {
    SyncDisabled,
    SyncEnabled {
        /// Offer a "Login" control (anonymous user, anonymous auth enabled).
        show_login: bool,
        /// Offer a "Logout" control (credentialed user).
        show_logout: bool,
        current_user_id: String,
        current_user_name: String,
    },
}

impl AppProps {
    pub fn sync_enabled(&self) -> bool {
        matches!(self, AppProps::SyncEnabled { .. })
    }

    pub fn current_user_id(&self) -> Option<&str> {
        match self {
            AppProps::SyncEnabled {
                current_user_id, ..
            } => Some(current_user_id),
            AppProps::SyncDisabled => None,
        }
    }

    pub fn current_user_name(&self) -> Option<&str> {
        match self {
            AppProps::SyncEnabled {
                current_user_name, ..
            } if !current_user_name.is_empty() => Some(current_user_name),
            _ => None,
        }
    }

    pub fn show_login(&self) -> bool {
        matches!(self, AppProps::SyncEnabled { show_login: true, .. })
    }

    pub fn show_logout(&self) -> bool {
        matches!(self, AppProps::SyncEnabled { show_logout: true, .. })
    }
}

pub struct TaskApp {
    provider: TaskProvider,
    props: AppProps,
    query: LiveQuery,
}

impl TaskApp {
    pub fn new(provider: TaskProvider, props: AppProps) -> Self {
        let query = provider.query();
        Self {
            provider,
            props,
            query,
        }
    }

    pub fn props(&self) -> &AppProps {
        &self.props
    }

    pub fn set_props(&mut self, props: AppProps) {
        self.props = props;
    }

    pub fn provider(&self) -> &TaskProvider {
        &self.provider
    }

    /// All tasks in creation order, refreshed after any commit.
    pub async fn tasks(&mut self) -> Result<&Results> {
        self.query.results().await
    }

    /// Tasks as of the last [`TaskApp::tasks`] call.
    pub fn cached_tasks(&self) -> &Results {
        self.query.cached()
    }

    pub fn is_stale(&self) -> bool {
        self.query.is_stale()
    }

    /// Add a task. An empty description is ignored; any other text is
    /// stored exactly as given.
    pub async fn add(&self, description: &str) -> Result<Option<Task>> {
        if description.is_empty() {
            debug!("ignoring empty task description");
            return Ok(None);
        }

        let owner = self.props.current_user_id().map(str::to_string);
        let task = Task::generate(owner, description);

        let mut txn = self.provider.store().write().await?;
        txn.create(&task).await?;
        txn.commit().await?;

        info!(task_id = %task.id, "added task");
        Ok(Some(task))
    }

    /// Flip a task's completion flag.
    pub async fn toggle(&self, id: Uuid) -> Result<Task> {
        let mut txn = self.provider.store().write().await?;
        let mut task = txn
            .get(id)
            .await?
            .ok_or_else(|| TaskletError::NotFound(format!("task {}", id)))?;
        task.toggle();
        txn.update(&task).await?;
        txn.commit().await?;

        debug!(task_id = %id, is_complete = task.is_complete, "toggled task");
        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut txn = self.provider.store().write().await?;
        txn.delete(id).await?;
        txn.commit().await?;

        info!(task_id = %id, "deleted task");
        Ok(())
    }
}
