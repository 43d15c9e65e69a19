//! Task store provider.
//!
//! `TaskProvider` binds a [`LocalDb`] for the lifetime of the task screen.
//! Without sync it is the local partition; with sync it is the partition of
//! the signed-in user. Dropping the provider unmounts it.

use std::path::Path;

use tracing::info;

use crate::db::{LiveQuery, LocalDb, Sort, LOCAL_PARTITION};
use crate::models::User;
use crate::Result;

/// Sync parameters for a mounted store.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncBinding {
    pub user: User,
    pub partition_value: String,
}

impl SyncBinding {
    /// Bind to the user's own partition.
    pub fn for_user(user: User) -> Self {
        let partition_value = user.id.clone();
        Self {
            user,
            partition_value,
        }
    }
}

pub struct TaskProvider {
    db: LocalDb,
    sync: Option<SyncBinding>,
}

impl TaskProvider {
    /// Open the database file at `path` and mount it.
    pub async fn open(path: &Path, sync: Option<SyncBinding>) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = LocalDb::new(path).await?;
        db.run_migrations().await?;
        Ok(Self::mount(&db, sync))
    }

    /// Mount an already open database.
    pub fn mount(db: &LocalDb, sync: Option<SyncBinding>) -> Self {
        let partition = sync
            .as_ref()
            .map(|binding| binding.partition_value.as_str())
            .unwrap_or(LOCAL_PARTITION);

        info!(
            partition = if partition.is_empty() { "<local>" } else { partition },
            synced = sync.is_some(),
            "mounting task store"
        );

        Self {
            db: db.with_partition(partition),
            sync,
        }
    }

    /// The current database handle.
    pub fn store(&self) -> &LocalDb {
        &self.db
    }

    /// A live query over every task, in creation order.
    pub fn query(&self) -> LiveQuery {
        self.db.query(Sort::default())
    }

    pub fn sync_binding(&self) -> Option<&SyncBinding> {
        self.sync.as_ref()
    }

    pub fn partition(&self) -> &str {
        self.db.partition()
    }
}
