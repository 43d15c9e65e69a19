//! Local SQLite database for offline-first storage.
//!
//! This module provides `LocalDb`, a partition-scoped handle over a SQLite
//! connection pool, and `WriteTxn`, the only way to mutate tasks. Every
//! committed write transaction bumps a revision counter that live queries
//! watch.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use super::live::{LiveQuery, Sort};
use crate::models::Task;
use crate::{Result, TaskletError};

/// Partition used when sync is disabled.
pub const LOCAL_PARTITION: &str = "";

const TASK_COLUMNS: &str = "id, description, is_complete, created_at, user_id";

/// Helper struct for mapping task rows from SQLite.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    description: String,
    is_complete: i32,
    created_at: String,
    user_id: Option<String>,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskletError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: Uuid::parse_str(&row.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            description: row.description,
            is_complete: row.is_complete != 0,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            user_id: row.user_id,
        })
    }
}

/// Fixed-width timestamps so that text ordering matches time ordering.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Local SQLite database for offline-first storage.
///
/// Cloning is cheap; clones share the pool and the revision counter.
#[derive(Clone)]
pub struct LocalDb {
    pool: SqlitePool,
    partition: String,
    revision: Arc<watch::Sender<u64>>,
}

impl LocalDb {
    /// Create an in-memory database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            // The database lives only as long as its single connection
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Create a file-based database at the specified path.
    pub async fn new(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            pool,
            partition: LOCAL_PARTITION.to_string(),
            revision: Arc::new(revision),
        }
    }

    /// Run database migrations to create tables and indexes.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                partition TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL,
                is_complete INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                user_id TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_tasks_partition_created_at ON tasks(partition, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A handle over the same database scoped to another partition.
    pub fn with_partition(&self, partition: impl Into<String>) -> Self {
        Self {
            pool: self.pool.clone(),
            partition: partition.into(),
            revision: Arc::clone(&self.revision),
        }
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Current commit revision.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Close the pool. Other clones of this handle stop working as well.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Begin a write transaction.
    pub async fn write(&self) -> Result<WriteTxn> {
        let tx = self.pool.begin().await?;
        Ok(WriteTxn {
            tx,
            partition: self.partition.clone(),
            revision: Arc::clone(&self.revision),
            changes: 0,
        })
    }

    /// A live, auto-updating view of every task in this partition.
    pub fn query(&self, sort: Sort) -> LiveQuery {
        LiveQuery::new(self.clone(), sort)
    }

    // ==================== Task Reads ====================

    /// Get a task by its ID.
    pub async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND partition = ?2"
        ))
        .bind(id.to_string())
        .bind(&self.partition)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// List all tasks in this partition in the given order.
    pub async fn list_tasks(&self, sort: Sort) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE partition = ?1 ORDER BY {}",
            sort.order_by()
        ))
        .bind(&self.partition)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    pub async fn count_tasks(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE partition = ?1")
            .bind(&self.partition)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Resolve a full UUID or a unique prefix of one.
    pub async fn find_task(&self, id_or_prefix: &str) -> Result<Task> {
        let needle = id_or_prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Err(TaskletError::InvalidInput("Task id cannot be empty".to_string()));
        }

        if let Ok(id) = Uuid::parse_str(&needle) {
            return self
                .get_task(id)
                .await?
                .ok_or_else(|| TaskletError::NotFound(format!("task {}", id)));
        }

        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE partition = ?1 AND id LIKE ?2 || '%' LIMIT 2"
        ))
        .bind(&self.partition)
        .bind(&needle)
        .fetch_all(&self.pool)
        .await?;

        let mut rows = rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => row.try_into(),
            (None, _) => Err(TaskletError::NotFound(format!("task {}", needle))),
            (Some(_), Some(_)) => Err(TaskletError::InvalidInput(format!(
                "Task id prefix '{}' is ambiguous",
                needle
            ))),
        }
    }
}

/// An open write transaction.
///
/// Dropping it without calling [`WriteTxn::commit`] rolls every statement
/// back.
pub struct WriteTxn {
    tx: Transaction<'static, Sqlite>,
    partition: String,
    revision: Arc<watch::Sender<u64>>,
    changes: usize,
}

impl WriteTxn {
    /// Insert a new task.
    pub async fn create(&mut self, task: &Task) -> Result<()> {
        if task.description.is_empty() {
            return Err(TaskletError::InvalidInput(
                "Task description cannot be empty".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO tasks (id, partition, description, is_complete, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(task.id.to_string())
        .bind(&self.partition)
        .bind(&task.description)
        .bind(if task.is_complete { 1 } else { 0 })
        .bind(encode_timestamp(&task.created_at))
        .bind(&task.user_id)
        .execute(&mut *self.tx)
        .await?;

        self.changes += 1;
        Ok(())
    }

    /// Read a task as seen from inside this transaction.
    pub async fn get(&mut self, id: Uuid) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND partition = ?2"
        ))
        .bind(id.to_string())
        .bind(&self.partition)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Overwrite the mutable fields of an existing task.
    pub async fn update(&mut self, task: &Task) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tasks SET description = ?1, is_complete = ?2 WHERE id = ?3 AND partition = ?4",
        )
        .bind(&task.description)
        .bind(if task.is_complete { 1 } else { 0 })
        .bind(task.id.to_string())
        .bind(&self.partition)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskletError::NotFound(format!("task {}", task.id)));
        }

        self.changes += 1;
        Ok(())
    }

    /// Delete a task by its ID.
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND partition = ?2")
            .bind(id.to_string())
            .bind(&self.partition)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskletError::NotFound(format!("task {}", id)));
        }

        self.changes += 1;
        Ok(())
    }

    /// Commit and notify live queries if anything changed.
    pub async fn commit(self) -> Result<()> {
        let changes = self.changes;
        self.tx.commit().await?;

        if changes > 0 {
            self.revision.send_modify(|rev| *rev += 1);
            debug!(changes, revision = *self.revision.borrow(), "write transaction committed");
        }

        Ok(())
    }

    /// Discard every statement in this transaction.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
