//! Live queries.
//!
//! A [`LiveQuery`] caches the result of a sorted query and re-runs it only
//! after another write transaction has committed on the same database, so
//! every holder sees a toggled or deleted task on its next read without
//! re-querying by hand.

use std::ops::Deref;

use tokio::sync::watch;

use super::local::LocalDb;
use crate::models::Task;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Description,
    IsComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub reverse: bool,
}

impl Sort {
    pub fn ascending(field: SortField) -> Self {
        Self { field, reverse: false }
    }

    pub fn descending(field: SortField) -> Self {
        Self { field, reverse: true }
    }

    /// ORDER BY clause; rowid breaks ties in insertion order.
    pub(crate) fn order_by(&self) -> &'static str {
        match (self.field, self.reverse) {
            (SortField::CreatedAt, false) => "created_at ASC, rowid ASC",
            (SortField::CreatedAt, true) => "created_at DESC, rowid DESC",
            (SortField::Description, false) => "description COLLATE NOCASE ASC, rowid ASC",
            (SortField::Description, true) => "description COLLATE NOCASE DESC, rowid DESC",
            (SortField::IsComplete, false) => "is_complete ASC, created_at ASC, rowid ASC",
            (SortField::IsComplete, true) => "is_complete DESC, created_at ASC, rowid ASC",
        }
    }
}

/// A snapshot of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    tasks: Vec<Task>,
}

impl Deref for Results {
    type Target = [Task];

    fn deref(&self) -> &Self::Target {
        &self.tasks
    }
}

/// Auto-updating, sorted view over every task in a partition.
pub struct LiveQuery {
    db: LocalDb,
    sort: Sort,
    rx: watch::Receiver<u64>,
    results: Results,
    seen: Option<u64>,
}

impl LiveQuery {
    pub(crate) fn new(db: LocalDb, sort: Sort) -> Self {
        let rx = db.subscribe();
        Self {
            db,
            sort,
            rx,
            results: Results::default(),
            seen: None,
        }
    }

    /// Re-sort this query; the next read re-runs it.
    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self.seen = None;
        self
    }

    /// True when a commit happened since the last read.
    pub fn is_stale(&self) -> bool {
        self.seen != Some(*self.rx.borrow())
    }

    /// Current results, refreshed first if anything was committed.
    pub async fn results(&mut self) -> Result<&Results> {
        let revision = *self.rx.borrow_and_update();
        if self.seen != Some(revision) {
            self.results = Results {
                tasks: self.db.list_tasks(self.sort).await?,
            };
            self.seen = Some(revision);
        }
        Ok(&self.results)
    }

    /// Last results read, without touching the database.
    pub fn cached(&self) -> &Results {
        &self.results
    }
}
