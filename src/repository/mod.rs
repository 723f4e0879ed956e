//! Storage ports and their Postgres implementations
//!
//! The pipeline consumes storage through the `EntryStore` / `ReportStore` /
//! `ChildDirectory` traits so tests can substitute doubles; the concrete
//! repositories below back them with sqlx.

pub mod children;
pub mod entries;
pub mod reports;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{DailyReport, Entry, ReportQuery},
};

/// Entry persistence port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries for one child at one location with `occurred_at` in
    /// `[start, end)`.
    async fn query(
        &self,
        location_id: &str,
        child_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Entry>>;

    /// Persist one chunk atomically. Callers are responsible for keeping
    /// chunks under the store's per-transaction write ceiling.
    async fn batch_put(&self, entries: &[Entry]) -> AppResult<()>;
}

/// Daily report persistence port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<DailyReport>>;

    /// Idempotent merge-write keyed on the report's composite id. Stored
    /// `created_at` wins over the incoming value; visibility flags merge
    /// monotonically (stored OR incoming).
    async fn upsert_merge(&self, report: &DailyReport) -> AppResult<DailyReport>;

    /// Out-of-band send: flips `sent`/`visible_to_parents` true and stamps
    /// `sent_at`, bypassing recomputation.
    async fn mark_sent(&self, key: &str) -> AppResult<DailyReport>;

    async fn list(&self, query: &ReportQuery) -> AppResult<Vec<DailyReport>>;
}

/// Child directory lookup port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChildDirectory: Send + Sync {
    async fn resolve_name(&self, child_id: &str) -> AppResult<Option<String>>;

    /// Ids of active children in a class
    async fn ids_in_class(&self, class_id: &str) -> AppResult<Vec<String>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub entries: entries::EntriesRepository,
    pub reports: reports::ReportsRepository,
    pub children: children::ChildrenRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            entries: entries::EntriesRepository::new(pool.clone()),
            reports: reports::ReportsRepository::new(pool.clone()),
            children: children::ChildrenRepository::new(pool.clone()),
            pool,
        }
    }
}
