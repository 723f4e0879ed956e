//! Daily report aggregation service
//!
//! Recomputes a child's whole UTC calendar day of entries into one
//! `DailyReport`, upserted idempotently on the `"{childId}-{date}"` key.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;

use crate::{
    error::AppResult,
    models::{
        entry::AttendanceStatus, report_key, DailyReport, Entry, EntryData, EntryType,
        ReportOverrides, ReportQuery,
    },
    repository::{ChildDirectory, EntryStore, ReportStore},
};

/// Render the top-3 entry-type counts as `"{count} {type}"` joined by ", ".
/// Ties order alphabetically by type label so the summary is deterministic.
pub(crate) fn summarize(entries: &[Entry]) -> String {
    let mut counts: HashMap<EntryType, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.entry_type).or_default() += 1;
    }

    let mut groups: Vec<(EntryType, usize)> = counts.into_iter().collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    groups
        .iter()
        .take(3)
        .map(|(entry_type, count)| format!("{} {}", count, entry_type))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_checkout(entry: &Entry) -> bool {
    matches!(
        entry.data,
        EntryData::Attendance {
            status: AttendanceStatus::CheckOut
        }
    )
}

#[derive(Clone)]
pub struct ReportsService {
    entry_store: Arc<dyn EntryStore>,
    report_store: Arc<dyn ReportStore>,
    directory: Arc<dyn ChildDirectory>,
}

impl ReportsService {
    pub fn new(
        entry_store: Arc<dyn EntryStore>,
        report_store: Arc<dyn ReportStore>,
        directory: Arc<dyn ChildDirectory>,
    ) -> Self {
        Self {
            entry_store,
            report_store,
            directory,
        }
    }

    /// Recompute one child's day. Returns `None` and writes nothing when
    /// the day has no entries.
    ///
    /// Visibility flags are monotonic: the computed flags merge with the
    /// stored report's, so a later non-checkout trigger cannot hide an
    /// already-visible day.
    pub async fn upsert_daily_report(
        &self,
        location_id: &str,
        child_id: &str,
        date: NaiveDate,
        overrides: ReportOverrides,
        child_name: Option<String>,
    ) -> AppResult<Option<DailyReport>> {
        // UTC day window, start inclusive, end exclusive
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let entries = self
            .entry_store
            .query(location_id, child_id, start, end)
            .await?;
        if entries.is_empty() {
            return Ok(None);
        }

        let total_activities = entries.len() as i32;
        let activity_summary = summarize(&entries);

        let child_name = match child_name {
            Some(name) => Some(name),
            None => self.directory.resolve_name(child_id).await?,
        };

        let key = report_key(child_id, date);
        let existing = self.report_store.get(&key).await?;
        let now = Utc::now();

        let created_at = existing.as_ref().map(|r| r.created_at).unwrap_or(now);
        let prior_visible = existing.as_ref().map(|r| r.visible_to_parents).unwrap_or(false);
        let prior_sent = existing.as_ref().map(|r| r.sent).unwrap_or(false);
        let prior_sent_at = existing.as_ref().and_then(|r| r.sent_at);

        let visible_to_parents = overrides.visible_to_parents || prior_visible;
        let sent = overrides.sent || prior_sent;
        let sent_at = prior_sent_at.or(if sent { Some(now) } else { None });

        let daycare_id = entries[0].daycare_id.clone();
        let class_id = entries[0].class_id.clone();
        let report = DailyReport {
            id: key,
            daycare_id,
            location_id: location_id.to_string(),
            class_id,
            class_name: existing.as_ref().and_then(|r| r.class_name.clone()),
            child_id: child_id.to_string(),
            child_name,
            date,
            total_activities,
            activity_summary,
            entries,
            visible_to_parents,
            sent,
            sent_at,
            created_at,
            updated_at: now,
        };

        let saved = self.report_store.upsert_merge(&report).await?;
        tracing::info!(
            report_id = %saved.id,
            total = saved.total_activities,
            visible = saved.visible_to_parents,
            "daily report upserted"
        );
        Ok(Some(saved))
    }

    /// Aggregation trigger for a batch of freshly committed entries: one
    /// recomputation per distinct (child, UTC date) pair, not one per entry.
    /// The visibility override is forced only for buckets containing an
    /// Attendance check-out.
    pub async fn aggregate_created(&self, entries: &[Entry]) -> AppResult<()> {
        struct Bucket {
            location_id: String,
            overrides: ReportOverrides,
        }

        let mut buckets: IndexMap<(String, NaiveDate), Bucket> = IndexMap::new();
        for entry in entries {
            if entry.child_id.is_empty() || entry.location_id.is_empty() {
                continue;
            }
            let key = (entry.child_id.clone(), entry.occurred_at.date_naive());
            let bucket = buckets.entry(key).or_insert_with(|| Bucket {
                location_id: entry.location_id.clone(),
                overrides: ReportOverrides::default(),
            });
            if is_checkout(entry) {
                bucket.overrides = ReportOverrides::visible();
            }
        }

        for ((child_id, date), bucket) in buckets {
            self.upsert_daily_report(&bucket.location_id, &child_id, date, bucket.overrides, None)
                .await?;
        }
        Ok(())
    }

    /// Out-of-band send for an existing report, bypassing recomputation
    pub async fn mark_sent(&self, report_id: &str) -> AppResult<DailyReport> {
        let report = self.report_store.mark_sent(report_id).await?;
        tracing::info!(report_id = %report.id, "report marked sent");
        Ok(report)
    }

    pub async fn list(&self, query: &ReportQuery) -> AppResult<Vec<DailyReport>> {
        self.report_store.list(query).await
    }

    pub async fn get(&self, report_id: &str) -> AppResult<Option<DailyReport>> {
        self.report_store.get(report_id).await
    }
}
