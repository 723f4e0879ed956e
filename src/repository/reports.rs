//! Daily reports repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{DailyReport, Entry, ReportQuery},
};

use super::ReportStore;

#[derive(FromRow)]
struct ReportRow {
    id: String,
    daycare_id: String,
    location_id: String,
    class_id: Option<String>,
    class_name: Option<String>,
    child_id: String,
    child_name: Option<String>,
    report_date: NaiveDate,
    total_activities: i32,
    activity_summary: String,
    entries: Value,
    visible_to_parents: bool,
    sent: bool,
    sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for DailyReport {
    type Error = AppError;

    fn try_from(row: ReportRow) -> AppResult<DailyReport> {
        let entries: Vec<Entry> = serde_json::from_value(row.entries)
            .map_err(|e| AppError::Internal(format!("corrupt entries snapshot in report {}: {}", row.id, e)))?;
        Ok(DailyReport {
            id: row.id,
            daycare_id: row.daycare_id,
            location_id: row.location_id,
            class_id: row.class_id,
            class_name: row.class_name,
            child_id: row.child_id,
            child_name: row.child_name,
            date: row.report_date,
            total_activities: row.total_activities,
            activity_summary: row.activity_summary,
            entries,
            visible_to_parents: row.visible_to_parents,
            sent: row.sent,
            sent_at: row.sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for ReportsRepository {
    async fn get(&self, key: &str) -> AppResult<Option<DailyReport>> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM daily_reports WHERE id = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DailyReport::try_from).transpose()
    }

    async fn upsert_merge(&self, report: &DailyReport) -> AppResult<DailyReport> {
        let entries = serde_json::to_value(&report.entries)
            .map_err(|e| AppError::Internal(format!("failed to serialize entries snapshot: {}", e)))?;

        // Single-statement upsert keyed on the composite id. Stored
        // created_at wins; visibility flags only ever widen.
        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            INSERT INTO daily_reports (
                id, daycare_id, location_id, class_id, class_name,
                child_id, child_name, report_date, total_activities,
                activity_summary, entries, visible_to_parents, sent, sent_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                class_id = EXCLUDED.class_id,
                class_name = COALESCE(EXCLUDED.class_name, daily_reports.class_name),
                child_name = COALESCE(EXCLUDED.child_name, daily_reports.child_name),
                total_activities = EXCLUDED.total_activities,
                activity_summary = EXCLUDED.activity_summary,
                entries = EXCLUDED.entries,
                visible_to_parents = daily_reports.visible_to_parents OR EXCLUDED.visible_to_parents,
                sent = daily_reports.sent OR EXCLUDED.sent,
                sent_at = COALESCE(daily_reports.sent_at, EXCLUDED.sent_at),
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(&report.id)
        .bind(&report.daycare_id)
        .bind(&report.location_id)
        .bind(&report.class_id)
        .bind(&report.class_name)
        .bind(&report.child_id)
        .bind(&report.child_name)
        .bind(report.date)
        .bind(report.total_activities)
        .bind(&report.activity_summary)
        .bind(entries)
        .bind(report.visible_to_parents)
        .bind(report.sent)
        .bind(report.sent_at)
        .bind(report.created_at)
        .bind(report.updated_at)
        .fetch_one(&self.pool)
        .await?;

        DailyReport::try_from(row)
    }

    async fn mark_sent(&self, key: &str) -> AppResult<DailyReport> {
        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            UPDATE daily_reports
            SET sent = TRUE, visible_to_parents = TRUE, sent_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => DailyReport::try_from(row),
            None => Err(AppError::NotFound(format!("Report {} not found", key))),
        }
    }

    async fn list(&self, query: &ReportQuery) -> AppResult<Vec<DailyReport>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.location_id.is_some() {
            conditions.push(format!("location_id = ${}", idx));
            idx += 1;
        }
        if query.class_id.is_some() {
            conditions.push(format!("class_id = ${}", idx));
            idx += 1;
        }
        if query.child_id.is_some() {
            conditions.push(format!("child_id = ${}", idx));
            idx += 1;
        }
        if query.from.is_some() {
            conditions.push(format!("report_date >= ${}", idx));
            idx += 1;
        }
        if query.to.is_some() {
            conditions.push(format!("report_date <= ${}", idx));
            idx += 1;
        }
        if query.sent.is_some() {
            conditions.push(format!("sent = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM daily_reports {} ORDER BY report_date DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, ReportRow>(&sql);
        if let Some(ref v) = query.location_id {
            builder = builder.bind(v);
        }
        if let Some(ref v) = query.class_id {
            builder = builder.bind(v);
        }
        if let Some(ref v) = query.child_id {
            builder = builder.bind(v);
        }
        if let Some(v) = query.from {
            builder = builder.bind(v);
        }
        if let Some(v) = query.to {
            builder = builder.bind(v);
        }
        if let Some(v) = query.sent {
            builder = builder.bind(v);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        rows.into_iter().map(DailyReport::try_from).collect()
    }
}
