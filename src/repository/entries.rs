//! Entries repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Entry, EntryData, EntryType},
};

use super::EntryStore;

/// Flat row shape; `data` is a jsonb object rebuilt into the typed payload
#[derive(FromRow)]
struct EntryRow {
    id: Uuid,
    daycare_id: String,
    location_id: String,
    class_id: Option<String>,
    child_id: String,
    created_by_user_id: String,
    created_by_role: String,
    created_at: DateTime<Utc>,
    occurred_at: DateTime<Utc>,
    entry_type: String,
    subtype: Option<String>,
    data: Value,
    detail: Option<String>,
    photo_url: Option<String>,
    visible_to_parents: bool,
    published_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> AppResult<Entry> {
        let entry_type = EntryType::parse(&row.entry_type).ok_or_else(|| {
            AppError::Internal(format!("stored entry {} has unknown type {}", row.id, row.entry_type))
        })?;
        let data = match row.data.as_object() {
            Some(map) => EntryData::from_map(map)?,
            None => EntryData::Empty,
        };
        Ok(Entry {
            id: row.id,
            daycare_id: row.daycare_id,
            location_id: row.location_id,
            class_id: row.class_id,
            child_id: row.child_id,
            created_by_user_id: row.created_by_user_id,
            created_by_role: row.created_by_role,
            created_at: row.created_at,
            occurred_at: row.occurred_at,
            entry_type,
            subtype: row.subtype,
            data,
            detail: row.detail,
            photo_url: row.photo_url,
            visible_to_parents: row.visible_to_parents,
            published_at: row.published_at,
        })
    }
}

#[derive(Clone)]
pub struct EntriesRepository {
    pool: Pool<Postgres>,
}

impl EntriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for EntriesRepository {
    async fn query(
        &self,
        location_id: &str,
        child_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM entries
            WHERE location_id = $1 AND child_id = $2
              AND occurred_at >= $3 AND occurred_at < $4
            ORDER BY occurred_at
            "#,
        )
        .bind(location_id)
        .bind(child_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn batch_put(&self, entries: &[Entry]) -> AppResult<()> {
        // One transaction per chunk: all-or-nothing within the chunk.
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO entries (
                    id, daycare_id, location_id, class_id, child_id,
                    created_by_user_id, created_by_role, created_at, occurred_at,
                    entry_type, subtype, data, detail, photo_url,
                    visible_to_parents, published_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(entry.id)
            .bind(&entry.daycare_id)
            .bind(&entry.location_id)
            .bind(&entry.class_id)
            .bind(&entry.child_id)
            .bind(&entry.created_by_user_id)
            .bind(&entry.created_by_role)
            .bind(entry.created_at)
            .bind(entry.occurred_at)
            .bind(entry.entry_type.as_str())
            .bind(&entry.subtype)
            .bind(Value::Object(entry.data.to_map()))
            .bind(&entry.detail)
            .bind(&entry.photo_url)
            .bind(entry.visible_to_parents)
            .bind(entry.published_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
