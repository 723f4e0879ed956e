//! Bulk entry ingestion service
//!
//! Pipeline: per-item validation, child fan-out, entry building, then
//! chunked atomic persistence and the daily-report aggregation trigger.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexSet;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        AuthScope, BulkCreateResponse, CreatedEntry, Entry, EntryCreateInput, FailedItem,
        RejectReason, StaffContext,
    },
    repository::{ChildDirectory, EntryStore},
};

use super::{
    reports::ReportsService,
    validation::{validate_item, ValidItem},
};

#[derive(Clone)]
pub struct EntriesService {
    store: Arc<dyn EntryStore>,
    directory: Arc<dyn ChildDirectory>,
    reports: ReportsService,
    /// Entries per atomic write chunk, kept under the store's
    /// per-transaction ceiling with headroom
    chunk_size: usize,
}

impl EntriesService {
    pub fn new(
        store: Arc<dyn EntryStore>,
        directory: Arc<dyn ChildDirectory>,
        reports: ReportsService,
        chunk_size: usize,
    ) -> Self {
        Self {
            store,
            directory,
            reports,
            chunk_size,
        }
    }

    /// Ingest a bulk submission. Per-item failures land in `failed[]` and
    /// never abort sibling items; missing staff-context fields and store
    /// errors are fatal for the whole call.
    ///
    /// Chunks commit sequentially; a chunk failure leaves earlier chunks
    /// durable and propagates. Retrying the same submission is safe
    /// because entry ids are assigned before the write.
    pub async fn bulk_create(
        &self,
        ctx: &StaffContext,
        items: &[EntryCreateInput],
    ) -> AppResult<BulkCreateResponse> {
        let scope = ctx.require()?;

        let mut entries: Vec<Entry> = Vec::new();
        let mut response = BulkCreateResponse::default();

        for (index, item) in items.iter().enumerate() {
            let valid = match validate_item(item) {
                Ok(valid) => valid,
                Err(reason) => {
                    response.failed.push(FailedItem { index, reason });
                    continue;
                }
            };

            let child_ids = self.expand_children(item).await?;
            if child_ids.is_empty() {
                response.failed.push(FailedItem {
                    index,
                    reason: RejectReason::NoChildren,
                });
                continue;
            }

            for child_id in child_ids {
                let entry = build_entry(&scope, item, &valid, child_id);
                response.created.push(CreatedEntry {
                    id: entry.id,
                    entry_type: entry.entry_type,
                });
                entries.push(entry);
            }
        }

        for chunk in entries.chunks(self.chunk_size.max(1)) {
            self.store.batch_put(chunk).await?;
            tracing::debug!(size = chunk.len(), "entry chunk committed");
        }

        tracing::info!(
            created = response.created.len(),
            failed = response.failed.len(),
            "bulk entry submission processed"
        );

        self.reports.aggregate_created(&entries).await?;

        Ok(response)
    }

    /// Resolve the concrete target children for one item: the deduplicated
    /// explicit ids, unioned with the class roster on class fan-out.
    async fn expand_children(&self, item: &EntryCreateInput) -> AppResult<Vec<String>> {
        let mut ids: IndexSet<String> = item.child_ids.iter().cloned().collect();

        if item.apply_to_all_in_class {
            if let Some(class_id) = item.class_id.as_deref().filter(|s| !s.is_empty()) {
                for id in self.directory.ids_in_class(class_id).await? {
                    ids.insert(id);
                }
            }
        }

        Ok(ids.into_iter().collect())
    }
}

/// Turn one validated item and one target child into a canonical entry.
/// The id is assigned here, before the write, so the document embeds it
/// and retries are idempotent.
fn build_entry(
    scope: &AuthScope,
    item: &EntryCreateInput,
    valid: &ValidItem,
    child_id: String,
) -> Entry {
    let now = Utc::now();
    Entry {
        id: Uuid::new_v4(),
        daycare_id: scope.daycare_id.clone(),
        location_id: scope.location_id.clone(),
        class_id: item.class_id.clone(),
        child_id,
        created_by_user_id: scope.user_doc_id.clone(),
        // This ingestion path is teacher-authored only
        created_by_role: "teacher".to_string(),
        created_at: now,
        occurred_at: valid.occurred_at,
        entry_type: valid.entry_type,
        subtype: item.subtype.clone(),
        data: valid.data.clone(),
        detail: item.detail.as_deref().map(str::trim).map(str::to_string),
        photo_url: valid.photo_url.clone(),
        // Teacher entries are immediately visible; report visibility is
        // gated independently
        visible_to_parents: true,
        published_at: now,
    }
}
