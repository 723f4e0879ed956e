//! Business logic services

pub mod entries;
pub mod reports;
pub mod validation;

use std::sync::Arc;

use crate::{config::IngestConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub entries: entries::EntriesService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, ingest: IngestConfig) -> Self {
        let entry_store = Arc::new(repository.entries.clone());
        let report_store = Arc::new(repository.reports.clone());
        let directory = Arc::new(repository.children.clone());

        let reports = reports::ReportsService::new(
            entry_store.clone(),
            report_store,
            directory.clone(),
        );
        let entries = entries::EntriesService::new(
            entry_store,
            directory,
            reports.clone(),
            ingest.chunk_size,
        );

        Self { entries, reports }
    }
}
