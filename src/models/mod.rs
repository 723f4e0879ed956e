//! Data models for Sproutlog

pub mod child;
pub mod entry;
pub mod report;

// Re-export commonly used types
pub use child::Child;
pub use entry::{
    AuthScope, BulkCreateRequest, BulkCreateResponse, CreatedEntry, Entry, EntryCreateInput,
    EntryData, EntryType, FailedItem, RejectReason, StaffContext,
};
pub use report::{report_key, DailyReport, ReportOverrides, ReportQuery};
