//! Daily report models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::entry::Entry;

/// Natural composite key for a child's day, the idempotency anchor of
/// report upserts.
pub fn report_key(child_id: &str, date: NaiveDate) -> String {
    format!("{}-{}", child_id, date.format("%Y-%m-%d"))
}

/// One child's aggregated day. Mutable only through full recomputation
/// from the live entry set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    /// `"{childId}-{date}"`
    pub id: String,
    pub daycare_id: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub child_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    /// UTC calendar day
    pub date: NaiveDate,
    pub total_activities: i32,
    pub activity_summary: String,
    /// Full day snapshot, not a diff
    pub entries: Vec<Entry>,
    pub visible_to_parents: bool,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Visibility flags passed into an aggregation run. Default all-false;
/// a checkout trigger forces both true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOverrides {
    pub visible_to_parents: bool,
    pub sent: bool,
}

impl ReportOverrides {
    pub fn visible() -> Self {
        Self {
            visible_to_parents: true,
            sent: true,
        }
    }
}

/// Query parameters for report listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    pub location_id: Option<String>,
    pub class_id: Option<String>,
    pub child_id: Option<String>,
    /// Earliest date, inclusive (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    pub sent: Option<bool>,
}
