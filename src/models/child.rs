//! Child directory model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Child record as held by the directory. CRUD for children lives outside
/// this service; only lookups are performed here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub daycare_id: String,
    pub location_id: String,
    pub class_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Child {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
