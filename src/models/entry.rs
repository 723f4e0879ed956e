//! Entry models: raw submissions, canonical entries, bulk-call DTOs

use chrono::{DateTime, Utc};
use serde::{
    de::{Deserializer, Error as DeError},
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// EntryType
// ---------------------------------------------------------------------------

/// Kinds of observations a caregiver can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum EntryType {
    Attendance,
    Food,
    Sleep,
    Toilet,
    Activity,
    Note,
    Health,
    Photo,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Attendance => "Attendance",
            EntryType::Food => "Food",
            EntryType::Sleep => "Sleep",
            EntryType::Toilet => "Toilet",
            EntryType::Activity => "Activity",
            EntryType::Note => "Note",
            EntryType::Health => "Health",
            EntryType::Photo => "Photo",
        }
    }

    /// Parse a raw submission `type` string. Unknown values are rejected
    /// per item, not per request.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Attendance" => Some(EntryType::Attendance),
            "Food" => Some(EntryType::Food),
            "Sleep" => Some(EntryType::Sleep),
            "Toilet" => Some(EntryType::Toilet),
            "Activity" => Some(EntryType::Activity),
            "Note" => Some(EntryType::Note),
            "Health" => Some(EntryType::Health),
            "Photo" => Some(EntryType::Photo),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryType::parse(s).ok_or_else(|| format!("unknown entry type: {}", s))
    }
}

// ---------------------------------------------------------------------------
// AttendanceStatus / ToiletKind
// ---------------------------------------------------------------------------

/// Attendance direction, derived from the "Check in" / "Check out" subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    CheckIn,
    CheckOut,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::CheckIn => "check_in",
            AttendanceStatus::CheckOut => "check_out",
        }
    }

    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "Check in" => Some(AttendanceStatus::CheckIn),
            "Check out" => Some(AttendanceStatus::CheckOut),
            _ => None,
        }
    }
}

/// Toilet observation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToiletKind {
    Urine,
    Bm,
}

impl ToiletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToiletKind::Urine => "urine",
            ToiletKind::Bm => "bm",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "urine" => Some(ToiletKind::Urine),
            "bm" => Some(ToiletKind::Bm),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EntryData
// ---------------------------------------------------------------------------

/// Type-specific entry payload, stored as a flat JSON object.
///
/// The flat representation uses the keys `status`, `start`, `end`,
/// `toiletTime`, `toiletKind` and `text`; the key set is disjoint per
/// variant, so the stored form round-trips without a discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryData {
    Attendance {
        status: AttendanceStatus,
    },
    Sleep {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    Toilet {
        toilet_time: DateTime<Utc>,
        toilet_kind: ToiletKind,
    },
    /// Activity / Note / Health free text
    Text {
        text: String,
    },
    /// Photo entries carry no payload; the URL lives on the entry itself
    Empty,
}

impl EntryData {
    /// Flatten into the storage representation.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            EntryData::Attendance { status } => {
                map.insert("status".into(), Value::String(status.as_str().into()));
            }
            EntryData::Sleep { start, end } => {
                if let Some(start) = start {
                    map.insert("start".into(), Value::String(start.to_rfc3339()));
                }
                if let Some(end) = end {
                    map.insert("end".into(), Value::String(end.to_rfc3339()));
                }
            }
            EntryData::Toilet {
                toilet_time,
                toilet_kind,
            } => {
                map.insert("toiletTime".into(), Value::String(toilet_time.to_rfc3339()));
                map.insert(
                    "toiletKind".into(),
                    Value::String(toilet_kind.as_str().into()),
                );
            }
            EntryData::Text { text } => {
                map.insert("text".into(), Value::String(text.clone()));
            }
            EntryData::Empty => {}
        }
        map
    }

    /// Rebuild from the storage representation. The present keys identify
    /// the variant; malformed values fail with a validation error.
    pub fn from_map(map: &Map<String, Value>) -> AppResult<Self> {
        fn parse_ts(value: &Value, key: &str) -> AppResult<DateTime<Utc>> {
            value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AppError::Validation(format!("invalid timestamp in data.{}", key)))
        }

        if let Some(status) = map.get("status") {
            let status = status
                .as_str()
                .and_then(|s| match s {
                    "check_in" => Some(AttendanceStatus::CheckIn),
                    "check_out" => Some(AttendanceStatus::CheckOut),
                    _ => None,
                })
                .ok_or_else(|| AppError::Validation("invalid data.status".to_string()))?;
            return Ok(EntryData::Attendance { status });
        }
        if let Some(time) = map.get("toiletTime") {
            let toilet_time = parse_ts(time, "toiletTime")?;
            let toilet_kind = map
                .get("toiletKind")
                .and_then(Value::as_str)
                .and_then(ToiletKind::parse)
                .ok_or_else(|| AppError::Validation("invalid data.toiletKind".to_string()))?;
            return Ok(EntryData::Toilet {
                toilet_time,
                toilet_kind,
            });
        }
        if let Some(text) = map.get("text") {
            let text = text
                .as_str()
                .ok_or_else(|| AppError::Validation("invalid data.text".to_string()))?
                .to_string();
            return Ok(EntryData::Text { text });
        }
        if map.contains_key("start") || map.contains_key("end") {
            let start = map.get("start").map(|v| parse_ts(v, "start")).transpose()?;
            let end = map.get("end").map(|v| parse_ts(v, "end")).transpose()?;
            return Ok(EntryData::Sleep { start, end });
        }
        Ok(EntryData::Empty)
    }
}

impl Serialize for EntryData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map = self.to_map();
        let mut state = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in &map {
            state.serialize_entry(k, v)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for EntryData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        EntryData::from_map(&map).map_err(|e| DeError::custom(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One immutable observation record for one child at one instant.
/// Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Pre-assigned before the write so the id is embedded in the document
    /// and the write is idempotent on retry
    pub id: Uuid,
    pub daycare_id: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub child_id: String,
    pub created_by_user_id: String,
    /// Fixed to "teacher": this ingestion path is teacher-authored only
    pub created_by_role: String,
    pub created_at: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Flat type-specific payload
    #[schema(value_type = Object)]
    pub data: EntryData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub visible_to_parents: bool,
    pub published_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bulk ingestion DTOs
// ---------------------------------------------------------------------------

/// One raw, untrusted submission item. The `type` field stays a string so
/// an unknown value rejects that item alone instead of the whole request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreateInput {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub subtype: Option<String>,
    pub toilet_kind: Option<String>,
    pub detail: Option<String>,
    pub photo_url: Option<String>,
    /// Date-time string; must parse as RFC 3339
    pub occurred_at: String,
    #[serde(default)]
    pub child_ids: Vec<String>,
    pub class_id: Option<String>,
    #[serde(default)]
    pub apply_to_all_in_class: bool,
}

/// Bulk ingestion request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateRequest {
    pub items: Vec<EntryCreateInput>,
}

/// Why a single item was rejected. These are expected, per-item outcomes,
/// never surfaced as request-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnsupportedType,
    MissingSubtype,
    InvalidSubtype,
    InvalidToiletKind,
    MissingDetail,
    MissingPhotoUrl,
    InvalidOccurredAt,
    MissingClassId,
    NoChildren,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            RejectReason::UnsupportedType => "unsupported_type",
            RejectReason::MissingSubtype => "missing_subtype",
            RejectReason::InvalidSubtype => "invalid_subtype",
            RejectReason::InvalidToiletKind => "invalid_toilet_kind",
            RejectReason::MissingDetail => "missing_detail",
            RejectReason::MissingPhotoUrl => "missing_photo_url",
            RejectReason::InvalidOccurredAt => "invalid_occurred_at",
            RejectReason::MissingClassId => "missing_class_id",
            RejectReason::NoChildren => "no_children",
        };
        write!(f, "{}", code)
    }
}

/// One committed entry, echoed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// One rejected item, indexed by input position
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FailedItem {
    pub index: usize,
    pub reason: RejectReason,
}

/// Bulk ingestion response: every input item is accounted for in either
/// `created` (one row per built entry) or `failed` (one row per item).
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkCreateResponse {
    pub created: Vec<CreatedEntry>,
    pub failed: Vec<FailedItem>,
}

// ---------------------------------------------------------------------------
// Staff context
// ---------------------------------------------------------------------------

/// Already-validated gateway context. Fields arrive optional; the bulk
/// call enforces presence before any expansion or write.
#[derive(Debug, Clone, Default)]
pub struct StaffContext {
    pub user_doc_id: Option<String>,
    pub daycare_id: Option<String>,
    pub location_id: Option<String>,
}

/// Staff context with all preconditions checked
#[derive(Debug, Clone)]
pub struct AuthScope {
    pub user_doc_id: String,
    pub daycare_id: String,
    pub location_id: String,
}

impl StaffContext {
    /// Fail fast with a machine-readable code when any field is absent
    /// or empty. Checked once per bulk call, before any item work.
    pub fn require(&self) -> AppResult<AuthScope> {
        fn non_empty(v: &Option<String>, code: &'static str) -> AppResult<String> {
            match v {
                Some(s) if !s.is_empty() => Ok(s.clone()),
                _ => Err(AppError::Precondition(code)),
            }
        }

        Ok(AuthScope {
            user_doc_id: non_empty(&self.user_doc_id, "missing_userDocId")?,
            daycare_id: non_empty(&self.daycare_id, "missing_daycareId")?,
            location_id: non_empty(&self.location_id, "missing_locationId")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn attendance_data_round_trips_through_flat_map() {
        let data = EntryData::Attendance {
            status: AttendanceStatus::CheckOut,
        };
        let map = data.to_map();
        assert_eq!(map.get("status").unwrap(), "check_out");
        assert_eq!(EntryData::from_map(&map).unwrap(), data);
    }

    #[test]
    fn sleep_data_keeps_only_present_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 1, 2, 13, 0, 0).unwrap();
        let data = EntryData::Sleep {
            start: Some(start),
            end: None,
        };
        let map = data.to_map();
        assert!(map.contains_key("start"));
        assert!(!map.contains_key("end"));
        assert_eq!(EntryData::from_map(&map).unwrap(), data);
    }

    #[test]
    fn toilet_data_uses_camel_case_storage_keys() {
        let time = Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0).unwrap();
        let data = EntryData::Toilet {
            toilet_time: time,
            toilet_kind: ToiletKind::Bm,
        };
        let map = data.to_map();
        assert!(map.contains_key("toiletTime"));
        assert_eq!(map.get("toiletKind").unwrap(), "bm");
        assert_eq!(EntryData::from_map(&map).unwrap(), data);
    }

    #[test]
    fn empty_map_is_photo_payload() {
        assert_eq!(EntryData::from_map(&Map::new()).unwrap(), EntryData::Empty);
    }

    #[test]
    fn staff_context_requires_every_field() {
        let ctx = StaffContext {
            user_doc_id: Some("u1".into()),
            daycare_id: None,
            location_id: Some("l1".into()),
        };
        match ctx.require() {
            Err(AppError::Precondition(code)) => assert_eq!(code, "missing_daycareId"),
            other => panic!("expected precondition error, got {:?}", other.map(|_| ())),
        }

        let ctx = StaffContext {
            user_doc_id: Some("u1".into()),
            daycare_id: Some("d1".into()),
            location_id: Some("".into()),
        };
        match ctx.require() {
            Err(AppError::Precondition(code)) => assert_eq!(code, "missing_locationId"),
            other => panic!("expected precondition error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_type_string_does_not_parse() {
        assert!(EntryType::parse("Nap").is_none());
        assert_eq!(EntryType::parse("Sleep"), Some(EntryType::Sleep));
    }
}
