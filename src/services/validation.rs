//! Per-item validation and normalization of raw entry submissions
//!
//! Validation is per item, never per batch: a rejected item is recorded in
//! the bulk response and does not abort its siblings.

use chrono::{DateTime, Utc};

use crate::models::{
    entry::{AttendanceStatus, ToiletKind},
    EntryCreateInput, EntryData, EntryType, RejectReason,
};

/// A submission item that passed its type's requirement taxonomy, with the
/// type-specific payload already normalized.
#[derive(Debug, Clone)]
pub struct ValidItem {
    pub entry_type: EntryType,
    pub occurred_at: DateTime<Utc>,
    pub data: EntryData,
    /// Trimmed for Photo entries, passed through otherwise
    pub photo_url: Option<String>,
}

fn non_empty_trimmed(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Check one raw item against its type's required-field taxonomy.
/// Pure: no side effects, no I/O.
pub fn validate_item(item: &EntryCreateInput) -> Result<ValidItem, RejectReason> {
    let entry_type =
        EntryType::parse(&item.entry_type).ok_or(RejectReason::UnsupportedType)?;

    let occurred_at = DateTime::parse_from_rfc3339(&item.occurred_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| RejectReason::InvalidOccurredAt)?;

    if item.apply_to_all_in_class && non_empty_trimmed(&item.class_id).is_none() {
        return Err(RejectReason::MissingClassId);
    }

    let mut photo_url = item.photo_url.clone();
    let data = match entry_type {
        EntryType::Attendance => {
            let subtype = item
                .subtype
                .as_deref()
                .ok_or(RejectReason::MissingSubtype)?;
            let status = AttendanceStatus::from_subtype(subtype)
                .ok_or(RejectReason::InvalidSubtype)?;
            EntryData::Attendance { status }
        }
        EntryType::Sleep => {
            let subtype =
                non_empty_trimmed(&item.subtype).ok_or(RejectReason::MissingSubtype)?;
            // "Started" opens a session; anything else ("Woke up") closes one.
            // No duration is derived here.
            if subtype == "Started" {
                EntryData::Sleep {
                    start: Some(occurred_at),
                    end: None,
                }
            } else {
                EntryData::Sleep {
                    start: None,
                    end: Some(occurred_at),
                }
            }
        }
        EntryType::Food => {
            non_empty_trimmed(&item.subtype).ok_or(RejectReason::MissingSubtype)?;
            EntryData::Empty
        }
        EntryType::Toilet => {
            let kind = item
                .toilet_kind
                .as_deref()
                .and_then(ToiletKind::parse)
                .ok_or(RejectReason::InvalidToiletKind)?;
            EntryData::Toilet {
                toilet_time: occurred_at,
                toilet_kind: kind,
            }
        }
        EntryType::Activity | EntryType::Note | EntryType::Health => {
            let text = non_empty_trimmed(&item.detail).ok_or(RejectReason::MissingDetail)?;
            EntryData::Text {
                text: text.to_string(),
            }
        }
        EntryType::Photo => {
            let url =
                non_empty_trimmed(&item.photo_url).ok_or(RejectReason::MissingPhotoUrl)?;
            photo_url = Some(url.to_string());
            EntryData::Empty
        }
    };

    Ok(ValidItem {
        entry_type,
        occurred_at,
        data,
        photo_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_item(entry_type: &str) -> EntryCreateInput {
        EntryCreateInput {
            entry_type: entry_type.to_string(),
            subtype: None,
            toilet_kind: None,
            detail: None,
            photo_url: None,
            occurred_at: "2025-01-02T09:00:00Z".to_string(),
            child_ids: vec!["c1".to_string()],
            class_id: None,
            apply_to_all_in_class: false,
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let item = base_item("Nap");
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::UnsupportedType)
        ));
    }

    #[test]
    fn attendance_requires_known_subtype() {
        let mut item = base_item("Attendance");
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::MissingSubtype)
        ));

        item.subtype = Some("Dropped by".to_string());
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::InvalidSubtype)
        ));

        item.subtype = Some("Check in".to_string());
        let valid = validate_item(&item).unwrap();
        assert_eq!(
            valid.data,
            EntryData::Attendance {
                status: AttendanceStatus::CheckIn
            }
        );
    }

    #[test]
    fn sleep_started_sets_start_only() {
        let mut item = base_item("Sleep");
        item.subtype = Some("Started".to_string());
        let valid = validate_item(&item).unwrap();
        match valid.data {
            EntryData::Sleep { start, end } => {
                assert_eq!(start, Some(valid.occurred_at));
                assert_eq!(end, None);
            }
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[test]
    fn sleep_woke_up_sets_end_only() {
        let mut item = base_item("Sleep");
        item.subtype = Some("Woke up".to_string());
        let valid = validate_item(&item).unwrap();
        match valid.data {
            EntryData::Sleep { start, end } => {
                assert_eq!(start, None);
                assert_eq!(end, Some(valid.occurred_at));
            }
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[test]
    fn food_requires_non_empty_subtype() {
        let mut item = base_item("Food");
        item.subtype = Some("   ".to_string());
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::MissingSubtype)
        ));

        item.subtype = Some("Lunch".to_string());
        assert!(validate_item(&item).is_ok());
    }

    #[test]
    fn toilet_requires_known_kind() {
        let mut item = base_item("Toilet");
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::InvalidToiletKind)
        ));

        item.toilet_kind = Some("bm".to_string());
        let valid = validate_item(&item).unwrap();
        assert!(matches!(
            valid.data,
            EntryData::Toilet {
                toilet_kind: ToiletKind::Bm,
                ..
            }
        ));
    }

    #[test]
    fn text_types_require_detail_after_trim() {
        for entry_type in ["Activity", "Note", "Health"] {
            let mut item = base_item(entry_type);
            item.detail = Some("  ".to_string());
            assert!(matches!(
                validate_item(&item),
                Err(RejectReason::MissingDetail)
            ));

            item.detail = Some("  painted a dinosaur  ".to_string());
            let valid = validate_item(&item).unwrap();
            assert_eq!(
                valid.data,
                EntryData::Text {
                    text: "painted a dinosaur".to_string()
                }
            );
        }
    }

    #[test]
    fn photo_requires_url_and_trims_it() {
        let mut item = base_item("Photo");
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::MissingPhotoUrl)
        ));

        item.photo_url = Some(" https://cdn.example/p.jpg ".to_string());
        let valid = validate_item(&item).unwrap();
        assert_eq!(valid.data, EntryData::Empty);
        assert_eq!(
            valid.photo_url.as_deref(),
            Some("https://cdn.example/p.jpg")
        );
    }

    #[test]
    fn rejects_unparseable_occurred_at() {
        let mut item = base_item("Note");
        item.detail = Some("fine".to_string());
        item.occurred_at = "yesterday-ish".to_string();
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::InvalidOccurredAt)
        ));
    }

    #[test]
    fn class_fanout_requires_class_id() {
        let mut item = base_item("Note");
        item.detail = Some("fine".to_string());
        item.apply_to_all_in_class = true;
        assert!(matches!(
            validate_item(&item),
            Err(RejectReason::MissingClassId)
        ));

        item.class_id = Some("k1".to_string());
        assert!(validate_item(&item).is_ok());
    }
}
