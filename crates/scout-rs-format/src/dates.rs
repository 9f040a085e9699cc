//! Legacy date denormalization for older clients.
//!
//! Uploaders that record a `utcOffset` expect `created_at` back in their own
//! offset rather than UTC. When enabled, the timestamp is rewritten as an
//! ISO-8601 string carrying that offset and the hint is dropped.

use crate::record::Record;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use serde_json::Value;

/// Offsets with a smaller magnitude than this are hours, larger ones minutes.
const HOUR_OFFSET_LIMIT: f64 = 16.0;

/// ISO-8601 extended and basic forms carrying an offset designator.
const OFFSET_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

/// Timestamps without an offset, read as UTC.
const NAIVE_PATTERNS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Rewrite `created_at` using each record's `utcOffset` when `enabled`.
///
/// Length and order are preserved. Records whose timestamp or offset cannot
/// be interpreted are returned unchanged.
pub fn normalize_dates(records: Vec<Record>, enabled: bool) -> Vec<Record> {
    if !enabled {
        return records;
    }
    records.into_iter().map(denormalize_record).collect()
}

fn denormalize_record(mut record: Record) -> Record {
    let (Some(created_at), Some(offset)) = (record.created_at(), record.utc_offset()) else {
        return record;
    };
    let shifted = parse_timestamp(created_at).zip(parse_offset(offset));
    let Some((timestamp, offset)) = shifted else {
        debug!(
            "leaving record date untouched (id={:?}, created_at={}, utcOffset={})",
            record.id(),
            created_at,
            offset
        );
        return record;
    };
    let local = timestamp.with_timezone(&offset);
    record.insert(
        "created_at",
        local.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
    );
    record.remove("utcOffset");
    record
}

/// Parse an ISO-8601 string (offset optional, UTC assumed) or epoch millis.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc));
            }
            // `%#z` takes `Z`, `+02`, `+0200` and `+02:00`.
            for pattern in OFFSET_PATTERNS {
                if let Ok(parsed) = DateTime::parse_from_str(text, pattern) {
                    return Some(parsed.with_timezone(&Utc));
                }
            }
            for pattern in NAIVE_PATTERNS {
                if let Ok(parsed) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Some(parsed.and_utc());
                }
            }
            ["%Y-%m-%d", "%Y%m%d"]
                .iter()
                .find_map(|pattern| NaiveDate::parse_from_str(text, pattern).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|date| date.and_utc())
        }
        Value::Number(number) => {
            let millis = number.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(millis as i64)
        }
        _ => None,
    }
}

/// Interpret a `utcOffset` hint.
///
/// Numbers below 16 in magnitude are hours, anything else minutes. Strings
/// must be offset designators (`Z`, `+05:30`, `-0800`, `+02`).
fn parse_offset(value: &Value) -> Option<FixedOffset> {
    let minutes = match value {
        Value::Number(number) => {
            let raw = number.as_f64().filter(|raw| raw.is_finite())?;
            if raw.abs() < HOUR_OFFSET_LIMIT {
                (raw * 60.0).round() as i64
            } else {
                raw.round() as i64
            }
        }
        Value::String(text) => parse_offset_designator(text.trim())?,
        _ => return None,
    };
    let seconds = i32::try_from(minutes.checked_mul(60)?).ok()?;
    FixedOffset::east_opt(seconds)
}

fn parse_offset_designator(text: &str) -> Option<i64> {
    if text.eq_ignore_ascii_case("z") {
        return Some(0);
    }
    let (sign, rest) = match text.chars().next()? {
        '+' => (1, &text[1..]),
        '-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|ch| *ch != ':').collect();
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i64>().ok()?, 0),
        4 => (
            digits[..2].parse::<i64>().ok()?,
            digits[2..].parse::<i64>().ok()?,
        ),
        _ => return None,
    };
    Some(sign * (hours * 60 + minutes))
}

#[cfg(test)]
mod tests {
    use super::{normalize_dates, parse_offset};
    use crate::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).expect("object")
    }

    #[test]
    fn disabled_flag_is_identity() {
        let input = vec![record(json!({
            "created_at": "2024-01-01T12:00:00Z",
            "utcOffset": 120
        }))];
        assert_eq!(normalize_dates(input.clone(), false), input);
    }

    #[test]
    fn shifts_to_offset_and_drops_hint() {
        let input = vec![record(json!({
            "_id": "a",
            "created_at": "2024-01-01T12:00:00Z",
            "utcOffset": 120,
            "device": "pump"
        }))];

        let output = normalize_dates(input, true);

        assert_eq!(
            output,
            vec![record(json!({
                "_id": "a",
                "created_at": "2024-01-01T14:00:00.000+02:00",
                "device": "pump"
            }))]
        );
    }

    #[test]
    fn small_offsets_are_hours() {
        let input = vec![record(json!({
            "created_at": "2024-01-01T12:00:00.250Z",
            "utcOffset": -5
        }))];
        let output = normalize_dates(input, true);
        assert_eq!(
            output[0].get("created_at"),
            Some(&json!("2024-01-01T07:00:00.250-05:00"))
        );
    }

    #[test]
    fn zero_offset_keeps_explicit_designator() {
        let input = vec![record(json!({
            "created_at": 1704110400000_i64,
            "utcOffset": 0
        }))];
        let output = normalize_dates(input, true);
        assert_eq!(
            output[0].get("created_at"),
            Some(&json!("2024-01-01T12:00:00.000+00:00"))
        );
        assert!(!output[0].contains_key("utcOffset"));
    }

    #[test]
    fn basic_and_hour_only_offsets_are_shifted() {
        for created_at in [
            "2024-01-01T12:00:00.000+0200",
            "2024-01-01T12:00:00+0200",
            "2024-01-01T12:00:00+02",
            "20240101T120000+0200",
        ] {
            let input = vec![record(json!({ "created_at": created_at, "utcOffset": 60 }))];
            let output = normalize_dates(input, true);
            assert_eq!(
                output,
                vec![record(json!({ "created_at": "2024-01-01T11:00:00.000+01:00" }))],
                "{created_at}"
            );
        }
    }

    #[test]
    fn basic_zulu_and_date_only_forms_are_shifted() {
        let input = vec![
            record(json!({ "created_at": "20240101T120000Z", "utcOffset": 60 })),
            record(json!({ "created_at": "20240101", "utcOffset": 60 })),
        ];
        let output = normalize_dates(input, true);
        assert_eq!(
            output,
            vec![
                record(json!({ "created_at": "2024-01-01T13:00:00.000+01:00" })),
                record(json!({ "created_at": "2024-01-01T01:00:00.000+01:00" })),
            ]
        );
    }

    #[test]
    fn records_without_hint_pass_through() {
        let input = vec![
            record(json!({ "created_at": "2024-01-01T12:00:00Z" })),
            record(json!({ "utcOffset": 60 })),
            record(json!({ "created_at": "", "utcOffset": 60 })),
        ];
        assert_eq!(normalize_dates(input.clone(), true), input);
    }

    #[test]
    fn malformed_values_leave_record_untouched() {
        let input = vec![
            record(json!({ "created_at": "yesterday", "utcOffset": 60 })),
            record(json!({ "created_at": "2024-01-01T12:00:00Z", "utcOffset": "soon" })),
            record(json!({ "created_at": "2024-01-01T12:00:00Z", "utcOffset": null })),
        ];
        assert_eq!(normalize_dates(input.clone(), true), input);
    }

    #[test]
    fn offset_designators_parse() {
        let minutes = |value| parse_offset(&value).map(|offset| offset.local_minus_utc() / 60);
        assert_eq!(minutes(json!("+05:30")), Some(330));
        assert_eq!(minutes(json!("-0800")), Some(-480));
        assert_eq!(minutes(json!("+02")), Some(120));
        assert_eq!(minutes(json!("Z")), Some(0));
        assert_eq!(minutes(json!("330")), None);
        assert_eq!(minutes(json!(330)), Some(330));
        assert_eq!(minutes(json!(5.5)), Some(330));
    }
}
