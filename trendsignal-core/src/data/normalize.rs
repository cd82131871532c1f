//! Bar normalizer: raw records in, chronological typed bars out.
//!
//! The caller supplies records newest-first. Validation runs in that order so
//! record numbers in error messages match the caller's payload; the validated
//! bars are then reversed to oldest-first.

use serde_json::Value;
use tracing::warn;

use super::schema::{FieldSet, TIME_FIELDS};
use crate::domain::{Bar, RawRecord};
use crate::error::EngineError;

/// Validate, coerce and reorder `records` into a chronological bar series.
///
/// Fails with a schema error when a required field is missing, a coercion
/// error when a field is not a finite number, and an insufficient-history
/// error when fewer than `min_len` bars remain.
pub fn normalize(
    records: &[RawRecord],
    fields: FieldSet,
    min_len: usize,
) -> Result<Vec<Bar>, EngineError> {
    if !records.is_empty() {
        for &field in fields.required() {
            if records.iter().all(|r| !r.contains_key(field)) {
                return Err(EngineError::MissingField {
                    field: field.to_string(),
                });
            }
        }
    }

    let mut bars = records
        .iter()
        .enumerate()
        .map(|(idx, record)| parse_record(record, idx, fields))
        .collect::<Result<Vec<_>, _>>()?;

    if bars.len() < min_len {
        return Err(EngineError::insufficient("normalizer", min_len, bars.len()));
    }

    // Inconsistent envelopes are passed through unchanged; only flag them.
    let inconsistent = bars.iter().filter(|b| !b.is_sane()).count();
    if inconsistent > 0 {
        warn!(inconsistent, total = bars.len(), "bars with high/low not bracketing open/close");
    }

    bars.reverse();
    Ok(bars)
}

fn parse_record(record: &RawRecord, idx: usize, fields: FieldSet) -> Result<Bar, EngineError> {
    let mut bar = match fields {
        FieldSet::CloseOnly => Bar::from_close(field(record, idx, "close")?),
        FieldSet::Ohlc => Bar {
            open: field(record, idx, "open")?,
            high: field(record, idx, "high")?,
            low: field(record, idx, "low")?,
            close: field(record, idx, "close")?,
            time: None,
        },
    };
    bar.time = time_label(record);
    Ok(bar)
}

fn field(record: &RawRecord, idx: usize, name: &str) -> Result<f64, EngineError> {
    let value = record
        .get(name)
        .ok_or_else(|| EngineError::MissingFieldInRecord {
            field: name.to_string(),
            record: idx,
        })?;

    coerce(value).ok_or_else(|| EngineError::TypeCoercion {
        field: name.to_string(),
        record: idx,
        value: value.to_string(),
    })
}

/// Numbers and numeric strings are accepted; the result must be finite.
fn coerce(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn time_label(record: &RawRecord) -> Option<String> {
    TIME_FIELDS
        .iter()
        .find_map(|&key| match record.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn closes_newest_first(closes: &[f64]) -> Vec<RawRecord> {
        closes.iter().map(|c| record(json!({ "close": c }))).collect()
    }

    #[test]
    fn inconsistent_envelope_is_kept_as_sent() {
        let records = vec![record(json!({
            "open": 1.10, "high": 1.09, "low": 1.11, "close": 1.10,
        }))];
        let bars = normalize(&records, FieldSet::Ohlc, 1).unwrap();
        assert!(!bars[0].is_sane());
        assert_eq!(bars[0].high, 1.09);
        assert_eq!(bars[0].low, 1.11);
    }

    #[test]
    fn reverses_to_chronological() {
        let records = closes_newest_first(&[3.0, 2.0, 1.0]);
        let bars = normalize(&records, FieldSet::CloseOnly, 0).unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn accepts_numeric_strings() {
        let records = vec![
            record(json!({"open": "1.10", "high": " 1.20 ", "low": "1.05", "close": "1.15"})),
        ];
        let bars = normalize(&records, FieldSet::Ohlc, 1).unwrap();
        assert_eq!(bars[0].high, 1.20);
        assert_eq!(bars[0].close, 1.15);
    }

    #[test]
    fn close_only_ignores_other_fields() {
        let records = vec![record(json!({"close": 5.0, "open": "garbage"}))];
        let bars = normalize(&records, FieldSet::CloseOnly, 1).unwrap();
        assert_eq!(bars[0], Bar::from_close(5.0));
    }

    #[test]
    fn field_missing_everywhere_is_schema_error() {
        let records = vec![record(json!({"price": 1.0})), record(json!({"price": 2.0}))];
        let err = normalize(&records, FieldSet::CloseOnly, 0).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingField {
                field: "close".into()
            }
        );
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn field_missing_in_one_record_names_the_record() {
        let records = vec![
            record(json!({"open": 1, "high": 2, "low": 0.5, "close": 1.5})),
            record(json!({"open": 1, "high": 2, "close": 1.5})),
        ];
        let err = normalize(&records, FieldSet::Ohlc, 0).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingFieldInRecord {
                field: "low".into(),
                record: 1
            }
        );
    }

    #[test]
    fn non_numeric_is_coercion_error() {
        for bad in [json!("abc"), json!(null), json!(true), json!("NaN"), json!("inf"), json!([1.0])] {
            let records = vec![record(json!({ "close": bad.clone() }))];
            let err = normalize(&records, FieldSet::CloseOnly, 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TypeCoercion, "value {bad} should not coerce");
        }
    }

    #[test]
    fn short_window_is_insufficient_history() {
        let records = closes_newest_first(&[1.0; 10]);
        let err = normalize(&records, FieldSet::CloseOnly, 51).unwrap_err();
        assert_eq!(err, EngineError::insufficient("normalizer", 51, 10));
    }

    #[test]
    fn empty_input_is_insufficient_history() {
        let err = normalize(&[], FieldSet::Ohlc, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    }

    #[test]
    fn carries_time_label() {
        let records = vec![
            record(json!({"datetime": "2024-01-02 11:00:00", "close": 2.0})),
            record(json!({"timestamp": 1704189600, "close": 1.0})),
        ];
        let bars = normalize(&records, FieldSet::CloseOnly, 0).unwrap();
        assert_eq!(bars[0].time.as_deref(), Some("1704189600"));
        assert_eq!(bars[1].time.as_deref(), Some("2024-01-02 11:00:00"));
    }
}
