//! Coercion of raw profile fields into typed Shopify metafields.
//!
//! The metafield type is chosen from the key alone
//! ([`MetafieldType::for_key`]); the value is then rendered into the string
//! form Shopify expects for that type:
//!
//! | Type | Input | Output |
//! |------|-------|--------|
//! | `date` | `"2020-03-15T10:00:00Z"` | `"2020-03-15"` |
//! | `number_decimal` | `"12,5"` | `"12.5"` |
//! | `number_decimal` | `"not-a-number"` | `"0"` |
//! | `single_line_text_field` | `null` | `""` |
//!
//! An unparseable date fails the whole batch. Numbers never fail; they fall
//! back to `"0"`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::types::{MetafieldType, RawField, TypedField};

/// Naive date-time layouts accepted for date fields, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Errors produced while coercing a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A date field held something that is not a recognisable date.
    #[error("invalid date for {key}: {value:?}")]
    InvalidDate {
        /// Field key.
        key: String,
        /// Stringified submitted value.
        value: String,
    },
}

/// Coerce every field, preserving order.
///
/// # Errors
///
/// Returns [`TransformError::InvalidDate`] for the first date field whose
/// value cannot be parsed; no partial output is produced.
pub fn transform_fields(fields: &[RawField]) -> Result<Vec<TypedField>, TransformError> {
    fields.iter().map(transform_field).collect()
}

/// Coerce a single field.
///
/// # Errors
///
/// Returns [`TransformError::InvalidDate`] if the key is a date key and the
/// value cannot be parsed as a date.
pub fn transform_field(field: &RawField) -> Result<TypedField, TransformError> {
    let field_type = MetafieldType::for_key(&field.key);
    let raw = value_to_string(&field.value);

    let value = match field_type {
        MetafieldType::Date => parse_calendar_date(&raw)
            .ok_or_else(|| TransformError::InvalidDate {
                key: field.key.clone(),
                value: raw.clone(),
            })?
            .format("%Y-%m-%d")
            .to_string(),
        MetafieldType::NumberDecimal => coerce_decimal(&raw),
        MetafieldType::SingleLineTextField => raw,
    };

    Ok(TypedField {
        namespace: field.namespace().to_owned(),
        key: field.key.clone(),
        field_type,
        value,
    })
}

/// Render a JSON value as the plain string a form would have submitted.
///
/// `null` becomes the empty string, numbers use their shortest decimal form,
/// arrays join their rendered items with `,` and objects are emitted as
/// compact JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_f64() {
                n.as_f64().map_or_else(|| n.to_string(), format_number)
            } else {
                n.to_string()
            }
        }
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Parse a date or instant and return its UTC calendar date.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc).date_naive());
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Some(naive.and_utc().date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|instant| instant.with_timezone(&Utc).date_naive())
}

/// Coerce a decimal with either `.` or `,` as separator.
///
/// Only plain decimal notation (with optional exponent) is read; hex and
/// other radix prefixes fall back to `"0"`. Output never uses exponent
/// notation.
fn coerce_decimal(raw: &str) -> String {
    let normalized = raw.trim().replacen(',', ".", 1);

    // A blank submission counts as zero
    if normalized.is_empty() {
        return "0".to_string();
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map_or_else(|| "0".to_string(), format_number)
}

/// Shortest round-trip form of a finite number, without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0.0
        return "0".to_string();
    }
    n.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(field: RawField) -> TypedField {
        transform_field(&field).unwrap()
    }

    #[test]
    fn test_decimal_with_comma() {
        let out = transform_fields(&[RawField::new("pet_weight_kg", "12,5")]).unwrap();
        assert_eq!(
            out,
            vec![TypedField {
                namespace: "profile".to_string(),
                key: "pet_weight_kg".to_string(),
                field_type: MetafieldType::NumberDecimal,
                value: "12.5".to_string(),
            }]
        );
    }

    #[test]
    fn test_decimal_not_a_number() {
        assert_eq!(typed(RawField::new("pet_weight_kg", "not-a-number")).value, "0");
    }

    #[test]
    fn test_decimal_variants() {
        assert_eq!(typed(RawField::new("pet_age_years", "3")).value, "3");
        assert_eq!(typed(RawField::new("pet_age_years", " 4.50 ")).value, "4.5");
        assert_eq!(typed(RawField::new("pet_age_years", "70.0")).value, "70");
        assert_eq!(typed(RawField::new("pet_age_years", "")).value, "0");
        assert_eq!(typed(RawField::new("pet_age_years", "-0")).value, "0");
        assert_eq!(typed(RawField::new("pet_age_years", "1e3")).value, "1000");
        assert_eq!(typed(RawField::new("pet_age_years", "inf")).value, "0");
        assert_eq!(typed(RawField::new("pet_age_years", "NaN")).value, "0");
        // Only the first comma is treated as a separator
        assert_eq!(typed(RawField::new("pet_age_years", "1,2,3")).value, "0");
    }

    #[test]
    fn test_decimal_notation_limits() {
        assert_eq!(typed(RawField::new("pet_weight_kg", "0x10")).value, "0");
        assert_eq!(
            typed(RawField::new("pet_weight_kg", "1e21")).value,
            "1000000000000000000000"
        );
        assert_eq!(typed(RawField::new("pet_weight_kg", "1e-7")).value, "0.0000001");
    }

    #[test]
    fn test_decimal_from_json_number() {
        assert_eq!(typed(RawField::new("pet_weight_kg", json!(12.5))).value, "12.5");
        assert_eq!(typed(RawField::new("pet_weight_kg", json!(7))).value, "7");
        assert_eq!(typed(RawField::new("pet_weight_kg", Value::Null)).value, "0");
        assert_eq!(typed(RawField::new("pet_weight_kg", json!(true))).value, "0");
    }

    #[test]
    fn test_date_from_instant() {
        let out = typed(RawField::new("pet_date_of_birth", "2020-03-15T10:00:00Z"));
        assert_eq!(out.field_type, MetafieldType::Date);
        assert_eq!(out.value, "2020-03-15");
        assert_eq!(out.namespace, "profile");
    }

    #[test]
    fn test_date_uses_utc_calendar_day() {
        // 23:30 at -05:00 is already the next day in UTC
        let out = typed(RawField::new("pet_date_of_birth", "2020-03-15T23:30:00-05:00"));
        assert_eq!(out.value, "2020-03-16");
    }

    #[test]
    fn test_date_plain_and_naive_forms() {
        assert_eq!(typed(RawField::new("pet_date_of_birth", "2021-12-01")).value, "2021-12-01");
        assert_eq!(
            typed(RawField::new("pet_date_of_birth", "2021-12-01T08:15")).value,
            "2021-12-01"
        );
        assert_eq!(
            typed(RawField::new("pet_date_of_birth", "2021-12-01 08:15:00")).value,
            "2021-12-01"
        );
        assert_eq!(
            typed(RawField::new("pet_date_of_birth", "Wed, 01 Dec 2021 08:15:00 +0000")).value,
            "2021-12-01"
        );
    }

    #[test]
    fn test_invalid_date_fails_batch() {
        let fields = [
            RawField::new("pet_name", "Biscuit"),
            RawField::new("pet_date_of_birth", "last spring"),
        ];
        let err = transform_fields(&fields).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidDate {
                key: "pet_date_of_birth".to_string(),
                value: "last spring".to_string(),
            }
        );
        assert_eq!(err.to_string(), "invalid date for pet_date_of_birth: \"last spring\"");
    }

    #[test]
    fn test_null_date_fails() {
        assert!(transform_field(&RawField::new("pet_date_of_birth", Value::Null)).is_err());
    }

    #[test]
    fn test_text_default_namespace() {
        let out = typed(RawField::new("favorite_toy", "ball"));
        assert_eq!(out.namespace, "profile");
        assert_eq!(out.field_type, MetafieldType::SingleLineTextField);
        assert_eq!(out.value, "ball");
    }

    #[test]
    fn test_text_stringification() {
        assert_eq!(typed(RawField::new("nickname", Value::Null)).value, "");
        assert_eq!(typed(RawField::new("indoor", json!(false))).value, "false");
        assert_eq!(typed(RawField::new("litter_size", json!(4))).value, "4");
        assert_eq!(typed(RawField::new("tags", json!(["a", "b"]))).value, "a,b");
        assert_eq!(typed(RawField::new("tags", json!([1, [2, 3], null]))).value, "1,2,3,");
        assert_eq!(typed(RawField::new("collar", json!({"size": "M"}))).value, "{\"size\":\"M\"}");
    }

    #[test]
    fn test_explicit_namespace_kept() {
        let out = typed(RawField::new("pet_weight_kg", "8").with_namespace("mycopet"));
        assert_eq!(out.namespace, "mycopet");
    }

    #[test]
    fn test_order_preserved() {
        let fields = [
            RawField::new("favorite_toy", "ball"),
            RawField::new("pet_weight_kg", "3,2"),
            RawField::new("pet_date_of_birth", "2019-06-01"),
        ];
        let keys: Vec<_> = transform_fields(&fields)
            .unwrap()
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, ["favorite_toy", "pet_weight_kg", "pet_date_of_birth"]);
    }

    #[test]
    fn test_deterministic() {
        let fields = [RawField::new("pet_weight_kg", "12,5")];
        assert_eq!(transform_fields(&fields), transform_fields(&fields));
    }
}
