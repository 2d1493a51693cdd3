// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Schema checks applied to every document before it is written.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde_json::Value;

/// Fields every indexed document must carry, in schema order
pub const REQUIRED_FIELDS: [&str; 4] = ["author", "document_type", "text", "date"];

/// Field holding the publication date
pub const DATE_FIELD: &str = "date";

/// chrono format matching the index's `yyyy-MM-dd` date mapping
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check a candidate record against the required-field schema and the date rule.
///
/// All absent fields are reported together. The date is only checked once
/// every required field is present.
pub fn validate(record: &Value) -> Result<(), ValidationError> {
    let fields = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|name| fields.get(**name).map_or(true, Value::is_null))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    fields.get(DATE_FIELD).map_or(Ok(()), validate_date)
}

fn validate_date(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::String(date) if is_strict_date(date) => Ok(()),
        Value::String(date) => Err(ValidationError::InvalidDateFormat(date.clone())),
        other => Err(ValidationError::InvalidDateFormat(other.to_string())),
    }
}

/// Exactly `YYYY-MM-DD`: ten ASCII characters, zero-padded month and day,
/// no surrounding whitespace or sign.
fn is_strict_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    shape_ok && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}
