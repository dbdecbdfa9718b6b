//! Value Coercer: user-entered text to typed values and back.
//!
//! `parse` and `render` are inverse for every type: `parse(render(v)) == v`
//! holds exactly for INTEGER, DECIMAL, TEXT, BOOLEAN, DATE and DATETIME.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{ColumnMetadata, SqlType, Value};

/// Canonical date pattern accepted and produced for DATE columns.
pub const DATE_PATTERN: &str = "YYYY-MM-DD";
/// Canonical pattern accepted and produced for DATETIME columns.
pub const DATETIME_PATTERN: &str = "YYYY-MM-DD HH:MM:SS";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATETIME_RENDER: &str = "%Y-%m-%d %H:%M:%S%.f";

const TRUTHY: [&str; 6] = ["true", "t", "yes", "y", "1", "on"];
const FALSY: [&str; 6] = ["false", "f", "no", "n", "0", "off"];

/// Parse `raw` for the column `field` of type `sql_type`.
///
/// Empty input is NULL when the column is nullable and `RequiredFieldMissing`
/// otherwise. Numeric, date and boolean input is trimmed first; text is taken
/// verbatim.
pub fn parse(field: &str, raw: &str, sql_type: SqlType, nullable: bool) -> Result<Value> {
    let blank = if sql_type.is_textual() {
        raw.is_empty()
    } else {
        raw.trim().is_empty()
    };
    if blank {
        return if nullable {
            Ok(Value::Null)
        } else {
            Err(Error::RequiredFieldMissing {
                field: field.to_string(),
            })
        };
    }

    let text = raw.trim();
    match sql_type {
        SqlType::Integer => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Error::invalid_format(field, "a whole number")),
        SqlType::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Value::Decimal)
            .map_err(|_| Error::invalid_format(field, "a decimal number")),
        SqlType::Date => parse_date(text)
            .map(Value::Date)
            .ok_or_else(|| Error::invalid_format(field, DATE_PATTERN)),
        SqlType::DateTime => parse_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| Error::invalid_format(field, DATETIME_PATTERN)),
        SqlType::Boolean => parse_bool(text)
            .map(Value::Boolean)
            .ok_or_else(|| Error::invalid_format(field, "true/false, yes/no or 1/0")),
        SqlType::Text | SqlType::Other => Ok(Value::Text(raw.to_string())),
    }
}

/// Parse `raw` for `column`, using its name, type and nullability.
pub fn parse_for(column: &ColumnMetadata, raw: &str) -> Result<Value> {
    parse(&column.name, raw, column.sql_type, column.nullable)
}

/// Render `value` as edit-field text for a column of type `sql_type`.
///
/// NULL renders as the empty string.
pub fn render(value: &Value, sql_type: SqlType) -> String {
    match (value, sql_type) {
        (Value::Null, _) => String::new(),
        (Value::Integer(i), SqlType::Boolean) => (*i != 0).to_string(),
        (Value::DateTime(dt), SqlType::Date) => dt.date().format(DATE_FORMAT).to_string(),
        (Value::Integer(i), _) => i.to_string(),
        (Value::Decimal(d), _) => d.to_string(),
        (Value::Text(s), _) => s.clone(),
        (Value::Date(d), _) => d.format(DATE_FORMAT).to_string(),
        (Value::DateTime(dt), _) => dt.format(DATETIME_RENDER).to_string(),
        (Value::Boolean(b), _) => b.to_string(),
        (Value::Bytes(bytes), _) => {
            let mut hex = String::with_capacity(2 + bytes.len() * 2);
            hex.push_str("0x");
            for b in bytes {
                hex.push_str(&format!("{:02x}", b));
            }
            hex
        }
    }
}

/// Strict `YYYY-MM-DD`: chrono alone would also take `2024-1-5`.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if text.len() < 19 {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn parse_bool(text: &str) -> Option<bool> {
    let token = text.to_ascii_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        Some(true)
    } else if FALSY.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}
