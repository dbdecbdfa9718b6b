//! Closed set of semantic column types.
//!
//! Every native type name a database reports maps to exactly one variant.
//! Nullability is a column property, not a type property.

use std::fmt;

/// Semantic column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Whole numbers (`INT`, `BIGINT`, `SMALLINT`, ...).
    Integer,
    /// Exact or approximate fractional numbers (`DECIMAL`, `FLOAT`, `DOUBLE`, ...).
    Decimal,
    /// Character data (`VARCHAR`, `CHAR`, `TEXT`, ...).
    Text,
    /// Calendar date without time.
    Date,
    /// Date with time of day (`DATETIME`, `TIMESTAMP`).
    DateTime,
    /// Single-bit or boolean-like values.
    Boolean,
    /// Anything else. Edited as text.
    Other,
}

impl SqlType {
    /// Map a database native type name (e.g. `varchar(45)`, `BIGINT UNSIGNED`,
    /// `tinyint(1)`) to its semantic type.
    ///
    /// The match is by case-insensitive substring, checked in a fixed order so
    /// that e.g. `tinyint(1)` resolves to `Boolean` before the `int` rule fires
    /// and `datetime` resolves before `date`.
    pub fn from_native(type_name: &str) -> Self {
        let name = type_name.trim().to_ascii_lowercase();

        if name.contains("bool") || name == "bit" || name == "bit(1)" || name.starts_with("tinyint(1)") {
            return SqlType::Boolean;
        }
        if name.contains("int") {
            return SqlType::Integer;
        }
        if ["decimal", "numeric", "float", "double", "real"]
            .iter()
            .any(|t| name.contains(t))
        {
            return SqlType::Decimal;
        }
        if name.contains("datetime") || name.contains("timestamp") {
            return SqlType::DateTime;
        }
        if name.contains("date") {
            return SqlType::Date;
        }
        if ["char", "text", "clob", "string"].iter().any(|t| name.contains(t)) {
            return SqlType::Text;
        }
        SqlType::Other
    }

    /// Whether values of this type are edited as free text.
    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Text | SqlType::Other)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Integer => "INTEGER",
            SqlType::Decimal => "DECIMAL",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Other => "OTHER",
        };
        f.write_str(name)
    }
}
