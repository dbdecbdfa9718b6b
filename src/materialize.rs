//! Result Materializer: drained cursors to uniform tabular views.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::coerce::{parse_date, parse_datetime};
use crate::driver::NativeRows;
use crate::types::{ColumnInfo, Record, ResultColumn, SqlType, TableMetadata, Value};

/// Columns and rows of one executed query.
///
/// Every execution produces a fresh view; a refresh replaces the old view
/// rather than mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSetView {
    columns: Arc<ColumnInfo>,
    rows: Vec<Record>,
}

impl ResultSetView {
    /// Get column definitions, in projection order.
    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns.columns
    }

    /// Get column names, in projection order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.column_names()
    }

    /// Get the rows.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter()
    }

    /// The first column of the first row, for single-value queries.
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get(0))
    }
}

impl IntoIterator for ResultSetView {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSetView {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Outcome of executing one ad-hoc statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    /// A read: the full result set.
    Rows(ResultSetView),
    /// A write: rows affected as reported by the database.
    Affected(u64),
}

impl ExecuteOutcome {
    /// The result set, if this was a read.
    pub fn rows(&self) -> Option<&ResultSetView> {
        match self {
            ExecuteOutcome::Rows(view) => Some(view),
            ExecuteOutcome::Affected(_) => None,
        }
    }

    /// The affected-row count, if this was a write.
    pub fn affected(&self) -> Option<u64> {
        match self {
            ExecuteOutcome::Rows(_) => None,
            ExecuteOutcome::Affected(n) => Some(*n),
        }
    }
}

/// Turn a drained cursor into a view.
///
/// Columns keep the cursor's order and labels, duplicates included; each row
/// value lands in the slot of its column.
pub fn materialize(native: NativeRows) -> ResultSetView {
    let columns: Vec<ResultColumn> = native
        .columns
        .into_iter()
        .map(|c| ResultColumn {
            sql_type: SqlType::from_native(&c.type_name),
            name: c.name,
            native_type: c.type_name,
        })
        .collect();
    let types: Vec<SqlType> = columns.iter().map(|c| c.sql_type).collect();
    let info = Arc::new(ColumnInfo::new(columns));

    let rows = native
        .rows
        .into_iter()
        .map(|values| {
            let values = values
                .into_iter()
                .zip(types.iter())
                .map(|(value, sql_type)| conform(value, *sql_type))
                .collect();
            Record::new(values, Arc::clone(&info))
        })
        .collect();

    ResultSetView { columns: info, rows }
}

/// Turn a drained cursor over one table into a view.
///
/// Some drivers report no usable type for declared columns (SQLite gives
/// `NULL` for `NUMERIC` and `DECIMAL(p,s)`). Such columns take the catalog's
/// declared type before values are conformed.
pub fn materialize_table(mut native: NativeRows, meta: &TableMetadata) -> ResultSetView {
    for column in &mut native.columns {
        if SqlType::from_native(&column.type_name) != SqlType::Other {
            continue;
        }
        if let Some(declared) = meta.column(&column.name) {
            column.type_name = declared.native_type.clone();
        }
    }
    materialize(native)
}

/// Bring a loosely stored value in line with its column's declared type.
///
/// Only lossless reinterpretations happen; anything else is kept as stored.
fn conform(value: Value, sql_type: SqlType) -> Value {
    match (value, sql_type) {
        (Value::Integer(i), SqlType::Boolean) if i == 0 || i == 1 => Value::Boolean(i == 1),
        (Value::Integer(i), SqlType::Decimal) => Value::Decimal(Decimal::from(i)),
        (Value::Text(s), SqlType::Date) => match parse_date(&s) {
            Some(d) => Value::Date(d),
            None => Value::Text(s),
        },
        (Value::Text(s), SqlType::DateTime) => match parse_datetime(&s) {
            Some(dt) => Value::DateTime(dt),
            None => Value::Text(s),
        },
        (value, _) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CursorColumn;
    use crate::types::ColumnMetadata;
    use chrono::NaiveDate;

    fn column(name: &str, type_name: &str) -> CursorColumn {
        CursorColumn {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    #[test]
    fn test_materialize_keeps_order_and_duplicates() {
        let view = materialize(NativeRows {
            columns: vec![column("card_type", "VARCHAR"), column("n", "BIGINT"), column("n", "BIGINT")],
            rows: vec![
                vec![Value::from("VISA"), Value::Integer(3), Value::Integer(30)],
                vec![Value::from("AMEX"), Value::Integer(1), Value::Integer(10)],
            ],
        });

        assert_eq!(view.column_names(), vec!["card_type", "n", "n"]);
        assert_eq!(view.columns()[1].sql_type, SqlType::Integer);
        assert_eq!(view.len(), 2);
        assert_eq!(view.rows()[1].get(2), Some(&Value::Integer(10)));
        assert_eq!(view.scalar(), Some(&Value::from("VISA")));
    }

    #[test]
    fn test_materialize_empty_cursor_keeps_columns() {
        let view = materialize(NativeRows {
            columns: vec![column("id", "INTEGER")],
            rows: vec![],
        });
        assert!(view.is_empty());
        assert_eq!(view.column_names(), vec!["id"]);
        assert_eq!(view.scalar(), None);
    }

    #[test]
    fn test_conform_loose_storage() {
        let view = materialize(NativeRows {
            columns: vec![
                column("active", "BOOLEAN"),
                column("opened", "DATE"),
                column("limit", "DECIMAL(10,2)"),
                column("at", "DATETIME"),
                column("flag", "BOOLEAN"),
            ],
            rows: vec![vec![
                Value::Integer(1),
                Value::from("2024-03-01"),
                Value::Integer(1500),
                Value::from("not a time"),
                Value::Integer(7),
            ]],
        });
        let row = &view.rows()[0];
        assert_eq!(row.get(0), Some(&Value::Boolean(true)));
        assert_eq!(
            row.get(1),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );
        assert_eq!(row.get(2), Some(&Value::Decimal(Decimal::from(1500))));
        assert_eq!(row.get(3), Some(&Value::from("not a time")));
        assert_eq!(row.get(4), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_materialize_table_uses_declared_types() {
        let meta = TableMetadata::new(
            "Card",
            vec![
                ColumnMetadata::new("card_id", "INTEGER").primary_key(true),
                ColumnMetadata::new("credit_limit", "NUMERIC"),
                ColumnMetadata::new("amt", "DECIMAL(10,2)"),
                ColumnMetadata::new("note", "TEXT"),
            ],
        );
        let view = materialize_table(
            NativeRows {
                columns: vec![
                    column("card_id", "INTEGER"),
                    column("credit_limit", "NULL"),
                    column("amt", "NULL"),
                    column("note", "TEXT"),
                    column("n", "NULL"),
                ],
                rows: vec![vec![
                    Value::Integer(1),
                    Value::Integer(1500),
                    Value::Integer(20),
                    Value::from("x"),
                    Value::Integer(3),
                ]],
            },
            &meta,
        );

        assert_eq!(view.columns()[1].sql_type, SqlType::Decimal);
        assert_eq!(view.columns()[2].native_type, "DECIMAL(10,2)");
        assert_eq!(view.columns()[4].sql_type, SqlType::Other);
        let row = &view.rows()[0];
        assert_eq!(row.get(1), Some(&Value::Decimal(Decimal::from(1500))));
        assert_eq!(row.get(2), Some(&Value::Decimal(Decimal::from(20))));
        assert_eq!(row.get(4), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = ExecuteOutcome::Affected(3);
        assert_eq!(outcome.affected(), Some(3));
        assert!(outcome.rows().is_none());
    }
}
