//! Record type: one row of a result set.

use std::sync::Arc;

use super::column::{ColumnInfo, ResultColumn};
use super::value::Value;

/// An immutable snapshot of one row, aligned to its result set's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Column values, positionally aligned with `column_info`.
    values: Vec<Value>,
    /// Shared column information (reference counted).
    column_info: Arc<ColumnInfo>,
}

impl Record {
    /// Create a new record with values and shared column info.
    pub fn new(values: Vec<Value>, column_info: Arc<ColumnInfo>) -> Self {
        Self {
            values,
            column_info,
        }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get value by column name (case-insensitive, first match).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.column_info
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get column information.
    pub fn columns(&self) -> &[ResultColumn] {
        &self.column_info.columns
    }

    /// Iterate `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.column_info
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }
}

impl IntoIterator for Record {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn make_test_column_info() -> Arc<ColumnInfo> {
        Arc::new(ColumnInfo::new(vec![
            ResultColumn {
                name: "first_name".to_string(),
                sql_type: SqlType::Text,
                native_type: "VARCHAR".to_string(),
            },
            ResultColumn {
                name: "cardholder_id".to_string(),
                sql_type: SqlType::Integer,
                native_type: "INT".to_string(),
            },
        ]))
    }

    #[test]
    fn test_record_access() {
        let record = Record::new(
            vec![Value::Text("Ada".to_string()), Value::Integer(7)],
            make_test_column_info(),
        );

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(0), Some(&Value::Text("Ada".to_string())));
        assert_eq!(record.get_by_name("CARDHOLDER_ID"), Some(&Value::Integer(7)));
        assert_eq!(record.get_by_name("phone"), None);
        assert_eq!(record.get(2), None);
    }

    #[test]
    fn test_record_iter_pairs() {
        let record = Record::new(
            vec![Value::Text("Ada".to_string()), Value::Null],
            make_test_column_info(),
        );
        let pairs: Vec<(&str, &Value)> = record.iter().collect();
        assert_eq!(pairs[0], ("first_name", &Value::Text("Ada".to_string())));
        assert_eq!(pairs[1], ("cardholder_id", &Value::Null));
        assert_eq!(record.columns()[1].name, "cardholder_id");
    }
}
