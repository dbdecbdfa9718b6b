//! Table and result-set column descriptions.

use super::sql_type::SqlType;

/// One column of a table, as reported by the schema introspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub sql_type: SqlType,
    /// Database native type name, as reported by the catalog.
    pub native_type: String,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Whether this is the table's (single) primary-key column.
    pub is_primary_key: bool,
    /// Identity / auto-increment key whose value the database assigns.
    pub is_auto_generated: bool,
}

impl ColumnMetadata {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        let native_type = native_type.into();
        Self {
            name: name.into(),
            sql_type: SqlType::from_native(&native_type),
            native_type,
            nullable: true,
            is_primary_key: false,
            is_auto_generated: false,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as the primary key, optionally database-assigned.
    pub fn primary_key(mut self, auto_generated: bool) -> Self {
        self.is_primary_key = true;
        self.is_auto_generated = auto_generated;
        self.nullable = false;
        self
    }
}

/// Structure of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnMetadata>,
    /// Name of the single primary-key column, if the table has one.
    pub primary_key: Option<String>,
}

impl TableMetadata {
    /// Build table metadata, deriving `primary_key` from the column flags.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        let primary_key = columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.clone());
        Self {
            name: name.into(),
            columns,
            primary_key,
        }
    }

    /// Find a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary-key column, if any.
    pub fn primary_key_column(&self) -> Option<&ColumnMetadata> {
        self.primary_key.as_deref().and_then(|pk| self.column(pk))
    }

    /// Column names in ordinal order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A column of a materialized result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Column label as projected (may repeat, may be an expression).
    pub name: String,
    /// Semantic type.
    pub sql_type: SqlType,
    /// Native type name reported by the cursor.
    pub native_type: String,
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<ResultColumn>,
}

impl ColumnInfo {
    /// Create new column info from columns.
    pub fn new(columns: Vec<ResultColumn>) -> Self {
        Self { columns }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&ResultColumn> {
        self.columns.get(index)
    }

    /// Find the first column index with this name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}
