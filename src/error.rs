//! Error types for the data-management engine.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The database could not be reached or refused the session.
    #[error("Connection to {target} failed: {message}")]
    ConnectionFailed { target: String, message: String },

    /// An operation was attempted before `connect` or after `disconnect`.
    #[error("Not connected to a database")]
    NotConnected,

    /// Catalog metadata could not be read.
    #[error("Metadata unavailable: {message}")]
    MetadataUnavailable { message: String },

    /// The named table does not exist (or has no visible columns).
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    /// A non-nullable field was left empty.
    #[error("Field '{field}' is required")]
    RequiredFieldMissing { field: String },

    /// Field text does not match the column's expected format.
    #[error("Invalid value for field '{field}': expected {expected}")]
    InvalidFormat { field: String, expected: String },

    /// Update or delete requested on a table without a single-column primary key.
    #[error("Table '{table}' has no primary key")]
    NoPrimaryKey { table: String },

    /// Insert would name no columns at all.
    #[error("No columns to insert into '{table}'")]
    NoColumnsToInsert { table: String },

    /// A field map names a column the table does not have.
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// The database rejected the statement. The message is the database's own.
    #[error("{message}")]
    ExecutionFailed { message: String },

    /// The statement did not complete within the configured deadline.
    #[error("Query timed out after {timeout:?}")]
    QueryTimeout { timeout: Duration },

    /// Blank SQL text was submitted for execution.
    #[error("Empty SQL statement")]
    EmptyStatement,

    /// Invalid connect string.
    #[error("Invalid connect string: {message}")]
    InvalidConnectString { message: String },
}

impl Error {
    /// Create an execution error carrying the database message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
        }
    }

    /// Create a metadata error.
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            message: message.into(),
        }
    }

    /// Create an invalid-format error for a field.
    pub fn invalid_format(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Map a driver error to `ExecutionFailed`, keeping the database's message.
///
/// `sqlx::Error::Database` wraps the server text; other variants are
/// reported through their display form.
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => Error::execution(db.message()),
            other => Error::execution(other.to_string()),
        }
    }
}
