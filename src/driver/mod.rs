//! Database client seam.
//!
//! The engine never talks to a database directly. It goes through a
//! [`Driver`], which exposes catalog lookups plus `query`/`execute` with
//! bound parameters. Two implementations ship with the crate, both on `sqlx`:
//! [`MySqlDriver`] and [`SqliteDriver`].

mod mysql;
mod sqlite;
#[cfg(test)]
pub(crate) mod fake;

pub use mysql::MySqlDriver;
pub use sqlite::SqliteDriver;

use crate::config::{Backend, ConnectParams};
use crate::error::Result;
use crate::types::Value;
use std::future::Future;

/// SQL flavour of a driver: identifier quoting and system-table naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Name prefixes of internal tables hidden from table listings.
    pub fn system_table_prefixes(&self) -> &'static [&'static str] {
        match self {
            Dialect::MySql => &["sys_", "mysql_"],
            Dialect::Sqlite => &["sqlite_"],
        }
    }

    /// Whether `table` is an internal table by naming convention.
    pub fn is_system_table(&self, table: &str) -> bool {
        let lower = table.to_ascii_lowercase();
        self.system_table_prefixes()
            .iter()
            .any(|prefix| lower.starts_with(prefix))
    }
}

/// Column description straight from the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeColumn {
    /// Column name.
    pub name: String,
    /// Native type name (e.g. `varchar(45)`, `INTEGER`).
    pub type_name: String,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Part of the primary-key constraint.
    pub primary_key: bool,
    /// Value assigned by the database (identity / auto-increment / rowid alias).
    pub auto_increment: bool,
}

/// Projected column of a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorColumn {
    /// Column label in projection order.
    pub name: String,
    /// Native type name reported by the cursor (may be empty or `NULL` for
    /// expressions whose type the database does not declare).
    pub type_name: String,
}

/// Fully fetched cursor: columns in projection order plus row values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeRows {
    pub columns: Vec<CursorColumn>,
    pub rows: Vec<Vec<Value>>,
}

/// A live connection to one database.
///
/// Implementations hold exactly one underlying connection; callers serialize
/// access (see [`crate::session::Session`]).
pub trait Driver: Send + Sized {
    /// Backend whose connection parameters this driver accepts.
    const BACKEND: Backend;

    /// Open a connection to the target described by `params`.
    fn connect(params: &ConnectParams) -> impl Future<Output = Result<Self>> + Send;

    /// SQL flavour of this connection.
    fn dialect(&self) -> Dialect;

    /// Names of all base tables in the connected schema, sorted.
    fn table_names(&mut self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Columns of `table` in ordinal order. Empty when the table does not exist.
    fn columns(&mut self, table: &str) -> impl Future<Output = Result<Vec<NativeColumn>>> + Send;

    /// Run a row-producing statement and fetch every row.
    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<NativeRows>> + Send;

    /// Run a statement and return the number of rows it affected.
    fn execute(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send;

    /// Close the connection.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}
