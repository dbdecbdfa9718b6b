//! Schema Introspector: table listings and table structure from the catalog.

use tracing::warn;

use crate::driver::{Driver, NativeColumn};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::statement::StatementBuilder;
use crate::types::{ColumnMetadata, SqlType, TableMetadata};

/// A table left out of a listing because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    pub name: String,
    pub reason: String,
}

/// Readable user tables of the connected schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableListing {
    /// Table names, sorted.
    pub tables: Vec<String>,
    /// Tables the catalog lists but a zero-row probe could not read.
    pub skipped: Vec<SkippedTable>,
}

/// List the readable user tables.
///
/// System tables (by the dialect's name prefixes) are dropped silently. Every
/// other table is probed with a zero-row projection; a failing probe excludes
/// the table, logs a warning, and is recorded in [`TableListing::skipped`]
/// without aborting the listing.
pub async fn list_tables<D: Driver>(session: &Session<D>) -> Result<TableListing> {
    let dialect = session.dialect();
    let builder = StatementBuilder::new(dialect);

    let mut names = session.table_names().await.map_err(into_metadata_error)?;
    names.sort();

    let mut listing = TableListing::default();
    for name in names {
        if dialect.is_system_table(&name) {
            continue;
        }
        match session.query(&builder.probe(&name), &[]).await {
            Ok(_) => listing.tables.push(name),
            Err(Error::NotConnected) => return Err(Error::NotConnected),
            Err(e) => {
                warn!(table = %name, error = %e, "skipping unreadable table");
                listing.skipped.push(SkippedTable {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(listing)
}

/// Describe `table`: ordered columns, semantic types, and its primary key.
///
/// The key comes from the catalog's key constraint. A composite key cannot be
/// addressed by a single value, so such a table is reported without a
/// primary key (a warning is logged); update and delete then refuse it.
pub async fn describe_table<D: Driver>(session: &Session<D>, table: &str) -> Result<TableMetadata> {
    let native = session.columns(table).await.map_err(into_metadata_error)?;
    if native.is_empty() {
        return Err(Error::TableNotFound {
            table: table.to_string(),
        });
    }

    let key_count = native.iter().filter(|c| c.primary_key).count();
    if key_count > 1 {
        warn!(table, key_columns = key_count, "composite primary key; rows are read-only by key");
    }
    let single_key = key_count == 1;

    let columns = native
        .into_iter()
        .map(|c| column_metadata(c, single_key))
        .collect();
    Ok(TableMetadata::new(table, columns))
}

fn column_metadata(native: NativeColumn, single_key: bool) -> ColumnMetadata {
    let is_primary_key = native.primary_key && single_key;
    ColumnMetadata {
        sql_type: SqlType::from_native(&native.type_name),
        name: native.name,
        native_type: native.type_name,
        nullable: native.nullable && !is_primary_key,
        is_primary_key,
        is_auto_generated: is_primary_key && native.auto_increment,
    }
}

/// Catalog lookups report `MetadataUnavailable`; session-level errors pass through.
fn into_metadata_error(err: Error) -> Error {
    match err {
        Error::ExecutionFailed { message } => Error::MetadataUnavailable { message },
        other => other,
    }
}
