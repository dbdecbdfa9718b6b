//! Generic table browser and editor over a relational database.
//!
//! `sqlgrid` discovers tables and their structure at runtime and offers
//! create/read/update/delete on any of them through metadata alone, plus a
//! free-form query console. Field values travel as text and are coerced to
//! typed values from the column's declared type before any SQL is built.
//! MySQL and SQLite are supported through `sqlx`.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use sqlgrid::{ConnectParams, ConnectionProvider, MySqlDriver, Result, TableEditor};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut provider = ConnectionProvider::<MySqlDriver>::new();
//!     let params = ConnectParams::parse("localhost:3306/bank")?
//!         .with_credentials("app", "password");
//!     let session = provider.connect(&params).await?;
//!
//!     let editor = TableEditor::new(session);
//!     for table in editor.list_tables().await?.tables {
//!         println!("{}", table);
//!     }
//!
//!     let mut fields = HashMap::new();
//!     fields.insert("first_name".to_string(), "Ada".to_string());
//!     fields.insert("email".to_string(), "ada@example.com".to_string());
//!     editor.create("CardHolders", &fields).await?;
//!
//!     let view = editor.load_all_rows("CardHolders").await?;
//!     for row in &view {
//!         println!("{:?}", row.values());
//!     }
//!
//!     provider.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod config;
pub mod crud;
pub mod driver;
pub mod error;
pub mod materialize;
pub mod query;
pub mod schema;
pub mod session;
pub mod statement;
pub mod types;

// Re-export main types
pub use config::{Backend, ConnectParams};
pub use crud::{render_record, FieldValues, TableEditor};
pub use driver::{Dialect, Driver, MySqlDriver, SqliteDriver};
pub use error::{Error, Result};
pub use materialize::{ExecuteOutcome, ResultSetView};
pub use query::QueryRunner;
pub use schema::{SkippedTable, TableListing};
pub use session::{ConnectionProvider, Session};
pub use statement::{classify, StatementKind, StatementPlan};
pub use types::{ColumnInfo, ColumnMetadata, Record, ResultColumn, SqlType, TableMetadata, Value};
