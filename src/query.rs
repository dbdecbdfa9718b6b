//! Ad-hoc Query Façade.
//!
//! Free-form SQL is sent to the database as written. Unlike the CRUD path
//! nothing here is parameterized: whoever supplies the text owns what it
//! does, injection included.

use std::sync::Arc;

use tracing::debug;

use crate::driver::Driver;
use crate::error::Result;
use crate::materialize::{materialize, ExecuteOutcome};
use crate::session::Session;
use crate::statement::{classify, StatementKind};

/// Execute `raw_sql` and report rows (reads) or an affected count (writes).
///
/// Errors are returned as the database reported them, with no retry and no
/// partial result.
pub async fn execute<D: Driver>(session: &Session<D>, raw_sql: &str) -> Result<ExecuteOutcome> {
    let kind = classify(raw_sql)?;
    debug!(?kind, "ad-hoc statement");
    match kind {
        StatementKind::Select => {
            let native = session.query(raw_sql, &[]).await?;
            Ok(ExecuteOutcome::Rows(materialize(native)))
        }
        _ => {
            let affected = session.execute(raw_sql, &[]).await?;
            Ok(ExecuteOutcome::Affected(affected))
        }
    }
}

/// Entry point for a free-form query console.
///
/// # Example
///
/// ```no_run
/// use sqlgrid::{ConnectParams, ConnectionProvider, ExecuteOutcome, QueryRunner, SqliteDriver};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut provider = ConnectionProvider::<SqliteDriver>::new();
///     let session = provider.connect(&ConnectParams::sqlite("bank.db")).await?;
///     let runner = QueryRunner::new(session);
///
///     match runner.execute("SELECT card_type, COUNT(*) AS n FROM Card GROUP BY card_type").await? {
///         ExecuteOutcome::Rows(view) => {
///             println!("{:?}", view.column_names());
///             for row in &view {
///                 println!("{:?}", row.values());
///             }
///         }
///         ExecuteOutcome::Affected(n) => println!("{} rows affected", n),
///     }
///     Ok(())
/// }
/// ```
pub struct QueryRunner<D: Driver> {
    session: Arc<Session<D>>,
}

impl<D: Driver> QueryRunner<D> {
    pub fn new(session: Arc<Session<D>>) -> Self {
        Self { session }
    }

    /// Execute one statement. See [`execute`].
    pub async fn execute(&self, raw_sql: &str) -> Result<ExecuteOutcome> {
        execute(&self.session, raw_sql).await
    }
}
