//! Connection Provider and the shared `Session`.
//!
//! A [`Session`] owns one [`Driver`] behind an async mutex, which makes it a
//! single-slot queue: one statement or catalog lookup is in flight at a time,
//! and concurrent callers (a periodic refresh and a user edit, say) wait
//! their turn instead of interleaving on the same connection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ConnectParams;
use crate::driver::{Dialect, Driver, NativeColumn, NativeRows};
use crate::error::{Error, Result};
use crate::statement::StatementPlan;
use crate::types::Value;

/// A live database session shared by every engine component.
pub struct Session<D: Driver> {
    /// `None` once the session has been closed.
    driver: Mutex<Option<D>>,
    dialect: Dialect,
    target: String,
    query_timeout: Option<Duration>,
}

impl<D: Driver> Session<D> {
    /// Wrap an already-open driver.
    pub fn new(driver: D, target: impl Into<String>, query_timeout: Option<Duration>) -> Self {
        Self {
            dialect: driver.dialect(),
            driver: Mutex::new(Some(driver)),
            target: target.into(),
            query_timeout,
        }
    }

    /// SQL flavour of the underlying connection.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Connection target, for display.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Per-statement deadline, if configured.
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Whether the session can still run statements.
    pub async fn is_open(&self) -> bool {
        self.driver.lock().await.is_some()
    }

    /// Bound `fut` by the configured deadline.
    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| Error::QueryTimeout { timeout })?,
            None => fut.await,
        }
    }

    /// Base table names from the catalog.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let mut guard = self.driver.lock().await;
        let driver = guard.as_mut().ok_or(Error::NotConnected)?;
        self.deadline(driver.table_names()).await
    }

    /// Catalog columns of `table`.
    pub async fn columns(&self, table: &str) -> Result<Vec<NativeColumn>> {
        let mut guard = self.driver.lock().await;
        let driver = guard.as_mut().ok_or(Error::NotConnected)?;
        self.deadline(driver.columns(table)).await
    }

    /// Run a row-producing statement.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<NativeRows> {
        let mut guard = self.driver.lock().await;
        let driver = guard.as_mut().ok_or(Error::NotConnected)?;
        debug!(sql, params = params.len(), "query");
        self.deadline(driver.query(sql, params)).await
    }

    /// Run a statement for its affected-row count.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut guard = self.driver.lock().await;
        let driver = guard.as_mut().ok_or(Error::NotConnected)?;
        debug!(sql, params = params.len(), "execute");
        self.deadline(driver.execute(sql, params)).await
    }

    /// Execute a write plan once, consuming it.
    pub async fn run(&self, plan: StatementPlan) -> Result<u64> {
        debug!(kind = ?plan.kind, "running statement plan");
        self.execute(&plan.sql, &plan.params).await
    }

    /// Close the underlying connection. Idempotent.
    pub async fn close(&self) -> Result<()> {
        let driver = self.driver.lock().await.take();
        match driver {
            Some(driver) => {
                info!(db = %self.target, "closing database session");
                driver.close().await
            }
            None => Ok(()),
        }
    }
}

/// Holds the one live session of the process.
///
/// Components receive the session explicitly (`Arc<Session<D>>`) rather than
/// reaching for a global, so tests can substitute a fake driver.
pub struct ConnectionProvider<D: Driver> {
    session: Option<Arc<Session<D>>>,
}

impl<D: Driver> Default for ConnectionProvider<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Driver> ConnectionProvider<D> {
    /// Create a provider with no session.
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Open a session to `params`, closing any session already held.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sqlgrid::{ConnectParams, ConnectionProvider, MySqlDriver};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut provider = ConnectionProvider::<MySqlDriver>::new();
    ///     let params = ConnectParams::parse("localhost:3306/bank")?
    ///         .with_credentials("app", "password");
    ///     let session = provider.connect(&params).await?;
    ///     println!("connected to {}", session.target());
    ///     provider.disconnect().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(&mut self, params: &ConnectParams) -> Result<Arc<Session<D>>> {
        if params.backend != D::BACKEND {
            return Err(Error::InvalidConnectString {
                message: format!(
                    "{:?} parameters cannot open a {:?} session",
                    params.backend,
                    D::BACKEND
                ),
            });
        }
        self.disconnect().await?;

        let target = params.target();
        let driver = tokio::time::timeout(params.connect_timeout, D::connect(params))
            .await
            .map_err(|_| Error::ConnectionFailed {
                target: target.clone(),
                message: format!("timed out after {:?}", params.connect_timeout),
            })??;

        info!(db = %target, "database session opened");
        self.attach(Session::new(driver, target, params.query_timeout))
            .await
    }

    /// Install an already-built session, closing any session already held.
    pub async fn attach(&mut self, session: Session<D>) -> Result<Arc<Session<D>>> {
        self.disconnect().await?;
        let session = Arc::new(session);
        self.session = Some(Arc::clone(&session));
        Ok(session)
    }

    /// The live session, or `NotConnected`.
    pub fn current_session(&self) -> Result<Arc<Session<D>>> {
        self.session.clone().ok_or(Error::NotConnected)
    }

    /// Release the session. Idempotent; outstanding `Arc<Session>` handles
    /// fail with `NotConnected` afterwards.
    pub async fn disconnect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}
