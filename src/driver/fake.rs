//! In-process driver for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{CursorColumn, Dialect, Driver, NativeColumn, NativeRows};
use crate::config::{Backend, ConnectParams};
use crate::error::{Error, Result};
use crate::types::Value;

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<NativeColumn>,
    pub rows: Vec<Vec<Value>>,
    pub unreadable: bool,
}

impl FakeTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            unreadable: false,
        }
    }

    pub fn column(mut self, name: &str, type_name: &str, primary_key: bool, auto_increment: bool) -> Self {
        self.columns.push(NativeColumn {
            name: name.to_string(),
            type_name: type_name.to_string(),
            nullable: !primary_key,
            primary_key,
            auto_increment,
        });
        self
    }

    pub fn not_null(mut self) -> Self {
        if let Some(last) = self.columns.last_mut() {
            last.nullable = false;
        }
        self
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

/// Statements the fake saw: `(sql, params)`.
pub type StatementLog = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

pub struct FakeDriver {
    dialect: Dialect,
    tables: Vec<FakeTable>,
    log: StatementLog,
    affected: u64,
    execute_error: Option<String>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeDriver {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
            log: Arc::default(),
            affected: 1,
            execute_error: None,
            delay: None,
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }

    pub fn with_table(mut self, table: FakeTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn with_execute_error(mut self, message: &str) -> Self {
        self.execute_error = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn log(&self) -> StatementLog {
        Arc::clone(&self.log)
    }

    pub fn max_in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_in_flight)
    }

    fn table_in(&self, sql: &str) -> Option<&FakeTable> {
        self.tables
            .iter()
            .find(|t| sql.contains(&self.dialect.quote_ident(&t.name)))
    }

    async fn enter(&self, sql: &str, params: &[Value]) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut log) = self.log.lock() {
            log.push((sql.to_string(), params.to_vec()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Driver for FakeDriver {
    const BACKEND: Backend = Backend::MySql;

    async fn connect(params: &ConnectParams) -> Result<Self> {
        match params.host.as_str() {
            "down" => Err(Error::ConnectionFailed {
                target: params.target(),
                message: "connection refused".to_string(),
            }),
            "hang" => futures::future::pending().await,
            _ => Ok(Self::new(Dialect::Sqlite)),
        }
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<NativeColumn>> {
        Ok(self
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<NativeRows> {
        self.enter(sql, params).await;
        let table = self
            .table_in(sql)
            .filter(|t| !t.unreadable)
            .ok_or_else(|| Error::execution("no such table"))?;
        let columns = table
            .columns
            .iter()
            .map(|c| CursorColumn {
                name: c.name.clone(),
                type_name: c.type_name.clone(),
            })
            .collect();
        let rows = if sql.contains("1 = 0") {
            Vec::new()
        } else {
            table.rows.clone()
        };
        Ok(NativeRows { columns, rows })
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.enter(sql, params).await;
        match &self.execute_error {
            Some(message) => Err(Error::execution(message.clone())),
            None => Ok(self.affected),
        }
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
