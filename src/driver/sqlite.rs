//! SQLite driver on `sqlx`.
//!
//! Catalog data comes from `sqlite_master` and `PRAGMA table_info`. A table
//! whose sole key column is declared exactly `INTEGER` aliases the rowid, so
//! SQLite assigns its value: that column is reported as auto-generated.

use futures::TryStreamExt;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::debug;

use super::{CursorColumn, Dialect, Driver, NativeColumn, NativeRows};
use crate::config::{Backend, ConnectParams};
use crate::error::{Error, Result};
use crate::types::Value;

/// A single SQLite connection.
pub struct SqliteDriver {
    conn: SqliteConnection,
}

impl SqliteDriver {
    fn connect_options(params: &ConnectParams) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
        if params.host == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            Ok(SqliteConnectOptions::new()
                .filename(&params.host)
                .create_if_missing(true))
        }
    }

    /// Bind one engine value as a SQLite parameter.
    fn bind_value<'q>(
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        value: &Value,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Integer(i) => query.bind(*i),
            // No native decimal storage class; REAL keeps numeric comparisons working.
            Value::Decimal(d) => match d.to_f64() {
                Some(f) => query.bind(f),
                None => query.bind(d.to_string()),
            },
            Value::Text(s) => query.bind(s.clone()),
            Value::Date(d) => query.bind(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => query.bind(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::Boolean(b) => query.bind(*b),
            Value::Bytes(b) => query.bind(b.clone()),
        }
    }

    /// Decode the value at `idx` by its storage class.
    ///
    /// SQLite is dynamically typed, so the declared column type says little
    /// about the stored value. Normalising to the declared semantic type is
    /// left to the result materializer.
    fn extract_value(row: &SqliteRow, idx: usize) -> Result<Value> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(Value::Null);
        }
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return Ok(Value::Integer(v));
        }
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return Ok(Decimal::from_f64(v)
                .map(Value::Decimal)
                .unwrap_or_else(|| Value::Text(v.to_string())));
        }
        if let Ok(v) = row.try_get::<String, _>(idx) {
            return Ok(Value::Text(v));
        }
        row.try_get::<Vec<u8>, _>(idx)
            .map(Value::Bytes)
            .map_err(Error::from)
    }
}

impl Driver for SqliteDriver {
    const BACKEND: Backend = Backend::Sqlite;

    async fn connect(params: &ConnectParams) -> Result<Self> {
        let failed = |e: sqlx::Error| Error::ConnectionFailed {
            target: params.target(),
            message: e.to_string(),
        };
        let opts = Self::connect_options(params).map_err(failed)?;
        let conn = SqliteConnection::connect_with(&opts).await.map_err(failed)?;
        Ok(Self { conn })
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&mut self.conn)
                .await
                .map_err(|e| Error::metadata(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<NativeColumn>> {
        // PRAGMA arguments cannot be bound; the name is quoted instead.
        let pragma = format!("PRAGMA table_info({})", Dialect::Sqlite.quote_ident(table));
        let rows: Vec<(i64, String, String, i64, Option<String>, i64)> = sqlx::query_as(&pragma)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata(e.to_string()))?;

        let key_count = rows.iter().filter(|row| row.5 > 0).count();
        Ok(rows
            .into_iter()
            .map(|(_cid, name, type_name, notnull, _default, pk)| {
                let primary_key = pk > 0;
                let auto_increment =
                    primary_key && key_count == 1 && type_name.eq_ignore_ascii_case("INTEGER");
                NativeColumn {
                    name,
                    type_name,
                    nullable: notnull == 0 && !primary_key,
                    primary_key,
                    auto_increment,
                }
            })
            .collect())
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<NativeRows> {
        let statement = (&mut self.conn).prepare(sql).await?;
        let columns: Vec<CursorColumn> = statement
            .columns()
            .iter()
            .map(|c| CursorColumn {
                name: c.name().to_string(),
                type_name: c.type_info().name().to_string(),
            })
            .collect();

        let query = params
            .iter()
            .fold(statement.query(), |q, value| Self::bind_value(q, value));

        let mut stream = query.fetch(&mut self.conn);
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            let values = (0..columns.len())
                .map(|idx| Self::extract_value(&row, idx))
                .collect::<Result<Vec<_>>>()?;
            rows.push(values);
        }
        debug!(columns = columns.len(), rows = rows.len(), "sqlite cursor drained");

        Ok(NativeRows { columns, rows })
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let result = params
            .iter()
            .fold(sqlx::query(sql), |q, value| Self::bind_value(q, value))
            .execute(&mut self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(Error::from)
    }
}
