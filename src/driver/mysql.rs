//! MySQL / MariaDB driver on `sqlx`.
//!
//! Catalog data comes from `information_schema` of the connected schema
//! (`DATABASE()`); the key flag is `COLUMN_KEY = 'PRI'` and identity columns are
//! recognised by `EXTRA` containing `auto_increment`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;

use super::{CursorColumn, Dialect, Driver, NativeColumn, NativeRows};
use crate::config::{Backend, ConnectParams};
use crate::error::{Error, Result};
use crate::types::{SqlType, Value};

/// A single MySQL connection.
pub struct MySqlDriver {
    conn: MySqlConnection,
}

impl MySqlDriver {
    fn connect_options(params: &ConnectParams) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.username)
            .password(&params.password);

        let schema = params.schema.trim();
        if !schema.is_empty() {
            opts = opts.database(schema);
        }
        opts
    }

    /// Bind one engine value as a MySQL parameter.
    fn bind_value<'q>(
        query: Query<'q, MySql, MySqlArguments>,
        value: &Value,
    ) -> Query<'q, MySql, MySqlArguments> {
        match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Integer(i) => query.bind(*i),
            Value::Decimal(d) => query.bind(*d),
            Value::Text(s) => query.bind(s.clone()),
            Value::Date(d) => query.bind(*d),
            Value::DateTime(dt) => query.bind(*dt),
            Value::Boolean(b) => query.bind(*b),
            Value::Bytes(b) => query.bind(b.clone()),
        }
    }

    /// Decode the value at `idx`, guided by the cursor's native type name.
    fn extract_value(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(Value::Null);
        }

        let typed = match SqlType::from_native(type_name) {
            SqlType::Boolean => row
                .try_get::<bool, _>(idx)
                .map(Value::Boolean)
                .or_else(|_| row.try_get::<i64, _>(idx).map(Value::Integer)),
            SqlType::Integer => row
                .try_get::<i64, _>(idx)
                .map(Value::Integer)
                .or_else(|_| row.try_get::<u64, _>(idx).map(unsigned_value)),
            SqlType::Decimal => row
                .try_get::<Decimal, _>(idx)
                .map(Value::Decimal)
                .or_else(|_| row.try_get::<f64, _>(idx).map(float_value)),
            SqlType::Date => row.try_get::<NaiveDate, _>(idx).map(Value::Date),
            SqlType::DateTime => row.try_get::<NaiveDateTime, _>(idx).map(Value::DateTime),
            SqlType::Text | SqlType::Other => row
                .try_get::<String, _>(idx)
                .map(Value::Text)
                .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(Value::Bytes)),
        };

        // Binary-protocol types with no engine counterpart, then raw text or bytes.
        typed
            .or_else(|e| Self::extract_special(row, idx, type_name).ok_or(e))
            .or_else(|_| row.try_get_unchecked::<String, _>(idx).map(Value::Text))
            .or_else(|_| row.try_get_unchecked::<Vec<u8>, _>(idx).map(Value::Bytes))
            .map_err(Error::from)
    }

    /// TIME, YEAR and BIT arrive binary-encoded and would not survive a raw
    /// text decode.
    fn extract_special(row: &MySqlRow, idx: usize, type_name: &str) -> Option<Value> {
        match type_name.to_ascii_uppercase().as_str() {
            // Negative or over-24h durations do not fit NaiveTime; keep their bytes.
            "TIME" => row
                .try_get::<NaiveTime, _>(idx)
                .map(|t| Value::Text(t.format("%H:%M:%S%.f").to_string()))
                .or_else(|_| row.try_get_unchecked::<Vec<u8>, _>(idx).map(Value::Bytes))
                .ok(),
            "YEAR" => row
                .try_get::<u16, _>(idx)
                .or_else(|_| row.try_get_unchecked::<u16, _>(idx))
                .map(|year| Value::Integer(i64::from(year)))
                .ok(),
            "BIT" => row.try_get::<u64, _>(idx).map(unsigned_value).ok(),
            _ => None,
        }
    }
}

fn unsigned_value(u: u64) -> Value {
    match i64::try_from(u) {
        Ok(i) => Value::Integer(i),
        Err(_) => Value::Decimal(Decimal::from(u)),
    }
}

fn float_value(f: f64) -> Value {
    Decimal::from_f64(f)
        .map(Value::Decimal)
        .unwrap_or_else(|| Value::Text(f.to_string()))
}

impl Driver for MySqlDriver {
    const BACKEND: Backend = Backend::MySql;

    async fn connect(params: &ConnectParams) -> Result<Self> {
        let conn = MySqlConnection::connect_with(&Self::connect_options(params))
            .await
            .map_err(|e| Error::ConnectionFailed {
                target: params.target(),
                message: e.to_string(),
            })?;
        Ok(Self { conn })
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        // CAST avoids BINARY-typed catalog columns on some server versions.
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT CAST(TABLE_NAME AS CHAR) \
             FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
             ORDER BY TABLE_NAME",
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| Error::metadata(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<NativeColumn>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), \
                    CAST(IS_NULLABLE AS CHAR), CAST(COLUMN_KEY AS CHAR), CAST(EXTRA AS CHAR) \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(table)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| Error::metadata(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(name, type_name, is_nullable, column_key, extra)| NativeColumn {
                name,
                type_name,
                nullable: is_nullable.eq_ignore_ascii_case("YES"),
                primary_key: column_key == "PRI",
                auto_increment: extra.to_ascii_lowercase().contains("auto_increment"),
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
            let values = columns
                .iter()
                .enumerate()
                .map(|(idx, col)| Self::extract_value(&row, idx, &col.type_name))
                .collect::<Result<Vec<_>>>()?;
            rows.push(values);
        }
        debug!(columns = columns.len(), rows = rows.len(), "mysql cursor drained");

        Ok(NativeRows { columns, rows })
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let result = if params.is_empty() {
            // Text protocol: also accepts statements MySQL refuses to prepare.
            (&mut self.conn).execute(sqlx::raw_sql(sql)).await?
        } else {
            params
                .iter()
                .fold(sqlx::query(sql), |q, value| Self::bind_value(q, value))
                .execute(&mut self.conn)
                .await?
        };
        Ok(result.rows_affected())
    }

    async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(Error::from)
    }
}
