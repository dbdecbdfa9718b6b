//! Connection target configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default MySQL port.
pub const MYSQL_DEFAULT_PORT: u16 = 3306;

/// Which database client to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    MySql,
    Sqlite,
}

/// Connection parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Database client.
    pub backend: Backend,
    /// Host address (for SQLite: the database file path, or `:memory:`).
    pub host: String,
    /// Port number (ignored for SQLite).
    pub port: u16,
    /// Schema (database) name.
    pub schema: String,
    /// Login name.
    pub username: String,
    /// Login password. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Connection establishment timeout (default: 20 seconds).
    pub connect_timeout: Duration,
    /// Per-statement deadline. `None` waits indefinitely.
    pub query_timeout: Option<Duration>,
}

impl ConnectParams {
    /// Create MySQL connection parameters.
    pub fn new(host: impl Into<String>, port: u16, schema: impl Into<String>) -> Self {
        Self {
            backend: Backend::MySql,
            host: host.into(),
            port,
            schema: schema.into(),
            username: String::new(),
            password: String::new(),
            connect_timeout: Duration::from_secs(20),
            query_timeout: None,
        }
    }

    /// Create parameters for a SQLite database file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: Backend::Sqlite,
            port: 0,
            schema: "main".to_string(),
            ..Self::new(path, 0, "")
        }
    }

    /// Create parameters for a private in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self::sqlite(":memory:")
    }

    /// Set login credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the connection timeout.
    ///
    /// ```
    /// use sqlgrid::ConnectParams;
    /// use std::time::Duration;
    ///
    /// let params = ConnectParams::new("localhost", 3306, "bank")
    ///     .with_connect_timeout(Duration::from_secs(5));
    /// assert_eq!(params.connect_timeout, Duration::from_secs(5));
    /// ```
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound every statement by `timeout`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Parse a MySQL connect string like "host:port/schema".
    pub fn parse(conn_str: &str) -> Result<Self> {
        // host:port/schema or host/schema (default port 3306)
        let (addr_part, schema) =
            conn_str
                .split_once('/')
                .ok_or_else(|| Error::InvalidConnectString {
                    message: "Expected format: host:port/schema".to_string(),
                })?;

        if addr_part.is_empty() || schema.is_empty() {
            return Err(Error::InvalidConnectString {
                message: "Expected format: host:port/schema".to_string(),
            });
        }

        let (host, port) = if let Some((h, p)) = addr_part.split_once(':') {
            let port = p.parse::<u16>().map_err(|_| Error::InvalidConnectString {
                message: format!("Invalid port: {}", p),
            })?;
            (h.to_string(), port)
        } else {
            (addr_part.to_string(), MYSQL_DEFAULT_PORT)
        };

        Ok(Self::new(host, port, schema))
    }

    /// Read parameters from `SQLGRID_*` environment variables.
    ///
    /// `SQLGRID_BACKEND` selects `mysql` (default) or `sqlite`; for SQLite,
    /// `SQLGRID_HOST` is the database path.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup("SQLGRID_BACKEND").as_deref() {
            None | Some("mysql") => Backend::MySql,
            Some("sqlite") => Backend::Sqlite,
            Some(other) => {
                return Err(Error::InvalidConnectString {
                    message: format!("Unknown backend: {}", other),
                })
            }
        };
        let host = lookup("SQLGRID_HOST").ok_or_else(|| Error::InvalidConnectString {
            message: "SQLGRID_HOST is not set".to_string(),
        })?;

        let mut params = match backend {
            Backend::Sqlite => Self::sqlite(host),
            Backend::MySql => {
                let port = match lookup("SQLGRID_PORT") {
                    Some(p) => p.parse::<u16>().map_err(|_| Error::InvalidConnectString {
                        message: format!("Invalid port: {}", p),
                    })?,
                    None => MYSQL_DEFAULT_PORT,
                };
                let schema = lookup("SQLGRID_SCHEMA").ok_or_else(|| Error::InvalidConnectString {
                    message: "SQLGRID_SCHEMA is not set".to_string(),
                })?;
                Self::new(host, port, schema)
            }
        };

        params.username = lookup("SQLGRID_USER").unwrap_or_default();
        params.password = lookup("SQLGRID_PASSWORD").unwrap_or_default();
        if let Some(secs) = lookup("SQLGRID_QUERY_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| Error::InvalidConnectString {
                message: format!("Invalid query timeout: {}", secs),
            })?;
            params.query_timeout = Some(Duration::from_secs(secs));
        }
        Ok(params)
    }

    /// Human-readable target used in logs and errors (no credentials).
    pub fn target(&self) -> String {
        match self.backend {
            Backend::MySql => format!("mysql://{}:{}/{}", self.host, self.port, self.schema),
            Backend::Sqlite => format!("sqlite://{}", self.host),
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("schema", &self.schema)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}
