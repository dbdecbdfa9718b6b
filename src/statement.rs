//! Statement Builder: parameterized CRUD statements and ad-hoc classification.
//!
//! Every value on the structured path travels as a bound `?` parameter; only
//! identifiers taken from table metadata are spliced into SQL text, and those
//! are quoted by the session's dialect.

use std::collections::HashMap;

use crate::driver::Dialect;
use crate::error::{Error, Result};
use crate::types::{TableMetadata, Value};

/// What a statement does, and therefore how its outcome is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    OtherWrite,
}

impl StatementKind {
    /// Whether the statement produces rows rather than an affected count.
    pub fn is_read(&self) -> bool {
        matches!(self, StatementKind::Select)
    }
}

/// SQL text plus its ordered bound parameters.
///
/// Built once, executed once by [`crate::session::Session::run`], then gone.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementPlan {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Value>,
}

/// Classify free-form SQL as a read (`Select`) or a write (`OtherWrite`).
///
/// This is a textual heuristic, not a parser: a statement is a read iff,
/// after leading whitespace, it starts with `SELECT` (any case). A `WITH ...
/// SELECT` or a parenthesised select is therefore reported as a write, and
/// its outcome as an affected-row count.
pub fn classify(raw_sql: &str) -> Result<StatementKind> {
    let sql = raw_sql.trim_start();
    if sql.trim_end().is_empty() {
        return Err(Error::EmptyStatement);
    }
    let is_select = sql
        .get(..6)
        .map(|head| head.eq_ignore_ascii_case("select"))
        .unwrap_or(false);
    Ok(if is_select {
        StatementKind::Select
    } else {
        StatementKind::OtherWrite
    })
}

/// Builds parameterized statements for one SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    dialect: Dialect,
}

impl StatementBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// `SELECT *` over the whole table, in the database's natural order.
    pub fn select_all(&self, meta: &TableMetadata) -> StatementPlan {
        StatementPlan {
            kind: StatementKind::Select,
            sql: format!("SELECT * FROM {}", self.dialect.quote_ident(&meta.name)),
            params: Vec::new(),
        }
    }

    /// Zero-row projection used to probe whether a table can be read.
    pub fn probe(&self, table: &str) -> String {
        format!("SELECT * FROM {} WHERE 1 = 0", self.dialect.quote_ident(table))
    }

    /// INSERT of every column present in `values`, in table column order.
    ///
    /// An auto-generated key with no value (absent or NULL) is left for the
    /// database to assign.
    pub fn build_insert(
        &self,
        meta: &TableMetadata,
        values: &HashMap<String, Value>,
    ) -> Result<StatementPlan> {
        check_columns(meta, values)?;

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for column in &meta.columns {
            let Some(value) = values.get(&column.name) else {
                continue;
            };
            if column.is_auto_generated && value.is_null() {
                continue;
            }
            columns.push(self.dialect.quote_ident(&column.name));
            params.push(value.clone());
        }

        if columns.is_empty() {
            return Err(Error::NoColumnsToInsert {
                table: meta.name.clone(),
            });
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        Ok(StatementPlan {
            kind: StatementKind::Insert,
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.dialect.quote_ident(&meta.name),
                columns.join(", "),
                placeholders
            ),
            params,
        })
    }

    /// UPDATE of every non-key column present in `values`, keyed by the primary key.
    ///
    /// With nothing to set the plan assigns the key to itself, so executing
    /// it still reports whether the row exists.
    pub fn build_update(
        &self,
        meta: &TableMetadata,
        primary_key_value: Value,
        values: &HashMap<String, Value>,
    ) -> Result<StatementPlan> {
        let pk = self.primary_key(meta)?;
        check_columns(meta, values)?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for column in meta.columns.iter().filter(|c| c.name != pk) {
            if let Some(value) = values.get(&column.name) {
                assignments.push(format!("{} = ?", self.dialect.quote_ident(&column.name)));
                params.push(value.clone());
            }
        }

        let pk_ident = self.dialect.quote_ident(pk);
        if assignments.is_empty() {
            assignments.push(format!("{pk_ident} = {pk_ident}"));
        }
        params.push(primary_key_value);

        Ok(StatementPlan {
            kind: StatementKind::Update,
            sql: format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.dialect.quote_ident(&meta.name),
                assignments.join(", "),
                pk_ident
            ),
            params,
        })
    }

    /// DELETE of the row whose primary key equals `primary_key_value`.
    pub fn build_delete(&self, meta: &TableMetadata, primary_key_value: Value) -> Result<StatementPlan> {
        let pk = self.primary_key(meta)?;
        Ok(StatementPlan {
            kind: StatementKind::Delete,
            sql: format!(
                "DELETE FROM {} WHERE {} = ?",
                self.dialect.quote_ident(&meta.name),
                self.dialect.quote_ident(pk)
            ),
            params: vec![primary_key_value],
        })
    }

    fn primary_key<'m>(&self, meta: &'m TableMetadata) -> Result<&'m str> {
        meta.primary_key.as_deref().ok_or_else(|| Error::NoPrimaryKey {
            table: meta.name.clone(),
        })
    }
}

/// Reject values for columns the table does not have.
fn check_columns(meta: &TableMetadata, values: &HashMap<String, Value>) -> Result<()> {
    match values.keys().find(|name| meta.column(name).is_none()) {
        Some(unknown) => Err(Error::UnknownColumn {
            table: meta.name.clone(),
            column: unknown.clone(),
        }),
        None => Ok(()),
    }
}
