//! CRUD Façade: browse and edit any table through its metadata.
//!
//! Writes follow one pipeline: describe the table, coerce every field, build
//! the parameterized plan, execute it once. A coercion failure stops the
//! pipeline before any SQL is sent. No view is cached; after a successful
//! write the caller reloads with [`TableEditor::load_all_rows`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::coerce::{parse_for, render};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::materialize::{materialize_table, ResultSetView};
use crate::schema::{describe_table, list_tables, TableListing};
use crate::session::Session;
use crate::statement::StatementBuilder;
use crate::types::{Record, TableMetadata, Value};

/// Raw edit-field text keyed by column name.
pub type FieldValues = HashMap<String, String>;

/// Generic table browser and editor bound to one session.
pub struct TableEditor<D: Driver> {
    session: Arc<Session<D>>,
    builder: StatementBuilder,
}

impl<D: Driver> TableEditor<D> {
    pub fn new(session: Arc<Session<D>>) -> Self {
        let builder = StatementBuilder::new(session.dialect());
        Self { session, builder }
    }

    /// Readable user tables.
    pub async fn list_tables(&self) -> Result<TableListing> {
        list_tables(&self.session).await
    }

    /// Column structure and key of `table`.
    pub async fn load_structure(&self, table: &str) -> Result<TableMetadata> {
        describe_table(&self.session, table).await
    }

    /// Every row of `table`.
    pub async fn load_all_rows(&self, table: &str) -> Result<ResultSetView> {
        let meta = self.load_structure(table).await?;
        let plan = self.builder.select_all(&meta);
        let native = self.session.query(&plan.sql, &plan.params).await?;
        Ok(materialize_table(native, &meta))
    }

    /// Insert a row from edit-field text. Returns the affected-row count.
    ///
    /// A blank field for an auto-generated key is omitted so the database
    /// assigns the value.
    pub async fn create(&self, table: &str, fields: &FieldValues) -> Result<u64> {
        let meta = self.load_structure(table).await?;
        let values = coerce_fields(&meta, fields, false)?;
        let plan = self.builder.build_insert(&meta, &values)?;
        debug!(table, columns = plan.params.len(), "create");
        self.session.run(plan).await
    }

    /// Update the row whose key is `primary_key`. Returns the affected-row count.
    ///
    /// A value supplied for the key column itself is ignored; the key only
    /// selects the row.
    pub async fn update(&self, table: &str, primary_key: &str, fields: &FieldValues) -> Result<u64> {
        let meta = self.load_structure(table).await?;
        let key = key_value(&meta, primary_key)?;
        let values = coerce_fields(&meta, fields, true)?;
        let plan = self.builder.build_update(&meta, key, &values)?;
        debug!(table, columns = values.len(), "update");
        self.session.run(plan).await
    }

    /// Delete the row whose key is `primary_key`.
    ///
    /// Deleting a row that is already gone is not an error: it reports 0.
    pub async fn delete(&self, table: &str, primary_key: &str) -> Result<u64> {
        let meta = self.load_structure(table).await?;
        let key = key_value(&meta, primary_key)?;
        let plan = self.builder.build_delete(&meta, key)?;
        debug!(table, "delete");
        self.session.run(plan).await
    }
}

/// Edit-field text for every column of `record`, for pre-populating a form.
pub fn render_record(meta: &TableMetadata, record: &Record) -> FieldValues {
    meta.columns
        .iter()
        .map(|column| {
            let text = record
                .get_by_name(&column.name)
                .map(|value| render(value, column.sql_type))
                .unwrap_or_default();
            (column.name.clone(), text)
        })
        .collect()
}

/// Coerce edit-field text to typed values, in table column order.
///
/// Stops at the first failure. Names that are not columns of the table are
/// rejected.
fn coerce_fields(meta: &TableMetadata, fields: &FieldValues, skip_key: bool) -> Result<HashMap<String, Value>> {
    if let Some(unknown) = fields.keys().find(|name| meta.column(name).is_none()) {
        return Err(Error::UnknownColumn {
            table: meta.name.clone(),
            column: unknown.clone(),
        });
    }

    let mut values = HashMap::with_capacity(fields.len());
    for column in &meta.columns {
        let Some(raw) = fields.get(&column.name) else {
            continue;
        };
        if column.is_primary_key && skip_key {
            continue;
        }
        if column.is_auto_generated && raw.trim().is_empty() {
            continue;
        }
        values.insert(column.name.clone(), parse_for(column, raw)?);
    }
    Ok(values)
}

/// Coerce the key text of a row by the key column's type.
fn key_value(meta: &TableMetadata, raw: &str) -> Result<Value> {
    let column = meta.primary_key_column().ok_or_else(|| Error::NoPrimaryKey {
        table: meta.name.clone(),
    })?;
    parse_for(column, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{FakeDriver, FakeTable, StatementLog};
    use crate::driver::Dialect;

    fn fields(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn card_holders() -> FakeTable {
        FakeTable::new("CardHolders")
            .column("cardholder_id", "int(11)", true, true)
            .column("first_name", "varchar(45)", false, false)
            .not_null()
            .column("email", "varchar(100)", false, false)
            .column("phone", "varchar(20)", false, false)
            .column("opened", "date", false, false)
            .row(vec![
                Value::Integer(7),
                Value::from("Ada"),
                Value::from("a@x.com"),
                Value::Null,
                Value::Null,
            ])
    }

    fn editor(driver: FakeDriver) -> (TableEditor<FakeDriver>, StatementLog) {
        let log = driver.log();
        let session = Arc::new(Session::new(driver, "fake", None));
        (TableEditor::new(session), log)
    }

    fn writes(log: &StatementLog) -> Vec<(String, Vec<Value>)> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(sql, _)| !sql.starts_with("SELECT"))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_create_omits_auto_key() {
        let (editor, log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        let affected = editor
            .create(
                "CardHolders",
                &fields(&[
                    ("cardholder_id", ""),
                    ("first_name", "Ada"),
                    ("email", "a@x.com"),
                    ("phone", "555-0100"),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let writes = writes(&log);
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].0,
            "INSERT INTO `CardHolders` (`first_name`, `email`, `phone`) VALUES (?, ?, ?)"
        );
        assert_eq!(
            writes[0].1,
            vec![Value::from("Ada"), Value::from("a@x.com"), Value::from("555-0100")]
        );
    }

    #[tokio::test]
    async fn test_coercion_failure_sends_no_sql() {
        let (editor, log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        let result = editor
            .create(
                "CardHolders",
                &fields(&[("first_name", "Ada"), ("opened", "31/12/2024")]),
            )
            .await;
        assert!(matches!(
            result,
            Err(Error::InvalidFormat { field, expected }) if field == "opened" && expected == "YYYY-MM-DD"
        ));

        let result = editor
            .create("CardHolders", &fields(&[("first_name", ""), ("email", "a@x.com")]))
            .await;
        assert!(matches!(result, Err(Error::RequiredFieldMissing { field }) if field == "first_name"));
        assert!(writes(&log).is_empty());
    }

    #[tokio::test]
    async fn test_update_binds_key_last() {
        let (editor, log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        editor
            .update(
                "CardHolders",
                "7",
                &fields(&[("cardholder_id", "7"), ("email", "new@x.com"), ("opened", "2024-03-01")]),
            )
            .await
            .unwrap();

        let writes = writes(&log);
        assert_eq!(
            writes[0].0,
            "UPDATE `CardHolders` SET `email` = ?, `opened` = ? WHERE `cardholder_id` = ?"
        );
        assert_eq!(writes[0].1.last(), Some(&Value::Integer(7)));
    }

    #[tokio::test]
    async fn test_bad_key_text() {
        let (editor, log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        let result = editor.delete("CardHolders", "seven").await;
        assert!(matches!(result, Err(Error::InvalidFormat { field, .. }) if field == "cardholder_id"));
        let result = editor.delete("CardHolders", "").await;
        assert!(matches!(result, Err(Error::RequiredFieldMissing { .. })));
        assert!(writes(&log).is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_zero_when_gone() {
        let (editor, _log) =
            editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()).with_affected(0));
        assert_eq!(editor.delete("CardHolders", "7").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_keyless_table_refuses_update() {
        let table = FakeTable::new("audit_log").column("line", "text", false, false);
        let (editor, log) = editor(FakeDriver::new(Dialect::MySql).with_table(table));
        let result = editor.update("audit_log", "1", &fields(&[("line", "x")])).await;
        assert!(matches!(result, Err(Error::NoPrimaryKey { .. })));
        let result = editor.delete("audit_log", "1").await;
        assert!(matches!(result, Err(Error::NoPrimaryKey { .. })));
        assert!(writes(&log).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let (editor, _log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        let result = editor
            .create("CardHolders", &fields(&[("first_name", "Ada"), ("nickname", "A")]))
            .await;
        assert!(matches!(result, Err(Error::UnknownColumn { column, .. }) if column == "nickname"));
    }

    #[tokio::test]
    async fn test_load_all_rows_and_render() {
        let (editor, _log) = editor(FakeDriver::new(Dialect::MySql).with_table(card_holders()));
        let view = editor.load_all_rows("CardHolders").await.unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(
            view.column_names(),
            vec!["cardholder_id", "first_name", "email", "phone", "opened"]
        );

        let meta = editor.load_structure("CardHolders").await.unwrap();
        let form = render_record(&meta, &view.rows()[0]);
        assert_eq!(form["cardholder_id"], "7");
        assert_eq!(form["first_name"], "Ada");
        assert_eq!(form["phone"], "");

        assert!(matches!(
            editor.load_all_rows("Missing").await,
            Err(Error::TableNotFound { .. })
        ));
    }
}
