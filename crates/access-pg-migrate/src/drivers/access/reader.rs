//! Access source.
//!
//! Each identifier is a database file holding one table named after the file
//! stem. Column metadata comes from the ODBC `SQLColumns` catalog.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::AccessConfig;
use crate::core::identifier::table_name_from_path;
use crate::core::schema::{Column, NativeType, Table, UNBOUNDED_LENGTH};
use crate::core::traits::{Dialect, TableSource};
use crate::core::value::{Row, SqlValue, TableData};
use crate::error::{MigrateError, Result};

use super::catalog_native_type;
use super::dialect::AccessDialect;
use super::odbc::{fetch_text, query_text, AccessOdbc, TextRow};

// SQLColumns result set positions.
const COL_NAME: usize = 3;
const COL_TYPE_NAME: usize = 5;
const COL_SIZE: usize = 6;
const COL_NULLABLE: usize = 10;
const COL_ORDINAL: usize = 16;

/// Reads tables out of Access database files.
pub struct AccessSource {
    odbc: Arc<AccessOdbc>,
}

impl AccessSource {
    pub fn new(config: &AccessConfig) -> Result<Self> {
        Ok(Self {
            odbc: Arc::new(AccessOdbc::new(&config.driver)?),
        })
    }

    pub fn with_odbc(odbc: Arc<AccessOdbc>) -> Self {
        Self { odbc }
    }

    fn load_sync(&self, path: &Path, table_name: &str) -> Result<TableData> {
        let conn = self
            .odbc
            .connect(path)
            .map_err(|e| MigrateError::source(path.display().to_string(), e))?;
        let fail = |msg: String| MigrateError::source(path.display().to_string(), msg);

        // The Access driver reports the file path without extension as catalog.
        let catalog_name = path.with_extension("").display().to_string();
        let cursor = conn
            .columns(&catalog_name, "", table_name, "%")
            .map_err(|e| fail(format!("column catalog failed: {}", e)))?;
        let catalog = fetch_text(cursor).map_err(fail)?;
        let mut columns: Vec<Column> = catalog.iter().filter_map(column_from_catalog).collect();
        columns.sort_by_key(|c| c.ordinal);

        if columns.is_empty() {
            return Err(fail(format!("table {} not found", table_name)));
        }
        debug!("Loaded {} columns for {}", columns.len(), table_name);

        let dialect = AccessDialect;
        let select = format!(
            "SELECT {} FROM {}",
            columns
                .iter()
                .map(|c| dialect.quote_ident(&c.name))
                .collect::<Vec<_>>()
                .join(", "),
            dialect.quote_ident(table_name)
        );

        let rows: Vec<Row> = query_text(&conn, &select)
            .map_err(fail)?
            .into_iter()
            .map(|text_row| parse_row(&columns, text_row))
            .collect();

        TableData::new(Table::new(table_name, columns), rows)
    }
}

#[async_trait]
impl TableSource for AccessSource {
    async fn load_table(&self, identifier: &str) -> Result<TableData> {
        let path = Path::new(identifier);
        if !path.is_file() {
            return Err(MigrateError::source(identifier, "file does not exist"));
        }

        let table_name = table_name_from_path(path);
        let _guard = self.odbc.lock().await;
        let data = self.load_sync(path, &table_name)?;
        info!("Read {} rows from {}", data.row_count(), identifier);
        Ok(data)
    }

    fn db_type(&self) -> &str {
        "access"
    }
}

fn column_from_catalog(row: &TextRow) -> Option<Column> {
    let text = |idx: usize| row.get(idx).and_then(|v| v.as_deref());

    let name = text(COL_NAME)?.to_string();
    let type_name = text(COL_TYPE_NAME).unwrap_or_default();
    let (native_type, is_auto_increment, unbounded) = catalog_native_type(type_name);

    let max_length = if unbounded {
        UNBOUNDED_LENGTH
    } else if native_type == NativeType::String {
        text(COL_SIZE).and_then(|s| s.parse().ok()).unwrap_or(0)
    } else {
        0
    };

    Some(Column {
        name,
        ordinal: text(COL_ORDINAL).and_then(|s| s.parse().ok()).unwrap_or(0),
        native_type,
        // SQL_NO_NULLS = 0
        is_nullable: text(COL_NULLABLE) != Some("0"),
        max_length,
        is_auto_increment,
    })
}

fn parse_row(columns: &[Column], text_row: TextRow) -> Row {
    columns
        .iter()
        .zip(text_row)
        .map(|(col, cell)| match cell {
            Some(text) => SqlValue::parse_text(&col.native_type, &text),
            None => SqlValue::Null,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_row(name: &str, type_name: &str, size: &str, nullable: &str, ordinal: &str) -> TextRow {
        let mut row: TextRow = vec![None; 18];
        row[COL_NAME] = Some(name.into());
        row[COL_TYPE_NAME] = Some(type_name.into());
        row[COL_SIZE] = Some(size.into());
        row[COL_NULLABLE] = Some(nullable.into());
        row[COL_ORDINAL] = Some(ordinal.into());
        row
    }

    #[test]
    fn test_counter_column() {
        let col = column_from_catalog(&catalog_row("ID", "COUNTER", "10", "0", "1")).unwrap();
        assert_eq!(col.native_type, NativeType::Int32);
        assert!(col.is_auto_increment);
        assert!(!col.is_nullable);
        assert_eq!(col.max_length, 0);
    }

    #[test]
    fn test_text_columns() {
        let col = column_from_catalog(&catalog_row("Name", "VARCHAR", "50", "1", "2")).unwrap();
        assert_eq!(col.native_type, NativeType::String);
        assert_eq!(col.max_length, 50);
        assert!(col.is_nullable);

        let memo = column_from_catalog(&catalog_row("Notes", "LONGCHAR", "1073741823", "1", "3")).unwrap();
        assert_eq!(memo.max_length, UNBOUNDED_LENGTH);
    }

    #[test]
    fn test_parse_row_keeps_nulls() {
        let columns = vec![
            Column::new("a", 1, NativeType::Int32),
            Column::new("b", 2, NativeType::String),
        ];
        let row = parse_row(&columns, vec![Some("5".into()), None]);
        assert_eq!(row, vec![SqlValue::I32(5), SqlValue::Null]);
    }
}
