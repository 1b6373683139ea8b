//! Row values and the containers that carry them through a transfer.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::schema::{NativeType, Table};
use crate::error::{MigrateError, Result};

/// A single cell value.
///
/// `Null` is distinct from every domain value, including the empty string
/// and zero.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Byte(u8),
    I16(i16),
    I32(i32),
    I64(i64),
    Decimal(Decimal),
    F32(f32),
    F64(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Character length of a text value. Non-text values have no length.
    pub fn char_len(&self) -> Option<usize> {
        match self {
            SqlValue::Text(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Parse a textual cell as reported by a text-mode driver into the value
    /// for `native_type`.
    ///
    /// Values that do not parse are kept as text so that no data is dropped;
    /// the target will reject them if the column type cannot hold them.
    pub fn parse_text(native_type: &NativeType, text: &str) -> SqlValue {
        let trimmed = text.trim();
        let parsed = match native_type {
            NativeType::Boolean => parse_bool(trimmed).map(SqlValue::Bool),
            NativeType::Byte => trimmed.parse().ok().map(SqlValue::Byte),
            NativeType::Int16 => trimmed.parse().ok().map(SqlValue::I16),
            NativeType::Int32 => trimmed.parse().ok().map(SqlValue::I32),
            NativeType::Int64 => trimmed.parse().ok().map(SqlValue::I64),
            NativeType::Decimal => trimmed.parse().ok().map(SqlValue::Decimal),
            NativeType::Float32 => trimmed.parse().ok().map(SqlValue::F32),
            NativeType::Float64 => trimmed.parse().ok().map(SqlValue::F64),
            NativeType::DateTime => parse_datetime(trimmed).map(SqlValue::DateTime),
            NativeType::String | NativeType::Other(_) => None,
        };
        parsed.unwrap_or_else(|| SqlValue::Text(text.to_string()))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "-1" | "yes" | "y" => Some(true),
        "f" | "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f%#z",
    ];

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One row of values in column ordinal order.
pub type Row = Vec<SqlValue>;

/// A table descriptor together with all of its rows.
#[derive(Debug, Clone)]
pub struct TableData {
    table: Table,
    rows: Vec<Row>,
}

impl TableData {
    /// Pair a table with its rows. Every row must have one value per column.
    pub fn new(table: Table, rows: Vec<Row>) -> Result<Self> {
        let expected = table.column_count();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(MigrateError::RowShape {
                table: table.name.clone(),
                row: idx,
                expected,
                found: row.len(),
            });
        }
        Ok(Self { table, rows })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Longest observed character length of text values in column `idx`.
    /// Returns 0 when the column holds no text.
    pub fn observed_max_len(&self, idx: usize) -> usize {
        self.rows
            .iter()
            .filter_map(|r| r.get(idx).and_then(SqlValue::char_len))
            .max()
            .unwrap_or(0)
    }
}

/// In-memory mirror of the target table that rows are staged into before
/// they are committed.
#[derive(Debug, Clone, Default)]
pub struct StagedTable {
    /// Target table name (sanitized).
    pub name: String,
    /// Target column names (sanitized), in ordinal order.
    pub columns: Vec<String>,
    /// Staged rows, in source order.
    pub rows: Vec<Row>,
}

impl StagedTable {
    /// Empty mirror with the target shape of `table`.
    pub fn mirror(table: &Table) -> Self {
        Self {
            name: table.target_name(),
            columns: table.target_columns(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Column;

    fn two_col_table() -> Table {
        Table::new(
            "Items",
            vec![
                Column::new("ID", 1, NativeType::Int32),
                Column::new("Label", 2, NativeType::String),
            ],
        )
    }

    #[test]
    fn test_null_is_distinct() {
        assert_ne!(SqlValue::Null, SqlValue::Text(String::new()));
        assert_ne!(SqlValue::Null, SqlValue::I32(0));
        assert!(SqlValue::from(None::<i32>).is_null());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(SqlValue::parse_text(&NativeType::Int32, "42"), SqlValue::I32(42));
        assert_eq!(SqlValue::parse_text(&NativeType::Boolean, "t"), SqlValue::Bool(true));
        assert_eq!(SqlValue::parse_text(&NativeType::Boolean, "0"), SqlValue::Bool(false));
        assert_eq!(
            SqlValue::parse_text(&NativeType::Decimal, "12.50"),
            SqlValue::Decimal("12.50".parse().unwrap())
        );
        assert_eq!(
            SqlValue::parse_text(&NativeType::DateTime, "2024-03-01"),
            SqlValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            SqlValue::parse_text(&NativeType::String, " padded "),
            SqlValue::Text(" padded ".into())
        );
    }

    #[test]
    fn test_unparseable_kept_as_text() {
        assert_eq!(
            SqlValue::parse_text(&NativeType::Int16, "lots"),
            SqlValue::Text("lots".into())
        );
    }

    #[test]
    fn test_table_data_rejects_bad_row() {
        let rows = vec![
            vec![SqlValue::I32(1), "a".into()],
            vec![SqlValue::I32(2)],
        ];
        let err = TableData::new(two_col_table(), rows).unwrap_err();
        match err {
            MigrateError::RowShape {
                row,
                expected,
                found,
                ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_observed_max_len_counts_chars() {
        let rows = vec![
            vec![SqlValue::I32(1), "abc".into()],
            vec![SqlValue::I32(2), "ñañaña".into()],
            vec![SqlValue::I32(3), SqlValue::Null],
        ];
        let data = TableData::new(two_col_table(), rows).unwrap();
        assert_eq!(data.observed_max_len(1), 6);
        assert_eq!(data.observed_max_len(0), 0);
    }

    #[test]
    fn test_staged_mirror_shape() {
        let staged = StagedTable::mirror(&two_col_table());
        assert_eq!(staged.name, "items");
        assert_eq!(staged.columns, vec!["id", "label"]);
        assert!(staged.is_empty());
    }
}
