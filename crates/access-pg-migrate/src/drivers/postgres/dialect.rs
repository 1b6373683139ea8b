//! PostgreSQL SQL dialect.
//!
//! DDL leaves plain lowercase names bare and quotes the rest; DML always
//! quotes. Both spellings name the same object.

use crate::core::identifier::{escape_pg, qualify_pg, quote_pg};
use crate::core::schema::NativeType;
use crate::core::traits::Dialect;
use crate::core::value::SqlValue;

/// Default length above which an unbounded string column becomes `TEXT`.
pub const DEFAULT_STRING_THRESHOLD: usize = 255;

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    schema: String,
    owner: String,
    string_threshold: usize,
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new("public", "postgres")
    }
}

impl PostgresDialect {
    pub fn new(schema: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            owner: owner.into(),
            string_threshold: DEFAULT_STRING_THRESHOLD,
        }
    }

    pub fn with_string_threshold(mut self, threshold: usize) -> Self {
        self.string_threshold = threshold;
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Schema-qualified, quoted table reference for DML.
    pub fn qualified_table(&self, table: &str) -> String {
        qualify_pg(&self.schema, table)
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_pg(name)
    }

    fn ddl_ident(&self, name: &str) -> String {
        escape_pg(name)
    }

    fn ddl_table(&self, table: &str) -> String {
        format!("{}.{}", escape_pg(&self.schema), escape_pg(table))
    }

    fn create_table_prefix(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS"
    }

    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    fn scalar_type(&self, native: &NativeType) -> Option<&'static str> {
        match native {
            NativeType::Boolean => Some("BOOLEAN"),
            // No single-byte integer in PostgreSQL.
            NativeType::Byte | NativeType::Int16 => Some("SMALLINT"),
            NativeType::Int32 => Some("INT"),
            NativeType::Int64 => Some("BIGINT"),
            NativeType::Decimal => Some("DECIMAL"),
            NativeType::DateTime => Some("DATE"),
            NativeType::Float32 => Some("REAL"),
            NativeType::Float64 => Some("DOUBLE PRECISION"),
            NativeType::String | NativeType::Other(_) => None,
        }
    }

    fn identity_type(&self, wide: bool) -> &'static str {
        if wide {
            "BIGSERIAL"
        } else {
            "SERIAL"
        }
    }

    fn string_type(&self, declared_len: i32, observed_max_len: usize) -> String {
        match declared_len {
            0 => self.unbounded_string_type().to_string(),
            n if n > 0 => format!("VARCHAR({})", n),
            // VARCHAR(0) is not a valid type; an empty column stays unconstrained.
            _ if observed_max_len == 0 => self.unbounded_string_type().to_string(),
            _ if observed_max_len <= self.string_threshold => {
                format!("VARCHAR({})", observed_max_len)
            }
            _ => "TEXT".to_string(),
        }
    }

    fn drop_statement(&self, table: &str) -> Option<String> {
        Some(format!("DROP TABLE IF EXISTS {};", self.ddl_table(table)))
    }

    fn owner_statement(&self, table: &str) -> Option<String> {
        Some(format!(
            "ALTER TABLE IF EXISTS {} OWNER to {};",
            self.ddl_table(table),
            escape_pg(&self.owner)
        ))
    }

    fn inline_primary_key(&self) -> bool {
        false
    }

    fn render_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            SqlValue::Byte(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::F32(v) => float_literal(f64::from(*v)),
            SqlValue::F64(v) => float_literal(*v),
            SqlValue::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            // PostgreSQL text cannot hold NUL.
            SqlValue::Text(s) => format!("'{}'", s.replace('\0', "").replace('\'', "''")),
        }
    }

    fn sequence_reset_statement(
        &self,
        table: &str,
        column: &str,
        native: &NativeType,
    ) -> Option<String> {
        if !(native.is_narrow_integer() || *native == NativeType::Int64) {
            return None;
        }
        Some(format!(
            "SELECT setval(pg_get_serial_sequence('{relation}', '{column}'), \
             COALESCE(MAX({col}), 0) + 1, false) FROM {qualified}",
            relation = self.qualified_table(table).replace('\'', "''"),
            column = column.replace('\'', "''"),
            col = self.quote_ident(column),
            qualified = self.qualified_table(table),
        ))
    }
}

fn float_literal(v: f64) -> String {
    if v.is_nan() {
        "'NaN'".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            "'Infinity'".to_string()
        } else {
            "'-Infinity'".to_string()
        }
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_quote_ident() {
        let dialect = PostgresDialect::default();
        assert_eq!(dialect.quote_ident("users"), "\"users\"");
        assert_eq!(dialect.quote_ident("user\"name"), "\"user\"\"name\"");
        assert_eq!(dialect.qualified_table("t"), "\"public\".\"t\"");
    }

    #[test]
    fn test_drop_and_owner() {
        let dialect = PostgresDialect::new("sales", "etl");
        assert_eq!(
            dialect.drop_statement("orders").unwrap(),
            "DROP TABLE IF EXISTS sales.orders;"
        );
        assert_eq!(
            dialect.owner_statement("orders").unwrap(),
            "ALTER TABLE IF EXISTS sales.orders OWNER to etl;"
        );
    }

    #[test]
    fn test_ddl_names_quoted_when_needed() {
        let d = PostgresDialect::new("Sales", "etl-user");
        assert_eq!(d.ddl_ident("name"), "name");
        assert_eq!(d.ddl_ident("order"), "\"order\"");
        assert_eq!(d.ddl_table("2019_sales"), "\"Sales\".\"2019_sales\"");
        assert_eq!(d.qualified_table("2019_sales"), "\"Sales\".\"2019_sales\"");
        assert_eq!(
            d.owner_statement("t").unwrap(),
            "ALTER TABLE IF EXISTS \"Sales\".t OWNER to \"etl-user\";"
        );
    }

    #[test]
    fn test_sequence_reset_quotes_relation() {
        let d = PostgresDialect::default();
        let sql = d
            .sequence_reset_statement("2019_sales", "order", &NativeType::Int32)
            .unwrap();
        assert!(sql.contains("pg_get_serial_sequence('\"public\".\"2019_sales\"', 'order')"));
        assert!(sql.contains("MAX(\"order\")"));
    }

    #[test]
    fn test_render_literal() {
        let d = PostgresDialect::default();
        assert_eq!(d.render_literal(&SqlValue::Null), "NULL");
        assert_eq!(d.render_literal(&SqlValue::Bool(true)), "true");
        assert_eq!(d.render_literal(&SqlValue::I32(-7)), "-7");
        assert_eq!(d.render_literal(&"O'Brien".into()), "'O''Brien'");
        assert_eq!(d.render_literal(&SqlValue::F64(f64::NAN)), "'NaN'");
        let dt = NaiveDate::from_ymd_opt(2023, 5, 17)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            d.render_literal(&SqlValue::DateTime(dt)),
            "'2023-05-17 08:30:00'"
        );
    }

    #[test]
    fn test_sequence_reset_only_for_integers() {
        let d = PostgresDialect::default();
        let sql = d
            .sequence_reset_statement("customers", "id", &NativeType::Int32)
            .unwrap();
        assert!(sql.contains("pg_get_serial_sequence('\"public\".\"customers\"', 'id')"));
        assert!(sql.contains("FROM \"public\".\"customers\""));
        assert!(d
            .sequence_reset_statement("t", "id", &NativeType::String)
            .is_none());
        assert!(d
            .sequence_reset_statement("t", "id", &NativeType::Decimal)
            .is_none());
    }
}
