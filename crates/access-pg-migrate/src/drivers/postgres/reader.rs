//! PostgreSQL source.
//!
//! Column metadata comes from `information_schema.columns`; rows are read in
//! text mode through the simple-query protocol and parsed per native type.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::SimpleQueryMessage;
use tracing::{debug, info};

use crate::config::PostgresConfig;
use crate::core::schema::{Column, NativeType, Table, UNBOUNDED_LENGTH};
use crate::core::traits::{Dialect, TableSource};
use crate::core::value::{Row, SqlValue, TableData};
use crate::error::{MigrateError, Result};

use super::dialect::PostgresDialect;
use super::pool;

const COLUMNS_QUERY: &str = r#"
    SELECT
        column_name::text,
        udt_name::text,
        character_maximum_length::int4,
        CASE WHEN is_nullable = 'YES' THEN true ELSE false END,
        (COALESCE(column_default, '') LIKE 'nextval(%' OR is_identity = 'YES') AS is_auto,
        ordinal_position::int4
    FROM information_schema.columns
    WHERE table_schema::text = $1 AND table_name::text = $2
    ORDER BY ordinal_position
"#;

/// Reads whole tables from one PostgreSQL schema.
pub struct PostgresSource {
    pool: Pool,
    schema: String,
}

impl PostgresSource {
    pub async fn new(config: &PostgresConfig) -> Result<Self> {
        let pool = pool::connect(config, "source").await?;
        Ok(Self::from_pool(pool, &config.schema))
    }

    pub fn from_pool(pool: Pool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    async fn load_columns(&self, client: &deadpool_postgres::Object, table: &str) -> Result<Vec<Column>> {
        let rows = client
            .query(COLUMNS_QUERY, &[&self.schema, &table])
            .await
            .map_err(|e| MigrateError::source(table, e))?;

        let columns = rows
            .iter()
            .map(|row| {
                let udt: String = row.get(1);
                let native_type = native_type_for(&udt);
                let declared: Option<i32> = row.get(2);
                Column {
                    name: row.get(0),
                    ordinal: row.get(5),
                    max_length: declared_length(&native_type, declared),
                    native_type,
                    is_nullable: row.get(3),
                    is_auto_increment: row.get(4),
                }
            })
            .collect();

        Ok(columns)
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    async fn load_table(&self, identifier: &str) -> Result<TableData> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, format!("reading table {}", identifier)))?;

        let columns = self.load_columns(&client, identifier).await?;
        if columns.is_empty() {
            return Err(MigrateError::source(
                identifier,
                format!("table not found in schema {}", self.schema),
            ));
        }
        debug!("Loaded {} columns for {}", columns.len(), identifier);

        let dialect = PostgresDialect::new(&self.schema, "");
        let select = format!(
            "SELECT {} FROM {}",
            columns
                .iter()
                .map(|c| dialect.quote_ident(&c.name))
                .collect::<Vec<_>>()
                .join(", "),
            dialect.qualified_table(identifier)
        );

        let messages = client
            .simple_query(&select)
            .await
            .map_err(|e| MigrateError::source(identifier, e))?;

        let rows: Vec<Row> = messages
            .iter()
            .filter_map(|msg| match msg {
                SimpleQueryMessage::Row(row) => Some(
                    columns
                        .iter()
                        .enumerate()
                        .map(|(i, col)| match row.get(i) {
                            Some(text) => SqlValue::parse_text(&col.native_type, text),
                            None => SqlValue::Null,
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        info!("Read {} rows from {}.{}", rows.len(), self.schema, identifier);
        TableData::new(Table::new(identifier, columns), rows)
    }

    fn db_type(&self) -> &str {
        "postgres"
    }
}

/// Map a PostgreSQL `udt_name` onto a native type.
pub fn native_type_for(udt_name: &str) -> NativeType {
    match udt_name.to_lowercase().as_str() {
        "bool" => NativeType::Boolean,
        "int2" => NativeType::Int16,
        "int4" => NativeType::Int32,
        "int8" => NativeType::Int64,
        "numeric" | "money" => NativeType::Decimal,
        "float4" => NativeType::Float32,
        "float8" => NativeType::Float64,
        "timestamp" | "timestamptz" | "date" => NativeType::DateTime,
        "varchar" | "text" | "bpchar" | "char" | "name" | "citext" => NativeType::String,
        other => NativeType::Other(other.to_string()),
    }
}

fn declared_length(native: &NativeType, declared: Option<i32>) -> i32 {
    match (native, declared) {
        (_, Some(n)) if n > 0 => n,
        (NativeType::String, _) => UNBOUNDED_LENGTH,
        _ => 0,
    }
}
