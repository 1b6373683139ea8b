//! PostgreSQL sink.
//!
//! Each table gets its own pooled client. DDL runs as one simple-query batch;
//! rows are committed as multi-row `INSERT` statements with literals rendered
//! by [`PostgresDialect`].

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tracing::debug;

use crate::config::{MigrationConfig, PostgresConfig};
use crate::core::identifier::validate_identifier;
use crate::core::traits::{Dialect, SinkConnector, TableSink};
use crate::core::value::{Row, StagedTable};
use crate::error::{MigrateError, Result};

use super::dialect::PostgresDialect;
use super::pool;

/// Opens [`PostgresSink`]s on a shared pool.
pub struct PostgresConnector {
    pool: Pool,
    dialect: PostgresDialect,
    insert_batch_size: usize,
}

impl PostgresConnector {
    /// Connect to the server described by `config`.
    pub async fn new(config: &PostgresConfig, migration: &MigrationConfig) -> Result<Self> {
        let pool = pool::connect(config, "target").await?;
        Ok(Self::from_pool(pool, dialect_for(config, migration), migration.insert_batch_size))
    }

    pub fn from_pool(pool: Pool, dialect: PostgresDialect, insert_batch_size: usize) -> Self {
        Self {
            pool,
            dialect,
            insert_batch_size: insert_batch_size.max(1),
        }
    }
}

/// Dialect configured with the schema, owner and string threshold of a run.
pub fn dialect_for(config: &PostgresConfig, migration: &MigrationConfig) -> PostgresDialect {
    PostgresDialect::new(&config.schema, config.effective_owner())
        .with_string_threshold(migration.string_length_threshold)
}

#[async_trait]
impl SinkConnector for PostgresConnector {
    async fn open(&self, target_table: &str) -> Result<Box<dyn TableSink>> {
        validate_identifier(target_table)?;
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, format!("opening sink for {}", target_table)))?;

        Ok(Box::new(PostgresSink {
            client: Some(client),
            table: target_table.to_string(),
            dialect: self.dialect.clone(),
            insert_batch_size: self.insert_batch_size,
        }))
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

/// Write handle for one PostgreSQL table.
pub struct PostgresSink {
    client: Option<Object>,
    table: String,
    dialect: PostgresDialect,
    insert_batch_size: usize,
}

impl PostgresSink {
    fn client(&self, phase: &str) -> Result<&Object> {
        self.client
            .as_ref()
            .ok_or_else(|| MigrateError::sink(&self.table, phase, "sink already closed"))
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    async fn execute_ddl(&mut self, ddl: &str) -> Result<()> {
        let client = self.client("DDL")?;
        client
            .batch_execute(ddl)
            .await
            .map_err(|e| MigrateError::sink(&self.table, "DDL", describe(&e)))
    }

    async fn insert_rows(
        &mut self,
        staged: &StagedTable,
        on_committed: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64> {
        let client = self.client("commit")?;
        let mut committed = 0u64;

        for chunk in staged.rows.chunks(self.insert_batch_size) {
            let sql = insert_statement(&self.dialect, &self.table, &staged.columns, chunk);
            client
                .batch_execute(&sql)
                .await
                .map_err(|e| MigrateError::sink(&self.table, "commit", describe(&e)))?;
            committed += chunk.len() as u64;
            on_committed(committed);
        }

        debug!("{}: committed {} rows", self.table, committed);
        Ok(committed)
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        let client = self.client("post-load")?;
        client
            .batch_execute(sql)
            .await
            .map_err(|e| MigrateError::sink(&self.table, "post-load", describe(&e)))
    }

    async fn close(&mut self) {
        // Dropping the object returns the connection to the pool.
        if self.client.take().is_some() {
            debug!("{}: sink closed", self.table);
        }
    }
}

/// Multi-row `INSERT` for one chunk of staged rows.
fn insert_statement(
    dialect: &PostgresDialect,
    table: &str,
    columns: &[String],
    rows: &[Row],
) -> String {
    let columns = columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let values = rows
        .iter()
        .map(|row| {
            let literals = row
                .iter()
                .map(|v| dialect.render_literal(v))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", literals)
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "INSERT INTO {} ({}) VALUES\n{}",
        dialect.qualified_table(table),
        columns,
        values
    )
}

/// Prefer the server's message over the generic "db error" display.
fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::SqlValue;

    #[test]
    fn test_insert_statement() {
        let dialect = PostgresDialect::default();
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec![SqlValue::I32(1), "Ada".into()],
            vec![SqlValue::I32(2), SqlValue::Null],
        ];
        let sql = insert_statement(&dialect, "customers", &columns, &rows);
        assert_eq!(
            sql,
            "INSERT INTO \"public\".\"customers\" (\"id\", \"name\") VALUES\n(1, 'Ada'),\n(2, NULL)"
        );
    }

    #[test]
    fn test_dialect_for_uses_config() {
        let mut pg = PostgresConfig::default();
        pg.schema = "staging".into();
        pg.user = "loader".into();
        let dialect = dialect_for(&pg, &MigrationConfig::default());
        assert_eq!(
            dialect.owner_statement("t").unwrap(),
            "ALTER TABLE IF EXISTS staging.t OWNER to loader;"
        );
    }
}
