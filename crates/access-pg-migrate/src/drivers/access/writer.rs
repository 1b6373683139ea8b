//! Access sink.
//!
//! Every exported table lands in its own database file, created by copying an
//! empty template over `<output_dir>/<table>.<ext>`. Rows are inserted one
//! statement at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::AccessConfig;
use crate::core::identifier::validate_identifier;
use crate::core::traits::{Dialect, SinkConnector, TableSink};
use crate::core::value::{Row, StagedTable};
use crate::error::{MigrateError, Result};

use super::dialect::AccessDialect;
use super::odbc::AccessOdbc;

/// Creates one Access database file per table.
pub struct AccessConnector {
    odbc: Arc<AccessOdbc>,
    output_dir: PathBuf,
    template: PathBuf,
    dialect: AccessDialect,
}

impl AccessConnector {
    pub fn new(config: &AccessConfig) -> Result<Self> {
        let template = config.template().cloned().ok_or_else(|| {
            MigrateError::Config(
                "access.template_accdb or access.template_mdb is required to export to Access"
                    .into(),
            )
        })?;
        Ok(Self::with_odbc(
            Arc::new(AccessOdbc::new(&config.driver)?),
            &config.output_dir,
            template,
        ))
    }

    pub fn with_odbc(odbc: Arc<AccessOdbc>, output_dir: &Path, template: PathBuf) -> Self {
        Self {
            odbc,
            output_dir: output_dir.to_path_buf(),
            template,
            dialect: AccessDialect,
        }
    }
}

/// Destination file for `table`, keeping the template's extension.
pub fn target_path(output_dir: &Path, template: &Path, table: &str) -> PathBuf {
    let ext = template
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| e == "mdb")
        .unwrap_or_else(|| "accdb".to_string());
    output_dir.join(format!("{}.{}", table, ext))
}

#[async_trait]
impl SinkConnector for AccessConnector {
    async fn open(&self, target_table: &str) -> Result<Box<dyn TableSink>> {
        validate_identifier(target_table)?;
        let path = target_path(&self.output_dir, &self.template, target_table);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| MigrateError::sink(target_table, "open", e))?;
        tokio::fs::copy(&self.template, &path).await.map_err(|e| {
            MigrateError::sink(
                target_table,
                "open",
                format!("copying template {}: {}", self.template.display(), e),
            )
        })?;
        info!("Created {}", path.display());

        Ok(Box::new(AccessSink {
            odbc: Arc::clone(&self.odbc),
            path,
            table: target_table.to_string(),
            dialect: self.dialect,
            open: true,
        }))
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

/// Write handle for one Access database file.
pub struct AccessSink {
    odbc: Arc<AccessOdbc>,
    path: PathBuf,
    table: String,
    dialect: AccessDialect,
    open: bool,
}

impl AccessSink {
    async fn execute_phase(&self, sql: &str, phase: &str) -> Result<()> {
        if !self.open {
            return Err(MigrateError::sink(&self.table, phase, "sink already closed"));
        }
        let _guard = self.odbc.lock().await;
        let conn = self.odbc.connect(&self.path)?;
        conn.execute(sql, ())
            .map_err(|e| MigrateError::sink(&self.table, phase, e))?;
        Ok(())
    }
}

#[async_trait]
impl TableSink for AccessSink {
    async fn execute_ddl(&mut self, ddl: &str) -> Result<()> {
        self.execute_phase(ddl, "DDL").await
    }

    async fn insert_rows(
        &mut self,
        staged: &StagedTable,
        on_committed: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64> {
        if !self.open {
            return Err(MigrateError::sink(&self.table, "commit", "sink already closed"));
        }

        let _guard = self.odbc.lock().await;
        let conn = self.odbc.connect(&self.path)?;

        let mut committed = 0u64;
        for row in &staged.rows {
            let sql = insert_statement(&self.dialect, &self.table, &staged.columns, row);
            conn.execute(&sql, ())
                .map_err(|e| MigrateError::sink(&self.table, "commit", e))?;
            committed += 1;
            on_committed(committed);
        }

        debug!("{}: committed {} rows", self.table, committed);
        Ok(committed)
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.execute_phase(sql, "post-load").await
    }

    async fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("{}: sink closed", self.path.display());
        }
    }
}

/// Single-row `INSERT` statement.
fn insert_statement(dialect: &AccessDialect, table: &str, columns: &[String], row: &Row) -> String {
    let columns = columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let values = row
        .iter()
        .map(|v| dialect.render_literal(v))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.quote_ident(table),
        columns,
        values
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::SqlValue;

    #[test]
    fn test_insert_statement() {
        let sql = insert_statement(
            &AccessDialect,
            "customers",
            &["id".to_string(), "name".to_string(), "active".to_string()],
            &vec![SqlValue::I32(1), "O'Hara".into(), SqlValue::Bool(true)],
        );
        assert_eq!(
            sql,
            "INSERT INTO [customers] ([id], [name], [active]) VALUES (1, 'O''Hara', 1)"
        );
    }

    #[test]
    fn test_target_path_follows_template() {
        let out = Path::new("/exports");
        assert_eq!(
            target_path(out, Path::new("/opt/empty.accdb"), "orders"),
            PathBuf::from("/exports/orders.accdb")
        );
        assert_eq!(
            target_path(out, Path::new("/opt/Empty.MDB"), "orders"),
            PathBuf::from("/exports/orders.mdb")
        );
    }
}
