//! Core traits for dialect-neutral table migration.
//!
//! - [`Dialect`]: SQL vocabulary and syntax of a target engine
//! - [`TableSource`]: supplies one table (descriptor and rows) per identifier
//! - [`SinkConnector`] / [`TableSink`]: executes DDL and commits staged rows
//! - [`ProgressObserver`]: receives phase changes and progress percentages

use async_trait::async_trait;

use crate::error::Result;
use crate::transfer::{TransferPhase, TransferStats};

use super::schema::NativeType;
use super::value::{SqlValue, StagedTable, TableData};

/// SQL dialect of a target database.
///
/// Implementations describe how the target spells types, quotes identifiers
/// and renders literals. The DDL generator and the sinks are written against
/// this trait only.
pub trait Dialect: Send + Sync {
    /// Dialect name (e.g. "postgres", "access").
    fn name(&self) -> &str;

    /// Quote an identifier for use in DML statements.
    fn quote_ident(&self, name: &str) -> String;

    /// Render an identifier inside generated DDL.
    fn ddl_ident(&self, name: &str) -> String;

    /// Table reference used in DDL (schema-qualified where the dialect has schemas).
    fn ddl_table(&self, table: &str) -> String;

    /// Opening of the `CREATE TABLE` statement, without the table name.
    fn create_table_prefix(&self) -> &'static str {
        "CREATE TABLE"
    }

    /// Terminator appended to each DDL statement.
    fn statement_terminator(&self) -> &'static str {
        ""
    }

    /// Type token for a non-string native type, `None` for string-like types.
    fn scalar_type(&self, native: &NativeType) -> Option<&'static str>;

    /// Auto-increment type for an identity column. `wide` selects the 64-bit tier.
    fn identity_type(&self, wide: bool) -> &'static str;

    /// Unconstrained variable-length string type.
    fn unbounded_string_type(&self) -> &'static str {
        "VARCHAR"
    }

    /// String column type for a declared length and the longest observed value.
    fn string_type(&self, declared_len: i32, observed_max_len: usize) -> String;

    /// `DROP` statement issued ahead of `CREATE`, if the dialect uses one.
    fn drop_statement(&self, table: &str) -> Option<String>;

    /// Ownership statement issued after `CREATE`, if the dialect has owners.
    fn owner_statement(&self, table: &str) -> Option<String>;

    /// Whether the primary key is declared inline on the identity column
    /// rather than as a separate constraint clause.
    fn inline_primary_key(&self) -> bool;

    /// Render a value as an SQL literal.
    fn render_literal(&self, value: &SqlValue) -> String;

    /// Statement that resynchronizes an identity sequence after rows were
    /// loaded with explicit key values.
    fn sequence_reset_statement(
        &self,
        _table: &str,
        _column: &str,
        _native: &NativeType,
    ) -> Option<String> {
        None
    }
}

/// Result of mapping one source column into a target column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Sanitized target column name.
    pub name: String,
    /// Target type token (e.g. "VARCHAR(40)", "SERIAL").
    pub target_type: String,
    /// Whether the clause carries `NOT NULL`.
    pub not_null: bool,
    /// Whether this column is the table's identity column.
    pub is_identity: bool,
}

/// Supplies tables from the source database.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Load the descriptor and every row of the table named by `identifier`.
    ///
    /// Failures are reported as [`crate::MigrateError::SourceAcquisition`].
    async fn load_table(&self, identifier: &str) -> Result<TableData>;

    /// Source kind for logging.
    fn db_type(&self) -> &str;
}

/// Opens per-table sinks on the target database.
#[async_trait]
pub trait SinkConnector: Send + Sync {
    /// Acquire a sink for `target_table`. The caller owns the sink and must
    /// close it.
    async fn open(&self, target_table: &str) -> Result<Box<dyn TableSink>>;

    /// Dialect spoken by the sinks this connector opens.
    fn dialect(&self) -> &dyn Dialect;
}

/// Exclusive write handle for a single target table.
#[async_trait]
pub trait TableSink: Send {
    /// Execute a DDL batch.
    async fn execute_ddl(&mut self, ddl: &str) -> Result<()>;

    /// Commit all staged rows in order. `on_committed` receives the cumulative
    /// number of committed rows whenever the sink makes progress.
    async fn insert_rows(
        &mut self,
        staged: &StagedTable,
        on_committed: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64>;

    /// Run a statement after the rows are committed.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Release the underlying connection.
    async fn close(&mut self);
}

/// Receives transfer events. All methods default to no-ops.
pub trait ProgressObserver: Send + Sync {
    fn on_table_start(&self, _table: &str, _total_rows: u64) {}

    fn on_phase(&self, _table: &str, _phase: TransferPhase) {}

    /// A new percentage for the current phase.
    fn on_progress(&self, _table: &str, _phase: TransferPhase, _percent: u8) {}

    fn on_complete(&self, _table: &str, _stats: &TransferStats) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
