//! # access-pg-migrate
//!
//! Table migration between Microsoft Access and PostgreSQL.
//!
//! Each table is loaded whole from the source, its schema is inferred and
//! rendered as DDL for the target dialect, and its rows are staged and then
//! committed with per-phase progress reporting:
//!
//! - **Type mapping** from native column types to PostgreSQL or Access types
//! - **Primary-key inference** from auto-increment flags and `id` naming
//! - **Per-table isolation**: a failing table never stops the others
//!
//! The Access driver needs the `access` feature and an installed Access ODBC
//! driver.
//!
//! ## Example
//!
//! ```rust,no_run
//! use access_pg_migrate::{Config, Orchestrator, PostgresConnector};
//! # #[cfg(feature = "access")]
//! use access_pg_migrate::AccessSource;
//!
//! # #[cfg(feature = "access")]
//! #[tokio::main]
//! async fn main() -> access_pg_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let source = AccessSource::new(&config.access)?;
//!     let sink = PostgresConnector::new(&config.postgres, &config.migration).await?;
//!     let orchestrator = Orchestrator::new(Box::new(source), Box::new(sink), &config.migration);
//!     let result = orchestrator.run(&["customers.accdb".to_string()]).await?;
//!     println!("Migrated {} rows", result.rows_transferred);
//!     Ok(())
//! }
//! # #[cfg(not(feature = "access"))]
//! # fn main() {}
//! ```

pub mod config;
pub mod core;
pub mod ddl;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod transfer;
pub mod typemap;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::{AccessConfig, Config, MigrationConfig, PostgresConfig};
pub use crate::core::{
    Column, ColumnMapping, Dialect, NativeType, NoopObserver, ProgressObserver, Row,
    SinkConnector, SqlValue, StagedTable, Table, TableData, TableSink, TableSource,
};
pub use ddl::{generate_ddl, infer_primary_key, post_load_statement};
#[cfg(feature = "access")]
pub use drivers::access::{AccessConnector, AccessSource};
pub use drivers::postgres::{PostgresConnector, PostgresSource};
pub use drivers::{AccessDialect, DialectImpl, PostgresDialect};
pub use error::{MigrateError, Result};
pub use orchestrator::{preview_ddl, DdlPreview, MigrationResult, Orchestrator, TableFailure};
pub use transfer::{TransferEngine, TransferPhase, TransferStats};
pub use typemap::map_column;
