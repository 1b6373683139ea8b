//! Migration runner.
//!
//! Loads each requested table from the source and hands it to the transfer
//! engine, one table at a time. A failing table is recorded and the run moves
//! on to the next one.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::MigrationConfig;
use crate::core::traits::{Dialect, NoopObserver, ProgressObserver, SinkConnector, TableSource};
use crate::ddl::generate_ddl;
use crate::error::{MigrateError, Result};
use crate::transfer::{TransferEngine, TransferStats};

/// Migration orchestrator.
pub struct Orchestrator {
    source: Box<dyn TableSource>,
    connector: Box<dyn SinkConnector>,
    legacy_row_count: bool,
    observer: Arc<dyn ProgressObserver>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// `completed` or `completed_with_errors`.
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Source driver name.
    pub source_type: String,

    /// Target dialect name.
    pub target_dialect: String,

    /// Total tables processed.
    pub tables_total: usize,

    /// Tables successfully migrated.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// Total rows transferred.
    pub rows_transferred: u64,

    /// Average throughput (rows/second).
    pub rows_per_second: u64,

    /// Failed tables with their error messages.
    pub failed_tables: Vec<TableFailure>,

    /// Statistics for every table that succeeded.
    pub tables: Vec<TransferStats>,
}

/// A table that could not be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFailure {
    /// Identifier as given to the run.
    pub identifier: String,
    pub error: String,
}

/// DDL that a run would execute for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlPreview {
    pub identifier: String,
    pub table: String,
    pub ddl: String,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn TableSource>,
        connector: Box<dyn SinkConnector>,
        config: &MigrationConfig,
    ) -> Self {
        Self {
            source,
            connector,
            legacy_row_count: config.legacy_row_count,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Receive per-table phase and progress notifications.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Migrate every table named in `identifiers`, in order.
    pub async fn run(&self, identifiers: &[String]) -> Result<MigrationResult> {
        let identifiers = usable_identifiers(identifiers)?;
        let started_at = Utc::now();
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(
            "Starting migration run {}: {} tables from {} to {}",
            run_id,
            identifiers.len(),
            self.source.db_type(),
            self.connector.dialect().name()
        );

        let engine = TransferEngine::new(Arc::clone(&self.observer))
            .with_legacy_row_count(self.legacy_row_count);

        let mut tables = Vec::new();
        let mut failed_tables = Vec::new();

        for identifier in &identifiers {
            let data = match self.source.load_table(identifier).await {
                Ok(data) => data,
                Err(e) => {
                    error!("Skipping {}: {}", identifier, e);
                    failed_tables.push(TableFailure {
                        identifier: identifier.to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match engine.transfer(&data, self.connector.as_ref()).await {
                Ok(stats) => tables.push(stats),
                Err(e) => {
                    error!("Failed to migrate {}: {}", identifier, e);
                    failed_tables.push(TableFailure {
                        identifier: identifier.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let duration = start.elapsed().as_secs_f64();
        let rows_transferred: u64 = tables.iter().map(|s| s.rows).sum();
        let rows_per_second = if duration > 0.0 {
            (rows_transferred as f64 / duration) as u64
        } else {
            0
        };
        let status = if failed_tables.is_empty() {
            "completed"
        } else {
            "completed_with_errors"
        };

        info!(
            "Migration {}: {} of {} tables, {} rows in {:.1}s ({} rows/sec)",
            status,
            tables.len(),
            identifiers.len(),
            rows_transferred,
            duration,
            rows_per_second
        );

        Ok(MigrationResult {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at: Utc::now(),
            source_type: self.source.db_type().to_string(),
            target_dialect: self.connector.dialect().name().to_string(),
            tables_total: identifiers.len(),
            tables_success: tables.len(),
            tables_failed: failed_tables.len(),
            rows_transferred,
            rows_per_second,
            failed_tables,
            tables,
        })
    }

    /// DDL for each table without touching the target.
    pub async fn preview(&self, identifiers: &[String]) -> Result<Vec<DdlPreview>> {
        preview_ddl(self.source.as_ref(), self.connector.dialect(), identifiers).await
    }
}

/// Load each table from `source` and render its DDL for `dialect`.
///
/// Stops at the first table that cannot be loaded.
pub async fn preview_ddl(
    source: &dyn TableSource,
    dialect: &dyn Dialect,
    identifiers: &[String],
) -> Result<Vec<DdlPreview>> {
    let mut previews = Vec::new();
    for identifier in usable_identifiers(identifiers)? {
        let data = source.load_table(identifier).await?;
        previews.push(DdlPreview {
            identifier: identifier.to_string(),
            table: data.table().target_name(),
            ddl: generate_ddl(&data, dialect),
        });
    }
    Ok(previews)
}

fn usable_identifiers(identifiers: &[String]) -> Result<Vec<&str>> {
    if identifiers.is_empty() {
        return Err(MigrateError::Config("no tables to migrate".into()));
    }

    let usable: Vec<&str> = identifiers
        .iter()
        .map(|id| id.trim())
        .filter(|id| {
            if id.is_empty() {
                warn!("Skipping blank table identifier");
            }
            !id.is_empty()
        })
        .collect();

    if usable.is_empty() {
        return Err(MigrateError::Config(
            "every table identifier is blank".into(),
        ));
    }
    Ok(usable)
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_tables.is_empty()
    }
}
