//! Per-table transfer engine.
//!
//! A transfer moves one table through `Idle → DdlExecuting → RowStaging →
//! RowCommitting → Done`, or into `Failed` from any step. The sink for the
//! table is opened at the start of `DdlExecuting` and closed before the engine
//! returns, whatever the outcome.

pub mod progress;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::traits::{NoopObserver, ProgressObserver, SinkConnector, TableSink};
use crate::core::value::{StagedTable, TableData};
use crate::ddl::{generate_ddl, post_load_statement};
use crate::error::Result;

pub use progress::{percent_of, ProgressTracker};

/// State of a single table transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPhase {
    Idle,
    DdlExecuting,
    RowStaging,
    RowCommitting,
    Done,
    Failed,
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferPhase::Idle => "idle",
            TransferPhase::DdlExecuting => "executing DDL",
            TransferPhase::RowStaging => "staging rows",
            TransferPhase::RowCommitting => "committing rows",
            TransferPhase::Done => "done",
            TransferPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Statistics from a completed table transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferStats {
    /// Target table name.
    pub table: String,

    /// Rows committed to the target.
    pub rows: u64,

    /// Row count shown to the user. Equals `rows` unless the legacy
    /// off-by-one count is enabled.
    pub reported_rows: u64,

    /// Wall-clock time for the whole transfer.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,

    /// Time spent executing DDL.
    #[serde(with = "duration_secs")]
    pub ddl_time: Duration,

    /// Time spent committing rows.
    #[serde(with = "duration_secs")]
    pub commit_time: Duration,
}

impl TransferStats {
    /// Elapsed time as `mm:ss:fff`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed)
    }

    /// One-line completion message.
    pub fn summary(&self) -> String {
        format!(
            "{} rows processed in {}",
            self.reported_rows,
            self.elapsed_display()
        )
    }
}

/// Format a duration as `mm:ss:fff`. Minutes keep counting past 59.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    format!(
        "{:02}:{:02}:{:03}",
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

/// Runs table transfers and reports their progress.
pub struct TransferEngine {
    observer: Arc<dyn ProgressObserver>,
    legacy_row_count: bool,
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new(Arc::new(NoopObserver))
    }
}

impl TransferEngine {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            observer,
            legacy_row_count: false,
        }
    }

    /// Report one row more than processed, as older tooling did.
    pub fn with_legacy_row_count(mut self, enabled: bool) -> Self {
        self.legacy_row_count = enabled;
        self
    }

    /// Recreate `data`'s table through `connector` and load its rows.
    pub async fn transfer(
        &self,
        data: &TableData,
        connector: &dyn SinkConnector,
    ) -> Result<TransferStats> {
        let table = data.table().target_name();
        let total = data.row_count() as u64;
        let start = Instant::now();

        info!(
            "Starting transfer of {} ({} rows, {} columns) to {}",
            table,
            total,
            data.table().column_count(),
            connector.dialect().name()
        );
        self.observer.on_table_start(&table, total);
        self.enter(&table, TransferPhase::Idle);

        let dialect = connector.dialect();
        let ddl = generate_ddl(data, dialect);
        let post_load = post_load_statement(data, dialect);
        debug!("{} DDL:\n{}", table, ddl);

        self.enter(&table, TransferPhase::DdlExecuting);
        let mut sink = match connector.open(&table).await {
            Ok(sink) => sink,
            Err(e) => return Err(self.fail(&table, e)),
        };

        let mut stats = TransferStats {
            table: table.clone(),
            ..Default::default()
        };
        let outcome = self
            .run_phases(sink.as_mut(), data, &ddl, post_load.as_deref(), &mut stats)
            .await;
        sink.close().await;

        match outcome {
            Ok(rows) => {
                stats.rows = rows;
                stats.reported_rows = if self.legacy_row_count {
                    debug!("{}: reporting {} rows for {} committed", table, rows + 1, rows);
                    rows + 1
                } else {
                    rows
                };
                stats.elapsed = start.elapsed();

                self.enter(&table, TransferPhase::Done);
                info!("{}: {}", table, stats.summary());
                self.observer.on_complete(&table, &stats);
                Ok(stats)
            }
            Err(e) => Err(self.fail(&table, e)),
        }
    }

    async fn run_phases(
        &self,
        sink: &mut dyn TableSink,
        data: &TableData,
        ddl: &str,
        post_load: Option<&str>,
        stats: &mut TransferStats,
    ) -> Result<u64> {
        let table = stats.table.clone();
        let total = data.row_count() as u64;

        let ddl_start = Instant::now();
        sink.execute_ddl(ddl).await?;
        stats.ddl_time = ddl_start.elapsed();

        self.enter(&table, TransferPhase::RowStaging);
        let mut tracker = ProgressTracker::new(total);
        self.emit(&table, TransferPhase::RowStaging, tracker.start());
        let mut staged = StagedTable::mirror(data.table());
        let mut counter = 0u64;
        for row in data.rows() {
            staged.push(row.clone());
            counter += 1;
            self.emit(&table, TransferPhase::RowStaging, tracker.update(counter));
        }

        self.enter(&table, TransferPhase::RowCommitting);
        let mut tracker = ProgressTracker::new(total);
        self.emit(&table, TransferPhase::RowCommitting, tracker.start());
        let observer = &self.observer;
        let mut on_committed = |committed: u64| {
            if let Some(pct) = tracker.update(committed) {
                observer.on_progress(&table, TransferPhase::RowCommitting, pct);
            }
        };

        let commit_start = Instant::now();
        let committed = sink.insert_rows(&staged, &mut on_committed).await?;
        stats.commit_time = commit_start.elapsed();

        if let Some(sql) = post_load {
            sink.execute(sql).await?;
        }

        Ok(committed)
    }

    fn enter(&self, table: &str, phase: TransferPhase) {
        debug!("{}: {}", table, phase);
        self.observer.on_phase(table, phase);
    }

    fn emit(&self, table: &str, phase: TransferPhase, percent: Option<u8>) {
        if let Some(pct) = percent {
            self.observer.on_progress(table, phase, pct);
        }
    }

    fn fail(&self, table: &str, err: crate::error::MigrateError) -> crate::error::MigrateError {
        error!("Transfer of {} failed: {}", table, err);
        self.enter(table, TransferPhase::Failed);
        err
    }
}
