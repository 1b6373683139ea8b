//! In-memory sources, sinks and observers for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::schema::{Column, NativeType, Table, UNBOUNDED_LENGTH};
use crate::core::traits::{Dialect, ProgressObserver, SinkConnector, TableSink, TableSource};
use crate::core::value::{Row, SqlValue, StagedTable, TableData};
use crate::drivers::{AccessDialect, DialectImpl, PostgresDialect};
use crate::error::{MigrateError, Result};
use crate::transfer::{TransferPhase, TransferStats};

/// The `customers` table: auto-increment id, a text name with no declared
/// length and a non-null flag.
pub fn customers() -> TableData {
    let table = Table::new(
        "customers",
        vec![
            Column::new("id", 1, NativeType::Int32).auto_increment(),
            Column::new("name", 2, NativeType::String),
            Column::new("active", 3, NativeType::Boolean).not_null(),
        ],
    );
    let rows = vec![
        vec![SqlValue::I32(1), "Ada".into(), true.into()],
        vec![SqlValue::I32(2), "Grace".into(), false.into()],
        vec![SqlValue::I32(3), SqlValue::Null, true.into()],
    ];
    TableData::new(table, rows).unwrap()
}

/// A key-less table of free text labels and float values.
pub fn labels(rows: usize) -> TableData {
    labels_named("labels", rows)
}

pub fn labels_named(name: &str, rows: usize) -> TableData {
    let table = Table::new(
        name,
        vec![
            Column::new("label", 1, NativeType::String).with_max_length(UNBOUNDED_LENGTH),
            Column::new("value", 2, NativeType::Float64),
        ],
    );
    let rows = (0..rows)
        .map(|i| vec![format!("label {}", i).into(), SqlValue::F64(i as f64)])
        .collect();
    TableData::new(table, rows).unwrap()
}

/// Source serving prepared tables by identifier.
#[derive(Default)]
pub struct MemorySource {
    tables: HashMap<String, TableData>,
}

impl MemorySource {
    pub fn with_table(mut self, identifier: &str, data: TableData) -> Self {
        self.tables.insert(identifier.to_string(), data);
        self
    }
}

#[async_trait]
impl TableSource for MemorySource {
    async fn load_table(&self, identifier: &str) -> Result<TableData> {
        self.tables
            .get(identifier)
            .cloned()
            .ok_or_else(|| MigrateError::source(identifier, "no such table"))
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}

/// Sink activity recorded by [`MemoryConnector`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Opened(String),
    Ddl(String, String),
    Committed(String, u64),
    Executed(String, String),
    Closed(String),
}

#[derive(Default)]
struct SinkState {
    events: Vec<SinkEvent>,
    committed: HashMap<String, Vec<Row>>,
}

#[derive(Default, Clone)]
struct Failures {
    open: HashSet<String>,
    ddl: HashSet<String>,
    commit: HashSet<String>,
}

/// Connector that records everything written to it. Clones share the
/// recording.
#[derive(Clone)]
pub struct MemoryConnector {
    dialect: DialectImpl,
    state: Arc<Mutex<SinkState>>,
    failures: Failures,
}

impl MemoryConnector {
    pub fn postgres() -> Self {
        Self::with_dialect(DialectImpl::Postgres(PostgresDialect::default()))
    }

    pub fn access() -> Self {
        Self::with_dialect(DialectImpl::Access(AccessDialect::new()))
    }

    pub fn with_dialect(dialect: DialectImpl) -> Self {
        Self {
            dialect,
            state: Arc::default(),
            failures: Failures::default(),
        }
    }

    pub fn fail_open_for(mut self, table: &str) -> Self {
        self.failures.open.insert(table.to_string());
        self
    }

    pub fn fail_ddl_for(mut self, table: &str) -> Self {
        self.failures.ddl.insert(table.to_string());
        self
    }

    pub fn fail_commit_for(mut self, table: &str) -> Self {
        self.failures.commit.insert(table.to_string());
        self
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn committed(&self, table: &str) -> Vec<Row> {
        self.state
            .lock()
            .unwrap()
            .committed
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn ddl(&self, table: &str) -> Option<String> {
        self.events().into_iter().find_map(|e| match e {
            SinkEvent::Ddl(t, sql) if t == table => Some(sql),
            _ => None,
        })
    }
}

#[async_trait]
impl SinkConnector for MemoryConnector {
    async fn open(&self, target_table: &str) -> Result<Box<dyn TableSink>> {
        if self.failures.open.contains(target_table) {
            return Err(MigrateError::sink(target_table, "open", "connection refused"));
        }
        self.state
            .lock()
            .unwrap()
            .events
            .push(SinkEvent::Opened(target_table.to_string()));
        Ok(Box::new(MemorySink {
            table: target_table.to_string(),
            state: Arc::clone(&self.state),
            fail_ddl: self.failures.ddl.contains(target_table),
            fail_commit: self.failures.commit.contains(target_table),
        }))
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

struct MemorySink {
    table: String,
    state: Arc<Mutex<SinkState>>,
    fail_ddl: bool,
    fail_commit: bool,
}

impl MemorySink {
    fn record(&self, event: SinkEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn execute_ddl(&mut self, ddl: &str) -> Result<()> {
        if self.fail_ddl {
            return Err(MigrateError::sink(&self.table, "DDL", "syntax error"));
        }
        self.record(SinkEvent::Ddl(self.table.clone(), ddl.to_string()));
        Ok(())
    }

    async fn insert_rows(
        &mut self,
        staged: &StagedTable,
        on_committed: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64> {
        if self.fail_commit {
            return Err(MigrateError::sink(&self.table, "commit", "disk full"));
        }
        let mut committed = 0u64;
        for _ in &staged.rows {
            committed += 1;
            on_committed(committed);
        }
        {
            let mut state = self.state.lock().unwrap();
            state
                .committed
                .insert(self.table.clone(), staged.rows.clone());
            state
                .events
                .push(SinkEvent::Committed(self.table.clone(), committed));
        }
        Ok(committed)
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.record(SinkEvent::Executed(self.table.clone(), sql.to_string()));
        Ok(())
    }

    async fn close(&mut self) {
        self.record(SinkEvent::Closed(self.table.clone()));
    }
}

/// Observer that keeps every notification.
#[derive(Default)]
pub struct RecordingObserver {
    phases: Mutex<Vec<(String, TransferPhase)>>,
    progress: Mutex<Vec<(String, TransferPhase, u8)>>,
    completed: Mutex<Vec<TransferStats>>,
}

impl RecordingObserver {
    pub fn phases(&self, table: &str) -> Vec<TransferPhase> {
        self.phases
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, p)| *p)
            .collect()
    }

    pub fn progress(&self, table: &str, phase: TransferPhase) -> Vec<u8> {
        self.progress
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, p, _)| t == table && *p == phase)
            .map(|(_, _, pct)| *pct)
            .collect()
    }

    pub fn completed(&self) -> Vec<TransferStats> {
        self.completed.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_phase(&self, table: &str, phase: TransferPhase) {
        self.phases.lock().unwrap().push((table.to_string(), phase));
    }

    fn on_progress(&self, table: &str, phase: TransferPhase, percent: u8) {
        self.progress
            .lock()
            .unwrap()
            .push((table.to_string(), phase, percent));
    }

    fn on_complete(&self, _table: &str, stats: &TransferStats) {
        self.completed.lock().unwrap().push(stats.clone());
    }
}
