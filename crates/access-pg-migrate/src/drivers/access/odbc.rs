//! ODBC plumbing shared by the Access source and sink.
//!
//! ODBC handles are not thread-safe, so every call runs behind a mutex and
//! opens its own connection to the database file.

use std::path::Path;
use std::sync::Arc;

use odbc_api::buffers::TextRowSet;
use odbc_api::{Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{MigrateError, Result};

/// Rows fetched per ODBC round trip.
const FETCH_BATCH: usize = 1000;

/// Upper bound for a single text cell; longer values are truncated by the driver.
const MAX_TEXT_BYTES: usize = 65536;

/// One text-mode result row.
pub type TextRow = Vec<Option<String>>;

/// Shared ODBC environment for Access database files.
pub struct AccessOdbc {
    env: Arc<Environment>,
    driver: String,
    lock: Mutex<()>,
}

impl AccessOdbc {
    /// Create the ODBC environment. Fails if no driver manager is installed.
    pub fn new(driver: &str) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            MigrateError::Config(format!(
                "Failed to create ODBC environment: {}. \
                 Install an ODBC driver manager and the Microsoft Access driver.",
                e
            ))
        })?;

        Ok(Self {
            env: Arc::new(env),
            driver: driver.to_string(),
            lock: Mutex::new(()),
        })
    }

    /// Serialize access to the driver for the duration of the guard.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn connection_string(&self, path: &Path) -> String {
        connection_string(&self.driver, path)
    }

    /// Open a connection to `path`.
    pub fn connect(&self, path: &Path) -> Result<Connection<'_>> {
        debug!("Opening ODBC connection to {}", path.display());
        self.env
            .connect_with_connection_string(&self.connection_string(path), ConnectionOptions::default())
            .map_err(|e| {
                MigrateError::pool(
                    format!("ODBC connection failed: {}", e),
                    format!("opening {}", path.display()),
                )
            })
    }
}

/// Connection string for an Access database file.
pub fn connection_string(driver: &str, path: &Path) -> String {
    format!("Driver={{{}}};Dbq={};", driver, path.display())
}

/// Run `sql` and fetch every row as text.
pub fn query_text(conn: &Connection<'_>, sql: &str) -> std::result::Result<Vec<TextRow>, String> {
    match conn
        .execute(sql, ())
        .map_err(|e| format!("query failed: {} - SQL: {}", e, sql))?
    {
        Some(cursor) => fetch_text(cursor),
        None => Ok(Vec::new()),
    }
}

/// Fetch every row from a cursor as text.
pub fn fetch_text(mut cursor: impl Cursor) -> std::result::Result<Vec<TextRow>, String> {
    let num_cols = cursor
        .num_result_cols()
        .map_err(|e| format!("failed to get column count: {}", e))? as usize;

    let mut buffers = TextRowSet::for_cursor(FETCH_BATCH, &mut cursor, Some(MAX_TEXT_BYTES))
        .map_err(|e| format!("failed to create row buffer: {}", e))?;
    let mut row_cursor = cursor
        .bind_buffer(&mut buffers)
        .map_err(|e| format!("failed to bind buffer: {}", e))?;

    let mut rows = Vec::new();
    while let Some(batch) = row_cursor
        .fetch()
        .map_err(|e| format!("failed to fetch rows: {}", e))?
    {
        for row_idx in 0..batch.num_rows() {
            let row = (0..num_cols)
                .map(|col_idx| {
                    batch
                        .at(col_idx, row_idx)
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                })
                .collect();
            rows.push(row);
        }
    }

    Ok(rows)
}
