//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, empty identifier list, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source collaborator could not supply a table.
    #[error("Could not read source '{identifier}': {message}")]
    SourceAcquisition { identifier: String, message: String },

    /// The sink rejected DDL or row data for a table.
    #[error("Sink rejected {phase} for table {table}: {message}")]
    SinkExecution {
        table: String,
        phase: String,
        message: String,
    },

    /// A row does not line up with the table's columns.
    #[error("Row {row} of table {table} has {found} values, expected {expected}")]
    RowShape {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// PostgreSQL connection or query error
    #[error("PostgreSQL error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a SourceAcquisition error
    pub fn source(identifier: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::SourceAcquisition {
            identifier: identifier.into(),
            message: message.to_string(),
        }
    }

    /// Create a SinkExecution error
    pub fn sink(table: impl Into<String>, phase: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::SinkExecution {
            table: table.into(),
            phase: phase.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => 2,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("x".into()).exit_code(), 2);
        assert_eq!(MigrateError::sink("t", "DDL", "boom").exit_code(), 1);
        assert_eq!(MigrateError::source("a.accdb", "missing").exit_code(), 1);
    }

    #[test]
    fn test_sink_error_message() {
        let err = MigrateError::sink("customers", "DDL", "syntax error at or near \")\"");
        let msg = err.to_string();
        assert!(msg.contains("customers"));
        assert!(msg.contains("DDL"));
        assert!(msg.contains("syntax error"));
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MigrateError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: no such file"));
    }
}
