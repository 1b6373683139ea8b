//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: SQL syntax and type vocabulary
//! - [`PostgresSource`]: reads tables for export to Access
//! - [`PostgresConnector`]: creates and loads tables imported from Access

mod dialect;
mod pool;
mod reader;
mod writer;

pub use dialect::{PostgresDialect, DEFAULT_STRING_THRESHOLD};
pub use pool::SslMode;
pub use reader::{native_type_for, PostgresSource};
pub use writer::{dialect_for, PostgresConnector, PostgresSink};
