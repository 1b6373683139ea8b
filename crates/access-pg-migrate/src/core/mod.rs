//! Core abstractions shared by every driver.
//!
//! - [`schema`]: table and column descriptors
//! - [`value`]: cell values, rows and staged tables
//! - [`traits`]: dialect, source, sink and observer seams
//! - [`identifier`]: sanitizing and quoting of names

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{Column, NativeType, Table, UNBOUNDED_LENGTH};
pub use traits::{
    ColumnMapping, Dialect, NoopObserver, ProgressObserver, SinkConnector, TableSink, TableSource,
};
pub use value::{Row, SqlValue, StagedTable, TableData};
