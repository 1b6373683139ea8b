//! Database driver implementations.
//!
//! - [`postgres`]: PostgreSQL source and sink
//! - [`access`]: Microsoft Access source and sink (ODBC, feature `access`)
//!
//! Each driver provides a `Dialect`; the connection-backed readers and
//! writers implement `TableSource` and `SinkConnector`.

pub mod access;
pub mod postgres;

pub use access::AccessDialect;
pub use postgres::PostgresDialect;

use crate::core::schema::NativeType;
use crate::core::traits::Dialect;
use crate::core::value::SqlValue;

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Postgres(PostgresDialect),
    Access(AccessDialect),
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        match self {
            DialectImpl::Postgres(d) => d.name(),
            DialectImpl::Access(d) => d.name(),
        }
    }

    fn quote_ident(&self, name: &str) -> String {
        match self {
            DialectImpl::Postgres(d) => d.quote_ident(name),
            DialectImpl::Access(d) => d.quote_ident(name),
        }
    }

    fn ddl_ident(&self, name: &str) -> String {
        match self {
            DialectImpl::Postgres(d) => d.ddl_ident(name),
            DialectImpl::Access(d) => d.ddl_ident(name),
        }
    }

    fn ddl_table(&self, table: &str) -> String {
        match self {
            DialectImpl::Postgres(d) => d.ddl_table(table),
            DialectImpl::Access(d) => d.ddl_table(table),
        }
    }

    fn create_table_prefix(&self) -> &'static str {
        match self {
            DialectImpl::Postgres(d) => d.create_table_prefix(),
            DialectImpl::Access(d) => d.create_table_prefix(),
        }
    }

    fn statement_terminator(&self) -> &'static str {
        match self {
            DialectImpl::Postgres(d) => d.statement_terminator(),
            DialectImpl::Access(d) => d.statement_terminator(),
        }
    }

    fn scalar_type(&self, native: &NativeType) -> Option<&'static str> {
        match self {
            DialectImpl::Postgres(d) => d.scalar_type(native),
            DialectImpl::Access(d) => d.scalar_type(native),
        }
    }

    fn identity_type(&self, wide: bool) -> &'static str {
        match self {
            DialectImpl::Postgres(d) => d.identity_type(wide),
            DialectImpl::Access(d) => d.identity_type(wide),
        }
    }

    fn string_type(&self, declared_len: i32, observed_max_len: usize) -> String {
        match self {
            DialectImpl::Postgres(d) => d.string_type(declared_len, observed_max_len),
            DialectImpl::Access(d) => d.string_type(declared_len, observed_max_len),
        }
    }

    fn drop_statement(&self, table: &str) -> Option<String> {
        match self {
            DialectImpl::Postgres(d) => d.drop_statement(table),
            DialectImpl::Access(d) => d.drop_statement(table),
        }
    }

    fn owner_statement(&self, table: &str) -> Option<String> {
        match self {
            DialectImpl::Postgres(d) => d.owner_statement(table),
            DialectImpl::Access(d) => d.owner_statement(table),
        }
    }

    fn inline_primary_key(&self) -> bool {
        match self {
            DialectImpl::Postgres(d) => d.inline_primary_key(),
            DialectImpl::Access(d) => d.inline_primary_key(),
        }
    }

    fn render_literal(&self, value: &SqlValue) -> String {
        match self {
            DialectImpl::Postgres(d) => d.render_literal(value),
            DialectImpl::Access(d) => d.render_literal(value),
        }
    }

    fn sequence_reset_statement(
        &self,
        table: &str,
        column: &str,
        native: &NativeType,
    ) -> Option<String> {
        match self {
            DialectImpl::Postgres(d) => d.sequence_reset_statement(table, column, native),
            DialectImpl::Access(d) => d.sequence_reset_statement(table, column, native),
        }
    }
}
