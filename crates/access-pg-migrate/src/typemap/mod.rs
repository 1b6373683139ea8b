//! Type mapping from source columns to target column types.
//!
//! The mapper is total: every column produces a type token. Types the target
//! cannot express fall back to the dialect's string types.

use tracing::warn;

use crate::core::schema::{Column, NativeType};
use crate::core::traits::{ColumnMapping, Dialect};

/// Map a column into its target definition.
///
/// `observed_max_len` is the longest text value seen in the column and is only
/// consulted for unbounded string columns.
pub fn map_column(
    column: &Column,
    is_identity: bool,
    observed_max_len: usize,
    dialect: &dyn Dialect,
) -> ColumnMapping {
    let target_type = if is_identity {
        identity_type(column, dialect)
    } else {
        value_type(column, observed_max_len, dialect)
    };

    ColumnMapping {
        name: column.target_name(),
        target_type,
        not_null: !is_identity && !column.is_nullable,
        is_identity,
    }
}

fn identity_type(column: &Column, dialect: &dyn Dialect) -> String {
    let native = &column.native_type;
    if native.is_narrow_integer() {
        dialect.identity_type(false).to_string()
    } else if native.is_wide_numeric() {
        dialect.identity_type(true).to_string()
    } else {
        warn!(
            "Identity column {} has type {}, which cannot auto-increment in {}; using {}",
            column.name,
            native.name(),
            dialect.name(),
            dialect.unbounded_string_type()
        );
        dialect.unbounded_string_type().to_string()
    }
}

fn value_type(column: &Column, observed_max_len: usize, dialect: &dyn Dialect) -> String {
    if let Some(scalar) = dialect.scalar_type(&column.native_type) {
        return scalar.to_string();
    }

    if let NativeType::Other(name) = &column.native_type {
        warn!(
            "Column {} has unsupported type {}, mapping as string",
            column.name, name
        );
    }
    dialect.string_type(column.max_length, observed_max_len)
}
