//! Microsoft Access driver.
//!
//! - [`AccessDialect`]: SQL syntax and type vocabulary
//! - [`AccessSource`]: reads one table per database file (feature `access`)
//! - [`AccessConnector`]: writes each table into a fresh copy of an empty
//!   template database (feature `access`)

mod dialect;
#[cfg(feature = "access")]
mod odbc;
#[cfg(feature = "access")]
mod reader;
#[cfg(feature = "access")]
mod writer;

pub use dialect::{AccessDialect, MAX_TEXT_LENGTH};
#[cfg(feature = "access")]
pub use odbc::AccessOdbc;
#[cfg(feature = "access")]
pub use reader::AccessSource;
#[cfg(feature = "access")]
pub use writer::{AccessConnector, AccessSink};

use crate::core::schema::NativeType;

/// Map an Access catalog `TYPE_NAME` onto a native type.
///
/// Returns `(type, is_auto_increment, is_unbounded_text)`.
pub fn catalog_native_type(type_name: &str) -> (NativeType, bool, bool) {
    match type_name.trim().to_uppercase().as_str() {
        "COUNTER" | "AUTOINCREMENT" => (NativeType::Int32, true, false),
        "BIT" | "YESNO" => (NativeType::Boolean, false, false),
        "BYTE" => (NativeType::Byte, false, false),
        "SMALLINT" | "SHORT" => (NativeType::Int16, false, false),
        "INTEGER" | "LONG" => (NativeType::Int32, false, false),
        "BIGINT" => (NativeType::Int64, false, false),
        "CURRENCY" | "DECIMAL" | "NUMERIC" => (NativeType::Decimal, false, false),
        "REAL" | "SINGLE" => (NativeType::Float32, false, false),
        "DOUBLE" | "FLOAT" => (NativeType::Float64, false, false),
        "DATETIME" | "DATE" | "TIMESTAMP" => (NativeType::DateTime, false, false),
        "VARCHAR" | "CHAR" | "TEXT" => (NativeType::String, false, false),
        "LONGCHAR" | "MEMO" | "LONGTEXT" => (NativeType::String, false, true),
        other => (NativeType::Other(other.to_lowercase()), false, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_native_type() {
        assert_eq!(catalog_native_type("COUNTER"), (NativeType::Int32, true, false));
        assert_eq!(catalog_native_type("integer"), (NativeType::Int32, false, false));
        assert_eq!(catalog_native_type("CURRENCY").0, NativeType::Decimal);
        assert_eq!(catalog_native_type("LONGCHAR"), (NativeType::String, false, true));
        assert_eq!(catalog_native_type("DATETIME").0, NativeType::DateTime);
        assert_eq!(
            catalog_native_type("LONGBINARY").0,
            NativeType::Other("longbinary".into())
        );
    }
}
