//! Table and column descriptors captured from a source database.
//!
//! These types are dialect-neutral: a source driver fills them in once per
//! migrated table, and the DDL generator and transfer engine consume them
//! without modification.

use serde::{Deserialize, Serialize};

use super::identifier::sanitize_identifier;

/// Declared length sentinel meaning "unbounded / not specified by the source".
pub const UNBOUNDED_LENGTH: i32 = -1;

/// Semantic column type as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Decimal,
    Float32,
    Float64,
    DateTime,
    String,
    /// Any source type without a semantic equivalent above (binary, uuid, ...).
    /// Carries the source type name for logging.
    Other(String),
}

impl NativeType {
    /// Whether this is an integer-family type that can back an auto-increment key
    /// of the standard width.
    pub fn is_narrow_integer(&self) -> bool {
        matches!(self, NativeType::Int16 | NativeType::Int32)
    }

    /// Whether this type maps onto the wide auto-increment tier.
    pub fn is_wide_numeric(&self) -> bool {
        matches!(
            self,
            NativeType::Int64 | NativeType::Decimal | NativeType::Float32 | NativeType::Float64
        )
    }

    /// Short lowercase name used in log messages.
    pub fn name(&self) -> &str {
        match self {
            NativeType::Boolean => "boolean",
            NativeType::Byte => "byte",
            NativeType::Int16 => "int16",
            NativeType::Int32 => "int32",
            NativeType::Int64 => "int64",
            NativeType::Decimal => "decimal",
            NativeType::Float32 => "float32",
            NativeType::Float64 => "float64",
            NativeType::DateTime => "datetime",
            NativeType::String => "string",
            NativeType::Other(name) => name.as_str(),
        }
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appears in the source.
    pub name: String,

    /// Ordinal position (1-based). Defines declaration order.
    pub ordinal: i32,

    /// Semantic type.
    pub native_type: NativeType,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Declared maximum length for string columns.
    /// `0` means no declared length, [`UNBOUNDED_LENGTH`] means unbounded.
    pub max_length: i32,

    /// Whether the source flags the column as auto-increment.
    pub is_auto_increment: bool,
}

impl Column {
    /// Create a nullable, non-identity column with no declared length.
    pub fn new(name: impl Into<String>, ordinal: i32, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            ordinal,
            native_type,
            is_nullable: true,
            max_length: 0,
            is_auto_increment: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn with_max_length(mut self, max_length: i32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Sanitized identifier used in the target database.
    pub fn target_name(&self) -> String {
        sanitize_identifier(&self.name)
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name as known to the source.
    pub name: String,

    /// Column definitions, in ordinal order.
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Sanitized identifier used in the target database.
    pub fn target_name(&self) -> String {
        sanitize_identifier(&self.name)
    }

    /// Sanitized target column names, in ordinal order.
    pub fn target_columns(&self) -> Vec<String> {
        self.columns.iter().map(Column::target_name).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
