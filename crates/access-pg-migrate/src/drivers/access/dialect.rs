//! Microsoft Access (Jet/ACE) SQL dialect.

use crate::core::identifier::quote_access;
use crate::core::schema::NativeType;
use crate::core::traits::Dialect;
use crate::core::value::SqlValue;

/// Longest text column Access can declare; anything above is `LONGTEXT`.
pub const MAX_TEXT_LENGTH: i32 = 255;

/// Access dialect implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDialect;

impl AccessDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for AccessDialect {
    fn name(&self) -> &str {
        "access"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_access(name)
    }

    fn ddl_ident(&self, name: &str) -> String {
        self.quote_ident(name)
    }

    fn ddl_table(&self, table: &str) -> String {
        self.quote_ident(table)
    }

    fn scalar_type(&self, native: &NativeType) -> Option<&'static str> {
        match native {
            NativeType::Boolean => Some("BIT"),
            NativeType::Byte => Some("BYTE"),
            NativeType::Int16 => Some("SHORT"),
            NativeType::Int32 => Some("LONG"),
            NativeType::Int64 => Some("CURRENCY"),
            NativeType::Decimal => Some("DECIMAL"),
            NativeType::DateTime => Some("DATETIME"),
            NativeType::Float32 => Some("SINGLE"),
            NativeType::Float64 => Some("DOUBLE"),
            NativeType::String | NativeType::Other(_) => None,
        }
    }

    // Access has a single counter width.
    fn identity_type(&self, _wide: bool) -> &'static str {
        "AUTOINCREMENT"
    }

    // An undeclared length is sized by the longest value actually seen.
    fn string_type(&self, declared_len: i32, observed_max_len: usize) -> String {
        match declared_len {
            0 => self.unbounded_string_type().to_string(),
            n if n < 0 && observed_max_len > MAX_TEXT_LENGTH as usize => "LONGTEXT".to_string(),
            n if n < 0 => self.unbounded_string_type().to_string(),
            n if n <= MAX_TEXT_LENGTH => format!("VARCHAR({})", n),
            _ => "LONGTEXT".to_string(),
        }
    }

    // The sink starts from an empty template file, so nothing to drop.
    fn drop_statement(&self, _table: &str) -> Option<String> {
        None
    }

    fn owner_statement(&self, _table: &str) -> Option<String> {
        None
    }

    fn inline_primary_key(&self) -> bool {
        true
    }

    fn render_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            SqlValue::Byte(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::F32(v) if v.is_finite() => v.to_string(),
            SqlValue::F64(v) if v.is_finite() => v.to_string(),
            // Jet has no NaN or infinity.
            SqlValue::F32(_) | SqlValue::F64(_) => "NULL".to_string(),
            SqlValue::DateTime(dt) => format!("#{}#", dt.format("%Y-%m-%d %H:%M:%S")),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_quote_ident() {
        let d = AccessDialect;
        assert_eq!(d.quote_ident("Order Details"), "[Order Details]");
        assert_eq!(d.quote_ident("a]b"), "[a]]b]");
        assert_eq!(d.ddl_table("customers"), "[customers]");
    }

    #[test]
    fn test_no_drop_or_owner() {
        let d = AccessDialect;
        assert!(d.drop_statement("t").is_none());
        assert!(d.owner_statement("t").is_none());
        assert!(d.inline_primary_key());
    }

    #[test]
    fn test_render_literal() {
        let d = AccessDialect;
        assert_eq!(d.render_literal(&SqlValue::Bool(true)), "1");
        assert_eq!(d.render_literal(&SqlValue::Bool(false)), "0");
        assert_eq!(d.render_literal(&"it's".into()), "'it''s'");
        assert_eq!(d.render_literal(&SqlValue::F64(f64::INFINITY)), "NULL");
        let dt = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        assert_eq!(
            d.render_literal(&SqlValue::DateTime(dt)),
            "#1999-12-31 23:59:01#"
        );
    }
}
