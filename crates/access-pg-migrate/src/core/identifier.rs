//! Identifier sanitizing, validation and quoting.
//!
//! SQL identifiers cannot be bound as parameters, so every table and column
//! name that reaches generated SQL goes through this module. Names are first
//! sanitized into the target naming convention, then validated, then quoted
//! for the dialect that will execute the statement.

use crate::error::{MigrateError, Result};

/// Conservative length limit. PostgreSQL truncates at 63 bytes and Access
/// rejects names over 64 characters.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Convert a source name into the target naming convention:
/// dots stripped, lower-cased, spaces replaced with underscores.
pub fn sanitize_identifier(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Derive a table name from an Access file path: file stem, sanitized.
pub fn table_name_from_path(path: &std::path::Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_identifier(&stem)
}

/// Reject identifiers that cannot be safely embedded in generated SQL.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "Identifier exceeds maximum length of {} characters: {:?}",
            MAX_IDENTIFIER_LENGTH, name
        )));
    }

    Ok(())
}

/// PostgreSQL keywords that cannot appear bare as a table or column name.
const PG_RESERVED_WORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "between", "bigint", "binary", "bit", "boolean", "both", "case", "cast",
    "char", "character", "check", "coalesce", "collate", "collation", "column",
    "concurrently", "constraint", "create", "cross", "current_catalog", "current_date",
    "current_role", "current_schema", "current_time", "current_timestamp", "current_user",
    "dec", "decimal", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "exists", "extract", "false", "fetch", "float", "for", "foreign", "freeze",
    "from", "full", "grant", "greatest", "group", "grouping", "having", "ilike", "in",
    "initially", "inner", "inout", "int", "integer", "intersect", "interval", "into", "is",
    "isnull", "join", "lateral", "leading", "least", "left", "like", "limit", "localtime",
    "localtimestamp", "national", "natural", "nchar", "none", "normalize", "not", "notnull",
    "null", "nullif", "numeric", "offset", "on", "only", "or", "order", "out", "outer",
    "overlaps", "overlay", "placing", "position", "precision", "primary", "real",
    "references", "returning", "right", "row", "select", "session_user", "setof",
    "similar", "smallint", "some", "substring", "symmetric", "system_user", "table",
    "tablesample", "then", "time", "timestamp", "to", "trailing", "treat", "trim", "true",
    "union", "unique", "user", "using", "values", "varchar", "variadic", "verbose", "when",
    "where", "window", "with",
];

/// Quote a PostgreSQL identifier: `"name"` with embedded quotes doubled.
pub fn quote_pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// True when `name` is a lowercase non-keyword that PostgreSQL accepts bare.
pub fn is_plain_pg_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !PG_RESERVED_WORDS.contains(&name)
}

/// Leave plain names bare, quote everything else.
pub fn escape_pg(name: &str) -> String {
    if is_plain_pg_identifier(name) {
        name.to_string()
    } else {
        quote_pg(name)
    }
}

/// Qualify a PostgreSQL table name with its schema, both quoted.
pub fn qualify_pg(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_pg(schema), quote_pg(table))
}

/// Quote an Access identifier: `[name]` with closing brackets doubled.
pub fn quote_access(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
