//! Schema-definition generation.
//!
//! Combines the type mapper and the primary-key inferencer into the DDL that
//! recreates a source table in the target dialect. Output is deterministic:
//! the same table, rows and dialect always produce byte-identical text.

pub mod primary_key;

use crate::core::schema::Column;
use crate::core::traits::{ColumnMapping, Dialect};
use crate::core::value::TableData;
use crate::typemap::map_column;

pub use primary_key::infer_primary_key;

/// Mapped shape of a target table.
#[derive(Debug, Clone)]
pub struct TableDefinition<'a> {
    /// Sanitized target table name.
    pub name: String,
    /// Selected identity column, if any.
    pub identity: Option<&'a Column>,
    /// Column mappings in ordinal order.
    pub columns: Vec<ColumnMapping>,
}

/// Map every column of `data` for `dialect`.
pub fn define_table<'a>(data: &'a TableData, dialect: &dyn Dialect) -> TableDefinition<'a> {
    let table = data.table();
    let identity = infer_primary_key(&table.columns);

    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let is_identity = identity.is_some_and(|id| std::ptr::eq(id, col));
            let observed = data.observed_max_len(idx);
            map_column(col, is_identity, observed, dialect)
        })
        .collect();

    TableDefinition {
        name: table.target_name(),
        identity,
        columns,
    }
}

/// Generate the full DDL batch for `data`.
pub fn generate_ddl(data: &TableData, dialect: &dyn Dialect) -> String {
    let def = define_table(data, dialect);
    render(&def, dialect)
}

/// Statement to run once rows are committed, if the target needs one.
pub fn post_load_statement(data: &TableData, dialect: &dyn Dialect) -> Option<String> {
    let id = infer_primary_key(&data.table().columns)?;
    dialect.sequence_reset_statement(
        &data.table().target_name(),
        &id.target_name(),
        &id.native_type,
    )
}

fn render(def: &TableDefinition<'_>, dialect: &dyn Dialect) -> String {
    let inline_pk = dialect.inline_primary_key();

    let mut clauses: Vec<String> = def
        .columns
        .iter()
        .map(|m| {
            let mut clause = format!("\t{} {}", dialect.ddl_ident(&m.name), m.target_type);
            if m.is_identity && inline_pk {
                clause.push_str(" PRIMARY KEY");
            }
            if m.not_null {
                clause.push_str(" NOT NULL");
            }
            clause
        })
        .collect();

    if !inline_pk {
        if let Some(id) = def.identity {
            clauses.push(format!(
                "\tCONSTRAINT {} PRIMARY KEY ({})",
                dialect.ddl_ident(&format!("{}_pkey", def.name)),
                dialect.ddl_ident(&id.target_name())
            ));
        }
    }

    let mut out = String::new();
    if let Some(drop) = dialect.drop_statement(&def.name) {
        out.push_str(&drop);
        out.push_str("\n\n");
    }

    out.push_str(&format!(
        "{} {} (\n",
        dialect.create_table_prefix(),
        dialect.ddl_table(&def.name)
    ));
    out.push_str(&clauses.join(",\n"));
    out.push_str(&format!("\n){}", dialect.statement_terminator()));

    if let Some(owner) = dialect.owner_statement(&def.name) {
        out.push_str("\n\n");
        out.push_str(&owner);
    }

    out
}
