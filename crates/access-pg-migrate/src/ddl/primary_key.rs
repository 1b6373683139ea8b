//! Identity column selection.

use crate::core::schema::Column;

/// Pick at most one identity column.
///
/// Rules, first match wins and ties go to the lowest ordinal:
/// 1. a column flagged auto-increment (if any exists, the name rules are skipped);
/// 2. a column named `id` (case-insensitive);
/// 3. a column whose name ends in `id` (case-insensitive).
pub fn infer_primary_key(columns: &[Column]) -> Option<&Column> {
    let first = |pred: &dyn Fn(&Column) -> bool| {
        columns
            .iter()
            .filter(|c| pred(c))
            .min_by_key(|c| c.ordinal)
    };

    if let Some(col) = first(&|c| c.is_auto_increment) {
        return Some(col);
    }

    first(&|c| c.name.to_lowercase() == "id")
        .or_else(|| first(&|c| c.name.to_lowercase().ends_with("id")))
}
