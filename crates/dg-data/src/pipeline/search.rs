//! Search stages: global term, then per-column terms

use dg_core::value::value_text;
use dg_core::{ColumnRegistry, Row, TableState};
use serde_json::Value;

/// Searchable text of `key` for a row, falling back to the raw field
/// when no column is registered under that key
pub(crate) fn search_text(columns: &ColumnRegistry, key: &str, row: &Row) -> String {
    match columns.get(key) {
        Some(column) => column.search_text(row),
        None => value_text(row.get(key).unwrap_or(&Value::Null)),
    }
}

/// Stage 1: keep rows where any visible column contains the global term
///
/// Matching is gated on visibility, not on the `searchable` flag: a hidden
/// column never matches, a visible one always takes part.
pub fn global_search(
    rows: &[Row],
    columns: &ColumnRegistry,
    state: &TableState,
    indices: Vec<usize>,
) -> Vec<usize> {
    let Some(term) = state.search.global_term() else {
        return indices;
    };

    indices
        .into_iter()
        .filter(|&i| {
            columns
                .visible()
                .any(|column| column.search_text(&rows[i]).to_lowercase().contains(&term))
        })
        .collect()
}

/// Stage 2: keep rows matching every active per-column term
pub fn column_search(
    rows: &[Row],
    columns: &ColumnRegistry,
    state: &TableState,
    indices: Vec<usize>,
) -> Vec<usize> {
    let terms = state.search.column_terms();
    if terms.is_empty() {
        return indices;
    }

    indices
        .into_iter()
        .filter(|&i| {
            terms.iter().all(|(key, term)| {
                search_text(columns, key, &rows[i])
                    .to_lowercase()
                    .contains(term.as_str())
            })
        })
        .collect()
}
