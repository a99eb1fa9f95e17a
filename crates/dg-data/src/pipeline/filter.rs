//! Discrete value filter stage

use dg_core::{ColumnRegistry, Row, TableState};
use serde_json::Value;

/// Value a row offers to the filter of `key`
///
/// Uses the column's filter source when registered, else the raw field.
pub fn filter_value(columns: &ColumnRegistry, key: &str, row: &Row) -> Value {
    match columns.get(key) {
        Some(column) => column.filter_value(row),
        None => row.get(key).cloned().unwrap_or(Value::Null),
    }
}

/// Stage 3: keep rows whose filter values are accepted by every active filter
///
/// Membership is plain equality on the value, with no normalisation.
pub fn active_filters(
    rows: &[Row],
    columns: &ColumnRegistry,
    state: &TableState,
    indices: Vec<usize>,
) -> Vec<usize> {
    let active: Vec<_> = state.filters.active().collect();
    if active.is_empty() {
        return indices;
    }

    indices
        .into_iter()
        .filter(|&i| {
            active
                .iter()
                .all(|(key, accepted)| accepted.contains(&filter_value(columns, key, &rows[i])))
        })
        .collect()
}
