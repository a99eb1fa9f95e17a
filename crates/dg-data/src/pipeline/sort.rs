//! Sort stage

use std::cmp::Ordering;

use dg_core::value::compare_values;
use dg_core::{ColumnRegistry, Row, SortOrder, TableState};
use serde_json::Value;

/// Order two sort values; `null` ranks last in either direction
pub fn compare_nulls_last(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_values(a, b);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
    }
}

/// Stage 4: stable sort by the active sort column
pub fn sort_rows(
    rows: &[Row],
    columns: &ColumnRegistry,
    state: &TableState,
    indices: Vec<usize>,
) -> Vec<usize> {
    let Some(key) = state.sort.key.as_deref() else {
        return indices;
    };
    let order = state.sort.order;

    let mut keyed: Vec<(usize, Value)> = indices
        .into_iter()
        .map(|i| {
            let value = match columns.get(key) {
                Some(column) => column.sort_value(&rows[i]),
                None => rows[i].get(key).cloned().unwrap_or(Value::Null),
            };
            (i, value)
        })
        .collect();

    // `sort_by` is stable, so equal values keep their input order
    keyed.sort_by(|(_, a), (_, b)| compare_nulls_last(a, b, order));
    keyed.into_iter().map(|(i, _)| i).collect()
}
