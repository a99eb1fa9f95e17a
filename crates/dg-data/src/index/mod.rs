//! Row identity lookup and filter option indexing

use ahash::AHashMap;
use dg_core::value::value_text;
use dg_core::{ColumnRegistry, Row};
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::filter_value;

/// Raw index of a row, by identity
///
/// Two structurally equal rows are still distinct: only the row object that
/// actually lives in `rows` resolves. A row from anywhere else is `None`.
pub fn raw_index_of(rows: &[Row], row: &Row) -> Option<usize> {
    rows.iter().position(|candidate| std::ptr::eq(candidate, row))
}

/// Raw index of each row, `None` for rows not found in `rows`
pub fn resolve_indices(rows: &[Row], view_rows: &[&Row]) -> Vec<Option<usize>> {
    view_rows.iter().map(|row| raw_index_of(rows, row)).collect()
}

/// One selectable value of a discrete filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOption {
    pub value: Value,
    pub label: String,
    pub count: usize,
}

/// Distinct filter values of a column across all rows
///
/// Values are derived exactly as the filter stage derives them, so every
/// option offered can actually match. Options keep first-appearance order.
pub fn filter_options(rows: &[Row], columns: &ColumnRegistry, key: &str) -> Vec<FilterOption> {
    let mut options: Vec<FilterOption> = Vec::new();
    // Keyed by the JSON rendering so that 1 and "1" stay separate
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for row in rows {
        let value = filter_value(columns, key, row);
        let fingerprint = value.to_string();
        match positions.get(&fingerprint) {
            Some(&pos) => options[pos].count += 1,
            None => {
                positions.insert(fingerprint, options.len());
                options.push(FilterOption {
                    label: value_text(&value),
                    value,
                    count: 1,
                });
            }
        }
    }

    options
}
