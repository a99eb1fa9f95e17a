//! Footer aggregates over the matching rows
//!
//! Aggregates summarise everything that passed search, filters and sort,
//! regardless of which page is displayed.

use dg_core::value::{format_number, value_number};
use dg_core::{Aggregate, ColumnDef, ColumnRegistry, Row};
use indexmap::IndexMap;

/// Numeric values of a column across rows, skipping non-numeric ones
fn numeric_values(column: &ColumnDef, rows: &[&Row]) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| value_number(column.raw_value(row)))
        .collect()
}

/// Compute one column's aggregate text, without its label
pub fn aggregate_value(column: &ColumnDef, aggregate: &Aggregate, rows: &[&Row]) -> String {
    match aggregate {
        Aggregate::Sum => format_number(numeric_values(column, rows).iter().sum()),
        Aggregate::Avg => {
            let values = numeric_values(column, rows);
            if values.is_empty() {
                format_number(0.0)
            } else {
                format_number(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
        // Counts the numeric subset, not every matching row
        Aggregate::Count => numeric_values(column, rows).len().to_string(),
        Aggregate::Custom(f) => f(rows),
    }
}

/// Display text of every column with an aggregate, keyed by column key
///
/// `matching_indices` is the sorted, unpaged output of the pipeline. With an
/// aggregate label set, the text reads `"{label}: {value}"`.
pub fn compute_aggregates(
    rows: &[Row],
    matching_indices: &[usize],
    columns: &ColumnRegistry,
) -> IndexMap<String, String> {
    let matching: Vec<&Row> = matching_indices.iter().filter_map(|&i| rows.get(i)).collect();

    columns
        .iter()
        .filter_map(|column| {
            let aggregate = column.aggregate.as_ref()?;
            let value = aggregate_value(column, aggregate, &matching);
            let text = match &column.aggregate_label {
                Some(label) => format!("{}: {}", label, value),
                None => value,
            };
            Some((column.key().to_string(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_pipeline;
    use dg_core::{ColumnDef, TableState};
    use serde_json::json;

    fn mixed_rows() -> Vec<Row> {
        json!([{"v": 10}, {"v": "x"}, {"v": 20}])
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn aggregate_of(aggregate: Aggregate) -> String {
        let data = mixed_rows();
        let mut columns = ColumnRegistry::new();
        columns.define("v", ColumnDef::new("V").aggregate(aggregate)).unwrap();
        compute_aggregates(&data, &[0, 1, 2], &columns)["v"].clone()
    }

    #[test]
    fn test_sum_avg_count_skip_non_numeric() {
        assert_eq!(aggregate_of(Aggregate::Sum), "30");
        assert_eq!(aggregate_of(Aggregate::Avg), "15");
        assert_eq!(aggregate_of(Aggregate::Count), "2");
    }

    #[test]
    fn test_avg_of_nothing_is_zero() {
        let data = mixed_rows();
        let mut columns = ColumnRegistry::new();
        columns.define("v", ColumnDef::new("V").aggregate(Aggregate::Avg)).unwrap();
        assert_eq!(compute_aggregates(&data, &[1], &columns)["v"], "0");
        assert_eq!(compute_aggregates(&data, &[], &columns)["v"], "0");
    }

    #[test]
    fn test_label_and_custom() {
        let data = mixed_rows();
        let mut columns = ColumnRegistry::new();
        columns
            .define("v", ColumnDef::new("V").aggregate(Aggregate::Sum).aggregate_label("Total"))
            .unwrap();
        columns
            .define("w", ColumnDef::new("W").aggregate_with(|rows| format!("{} rows", rows.len())))
            .unwrap();
        columns.define("plain", ColumnDef::new("Plain")).unwrap();

        let result = compute_aggregates(&data, &[0, 1, 2], &columns);
        assert_eq!(result["v"], "Total: 30");
        assert_eq!(result["w"], "3 rows");
        assert!(!result.contains_key("plain"));
    }

    #[test]
    fn test_aggregates_ignore_pagination() {
        let data: Vec<Row> = (1..=10)
            .map(|n| json!({"n": n}).as_object().cloned().unwrap())
            .collect();
        let mut columns = ColumnRegistry::new();
        columns.define("n", ColumnDef::new("N").aggregate(Aggregate::Sum)).unwrap();

        let mut state = TableState::default();
        state.pagination.enabled = true;
        state.pagination.set_page_size(3).unwrap();
        state.filters.set("n", vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);

        let output = run_pipeline(&data, &columns, &state);
        assert_eq!(output.view_rows.len(), 3);
        let result = compute_aggregates(&data, &output.matching_indices, &columns);
        assert_eq!(result["n"], "15");
    }
}
