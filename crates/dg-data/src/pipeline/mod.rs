//! The view pipeline
//!
//! Five strictly ordered stages turn the bound rows into the rows to show:
//!
//! 1. global search
//! 2. per-column search
//! 3. discrete value filters
//! 4. sort
//! 5. paginate
//!
//! Every stage works on raw row indices, so each output row carries its
//! position in the bound data. The pipeline never mutates its inputs and
//! never clamps the page index; callers decide how to react to a page that
//! fell out of range.

mod filter;
mod search;
mod sort;

pub use filter::{active_filters, filter_value};
pub use search::{column_search, global_search};
pub use sort::{compare_nulls_last, sort_rows};

use dg_core::{ColumnRegistry, Row, TableState};

/// Signature shared by the filtering and sorting stages
pub type Stage = fn(&[Row], &ColumnRegistry, &TableState, Vec<usize>) -> Vec<usize>;

/// Stages 1 to 4, in order
pub const STAGES: [Stage; 4] = [global_search, column_search, active_filters, sort_rows];

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<'a> {
    /// Rows to display, in display order
    pub view_rows: Vec<&'a Row>,
    /// Raw index of each displayed row
    pub view_indices: Vec<usize>,
    /// Raw indices of all matching rows, sorted but not paged
    pub matching_indices: Vec<usize>,
    /// Number of matching rows before pagination
    pub total_count: usize,
}

impl<'a> PipelineOutput<'a> {
    pub fn is_empty(&self) -> bool {
        self.view_rows.is_empty()
    }

    /// Matching rows, sorted but not paged
    ///
    /// Indices past the end of `rows` are skipped.
    pub fn matching_rows(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.matching_indices.iter().filter_map(|&i| rows.get(i)).collect()
    }
}

/// Stages 1 to 4: the sorted raw indices of every matching row
pub fn matching_indices(rows: &[Row], columns: &ColumnRegistry, state: &TableState) -> Vec<usize> {
    STAGES
        .iter()
        .fold((0..rows.len()).collect::<Vec<usize>>(), |indices, stage| {
            stage(rows, columns, state, indices)
        })
}

/// Run the whole pipeline
pub fn run_pipeline<'a>(
    rows: &'a [Row],
    columns: &ColumnRegistry,
    state: &TableState,
) -> PipelineOutput<'a> {
    let matching = matching_indices(rows, columns, state);
    let total_count = matching.len();

    let range = state.pagination.slice_range(total_count);
    let view_indices = matching[range].to_vec();
    let view_rows = view_indices.iter().map(|&i| &rows[i]).collect();

    tracing::debug!(
        "Pipeline: {} rows -> {} matching -> {} shown",
        rows.len(),
        total_count,
        view_indices.len()
    );

    PipelineOutput {
        view_rows,
        view_indices,
        matching_indices: matching,
        total_count,
    }
}
