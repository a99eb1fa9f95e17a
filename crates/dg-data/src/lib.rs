//! Row derivation for the data grid
//!
//! Turns the bound rows plus the current table state into the rows to
//! display, and computes the footer aggregates over the matching set.

pub mod aggregate;
pub mod index;
pub mod pipeline;

// Re-exports
pub use aggregate::compute_aggregates;
pub use index::{filter_options, raw_index_of, resolve_indices, FilterOption};
pub use pipeline::{run_pipeline, PipelineOutput};
