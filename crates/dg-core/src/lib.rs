//! Core functionality for the data grid
//!
//! This crate provides the value model, column and action configuration,
//! the mutable table state and the row selection model. Everything here is
//! independent of how the table is eventually drawn.

pub mod action;
pub mod column;
pub mod events;
pub mod selection;
pub mod state;
pub mod value;

use thiserror::Error;

// Re-export commonly used types
pub use action::{action_fn, ActionDef, ActionRegistry, RowAction};
pub use column::{Aggregate, AggregateFn, Align, ColumnDef, ColumnRegistry, ColumnSettings, Formatter};
pub use selection::{CheckState, SelectionSnapshot, SelectionTracker};
pub use state::{
    FilterState, PageInfo, PaginationState, SearchState, SortOrder, SortState, TableState,
};
pub use value::{Row, ValueSource};

/// Errors raised by configuration calls
///
/// These are validation failures: the caller passed something of the wrong
/// shape and must fix the call. Nothing inside the view pipeline produces them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("column key must be a non-empty string")]
    EmptyKey,

    #[error("invalid settings for column '{key}': {reason}")]
    InvalidColumnSettings { key: String, reason: String },

    #[error("action definition requires a non-empty label")]
    MissingActionLabel,

    #[error("page size must be a positive integer, got '{0}'")]
    InvalidPageSize(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid value for option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("invalid style declaration: '{0}'")]
    InvalidStyle(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("unknown action index {0}")]
    UnknownAction(usize),

    #[error("row index {0} is out of range")]
    RowOutOfRange(usize),
}

pub type Result<T> = std::result::Result<T, TableError>;
