//! User interactions the table reacts to

use dg_core::SortOrder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
    GoTo(i64),
}

/// A single interaction, each mutating exactly one piece of table state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserAction {
    /// Confirmed text in the global search box
    Search(String),
    ColumnSearch { key: String, term: String },
    /// Click on one filter option
    ToggleFilter { key: String, value: Value },
    SetFilter { key: String, values: Vec<Value> },
    ClearFilter(String),
    ClearFilters,
    /// Click on a column header
    HeaderClick(String),
    SetSort { key: String, order: SortOrder },
    ClearSort,
    Page(PageNav),
    /// Row checkbox, by raw index
    ToggleRow(usize),
    /// Header checkbox
    ToggleSelectAll,
    ClearSelection,
    SetColumnVisible { key: String, visible: bool },
}
