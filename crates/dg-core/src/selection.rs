//! Row selection keyed by raw-array index
//!
//! Selection identifies rows by their position in the bound data, never by
//! their position in the filtered, sorted or paged view. Replacing the data
//! does not rewrite stored indices: a stale index resolves to whatever row
//! now occupies that slot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value::Row;

/// Tri-state of the "select all" checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckState {
    Checked,
    Indeterminate,
    Unchecked,
}

/// Selection as seen from the current view, for checkbox rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub selected_indices: BTreeSet<usize>,
    pub is_all_selected: bool,
    pub is_partial: bool,
}

impl SelectionSnapshot {
    pub fn check_state(&self) -> CheckState {
        if self.is_all_selected {
            CheckState::Checked
        } else if self.is_partial {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }
}

/// Set of selected raw indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTracker {
    selected: BTreeSet<usize>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row; returns whether it is selected afterwards
    pub fn toggle_row(&mut self, raw_index: usize) -> bool {
        if self.selected.remove(&raw_index) {
            false
        } else {
            self.selected.insert(raw_index);
            true
        }
    }

    /// Select every row of the current view; returns how many were added
    ///
    /// Rows outside the view are left untouched.
    pub fn select_all(&mut self, view_indices: &[usize]) -> usize {
        view_indices
            .iter()
            .filter(|&&index| self.selected.insert(index))
            .count()
    }

    /// Deselect every row of the current view; returns how many were removed
    pub fn deselect_view(&mut self, view_indices: &[usize]) -> usize {
        view_indices
            .iter()
            .filter(|&&index| self.selected.remove(&index))
            .count()
    }

    /// Drop the whole selection; returns how many rows were selected
    pub fn clear_all(&mut self) -> usize {
        let count = self.selected.len();
        self.selected.clear();
        count
    }

    pub fn is_selected(&self, raw_index: usize) -> bool {
        self.selected.contains(&raw_index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected raw indices in ascending order
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Resolve the selection through the current data
    ///
    /// Indices past the end of `rows` are skipped.
    pub fn selected_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.selected.iter().filter_map(|&i| rows.get(i)).collect()
    }

    /// Checked iff every view row is selected, indeterminate iff some are
    pub fn snapshot(&self, view_indices: &[usize]) -> SelectionSnapshot {
        let in_view = view_indices
            .iter()
            .filter(|&&index| self.selected.contains(&index))
            .count();
        let is_all_selected = !view_indices.is_empty() && in_view == view_indices.len();
        SelectionSnapshot {
            selected_indices: self.selected.clone(),
            is_all_selected,
            is_partial: in_view > 0 && !is_all_selected,
        }
    }
}
