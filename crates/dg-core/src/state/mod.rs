//! Mutable table state: search terms, filters, sort and pagination
//!
//! Every piece of UI state lives in one [`TableState`] owned by the widget.
//! The view pipeline only ever borrows it.

mod pagination;

pub use pagination::{PageInfo, PaginationState};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalise a search term: trimmed and lower-cased, `None` when blank
fn normalise_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Global and per-column search terms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub global: String,
    pub columns: IndexMap<String, String>,
}

impl SearchState {
    pub fn set_global(&mut self, term: impl Into<String>) {
        self.global = term.into();
    }

    /// Set the search term of one column; a blank term removes it
    pub fn set_column(&mut self, key: impl Into<String>, term: impl Into<String>) {
        let key = key.into();
        let term = term.into();
        if term.trim().is_empty() {
            self.columns.shift_remove(&key);
        } else {
            self.columns.insert(key, term);
        }
    }

    pub fn clear(&mut self) {
        self.global.clear();
        self.columns.clear();
    }

    /// Trimmed, lower-cased global term, if any
    pub fn global_term(&self) -> Option<String> {
        normalise_term(&self.global)
    }

    /// Active per-column terms, trimmed and lower-cased
    pub fn column_terms(&self) -> Vec<(&str, String)> {
        self.columns
            .iter()
            .filter_map(|(key, term)| normalise_term(term).map(|t| (key.as_str(), t)))
            .collect()
    }
}

/// Accepted discrete values per column
///
/// A column without an entry, or with an empty set, is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    accepted: IndexMap<String, Vec<Value>>,
}

impl FilterState {
    /// Accept a value for a column, or stop accepting it if already present
    ///
    /// Returns whether the value is accepted afterwards.
    pub fn toggle(&mut self, key: impl Into<String>, value: Value) -> bool {
        let values = self.accepted.entry(key.into()).or_default();
        if let Some(pos) = values.iter().position(|v| *v == value) {
            values.remove(pos);
            false
        } else {
            values.push(value);
            true
        }
    }

    /// Replace the accepted set of a column
    pub fn set(&mut self, key: impl Into<String>, values: Vec<Value>) {
        let mut unique: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        self.accepted.insert(key.into(), unique);
    }

    pub fn clear(&mut self, key: &str) {
        self.accepted.shift_remove(key);
    }

    pub fn clear_all(&mut self) {
        self.accepted.clear();
    }

    pub fn accepted(&self, key: &str) -> &[Value] {
        self.accepted.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Columns with a non-empty accepted set
    pub fn active(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.accepted
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn is_active(&self) -> bool {
        self.active().next().is_some()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort column and direction; no key keeps the raw order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub order: SortOrder,
}

impl SortState {
    pub fn set(&mut self, key: impl Into<String>, order: SortOrder) {
        self.key = Some(key.into());
        self.order = order;
    }

    /// Header click: the active column flips direction, a new one starts ascending
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.order = self.order.reversed();
        } else {
            self.key = Some(key.to_string());
            self.order = SortOrder::Asc;
        }
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.order = SortOrder::Asc;
    }

    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// All state the view pipeline reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub search: SearchState,
    pub filters: FilterState,
    pub sort: SortState,
    pub pagination: PaginationState,
}
