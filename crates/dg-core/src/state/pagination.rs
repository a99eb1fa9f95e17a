//! Pagination state and page navigation

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Result, TableError};

const DEFAULT_PAGE_SIZE: usize = 10;

/// Page index (1-based) and page size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationState {
    pub enabled: bool,
    page_index: usize,
    page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            enabled: false,
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Set the page size and go back to the first page
    pub fn set_page_size(&mut self, size: i64) -> Result<()> {
        if size <= 0 {
            return Err(TableError::InvalidPageSize(size.to_string()));
        }
        self.page_size = size as usize;
        self.page_index = 1;
        Ok(())
    }

    /// Set the page size from text input, parsed as a number first
    ///
    /// Fractional input is truncated toward zero before validation.
    pub fn set_page_size_text(&mut self, text: &str) -> Result<()> {
        let parsed = text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| TableError::InvalidPageSize(text.to_string()))?;
        let size = parsed.trunc();
        if size < 1.0 || size > i64::MAX as f64 {
            return Err(TableError::InvalidPageSize(text.to_string()));
        }
        self.set_page_size(size as i64)
    }

    /// Number of pages for `total_count` rows, never less than one
    pub fn total_pages(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.page_size).max(1)
    }

    /// Jump to page `n`, clamped into `[1, total_pages]`
    pub fn go_to(&mut self, n: i64, total_count: usize) -> usize {
        let last = self.total_pages(total_count) as i64;
        self.page_index = n.clamp(1, last) as usize;
        self.page_index
    }

    pub fn first(&mut self, total_count: usize) -> usize {
        self.go_to(1, total_count)
    }

    pub fn prev(&mut self, total_count: usize) -> usize {
        self.go_to(self.page_index as i64 - 1, total_count)
    }

    pub fn next(&mut self, total_count: usize) -> usize {
        self.go_to(self.page_index as i64 + 1, total_count)
    }

    pub fn last(&mut self, total_count: usize) -> usize {
        self.go_to(self.total_pages(total_count) as i64, total_count)
    }

    /// Pull an out-of-range page index back into range
    ///
    /// Returns whether the index changed.
    pub fn clamp(&mut self, total_count: usize) -> bool {
        let before = self.page_index;
        self.go_to(before as i64, total_count);
        before != self.page_index
    }

    /// Slice of a `len`-row result shown on the current page
    ///
    /// The page index is used as-is; a page past the end yields an empty range.
    pub fn slice_range(&self, len: usize) -> Range<usize> {
        if !self.enabled {
            return 0..len;
        }
        let start = (self.page_index - 1).saturating_mul(self.page_size).min(len);
        let end = self.page_index.saturating_mul(self.page_size).min(len);
        start..end
    }

    /// 1-based positions of the first and last row shown
    pub fn page_info(&self, total_count: usize) -> PageInfo {
        let range = self.slice_range(total_count);
        if range.is_empty() {
            return PageInfo {
                start: 0,
                end: 0,
                total: total_count,
            };
        }
        PageInfo {
            start: range.start + 1,
            end: range.end,
            total: total_count,
        }
    }

    /// Page numbers to offer as buttons, centred on the current page
    pub fn page_window(&self, total_count: usize, max_buttons: usize) -> Vec<usize> {
        let total_pages = self.total_pages(total_count);
        let max_buttons = max_buttons.max(1);
        if total_pages <= max_buttons {
            return (1..=total_pages).collect();
        }
        let current = self.page_index.clamp(1, total_pages);
        let half = max_buttons / 2;
        let start = current.saturating_sub(half).max(1).min(total_pages + 1 - max_buttons);
        (start..start + max_buttons).collect()
    }
}

/// Range of rows shown, for "Showing X to Y of Z entries"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} entries",
            self.start, self.end, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(size: i64) -> PaginationState {
        let mut state = PaginationState {
            enabled: true,
            ..Default::default()
        };
        state.set_page_size(size).unwrap();
        state
    }

    #[test]
    fn test_total_pages_floor_of_one() {
        let state = paged(5);
        assert_eq!(state.total_pages(0), 1);
        assert_eq!(state.total_pages(5), 1);
        assert_eq!(state.total_pages(6), 2);
        assert_eq!(state.total_pages(10), 2);
    }

    #[test]
    fn test_go_to_always_in_bounds() {
        let mut state = paged(5);
        for n in [-100, -1, 0, 1, 2, 3, 50, i64::MAX, i64::MIN] {
            for total in [0, 1, 5, 12, 100] {
                let page = state.go_to(n, total);
                assert!(page >= 1 && page <= state.total_pages(total), "n={n} total={total}");
            }
        }
    }

    #[test]
    fn test_navigation() {
        let mut state = paged(5);
        assert_eq!(state.prev(23), 1);
        assert_eq!(state.next(23), 2);
        assert_eq!(state.last(23), 5);
        assert_eq!(state.next(23), 5);
        assert_eq!(state.first(23), 1);
    }

    #[test]
    fn test_page_size_validation() {
        let mut state = paged(5);
        state.go_to(3, 50);
        assert!(matches!(state.set_page_size(0), Err(TableError::InvalidPageSize(_))));
        assert!(matches!(state.set_page_size(-3), Err(TableError::InvalidPageSize(_))));
        assert_eq!(state.page_index(), 3);

        state.set_page_size_text(" 20 ").unwrap();
        assert_eq!(state.page_size(), 20);
        assert_eq!(state.page_index(), 1);

        assert!(state.set_page_size_text("abc").is_err());
        assert!(state.set_page_size_text("0.5").is_err());
        assert_eq!(state.page_size(), 20);
    }

    #[test]
    fn test_slice_not_clamped() {
        let mut state = paged(5);
        state.go_to(3, 15);
        assert_eq!(state.slice_range(15), 10..15);
        // Result shrank without a clamp: the page is simply empty
        assert!(state.slice_range(4).is_empty());
        assert!(state.clamp(4));
        assert_eq!(state.page_index(), 1);
        assert!(!state.clamp(4));
    }

    #[test]
    fn test_page_info() {
        let mut state = paged(5);
        state.go_to(2, 12);
        assert_eq!(state.page_info(12).to_string(), "Showing 6 to 10 of 12 entries");
        assert_eq!(state.page_info(0).to_string(), "Showing 0 to 0 of 0 entries");

        state.enabled = false;
        assert_eq!(state.page_info(12), PageInfo { start: 1, end: 12, total: 12 });
    }

    #[test]
    fn test_page_window() {
        let mut state = paged(1);
        assert_eq!(state.page_window(3, 5), vec![1, 2, 3]);
        state.go_to(1, 20);
        assert_eq!(state.page_window(20, 5), vec![1, 2, 3, 4, 5]);
        state.go_to(10, 20);
        assert_eq!(state.page_window(20, 5), vec![8, 9, 10, 11, 12]);
        state.go_to(20, 20);
        assert_eq!(state.page_window(20, 5), vec![16, 17, 18, 19, 20]);
    }
}
