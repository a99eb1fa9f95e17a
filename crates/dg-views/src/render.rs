//! Rendering contract and a plain-text renderer
//!
//! The table never builds markup itself. Each refresh produces a
//! [`RenderFrame`] describing exactly what to draw, and a [`TableRenderer`]
//! turns it into whatever the host displays.

use dg_core::value::strip_markup;
use dg_core::{ActionDef, Align, CheckState, ColumnDef, PageInfo, Row, SortOrder};
use indexmap::IndexMap;

/// One displayed row
#[derive(Debug, Clone)]
pub struct FrameRow<'a> {
    pub raw_index: usize,
    pub row: &'a Row,
    /// 1-based number derived from the raw index, stable across sorting
    pub number: usize,
    pub selected: bool,
    /// Cell markup for each visible column
    pub cells: Vec<String>,
    /// Whether each action button is disabled because its handler is running
    pub actions_disabled: Vec<bool>,
}

/// Pagination controls for the current page
#[derive(Debug, Clone, PartialEq)]
pub struct PageControls {
    pub page_index: usize,
    pub total_pages: usize,
    pub buttons: Vec<usize>,
    pub can_prev: bool,
    pub can_next: bool,
}

/// Everything needed to draw the table once
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub table_id: &'a str,
    pub title: Option<&'a str>,
    pub caption: Option<&'a str>,
    pub class_name: Option<&'a str>,
    pub style: String,
    pub columns: Vec<&'a ColumnDef>,
    pub actions: Vec<&'a ActionDef>,
    pub rows: Vec<FrameRow<'a>>,
    pub row_numbers: bool,
    /// Header checkbox state; `None` when row selection is off
    pub select_all: Option<CheckState>,
    pub search: Option<&'a str>,
    pub sort: Option<(&'a str, SortOrder)>,
    /// Footer texts keyed by column; `None` when totals are off
    pub aggregates: Option<IndexMap<String, String>>,
    pub info: PageInfo,
    /// `None` when pagination is off
    pub pages: Option<PageControls>,
    /// Message for the explicit "no results" state
    pub empty_message: Option<&'a str>,
}

impl<'a> RenderFrame<'a> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Turns a frame into displayable output
pub trait TableRenderer {
    type Output;

    fn render(&mut self, frame: &RenderFrame<'_>) -> Self::Output;
}

/// Renders a frame as an aligned plain-text table
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub max_cell_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { max_cell_width: 30 }
    }
}

impl TextRenderer {
    fn clip(&self, text: &str) -> String {
        if text.chars().count() > self.max_cell_width {
            let cut: String = text.chars().take(self.max_cell_width.saturating_sub(3)).collect();
            format!("{}...", cut)
        } else {
            text.to_string()
        }
    }

    fn pad(text: &str, width: usize, align: Align) -> String {
        let fill = width.saturating_sub(text.chars().count());
        match align {
            Align::Start => format!("{}{}", text, " ".repeat(fill)),
            Align::End => format!("{}{}", " ".repeat(fill), text),
            Align::Center => {
                let left = fill / 2;
                format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
            }
        }
    }
}

impl TableRenderer for TextRenderer {
    type Output = String;

    fn render(&mut self, frame: &RenderFrame<'_>) -> String {
        let mut lines = Vec::new();

        if let Some(title) = frame.title {
            lines.push(title.to_string());
        }
        if let Some(term) = frame.search.filter(|t| !t.trim().is_empty()) {
            lines.push(format!("Search: {}", term));
        }

        // Header cells, then body cells, as (text, align) grids
        let mut header: Vec<(String, Align)> = Vec::new();
        if let Some(state) = frame.select_all {
            let mark = match state {
                CheckState::Checked => "[x]",
                CheckState::Indeterminate => "[-]",
                CheckState::Unchecked => "[ ]",
            };
            header.push((mark.to_string(), Align::Start));
        }
        if frame.row_numbers {
            header.push(("#".to_string(), Align::End));
        }
        for column in &frame.columns {
            let marker = match frame.sort {
                Some((key, SortOrder::Asc)) if key == column.key() => " ^",
                Some((key, SortOrder::Desc)) if key == column.key() => " v",
                _ => "",
            };
            header.push((format!("{}{}", column.label, marker), column.header_align));
        }
        if !frame.actions.is_empty() {
            header.push(("Actions".to_string(), Align::Start));
        }

        let body: Vec<Vec<(String, Align)>> = frame
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::new();
                if frame.select_all.is_some() {
                    let mark = if row.selected { "[x]" } else { "[ ]" };
                    cells.push((mark.to_string(), Align::Start));
                }
                if frame.row_numbers {
                    cells.push((row.number.to_string(), Align::End));
                }
                for (column, cell) in frame.columns.iter().zip(&row.cells) {
                    cells.push((self.clip(&strip_markup(cell)), column.content_align));
                }
                if !frame.actions.is_empty() {
                    let buttons: Vec<String> = frame
                        .actions
                        .iter()
                        .zip(&row.actions_disabled)
                        .map(|(action, disabled)| {
                            if *disabled {
                                format!("({}...)", action.label)
                            } else {
                                format!("[{}]", action.label)
                            }
                        })
                        .collect();
                    cells.push((buttons.join(" "), Align::Start));
                }
                cells
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|(t, _)| t.chars().count()).collect();
        for cells in &body {
            for (i, (text, _)) in cells.iter().enumerate() {
                widths[i] = widths[i].max(text.chars().count());
            }
        }

        let join = |cells: &[(String, Align)]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|((text, align), &width)| Self::pad(text, width, *align))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        lines.push(join(&header));
        lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        if frame.is_empty() {
            lines.push(frame.empty_message.unwrap_or("No results").to_string());
        }
        for cells in &body {
            lines.push(join(cells));
        }

        if let Some(aggregates) = &frame.aggregates {
            let totals: Vec<String> = frame
                .columns
                .iter()
                .filter_map(|column| {
                    aggregates
                        .get(column.key())
                        .map(|text| format!("{}: {}", column.label, text))
                })
                .collect();
            if !totals.is_empty() {
                lines.push(format!("Totals: {}", totals.join(", ")));
            }
        }

        let mut footer = frame.info.to_string();
        if let Some(pages) = &frame.pages {
            footer.push_str(&format!(" (page {} of {})", pages.page_index, pages.total_pages));
        }
        lines.push(footer);

        if let Some(caption) = frame.caption {
            lines.push(caption.to_string());
        }

        lines.join("\n")
    }
}
