//! The data table widget
//!
//! [`DataTable`] owns the rows, the column and action definitions, the
//! table state and the selection. Every interaction mutates one piece of
//! state and then recomputes the view; the view itself is always derived on
//! demand from the pure pipeline.

use std::future::Future;

use dg_core::events::events::{DataReplaced, SelectionChanged, ViewChanged};
use dg_core::events::EventBus;
use dg_core::{
    ActionDef, ActionRegistry, ColumnDef, ColumnRegistry, PageInfo, Result, Row,
    SelectionSnapshot, SelectionTracker, TableError, TableState,
};
use dg_data::pipeline::matching_indices;
use dg_data::{compute_aggregates, filter_options, run_pipeline, FilterOption, PipelineOutput};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::actions::{action_task, ActionOutcome, InFlight};
use crate::export::rows_to_csv;
use crate::input::{PageNav, UserAction};
use crate::options::{parse_style, style_string, ConfigReader, TableOptions};
use crate::render::{FrameRow, PageControls, RenderFrame, TableRenderer};

/// What an interaction touched
enum Effect {
    View,
    Selection,
    Nothing,
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(TableError::InvalidOption {
            option: "id".to_string(),
            reason: "must be a non-empty string without whitespace".to_string(),
        });
    }
    Ok(())
}

fn validate_class(class: &str) -> Result<()> {
    if class.trim().is_empty() {
        return Err(TableError::InvalidOption {
            option: "className".to_string(),
            reason: "must be a non-empty string".to_string(),
        });
    }
    Ok(())
}

/// Declaratively configured data table
pub struct DataTable {
    id: String,
    options: TableOptions,
    rows: Vec<Row>,
    columns: ColumnRegistry,
    actions: ActionRegistry,
    state: TableState,
    selection: SelectionTracker,
    total_count: usize,
    event_bus: EventBus,
    in_flight: InFlight,
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTable {
    /// Create an empty table with a generated id
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Create an empty table publishing on an existing event bus
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            id: format!("datagrid-{}", Uuid::new_v4().simple()),
            options: TableOptions::default(),
            rows: Vec::new(),
            columns: ColumnRegistry::new(),
            actions: ActionRegistry::new(),
            state: TableState::default(),
            selection: SelectionTracker::new(),
            total_count: 0,
            event_bus,
            in_flight: InFlight::default(),
        }
    }

    /// Replace the bound rows
    ///
    /// Search, filters, sort and page survive. The selection survives too
    /// unless `reset_selection_on_set_data` is set; surviving indices then
    /// refer to whatever rows now occupy those positions.
    pub fn set_data(&mut self, rows: Vec<Row>) -> &mut Self {
        self.rows = rows;
        self.total_count = 0;

        let selection_reset =
            self.options.reset_selection_on_set_data && self.selection.clear_all() > 0;

        tracing::debug!("Table '{}' bound to {} rows", self.id, self.rows.len());
        self.event_bus.publish(DataReplaced {
            row_count: self.rows.len(),
            selection_reset,
        });
        if selection_reset {
            self.publish_selection();
        }

        self.refresh();
        self
    }

    /// Replace the bound rows from an untyped JSON array of objects
    pub fn set_data_json(&mut self, data: Value) -> Result<&mut Self> {
        let Value::Array(items) = data else {
            return Err(TableError::InvalidData("expected an array of rows".to_string()));
        };
        let rows = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(TableError::InvalidData(format!(
                    "row {} is not an object: {}",
                    i, other
                ))),
            })
            .collect::<Result<Vec<Row>>>()?;
        Ok(self.set_data(rows))
    }

    pub fn define_column(&mut self, key: impl Into<String>, column: ColumnDef) -> Result<&mut Self> {
        self.columns.define(key, column)?;
        self.refresh();
        Ok(self)
    }

    pub fn define_column_json(&mut self, key: impl Into<String>, settings: &Value) -> Result<&mut Self> {
        self.columns.define_json(key, settings)?;
        self.refresh();
        Ok(self)
    }

    pub fn define_action(&mut self, action: ActionDef) -> Result<&mut Self> {
        let index = self.actions.define(action)?;
        tracing::debug!("Table '{}' defined action #{}", self.id, index);
        Ok(self)
    }

    pub fn enable_pagination(&mut self, enabled: bool) -> &mut Self {
        self.state.pagination.enabled = enabled;
        self.refresh();
        self
    }

    /// Show or hide the global search box; hiding it drops the term
    pub fn enable_search(&mut self, enabled: bool) -> &mut Self {
        self.options.search_enabled = enabled;
        if !enabled && !self.state.search.global.is_empty() {
            self.state.search.set_global("");
            self.refresh();
        }
        self
    }

    /// Turn row checkboxes on or off; turning them off clears the selection
    pub fn enable_row_selection(&mut self, enabled: bool) -> &mut Self {
        self.options.row_selection = enabled;
        if !enabled && self.selection.clear_all() > 0 {
            self.publish_selection();
        }
        self
    }

    pub fn show_row_numbers(&mut self, enabled: bool) -> &mut Self {
        self.options.row_numbers = enabled;
        self
    }

    pub fn show_totals(&mut self, enabled: bool) -> &mut Self {
        self.options.show_totals = enabled;
        self
    }

    pub fn set_page_size(&mut self, size: i64) -> Result<&mut Self> {
        self.state.pagination.set_page_size(size)?;
        self.refresh();
        Ok(self)
    }

    /// Set the page size from text, parsed as a number before validation
    pub fn set_page_size_text(&mut self, text: &str) -> Result<&mut Self> {
        self.state.pagination.set_page_size_text(text)?;
        self.refresh();
        Ok(self)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) -> &mut Self {
        self.options.caption = Some(caption.into());
        self
    }

    pub fn set_id(&mut self, id: &str) -> Result<&mut Self> {
        validate_id(id)?;
        self.id = id.to_string();
        Ok(self)
    }

    pub fn set_class(&mut self, class: &str) -> Result<&mut Self> {
        validate_class(class)?;
        self.options.class_name = Some(class.trim().to_string());
        Ok(self)
    }

    /// Set the inline style, e.g. `"width: 100%; font-size: 14px"`
    pub fn set_style(&mut self, style: &str) -> Result<&mut Self> {
        self.options.style = parse_style(style)?;
        Ok(self)
    }

    pub fn set_empty_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.options.empty_message = message.into();
        self
    }

    pub fn set_clamp_page_on_refresh(&mut self, enabled: bool) -> &mut Self {
        self.options.clamp_page_on_refresh = enabled;
        self
    }

    pub fn set_reset_selection_on_set_data(&mut self, enabled: bool) -> &mut Self {
        self.options.reset_selection_on_set_data = enabled;
        self
    }

    /// Limit how many page buttons the pagination controls offer
    pub fn set_max_page_buttons(&mut self, max: usize) -> Result<&mut Self> {
        if max == 0 {
            return Err(TableError::InvalidOption {
                option: "maxPageButtons".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.options.max_page_buttons = max;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Matching rows as of the last recompute, before pagination
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.state.pagination.total_pages(self.total_count)
    }

    pub fn page_index(&self) -> usize {
        self.state.pagination.page_index()
    }

    pub fn page_info(&self) -> PageInfo {
        self.state.pagination.page_info(self.total_count)
    }

    /// Run the pipeline over the current rows and state
    pub fn view(&self) -> PipelineOutput<'_> {
        run_pipeline(&self.rows, &self.columns, &self.state)
    }

    /// Footer aggregates over every matching row
    pub fn aggregates(&self) -> IndexMap<String, String> {
        let output = self.view();
        compute_aggregates(&self.rows, &output.matching_indices, &self.columns)
    }

    /// Selection as seen from the current view
    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        self.selection.snapshot(&self.view().view_indices)
    }

    pub fn selected_rows(&self) -> Vec<&Row> {
        self.selection.selected_rows(&self.rows)
    }

    /// Options for the discrete filter of a column
    pub fn filter_options(&self, key: &str) -> Result<Vec<FilterOption>> {
        self.require_column(key)?;
        Ok(filter_options(&self.rows, &self.columns, key))
    }

    /// Visible columns of every matching row as CSV, ignoring pagination
    pub fn export_csv(&self) -> anyhow::Result<String> {
        let output = self.view();
        let columns: Vec<&ColumnDef> = self.columns.visible().collect();
        rows_to_csv(&columns, &output.matching_rows(&self.rows))
    }

    fn require_column(&self, key: &str) -> Result<&ColumnDef> {
        self.columns
            .get(key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))
    }

    fn publish_selection(&self) {
        self.event_bus.publish(SelectionChanged {
            selected_count: self.selection.selected_count(),
        });
    }

    /// Recompute the matching count and keep the page index in range
    fn refresh(&mut self) {
        let total = matching_indices(&self.rows, &self.columns, &self.state).len();
        self.total_count = total;

        let pagination = &mut self.state.pagination;
        if pagination.enabled && self.options.clamp_page_on_refresh && pagination.clamp(total) {
            tracing::debug!("Page index clamped to {}", pagination.page_index());
        }

        self.event_bus.publish(ViewChanged {
            total_count: total,
            page_index: self.state.pagination.page_index(),
            visible_rows: self.state.pagination.slice_range(total).len(),
        });
    }

    /// Apply one user interaction, then recompute what it affected
    pub fn handle_action(&mut self, action: UserAction) -> Result<()> {
        tracing::debug!("Table '{}' handling {:?}", self.id, action);

        let effect = match action {
            UserAction::Search(term) => {
                if !self.options.search_enabled {
                    tracing::warn!("Search is disabled on table '{}'; ignoring", self.id);
                    Effect::Nothing
                } else {
                    self.state.search.set_global(term);
                    Effect::View
                }
            }
            UserAction::ColumnSearch { key, term } => {
                self.require_column(&key)?;
                self.state.search.set_column(key, term);
                Effect::View
            }
            UserAction::ToggleFilter { key, value } => {
                self.require_column(&key)?;
                self.state.filters.toggle(key, value);
                Effect::View
            }
            UserAction::SetFilter { key, values } => {
                self.require_column(&key)?;
                self.state.filters.set(key, values);
                Effect::View
            }
            UserAction::ClearFilter(key) => {
                self.state.filters.clear(&key);
                Effect::View
            }
            UserAction::ClearFilters => {
                self.state.filters.clear_all();
                Effect::View
            }
            UserAction::HeaderClick(key) => {
                if self.require_column(&key)?.sortable {
                    self.state.sort.toggle(&key);
                    Effect::View
                } else {
                    tracing::debug!("Column '{}' is not sortable", key);
                    Effect::Nothing
                }
            }
            UserAction::SetSort { key, order } => {
                self.require_column(&key)?;
                self.state.sort.set(key, order);
                Effect::View
            }
            UserAction::ClearSort => {
                self.state.sort.clear();
                Effect::View
            }
            UserAction::Page(nav) => {
                if !self.state.pagination.enabled {
                    tracing::warn!("Pagination is disabled on table '{}'; ignoring", self.id);
                    Effect::Nothing
                } else {
                    let total = self.total_count;
                    let pagination = &mut self.state.pagination;
                    match nav {
                        PageNav::First => pagination.first(total),
                        PageNav::Prev => pagination.prev(total),
                        PageNav::Next => pagination.next(total),
                        PageNav::Last => pagination.last(total),
                        PageNav::GoTo(n) => pagination.go_to(n, total),
                    };
                    Effect::View
                }
            }
            UserAction::ToggleRow(raw_index) => {
                if !self.options.row_selection {
                    tracing::warn!("Row selection is disabled on table '{}'; ignoring", self.id);
                    Effect::Nothing
                } else if raw_index >= self.rows.len() {
                    return Err(TableError::RowOutOfRange(raw_index));
                } else {
                    self.selection.toggle_row(raw_index);
                    Effect::Selection
                }
            }
            UserAction::ToggleSelectAll => {
                if !self.options.row_selection {
                    tracing::warn!("Row selection is disabled on table '{}'; ignoring", self.id);
                    Effect::Nothing
                } else {
                    let view_indices = self.view().view_indices;
                    if self.selection.snapshot(&view_indices).is_all_selected {
                        self.selection.deselect_view(&view_indices);
                    } else {
                        self.selection.select_all(&view_indices);
                    }
                    Effect::Selection
                }
            }
            UserAction::ClearSelection => {
                self.selection.clear_all();
                Effect::Selection
            }
            UserAction::SetColumnVisible { key, visible } => {
                self.columns.set_visible(&key, visible)?;
                Effect::View
            }
        };

        match effect {
            Effect::View => self.refresh(),
            Effect::Selection => self.publish_selection(),
            Effect::Nothing => {}
        }
        Ok(())
    }

    /// Whether an action button is disabled because its handler is running
    pub fn is_control_disabled(&self, action_index: usize, raw_index: usize) -> bool {
        self.in_flight.is_running((action_index, raw_index))
    }

    /// Claim the control and build the task running its handler
    ///
    /// The returned future owns everything it needs, so the table stays free
    /// for other interactions while it runs.
    pub fn start_action(
        &self,
        action_index: usize,
        raw_index: usize,
    ) -> Result<impl Future<Output = ActionOutcome> + Send + 'static> {
        let action = self
            .actions
            .get(action_index)
            .ok_or(TableError::UnknownAction(action_index))?;
        let row = self
            .rows
            .get(raw_index)
            .ok_or(TableError::RowOutOfRange(raw_index))?
            .clone();

        Ok(action_task(
            &self.in_flight,
            &self.event_bus,
            (action_index, raw_index),
            action.label.clone(),
            action.handler.clone(),
            row,
        ))
    }

    /// Run an action handler to completion
    pub async fn run_action(&self, action_index: usize, raw_index: usize) -> Result<ActionOutcome> {
        Ok(self.start_action(action_index, raw_index)?.await)
    }

    /// Run an action handler on the tokio runtime
    pub fn spawn_action(
        &self,
        action_index: usize,
        raw_index: usize,
    ) -> Result<tokio::task::JoinHandle<ActionOutcome>> {
        Ok(tokio::spawn(self.start_action(action_index, raw_index)?))
    }

    /// Describe the current view for a renderer
    pub fn frame(&self) -> RenderFrame<'_> {
        let output = self.view();
        let columns: Vec<&ColumnDef> = self.columns.visible().collect();
        let selection_on = self.options.row_selection;

        let rows = output
            .view_rows
            .iter()
            .zip(&output.view_indices)
            .map(|(&row, &raw_index)| FrameRow {
                raw_index,
                row,
                number: raw_index + 1,
                selected: selection_on && self.selection.is_selected(raw_index),
                cells: columns.iter().map(|c| c.display_markup(row)).collect(),
                actions_disabled: (0..self.actions.len())
                    .map(|a| self.in_flight.is_running((a, raw_index)))
                    .collect(),
            })
            .collect();

        let pagination = &self.state.pagination;
        let pages = pagination.enabled.then(|| {
            let total_pages = pagination.total_pages(output.total_count);
            let page_index = pagination.page_index();
            PageControls {
                page_index,
                total_pages,
                buttons: pagination.page_window(output.total_count, self.options.max_page_buttons),
                can_prev: page_index > 1,
                can_next: page_index < total_pages,
            }
        });

        RenderFrame {
            table_id: &self.id,
            title: self.options.title.as_deref(),
            caption: self.options.caption.as_deref(),
            class_name: self.options.class_name.as_deref(),
            style: style_string(&self.options.style),
            columns,
            actions: self.actions.iter().collect(),
            rows,
            row_numbers: self.options.row_numbers,
            select_all: selection_on
                .then(|| self.selection.snapshot(&output.view_indices).check_state()),
            search: self
                .options
                .search_enabled
                .then_some(self.state.search.global.as_str()),
            sort: self
                .state
                .sort
                .key
                .as_deref()
                .map(|key| (key, self.state.sort.order)),
            aggregates: self.options.show_totals.then(|| {
                compute_aggregates(&self.rows, &output.matching_indices, &self.columns)
            }),
            info: pagination.page_info(output.total_count),
            pages,
            empty_message: output
                .is_empty()
                .then_some(self.options.empty_message.as_str()),
        }
    }

    pub fn render<R: TableRenderer>(&self, renderer: &mut R) -> R::Output {
        renderer.render(&self.frame())
    }

    /// Current options as JSON
    pub fn save_config(&self) -> Value {
        let mut config = self.options.to_json(
            self.state.pagination.enabled,
            self.state.pagination.page_size(),
        );
        config["id"] = Value::String(self.id.clone());
        config
    }

    /// Apply options from JSON
    ///
    /// Every present key is validated before anything is applied, so a bad
    /// config leaves the table untouched. `pageSize` may be a number or
    /// numeric text.
    pub fn load_config(&mut self, config: &Value) -> Result<&mut Self> {
        let reader = ConfigReader::new(config)?;

        let id = reader.string("id")?;
        if let Some(id) = id {
            validate_id(id)?;
        }
        let class_name = reader.string("className")?;
        if let Some(class) = class_name {
            validate_class(class)?;
        }
        let style = reader.string("style")?.map(parse_style).transpose()?;
        let page_size = match reader.numeric_text("pageSize")? {
            Some(text) => {
                let mut candidate = self.state.pagination.clone();
                candidate.set_page_size_text(&text)?;
                Some(candidate.page_size())
            }
            None => None,
        };
        let title = reader.string("title")?;
        let caption = reader.string("caption")?;
        let empty_message = reader.string("emptyMessage")?;
        let search = reader.bool("search")?;
        let row_selection = reader.bool("rowSelection")?;
        let row_numbers = reader.bool("rowNumbers")?;
        let totals = reader.bool("totals")?;
        let clamp = reader.bool("clampPageOnRefresh")?;
        let reset_selection = reader.bool("resetSelectionOnSetData")?;
        let pagination = reader.bool("pagination")?;
        let max_page_buttons = reader.positive("maxPageButtons")?;

        if let Some(id) = id {
            self.id = id.to_string();
        }
        if let Some(class) = class_name {
            self.options.class_name = Some(class.trim().to_string());
        }
        if let Some(style) = style {
            self.options.style = style;
        }
        if let Some(title) = title {
            self.options.title = Some(title.to_string());
        }
        if let Some(caption) = caption {
            self.options.caption = Some(caption.to_string());
        }
        if let Some(message) = empty_message {
            self.options.empty_message = message.to_string();
        }
        if let Some(clamp) = clamp {
            self.options.clamp_page_on_refresh = clamp;
        }
        if let Some(reset) = reset_selection {
            self.options.reset_selection_on_set_data = reset;
        }
        if let Some(max) = max_page_buttons {
            self.options.max_page_buttons = max;
        }
        if let Some(enabled) = row_numbers {
            self.show_row_numbers(enabled);
        }
        if let Some(enabled) = totals {
            self.show_totals(enabled);
        }
        if let Some(enabled) = search {
            self.enable_search(enabled);
        }
        if let Some(enabled) = row_selection {
            self.enable_row_selection(enabled);
        }
        if let Some(size) = page_size {
            self.set_page_size(size as i64)?;
        }
        if let Some(enabled) = pagination {
            self.enable_pagination(enabled);
        }

        tracing::debug!("Loaded config into table '{}'", self.id);
        Ok(self)
    }
}
