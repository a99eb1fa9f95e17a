//! Column configuration and the registry holding it

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::{strip_markup, value_text, Row, ValueSource};
use crate::{Result, TableError};

/// Closure producing display markup for a cell
pub type Formatter = Arc<dyn Fn(&Row) -> String + Send + Sync>;

/// Closure producing footer text from every matching row
pub type AggregateFn = Arc<dyn Fn(&[&Row]) -> String + Send + Sync>;

/// Horizontal alignment for header and cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

/// Footer summary computed over the matching rows
#[derive(Clone)]
pub enum Aggregate {
    Sum,
    Avg,
    Count,
    Custom(AggregateFn),
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Sum => f.write_str("Sum"),
            Aggregate::Avg => f.write_str("Avg"),
            Aggregate::Count => f.write_str("Count"),
            Aggregate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Aggregate names accepted from untyped settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Sum,
    Avg,
    Count,
}

impl From<AggregateKind> for Aggregate {
    fn from(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Sum => Aggregate::Sum,
            AggregateKind::Avg => Aggregate::Avg,
            AggregateKind::Count => Aggregate::Count,
        }
    }
}

/// Definition of a single data column
#[derive(Clone)]
pub struct ColumnDef {
    key: String,
    pub label: String,
    pub header_align: Align,
    pub content_align: Align,
    pub visible: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub formatter: Option<Formatter>,
    pub sort_source: Option<ValueSource>,
    pub filter_source: Option<ValueSource>,
    pub search_source: Option<ValueSource>,
    pub aggregate: Option<Aggregate>,
    pub aggregate_label: Option<String>,
    pub cell_class: Option<String>,
    pub content_style: Option<String>,
}

impl ColumnDef {
    /// Create a column with the documented defaults
    ///
    /// Visible, start-aligned, every capability flag off and no derivation
    /// functions.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            label: label.into(),
            header_align: Align::Start,
            content_align: Align::Start,
            visible: true,
            sortable: false,
            filterable: false,
            searchable: false,
            formatter: None,
            sort_source: None,
            filter_source: None,
            search_source: None,
            aggregate: None,
            aggregate_label: None,
            cell_class: None,
            content_style: None,
        }
    }

    /// The key this column is registered under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header_align(mut self, align: Align) -> Self {
        self.header_align = align;
        self
    }

    pub fn content_align(mut self, align: Align) -> Self {
        self.content_align = align;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn hidden(self) -> Self {
        self.visible(false)
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Render cells through a markup-producing closure
    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn sort_source(mut self, source: impl Into<ValueSource>) -> Self {
        self.sort_source = Some(source.into());
        self
    }

    pub fn filter_source(mut self, source: impl Into<ValueSource>) -> Self {
        self.filter_source = Some(source.into());
        self
    }

    pub fn search_source(mut self, source: impl Into<ValueSource>) -> Self {
        self.search_source = Some(source.into());
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// Summarise with a closure over every matching row
    pub fn aggregate_with<F>(self, f: F) -> Self
    where
        F: Fn(&[&Row]) -> String + Send + Sync + 'static,
    {
        self.aggregate(Aggregate::Custom(Arc::new(f)))
    }

    pub fn aggregate_label(mut self, label: impl Into<String>) -> Self {
        self.aggregate_label = Some(label.into());
        self
    }

    pub fn cell_class(mut self, class: impl Into<String>) -> Self {
        self.cell_class = Some(class.into());
        self
    }

    pub fn content_style(mut self, style: impl Into<String>) -> Self {
        self.content_style = Some(style.into());
        self
    }

    /// Raw field value of this column (`null` when absent)
    pub fn raw_value<'a>(&self, row: &'a Row) -> &'a Value {
        row.get(&self.key).unwrap_or(&Value::Null)
    }

    /// Cell markup: the formatter output, else the raw value as text
    pub fn display_markup(&self, row: &Row) -> String {
        match &self.formatter {
            Some(format) => format(row),
            None => value_text(self.raw_value(row)),
        }
    }

    /// Plain cell text with any formatter markup stripped
    pub fn display_text(&self, row: &Row) -> String {
        match &self.formatter {
            Some(format) => strip_markup(&format(row)),
            None => value_text(self.raw_value(row)),
        }
    }

    /// Text matched by global and per-column search
    ///
    /// Priority: search source, then formatter plain text, then the raw value.
    pub fn search_text(&self, row: &Row) -> String {
        if let Some(value) = self.search_source.as_ref().and_then(|s| s.resolve(row)) {
            return value_text(&value);
        }
        self.display_text(row)
    }

    /// Value tested against the accepted set of a discrete filter
    pub fn filter_value(&self, row: &Row) -> Value {
        self.filter_source
            .as_ref()
            .and_then(|s| s.resolve(row))
            .unwrap_or_else(|| self.raw_value(row).clone())
    }

    /// Value used to order rows when sorting by this column
    ///
    /// Priority: derived sort source, sort source as a field present on the
    /// row, search source, derived filter source, filter source as a field,
    /// formatter plain text, raw value.
    pub fn sort_value(&self, row: &Row) -> Value {
        let derived_first = |source: &Option<ValueSource>| {
            source
                .as_ref()
                .filter(|s| s.is_derived())
                .and_then(|s| s.resolve(row))
        };
        let by_field = |source: &Option<ValueSource>| {
            source
                .as_ref()
                .filter(|s| !s.is_derived())
                .and_then(|s| s.resolve(row))
        };

        derived_first(&self.sort_source)
            .or_else(|| by_field(&self.sort_source))
            .or_else(|| self.search_source.as_ref().and_then(|s| s.resolve(row)))
            .or_else(|| derived_first(&self.filter_source))
            .or_else(|| by_field(&self.filter_source))
            .or_else(|| {
                self.formatter
                    .as_ref()
                    .map(|format| Value::String(strip_markup(&format(row))))
            })
            .unwrap_or_else(|| self.raw_value(row).clone())
    }
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("visible", &self.visible)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("searchable", &self.searchable)
            .field("has_formatter", &self.formatter.is_some())
            .field("aggregate", &self.aggregate)
            .finish()
    }
}

/// Untyped column settings, as accepted from JSON configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    pub label: Option<String>,
    pub header_align: Option<Align>,
    pub content_align: Option<Align>,
    pub visible: Option<bool>,
    pub sortable: Option<bool>,
    pub filterable: Option<bool>,
    pub searchable: Option<bool>,
    pub sort_source: Option<String>,
    pub filter_source: Option<String>,
    pub search_source: Option<String>,
    pub aggregate: Option<AggregateKind>,
    pub aggregate_label: Option<String>,
    pub cell_class: Option<String>,
    pub content_style: Option<String>,
}

impl ColumnSettings {
    /// Build a column definition, filling unset fields with defaults
    pub fn into_column(self, key: &str) -> ColumnDef {
        let mut column = ColumnDef::new(self.label.unwrap_or_else(|| key.to_string()));
        column.header_align = self.header_align.unwrap_or_default();
        column.content_align = self.content_align.unwrap_or_default();
        column.visible = self.visible.unwrap_or(true);
        column.sortable = self.sortable.unwrap_or(false);
        column.filterable = self.filterable.unwrap_or(false);
        column.searchable = self.searchable.unwrap_or(false);
        column.sort_source = self.sort_source.map(ValueSource::Field);
        column.filter_source = self.filter_source.map(ValueSource::Field);
        column.search_source = self.search_source.map(ValueSource::Field);
        column.aggregate = self.aggregate.map(Aggregate::from);
        column.aggregate_label = self.aggregate_label;
        column.cell_class = self.cell_class;
        column.content_style = self.content_style;
        column
    }
}

/// Ordered registry of column definitions, keyed by column key
#[derive(Clone, Default, Debug)]
pub struct ColumnRegistry {
    columns: IndexMap<String, ColumnDef>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column, replacing any previous definition of the key
    ///
    /// A replaced column keeps its display position; nothing of the old
    /// definition is merged into the new one.
    pub fn define(&mut self, key: impl Into<String>, mut column: ColumnDef) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        column.key = key.clone();
        if self.columns.insert(key.clone(), column).is_some() {
            tracing::debug!("Replaced definition of column '{}'", key);
        }
        Ok(())
    }

    /// Register a column from untyped settings
    pub fn define_json(&mut self, key: impl Into<String>, settings: &Value) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if !settings.is_object() {
            return Err(TableError::InvalidColumnSettings {
                key,
                reason: "settings must be an object".to_string(),
            });
        }
        let parsed: ColumnSettings = serde_json::from_value(settings.clone()).map_err(|e| {
            TableError::InvalidColumnSettings {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;
        let column = parsed.into_column(&key);
        self.define(key, column)
    }

    pub fn get(&self, key: &str) -> Option<&ColumnDef> {
        self.columns.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Show or hide a column
    pub fn set_visible(&mut self, key: &str, visible: bool) -> Result<()> {
        let column = self
            .columns
            .get_mut(key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))?;
        column.visible = visible;
        Ok(())
    }

    /// All columns in definition order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.values()
    }

    /// Visible columns in definition order
    pub fn visible(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.values().filter(|c| c.visible)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults() {
        let mut registry = ColumnRegistry::new();
        registry.define("name", ColumnDef::new("Name")).unwrap();

        let column = registry.get("name").unwrap();
        assert_eq!(column.key(), "name");
        assert_eq!(column.header_align, Align::Start);
        assert_eq!(column.content_align, Align::Start);
        assert!(column.visible);
        assert!(!column.sortable && !column.filterable && !column.searchable);
        assert!(column.formatter.is_none() && column.aggregate.is_none());
    }

    #[test]
    fn test_redefine_replaces_without_merge() {
        let mut registry = ColumnRegistry::new();
        registry.define("a", ColumnDef::new("A").sortable()).unwrap();
        registry.define("b", ColumnDef::new("B")).unwrap();
        registry.define("a", ColumnDef::new("A2")).unwrap();

        let column = registry.get("a").unwrap();
        assert_eq!(column.label, "A2");
        assert!(!column.sortable);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut registry = ColumnRegistry::new();
        assert_eq!(registry.define("", ColumnDef::new("x")), Err(TableError::EmptyKey));
        assert_eq!(registry.define_json("", &json!({})), Err(TableError::EmptyKey));
        // Only the empty string is rejected
        registry.define(" ", ColumnDef::new("Blank")).unwrap();
        assert_eq!(registry.get(" ").unwrap().label, "Blank");
    }

    #[test]
    fn test_define_json() {
        let mut registry = ColumnRegistry::new();
        registry
            .define_json(
                "age",
                &json!({"label": "Age", "sortable": true, "contentAlign": "end", "aggregate": "avg"}),
            )
            .unwrap();
        let column = registry.get("age").unwrap();
        assert_eq!(column.label, "Age");
        assert!(column.sortable);
        assert_eq!(column.content_align, Align::End);
        assert!(matches!(column.aggregate, Some(Aggregate::Avg)));

        assert!(matches!(
            registry.define_json("age", &json!("nope")),
            Err(TableError::InvalidColumnSettings { .. })
        ));
        assert!(matches!(
            registry.define_json("age", &json!({"sortable": "yes"})),
            Err(TableError::InvalidColumnSettings { .. })
        ));
    }

    #[test]
    fn test_search_text_priority() {
        let r = row(json!({"name": "ada", "alias": "countess"}));

        let plain = ColumnDef::new("Name");
        let mut registry = ColumnRegistry::new();
        registry.define("name", plain).unwrap();
        assert_eq!(registry.get("name").unwrap().search_text(&r), "ada");

        registry
            .define("name", ColumnDef::new("Name").formatter(|row| format!("<b>{}</b>", row["name"].as_str().unwrap_or(""))))
            .unwrap();
        assert_eq!(registry.get("name").unwrap().search_text(&r), "ada");

        registry
            .define("name", ColumnDef::new("Name").search_source("alias"))
            .unwrap();
        assert_eq!(registry.get("name").unwrap().search_text(&r), "countess");
    }

    #[test]
    fn test_sort_value_priority() {
        let r = row(json!({"score": "B", "rank": 2, "hidden_rank": 7}));
        let mut registry = ColumnRegistry::new();

        registry
            .define("score", ColumnDef::new("Score").sort_source("missing").filter_source("rank"))
            .unwrap();
        assert_eq!(registry.get("score").unwrap().sort_value(&r), json!(2));

        registry
            .define(
                "score",
                ColumnDef::new("Score")
                    .sort_source("rank")
                    .filter_source(ValueSource::derived(|_| json!(99))),
            )
            .unwrap();
        assert_eq!(registry.get("score").unwrap().sort_value(&r), json!(2));

        registry
            .define("score", ColumnDef::new("Score").sort_source(ValueSource::derived(|row| row["hidden_rank"].clone())))
            .unwrap();
        assert_eq!(registry.get("score").unwrap().sort_value(&r), json!(7));

        registry.define("score", ColumnDef::new("Score")).unwrap();
        assert_eq!(registry.get("score").unwrap().sort_value(&r), json!("B"));
    }

    #[test]
    fn test_set_visible_unknown_column() {
        let mut registry = ColumnRegistry::new();
        assert_eq!(
            registry.set_visible("nope", false),
            Err(TableError::UnknownColumn("nope".to_string()))
        );
    }
}
