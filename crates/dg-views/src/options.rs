//! Table presentation options and their JSON form

use dg_core::{Result, TableError};
use serde_json::{json, Map, Value};

/// One `property: value` style declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDecl {
    pub property: String,
    pub value: String,
}

/// Parse an inline style string such as `"color: red; width: 50%"`
///
/// Empty declarations (stray `;`) are skipped; a declaration without a
/// property or a value is rejected.
pub fn parse_style(style: &str) -> Result<Vec<StyleDecl>> {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .map(|decl| {
            let (property, value) = decl
                .split_once(':')
                .ok_or_else(|| TableError::InvalidStyle(decl.to_string()))?;
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                return Err(TableError::InvalidStyle(decl.to_string()));
            }
            Ok(StyleDecl {
                property: property.to_lowercase(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Render declarations back into an inline style string
pub fn style_string(style: &[StyleDecl]) -> String {
    style
        .iter()
        .map(|decl| format!("{}: {}", decl.property, decl.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Feature toggles and presentation settings of a table
///
/// The JSON form is produced by [`TableOptions::to_json`] and read back key
/// by key through the table's `load_config`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub class_name: Option<String>,
    pub style: Vec<StyleDecl>,
    pub search_enabled: bool,
    pub row_selection: bool,
    pub row_numbers: bool,
    pub show_totals: bool,
    pub empty_message: String,
    /// Pull the page index back into range whenever the view is recomputed
    pub clamp_page_on_refresh: bool,
    /// Drop the selection when the data is replaced
    pub reset_selection_on_set_data: bool,
    /// Most page buttons offered at once, at least one
    pub max_page_buttons: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            title: None,
            caption: None,
            class_name: None,
            style: Vec::new(),
            search_enabled: false,
            row_selection: false,
            row_numbers: false,
            show_totals: false,
            empty_message: "No matching records found".to_string(),
            clamp_page_on_refresh: true,
            reset_selection_on_set_data: false,
            max_page_buttons: 5,
        }
    }
}

/// Typed reader over an untyped config object
///
/// Absent or `null` keys read as `None`; present keys of the wrong type are errors.
pub(crate) struct ConfigReader<'a> {
    config: &'a Map<String, Value>,
}

impl<'a> ConfigReader<'a> {
    pub(crate) fn new(config: &'a Value) -> Result<Self> {
        let config = config.as_object().ok_or_else(|| TableError::InvalidOption {
            option: "config".to_string(),
            reason: "expected an object".to_string(),
        })?;
        Ok(Self { config })
    }

    fn get(&self, option: &str) -> Option<&'a Value> {
        self.config.get(option).filter(|value| !value.is_null())
    }

    fn invalid(option: &str, expected: &str) -> TableError {
        TableError::InvalidOption {
            option: option.to_string(),
            reason: format!("expected {}", expected),
        }
    }

    pub(crate) fn bool(&self, option: &str) -> Result<Option<bool>> {
        match self.get(option) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| Self::invalid(option, "a boolean")),
        }
    }

    pub(crate) fn string(&self, option: &str) -> Result<Option<&'a str>> {
        match self.get(option) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| Self::invalid(option, "a string")),
        }
    }

    /// A positive integer
    pub(crate) fn positive(&self, option: &str) -> Result<Option<usize>> {
        match self.get(option) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .filter(|n| *n > 0)
                .map(|n| Some(n as usize))
                .ok_or_else(|| Self::invalid(option, "a positive integer")),
        }
    }

    /// Numbers pass through; strings are kept as text for numeric parsing
    pub(crate) fn numeric_text(&self, option: &str) -> Result<Option<String>> {
        match self.get(option) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Self::invalid(option, "a number")),
        }
    }
}

impl TableOptions {
    /// JSON form, with the pagination settings merged in
    pub fn to_json(&self, pagination: bool, page_size: usize) -> Value {
        json!({
            "title": self.title,
            "caption": self.caption,
            "className": self.class_name,
            "style": style_string(&self.style),
            "search": self.search_enabled,
            "rowSelection": self.row_selection,
            "rowNumbers": self.row_numbers,
            "totals": self.show_totals,
            "emptyMessage": self.empty_message,
            "clampPageOnRefresh": self.clamp_page_on_refresh,
            "resetSelectionOnSetData": self.reset_selection_on_set_data,
            "maxPageButtons": self.max_page_buttons,
            "pagination": pagination,
            "pageSize": page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style() {
        let style = parse_style("Color: red; width: 50% ;;").unwrap();
        assert_eq!(
            style,
            vec![
                StyleDecl { property: "color".into(), value: "red".into() },
                StyleDecl { property: "width".into(), value: "50%".into() },
            ]
        );
        assert_eq!(style_string(&style), "color: red; width: 50%");
        assert!(parse_style("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_style_rejects_malformed() {
        assert_eq!(parse_style("color red"), Err(TableError::InvalidStyle("color red".into())));
        assert!(parse_style(": red").is_err());
        assert!(parse_style("color:").is_err());
    }

    #[test]
    fn test_reader_types() {
        let config = json!({"search": true, "title": 3, "pageSize": "10", "maxPageButtons": 0});
        let reader = ConfigReader::new(&config).unwrap();
        assert_eq!(reader.bool("search").unwrap(), Some(true));
        assert_eq!(reader.bool("missing").unwrap(), None);
        assert!(reader.string("title").is_err());
        assert_eq!(reader.numeric_text("pageSize").unwrap().as_deref(), Some("10"));
        assert!(reader.positive("maxPageButtons").is_err());
        assert_eq!(reader.positive("missing").unwrap(), None);
        assert!(ConfigReader::new(&json!([1])).is_err());
    }
}
