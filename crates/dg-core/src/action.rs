//! Per-row action buttons

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::value::Row;
use crate::{Result, TableError};

/// Handler invoked when a row action button is clicked
///
/// The handler receives a copy of the row so the operation may outlive the
/// table borrow that triggered it.
#[async_trait]
pub trait RowAction: Send + Sync {
    async fn on_click(&self, row: Row) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`RowAction`]
struct ActionFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RowAction for ActionFn<F>
where
    F: Fn(Row) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_click(&self, row: Row) -> anyhow::Result<()> {
        (self.f)(row).await
    }
}

/// Create a row action from an async closure
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn RowAction>
where
    F: Fn(Row) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(ActionFn { f })
}

/// Definition of an action button rendered after the data columns
#[derive(Clone)]
pub struct ActionDef {
    pub label: String,
    pub icon: Option<String>,
    pub class_name: String,
    pub handler: Option<Arc<dyn RowAction>>,
}

impl ActionDef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            class_name: String::new(),
            handler: None,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn on_click(mut self, handler: Arc<dyn RowAction>) -> Self {
        self.handler = Some(handler);
        self
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("class_name", &self.class_name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Actions in definition order
#[derive(Clone, Default, Debug)]
pub struct ActionRegistry {
    actions: Vec<ActionDef>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action, returning its index
    pub fn define(&mut self, action: ActionDef) -> Result<usize> {
        if action.label.trim().is_empty() {
            return Err(TableError::MissingActionLabel);
        }
        self.actions.push(action);
        Ok(self.actions.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&ActionDef> {
        self.actions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_required() {
        let mut registry = ActionRegistry::new();
        assert_eq!(
            registry.define(ActionDef::new("  ")).unwrap_err(),
            TableError::MissingActionLabel
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_definition_order() {
        let mut registry = ActionRegistry::new();
        assert_eq!(registry.define(ActionDef::new("Edit")).unwrap(), 0);
        assert_eq!(registry.define(ActionDef::new("Delete").class_name("danger")).unwrap(), 1);
        let labels: Vec<_> = registry.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Edit", "Delete"]);
    }

    #[tokio::test]
    async fn test_action_fn_receives_row() {
        let handler = action_fn(|row: Row| async move {
            anyhow::ensure!(row.contains_key("id"), "row has no id");
            Ok(())
        });
        let mut row = Row::new();
        assert!(handler.on_click(row.clone()).await.is_err());
        row.insert("id".to_string(), serde_json::json!(1));
        assert!(handler.on_click(row).await.is_ok());
    }
}
