//! Demo entry point
//!
//! Builds a sample table, drives it through a scripted series of user
//! interactions and prints each resulting view as text.

use anyhow::Result;
use dg_core::events::events::{ActionFailed, SelectionChanged};
use dg_core::SortOrder;
use dg_views::{ActionOutcome, DataTable, PageNav, TextRenderer, UserAction};
use serde_json::json;
use tracing::{info, warn};

mod demo;

fn print_view(table: &DataTable, heading: &str) {
    println!("== {} ==", heading);
    println!("{}\n", table.render(&mut TextRenderer::default()));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting data grid demo");

    let mut table = demo::build_table()?;

    table.event_bus().subscribe_fn(|e: &SelectionChanged| {
        info!("{} row(s) selected", e.selected_count);
    });
    table.event_bus().subscribe_fn(|e: &ActionFailed| {
        warn!("'{}' failed on row {}: {}", e.action_label, e.raw_index, e.error);
    });

    print_view(&table, "Initial view");

    table.handle_action(UserAction::HeaderClick("salary".into()))?;
    table.handle_action(UserAction::HeaderClick("salary".into()))?;
    print_view(&table, "Sorted by salary, descending");

    table.handle_action(UserAction::Page(PageNav::Last))?;
    print_view(&table, "Last page");

    table.handle_action(UserAction::ToggleFilter {
        key: "department".into(),
        value: json!("Engineering"),
    })?;
    table.handle_action(UserAction::ToggleSelectAll)?;
    print_view(&table, "Engineering only, all selected");

    table.handle_action(UserAction::ClearFilters)?;
    table.handle_action(UserAction::SetSort {
        key: "age".into(),
        order: SortOrder::Asc,
    })?;
    table.handle_action(UserAction::Search("a".into()))?;
    print_view(&table, "Search 'a', by age");

    for option in table.filter_options("department")? {
        info!("Department filter: {} ({})", option.label, option.count);
    }

    let selected: Vec<String> = table
        .selected_rows()
        .iter()
        .map(|row| row["name"].to_string())
        .collect();
    info!("Selected rows: {}", selected.join(", "));

    let first = table.view().view_indices.first().copied();
    if let Some(raw_index) = first {
        for action_index in 0..table.actions().len() {
            match table.run_action(action_index, raw_index).await? {
                ActionOutcome::Failed(error) => info!("Action #{} failed: {}", action_index, error),
                outcome => info!("Action #{} finished: {:?}", action_index, outcome),
            }
        }
    }

    println!("== CSV export ==");
    println!("{}", table.export_csv()?);

    println!("== Saved configuration ==");
    println!("{}", serde_json::to_string_pretty(&table.save_config())?);

    Ok(())
}
