//! Demo dataset
//! A small employee roster exercising every column feature

use dg_core::{action_fn, ActionDef, Aggregate, Align, ColumnDef, Row, ValueSource};
use dg_views::DataTable;
use anyhow::Result;
use serde_json::{json, Value};

const NAMES: [&str; 12] = [
    "Ada", "Brian", "Chloe", "Dmitri", "Elena", "Farid",
    "Greta", "Hiro", "Ines", "Jonas", "Kira", "Luca",
];
const DEPARTMENTS: [&str; 3] = ["Engineering", "Sales", "Support"];

/// Generate the roster as untyped JSON, the way a host would hand it over
pub fn roster() -> Value {
    let rows: Vec<Value> = NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            // Every fifth salary is missing to show nulls-last sorting
            let salary = if i % 5 == 4 {
                Value::Null
            } else {
                json!(42_000 + (i as i64 * 7_919) % 30_000)
            };
            json!({
                "id": i + 1,
                "name": name,
                "department": DEPARTMENTS[i % DEPARTMENTS.len()],
                "age": 24 + (i * 7) % 19,
                "salary": salary,
                "remote": i % 3 == 0,
            })
        })
        .collect();
    Value::Array(rows)
}

fn salary_text(row: &Row) -> String {
    match row.get("salary").and_then(Value::as_f64) {
        Some(salary) => format!("<b>${:.0}</b>", salary),
        None => "<i>n/a</i>".to_string(),
    }
}

/// Build the demo table with columns and row actions defined
pub fn build_table() -> Result<DataTable> {
    let mut table = DataTable::new();
    table
        .set_id("employees")?
        .set_title("Employees")
        .set_caption("Salaries in USD")
        .set_style("width: 100%; font-size: 14px")?
        .set_data_json(roster())?
        .define_column("id", ColumnDef::new("ID").sortable().content_align(Align::End).hidden())?
        .define_column("name", ColumnDef::new("Name").sortable().searchable())?
        .define_column("department", ColumnDef::new("Department").sortable().filterable())?
        .define_column(
            "age",
            ColumnDef::new("Age")
                .sortable()
                .content_align(Align::End)
                .aggregate(Aggregate::Avg)
                .aggregate_label("Avg"),
        )?
        .define_column(
            "salary",
            ColumnDef::new("Salary")
                .sortable()
                .content_align(Align::End)
                .formatter(salary_text)
                .sort_source(ValueSource::field("salary"))
                .aggregate(Aggregate::Sum),
        )?
        .define_column_json(
            "remote",
            &json!({"label": "Remote", "filterable": true, "headerAlign": "center"}),
        )?
        .define_action(ActionDef::new("Promote").icon("arrow-up").on_click(action_fn(
            |row: Row| async move {
                tracing::info!("Promoting {}", row["name"]);
                Ok(())
            },
        )))?
        .define_action(ActionDef::new("Archive").on_click(action_fn(|row: Row| async move {
            Err::<(), _>(anyhow::anyhow!("archive service refused {}", row["name"]))
        })))?;

    table
        .set_page_size(5)?
        .enable_pagination(true)
        .enable_search(true)
        .enable_row_selection(true)
        .show_row_numbers(true)
        .show_totals(true);

    Ok(table)
}
