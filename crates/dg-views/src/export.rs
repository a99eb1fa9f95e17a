//! CSV export of the matching rows

use anyhow::{Context, Result};
use dg_core::{ColumnDef, Row};

/// Write rows as CSV: one header of column labels, then the plain text of
/// every cell
pub fn rows_to_csv(columns: &[&ColumnDef], rows: &[&Row]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.label.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.display_text(row)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
