use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::types::OptionTable;

/// Write the table as CSV, replacing any existing file. An empty table
/// produces an empty file.
pub fn write_csv(table: &OptionTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_record(row.iter().map(csv_cell))?;
    }
    writer.flush()?;

    info!(rows = table.len(), "Data saved to {}.", path.display());
    Ok(())
}

/// Strings are written verbatim, nulls as empty cells, everything else in
/// JSON notation.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
