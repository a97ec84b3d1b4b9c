//! CSV loading for campaign exports.

use campaign_core::{ReportError, ReportResult, Table, Value};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Read a headered CSV into a [`Table`], typing each cell with
/// [`Value::infer`].
pub fn read_table<R: Read>(reader: R) -> ReportResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let h = if idx == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(ReportError::EmptyInput("CSV has no header row".into()));
    }

    let mut table = Table::new(headers);
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != table.column_count() {
            return Err(ReportError::Schema(format!(
                "record {} has {} fields, expected {}",
                line + 1,
                record.len(),
                table.column_count()
            )));
        }
        table.push_row(record.iter().map(Value::infer).collect())?;
    }

    debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        "Parsed CSV table"
    );
    Ok(table)
}

/// Load a CSV file from disk.
pub fn load_table(path: &Path) -> ReportResult<Table> {
    let file = File::open(path)?;
    let table = read_table(file)?;
    info!(path = %path.display(), rows = table.row_count(), "Loaded campaign data");
    Ok(table)
}
