//! Table exports: CSV, JSON records and the paginated PDF document.

use crate::document::{DocumentLayout, TabularDocumentExporter};
use campaign_core::{ReportResult, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Settings that only the document export reads.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
    pub layout: DocumentLayout,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: crate::document::DEFAULT_TITLE.to_string(),
            layout: DocumentLayout::default(),
        }
    }
}

/// Write `table` as comma-separated UTF-8 with a header row.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv(table: &Table) -> ReportResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Pretty-printed array with one object per row, keyed by column name.
pub fn to_json(table: &Table) -> ReportResult<String> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows()
        .iter()
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .map(|(col, value)| Ok((col.clone(), serde_json::to_value(value)?)))
                .collect::<ReportResult<_>>()
        })
        .collect::<ReportResult<_>>()?;
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn export(
    table: &Table,
    format: ExportFormat,
    options: &ExportOptions,
) -> ReportResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Json => to_json(table).map(String::into_bytes),
        ExportFormat::Pdf => {
            TabularDocumentExporter::new(options.layout.clone()).render(table, &options.title)
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
