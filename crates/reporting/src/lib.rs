//! Campaign reporting: channel summaries with derived ratios, and exports of
//! filtered campaign tables as CSV, JSON or paginated PDF.

pub mod aggregate;
pub mod document;
pub mod export;
pub mod filter;
pub mod ingest;

pub use aggregate::{aggregate, append_missing_metrics, DerivedMetric, MetricsAggregator};
pub use document::{render_document, DocumentLayout, TabularDocumentExporter};
pub use export::{export, to_csv, to_json, ExportFormat, ExportOptions};
pub use filter::ValueFilter;
pub use ingest::{load_table, read_table};
