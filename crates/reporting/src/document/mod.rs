//! Paginated PDF rendering of tables.

mod engine;
mod exporter;
mod font;
#[cfg(test)]
mod testing;

pub use exporter::{render_document, DocumentLayout, TabularDocumentExporter, DEFAULT_TITLE};
