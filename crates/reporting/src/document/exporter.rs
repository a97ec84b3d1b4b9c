use super::engine::{Align, PageSetup, PdfDocument, PT_PER_MM};
use super::font::encode_latin1;
use campaign_core::config::DocumentConfig;
use campaign_core::{ReportError, ReportResult, Table};
use tracing::{debug, info};

pub const DEFAULT_TITLE: &str = "Marketing Analytics Report";

const TITLE_HEIGHT: f64 = 10.0;
const TITLE_GAP: f64 = 10.0;
const ROW_HEIGHT_FACTOR: f64 = 1.5;

/// Page geometry and typography of a rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub bottom_margin: f64,
    pub font_size_pt: f64,
    /// Repeat the header row at the top of every continuation page.
    pub repeat_header: bool,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self::from(&DocumentConfig::default())
    }
}

impl From<&DocumentConfig> for DocumentLayout {
    fn from(config: &DocumentConfig) -> Self {
        Self {
            page_width: config.page_width_mm,
            page_height: config.page_height_mm,
            margin: config.margin_mm,
            bottom_margin: config.bottom_margin_mm,
            font_size_pt: config.font_size_pt,
            repeat_header: config.repeat_header,
        }
    }
}

impl DocumentLayout {
    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Equal width for every column plus one implicit margin column.
    pub fn column_width(&self, column_count: usize) -> f64 {
        self.page_width / (column_count + 1) as f64
    }

    /// Font size in millimetres.
    pub fn font_size(&self) -> f64 {
        self.font_size_pt / PT_PER_MM
    }

    pub fn row_height(&self) -> f64 {
        ROW_HEIGHT_FACTOR * self.font_size()
    }

    fn validate(&self) -> ReportResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.page_width) || !positive(self.page_height) {
            return Err(ReportError::InvalidPage {
                width: self.page_width,
                height: self.page_height,
            });
        }
        if !positive(self.font_size_pt) {
            return Err(ReportError::Config(format!(
                "font size must be positive, got {}",
                self.font_size_pt
            )));
        }
        // The first page must hold the title block, the header and one row.
        let first_row_bottom = self.margin + TITLE_HEIGHT + TITLE_GAP + 2.0 * self.row_height();
        if first_row_bottom > self.page_height - self.bottom_margin {
            return Err(ReportError::InvalidPage {
                width: self.page_width,
                height: self.page_height,
            });
        }
        Ok(())
    }

    fn page_setup(&self) -> PageSetup {
        PageSetup {
            width: self.page_width,
            height: self.page_height,
            margin: self.margin,
            bottom_margin: self.bottom_margin,
            font_size_pt: self.font_size_pt,
        }
    }
}

/// Renders any table as a bordered grid under a centered title.
#[derive(Debug, Clone, Default)]
pub struct TabularDocumentExporter {
    layout: DocumentLayout,
}

impl TabularDocumentExporter {
    pub fn new(layout: DocumentLayout) -> Self {
        Self { layout }
    }

    /// Render `table` to PDF bytes. Fails without producing output if the
    /// table has no columns, the page is too small for a header and one row,
    /// or any text cannot be encoded.
    pub fn render(&self, table: &Table, title: &str) -> ReportResult<Vec<u8>> {
        if table.column_count() == 0 {
            return Err(ReportError::EmptyColumnSet);
        }
        self.layout.validate()?;

        let layout = &self.layout;
        let col_width = layout.column_width(table.column_count());
        let row_height = layout.row_height();

        let title = encode_latin1(title)?;
        let header = table
            .columns()
            .iter()
            .map(String::as_str)
            .map(encode_latin1)
            .collect::<ReportResult<Vec<_>>>()?;

        let mut doc = PdfDocument::new(layout.page_setup());
        doc.set_title(title.clone());
        doc.add_page();

        doc.cell(
            layout.page_width - 2.0 * layout.margin,
            TITLE_HEIGHT,
            &title,
            false,
            Align::Center,
        );
        doc.ln(TITLE_HEIGHT);
        doc.ln(TITLE_GAP);
        write_row(&mut doc, &header, col_width, row_height);

        for row in table.rows() {
            let cells = row
                .iter()
                .map(|v| encode_latin1(&v.to_string()))
                .collect::<ReportResult<Vec<_>>>()?;
            if !doc.fits(row_height) {
                doc.add_page();
                if layout.repeat_header {
                    write_row(&mut doc, &header, col_width, row_height);
                }
                debug!(page = doc.page_count(), "Started continuation page");
            }
            write_row(&mut doc, &cells, col_width, row_height);
        }

        let pages = doc.page_count();
        let bytes = doc.finish()?;
        info!(
            columns = table.column_count(),
            rows = table.row_count(),
            pages,
            bytes = bytes.len(),
            "Rendered table document"
        );
        Ok(bytes)
    }
}

fn write_row(doc: &mut PdfDocument, cells: &[Vec<u8>], width: f64, height: f64) {
    for cell in cells {
        doc.cell(width, height, cell, true, Align::Left);
    }
    doc.ln(height);
}

/// Render with default margins and font on a `page_width` x `page_height`
/// (millimetre) page.
pub fn render_document(
    table: &Table,
    title: &str,
    page_width: f64,
    page_height: f64,
) -> ReportResult<Vec<u8>> {
    let layout = DocumentLayout::default().with_page_size(page_width, page_height);
    TabularDocumentExporter::new(layout).render(table, title)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
