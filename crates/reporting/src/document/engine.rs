//! Page model over `lopdf`: fixed page size, one Helvetica font, bordered
//! text cells positioned with a top-down cursor in millimetres.

use super::font::string_width;
use campaign_core::{ReportError, ReportResult};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// Points per millimetre.
pub(crate) const PT_PER_MM: f64 = 72.0 / 25.4;

/// Stroke width of cell borders, in millimetres.
const LINE_WIDTH: f64 = 0.2;

const FONT_RESOURCE: &str = "F1";
const PRODUCER: &str = "campaign-report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

/// Page geometry in millimetres, font size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub bottom_margin: f64,
    pub font_size_pt: f64,
}

pub(crate) struct PdfDocument {
    setup: PageSetup,
    /// Font size in millimetres.
    font_size: f64,
    /// Horizontal padding between a cell border and its text.
    cell_margin: f64,
    pages: Vec<Vec<Operation>>,
    title: Option<Vec<u8>>,
    x: f64,
    y: f64,
}

impl PdfDocument {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            font_size: setup.font_size_pt / PT_PER_MM,
            cell_margin: setup.margin / 10.0,
            pages: Vec::new(),
            title: None,
            x: setup.margin,
            y: setup.margin,
        }
    }

    /// Encoded document title for the info dictionary.
    pub fn set_title(&mut self, title: Vec<u8>) {
        self.title = Some(title);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether a line of height `h` fits above the bottom margin of the
    /// current page.
    pub fn fits(&self, h: f64) -> bool {
        !self.pages.is_empty() && self.y + h <= self.setup.height - self.setup.bottom_margin
    }

    pub fn add_page(&mut self) {
        self.pages.push(vec![Operation::new(
            "w",
            vec![(LINE_WIDTH * PT_PER_MM).into()],
        )]);
        self.x = self.setup.margin;
        self.y = self.setup.margin;
    }

    /// Place a cell at the cursor and move the cursor right by `w`. Text is
    /// neither wrapped nor clipped.
    pub fn cell(&mut self, w: f64, h: f64, text: &[u8], border: bool, align: Align) {
        if self.pages.is_empty() {
            self.add_page();
        }
        let k = PT_PER_MM;
        let page_height = self.setup.height;
        let (x, y) = (self.x, self.y);
        let dx = match align {
            Align::Left => self.cell_margin,
            Align::Center => (w - string_width(text, self.font_size)) / 2.0,
        };
        let baseline = y + 0.5 * h + 0.3 * self.font_size;
        let font_size_pt = self.setup.font_size_pt;
        self.x += w;

        let Some(ops) = self.pages.last_mut() else {
            return;
        };
        if border {
            ops.push(Operation::new(
                "re",
                vec![
                    (x * k).into(),
                    ((page_height - y) * k).into(),
                    (w * k).into(),
                    (-h * k).into(),
                ],
            ));
            ops.push(Operation::new("S", vec![]));
        }
        if !text.is_empty() {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), font_size_pt.into()],
            ));
            ops.push(Operation::new(
                "Td",
                vec![((x + dx) * k).into(), ((page_height - baseline) * k).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(text.to_vec(), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
    }

    /// Carriage return to the left margin, then down by `h`.
    pub fn ln(&mut self, h: f64) {
        self.x = self.setup.margin;
        self.y += h;
    }

    /// Serialize the document. A document without pages gets one blank page.
    pub fn finish(mut self) -> ReportResult<Vec<u8>> {
        if self.pages.is_empty() {
            self.add_page();
        }
        let k = PT_PER_MM;
        let mut doc = Document::with_version("1.3");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }.encode().map_err(pdf_error)?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            (self.setup.width * k).into(),
            (self.setup.height * k).into(),
        ];
        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let mut info = dictionary! { "Producer" => Object::string_literal(PRODUCER) };
        if let Some(title) = self.title {
            info.set("Title", Object::String(title, StringFormat::Literal));
        }
        let info_id = doc.add_object(info);
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(pdf_error)?;
        Ok(bytes)
    }
}

fn pdf_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(err.to_string())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
