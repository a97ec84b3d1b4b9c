//! Helpers for reading rendered documents back in tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

pub(crate) fn parse(pdf: &[u8]) -> Document {
    Document::load_mem(pdf).unwrap()
}

/// Decoded content-stream operations, one entry per page.
pub(crate) fn page_operations(pdf: &[u8]) -> Vec<Vec<Operation>> {
    let doc = parse(pdf);
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let bytes = doc.get_page_content(page_id).unwrap();
            Content::decode(&bytes).unwrap().operations
        })
        .collect()
}

pub(crate) fn operators(ops: &[Operation]) -> Vec<&str> {
    ops.iter().map(|op| op.operator.as_str()).collect()
}

/// Every `Tj` string in page order, decoded as single-byte text.
pub(crate) fn texts(pdf: &[u8]) -> Vec<String> {
    page_operations(pdf)
        .iter()
        .flatten()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            _ => None,
        })
        .collect()
}

pub(crate) fn count_text(pdf: &[u8], text: &str) -> usize {
    texts(pdf).iter().filter(|t| *t == text).count()
}

pub(crate) fn count_operator(pdf: &[u8], operator: &str) -> usize {
    page_operations(pdf)
        .iter()
        .flatten()
        .filter(|op| op.operator == operator)
        .count()
}

/// Media box of the first page's parent, in points.
pub(crate) fn media_box(pdf: &[u8]) -> Vec<f64> {
    let doc = parse(pdf);
    let page_id = *doc.get_pages().values().next().unwrap();
    let parent = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Parent")
        .and_then(Object::as_reference)
        .unwrap();
    doc.get_dictionary(parent)
        .unwrap()
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .unwrap()
        .iter()
        .map(|o| f64::from(o.as_float().unwrap()))
        .collect()
}
