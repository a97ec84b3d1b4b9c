//! Helvetica metrics and single-byte text encoding for the base-14 font.

use campaign_core::{ReportError, ReportResult};

/// Advance widths (1/1000 em) for codes 32..=126.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

/// Bytes where WinAnsiEncoding departs from Latin-1.
const WIN_ANSI_REMAPPED: std::ops::RangeInclusive<u8> = 0x80..=0x9F;

/// Used outside the ASCII range.
const FALLBACK_WIDTH: u16 = 556;

fn char_width(code: u8) -> u16 {
    match code {
        32..=126 => HELVETICA_ASCII[usize::from(code - 32)],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in the unit `font_size` is expressed in.
pub(crate) fn string_width(text: &[u8], font_size: f64) -> f64 {
    let units: u32 = text.iter().map(|&b| u32::from(char_width(b))).sum();
    f64::from(units) * font_size / 1000.0
}

/// Encode `text` as single bytes for the WinAnsi font. Latin-1 characters
/// keep their code, except U+0080..=U+009F, whose bytes WinAnsi assigns to
/// other glyphs. Those and anything above U+00FF fail the whole string.
pub(crate) fn encode_latin1(text: &str) -> ReportResult<Vec<u8>> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte) if !WIN_ANSI_REMAPPED.contains(&byte) => Ok(byte),
            _ => Err(ReportError::Encoding {
                value: text.to_string(),
                character: c,
            }),
        })
        .collect()
}
