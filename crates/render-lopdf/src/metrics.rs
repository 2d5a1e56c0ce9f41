//! Advance widths of the two base-14 fonts the renderer uses.
//!
//! Widths are in thousandths of the font size, taken from the Adobe AFM files
//! for Helvetica and Helvetica-Bold, covering printable ASCII. Other Latin-1
//! characters use a small override table, then a default of 556.

use specsheet_style::FontWeight;
use specsheet_style::dimension::{MM_PER_INCH, PT_PER_INCH};

const FIRST: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const DEFAULT_WIDTH: u16 = 556;

fn latin1_width(c: char, bold: bool) -> u16 {
    match c {
        '°' => 400,
        '±' | '×' | '÷' => 584,
        '·' => 278,
        'µ' if bold => 611,
        '©' | '®' => 737,
        _ => DEFAULT_WIDTH,
    }
}

/// Advance width of one character, in thousandths of the font size.
pub fn char_width(c: char, weight: FontWeight) -> u16 {
    let table = if weight.is_bold() { &HELVETICA_BOLD } else { &HELVETICA };
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or_else(|| latin1_width(c, weight.is_bold()))
}

/// Width of `text` set at `font_size` points, in millimetres.
pub fn text_width_mm(text: &str, font_size: f32, weight: FontWeight) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, weight))).sum();
    units as f32 / 1000.0 * font_size * MM_PER_INCH / PT_PER_INCH
}

/// Height of capital letters above the baseline, in millimetres.
pub fn cap_height_mm(font_size: f32) -> f32 {
    0.718 * font_size * MM_PER_INCH / PT_PER_INCH
}
