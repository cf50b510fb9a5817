//! Helvetica font metrics and text encoding
//!
//! The output documents render all text with the base-14 Helvetica font,
//! which viewers supply themselves, so no font program is embedded. Widths
//! below are the Adobe AFM advance widths in 1/1000 em units.

/// PDF font resource name used on every page that carries text
pub(crate) const FONT_RESOURCE: &str = "F1";

/// PostScript name of the base font
pub(crate) const BASE_FONT: &str = "Helvetica";

/// Advance widths for the printable ASCII range 0x20..=0x7E
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667,
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556,
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Advance width of a single character in 1/1000 em units
///
/// Accented Latin-1 letters reuse the width of their base letter; anything
/// outside the supported set falls back to the average lowercase advance.
fn char_width_millis(c: char) -> u16 {
    let code = c as u32;
    match code {
        0x20..=0x7E => ASCII_WIDTHS[(code - 0x20) as usize],
        0xC0..=0xC5 => 667,  // À..Å
        0xC6 => 1000,        // Æ
        0xC7 => 722,         // Ç
        0xC8..=0xCB => 667,  // È..Ë
        0xCC..=0xCF => 278,  // Ì..Ï
        0xD1 => 722,         // Ñ
        0xD2..=0xD6 | 0xD8 => 778, // Ò..Ö, Ø
        0xD9..=0xDC => 722,  // Ù..Ü
        0xDD => 667,         // Ý
        0xDF => 611,         // ß
        0xE0..=0xE5 => 556,  // à..å
        0xE6 => 889,         // æ
        0xE7 => 500,         // ç
        0xE8..=0xEB => 556,  // è..ë
        0xEC..=0xEF => 278,  // ì..ï
        0xF1 => 556,         // ñ
        0xF2..=0xF6 | 0xF8 => 556, // ò..ö, ø
        0xF9..=0xFC => 556,  // ù..ü
        0xFD | 0xFF => 500,  // ý, ÿ
        _ => 556,
    }
}

/// Rendered width of a string in points at the given font size
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let millis: u64 = text.chars().map(|c| char_width_millis(c) as u64).sum();
    millis as f64 * font_size / 1000.0
}

/// Encode text as a PDF literal string (parenthesized form)
///
/// Characters are written as Latin-1 bytes, which matches WinAnsiEncoding for
/// everything this system puts on a page; anything outside Latin-1 is
/// replaced by '?'. Parentheses and backslashes are escaped.
pub fn encode_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        let byte = if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' };
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
    out.push(b')');
    out
}
