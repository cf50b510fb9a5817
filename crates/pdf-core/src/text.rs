//! Text rendering utilities

use crate::font;
use crate::Color;

/// Generate PDF operators for text insertion
///
/// Creates the proper PDF text operators (BT, rg, Tf, Td, Tj, ET) to render
/// one line of text at a specific position. Coordinates are PDF points with
/// the origin at the bottom-left of the page.
///
/// # Arguments
/// * `text` - Text to render (encoded as a literal string)
/// * `x` - X coordinate in points (from left)
/// * `y` - Y coordinate in points (from bottom)
/// * `font_size` - Font size in points
/// * `color` - Fill color
///
/// # Returns
/// Vector of bytes containing the PDF operators
pub(crate) fn generate_text_operators(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    color: Color,
) -> Vec<u8> {
    let mut ops = Vec::new();

    // Begin Text
    ops.extend_from_slice(b"BT\n");

    // Set fill color (rg operator for non-stroking color)
    ops.extend_from_slice(format!("{} {} {} rg\n", color.r, color.g, color.b).as_bytes());

    // Set font and size: /F1 10 Tf
    ops.extend_from_slice(format!("/{} {} Tf\n", font::FONT_RESOURCE, font_size).as_bytes());

    // Move to position: x y Td
    ops.extend_from_slice(format!("{x} {y} Td\n").as_bytes());

    // Show text: (literal) Tj
    ops.extend_from_slice(&font::encode_literal(text));
    ops.extend_from_slice(b" Tj\nET\n");

    ops
}
