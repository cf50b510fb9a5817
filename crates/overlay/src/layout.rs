//! Text layout
//!
//! Turns a zone and a block of text into positioned lines: normalize the
//! text, wrap each source line greedily against the zone width, stack the
//! resulting sub-lines bottom-to-top from the zone's bottom offset, and
//! anchor each sub-line's trailing edge at the zone's right reference,
//! clamping the start to the zone's left bound.

use crate::zone::{Zone, MM_TO_PT};
use crate::ValidationError;
use pdf_core::text_width;

/// Fixed font size for all overlay text, in points
pub const FONT_SIZE: f64 = 10.0;

/// Vertical advance between stacked lines, in millimetres
pub const LINE_STEP_MM: f64 = 4.0;

/// Unit disambiguation threshold: no physical page is this many
/// millimetres wide, so a larger width must already be in points
const POINTS_THRESHOLD: f64 = 1000.0;

/// Page dimensions in points, validated non-degenerate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    width: f64,
    height: f64,
}

impl PageGeometry {
    /// Geometry from dimensions known to be in points
    pub fn from_points(width: f64, height: f64) -> Result<Self, ValidationError> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ValidationError::DegenerateGeometry(width, height));
        }
        Ok(Self { width, height })
    }

    /// Geometry from dimensions of unknown unit (millimetres or points)
    ///
    /// Widths above the threshold are taken as points; anything smaller is
    /// treated as millimetres and scaled. A documented heuristic, applied at
    /// the assembler/composer boundary.
    pub fn from_ambiguous(width: f64, height: f64) -> Result<Self, ValidationError> {
        if width > POINTS_THRESHOLD {
            Self::from_points(width, height)
        } else {
            Self::from_points(width * MM_TO_PT, height * MM_TO_PT)
        }
    }

    /// Page width in points
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Page height in points
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// One positioned line of overlay text (points, bottom-left origin)
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// Normalize a text block into layout-ready lines
///
/// Literal `\n` escape sequences become real line breaks, every line is
/// trimmed, and empty lines are dropped. Source order is preserved.
pub fn normalize_text(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Greedy word-wrap of one line against a width limit in points
///
/// A word that alone exceeds the limit is still placed on its own sub-line;
/// there is no hyphenation and no truncation.
fn wrap_line(line: &str, max_width_pt: f64) -> Vec<String> {
    let mut sub_lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current.join(" "), word)
        };

        if text_width(&candidate, FONT_SIZE) > max_width_pt && !current.is_empty() {
            sub_lines.push(current.join(" "));
            current = vec![word];
        } else {
            current.push(word);
        }
    }

    if !current.is_empty() {
        sub_lines.push(current.join(" "));
    }

    sub_lines
}

/// Lay out a text block inside a zone
///
/// Returns the positioned sub-lines, bottom-to-top: the first source line's
/// first sub-line sits at the zone's bottom offset, and every following
/// sub-line advances one line step upward. Each sub-line ends at the zone's
/// right reference; a start position left of the zone's left bound is
/// clamped to it (the line may then overrun the nominal right edge).
pub fn render_zone_text(geometry: PageGeometry, zone: &Zone, text: &str) -> Vec<PlacedLine> {
    let max_width = zone.width_pt();
    let right_ref = zone.right_ref_pt(geometry.width());
    let left_min = zone.left_pt();
    let step = LINE_STEP_MM * MM_TO_PT;

    let mut placed = Vec::new();
    let mut y = zone.bottom_pt();

    for line in normalize_text(text) {
        for sub_line in wrap_line(&line, max_width) {
            let width = text_width(&sub_line, FONT_SIZE);
            let mut x = right_ref - width;
            if x < left_min {
                x = left_min;
            }
            placed.push(PlacedLine {
                text: sub_line,
                x,
                y,
                width,
            });
            y += step;
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::{ADDRESS_ZONE_DEFAULT, NAME_ZONE_DEFAULT};
    use pretty_assertions::assert_eq;

    fn a4() -> PageGeometry {
        PageGeometry::from_points(595.28, 841.89).unwrap()
    }

    #[test]
    fn test_geometry_rejects_degenerate() {
        assert!(PageGeometry::from_points(0.0, 100.0).is_err());
        assert!(PageGeometry::from_points(100.0, -1.0).is_err());
        assert!(PageGeometry::from_points(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn test_geometry_heuristic_scales_small_widths() {
        let geometry = PageGeometry::from_ambiguous(210.0, 297.0).unwrap();
        assert!((geometry.width() - 210.0 * MM_TO_PT).abs() < 1e-9);
        assert!((geometry.height() - 297.0 * MM_TO_PT).abs() < 1e-9);
    }

    #[test]
    fn test_geometry_heuristic_keeps_large_widths() {
        let geometry = PageGeometry::from_ambiguous(1687.0, 2387.0).unwrap();
        assert_eq!(geometry.width(), 1687.0);
        assert_eq!(geometry.height(), 2387.0);
    }

    #[test]
    fn test_normalize_text_escapes_and_trims() {
        let lines = normalize_text("  Jean Dupont \\n 12 Rue A \n\n 75001 Paris ");
        assert_eq!(lines, vec!["Jean Dupont", "12 Rue A", "75001 Paris"]);
    }

    #[test]
    fn test_normalize_text_empty() {
        assert!(normalize_text("").is_empty());
        assert!(normalize_text("  \n \\n  ").is_empty());
    }

    #[test]
    fn test_wrap_keeps_short_line_whole() {
        let lines = wrap_line("12 Rue A", 500.0);
        assert_eq!(lines, vec!["12 Rue A"]);
    }

    #[test]
    fn test_wrap_splits_long_line() {
        // ~28 pt limit forces a break between the words
        let lines = wrap_line("Boulevard Haussmann", 30.0);
        assert_eq!(lines, vec!["Boulevard", "Haussmann"]);
    }

    #[test]
    fn test_wrap_overlong_word_alone() {
        let lines = wrap_line("Llanfairpwllgwyngyll 1", 20.0);
        assert_eq!(lines[0], "Llanfairpwllgwyngyll");
        assert!(text_width(&lines[0], FONT_SIZE) > 20.0);
    }

    #[test]
    fn test_wrapped_sub_lines_fit_zone_width() {
        let zone = ADDRESS_ZONE_DEFAULT;
        let text = "12 Avenue des Champs Elysees Batiment C Escalier 4 Porte Gauche Boite 12";
        assert!(text_width(text, FONT_SIZE) > zone.width * MM_TO_PT);
        let placed = render_zone_text(a4(), &zone, text);
        assert!(placed.len() > 1);
        for line in &placed {
            // single words excepted, nothing exceeds the zone width
            if line.text.contains(' ') {
                assert!(line.width <= zone.width * MM_TO_PT + 1e-9);
            }
        }
    }

    #[test]
    fn test_stacking_is_bottom_to_top_in_source_order() {
        let placed = render_zone_text(a4(), &ADDRESS_ZONE_DEFAULT, "L1\nL2\nL3");
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].text, "L1");
        assert_eq!(placed[2].text, "L3");
        // first source line is lowest, last is highest
        assert!(placed[0].y < placed[1].y);
        assert!(placed[1].y < placed[2].y);
        let step = LINE_STEP_MM * MM_TO_PT;
        assert!((placed[1].y - placed[0].y - step).abs() < 1e-9);
    }

    #[test]
    fn test_lines_are_right_anchored() {
        let zone = ADDRESS_ZONE_DEFAULT;
        let placed = render_zone_text(a4(), &zone, "Paris\nMarseille");
        let right_ref = zone.right_ref_pt(595.28);
        for line in &placed {
            assert!((line.x + line.width - right_ref).abs() < 1e-9);
        }
    }

    #[test]
    fn test_start_clamped_to_left_bound() {
        // Zone whose right reference sits barely right of the left bound, so
        // any normal line would start left of it without clamping.
        let zone = Zone {
            left: 50.0,
            right: None,
            bottom: 20.0,
            width: 1.0,
            height: 40.0,
        };
        let placed = render_zone_text(a4(), &zone, "Jean");
        assert_eq!(placed.len(), 1);
        assert!((placed[0].x - 50.0 * MM_TO_PT).abs() < 1e-9);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let text = "Jean Dupont\\n12 Rue A\\n75001 Paris";
        let first = render_zone_text(a4(), &NAME_ZONE_DEFAULT, text);
        let second = render_zone_text(a4(), &NAME_ZONE_DEFAULT, text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        assert!(render_zone_text(a4(), &NAME_ZONE_DEFAULT, "").is_empty());
    }
}
