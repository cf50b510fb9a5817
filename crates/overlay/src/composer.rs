//! Verso page composition
//!
//! Builds one rendered page carrying the wrapped name and address lines.
//! The page lives in its own single-page document whose ownership passes to
//! the caller (typically the assembler, which copies it into the output).

use crate::layout::{render_zone_text, PageGeometry, FONT_SIZE};
use crate::zone::Zone;
use crate::RenderError;
use pdf_core::OutputDocument;
use tracing::debug;

/// An immutable composed verso page
pub struct RenderedPage {
    doc: OutputDocument,
    geometry: PageGeometry,
}

impl RenderedPage {
    /// Geometry the page was composed at
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// The single-page document holding the composition
    pub fn document(&self) -> &OutputDocument {
        &self.doc
    }

    /// Serialize the page as a standalone one-page PDF
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, RenderError> {
        Ok(self.doc.to_bytes()?)
    }
}

/// Compose a verso page from name and address text blocks
///
/// Each zone is laid out independently; a zone with empty text contributes
/// nothing, and a page with both blocks empty is still produced (blank).
/// When any text was supplied, the finished page must carry a non-empty
/// content stream — otherwise composition failed and `RenderError` is
/// returned rather than a silently blank verso.
pub fn compose_page(
    geometry: PageGeometry,
    name_zone: &Zone,
    name_text: &str,
    address_zone: &Zone,
    address_text: &str,
) -> Result<RenderedPage, RenderError> {
    let mut doc = OutputDocument::new();
    let page = doc.add_blank_page(geometry.width(), geometry.height())?;

    let mut line_count = 0usize;
    for (zone, text) in [(name_zone, name_text), (address_zone, address_text)] {
        for line in render_zone_text(geometry, zone, text) {
            doc.draw_text(page, line.x, line.y, &line.text, FONT_SIZE)?;
            line_count += 1;
        }
    }
    debug!(line_count, "composed verso page");

    doc.flush()?;
    if line_count > 0 && !doc.page_has_marks(page) {
        return Err(RenderError::EmptyContent);
    }

    Ok(RenderedPage { doc, geometry })
}
