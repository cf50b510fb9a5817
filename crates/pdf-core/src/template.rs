//! Template PDF wrapper
//!
//! Read-only view of the recto template: page count, page geometry, and the
//! page object ids the output document copies from.

use crate::{PdfError, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// An opened template document
pub struct TemplatePdf {
    inner: Document,
}

impl TemplatePdf {
    /// Open a template from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Open a template from raw PDF bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Number of pages in the template
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Page width and height in points
    ///
    /// Reads the MediaBox (or CropBox), following the Parent chain when the
    /// box is inherited from the Pages node.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let media_box = self.inherited_media_box(self.page_object_id(page)?)?;
        extract_box_size(&media_box)
    }

    /// Object id of a page (1-indexed)
    pub(crate) fn page_object_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let obj = self.inner.get_object(current_id)?;
            let dict = obj
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
                return Ok(array);
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }

            break;
        }

        Err(PdfError::ParseError(format!(
            "No MediaBox found for page object {current_id:?}"
        )))
    }
}

/// Extract (width, height) from a MediaBox array `[x1 y1 x2 y2]`
fn extract_box_size(media_box: &[Object]) -> Result<(f64, f64)> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let coord = |i: usize| -> Result<f64> {
        media_box[i]
            .as_f32()
            .map(|v| v as f64)
            .ok()
            .or_else(|| media_box[i].as_i64().ok().map(|v| v as f64))
            .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
    };

    let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);
    Ok((x2 - x1, y2 - y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_box_size() {
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ];
        let (w, h) = extract_box_size(&media_box).unwrap();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_extract_box_size_with_offset_origin() {
        let media_box = vec![
            Object::Integer(10),
            Object::Integer(20),
            Object::Integer(410),
            Object::Integer(620),
        ];
        let (w, h) = extract_box_size(&media_box).unwrap();
        assert_eq!(w, 400.0);
        assert_eq!(h, 600.0);
    }

    #[test]
    fn test_extract_box_size_too_short() {
        let media_box = vec![Object::Integer(0), Object::Integer(0)];
        assert!(extract_box_size(&media_box).is_err());
    }
}
