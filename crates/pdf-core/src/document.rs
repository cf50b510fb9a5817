//! Output document builder
//!
//! `OutputDocument` owns the document being produced: pages are appended in
//! order (copied from a template or created blank), text operators are
//! buffered per page, and everything is flushed into real content streams
//! when the document is serialized.

use crate::font::{BASE_FONT, FONT_RESOURCE};
use crate::text::generate_text_operators;
use crate::{Color, PdfError, Result, TemplatePdf};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// A new PDF document built page by page
pub struct OutputDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Object id of the root Pages node
    pages_id: ObjectId,
    /// Page object ids in append order
    page_ids: Vec<ObjectId>,
    /// Buffered content operators per page (1-indexed page -> operators)
    content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Pages that carry text and need the shared font resource
    text_pages: BTreeSet<usize>,
    /// The shared Helvetica font object, created on first flush
    font_id: Option<ObjectId>,
}

impl OutputDocument {
    /// Create an empty document (catalog + empty page tree)
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");

        let pages_id = inner.new_object_id();
        let mut pages_dict = Dictionary::new();
        pages_dict.set(b"Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set(b"Kids", Object::Array(Vec::new()));
        pages_dict.set(b"Count", Object::Integer(0));
        inner.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set(b"Type", Object::Name(b"Catalog".to_vec()));
        catalog.set(b"Pages", Object::Reference(pages_id));
        let catalog_id = inner.add_object(Object::Dictionary(catalog));
        inner.trailer.set("Root", Object::Reference(catalog_id));

        Self {
            inner,
            pages_id,
            page_ids: Vec::new(),
            content_buffer: BTreeMap::new(),
            text_pages: BTreeSet::new(),
            font_id: None,
        }
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Add a blank page with the given MediaBox
    ///
    /// # Arguments
    /// * `width` - Page width in points
    /// * `height` - Page height in points
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self, width: f64, height: f64) -> Result<usize> {
        // Empty content stream; text operators are appended at flush time
        let contents_id = self
            .inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), Vec::new())));

        let mut page_dict = Dictionary::new();
        page_dict.set(b"Type", Object::Name(b"Page".to_vec()));
        page_dict.set(b"Parent", Object::Reference(self.pages_id));
        page_dict.set(
            b"MediaBox",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ]),
        );
        page_dict.set(b"Resources", Object::Dictionary(Dictionary::new()));
        page_dict.set(b"Contents", Object::Reference(contents_id));

        let page_id = self.inner.add_object(Object::Dictionary(page_dict));
        self.push_page(page_id)
    }

    /// Append a copy of a template page
    ///
    /// # Arguments
    /// * `template` - Source template document
    /// * `page` - Template page number (1-indexed)
    ///
    /// # Returns
    /// New page number in this document (1-indexed)
    pub fn append_template_page(&mut self, template: &TemplatePdf, page: usize) -> Result<usize> {
        let src_page_id = template.page_object_id(page)?;
        self.append_foreign_page(template.inner(), src_page_id)
    }

    /// Append a copy of a page from any other document
    ///
    /// # Arguments
    /// * `source` - Source document
    /// * `page` - Source page number (1-indexed)
    pub fn append_document_page(&mut self, source: &Document, page: usize) -> Result<usize> {
        let pages = source.get_pages();
        let src_page_id = *pages
            .get(&(page as u32))
            .ok_or(PdfError::InvalidPage(page, pages.len()))?;
        self.append_foreign_page(source, src_page_id)
    }

    /// Deep-copy a page object and everything reachable from it
    ///
    /// Object ids are remapped into this document; the Parent entry is
    /// rewritten to our own page tree instead of being copied.
    fn append_foreign_page(&mut self, source: &Document, src_page_id: ObjectId) -> Result<usize> {
        let mut id_map: HashMap<ObjectId, ObjectId> = HashMap::new();

        // Reserve the new page id first so self-references (e.g. annotations
        // pointing back at their page) resolve to the copy, not the source.
        let new_page_id = self.inner.new_object_id();
        id_map.insert(src_page_id, new_page_id);

        let src_dict = source
            .get_object(src_page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();

        let mut new_dict = Dictionary::new();
        for (key, value) in src_dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            let imported = self.import_object(source, value, &mut id_map)?;
            new_dict.set(key.clone(), imported);
        }
        new_dict.set(b"Parent", Object::Reference(self.pages_id));

        self.inner
            .objects
            .insert(new_page_id, Object::Dictionary(new_dict));
        self.push_page(new_page_id)
    }

    /// Recursively import an object from another document
    fn import_object(
        &mut self,
        source: &Document,
        obj: &Object,
        id_map: &mut HashMap<ObjectId, ObjectId>,
    ) -> Result<Object> {
        match obj {
            Object::Reference(src_id) => {
                if let Some(mapped) = id_map.get(src_id) {
                    return Ok(Object::Reference(*mapped));
                }
                let new_id = self.inner.new_object_id();
                id_map.insert(*src_id, new_id);
                let resolved = source.get_object(*src_id)?.clone();
                let imported = self.import_object(source, &resolved, id_map)?;
                self.inner.objects.insert(new_id, imported);
                Ok(Object::Reference(new_id))
            }
            Object::Array(items) => {
                let mut imported = Vec::with_capacity(items.len());
                for item in items {
                    imported.push(self.import_object(source, item, id_map)?);
                }
                Ok(Object::Array(imported))
            }
            Object::Dictionary(dict) => {
                let mut imported = Dictionary::new();
                for (key, value) in dict.iter() {
                    imported.set(key.clone(), self.import_object(source, value, id_map)?);
                }
                Ok(Object::Dictionary(imported))
            }
            Object::Stream(stream) => {
                let mut dict = Dictionary::new();
                for (key, value) in stream.dict.iter() {
                    dict.set(key.clone(), self.import_object(source, value, id_map)?);
                }
                // Content stays as stored (possibly compressed); the Filter
                // entry travels with the dictionary.
                Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
            }
            other => Ok(other.clone()),
        }
    }

    /// Register a page id in the page tree and append order
    fn push_page(&mut self, page_id: ObjectId) -> Result<usize> {
        let pages_dict = self
            .inner
            .get_object(self.pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;

        let mut kids = pages_dict
            .get(b"Kids")
            .and_then(|k| k.as_array())
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids.push(Object::Reference(page_id));

        let mut new_pages_dict = pages_dict.clone();
        new_pages_dict.set(b"Kids", Object::Array(kids));
        new_pages_dict.set(b"Count", Object::Integer(self.page_ids.len() as i64 + 1));
        self.inner
            .objects
            .insert(self.pages_id, new_pages_dict.into());

        self.page_ids.push(page_id);
        Ok(self.page_ids.len())
    }

    /// Draw one line of text at a position
    ///
    /// Coordinates are PDF points from the bottom-left corner. Text is
    /// buffered and written to the page's content stream at save time.
    /// Empty text is a no-op.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from bottom)
    /// * `text` - Text to render
    /// * `font_size` - Font size in points
    pub fn draw_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        text: &str,
        font_size: f64,
    ) -> Result<()> {
        let page_count = self.page_ids.len();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        if text.is_empty() {
            return Ok(());
        }

        let ops = generate_text_operators(text, x, y, font_size, Color::black());
        self.content_buffer.entry(page).or_default().extend(ops);
        self.text_pages.insert(page);
        Ok(())
    }

    /// Whether a page carries any visible content
    ///
    /// True when text operators are buffered for the page or its content
    /// stream is non-empty (the case for copied template pages).
    pub fn page_has_marks(&self, page: usize) -> bool {
        if self
            .content_buffer
            .get(&page)
            .is_some_and(|ops| !ops.is_empty())
        {
            return true;
        }
        self.existing_content(page)
            .map(|content| !content.is_empty())
            .unwrap_or(false)
    }

    /// Flush buffered text into content streams and wire up font resources
    pub fn flush(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> =
            std::mem::take(&mut self.content_buffer).into_iter().collect();
        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        let text_pages: Vec<usize> = std::mem::take(&mut self.text_pages).into_iter().collect();
        if !text_pages.is_empty() {
            let font_id = self.ensure_font_object();
            for page in text_pages {
                self.add_font_to_page_resources(page, font_id)?;
            }
        }

        Ok(())
    }

    /// Serialize the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Serialize the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// The non-embedded base-14 Helvetica font object, created once
    fn ensure_font_object(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let mut font_dict = Dictionary::new();
        font_dict.set(b"Type", Object::Name(b"Font".to_vec()));
        font_dict.set(b"Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set(b"BaseFont", Object::Name(BASE_FONT.as_bytes().to_vec()));
        font_dict.set(b"Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let id = self.inner.add_object(Object::Dictionary(font_dict));
        self.font_id = Some(id);
        id
    }

    /// Add the shared font reference to a page's Resources dictionary
    fn add_font_to_page_resources(&mut self, page: usize, font_id: ObjectId) -> Result<()> {
        let page_id = self.page_object_id(page)?;
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();

        let mut resources_dict = match page_dict.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(ref_id)) => self
                .inner
                .get_object(*ref_id)?
                .as_dict()
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        };

        let mut font_dict = resources_dict
            .get(b"Font")
            .and_then(|f| f.as_dict())
            .cloned()
            .unwrap_or_else(|_| Dictionary::new());
        font_dict.set(FONT_RESOURCE.as_bytes(), Object::Reference(font_id));
        resources_dict.set(b"Font", Object::Dictionary(font_dict));

        let mut new_page_dict = page_dict;
        new_page_dict.set(b"Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Read a page's current content stream bytes
    fn existing_content(&self, page: usize) -> Result<Vec<u8>> {
        let page_id = self.page_object_id(page)?;
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

        let content = match page_dict.get(b"Contents") {
            Ok(Object::Stream(stream)) => stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
            Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                Ok(Object::Stream(stream)) => stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
                _ => Vec::new(),
            },
            Ok(Object::Array(arr)) => {
                let mut combined = Vec::new();
                for obj in arr {
                    let stream = match obj {
                        Object::Reference(ref_id) => match self.inner.get_object(*ref_id) {
                            Ok(Object::Stream(stream)) => Some(stream),
                            _ => None,
                        },
                        Object::Stream(stream) => Some(stream),
                        _ => None,
                    };
                    if let Some(stream) = stream {
                        let data = stream
                            .decompressed_content()
                            .unwrap_or_else(|_| stream.content.clone());
                        combined.extend_from_slice(&data);
                    }
                }
                combined
            }
            _ => Vec::new(),
        };

        Ok(content)
    }

    /// Append operators to a page's content stream
    ///
    /// The existing stream (decompressed if needed) and the new operators are
    /// written back as a single fresh stream object.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let mut new_content = self.existing_content(page)?;
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let page_id = self.page_object_id(page)?;
        let mut new_page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        new_page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    fn page_object_id(&self, page: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page.wrapping_sub(1))
            .copied()
            .ok_or(PdfError::InvalidPage(page, self.page_ids.len()))
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_is_empty() {
        let doc = OutputDocument::new();
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_add_blank_page_numbers() {
        let mut doc = OutputDocument::new();
        assert_eq!(doc.add_blank_page(595.28, 841.89).unwrap(), 1);
        assert_eq!(doc.add_blank_page(595.28, 841.89).unwrap(), 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_draw_text_invalid_page() {
        let mut doc = OutputDocument::new();
        let err = doc.draw_text(1, 0.0, 0.0, "x", 10.0).unwrap_err();
        assert!(matches!(err, PdfError::InvalidPage(1, 0)));
    }

    #[test]
    fn test_blank_page_has_no_marks() {
        let mut doc = OutputDocument::new();
        doc.add_blank_page(595.28, 841.89).unwrap();
        assert!(!doc.page_has_marks(1));
    }

    #[test]
    fn test_drawn_text_marks_page() {
        let mut doc = OutputDocument::new();
        doc.add_blank_page(595.28, 841.89).unwrap();
        doc.draw_text(1, 10.0, 10.0, "Jean Dupont", 10.0).unwrap();
        assert!(doc.page_has_marks(1));
    }

    #[test]
    fn test_empty_text_is_noop() {
        let mut doc = OutputDocument::new();
        doc.add_blank_page(595.28, 841.89).unwrap();
        doc.draw_text(1, 10.0, 10.0, "", 10.0).unwrap();
        assert!(!doc.page_has_marks(1));
    }

    #[test]
    fn test_marks_survive_flush() {
        let mut doc = OutputDocument::new();
        doc.add_blank_page(595.28, 841.89).unwrap();
        doc.draw_text(1, 10.0, 10.0, "Jean Dupont", 10.0).unwrap();
        doc.flush().unwrap();
        assert!(doc.page_has_marks(1));
    }

    #[test]
    fn test_to_bytes_roundtrip() {
        let mut doc = OutputDocument::new();
        doc.add_blank_page(400.0, 600.0).unwrap();
        doc.draw_text(1, 50.0, 50.0, "Hello", 10.0).unwrap();
        let bytes = doc.to_bytes().unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }
}
