//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use pdf_core::{text_width, OutputDocument, PdfError, TemplatePdf};

/// Build a one-page template by serializing an OutputDocument
fn create_test_template(width: f64, height: f64) -> Vec<u8> {
    let mut doc = OutputDocument::new();
    doc.add_blank_page(width, height).unwrap();
    doc.draw_text(1, 50.0, height - 50.0, "RECTO", 10.0).unwrap();
    doc.to_bytes().unwrap()
}

#[test]
fn test_open_template_from_bytes() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();
    assert_eq!(template.page_count(), 1);
}

#[test]
fn test_template_page_size() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();
    let (w, h) = template.page_size(1).unwrap();
    assert!((w - 595.28).abs() < 0.01, "width was {w}");
    assert!((h - 841.89).abs() < 0.01, "height was {h}");
}

#[test]
fn test_template_invalid_page() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();
    let err = template.page_size(2).unwrap_err();
    assert!(matches!(err, PdfError::InvalidPage(2, 1)));
}

#[test]
fn test_open_garbage_fails() {
    assert!(TemplatePdf::open_from_bytes(b"not a pdf").is_err());
}

#[test]
fn test_interleave_template_and_blank_pages() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();

    let mut out = OutputDocument::new();
    for _ in 0..3 {
        out.append_template_page(&template, 1).unwrap();
        let verso = out.add_blank_page(595.28, 841.89).unwrap();
        out.draw_text(verso, 100.0, 100.0, "Jean Dupont", 10.0)
            .unwrap();
    }
    assert_eq!(out.page_count(), 6);

    let produced = out.to_bytes().unwrap();
    let reloaded = lopdf::Document::load_mem(&produced).unwrap();
    assert_eq!(reloaded.get_pages().len(), 6);
}

#[test]
fn test_copied_page_keeps_content() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();

    let mut out = OutputDocument::new();
    out.append_template_page(&template, 1).unwrap();
    assert!(out.page_has_marks(1));
}

#[test]
fn test_text_appears_in_saved_content() {
    let mut out = OutputDocument::new();
    out.add_blank_page(400.0, 600.0).unwrap();
    out.draw_text(1, 20.0, 30.0, "12 Rue de la Paix", 10.0)
        .unwrap();
    let produced = out.to_bytes().unwrap();

    let reloaded = lopdf::Document::load_mem(&produced).unwrap();
    let pages = reloaded.get_pages();
    let page_id = pages[&1];
    let content = reloaded.get_page_content(page_id).unwrap();
    let content_str = String::from_utf8_lossy(&content);
    assert!(content_str.contains("(12 Rue de la Paix) Tj"));
    assert!(content_str.contains("/F1 10 Tf"));
}

#[test]
fn test_saved_page_declares_helvetica() {
    let mut out = OutputDocument::new();
    out.add_blank_page(400.0, 600.0).unwrap();
    out.draw_text(1, 20.0, 30.0, "Hello", 10.0).unwrap();
    let produced = out.to_bytes().unwrap();

    // The base font is referenced by name, never embedded
    let raw = String::from_utf8_lossy(&produced);
    assert!(raw.contains("/Helvetica"));
    assert!(raw.contains("/WinAnsiEncoding"));
}

#[test]
fn test_separate_documents_are_independent() {
    let bytes = create_test_template(595.28, 841.89);
    let template = TemplatePdf::open_from_bytes(&bytes).unwrap();

    let mut first = OutputDocument::new();
    first.append_template_page(&template, 1).unwrap();
    let mut second = OutputDocument::new();
    second.append_template_page(&template, 1).unwrap();
    second.add_blank_page(595.28, 841.89).unwrap();

    assert_eq!(first.page_count(), 1);
    assert_eq!(second.page_count(), 2);
}

#[test]
fn test_text_width_monotonic_in_length() {
    let short = text_width("Paris", 10.0);
    let long = text_width("Paris 75001", 10.0);
    assert!(long > short);
}
