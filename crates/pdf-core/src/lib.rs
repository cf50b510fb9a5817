//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening a template PDF and reading its page geometry
//! - Building a new output document page by page
//! - Copying pages from one document into another
//! - Drawing positioned Helvetica text on a page
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{OutputDocument, TemplatePdf};
//!
//! let template = TemplatePdf::open("recto.pdf")?;
//! let (width, height) = template.page_size(1)?;
//!
//! let mut out = OutputDocument::new();
//! out.append_template_page(&template, 1)?;
//! let verso = out.add_blank_page(width, height)?;
//! out.draw_text(verso, 100.0, 120.0, "12 Rue de la Paix", 10.0)?;
//! out.save("courrier.pdf")?;
//! ```

mod document;
mod font;
mod template;
mod text;

pub use document::OutputDocument;
pub use font::{encode_literal, text_width};
pub use template::TemplatePdf;

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// RGB color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default_is_black() {
        assert_eq!(Color::default(), Color::black());
    }
}
