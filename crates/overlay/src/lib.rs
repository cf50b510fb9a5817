//! Overlay - verso page composition and document assembly
//!
//! This crate is the core transform of verso:
//! - Placement zones in millimetres, resolved against envelope-window
//!   defaults
//! - Greedy word-wrap of name/address text against a zone width
//! - Composition of a verso page carrying the wrapped, anchored lines
//! - Assembly of recto (template copy) + verso page pairs, one pair per
//!   entry, into one combined document or one document per entry
//!
//! # Example
//!
//! ```ignore
//! use overlay::{assemble, Entry};
//! use pdf_core::TemplatePdf;
//!
//! let template = TemplatePdf::open("recto.pdf")?;
//! let entries = vec![Entry {
//!     row: 1,
//!     name: "Jean Dupont".into(),
//!     address: "12 Rue A\n75001 Paris".into(),
//! }];
//! let assembly = assemble(&template, &entries, None, None, false)?;
//! ```

pub mod assembler;
pub mod composer;
pub mod layout;
pub mod zone;

pub use assembler::{
    assemble, assemble_addresses, Assembly, AssemblyOutput, Entry, EntryDocument, ProcessLog,
};
pub use composer::{compose_page, RenderedPage};
pub use layout::{normalize_text, render_zone_text, PageGeometry, PlacedLine};
pub use zone::{resolve_address_zone, resolve_name_zone, Zone, ZoneConfig};

use thiserror::Error;

/// Errors for bad zone, geometry, or entry data
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Degenerate page geometry: {0} x {1}")]
    DegenerateGeometry(f64, f64),

    #[error("Invalid zone field {field}: {value}")]
    BadZoneField { field: &'static str, value: f64 },
}

/// Errors raised while composing a verso page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Composed page carries no content")]
    EmptyContent,

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}

/// Errors raised while assembling recto/verso documents
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Template document has no pages")]
    EmptyTemplate,

    #[error("No valid entries after filtering ({0} rows examined)")]
    NoValidEntries(usize),

    #[error("Row {row}: {source}")]
    EntryRender {
        row: usize,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}
