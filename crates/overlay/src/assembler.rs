//! Recto/verso document assembly
//!
//! For each entry, in input order: one copy of the template's first page
//! (the recto), then one composed verso page. Combined mode appends every
//! pair into a single document; otherwise each entry yields its own
//! two-page document.

use crate::composer::compose_page;
use crate::layout::{normalize_text, PageGeometry};
use crate::zone::{resolve_address_zone, resolve_name_zone, Zone, ZoneConfig};
use crate::{AssemblyError, RenderError};
use pdf_core::{OutputDocument, TemplatePdf};
use std::fmt;
use tracing::{debug, warn};

/// One row's worth of name/address data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based row position in the (possibly concatenated) input order
    pub row: usize,
    pub name: String,
    pub address: String,
}

impl Entry {
    /// Whether both fields are empty after normalization
    pub fn is_blank(&self) -> bool {
        normalize_text(&self.name).is_empty() && normalize_text(&self.address).is_empty()
    }
}

/// Diagnostic lines describing processed and skipped rows
///
/// The caller decides the sink: console, HTTP response field, log file.
#[derive(Debug, Clone, Default)]
pub struct ProcessLog {
    lines: Vec<String>,
}

impl ProcessLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for ProcessLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// A serialized two-page document for one entry
#[derive(Debug, Clone)]
pub struct EntryDocument {
    pub row: usize,
    pub bytes: Vec<u8>,
}

/// Assembly result: one combined document or one document per entry
#[derive(Debug, Clone)]
pub enum AssemblyOutput {
    Combined(Vec<u8>),
    PerEntry(Vec<EntryDocument>),
}

/// Finished assembly with its processing log
#[derive(Debug, Clone)]
pub struct Assembly {
    pub output: AssemblyOutput,
    pub log: ProcessLog,
}

impl Assembly {
    /// Number of documents produced
    pub fn document_count(&self) -> usize {
        match &self.output {
            AssemblyOutput::Combined(_) => 1,
            AssemblyOutput::PerEntry(docs) => docs.len(),
        }
    }
}

/// Assemble recto/verso documents for a list of entries
///
/// The template's first page supplies both the recto and the verso geometry,
/// however many pages the template has. Blank entries are skipped and
/// logged. In per-entry mode a failing entry is skipped and the rest still
/// succeed; in combined mode the first failure aborts the whole document.
///
/// # Arguments
/// * `template` - Opened template document
/// * `entries` - Entries in input order
/// * `name_zone` - Optional name zone configuration (defaults apply)
/// * `address_zone` - Optional address zone configuration (defaults apply)
/// * `combine` - One combined document instead of one per entry
pub fn assemble(
    template: &TemplatePdf,
    entries: &[Entry],
    name_zone: Option<&ZoneConfig>,
    address_zone: Option<&ZoneConfig>,
    combine: bool,
) -> Result<Assembly, AssemblyError> {
    if template.page_count() == 0 {
        return Err(AssemblyError::EmptyTemplate);
    }

    let name_zone = resolve_name_zone(name_zone)?;
    let address_zone = resolve_address_zone(address_zone)?;

    // Geometry is read once from page 1 and reused for every verso. The
    // mm-vs-points heuristic is applied here, at the composer boundary.
    let (width, height) = template.page_size(1)?;
    let geometry = PageGeometry::from_ambiguous(width, height)
        .map_err(AssemblyError::Validation)?;

    let mut log = ProcessLog::default();

    if combine {
        assemble_combined(template, entries, geometry, &name_zone, &address_zone, &mut log)
    } else {
        assemble_per_entry(template, entries, geometry, &name_zone, &address_zone, &mut log)
    }
}

/// Legacy entry point: address-only rows, no name block
///
/// Thin adapter over [`assemble`] that forwards empty names.
pub fn assemble_addresses(
    template: &TemplatePdf,
    addresses: &[(usize, String)],
    address_zone: Option<&ZoneConfig>,
    combine: bool,
) -> Result<Assembly, AssemblyError> {
    let entries: Vec<Entry> = addresses
        .iter()
        .map(|(row, address)| Entry {
            row: *row,
            name: String::new(),
            address: address.clone(),
        })
        .collect();
    assemble(template, &entries, None, address_zone, combine)
}

fn assemble_combined(
    template: &TemplatePdf,
    entries: &[Entry],
    geometry: PageGeometry,
    name_zone: &Zone,
    address_zone: &Zone,
    log: &mut ProcessLog,
) -> Result<Assembly, AssemblyError> {
    let mut doc = OutputDocument::new();
    let mut appended = 0usize;

    for entry in entries {
        if entry.is_blank() {
            skip_blank(entry, log);
            continue;
        }

        // A single render failure aborts the combined document
        let verso = compose_page(geometry, name_zone, &entry.name, address_zone, &entry.address)
            .map_err(|source| AssemblyError::EntryRender {
                row: entry.row,
                source,
            })?;

        doc.append_template_page(template, 1)?;
        doc.append_document_page(verso.document().inner(), 1)?;
        appended += 1;
        log.push(format!("Row {}: appended recto/verso pair", entry.row));
    }

    if appended == 0 {
        return Err(AssemblyError::NoValidEntries(entries.len()));
    }

    debug!(entries = appended, pages = doc.page_count(), "combined document assembled");
    let bytes = doc.to_bytes()?;
    Ok(Assembly {
        output: AssemblyOutput::Combined(bytes),
        log: std::mem::take(log),
    })
}

fn assemble_per_entry(
    template: &TemplatePdf,
    entries: &[Entry],
    geometry: PageGeometry,
    name_zone: &Zone,
    address_zone: &Zone,
    log: &mut ProcessLog,
) -> Result<Assembly, AssemblyError> {
    let mut documents = Vec::new();

    for entry in entries {
        if entry.is_blank() {
            skip_blank(entry, log);
            continue;
        }

        match build_entry_document(template, entry, geometry, name_zone, address_zone) {
            Ok(bytes) => {
                log.push(format!("Row {}: document generated", entry.row));
                documents.push(EntryDocument {
                    row: entry.row,
                    bytes,
                });
            }
            // Partial success: already-produced documents remain valid
            Err(err) => {
                warn!(row = entry.row, error = %err, "entry failed, continuing");
                log.push(format!("Row {}: failed ({err})", entry.row));
            }
        }
    }

    if documents.is_empty() {
        return Err(AssemblyError::NoValidEntries(entries.len()));
    }

    Ok(Assembly {
        output: AssemblyOutput::PerEntry(documents),
        log: std::mem::take(log),
    })
}

fn build_entry_document(
    template: &TemplatePdf,
    entry: &Entry,
    geometry: PageGeometry,
    name_zone: &Zone,
    address_zone: &Zone,
) -> Result<Vec<u8>, RenderError> {
    let verso = compose_page(geometry, name_zone, &entry.name, address_zone, &entry.address)?;

    let mut doc = OutputDocument::new();
    doc.append_template_page(template, 1)?;
    doc.append_document_page(verso.document().inner(), 1)?;
    Ok(doc.to_bytes()?)
}

fn skip_blank(entry: &Entry, log: &mut ProcessLog) {
    warn!(row = entry.row, "empty name and address, row skipped");
    log.push(format!("Row {}: empty, skipped", entry.row));
}
