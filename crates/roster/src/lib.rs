//! Roster - tabular entry loading
//!
//! Collaborator of the overlay core: reads one or more CSV inputs, sniffs
//! the delimiter, detects the name/address columns by alias, concatenates
//! files in order, and produces normalized [`Entry`] rows with continuous
//! 1-based numbering.
//!
//! # Example
//!
//! ```ignore
//! use roster::load_entries;
//!
//! let roster = load_entries(&["clients.csv", "prospects.csv"])?;
//! println!("{} rows, address column '{}'", roster.entries.len(), roster.address_column);
//! ```

mod columns;
mod sniff;

pub use columns::{detect_column, ADDRESS_ALIASES, NAME_ALIASES};
pub use sniff::sniff_delimiter;

use overlay::Entry;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading tabular input
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("No address column found (looked for: {0})")]
    MissingAddressColumn(String),

    #[error("Input {0} has no header row")]
    EmptyInput(String),
}

/// Result type for roster operations
pub type Result<T> = std::result::Result<T, RosterError>;

/// Loaded entries plus the detected column names
#[derive(Debug, Clone)]
pub struct Roster {
    pub entries: Vec<Entry>,
    /// Detected name column, if any file had one
    pub name_column: Option<String>,
    /// Detected address column (first file that had one wins the label)
    pub address_column: String,
}

/// Load and concatenate entries from CSV files on disk
pub fn load_entries<P: AsRef<Path>>(paths: &[P]) -> Result<Roster> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let label = path.as_ref().display().to_string();
        let data = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: label.clone(),
            source,
        })?;
        sources.push((label, data));
    }
    load_entries_from_sources(&sources)
}

/// Load and concatenate entries from in-memory CSV sources
///
/// `sources` are `(label, content)` pairs; the label only appears in errors.
/// Row numbering is continuous across sources, in argument order. A source
/// without a name column contributes empty names (the address-only legacy
/// shape); a source without an address column is an error.
pub fn load_entries_from_sources(sources: &[(String, String)]) -> Result<Roster> {
    let mut entries = Vec::new();
    let mut name_column: Option<String> = None;
    let mut address_column: Option<String> = None;
    let mut row = 0usize;

    for (label, content) in sources {
        let delimiter = sniff_delimiter(content);
        debug!(source = %label, delimiter = %(delimiter as char), "reading csv source");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|source| RosterError::Csv {
                path: label.clone(),
                source,
            })?
            .clone();
        if headers.is_empty() {
            return Err(RosterError::EmptyInput(label.clone()));
        }

        let header_names: Vec<&str> = headers.iter().collect();
        let name_idx = detect_column(&header_names, NAME_ALIASES);
        let address_idx = detect_column(&header_names, ADDRESS_ALIASES).ok_or_else(|| {
            RosterError::MissingAddressColumn(ADDRESS_ALIASES.join(", "))
        })?;

        if name_column.is_none() {
            name_column = name_idx.map(|i| header_names[i].to_string());
        }
        if address_column.is_none() {
            address_column = Some(header_names[address_idx].to_string());
        }

        for record in reader.records() {
            let record = record.map_err(|source| RosterError::Csv {
                path: label.clone(),
                source,
            })?;
            row += 1;
            let name = name_idx
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string();
            let address = record.get(address_idx).unwrap_or_default().to_string();
            entries.push(Entry { row, name, address });
        }
    }

    Ok(Roster {
        entries,
        name_column,
        // unreachable fallback: every source was required to have the column
        address_column: address_column.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(label: &str, content: &str) -> (String, String) {
        (label.to_string(), content.to_string())
    }

    #[test]
    fn test_load_single_source() {
        let csv = "name,adresse\nJean Dupont,12 Rue A\\n75001 Paris\nMarie Martin,34 Rue B\n";
        let roster = load_entries_from_sources(&[source("a.csv", csv)]).unwrap();

        assert_eq!(roster.entries.len(), 2);
        assert_eq!(roster.entries[0].row, 1);
        assert_eq!(roster.entries[0].name, "Jean Dupont");
        assert_eq!(roster.entries[0].address, "12 Rue A\\n75001 Paris");
        assert_eq!(roster.name_column.as_deref(), Some("name"));
        assert_eq!(roster.address_column, "adresse");
    }

    #[test]
    fn test_semicolon_delimited_source() {
        let csv = "nom;adresse\nJean Dupont;12 Rue A\n";
        let roster = load_entries_from_sources(&[source("a.csv", csv)]).unwrap();
        assert_eq!(roster.entries[0].name, "Jean Dupont");
        assert_eq!(roster.entries[0].address, "12 Rue A");
    }

    #[test]
    fn test_concatenation_numbers_rows_continuously() {
        let first = "name,address\nA,Addr 1\nB,Addr 2\n";
        let second = "name,address\nC,Addr 3\n";
        let roster =
            load_entries_from_sources(&[source("1.csv", first), source("2.csv", second)]).unwrap();

        let rows: Vec<usize> = roster.entries.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(roster.entries[2].name, "C");
    }

    #[test]
    fn test_address_only_source_yields_empty_names() {
        let csv = "adresse\n12 Rue A\n";
        let roster = load_entries_from_sources(&[source("a.csv", csv)]).unwrap();
        assert_eq!(roster.entries[0].name, "");
        assert_eq!(roster.name_column, None);
    }

    #[test]
    fn test_missing_address_column_is_an_error() {
        let csv = "name,city\nJean,Paris\n";
        let err = load_entries_from_sources(&[source("a.csv", csv)]).unwrap_err();
        assert!(matches!(err, RosterError::MissingAddressColumn(_)));
    }

    #[test]
    fn test_blank_rows_are_kept_for_numbering() {
        let csv = "name,address\nA,Addr 1\n,\nB,Addr 3\n";
        let roster = load_entries_from_sources(&[source("a.csv", csv)]).unwrap();
        assert_eq!(roster.entries.len(), 3);
        assert!(roster.entries[1].is_blank());
        assert_eq!(roster.entries[2].row, 3);
    }
}
