//! ZIP packaging of generated documents

use anyhow::Result;
use overlay::EntryDocument;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::CompressionMethod;

/// Bundle per-entry documents into a ZIP archive in memory
///
/// Entries are named `courrier_<row>.pdf`, in row order.
pub fn zip_documents(documents: &[EntryDocument]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut archive = zip::ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for document in documents {
            archive.start_file(format!("courrier_{}.pdf", document.row), options)?;
            archive.write_all(&document.bytes)?;
        }
        archive.finish()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_lists_one_entry_per_document() {
        let documents = vec![
            EntryDocument {
                row: 1,
                bytes: b"%PDF-1.5 first".to_vec(),
            },
            EntryDocument {
                row: 3,
                bytes: b"%PDF-1.5 third".to_vec(),
            },
        ];
        let bytes = zip_documents(&documents).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("courrier_1.pdf").is_ok());
        assert!(archive.by_name("courrier_3.pdf").is_ok());
    }

    #[test]
    fn test_zip_of_nothing_is_valid() {
        let bytes = zip_documents(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
