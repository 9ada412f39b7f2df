//! PDF text loading using lopdf and pdf-extract.
//!
//! Only the text layer is read. Scanned PDFs come back with little or no
//! text, which the analyzer reports as a likely scan.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text pulled from a PDF.
#[derive(Debug, Clone)]
pub struct PdfText {
    pub text: String,
    pub page_count: usize,
}

/// Whether `data` starts with the PDF magic bytes.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}

/// Load a PDF from memory and extract its text layer.
///
/// Encrypted files are retried with the empty password, which is how most
/// portal-generated notices are protected.
pub fn load_text(data: &[u8]) -> Result<PdfText> {
    let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(PdfError::NoPages);
    }

    let text = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
        extract_text(&decrypted)?
    } else {
        extract_text(data)?
    };

    debug!("Loaded PDF with {} pages, {} chars", page_count, text.len());
    Ok(PdfText { text, page_count })
}

/// Read a PDF file from disk and extract its text layer.
pub fn load_file(path: &Path) -> crate::error::Result<PdfText> {
    let data = fs::read(path)?;
    let loaded = load_text(&data)?;
    debug!("Read {} pages from {}", loaded.page_count, path.display());
    Ok(loaded)
}

fn extract_text(data: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| PdfError::TextExtraction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(b"%PDF-1.7\n"));
        assert!(!is_pdf(b"Tender ID: 2025_NCL_1"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(load_text(b"not a pdf at all"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_file_errors() {
        use crate::error::TendrError;

        let dir = tempfile::tempdir().unwrap();
        let missing = load_file(&dir.path().join("absent.pdf"));
        assert!(matches!(missing, Err(TendrError::Io(_))));

        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"%PDF-1.4 truncated").unwrap();
        assert!(matches!(load_file(&bogus), Err(TendrError::Pdf(PdfError::Parse(_)))));
    }
}
