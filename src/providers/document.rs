use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Document contains no extractable text")]
    EmptyDocument,

    #[error("Unsupported format for extraction")]
    UnsupportedFormat,
}

/// Raw document bytes in, plain text out.
pub trait DocumentTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Broad document categories we handle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
    Unsupported,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Detect document format from magic bytes, not file extensions.
pub fn detect_format(bytes: &[u8]) -> DocumentFormat {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => DocumentFormat::Pdf,
        _ if std::str::from_utf8(bytes).is_ok() => DocumentFormat::PlainText,
        _ => DocumentFormat::Unsupported,
    }
}

/// UTF-8 text files (JSON reports included).
pub struct PlainTextExtractor;

impl DocumentTextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let text =
            String::from_utf8(bytes.to_vec()).map_err(|_| ExtractionError::UnsupportedFormat)?;
        non_empty(text)
    }
}

/// PDF text extractor for digital PDFs with an embedded text layer.
/// Pages are concatenated in order.
pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        tracing::debug!(pages = pages.len(), "Extracted PDF text layer");
        non_empty(pages.join("\n"))
    }
}

/// Picks the extractor from the document's magic bytes.
pub struct AutoExtractor;

impl DocumentTextExtractor for AutoExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let format = detect_format(bytes);
        tracing::debug!(format = format.as_str(), bytes = bytes.len(), "Extracting document text");
        match format {
            DocumentFormat::Pdf => PdfTextExtractor.extract(bytes),
            DocumentFormat::PlainText => PlainTextExtractor.extract(bytes),
            DocumentFormat::Unsupported => Err(ExtractionError::UnsupportedFormat),
        }
    }
}

/// Read a file and extract its text.
pub fn extract_file<X: DocumentTextExtractor + ?Sized>(
    extractor: &X,
    path: &Path,
) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    extractor.extract(&bytes)
}

fn non_empty(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::EmptyDocument)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_pdf_magic() {
        assert_eq!(detect_format(b"%PDF-1.4\n..."), DocumentFormat::Pdf);
    }

    #[test]
    fn detects_plain_text() {
        assert_eq!(detect_format("HDL: 35".as_bytes()), DocumentFormat::PlainText);
        assert_eq!(detect_format("ஹீமோகுளோபின்: 13".as_bytes()), DocumentFormat::PlainText);
    }

    #[test]
    fn binary_is_unsupported() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), DocumentFormat::Unsupported);
    }

    #[test]
    fn plain_text_extracted_verbatim() {
        let text = PlainTextExtractor.extract(b"HDL: 35 (40-60 mg/dL)\n").unwrap();
        assert_eq!(text, "HDL: 35 (40-60 mg/dL)\n");
    }

    #[test]
    fn plain_text_rejects_invalid_utf8() {
        let result = PlainTextExtractor.extract(b"HDL: 35 \xFF\xFE");
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat)));
    }

    #[test]
    fn whitespace_only_is_empty_document() {
        assert!(matches!(
            PlainTextExtractor.extract(b"  \n\t "),
            Err(ExtractionError::EmptyDocument)
        ));
    }

    #[test]
    fn auto_rejects_binary() {
        assert!(matches!(
            AutoExtractor.extract(&[0x00, 0xFF, 0xFE]),
            Err(ExtractionError::UnsupportedFormat)
        ));
    }

    /// Single-page PDF with one line of Helvetica text.
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set("Parent", pages_id);
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn pdf_text_layer_extracted() {
        let bytes = make_test_pdf("HDL 35 mg/dL");
        assert_eq!(detect_format(&bytes), DocumentFormat::Pdf);

        let text = AutoExtractor.extract(&bytes).unwrap();
        assert!(text.contains("HDL"), "unexpected text: {text}");
    }

    #[test]
    fn invalid_pdf_is_parsing_error() {
        assert!(PdfTextExtractor.extract(b"not a pdf").is_err());
    }

    #[test]
    fn extract_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TRIGLYCERIDES: 182 (< 150 mg/dL)").unwrap();
        let text = extract_file(&AutoExtractor, file.path()).unwrap();
        assert!(text.contains("TRIGLYCERIDES"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = extract_file(&AutoExtractor, Path::new("/nonexistent/report.txt"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
