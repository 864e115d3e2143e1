//! Error types for the epd-core library.

use thiserror::Error;

/// Main error type for the epd library.
#[derive(Error, Debug)]
pub enum EpdError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Bill extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Document-level extraction failures.
///
/// Field and line misses are not errors: they surface as unset fields or
/// skipped lines. Only these two abort a single document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The text-extraction service produced no usable text.
    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    /// Text was extracted but is blank.
    #[error("document text is empty")]
    EmptyDocumentText,
}

impl PdfError {
    /// Convert into a library error, reporting a missing text layer as a
    /// document extraction failure.
    pub fn into_document_error(self) -> EpdError {
        match self {
            PdfError::TextExtraction(message) => ExtractionError::TextExtraction(message).into(),
            other => other.into(),
        }
    }
}

impl EpdError {
    /// Whether this error means the document never yielded usable text.
    pub fn is_text_failure(&self) -> bool {
        matches!(
            self,
            EpdError::Pdf(_)
                | EpdError::Extraction(ExtractionError::TextExtraction(_))
                | EpdError::Extraction(ExtractionError::EmptyDocumentText)
        )
    }
}

/// Result type for the epd library.
pub type Result<T> = std::result::Result<T, EpdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_failure_classification() {
        assert!(EpdError::from(ExtractionError::EmptyDocumentText).is_text_failure());
        assert!(EpdError::from(PdfError::NoPages).is_text_failure());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!EpdError::from(io).is_text_failure());
    }

    #[test]
    fn test_error_display() {
        let err = EpdError::from(ExtractionError::TextExtraction("no pages".to_string()));
        assert_eq!(
            err.to_string(),
            "extraction error: text extraction failed: no pages"
        );
    }

    #[test]
    fn test_pdf_error_into_document_error() {
        let err = PdfError::TextExtraction("no text layer".to_string()).into_document_error();
        assert!(matches!(
            err,
            EpdError::Extraction(ExtractionError::TextExtraction(ref m)) if m == "no text layer"
        ));
        assert!(err.is_text_failure());

        let err = PdfError::Encrypted.into_document_error();
        assert!(matches!(err, EpdError::Pdf(PdfError::Encrypted)));
    }
}
