//! Sequential processing of several bills with per-document failure isolation.

use serde::Serialize;
use tracing::{info, warn};

use crate::bill::BillParser;
use crate::error::{EpdError, Result};
use crate::models::bill::DocumentRecord;

/// Text of one document, or the error that prevented obtaining it.
#[derive(Debug)]
pub struct DocumentSource {
    pub name: String,
    pub text: Result<String>,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, text: Result<String>) -> Self {
        Self {
            name: name.into(),
            text,
        }
    }

    /// Source whose text is already available.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, Ok(text.into()))
    }
}

/// Successfully parsed document.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub name: String,
    pub record: DocumentRecord,
    pub warnings: Vec<String>,
}

/// Document that could not be processed.
#[derive(Debug)]
pub struct FailedDocument {
    pub name: String,
    pub error: EpdError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Parsed documents in input order.
    pub documents: Vec<ParsedDocument>,
    /// Failed documents in input order.
    pub failures: Vec<FailedDocument>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Take the parsed records, dropping names and warnings.
    pub fn into_records(self) -> Vec<DocumentRecord> {
        self.documents.into_iter().map(|d| d.record).collect()
    }
}

/// Parse every source in order. A failing document is recorded and the
/// batch moves on to the next one.
pub fn process_batch<P, I>(parser: &P, sources: I) -> BatchOutcome
where
    P: BillParser + ?Sized,
    I: IntoIterator<Item = DocumentSource>,
{
    let mut outcome = BatchOutcome::default();

    for source in sources {
        let parsed = source
            .text
            .and_then(|text| parser.parse(&text).map_err(EpdError::from));

        match parsed {
            Ok(result) => outcome.documents.push(ParsedDocument {
                name: source.name,
                record: result.record,
                warnings: result.warnings,
            }),
            Err(error) => {
                warn!("Failed to process {}: {}", source.name, error);
                outcome.failures.push(FailedDocument {
                    name: source.name,
                    error,
                });
            }
        }
    }

    info!(
        "Batch finished: {} parsed, {} failed",
        outcome.documents.len(),
        outcome.failures.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::EpdParser;
    use crate::error::ExtractionError;

    const BILL: &str = "\
ЕПД ЗА Январь 2024
Начисления за жилищные услуги
Содержание жилья 1 кв.м. 50,00 120,50
Всего за январь 120,50
";

    #[test]
    fn test_failure_does_not_stop_batch() {
        let sources = vec![
            DocumentSource::from_text("first.pdf", BILL),
            DocumentSource::from_text("second.pdf", ""),
            DocumentSource::from_text("third.pdf", BILL.replace("Январь", "Февраль")),
        ];

        let outcome = process_batch(&EpdParser::new(), sources);

        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.documents[0].name, "first.pdf");
        assert_eq!(outcome.documents[1].name, "third.pdf");
        assert_eq!(
            outcome.documents[1].record.period.as_deref(),
            Some("Февраль 2024")
        );

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].name, "second.pdf");
        assert!(matches!(
            outcome.failures[0].error,
            EpdError::Extraction(ExtractionError::EmptyDocumentText)
        ));
    }

    #[test]
    fn test_text_extraction_failure_is_recorded() {
        let sources = vec![
            DocumentSource::new(
                "broken.pdf",
                Err(ExtractionError::TextExtraction("bad xref".to_string()).into()),
            ),
            DocumentSource::from_text("ok.pdf", BILL),
        ];

        let outcome = process_batch(&EpdParser::new(), sources);

        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].error.is_text_failure());
        assert_eq!(outcome.into_records().len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let outcome = process_batch(&EpdParser::new(), Vec::new());
        assert_eq!(outcome.total(), 0);
    }
}
