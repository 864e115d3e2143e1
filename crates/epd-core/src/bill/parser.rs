//! Bill parser running the header, line-item and aggregation passes.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::bill::DocumentRecord;
use crate::models::config::EpdConfig;

use super::rules::{extract_header, LineItemExtractor};
use super::Result;

/// Result of bill extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted and aggregated record.
    pub record: DocumentRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Trait for bill parsing.
pub trait BillParser {
    /// Parse a bill from its extracted text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;

    /// Parse a bill and keep only the record.
    fn parse_record(&self, text: &str) -> Result<DocumentRecord> {
        self.parse(text).map(|r| r.record)
    }
}

/// Rule-based EPD parser.
///
/// Holds configuration only, so one instance can parse any number of
/// documents, from any thread.
#[derive(Debug, Clone)]
pub struct EpdParser {
    /// Maximum length of a fallback item name.
    max_name_length: usize,
    /// Whether printed/computed total disagreements become warnings.
    warn_on_total_mismatch: bool,
    /// Minimum trimmed text length for a usable document.
    min_text_length: usize,
}

impl EpdParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            max_name_length: 50,
            warn_on_total_mismatch: true,
            min_text_length: 1,
        }
    }

    /// Create a parser from pipeline configuration.
    pub fn from_config(config: &EpdConfig) -> Self {
        Self::new()
            .with_max_name_length(config.extraction.max_name_length)
            .with_total_mismatch_warnings(config.extraction.warn_on_total_mismatch)
            .with_min_text_length(config.pdf.min_text_length)
    }

    /// Set the fallback item name length limit.
    pub fn with_max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = length;
        self
    }

    /// Enable or disable total mismatch warnings.
    pub fn with_total_mismatch_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_total_mismatch = enabled;
        self
    }

    /// Set the minimum usable text length.
    pub fn with_min_text_length(mut self, length: usize) -> Self {
        self.min_text_length = length.max(1);
        self
    }
}

impl Default for EpdParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BillParser for EpdParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        if text.trim().chars().count() < self.min_text_length {
            return Err(ExtractionError::EmptyDocumentText);
        }

        info!("Parsing bill from {} characters of text", text.len());

        let header = extract_header(text);
        let items = LineItemExtractor::new()
            .with_max_name_length(self.max_name_length)
            .extract(text);

        let record = DocumentRecord::from_header(header)
            .with_items(items)
            .finalize();

        let mut warnings = record.completeness_issues();
        if self.warn_on_total_mismatch {
            warnings.extend(record.total_mismatches());
        }

        debug!(
            "Extracted bill {:?}: {} items, total {}",
            record.period,
            record.item_count(),
            record.category_totals.grand_total
        );

        Ok(ExtractionResult { record, warnings })
    }
}
