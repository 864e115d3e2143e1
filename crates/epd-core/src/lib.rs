//! Core library for Russian utility bill (EPD) processing.
//!
//! This crate provides:
//! - PDF text extraction (feature `native`)
//! - Rule-based extraction of header fields and charge line items
//! - Per-category totals with optional voluntary insurance
//! - Item selection with on-demand recomputation of totals
//! - Tabular export of a selection

pub mod batch;
pub mod bill;
pub mod error;
pub mod export;
pub mod models;
#[cfg(feature = "native")]
pub mod pdf;
pub mod selection;

pub use batch::{process_batch, BatchOutcome, DocumentSource, FailedDocument, ParsedDocument};
pub use bill::rules::{extract_header, extract_line_items, format_amount, parse_amount};
pub use bill::{aggregate, BillParser, EpdParser, ExtractionResult};
pub use error::{EpdError, ExtractionError, PdfError, Result};
pub use export::{export_selection, DocumentRow, ExportSink, ItemRow, StatisticsRow};
pub use models::bill::{
    CategoryTotals, DocumentRecord, ExtractedItems, HeaderFields, LineItem, ServiceCategory,
};
pub use models::config::EpdConfig;
#[cfg(feature = "native")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use selection::{ItemRef, PeriodSummary, Selection, SummaryView};
