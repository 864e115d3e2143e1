//! Utility bill field extraction module.

mod parser;
pub mod rules;
mod totals;

pub use parser::{BillParser, EpdParser, ExtractionResult};
pub use totals::aggregate;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
