//! Rule-based field extractors for EPD utility bills.

pub mod amounts;
pub mod header;
pub mod items;
pub mod patterns;
pub mod period;

pub use amounts::{
    decimal_tokens, format_amount, has_money_token, money_tokens, parse_amount,
    AmountExtractor, RubleAmountExtractor,
};
pub use header::extract_header;
pub use items::{classify_line, extract_line_items, LineItemExtractor, SectionState};
pub use period::{month_number, period_sort_key};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value matched in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
