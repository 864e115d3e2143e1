//! Line-item extraction from the charge sections of a bill.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::amounts::{decimal_tokens, has_money_token, money_tokens};
use super::patterns::*;
use crate::models::bill::{ExtractedItems, LineItem, ServiceCategory};

/// Scanner state while walking the bill line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    NoSection,
    InHousing,
    InUtility,
}

impl SectionState {
    /// Category collected in this state.
    pub fn category(&self) -> Option<ServiceCategory> {
        match self {
            SectionState::NoSection => None,
            SectionState::InHousing => Some(ServiceCategory::Housing),
            SectionState::InUtility => Some(ServiceCategory::Utility),
        }
    }
}

/// Section scanner producing line items and the insurance charge.
#[derive(Debug, Clone)]
pub struct LineItemExtractor {
    /// Maximum length of a fallback item name, in characters.
    max_name_length: usize,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self { max_name_length: 50 }
    }

    /// Set the fallback name length limit.
    pub fn with_max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = length;
        self
    }

    /// Scan the whole document text.
    pub fn extract(&self, text: &str) -> ExtractedItems {
        let mut items = ExtractedItems::default();
        let mut state = SectionState::NoSection;

        for line in text.lines() {
            let lowered = line.to_lowercase();

            if lowered.contains(HOUSING_SECTION) {
                debug!("Entering housing section");
                state = SectionState::InHousing;
                continue;
            }

            if lowered.contains(UTILITY_SECTION) {
                debug!("Entering utility section");
                state = SectionState::InUtility;
                continue;
            }

            if lowered.contains(INSURANCE_MARKER) {
                if let Some(amount) = money_tokens(line).last() {
                    debug!("Insurance charge: {}", amount);
                    items.insurance = Some(*amount);
                }
                state = SectionState::NoSection;
                continue;
            }

            if SECTION_END_MARKERS.iter().any(|m| lowered.contains(m)) {
                state = SectionState::NoSection;
                continue;
            }

            let Some(category) = state.category() else {
                continue;
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || is_table_header(&lowered) {
                continue;
            }

            match classify_line(trimmed, self.max_name_length) {
                Some(item) => match category {
                    ServiceCategory::Housing => items.housing.push(item),
                    ServiceCategory::Utility => items.utility.push(item),
                },
                None => trace!("Skipping line: {}", trimmed),
            }
        }

        debug!(
            "Extracted {} housing and {} utility items",
            items.housing.len(),
            items.utility.len()
        );

        items
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract line items with default settings.
pub fn extract_line_items(text: &str) -> ExtractedItems {
    LineItemExtractor::new().extract(text)
}

fn is_table_header(lowered: &str) -> bool {
    TABLE_HEADER_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Classify one section line as a billable item, or `None` for noise.
pub fn classify_line(line: &str, max_name_length: usize) -> Option<LineItem> {
    if !UPPERCASE_CYRILLIC.is_match(line) || !has_money_token(line) {
        return None;
    }

    let numbers = decimal_tokens(line);
    let total = *numbers.last()?;
    if total <= Decimal::ZERO {
        return None;
    }

    let (volume, tariff) = match numbers.len() {
        n if n >= 3 => (numbers[0], numbers[1]),
        2 => (numbers[0], Decimal::ZERO),
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    let unit = UNIT
        .find(line)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(LineItem {
        name: item_name(line, max_name_length),
        volume,
        unit,
        tariff,
        total,
    })
}

fn item_name(line: &str, max_length: usize) -> String {
    if let Some(caps) = ITEM_NAME.captures(line).or_else(|| ITEM_NAME_LOOSE.captures(line)) {
        return caps[1].trim().to_string();
    }

    line.split_whitespace()
        .filter(|w| !w.chars().any(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_length)
        .collect()
}
