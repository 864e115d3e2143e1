//! WASM bindings for utility bill (EPD) extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! PDF text extraction happens on the JavaScript side; these bindings take
//! the extracted text.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use epd_core::{BillParser, EpdParser, ItemRef, Selection, ServiceCategory};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse a Russian-formatted amount (e.g., "1 927,72" or "2 115 руб. 40 коп.").
///
/// Unparseable input yields 0.
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> f64 {
    epd_core::parse_amount(amount).to_f64().unwrap_or(0.0)
}

/// Format an amount in Russian style (1 927,72).
#[wasm_bindgen]
pub fn format_amount(amount: &str) -> String {
    epd_core::format_amount(epd_core::parse_amount(amount))
}

/// Extract a bill record from its text.
#[wasm_bindgen]
pub fn extract_document(text: &str) -> Result<JsValue, JsValue> {
    let result = EpdParser::new().parse(text).map_err(to_js_error)?;
    to_js(&result)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_category(category: &str) -> Result<ServiceCategory, String> {
    ServiceCategory::from_str(category).ok_or_else(|| format!("Unknown category: {}", category))
}

/// Item as shown in a selection table.
#[derive(Serialize)]
struct ItemView<'a> {
    document: usize,
    category: ServiceCategory,
    index: usize,
    period: &'a str,
    name: &'a str,
    volume: String,
    unit: &'a str,
    tariff: String,
    total: String,
    included: bool,
}

/// Interactive selection over loaded bills.
///
/// Each mutation is followed by a `summary()` call from the page, which
/// recomputes all totals from the current flags.
#[wasm_bindgen]
pub struct EpdSession {
    parser: EpdParser,
    selection: Selection,
}

#[wasm_bindgen]
impl EpdSession {
    /// Create an empty session.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: EpdParser::new(),
            selection: Selection::new(),
        }
    }

    /// Parse a bill and add it to the session. Returns its document index.
    #[wasm_bindgen]
    pub fn load_text(&mut self, text: &str) -> Result<usize, JsValue> {
        let record = self.parser.parse_record(text).map_err(to_js_error)?;
        Ok(self.selection.load(record))
    }

    /// All items of all loaded bills with their inclusion flags.
    #[wasm_bindgen]
    pub fn items(&self) -> Result<JsValue, JsValue> {
        let items: Vec<ItemView> = self
            .selection
            .items()
            .filter_map(|(item_ref, item, included)| {
                let record = self.selection.document(item_ref.document)?;
                Some(ItemView {
                    document: item_ref.document,
                    category: item_ref.category,
                    index: item_ref.index,
                    period: self.selection.period_label(record),
                    name: &item.name,
                    volume: item.volume.to_string(),
                    unit: &item.unit,
                    tariff: item.tariff.to_string(),
                    total: item.total.to_string(),
                    included,
                })
            })
            .collect();

        to_js(&items)
    }

    /// Flip one item's inclusion flag. Returns the new state.
    #[wasm_bindgen]
    pub fn toggle_item(
        &mut self,
        document: usize,
        category: &str,
        index: usize,
    ) -> Result<bool, JsValue> {
        self.toggle(document, category, index)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Include or exclude every item of a category.
    #[wasm_bindgen]
    pub fn set_all_included(&mut self, category: &str, included: bool) -> Result<(), JsValue> {
        let category = parse_category(category).map_err(|e| JsValue::from_str(&e))?;
        self.selection.set_all_included(category, included);
        Ok(())
    }

    /// Include or exclude voluntary insurance.
    #[wasm_bindgen]
    pub fn set_insurance_included(&mut self, included: bool) {
        self.selection.set_insurance_included(included);
    }

    /// Current totals and per-period breakdown.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.selection.compute_summary())
    }

    /// Drop all loaded bills.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Number of loaded bills.
    #[wasm_bindgen]
    pub fn document_count(&self) -> usize {
        self.selection.document_count()
    }
}

impl EpdSession {
    fn toggle(&mut self, document: usize, category: &str, index: usize) -> Result<bool, String> {
        let item = ItemRef::new(document, parse_category(category)?, index);
        self.selection
            .toggle_item(item)
            .ok_or_else(|| format!("No item {}/{}/{}", document, category, index))
    }
}

impl Default for EpdSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const BILL: &str = "\
ЕПД ЗА Март 2024
Начисления за жилищные услуги
Содержание жилья 1 кв.м. 50,00 120,50
Начисления за коммунальные услуги
Холодное водоснабжение 2,000 куб. м. 20,00 40,00
";

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        assert!((parse_amount("1 927,72") - 1927.72).abs() < 0.001);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(",5"), 0.5);
        assert!((parse_amount("2 115 руб. 40 коп.") - 2115.4).abs() < 0.001);
    }

    #[wasm_bindgen_test]
    fn test_format_amount() {
        assert_eq!(format_amount("1234.5"), "1 234,50");
    }

    #[wasm_bindgen_test]
    fn test_session_toggle() {
        let mut session = EpdSession::new();
        assert_eq!(session.load_text(BILL).ok(), Some(0));
        assert_eq!(session.document_count(), 1);

        assert_eq!(session.toggle(0, "housing", 0), Ok(false));
        assert!(session.toggle(0, "utility", 3).is_err());
        assert!(session.toggle(0, "insurance", 0).is_err());

        let summary = session.selection.compute_summary();
        assert_eq!(summary.grand_total.to_string(), "40.00");

        session.clear();
        assert_eq!(session.document_count(), 0);
    }
}
