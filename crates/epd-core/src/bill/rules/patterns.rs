//! Common regex patterns and marker phrases for EPD extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum distance, in characters, between a header amount and its marker.
pub const TOTAL_MARKER_WINDOW: usize = 100;

/// Section markers, compared against lowercased lines.
pub const HOUSING_SECTION: &str = "начисления за жилищные услуги";
pub const UTILITY_SECTION: &str = "начисления за коммунальные услуги";
pub const INSURANCE_MARKER: &str = "добровольное страхование";
pub const SECTION_END_MARKERS: [&str; 2] = ["всего за", "итого к оплате"];

/// Keywords of repeated table header rows.
pub const TABLE_HEADER_KEYWORDS: [&str; 3] =
    ["виды услуг", "объем услуг", "начислено по тарифу"];

lazy_static! {
    // Billing period: "ЗА Январь 2024"
    pub static ref PERIOD: Regex = Regex::new(
        r"\bЗА\s+(\w+\s+\d{4})"
    ).unwrap();

    // Personal account: "Лицевой счет: 12345-678"
    pub static ref ACCOUNT_ID: Regex = Regex::new(
        r"(?i)Лицевой\s+сч[её]т:\s*(\d+(?:[ \t\u{00a0}-]+\d+)*)"
    ).unwrap();

    // Payer name: uppercase Cyrillic run on the same line
    pub static ref PAYER_NAME: Regex = Regex::new(
        r"ФИО:[ \t]*([А-ЯЁ][А-ЯЁ \t]*)"
    ).unwrap();

    // Address up to the first ruble amount or ИТОГО marker
    pub static ref ADDRESS: Regex = Regex::new(
        r"(?is)Адрес:\s*(.+?)(?:(?:\d{1,3}(?:[ \u{00a0}]\d{3})+|\d+)\s*руб|ИТОГО)"
    ).unwrap();

    // "1 927 руб. 72 коп."
    pub static ref RUBLE_AMOUNT: Regex = Regex::new(
        r"(?:\d{1,3}(?:[ \u{00a0}]\d{3})+|\d+)\s*руб\.?\s*\d{1,2}\s*коп\.?"
    ).unwrap();

    pub static ref RUBLE_AMOUNT_PARTS: Regex = Regex::new(
        r"(\d[\d \u{00a0}]*?)\s*руб\.?\s*(\d{1,2})\s*коп"
    ).unwrap();

    // Grand total markers (the amount precedes the marker)
    pub static ref TOTAL_WITHOUT_INSURANCE_MARKER: Regex = Regex::new(
        r"(?i)ИТОГО\s+К\s+ОПЛАТЕ\s+ЗА\s+ВСЕ\s+УСЛУГИ[^\n]*?БЕЗ"
    ).unwrap();

    pub static ref TOTAL_WITH_INSURANCE_MARKER: Regex = Regex::new(
        r"(?i)ИТОГО\s+К\s+ОПЛАТЕ\s+ЗА\s+ВСЕ\s+УСЛУГИ[^\n]*?С\s+УЧ[ЕЁ]ТОМ"
    ).unwrap();

    // Looser fallback: "Итого к оплате без страхования: 1 234,56"
    pub static ref TOTAL_WITHOUT_INSURANCE_FALLBACK: Regex = Regex::new(
        r"(?i)Итого\s+к\s+оплате[^\n]*?без[^\n]*?(\d+[,.]\d{2})"
    ).unwrap();

    // Amount tokens inside table lines
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"\d+[,.]\d+"
    ).unwrap();

    pub static ref MONEY_TOKEN: Regex = Regex::new(
        r"\d+[,.]\d{2}"
    ).unwrap();

    pub static ref UPPERCASE_CYRILLIC: Regex = Regex::new(
        r"[А-ЯЁ]"
    ).unwrap();

    // Item name: leading letters before the first number
    pub static ref ITEM_NAME: Regex = Regex::new(
        r"^([А-ЯЁа-яё\s()/]+?)\s+\d"
    ).unwrap();

    pub static ref ITEM_NAME_LOOSE: Regex = Regex::new(
        r"^([А-ЯЁа-яё\s()/]+)"
    ).unwrap();

    // Measurement units: area, volume, electricity, heat
    pub static ref UNIT: Regex = Regex::new(
        r"(кв\.м\.|куб\.\s*м\.|к[вВ]т[./]?ч|Гкал)"
    ).unwrap();

    // Period label: "Март 2024"
    pub static ref PERIOD_LABEL: Regex = Regex::new(
        r"^\s*(\p{Cyrillic}+)\s+(\d{4})\s*$"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
