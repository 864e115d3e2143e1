//! Billing period labels ("Март 2024") and their chronological ordering.

use chrono::NaiveDate;

use super::patterns::PERIOD_LABEL;

/// Parse a period label into the first day of its month.
pub fn period_sort_key(label: &str) -> Option<NaiveDate> {
    let caps = PERIOD_LABEL.captures(label)?;
    let month = month_number(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Convert a Russian month name (any case form) to a month number.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();

    // "март" must be checked before "ма" (май/мая)
    let month = if name.starts_with("январ") {
        1
    } else if name.starts_with("феврал") {
        2
    } else if name.starts_with("март") {
        3
    } else if name.starts_with("апрел") {
        4
    } else if name == "май" || name == "мая" || name == "мае" {
        5
    } else if name.starts_with("июн") {
        6
    } else if name.starts_with("июл") {
        7
    } else if name.starts_with("август") {
        8
    } else if name.starts_with("сентябр") {
        9
    } else if name.starts_with("октябр") {
        10
    } else if name.starts_with("ноябр") {
        11
    } else if name.starts_with("декабр") {
        12
    } else {
        return None;
    };

    Some(month)
}
