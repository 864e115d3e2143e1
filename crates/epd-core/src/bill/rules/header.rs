//! Header field extraction: period, account, payer, address and printed totals.

use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::{parse_amount, RubleAmountExtractor};
use super::patterns::*;
use super::FieldExtractor;
use crate::models::bill::HeaderFields;

/// Extract all header fields from document text.
///
/// Every rule is optional; a miss leaves the field unset.
pub fn extract_header(text: &str) -> HeaderFields {
    let totals = printed_totals(text);
    let total_without_insurance = totals.without_insurance.or_else(|| {
        TOTAL_WITHOUT_INSURANCE_FALLBACK
            .captures(text)
            .map(|caps| parse_amount(&caps[1]))
    });

    let header = HeaderFields {
        period: extract_period(text),
        account_id: extract_account_id(text),
        payer_name: extract_payer_name(text),
        address: extract_address(text),
        total_with_insurance: totals.with_insurance,
        total_without_insurance,
    };

    debug!(
        "Header: period={:?} account={:?} totals={:?}/{:?}",
        header.period,
        header.account_id,
        header.total_without_insurance,
        header.total_with_insurance
    );

    header
}

fn extract_period(text: &str) -> Option<String> {
    PERIOD.captures(text).map(|caps| collapse_whitespace(&caps[1]))
}

fn extract_account_id(text: &str) -> Option<String> {
    ACCOUNT_ID
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_payer_name(text: &str) -> Option<String> {
    PAYER_NAME
        .captures(text)
        .map(|caps| collapse_whitespace(&caps[1]))
        .filter(|name| !name.is_empty())
}

fn extract_address(text: &str) -> Option<String> {
    ADDRESS
        .captures(text)
        .map(|caps| collapse_whitespace(&caps[1]))
        .filter(|address| !address.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TotalKind {
    WithoutInsurance,
    WithInsurance,
}

#[derive(Debug, Default)]
struct PrintedTotals {
    without_insurance: Option<Decimal>,
    with_insurance: Option<Decimal>,
}

/// Pair grand total markers with the ruble amounts printed before them.
///
/// Markers are visited in document order. Each one takes the earliest
/// unclaimed amount that ends before it, provided the marker starts within
/// the lookahead window of that amount. The first pairing of a kind wins.
fn printed_totals(text: &str) -> PrintedTotals {
    let amounts = RubleAmountExtractor::new().extract_all(text);
    let mut claimed = vec![false; amounts.len()];

    let mut markers: Vec<(usize, TotalKind)> = TOTAL_WITHOUT_INSURANCE_MARKER
        .find_iter(text)
        .map(|m| (m.start(), TotalKind::WithoutInsurance))
        .chain(
            TOTAL_WITH_INSURANCE_MARKER
                .find_iter(text)
                .map(|m| (m.start(), TotalKind::WithInsurance)),
        )
        .collect();
    markers.sort_by_key(|(start, _)| *start);

    let mut totals = PrintedTotals::default();

    for (marker_start, kind) in markers {
        let paired = amounts.iter().enumerate().find(|(i, amount)| {
            !claimed[*i]
                && amount.position.is_some_and(|(_, end)| {
                    end <= marker_start
                        && marker_start <= advance_chars(text, end, TOTAL_MARKER_WINDOW)
                })
        });

        let Some((i, amount)) = paired else {
            continue;
        };
        claimed[i] = true;

        let slot = match kind {
            TotalKind::WithoutInsurance => &mut totals.without_insurance,
            TotalKind::WithInsurance => &mut totals.with_insurance,
        };
        slot.get_or_insert(amount.value);
    }

    totals
}

/// Byte offset `count` characters after `start`, clamped to the text end.
fn advance_chars(text: &str, start: usize, count: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(count)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "ЕДИНЫЙ ПЛАТЕЖНЫЙ ДОКУМЕНТ ЗА Январь 2024 г.
Лицевой счет: 1234 567-89
ФИО: ИВАНОВ ИВАН ИВАНОВИЧ
Адрес: г. Москва, ул. Ленина,
д. 5, кв. 12
2 115 руб. 40 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ БЕЗ УЧЕТА ДОБРОВОЛЬНОГО СТРАХОВАНИЯ
2 265 руб. 40 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ С УЧЕТОМ ДОБРОВОЛЬНОГО СТРАХОВАНИЯ
";

    #[test]
    fn test_extract_full_header() {
        let header = extract_header(HEADER);

        assert_eq!(
            header,
            HeaderFields {
                period: Some("Январь 2024".to_string()),
                account_id: Some("1234 567-89".to_string()),
                payer_name: Some("ИВАНОВ ИВАН ИВАНОВИЧ".to_string()),
                address: Some("г. Москва, ул. Ленина, д. 5, кв. 12".to_string()),
                total_with_insurance: Some(Decimal::new(226540, 2)),
                total_without_insurance: Some(Decimal::new(211540, 2)),
            }
        );
    }

    #[test]
    fn test_period() {
        let header = extract_header("ПЛАТЕЖНЫЙ ДОКУМЕНТ ЗА Январь 2024");
        assert_eq!(header.period.as_deref(), Some("Январь 2024"));
    }

    #[test]
    fn test_first_period_wins() {
        let header = extract_header("ЗА Март 2024\nВСЕГО ЗА Февраль 2024");
        assert_eq!(header.period.as_deref(), Some("Март 2024"));
    }

    #[test]
    fn test_no_markers_leaves_fields_unset() {
        let header = extract_header("Какой-то текст без реквизитов 123,45");
        assert_eq!(header, HeaderFields::default());
    }

    #[test]
    fn test_payer_name_stays_on_its_line() {
        let header = extract_header("ФИО: ПЕТРОВА АННА\nАДРЕС НЕ УКАЗАН");
        assert_eq!(header.payer_name.as_deref(), Some("ПЕТРОВА АННА"));
    }

    #[test]
    fn test_address_stops_at_itogo() {
        let header = extract_header("Адрес: ул. Мира,  д. 1\nИТОГО: 100,00");
        assert_eq!(header.address.as_deref(), Some("ул. Мира, д. 1"));
    }

    #[test]
    fn test_total_without_insurance_fallback() {
        let header = extract_header("Итого к оплате без страхования: 1500,75");
        assert_eq!(header.total_without_insurance, Some(Decimal::new(150075, 2)));
        assert_eq!(header.total_with_insurance, None);
    }

    #[test]
    fn test_marker_outside_window_is_ignored() {
        let filler = "x".repeat(150);
        let text = format!(
            "100 руб. 00 коп. {} ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ С УЧЕТОМ",
            filler
        );
        assert_eq!(extract_header(&text).total_with_insurance, None);
    }

    #[test]
    fn test_marker_binds_to_nearest_amount() {
        let text = "10 руб. 00 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ БЕЗ УЧЕТА\n\
                    20 руб. 00 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ С УЧЕТОМ";
        let header = extract_header(text);

        assert_eq!(header.total_without_insurance, Some(Decimal::new(10, 0)));
        assert_eq!(header.total_with_insurance, Some(Decimal::new(20, 0)));
    }

    #[test]
    fn test_stacked_amounts_bind_in_order() {
        let text = "6 201 руб. 04 коп.\n\
                    6 351 руб. 04 коп.\n\
                    ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ БЕЗ УЧЕТА\n\
                    ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ С УЧЕТОМ";
        let header = extract_header(text);

        assert_eq!(header.total_without_insurance, Some(Decimal::new(620104, 2)));
        assert_eq!(header.total_with_insurance, Some(Decimal::new(635104, 2)));
    }

    #[test]
    fn test_marker_rule_wins_over_fallback() {
        let text = "100 руб. 00 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ БЕЗ УЧЕТА\n\
                    Итого к оплате без страхования 999,00";
        let header = extract_header(text);

        assert_eq!(header.total_without_insurance, Some(Decimal::new(100, 0)));
    }
}
