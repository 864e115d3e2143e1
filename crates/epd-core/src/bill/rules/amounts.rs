//! Amount normalization for Russian-formatted bills.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{DECIMAL_TOKEN, MONEY_TOKEN, RUBLE_AMOUNT, RUBLE_AMOUNT_PARTS};
use super::{ExtractionMatch, FieldExtractor};

/// Decimal token extractor ("50,00", "120.5").
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DECIMAL_TOKEN
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(parse_amount(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// "N руб. K коп." amount extractor.
pub struct RubleAmountExtractor;

impl RubleAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RubleAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for RubleAmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        RUBLE_AMOUNT
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(parse_amount(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Parse a Russian-formatted amount (e.g. "1 927,72" or "1 927 руб. 72 коп.").
///
/// Never fails: anything unparseable yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    if let Some(caps) = RUBLE_AMOUNT_PARTS.captures(raw) {
        let rubles: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if let (Ok(rubles), Ok(kopecks)) = (Decimal::from_str(&rubles), caps[2].parse::<i64>()) {
            return rubles + Decimal::new(kopecks, 2);
        }
    }

    // Spaces are thousands separators only
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = cleaned.replace(',', ".");

    // Trailing dots come from abbreviations like "руб."
    let normalized = normalized.trim_end_matches('.');
    let normalized = match normalized.strip_prefix('.') {
        Some(fraction) => format!("0.{}", fraction),
        None => normalized.to_string(),
    };

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// All decimal tokens of a line, in order.
pub fn decimal_tokens(line: &str) -> Vec<Decimal> {
    AmountExtractor::new()
        .extract_all(line)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// All two-place money tokens of a line, in order.
pub fn money_tokens(line: &str) -> Vec<Decimal> {
    MONEY_TOKEN
        .find_iter(line)
        .map(|m| parse_amount(m.as_str()))
        .collect()
}

/// Whether the line carries a two-place money token.
pub fn has_money_token(line: &str) -> bool {
    MONEY_TOKEN.is_match(line)
}

/// Format amount in Russian style (1 927,72).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(' ');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1 927,72"), Decimal::new(192772, 2));
        assert_eq!(parse_amount("1927.72"), Decimal::new(192772, 2));
        assert_eq!(parse_amount("120,50"), Decimal::new(12050, 2));
        assert_eq!(parse_amount("12 345 678,90"), Decimal::new(1234567890, 2));
        assert_eq!(parse_amount("1\u{00a0}234,56"), Decimal::new(123456, 2));
        assert_eq!(parse_amount(",5"), Decimal::new(5, 1));
        assert_eq!(parse_amount(".75"), Decimal::new(75, 2));
        assert_eq!(parse_amount("120,50 руб."), Decimal::new(12050, 2));
    }

    #[test]
    fn test_parse_amount_failures_are_zero() {
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("1,234,56"), Decimal::ZERO);
        assert_eq!(parse_amount("руб."), Decimal::ZERO);
    }

    #[test]
    fn test_parse_ruble_amount() {
        assert_eq!(parse_amount("1 927 руб. 72 коп."), Decimal::new(192772, 2));
        assert_eq!(parse_amount("350 руб. 5 коп."), Decimal::new(35005, 2));
        assert_eq!(parse_amount("123 руб."), Decimal::new(123, 0));
    }

    #[test]
    fn test_decimal_tokens() {
        let tokens = decimal_tokens("Содержание жилья 54,3 кв.м. 25,40 1379,22");
        assert_eq!(
            tokens,
            vec![
                Decimal::new(543, 1),
                Decimal::new(2540, 2),
                Decimal::new(137922, 2)
            ]
        );
        assert!(has_money_token("итого 10,00"));
        assert!(!has_money_token("объем 10,5"));
        assert_eq!(money_tokens("10,5 и 20,00"), vec![Decimal::new(2000, 2)]);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(192772, 2)), "1 927,72");
        assert_eq!(format_amount(Decimal::new(1234567890, 2)), "12 345 678,90");
        assert_eq!(format_amount(Decimal::ZERO), "0,00");
        assert_eq!(format_amount(Decimal::new(-150050, 2)), "-1 500,50");
    }

    #[test]
    fn test_ruble_extractor_positions() {
        let text = "к оплате 1 927 руб. 72 коп. и 15 руб. 00 коп.";
        let results = RubleAmountExtractor::new().extract_all(text);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value, Decimal::new(192772, 2));
        assert_eq!(results[1].value, Decimal::new(15, 0));
        assert!(results[0].position.unwrap().1 <= results[1].position.unwrap().0);
    }

    #[test]
    fn test_amount_extractor() {
        let extractor = AmountExtractor::new();
        let first = extractor.extract("Тариф 25,40 итого 100,00").unwrap();
        assert_eq!(first.value, Decimal::new(2540, 2));
        assert_eq!(first.source, "25,40");
    }
}
