//! Text-to-value conversion for scraped fields.
//!
//! Every function is best-effort: malformed input yields `None` for that one
//! field and never aborts the listing it belongs to.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Digit runs, allowing space-grouped thousands (`"12 000"`).
static INT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[\s\u{a0}]\d{3})+\b|\d+").expect("valid int token regex")
});

static DECIMAL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid decimal token regex"));

/// Upper bound on a believable listing price. Larger values come from
/// several numbers glued together and are dropped.
pub const MAX_PRICE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

const CURRENCY_WORDS: [&str; 5] = ["лей", "lei", "mdl", "руб", "₽"];
const AREA_UNITS: [&str; 6] = ["кв.м", "м²", "м2", "m²", "m2", "²"];
const BTU_UNITS: [&str; 4] = ["btu/h", "btu/ч", "btu", "бте"];

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn strip_case_insensitive(text: &str, needles: &[&str]) -> String {
    let mut out = text.to_lowercase();
    for needle in needles {
        out = out.replace(needle, "");
    }
    out
}

/// Resolves `,`/`.` usage into a plain `.`-decimal string.
///
/// A lone comma followed by exactly three digits is a thousands separator;
/// otherwise it is a decimal comma.
fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(comma), None) => {
            let decimals = s[comma + 1..]
                .chars()
                .take_while(char::is_ascii_digit)
                .count();
            if decimals == 3 {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        _ => s.to_string(),
    }
}

/// Parses a price blob such as `"12 999 лей"` or `"1,299.50 MDL"`.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = strip_whitespace(&strip_case_insensitive(text, &CURRENCY_WORDS));
    let normalized = normalize_separators(&cleaned);
    let token = DECIMAL_TOKEN.find(&normalized)?;
    Decimal::from_str(token.as_str())
        .ok()
        .and_then(plausible_price)
}

fn plausible_price(price: Decimal) -> Option<Decimal> {
    (price <= MAX_PRICE).then(|| price.normalize())
}

/// Parses a price by keeping only ASCII digits, for markup that mixes the
/// amount with labels or badges.
#[must_use]
pub fn parse_price_digits(text: &str) -> Option<Decimal> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits).ok().and_then(plausible_price)
}

/// Parses an integer after removing whitespace and a trailing BTU unit,
/// e.g. `"12 000"` or `"9000 BTU"`.
#[must_use]
pub fn parse_int_with_unit(text: &str) -> Option<i32> {
    let cleaned = strip_whitespace(&strip_case_insensitive(text, &BTU_UNITS));
    cleaned.parse::<i32>().ok()
}

/// Returns the largest integer found in `text`.
///
/// Used where one value cell carries a range, so `"7000-24000 BTU"` yields
/// `24000`.
#[must_use]
pub fn parse_max_int(text: &str) -> Option<i32> {
    INT_TOKEN
        .find_iter(text)
        .filter_map(|m| strip_whitespace(m.as_str()).parse::<i32>().ok())
        .max()
}

/// Returns the digits that precede `marker`, or `None` when the marker is
/// absent: `"12 000 BTU/h"` with marker `"BTU"` yields `12000`.
#[must_use]
pub fn parse_digits_before(text: &str, marker: &str) -> Option<i32> {
    let (head, _) = text.split_once(marker)?;
    let digits: String = head.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<i32>().ok()
}

/// Parses a square-meter figure such as `"25 м²"` or `"20,5"`.
#[must_use]
pub fn parse_area(text: &str) -> Option<f64> {
    let cleaned = strip_whitespace(&strip_case_insensitive(text, &AREA_UNITS)).replace(',', ".");
    let token = DECIMAL_TOKEN.find(&cleaned)?;
    token.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Maps a page's currency label to a short code; `лей`/`lei` become `MDL`.
#[must_use]
pub fn normalize_currency(text: &str) -> Option<String> {
    let trimmed = text.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if ["лей", "lei", "mdl"].contains(&lower.as_str()) {
        return Some(acdb_core::DEFAULT_CURRENCY.to_string());
    }
    Some(trimmed.to_uppercase())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
