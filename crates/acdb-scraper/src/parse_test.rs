use rust_decimal::Decimal;

use super::*;

#[test]
fn price_strips_currency_word_and_spaces() {
    assert_eq!(parse_price("12 999 лей"), Some(Decimal::new(12_999, 0)));
    assert_eq!(parse_price("12\u{a0}999\u{a0}MDL"), Some(Decimal::new(12_999, 0)));
}

#[test]
fn price_handles_decimal_and_thousands_separators() {
    assert_eq!(parse_price("1,299.50"), Some(Decimal::new(129_950, 2)));
    assert_eq!(parse_price("1.299,50 lei"), Some(Decimal::new(129_950, 2)));
    assert_eq!(parse_price("15,000"), Some(Decimal::new(15_000, 0)));
    assert_eq!(parse_price("999,9"), Some(Decimal::new(9_999, 1)));
}

#[test]
fn price_is_normalized() {
    assert_eq!(
        parse_price("8500.00").map(|d| d.to_string()),
        Some("8500".to_string())
    );
}

#[test]
fn price_without_digits_is_absent() {
    assert_eq!(parse_price("Цена по запросу"), None);
    assert_eq!(parse_price(""), None);
}

#[test]
fn price_digits_ignores_labels() {
    assert_eq!(
        parse_price_digits("Цена: 7 450 лей -10%"),
        Some(Decimal::new(745_010, 0))
    );
    assert_eq!(parse_price_digits("7 450 лей"), Some(Decimal::new(7_450, 0)));
    assert_eq!(parse_price_digits("нет"), None);
}

#[test]
fn glued_price_digits_are_rejected() {
    assert_eq!(parse_price_digits("12 999 лей 15 999 лей -20%"), None);
    assert_eq!(parse_price_digits("99999999999999999999999999999999"), None);
    assert_eq!(parse_price_digits("10 000 000"), Some(MAX_PRICE));
}

#[test]
fn implausible_decimal_price_is_rejected() {
    assert_eq!(parse_price("12345678901.50 MDL"), None);
    assert_eq!(parse_price("9 999 999,99 lei"), Some(Decimal::new(999_999_999, 2)));
}

#[test]
fn int_with_unit_accepts_grouped_digits() {
    assert_eq!(parse_int_with_unit("12 000"), Some(12_000));
    assert_eq!(parse_int_with_unit("9000 BTU"), Some(9_000));
    assert_eq!(parse_int_with_unit("18\u{a0}000 btu/h"), Some(18_000));
}

#[test]
fn int_with_unit_rejects_ranges_and_text() {
    assert_eq!(parse_int_with_unit("7000-24000"), None);
    assert_eq!(parse_int_with_unit("n/a"), None);
}

#[test]
fn max_int_takes_largest_token() {
    assert_eq!(parse_max_int("7000-24000 BTU"), Some(24_000));
    assert_eq!(parse_max_int("2.6 кВт / 9000 BTU"), Some(9_000));
    assert_eq!(parse_max_int("9 000 - 12 000 BTU"), Some(12_000));
    assert_eq!(parse_max_int("без данных"), None);
}

#[test]
fn digits_before_marker() {
    assert_eq!(parse_digits_before("12 000 BTU/h", "BTU"), Some(12_000));
    assert_eq!(parse_digits_before("3.5 кВт", "BTU"), None);
    assert_eq!(parse_digits_before("BTU", "BTU"), None);
}

#[test]
fn area_strips_unit_glyph() {
    assert_eq!(parse_area("25 м²"), Some(25.0));
    assert_eq!(parse_area("20,5"), Some(20.5));
    assert_eq!(parse_area("35м2"), Some(35.0));
    assert_eq!(parse_area("—"), None);
}

#[test]
fn currency_labels_map_to_code() {
    assert_eq!(normalize_currency("лей"), Some("MDL".to_string()));
    assert_eq!(normalize_currency(" mdl "), Some("MDL".to_string()));
    assert_eq!(normalize_currency("eur"), Some("EUR".to_string()));
    assert_eq!(normalize_currency("  "), None);
}
