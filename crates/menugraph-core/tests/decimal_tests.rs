//! Exact Decimal Tests
//!
//! Normalization round trips are checked with proptest over generated
//! amount literals.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use menugraph_core::{Decimal, RoundingMode};
use proptest::prelude::*;

/// Reference normalization of a plain decimal literal
fn normalize(literal: &str) -> String {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = frac_part.trim_end_matches('0');

    let magnitude = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    };

    if negative && magnitude != "0" {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

fn literal() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", "+", "-"]),
        "[0-9]{1,12}",
        prop::option::of("[0-9]{1,10}"),
    )
        .prop_map(|(sign, int_part, frac)| match frac {
            Some(frac) => format!("{}{}.{}", sign, int_part, frac),
            None => format!("{}{}", sign, int_part),
        })
}

proptest! {
    #[test]
    fn prop_parse_display_is_normalized(s in literal()) {
        prop_assert_eq!(Decimal::parse(&s).to_string(), normalize(&s));
    }

    #[test]
    fn prop_trailing_zeros_do_not_change_value(s in literal()) {
        let padded = if s.contains('.') { format!("{}00", s) } else { format!("{}.00", s) };
        prop_assert_eq!(Decimal::parse(&s), Decimal::parse(&padded));
    }

    #[test]
    fn prop_canonical_string_reparses_to_same_value(s in literal()) {
        let d = Decimal::parse(&s);
        let again: Decimal = d.to_canonical_string().parse().unwrap();
        prop_assert_eq!(d, again);
    }
}

#[test]
fn test_round_1_005_in_both_modes() {
    let d = Decimal::parse("1.005");
    assert_eq!(d.round(2, RoundingMode::HalfEven), Decimal::parse("1.00"));
    assert_eq!(d.round(2, RoundingMode::Plain), Decimal::parse("1.01"));
}

#[test]
fn test_malformed_input_is_zero() {
    assert_eq!(Decimal::parse("12,50 rub"), Decimal::ZERO);
    assert_eq!(Decimal::parse("1.2e3"), Decimal::ZERO);
}

#[test]
fn test_price_arithmetic_is_exact() {
    let line = Decimal::parse("19.99").checked_mul_int(3).unwrap();
    let total = line.checked_add(Decimal::parse("0.03")).unwrap();
    assert_eq!(total.to_string(), "60");
}
