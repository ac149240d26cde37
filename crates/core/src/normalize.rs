//! Field normalization applied at the request boundary.
//!
//! Names and categories are stored title-cased, emails lowercased, and the
//! numeric inventory fields rounded to a fixed number of decimal places
//! before persistence.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for inventory weights.
pub const WEIGHT_DECIMALS: u32 = 5;

/// Decimal places kept for inventory prices.
pub const PRICE_DECIMALS: u32 = 2;

/// Title-case a human-entered name: first letter of each whitespace-separated
/// word uppercased, the rest lowercased.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for (i, word) in value.split(' ').enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(|c| c.to_lowercase()));
        }
    }

    out
}

/// Lowercase an email address for storage and lookup.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Round half away from zero to `decimals` places.
///
/// Rounding happens on the shortest decimal rendition of the float, so
/// `9.995` rounds up to `10.00` rather than truncating through the binary
/// representation.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Round an inventory weight to five decimal places.
pub fn round_weight(value: f64) -> f64 {
    round_to(value, WEIGHT_DECIMALS)
}

/// Round an inventory price to two decimal places.
pub fn round_price(value: f64) -> f64 {
    round_to(value, PRICE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_single_word() {
        assert_eq!(title_case("widget"), "Widget");
        assert_eq!(title_case("TOOLS"), "Tools");
    }

    #[test]
    fn title_case_multiple_words() {
        assert_eq!(title_case("left handed hammer"), "Left Handed Hammer");
        assert_eq!(title_case("ACME supplies"), "Acme Supplies");
    }

    #[test]
    fn title_case_empty_is_empty() {
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(normalize_email(" Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn price_rounds_half_away_from_zero() {
        assert_eq!(round_price(9.995), 10.00);
        assert_eq!(round_price(9.994), 9.99);
        assert_eq!(round_price(9.999), 10.00);
        assert_eq!(round_price(10.0), 10.0);
    }

    #[test]
    fn weight_keeps_five_decimals() {
        assert_eq!(round_weight(1.23456), 1.23456);
        assert_eq!(round_weight(1.234564), 1.23456);
        assert_eq!(round_weight(1.234565), 1.23457);
    }
}
