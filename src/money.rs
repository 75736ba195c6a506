//! Currency amounts.
//!
//! Prices are carried as [`BigDecimal`] with two fractional digits. On the wire they are JSON
//! numbers; input additionally accepts a decimal string (`"600.00"`) so clients that keep
//! amounts as text do not lose precision.

use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode, ToPrimitive};
use serde::{de, Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits kept for currency amounts.
pub const CENT_SCALE: i64 = 2;

/// Builds an amount from an integer number of cents (`54_000` -> `540.00`).
pub fn from_cents(cents: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(cents), CENT_SCALE)
}

/// Rounds an amount half-up to whole cents.
pub fn round_to_cents(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(CENT_SCALE, RoundingMode::HalfUp)
}

/// Fractional digits accepted on input; anything finer is noise for a currency amount.
pub const MAX_INPUT_SCALE: i64 = 10;
/// Lowest scale accepted on input (`1e4` has scale -4).
pub const MIN_INPUT_SCALE: i64 = -4;
/// Significant digits accepted on input.
pub const MAX_INPUT_DIGITS: u64 = 16;

/// Parses a decimal amount from its textual form.
///
/// Returns `None` for text that is not a decimal, or whose exponent or digit count is outside
/// what a currency amount can need. Rescaling such a value would allocate without bound.
pub fn parse_amount(text: &str) -> Option<BigDecimal> {
    let amount = BigDecimal::from_str(text.trim()).ok()?;
    if amount.digits() > MAX_INPUT_DIGITS {
        return None;
    }

    let (_, scale) = amount.as_bigint_and_exponent();
    if !(MIN_INPUT_SCALE..=MAX_INPUT_SCALE).contains(&scale) {
        return None;
    }

    Some(amount)
}

pub fn serialize<S>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = round_to_cents(amount)
        .to_f64()
        .ok_or_else(|| serde::ser::Error::custom("amount is out of range"))?;
    serializer.serialize_f64(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl AmountVisitor {
    fn parse<E: de::Error>(text: &str) -> Result<BigDecimal, E> {
        parse_amount(text)
            .ok_or_else(|| E::custom(format!("invalid or out of range amount '{}'", text)))
    }
}

impl<'de> de::Visitor<'de> for AmountVisitor {
    type Value = BigDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a number or a string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Self::parse(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Self::parse(&v.to_string())
    }

    // f64's Display is the shortest text that round-trips, so 600.1 parses as exactly 600.1
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        Self::parse(&v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Self::parse(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "super")]
        price: BigDecimal,
    }

    #[test]
    fn test_float_input_is_read_exactly() {
        let priced: Priced = serde_json::from_str(r#"{"price": 600.1}"#).unwrap();
        assert_eq!(priced.price, from_cents(60_010));
    }

    #[test]
    fn test_string_and_integer_input() {
        let priced: Priced = serde_json::from_str(r#"{"price": "123.45"}"#).unwrap();
        assert_eq!(priced.price, from_cents(12_345));

        let priced: Priced = serde_json::from_str(r#"{"price": 100}"#).unwrap();
        assert_eq!(priced.price, from_cents(10_000));
    }

    #[test]
    fn test_extreme_exponents_are_rejected() {
        assert_eq!(parse_amount("1e200000000"), None);
        assert_eq!(parse_amount("1e-200000000"), None);
        assert_eq!(parse_amount("12345678901234567890"), None);
        assert_eq!(parse_amount("1e4"), Some(from_cents(1_000_000)));
        assert_eq!(parse_amount("0.0000000001"), Some(BigDecimal::new(BigInt::from(1), 10)));

        assert!(serde_json::from_str::<Priced>(r#"{"price": "1e200000000"}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"price": 1e300}"#).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Priced>(r#"{"price": "ten"}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"price": true}"#).is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Priced {
            price: from_cents(54_000),
        })
        .unwrap();
        assert_eq!(json["price"].as_f64(), Some(540.0));
    }

    #[test]
    fn test_round_to_cents_half_up() {
        assert_eq!(round_to_cents(&parse_amount("450.009").unwrap()), from_cents(45_001));
        assert_eq!(round_to_cents(&parse_amount("10.005").unwrap()), from_cents(1_001));
        assert_eq!(round_to_cents(&parse_amount("10.004").unwrap()), from_cents(1_000));
    }
}
