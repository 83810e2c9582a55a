use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Exact decimal amount with two fractional digits, held in hundredths.
///
/// On the ledger amounts are plain JSON numbers (`5000.0`, `12.5`); in memory
/// they never touch floating point arithmetic. Magnitudes are capped at
/// [`Amount::MAX`] so every value survives the trip through an `f64` exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

const SCALE: i64 = 100;

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest magnitude that round-trips through a JSON number: 15
    /// significant digits, `9999999999999.99`.
    pub const MAX: Amount = Amount(999_999_999_999_999);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole units.
    ///
    /// # Panics
    ///
    /// Panics if `units` is beyond [`Amount::MAX`]. Use
    /// [`Amount::checked_from_units`] for untrusted input.
    pub const fn from_units(units: i64) -> Self {
        match Self::checked_from_units(units) {
            Some(amount) => amount,
            None => panic!("amount out of range"),
        }
    }

    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(SCALE) {
            Some(cents) if cents >= -Self::MAX.0 && cents <= Self::MAX.0 => Some(Self(cents)),
            _ => None,
        }
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude is within [`Amount::MAX`].
    pub fn in_range(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0.unsigned_abs()
    }

    /// `None` when the sum leaves the representable range.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .filter(|sum| sum.in_range())
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * SCALE as f64).round();
        if cents.abs() > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid amount {:?}", self.0)
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError(s.to_string());
        let trimmed = s.trim();

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(err());
        }
        if fraction.len() > 2 {
            return Err(err());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err())?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };

        let cents = whole
            .checked_mul(SCALE)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(err)?;

        let amount = Self(if negative { -cents } else { cents });
        if !amount.in_range() {
            return Err(err());
        }
        Ok(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / SCALE as u64,
            abs % SCALE as u64
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.in_range() {
            return Err(serde::ser::Error::custom(format!("amount out of range: {}", self)));
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("5000".parse::<Amount>().unwrap(), Amount::from_cents(500_000));
        assert_eq!("5000.00".parse::<Amount>().unwrap(), Amount::from_units(5000));
        assert_eq!("12.5".parse::<Amount>().unwrap(), Amount::from_cents(1_250));
        assert_eq!("0.07".parse::<Amount>().unwrap(), Amount::from_cents(7));
        assert_eq!(".5".parse::<Amount>().unwrap(), Amount::from_cents(50));
        assert_eq!(" 3 ".parse::<Amount>().unwrap(), Amount::from_units(3));
        assert_eq!("-1.25".parse::<Amount>().unwrap(), Amount::from_cents(-125));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".", "abc", "1.234", "1,5", "1.2.3", "--1", "1e3"] {
            assert!(input.parse::<Amount>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_units(5000).to_string(), "5000.00");
        assert_eq!(Amount::from_cents(1_205).to_string(), "12.05");
        assert_eq!(Amount::from_cents(-50).to_string(), "-0.50");
    }

    #[test]
    fn test_json_is_a_plain_number() {
        let json = serde_json::to_string(&Amount::from_cents(1_250)).unwrap();
        assert_eq!(json, "12.5");

        let back: Amount = serde_json::from_str("5000").unwrap();
        assert_eq!(back, Amount::from_units(5000));

        // Legacy records written with float arithmetic still land on the cent.
        let legacy: Amount = serde_json::from_str("0.30000000000000004").unwrap();
        assert_eq!(legacy, Amount::from_cents(30));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert!(Amount::from_cents(i64::MAX).checked_add(Amount::from_cents(1)).is_none());
        assert!(Amount::MAX.checked_add(Amount::from_cents(1)).is_none());
        assert_eq!(
            Amount::from_units(1).checked_add(Amount::from_cents(50)),
            Some(Amount::from_cents(150))
        );
    }

    #[test]
    fn test_largest_amount_is_exact_on_the_wire() {
        let max: Amount = "9999999999999.99".parse().unwrap();
        assert_eq!(max, Amount::MAX);

        let json = serde_json::to_string(&max).unwrap();
        assert_eq!(json, "9999999999999.99");
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), max);

        let negative: Amount = "-9999999999999.99".parse().unwrap();
        let json = serde_json::to_string(&negative).unwrap();
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), negative);
    }

    #[test]
    fn test_amounts_past_the_limit_are_rejected() {
        for input in ["10000000000000", "99999999999999.99", "-10000000000000.00"] {
            assert!(input.parse::<Amount>().is_err(), "accepted {:?}", input);
        }
        assert!(serde_json::from_str::<Amount>("99999999999999.99").is_err());
        assert!(serde_json::to_string(&Amount::from_cents(i64::MAX)).is_err());
    }

    #[test]
    fn test_checked_from_units() {
        assert_eq!(Amount::checked_from_units(5000), Some(Amount::from_cents(500_000)));
        assert_eq!(Amount::checked_from_units(i64::MAX), None);
        assert_eq!(Amount::checked_from_units(10_000_000_000_000), None);
    }

    #[test]
    #[should_panic(expected = "amount out of range")]
    fn test_from_units_panics_on_overflow() {
        let _ = Amount::from_units(i64::MAX);
    }
}
