//! Currency amounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits in one ether.
const DECIMALS: u32 = 18;

/// A non-negative amount in the smallest currency unit (1 ether = 10^18).
///
/// Serialized as a decimal ether string (`"0.5"`) so configuration files can
/// express fees without 64-bit integer limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Units per whole ether.
    pub const UNITS_PER_ETHER: u128 = 10u128.pow(DECIMALS);

    /// Zero amount.
    pub const ZERO: Self = Amount(0);

    /// Create from raw units.
    pub const fn from_units(units: u128) -> Self {
        Amount(units)
    }

    /// Whole ether.
    pub const fn ether(n: u128) -> Self {
        Amount(n * Self::UNITS_PER_ETHER)
    }

    /// Thousandths of an ether.
    pub const fn milli_ether(n: u128) -> Self {
        Amount(n * (Self::UNITS_PER_ETHER / 1_000))
    }

    /// Get the raw units.
    pub fn units(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Multiply by `numerator / denominator`, rounding down.
    ///
    /// Returns `None` on overflow or a zero denominator.
    pub fn checked_mul_ratio(self, numerator: u128, denominator: u128) -> Option<Amount> {
        if denominator == 0 {
            return None;
        }
        self.0
            .checked_mul(numerator)
            .map(|scaled| Amount(scaled / denominator))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::UNITS_PER_ETHER;
        let frac = self.0 % Self::UNITS_PER_ETHER;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Errors parsing a decimal ether string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,

    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),

    #[error("amount {0:?} has more than 18 fractional digits")]
    TooPrecise(String),

    #[error("amount {0:?} overflows")]
    Overflow(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if frac.len() > DECIMALS as usize {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountParseError::Overflow(s.to_string());
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| overflow())?
                .checked_mul(Self::UNITS_PER_ETHER)
                .ok_or_else(overflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<18}");
            padded.parse::<u128>().map_err(|_| overflow())?
        };

        whole_units
            .checked_add(frac_units)
            .map(Amount)
            .ok_or_else(overflow)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Amount::ether(10).to_string(), "10");
        assert_eq!(Amount::milli_ether(750).to_string(), "0.75");
        assert_eq!(Amount::from_units(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_parse() {
        assert_eq!("10".parse::<Amount>(), Ok(Amount::ether(10)));
        assert_eq!("0.5".parse::<Amount>(), Ok(Amount::milli_ether(500)));
        assert_eq!(".234".parse::<Amount>(), Ok(Amount::milli_ether(234)));
        assert!(matches!("".parse::<Amount>(), Err(AmountParseError::Empty)));
        assert!(matches!(
            "1.2.3".parse::<Amount>(),
            Err(AmountParseError::InvalidDigit(_))
        ));
        assert!(matches!(
            "0.0000000000000000001".parse::<Amount>(),
            Err(AmountParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_payout_ratio() {
        let premium = Amount::milli_ether(500);
        assert_eq!(premium.checked_mul_ratio(3, 2), Some(Amount::milli_ether(750)));
        assert_eq!(premium.checked_mul_ratio(3, 0), None);
        assert_eq!(Amount::from_units(u128::MAX).checked_mul_ratio(2, 1), None);
    }

    #[test]
    fn test_serde_as_ether_string() {
        let json = serde_json::to_string(&Amount::milli_ether(1500)).unwrap();
        assert_eq!(json, "\"1.5\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Amount::milli_ether(1500));
    }
}
