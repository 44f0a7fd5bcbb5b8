use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BDT_CURRENCY_CODE: &str = "BDT";

//--------------------------------------       Poisha        ---------------------------------------------------------
/// An amount of Bangladeshi Taka, held in poisha (1/100 BDT).
///
/// The gateway reports amounts as decimal strings ("5000.0", "12", "12.50"). Comparing those strings directly is
/// unreliable, so amounts are normalised into this type before they are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Poisha(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoishaConversionError {
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is out of range")]
    Overflow(String),
}

impl Poisha {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Fails with [`PoishaConversionError::Overflow`] if the amount does not fit in poisha.
    pub fn from_taka(taka: i64) -> Result<Self, PoishaConversionError> {
        taka.checked_mul(100).map(Self).ok_or_else(|| PoishaConversionError::Overflow(taka.to_string()))
    }
}

impl From<i64> for Poisha {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for Poisha {
    type Err = PoishaConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let is_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(frac) {
            return Err(PoishaConversionError::Invalid(s.to_string()));
        }
        // "5000.0" and "5000.00" are both common. Trailing zeros beyond the second place are harmless.
        let frac = frac.trim_end_matches('0');
        if frac.len() > 2 {
            return Err(PoishaConversionError::TooPrecise(s.to_string()));
        }
        let whole = whole.parse::<i64>().map_err(|_| PoishaConversionError::Overflow(s.to_string()))?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| PoishaConversionError::Invalid(s.to_string()))? * 10,
            _ => frac.parse::<i64>().map_err(|_| PoishaConversionError::Invalid(s.to_string()))?,
        };
        whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Self)
            .ok_or_else(|| PoishaConversionError::Overflow(s.to_string()))
    }
}

impl Display for Poisha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02} {BDT_CURRENCY_CODE}", abs / 100, abs % 100)
    }
}
