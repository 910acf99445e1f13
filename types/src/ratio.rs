//! Fixed-point ratios with 18 decimal places.
//!
//! Fees, reward shares and the reward factor are all integers scaled by
//! `SCALE = 10^18`, so `Ratio::from_raw(SCALE)` is exactly 1.0. Products are
//! taken through a 256-bit intermediate before dividing, which keeps
//! `amount * factor / SCALE` exact for any pair of `u128` operands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uint::construct_uint;

/// Fixed-point scale: 1.0 == 10^18.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

const SCALE_DIGITS: usize = 18;

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

/// `floor(a * b / denom)` without intermediate overflow.
///
/// Returns `None` when `denom` is zero or the quotient does not fit in 128 bits.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denom);
    if quotient.bits() > 128 {
        None
    } else {
        Some(quotient.low_u128())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatioParseError {
    #[error("empty ratio string")]
    Empty,

    #[error("invalid character in ratio: {0:?}")]
    InvalidDigit(String),

    #[error("ratio has more than 18 fractional digits")]
    TooPrecise,

    #[error("ratio does not fit in 128 bits")]
    Overflow,
}

/// A non-negative fixed-point number scaled by [`SCALE`].
///
/// Serialized as a decimal string (`"0.25"`) so it survives TOML and JSON,
/// neither of which carries 128-bit integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ratio(u128);

impl Ratio {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Whole percent, e.g. `Ratio::from_percent(25)` is 0.25.
    pub fn from_percent(percent: u64) -> Self {
        Self(u128::from(percent) * (SCALE / 100))
    }

    /// `floor(amount * self)`.
    pub fn apply(&self, amount: u128) -> Option<u128> {
        mul_div(amount, self.0, SCALE)
    }
}

impl FromStr for Ratio {
    type Err = RatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RatioParseError::Empty);
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(RatioParseError::Empty);
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(RatioParseError::InvalidDigit(s.to_string()));
        }
        if frac_part.len() > SCALE_DIGITS {
            return Err(RatioParseError::TooPrecise);
        }

        let int_value: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| RatioParseError::Overflow)?
        };
        let frac_value: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_part, width = SCALE_DIGITS);
            padded.parse().map_err(|_| RatioParseError::Overflow)?
        };

        int_value
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_value))
            .map(Self)
            .ok_or(RatioParseError::Overflow)
    }
}

impl TryFrom<String> for Ratio {
    type Error = RatioParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Ratio> for String {
    fn from(r: Ratio) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{}", int);
        }
        let digits = format!("{:0width$}", frac, width = SCALE_DIGITS);
        write!(f, "{}.{}", int, digits.trim_end_matches('0'))
    }
}
