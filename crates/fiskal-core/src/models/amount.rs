//! Currency amounts in dinars and paras.

use std::convert::Infallible;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An exact currency amount.
///
/// The value is kept as a single count of paras (1/100 of a dinar) so that
/// negative refund amounts under one dinar keep their sign. [`units`](Self::units)
/// and [`minor_units`](Self::minor_units) give the two-integer view, which
/// cannot show the sign of amounts between -1 and 0; use [`signum`](Self::signum)
/// or [`to_paras`](Self::to_paras) there. Arithmetic saturates at the `i64`
/// bounds, as [`parse`](Self::parse) does.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "Decimal", from = "Decimal")]
pub struct AmountValue {
    paras: i64,
}

impl AmountValue {
    /// Zero dinars.
    pub const ZERO: Self = Self { paras: 0 };

    /// Create an amount from whole units and paras. The sign is carried by `units`.
    /// Paras above 99 carry into the units, so `new(1, 150)` is `2,50`.
    pub fn new(units: i64, minor_units: u8) -> Self {
        let minor = i64::from(minor_units);
        let whole = units.saturating_mul(100);
        let paras = if units < 0 {
            whole.saturating_sub(minor)
        } else {
            whole.saturating_add(minor)
        };
        Self { paras }
    }

    /// Create an amount from a total count of paras.
    pub const fn from_paras(paras: i64) -> Self {
        Self { paras }
    }

    /// Create an amount from a float, rounding to the nearest para.
    pub fn from_float(value: f64) -> Self {
        Self {
            paras: (value * 100.0).round() as i64,
        }
    }

    /// Parse a Serbian-formatted amount such as `"54.983,99"`.
    ///
    /// Dots are thousands separators and the comma starts the fraction. A
    /// missing fraction is zero, and ragged trailing text is ignored rather
    /// than rejected.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (integer, fraction) = text.split_once(',').unwrap_or((text, ""));
        let integer: String = integer.chars().filter(|c| *c != '.').collect();

        let (negative, units) = leading_integer(&integer);
        let magnitude = units.saturating_mul(100).saturating_add(fraction_paras(fraction));

        Self {
            paras: if negative { -magnitude } else { magnitude },
        }
    }

    /// Whole units, truncated toward zero. Zero for `-0,50`.
    pub fn units(&self) -> i64 {
        self.paras / 100
    }

    /// Paras part, always in `0..=99` and unsigned.
    pub fn minor_units(&self) -> u8 {
        (self.paras % 100).unsigned_abs() as u8
    }

    /// `-1`, `0` or `1` by the sign of the amount.
    pub fn signum(&self) -> i64 {
        self.paras.signum()
    }

    /// Total value in paras.
    pub fn to_paras(&self) -> i64 {
        self.paras
    }

    /// Value as a float, for display and approximate arithmetic only.
    pub fn as_float(&self) -> f64 {
        self.paras as f64 / 100.0
    }

    /// Value as an exact decimal with two fractional digits.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.paras, 2)
    }

    pub fn is_negative(&self) -> bool {
        self.paras < 0
    }

    pub fn is_zero(&self) -> bool {
        self.paras == 0
    }
}

/// Read an optional sign and the leading run of digits, like a lenient `atoi`.
///
/// Returns the sign and the magnitude. Anything after the digits is ignored.
pub(crate) fn leading_integer(text: &str) -> (bool, i64) {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let magnitude = digits
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d)));

    (negative, magnitude)
}

/// First two fractional digits as paras. A single digit counts as tenths.
fn fraction_paras(fraction: &str) -> i64 {
    let mut digits = fraction
        .trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(i64::from);

    match (digits.next(), digits.next()) {
        (None, _) => 0,
        (Some(tenths), None) => tenths * 10,
        (Some(tenths), Some(hundredths)) => tenths * 10 + hundredths,
    }
}

impl fmt::Display for AmountValue {
    /// Formats as `"54.983,99"`: dot thousands separators, two decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.paras < 0 { "-" } else { "" };
        let magnitude = self.paras.unsigned_abs();
        let digits = (magnitude / 100).to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        write!(f, "{}{},{:02}", sign, grouped, magnitude % 100)
    }
}

impl FromStr for AmountValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<AmountValue> for Decimal {
    fn from(amount: AmountValue) -> Self {
        amount.as_decimal()
    }
}

impl From<Decimal> for AmountValue {
    fn from(value: Decimal) -> Self {
        let paras = (value * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or_default();
        Self { paras }
    }
}

impl Add for AmountValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            paras: self.paras.saturating_add(rhs.paras),
        }
    }
}

impl Sum for AmountValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
