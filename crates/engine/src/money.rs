use std::{fmt, ops::Neg};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Largest magnitude accepted for a single amount or balance, in cents.
///
/// Matches a `decimal(18,2)` column: `9_999_999_999_999_999.99`.
pub const MAX_ABS_CENTS: i64 = 999_999_999_999_999_999;

/// An amount in minor units (cents). Positive is income, negative is an
/// expense. Balances use the same type.
///
/// # Example
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Wraps a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// `None` when the `i64` sum overflows.
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Rejects values outside `±MAX_ABS_CENTS`.
    pub(crate) fn ensure_in_bounds(self, label: &str) -> Result<Self, EngineError> {
        if self.0.unsigned_abs() > MAX_ABS_CENTS.unsigned_abs() {
            return Err(EngineError::InvalidAmount(format!("{label} is out of range")));
        }
        Ok(self)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}
