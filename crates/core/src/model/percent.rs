use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("percentage must be within 0..=100, got {0}")]
pub struct PercentError(pub u32);

/// A whole-number score in `0..=100`, used for vocabulary mastery and pronunciation.
///
/// Deserialization goes through [`Percent::new`], so stored values outside the range are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const FULL: Percent = Percent(100);

    /// # Errors
    ///
    /// Returns `PercentError` if `value` exceeds 100.
    pub fn new(value: u32) -> Result<Self, PercentError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(PercentError(value))
    }

    /// Rounds and clamps a raw score into range. `NaN` maps to zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Percent {
    type Error = PercentError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Percent::new(0).unwrap(), Percent::ZERO);
        assert_eq!(Percent::new(100).unwrap(), Percent::FULL);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Percent::new(101).unwrap_err(), PercentError(101));
        assert_eq!(Percent::new(70_000).unwrap_err(), PercentError(70_000));
    }

    #[test]
    fn saturating_rounds_and_clamps() {
        assert_eq!(Percent::saturating_from_f64(79.5).value(), 80);
        assert_eq!(Percent::saturating_from_f64(-3.0).value(), 0);
        assert_eq!(Percent::saturating_from_f64(140.0).value(), 100);
        assert_eq!(Percent::saturating_from_f64(f64::NAN).value(), 0);
    }

    #[test]
    fn serde_uses_plain_numbers_and_checks_range() {
        assert_eq!(serde_json::to_string(&Percent::new(42).unwrap()).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Percent>("100").unwrap(), Percent::FULL);
        assert!(serde_json::from_str::<Percent>("101").is_err());
        assert!(serde_json::from_str::<Percent>("250").is_err());
        assert!(serde_json::from_str::<Percent>("-1").is_err());
    }
}
