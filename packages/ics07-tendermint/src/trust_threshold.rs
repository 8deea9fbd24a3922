//! This module defines [`TrustThreshold`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tendermint::trust_threshold::TrustThresholdFraction;

use crate::error::TendermintClientError;

/// The fraction of voting power that must sign for a commit to be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThreshold {
    /// Numerator of the fraction
    pub numerator: u64,
    /// Denominator of the fraction
    pub denominator: u64,
}

impl TrustThreshold {
    /// One third, the default trust level.
    pub const ONE_THIRD: Self = Self::new(1, 3);
    /// Two thirds, the commit threshold of the validator set itself.
    pub const TWO_THIRDS: Self = Self::new(2, 3);
    /// The zero fraction, used when client-chosen fields are cleared.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new threshold.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Returns true if the fraction lies within `[1/3, 1]`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.denominator != 0
            && self.numerator <= self.denominator
            && u128::from(self.numerator) * 3 >= u128::from(self.denominator)
    }

    /// Returns true if `signed / total` is strictly greater than the threshold.
    #[must_use]
    pub fn is_exceeded_by(self, signed: u64, total: u64) -> bool {
        u128::from(signed) * u128::from(self.denominator)
            > u128::from(total) * u128::from(self.numerator)
    }

    /// The threshold as the light client verifier's fraction.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidClient`] if the fraction lies outside `[1/3, 1]`.
    pub fn to_fraction(self) -> Result<TrustThresholdFraction, TendermintClientError> {
        TrustThresholdFraction::new(self.numerator, self.denominator).map_err(|e| {
            TendermintClientError::InvalidClient(format!("trust level {self}: {e}"))
        })
    }
}

impl Default for TrustThreshold {
    fn default() -> Self {
        Self::ONE_THIRD
    }
}

impl fmt::Display for TrustThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(TrustThreshold::ONE_THIRD, true)]
    #[case(TrustThreshold::TWO_THIRDS, true)]
    #[case(TrustThreshold::new(1, 1), true)]
    #[case(TrustThreshold::new(1, 4), false)]
    #[case(TrustThreshold::new(4, 3), false)]
    #[case(TrustThreshold::ZERO, false)]
    fn trust_level_bounds(#[case] threshold: TrustThreshold, #[case] valid: bool) {
        assert_eq!(threshold.is_valid(), valid);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!TrustThreshold::TWO_THIRDS.is_exceeded_by(2, 3));
        assert!(TrustThreshold::TWO_THIRDS.is_exceeded_by(3, 4));
        assert!(TrustThreshold::ONE_THIRD.is_exceeded_by(1, 2));
        assert!(!TrustThreshold::ONE_THIRD.is_exceeded_by(0, 0));
    }

    #[test]
    fn fraction_conversion_follows_the_bounds() {
        let fraction = TrustThreshold::TWO_THIRDS.to_fraction().unwrap();
        assert_eq!((fraction.numerator(), fraction.denominator()), (2, 3));
        assert!(TrustThreshold::new(1, 4).to_fraction().is_err());
        assert!(TrustThreshold::ZERO.to_fraction().is_err());
    }
}
