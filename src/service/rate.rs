//! Native-token to USD conversion.
//!
//! The USD value of a donation is always computed here from the
//! configured rate; figures supplied by clients are only compared against
//! it for logging.

use crate::error::MarketError;

/// Relative difference above which a client-supplied USD figure is logged.
const DRIFT_TOLERANCE: f64 = 0.01;

/// Trusted conversion rate from the native token to USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsdRate {
    usd_per_unit: f64,
}

impl UsdRate {
    /// Creates a rate.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if the rate is not a positive
    /// finite number.
    pub fn new(usd_per_unit: f64) -> Result<Self, MarketError> {
        if !usd_per_unit.is_finite() || usd_per_unit <= 0.0 {
            return Err(MarketError::Validation(format!(
                "exchange rate must be positive, got {usd_per_unit}"
            )));
        }
        Ok(Self { usd_per_unit })
    }

    /// USD price of one native unit.
    #[must_use]
    pub const fn usd_per_unit(&self) -> f64 {
        self.usd_per_unit
    }

    /// Converts a native amount to USD, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if `amount` is not a positive
    /// finite number, or if its USD value does not fit in an `f64`.
    pub fn to_usd(&self, amount: f64) -> Result<f64, MarketError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(MarketError::Validation(format!(
                "donation amount must be positive, got {amount}"
            )));
        }
        let cents = (amount * self.usd_per_unit * 100.0).round();
        if !cents.is_finite() {
            return Err(MarketError::Validation(format!(
                "donation amount {amount} is out of range"
            )));
        }
        Ok(cents / 100.0)
    }

    /// Returns `true` if `claimed` is more than 1% away from `authoritative`.
    #[must_use]
    pub fn drifts(claimed: f64, authoritative: f64) -> bool {
        (claimed - authoritative).abs() > authoritative.abs() * DRIFT_TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn converts_and_rounds_to_cents() {
        let Ok(rate) = UsdRate::new(2000.0) else {
            panic!("valid rate rejected");
        };
        assert_eq!(rate.to_usd(0.0123456).ok(), Some(24.69));
    }

    #[test]
    fn rejects_non_positive_rates_and_amounts() {
        assert!(UsdRate::new(0.0).is_err());
        assert!(UsdRate::new(f64::NAN).is_err());
        let rate = UsdRate { usd_per_unit: 10.0 };
        assert!(rate.to_usd(0.0).is_err());
        assert!(rate.to_usd(-1.0).is_err());
        assert!(rate.to_usd(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_amounts_whose_usd_value_overflows() {
        let rate = UsdRate { usd_per_unit: 3000.0 };
        assert!(matches!(
            rate.to_usd(f64::MAX),
            Err(MarketError::Validation(_))
        ));
        assert!(rate.to_usd(1e305).is_err());
    }

    #[test]
    fn drift_threshold_is_one_percent() {
        assert!(!UsdRate::drifts(100.5, 100.0));
        assert!(UsdRate::drifts(102.0, 100.0));
        assert!(UsdRate::drifts(50.0, 100.0));
    }
}
