//! Charge gauge gating entry into aim mode.

use serde::{Deserialize, Serialize};

/// Time-based resource in `[0, charge_time]`.
///
/// # Example
///
/// ```
/// use delve_core::player::ChargeGauge;
///
/// let mut gauge = ChargeGauge::new(2.0);
/// gauge.charge(1.0);
/// assert_eq!(gauge.ratio(), 0.5);
/// assert!(!gauge.is_ready());
///
/// gauge.charge(5.0);
/// assert_eq!(gauge.ratio(), 1.0);
/// assert!(gauge.is_ready());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeGauge {
    charge: f32,
    charge_time: f32,
}

impl ChargeGauge {
    /// Creates an empty gauge that fills in `charge_time` seconds.
    #[must_use]
    pub const fn new(charge_time: f32) -> Self {
        Self {
            charge: 0.0,
            charge_time,
        }
    }

    /// Adds `dt` seconds of charge, saturating at `charge_time`.
    pub fn charge(&mut self, dt: f32) {
        let limit = self.charge_time.max(0.0);
        self.charge = (self.charge + dt.max(0.0)).min(limit);
    }

    /// Empties the gauge.
    pub fn reset(&mut self) {
        self.charge = 0.0;
    }

    /// Accumulated charge in seconds.
    #[must_use]
    pub const fn charge_value(&self) -> f32 {
        self.charge
    }

    /// Seconds needed to fill the gauge.
    #[must_use]
    pub const fn charge_time(&self) -> f32 {
        self.charge_time
    }

    /// `charge / charge_time`, or `0` when `charge_time <= 0`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.charge_time <= 0.0 {
            return 0.0;
        }
        self.charge / self.charge_time
    }

    /// True exactly when the gauge is saturated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.charge >= self.charge_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_charge_time_ratio_is_zero() {
        let mut gauge = ChargeGauge::new(0.0);
        gauge.charge(1.0);
        assert_eq!(gauge.ratio(), 0.0);
        assert!(gauge.is_ready());
    }

    #[test]
    fn reset_empties() {
        let mut gauge = ChargeGauge::new(3.0);
        gauge.charge(3.0);
        gauge.reset();
        assert_eq!(gauge.ratio(), 0.0);
        assert!(!gauge.is_ready());
    }

    proptest! {
        #[test]
        fn ratio_is_monotone_and_bounded(steps in prop::collection::vec(0.0f32..0.5, 1..50)) {
            let mut gauge = ChargeGauge::new(3.0);
            let mut last = gauge.ratio();
            for dt in steps {
                gauge.charge(dt);
                let ratio = gauge.ratio();
                prop_assert!(ratio >= last);
                prop_assert!(ratio <= 1.0);
                last = ratio;
            }
        }
    }
}
