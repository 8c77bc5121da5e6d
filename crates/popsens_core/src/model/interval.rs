use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::ids::ParameterId;

/// Width added to an interval whose bounds coincide
pub const DEGENERATE_EPSILON: f64 = 1e-7;

/// Closed interval `[low, high]` with `low < high`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    /// Validate bounds for `parameter`.
    ///
    /// A point interval is widened by [`DEGENERATE_EPSILON`]; inverted or
    /// non-finite bounds cannot be corrected and are rejected.
    pub fn new(parameter: ParameterId, low: f64, high: f64) -> Result<Self, ConfigError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ConfigError::DegenerateInterval {
                parameter,
                low,
                high,
            });
        }
        if low == high {
            return Ok(Self {
                low,
                high: high + DEGENERATE_EPSILON,
            });
        }
        Ok(Self { low, high })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Map a unit-cube coordinate into the interval; 0.0 and 1.0 hit the bounds exactly
    #[must_use]
    pub fn scale(&self, unit: f64) -> f64 {
        self.low * (1.0 - unit) + self.high * unit
    }

    /// Pull both bounds toward the midpoint by `coeff × width`
    #[must_use]
    pub fn narrowed(&self, coeff: f64) -> Self {
        let shrink = self.width() * coeff;
        Self {
            low: self.low + shrink,
            high: self.high - shrink,
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}
