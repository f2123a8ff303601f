//! Linear Impact Function
//!
//! The simplest model: impact is proportional to execution rate, plus a fixed
//! offset that both buys and sells pay.
//!
//! f(r) = sign(r) × ε + η × r
//!
//! Where:
//! - ε = offset (half-spread style fixed cost)
//! - η = slope (price sensitivity per unit rate)
//!
//! As a permanent impact this is the `γ` of Almgren–Chriss; as a temporary impact
//! it is `ε sign(n) + η n/τ`.

use serde::Serialize;

use super::protocol::{DerivativeOrder, ImpactFunction, odd_sign};
use crate::error::{Result, ensure_finite};

/// Linear impact `sign(r)·offset + slope·r`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearImpact {
    offset: f64,
    slope: f64,
}

impl LinearImpact {
    /// Create a new linear impact function
    ///
    /// # Arguments
    /// * `offset` - fixed cost paid by any non-zero trade
    /// * `slope` - impact per unit of execution rate
    pub fn new(offset: f64, slope: f64) -> Result<Self> {
        Ok(Self {
            offset: ensure_finite("offset", offset)?,
            slope: ensure_finite("slope", slope)?,
        })
    }

    pub fn slope_only(slope: f64) -> Result<Self> {
        Self::new(0.0, slope)
    }

    /// No impact at all
    pub fn zero() -> Self {
        Self {
            offset: 0.0,
            slope: 0.0,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }
}

impl ImpactFunction for LinearImpact {
    fn evaluate_rate(&self, rate: f64) -> f64 {
        odd_sign(rate) * self.offset + self.slope * rate
    }

    fn derivative(&self, _rate: f64, order: DerivativeOrder) -> Result<f64> {
        Ok(match order {
            DerivativeOrder::First => self.slope,
            DerivativeOrder::Second => 0.0,
        })
    }

    fn name(&self) -> &str {
        "linear"
    }
}

impl Default for LinearImpact {
    fn default() -> Self {
        Self::zero()
    }
}
