//! Power-Law Impact Function
//!
//! Impact grows as a power of the execution rate (Almgren 2003).
//!
//! f(r) = η × sign(r) × |r|^k
//!
//! Where:
//! - η = impact constant
//! - k = exponent (k = 1 is linear, k = 0.5 is the square-root law)
//!
//! Derivatives:
//! ```text
//! f'(r)  = η k |r|^(k-1)
//! f''(r) = η k (k-1) sign(r) |r|^(k-2)
//! ```
//! At rest (`r = 0`) the first derivative is singular for `k < 1` and the second for
//! `k < 2` unless `k = 1`; those cases are reported as errors.

use serde::Serialize;

use super::protocol::{DerivativeOrder, ImpactFunction, odd_sign};
use crate::error::{ExecutionError, Result};

const UNIT_EXPONENT_TOLERANCE: f64 = 1e-12;

/// Power-law impact `η·sign(r)·|r|^k`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerLawImpact {
    constant: f64,
    exponent: f64,
}

impl PowerLawImpact {
    /// # Arguments
    /// * `constant` - η, strictly positive
    /// * `exponent` - k, strictly positive
    pub fn new(constant: f64, exponent: f64) -> Result<Self> {
        if !(constant.is_finite() && constant > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "constant",
                value: constant,
            });
        }
        if !(exponent.is_finite() && exponent > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "exponent",
                value: exponent,
            });
        }
        Ok(Self { constant, exponent })
    }

    /// Square-root law, `k = 1/2`
    pub fn square_root(constant: f64) -> Result<Self> {
        Self::new(constant, 0.5)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn is_linear(&self) -> bool {
        (self.exponent - 1.0).abs() < UNIT_EXPONENT_TOLERANCE
    }

    fn derivative_at_rest(&self, order: DerivativeOrder) -> Result<f64> {
        let k = self.exponent;
        match order {
            DerivativeOrder::First if self.is_linear() => Ok(self.constant),
            DerivativeOrder::First if k > 1.0 => Ok(0.0),
            DerivativeOrder::Second if self.is_linear() || k >= 2.0 => Ok(0.0),
            _ => Err(ExecutionError::domain(
                "power-law impact",
                format!("{order:?} derivative is singular at zero rate for exponent {k}"),
            )),
        }
    }
}

impl ImpactFunction for PowerLawImpact {
    fn evaluate_rate(&self, rate: f64) -> f64 {
        self.constant * odd_sign(rate) * rate.abs().powf(self.exponent)
    }

    fn derivative(&self, rate: f64, order: DerivativeOrder) -> Result<f64> {
        if rate == 0.0 {
            return self.derivative_at_rest(order);
        }

        let (eta, k) = (self.constant, self.exponent);
        Ok(match order {
            DerivativeOrder::First => eta * k * rate.abs().powf(k - 1.0),
            DerivativeOrder::Second => {
                eta * k * (k - 1.0) * odd_sign(rate) * rate.abs().powf(k - 2.0)
            }
        })
    }

    fn name(&self) -> &str {
        "power_law"
    }
}
