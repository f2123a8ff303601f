//! Impact Function Protocol
//!
//! Core trait for rate-driven impact.
//!
//! A slice trades `a = right - left` over `dt`, so the rate is `r = a / dt` and
//! every holdings derivative follows from the rate derivative by the chain rule:
//!
//! ```text
//! ∂f/∂right   = f'(r) / dt          ∂²f/∂right² = f''(r) / dt²
//! ∂f/∂left    = -f'(r) / dt         ∂²f/∂left²  = f''(r) / dt²
//! ∂²f/∂left∂right = -f''(r) / dt²
//! ```

use std::fmt::Debug;

use crate::error::{ExecutionError, Result};

/// Order of a rate derivative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    First,
    Second,
}

impl DerivativeOrder {
    pub fn as_exponent(self) -> i32 {
        match self {
            DerivativeOrder::First => 1,
            DerivativeOrder::Second => 2,
        }
    }

    /// `(-1)^order`, the sign picked up by a left-holdings derivative
    fn left_sign(self) -> f64 {
        match self {
            DerivativeOrder::First => -1.0,
            DerivativeOrder::Second => 1.0,
        }
    }
}

/// Impact as a function of execution rate
///
/// Implementations are immutable and shared between threads behind `Arc`.
pub trait ImpactFunction: Debug + Send + Sync {
    /// Impact at execution rate `rate`
    fn evaluate_rate(&self, rate: f64) -> f64;

    /// Rate derivative of the given order
    ///
    /// Fails with [`ExecutionError::NumericalDomain`] where the derivative is singular.
    fn derivative(&self, rate: f64, order: DerivativeOrder) -> Result<f64>;

    /// Get the function name for logging/debugging
    fn name(&self) -> &str;

    /// Impact of trading `trade_amount` over `duration`
    fn evaluate(&self, trade_amount: f64, duration: f64) -> Result<f64> {
        Ok(self.evaluate_rate(execution_rate(trade_amount, duration)?))
    }

    fn right_holdings_derivative(
        &self,
        trade_amount: f64,
        duration: f64,
        order: DerivativeOrder,
    ) -> Result<f64> {
        let rate = execution_rate(trade_amount, duration)?;
        Ok(self.derivative(rate, order)? / duration.powi(order.as_exponent()))
    }

    fn left_holdings_derivative(
        &self,
        trade_amount: f64,
        duration: f64,
        order: DerivativeOrder,
    ) -> Result<f64> {
        Ok(order.left_sign() * self.right_holdings_derivative(trade_amount, duration, order)?)
    }

    fn cross_holdings_derivative(&self, trade_amount: f64, duration: f64) -> Result<f64> {
        Ok(-self.right_holdings_derivative(trade_amount, duration, DerivativeOrder::Second)?)
    }
}

/// Sign with `sign(0) = 0`, keeping odd impact functions zero at rest
pub(crate) fn odd_sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn execution_rate(trade_amount: f64, duration: f64) -> Result<f64> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ExecutionError::InvalidInput {
            field: "duration",
            value: duration,
        });
    }
    if !trade_amount.is_finite() {
        return Err(ExecutionError::InvalidInput {
            field: "trade_amount",
            value: trade_amount,
        });
    }
    Ok(trade_amount / duration)
}
