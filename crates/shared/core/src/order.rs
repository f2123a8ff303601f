//! Parent order and risk objective

use serde::Serialize;

use crate::error::{ExecutionError, Result, ensure_finite};

/// Parent order: liquidate `start_holdings` by `finish_time`
///
/// Positive holdings are a long position being sold; negative holdings a short
/// being bought back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderSpecification {
    start_holdings: f64,
    finish_time: f64,
}

impl OrderSpecification {
    pub fn new(start_holdings: f64, finish_time: f64) -> Result<Self> {
        ensure_finite("start_holdings", start_holdings)?;
        if !(finish_time.is_finite() && finish_time > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "finish_time",
                value: finish_time,
            });
        }
        Ok(Self {
            start_holdings,
            finish_time,
        })
    }

    pub fn start_holdings(&self) -> f64 {
        self.start_holdings
    }

    pub fn finish_time(&self) -> f64 {
        self.finish_time
    }
}

/// `E[cost] + λ·Var[cost]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanVarianceObjective {
    risk_aversion: f64,
}

impl MeanVarianceObjective {
    pub fn new(risk_aversion: f64) -> Result<Self> {
        if !(risk_aversion.is_finite() && risk_aversion >= 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "risk_aversion",
                value: risk_aversion,
            });
        }
        Ok(Self { risk_aversion })
    }

    pub fn risk_neutral() -> Self {
        Self { risk_aversion: 0.0 }
    }

    pub fn risk_aversion(&self) -> f64 {
        self.risk_aversion
    }

    pub fn evaluate(&self, mean: f64, variance: f64) -> f64 {
        mean + self.risk_aversion * variance
    }
}
