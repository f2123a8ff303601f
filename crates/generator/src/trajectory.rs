//! Trajectory result
//!
//! Holdings and trades on the control's time nodes, the cost moments of the
//! schedule, and scheme-specific characteristic scales.

use serde::Serialize;
use tranche_core::{ExecutionError, MeanVarianceObjective, Result, ensure_finite};
use tranche_dynamics::TrajectoryControl;

const UNIT_EXPONENT_TOLERANCE: f64 = 1e-12;

/// Continuous Almgren 2003 holdings curve `x(t)`
///
/// ```text
/// k < 1:  X (1 + (1-k) t / ((1+k) T*))^(-(1+k)/(1-k))
/// k = 1:  X e^(-t/T*)
/// k > 1:  X (1 - (k-1) t / ((k+1) T*))^((k+1)/(k-1))   (zero beyond T_max)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerLawHoldings {
    start_holdings: f64,
    characteristic_time: f64,
    exponent: f64,
}

impl PowerLawHoldings {
    pub fn new(start_holdings: f64, characteristic_time: f64, exponent: f64) -> Result<Self> {
        ensure_finite("start_holdings", start_holdings)?;
        if !(characteristic_time.is_finite() && characteristic_time > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "characteristic_time",
                value: characteristic_time,
            });
        }
        if !(exponent.is_finite() && exponent > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "exponent",
                value: exponent,
            });
        }
        Ok(Self {
            start_holdings,
            characteristic_time,
            exponent,
        })
    }

    pub fn start_holdings(&self) -> f64 {
        self.start_holdings
    }

    pub fn characteristic_time(&self) -> f64 {
        self.characteristic_time
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    fn is_linear(&self) -> bool {
        (self.exponent - 1.0).abs() < UNIT_EXPONENT_TOLERANCE
    }

    /// Holdings remaining at time `t ≥ 0`
    pub fn holdings_at(&self, t: f64) -> Result<f64> {
        if !(t.is_finite() && t >= 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "time",
                value: t,
            });
        }
        let (x, t_star, k) = (self.start_holdings, self.characteristic_time, self.exponent);

        if self.is_linear() {
            return Ok(x * (-t / t_star).exp());
        }
        if k < 1.0 {
            let base = 1.0 + (1.0 - k) * t / ((1.0 + k) * t_star);
            return Ok(x * base.powf(-(1.0 + k) / (1.0 - k)));
        }

        let base = 1.0 - (k - 1.0) * t / ((k + 1.0) * t_star);
        if base <= 0.0 {
            return Ok(0.0);
        }
        Ok(x * base.powf((k + 1.0) / (k - 1.0)))
    }

    /// Time at which holdings reach zero; NaN for `k ≤ 1` (never reached)
    pub fn maximum_execution_time(&self) -> f64 {
        let k = self.exponent;
        if k > 1.0 && !self.is_linear() {
            (k + 1.0) / (k - 1.0) * self.characteristic_time
        } else {
            f64::NAN
        }
    }

    /// Time for holdings to halve
    pub fn half_life(&self) -> f64 {
        let (t_star, k) = (self.characteristic_time, self.exponent);
        if self.is_linear() {
            t_star * std::f64::consts::LN_2
        } else if k > 1.0 {
            (k + 1.0) * t_star / (k - 1.0) * (1.0 - 2.0_f64.powf(-(k - 1.0) / (k + 1.0)))
        } else {
            (1.0 + k) * t_star / (1.0 - k) * (2.0_f64.powf((1.0 - k) / (1.0 + k)) - 1.0)
        }
    }
}

/// Scheme-specific characteristic scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum TrajectoryCharacteristics {
    /// Almgren 2003 continuous power-law solution
    PowerLaw {
        characteristic_time: f64,
        /// Order size whose characteristic time equals the horizon; NaN for `k = 1`
        characteristic_size: f64,
        /// NaN for `k ≤ 1`
        maximum_execution_time: f64,
        half_life: f64,
        hyperboloid_boundary_value: f64,
        holdings_curve: PowerLawHoldings,
    },
    /// Almgren–Chriss 2000 discrete linear-impact solution
    LinearDiscrete {
        kappa: f64,
        kappa_tilde: f64,
        /// `1/κ`; infinite for the risk-neutral straight line
        half_life: f64,
        effective_temporary_slope: f64,
        /// `μ / (2λσ²)`; zero without drift
        drift_target: f64,
    },
    /// Almgren 2003 trading-enhanced risk
    TradingEnhanced {
        characteristic_time: f64,
        /// NaN when the execution price volatility does not grow with rate
        characteristic_size: f64,
        /// Part of the variance due to the execution price volatility
        enhanced_variance: f64,
        /// Zero for the continuous closed form
        iterations: usize,
        converged: bool,
    },
    /// Numerical descent on the aggregated sensitivities
    Numerical {
        iterations: usize,
        converged: bool,
        objective_value: f64,
        gradient_norm: f64,
        curvature_failures: usize,
    },
}

/// Optimal schedule on a set of time nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    time_nodes: Vec<f64>,
    holdings: Vec<f64>,
    trades: Vec<f64>,
    transaction_cost_expectation: f64,
    transaction_cost_variance: f64,
    characteristics: TrajectoryCharacteristics,
}

impl Trajectory {
    pub fn new(
        control: &TrajectoryControl,
        holdings: Vec<f64>,
        transaction_cost_expectation: f64,
        transaction_cost_variance: f64,
        characteristics: TrajectoryCharacteristics,
    ) -> Result<Self> {
        let trades = control.trades(&holdings)?;
        ensure_finite("transaction_cost_expectation", transaction_cost_expectation)?;
        if !(transaction_cost_variance.is_finite() && transaction_cost_variance >= 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "transaction_cost_variance",
                value: transaction_cost_variance,
            });
        }

        Ok(Self {
            time_nodes: control.time_nodes().to_vec(),
            holdings,
            trades,
            transaction_cost_expectation,
            transaction_cost_variance,
            characteristics,
        })
    }

    pub fn time_nodes(&self) -> &[f64] {
        &self.time_nodes
    }

    pub fn holdings(&self) -> &[f64] {
        &self.holdings
    }

    /// `hᵢ₊₁ - hᵢ`, negative for sells
    pub fn trades(&self) -> &[f64] {
        &self.trades
    }

    pub fn transaction_cost_expectation(&self) -> f64 {
        self.transaction_cost_expectation
    }

    pub fn transaction_cost_variance(&self) -> f64 {
        self.transaction_cost_variance
    }

    pub fn characteristics(&self) -> &TrajectoryCharacteristics {
        &self.characteristics
    }

    pub fn objective_value(&self, objective: &MeanVarianceObjective) -> f64 {
        objective.evaluate(
            self.transaction_cost_expectation,
            self.transaction_cost_variance,
        )
    }

    pub fn is_monotone(&self) -> bool {
        let sign = self.trades.iter().find(|t| **t != 0.0).map(|t| t.signum());
        match sign {
            Some(s) => self.trades.iter().all(|t| t * s >= 0.0),
            None => true,
        }
    }
}
