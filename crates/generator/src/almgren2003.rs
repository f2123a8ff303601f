//! Almgren (2003) Power-Law Trajectory
//!
//! Continuous-time optimal liquidation with linear permanent impact `γ`, power-law
//! temporary impact `η |v|^k` and no drift. The Euler–Lagrange equation of
//! `E + λV` has the closed-form solution parametrized by the characteristic time
//!
//! ```text
//! T* = (k η X^(k-1) / (λ σ²))^(1/(k+1))
//! ```
//!
//! with cost moments
//!
//! ```text
//! E = ½ γ X² + (k+1)/(3k+1) · η · (X/T*)^(k+1) · T*
//! V = (k+1)/(3k+1) · σ² · T* · X²
//! ```
//!
//! Holdings are sampled from the continuous curve on the control's time nodes.
//! For `k > 1` the curve reaches zero at `T_max = (k+1)/(k-1) · T*`; for `k ≤ 1` it
//! only decays asymptotically and the schedule is truncated at the horizon.

use log::info;
use tranche_core::{ExecutionError, MeanVarianceObjective, PowerLawImpactParameters, Result};
use tranche_dynamics::TrajectoryControl;

use crate::generator::TrajectoryGenerator;
use crate::trajectory::{PowerLawHoldings, Trajectory, TrajectoryCharacteristics};

const UNIT_EXPONENT_TOLERANCE: f64 = 1e-12;

// ============================================================================
// Closed-form relations
// ============================================================================

/// `(k+1)/(3k+1)`, the shape factor shared by E, V and the hyperboloid boundary
fn shape_factor(k: f64) -> f64 {
    (k + 1.0) / (3.0 * k + 1.0)
}

/// Almgren 2003 closed-form scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Almgren2003Generator {
    params: PowerLawImpactParameters,
}

impl Almgren2003Generator {
    pub fn new(params: PowerLawImpactParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PowerLawImpactParameters {
        &self.params
    }

    fn exponent(&self) -> f64 {
        self.params.temporary().exponent()
    }

    /// `λσ²`, which must be strictly positive for a finite characteristic time
    fn risk_rate(&self, objective: &MeanVarianceObjective) -> Result<f64> {
        let sigma = self.params.volatility();
        let risk_rate = objective.risk_aversion() * sigma * sigma;
        if risk_rate > 0.0 {
            Ok(risk_rate)
        } else {
            Err(ExecutionError::Unsupported(
                "power-law closed form requires positive risk aversion and volatility".into(),
            ))
        }
    }

    /// `T*` for an order of `start_holdings`
    pub fn characteristic_time(
        &self,
        start_holdings: f64,
        objective: &MeanVarianceObjective,
    ) -> Result<f64> {
        let size = start_holdings.abs();
        if size == 0.0 {
            return Err(ExecutionError::InvalidInput {
                field: "start_holdings",
                value: start_holdings,
            });
        }
        let k = self.exponent();
        let eta = self.params.temporary().constant();

        let ratio = k * eta * size.powf(k - 1.0) / self.risk_rate(objective)?;
        let t_star = ratio.powf(1.0 / (k + 1.0));
        if !(t_star.is_finite() && t_star > 0.0) {
            return Err(ExecutionError::domain(
                "almgren 2003 characteristic time",
                format!("T* = {t_star} for X = {start_holdings}"),
            ));
        }
        Ok(t_star)
    }

    /// Order size whose `T*` equals `horizon`; NaN for `k = 1` where `T*` is size-free
    pub fn characteristic_size(
        &self,
        horizon: f64,
        objective: &MeanVarianceObjective,
    ) -> Result<f64> {
        let k = self.exponent();
        if (k - 1.0).abs() < UNIT_EXPONENT_TOLERANCE {
            return Ok(f64::NAN);
        }
        let eta = self.params.temporary().constant();
        let ratio = self.risk_rate(objective)? * horizon.powf(k + 1.0) / (k * eta);
        Ok(ratio.powf(1.0 / (k - 1.0)))
    }

    pub fn transaction_cost_expectation(&self, start_holdings: f64, characteristic_time: f64) -> f64 {
        let k = self.exponent();
        let gamma = self.params.permanent().slope();
        let eta = self.params.temporary().constant();
        let size = start_holdings.abs();

        0.5 * gamma * start_holdings * start_holdings
            + shape_factor(k) * eta * (size / characteristic_time).powf(k + 1.0) * characteristic_time
    }

    pub fn transaction_cost_variance(&self, start_holdings: f64, characteristic_time: f64) -> f64 {
        let sigma = self.params.volatility();
        shape_factor(self.exponent())
            * sigma
            * sigma
            * characteristic_time
            * start_holdings
            * start_holdings
    }

    /// `E_temp·V^k` along the efficient frontier, where `E_temp` is the temporary-impact
    /// part of `E` (the `½γX²` permanent cost is excluded); constant for a given order size
    pub fn hyperboloid_boundary_value(&self, start_holdings: f64) -> f64 {
        let k = self.exponent();
        let eta = self.params.temporary().constant();
        shape_factor(k).powf(k + 1.0)
            * eta
            * self.params.volatility().powf(2.0 * k)
            * start_holdings.abs().powf(3.0 * k + 1.0)
    }

    pub fn holdings_curve(
        &self,
        start_holdings: f64,
        objective: &MeanVarianceObjective,
    ) -> Result<PowerLawHoldings> {
        PowerLawHoldings::new(
            start_holdings,
            self.characteristic_time(start_holdings, objective)?,
            self.exponent(),
        )
    }
}

impl TrajectoryGenerator for Almgren2003Generator {
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory> {
        let x = control.start_holdings();
        let curve = self.holdings_curve(x, objective)?;
        let t_star = curve.characteristic_time();

        let holdings = control
            .time_nodes()
            .iter()
            .map(|t| curve.holdings_at(*t))
            .collect::<Result<Vec<_>>>()?;

        let expectation = self.transaction_cost_expectation(x, t_star);
        let variance = self.transaction_cost_variance(x, t_star);
        let characteristics = TrajectoryCharacteristics::PowerLaw {
            characteristic_time: t_star,
            characteristic_size: self.characteristic_size(control.finish_time(), objective)?,
            maximum_execution_time: curve.maximum_execution_time(),
            half_life: curve.half_life(),
            hyperboloid_boundary_value: self.hyperboloid_boundary_value(x),
            holdings_curve: curve,
        };

        info!(
            "Almgren 2003 trajectory: k={} T*={:.6} E={:.6e} V={:.6e}",
            self.exponent(),
            t_star,
            expectation,
            variance
        );
        Trajectory::new(control, holdings, expectation, variance, characteristics)
    }

    fn name(&self) -> &str {
        "almgren_2003"
    }
}
