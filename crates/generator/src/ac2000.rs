//! Almgren–Chriss (2000) Discrete Trajectory
//!
//! Linear permanent impact `γ`, linear temporary impact `ε sign(n) + η n/τ` and
//! an optional price drift `μ`, on a uniform partition `τ = T/N`.
//!
//! ```text
//! η̃    = η − ½ γ τ                       (must be positive)
//! κ̃²   = λ σ² / η̃
//! κ τ  = acosh(1 + κ̃² τ² / 2)
//! x̄    = μ / (2 λ σ²)
//! x_j  = x̄ + (X − x̄) sinh(κ(T − t_j)) / sinh(κT) − x̄ sinh(κ t_j) / sinh(κT)
//! ```
//!
//! Without risk aversion the schedule is the straight line. Cost moments are
//! evaluated through the slice engine so they agree with the numerical scheme.

use log::{debug, info};
use tranche_core::{ExecutionError, LinearImpactParameters, MeanVarianceObjective, Result};
use tranche_dynamics::TrajectoryControl;

use crate::generator::{TrajectoryGenerator, trajectory_moments};
use crate::trajectory::{Trajectory, TrajectoryCharacteristics};

/// `sinh(a) / sinh(b)` for `0 ≤ a ≤ b`, without overflow for large `b`
pub(crate) fn sinh_ratio(a: f64, b: f64) -> f64 {
    (a - b).exp() * (-2.0 * a).exp_m1() / (-2.0 * b).exp_m1()
}

/// Decay rates of the discrete solution
#[derive(Debug, Clone, Copy, PartialEq)]
struct DecayRates {
    kappa: f64,
    kappa_tilde: f64,
    effective_temporary_slope: f64,
    drift_target: f64,
}

/// Almgren–Chriss 2000 closed-form scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ac2000Generator {
    params: LinearImpactParameters,
}

impl Ac2000Generator {
    pub fn new(params: LinearImpactParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LinearImpactParameters {
        &self.params
    }

    /// `η̃ = η − ½γτ`
    pub fn effective_temporary_slope(&self, tau: f64) -> Result<f64> {
        let eta_tilde = self.params.temporary.slope() - 0.5 * self.params.permanent.slope() * tau;
        if eta_tilde > 0.0 {
            Ok(eta_tilde)
        } else {
            Err(ExecutionError::domain(
                "effective temporary impact",
                format!("η − ½γτ = {eta_tilde} is not positive for τ = {tau}"),
            ))
        }
    }

    fn decay_rates(&self, tau: f64, objective: &MeanVarianceObjective) -> Result<DecayRates> {
        let eta_tilde = self.effective_temporary_slope(tau)?;
        let sigma = self.params.market_core.volatility;
        let drift = self.params.market_core.drift;
        let risk_rate = objective.risk_aversion() * sigma * sigma;

        if risk_rate == 0.0 {
            if drift != 0.0 {
                return Err(ExecutionError::Unsupported(
                    "drift without risk aversion has no bounded optimum".into(),
                ));
            }
            return Ok(DecayRates {
                kappa: 0.0,
                kappa_tilde: 0.0,
                effective_temporary_slope: eta_tilde,
                drift_target: 0.0,
            });
        }

        let kappa_tilde_squared = risk_rate / eta_tilde;
        // acosh(1 + z²/2) = 2 asinh(z/2)
        let kappa_tau = 2.0 * (0.25 * kappa_tilde_squared * tau * tau).sqrt().asinh();

        Ok(DecayRates {
            kappa: kappa_tau / tau,
            kappa_tilde: kappa_tilde_squared.sqrt(),
            effective_temporary_slope: eta_tilde,
            drift_target: drift / (2.0 * risk_rate),
        })
    }

    fn holdings(&self, control: &TrajectoryControl, rates: &DecayRates) -> Vec<f64> {
        let x = control.start_holdings();
        let horizon = control.finish_time();
        let kappa_horizon = rates.kappa * horizon;

        if kappa_horizon == 0.0 || (-2.0 * kappa_horizon).exp_m1() == 0.0 {
            return control.linear_holdings();
        }

        let target = rates.drift_target;
        let mut holdings: Vec<f64> = control
            .time_nodes()
            .iter()
            .map(|t| {
                target + (x - target) * sinh_ratio(rates.kappa * (horizon - t), kappa_horizon)
                    - target * sinh_ratio(rates.kappa * t, kappa_horizon)
            })
            .collect();

        holdings[0] = x;
        if let Some(last) = holdings.last_mut() {
            *last = 0.0;
        }
        holdings
    }
}

impl TrajectoryGenerator for Ac2000Generator {
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory> {
        let tau = control.uniform_interval().ok_or_else(|| {
            ExecutionError::Unsupported("discrete closed form requires a uniform partition".into())
        })?;
        let rates = self.decay_rates(tau, objective)?;
        debug!(
            "AC2000 rates: κ={:.6e} κ̃={:.6e} η̃={:.6e} x̄={:.6e}",
            rates.kappa, rates.kappa_tilde, rates.effective_temporary_slope, rates.drift_target
        );

        let holdings = self.holdings(control, &rates);
        let moments = trajectory_moments(&self.params.evolution_parameters()?, control, &holdings)?;
        let expectation = moments.expectation.value();
        let variance = moments.variance.value();

        info!(
            "AC2000 trajectory: κ={:.6} E={:.6e} V={:.6e}",
            rates.kappa, expectation, variance
        );
        Trajectory::new(
            control,
            holdings,
            expectation,
            variance,
            TrajectoryCharacteristics::LinearDiscrete {
                kappa: rates.kappa,
                kappa_tilde: rates.kappa_tilde,
                half_life: 1.0 / rates.kappa,
                effective_temporary_slope: rates.effective_temporary_slope,
                drift_target: rates.drift_target,
            },
        )
    }

    fn name(&self) -> &str {
        "ac2000"
    }
}
