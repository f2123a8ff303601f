//! Almgren 2003 Trading-Enhanced Risk
//!
//! Linear temporary impact `ε sgn(v) + η v` whose execution price volatility grows
//! with the trading rate, `α + β|v|`. Over a schedule `x(t)` with rate `v = -ẋ`:
//!
//! ```text
//! E = ε|X| + η ∫ v² dt
//! V = σ² ∫ x² dt + ∫ (α + β|v|)² v² dt
//! ```
//!
//! With `β = 0` the enhanced term only raises the effective temporary slope to
//! `η + λα²` and the continuous solution is the hyperbolic-sine curve
//! `X sinh(κ(T-t)) / sinh(κT)`, `κ² = λσ² / (η + λα²)`. With `β > 0` the
//! Euler–Lagrange equation is no longer linear and the schedule is found by descent on the nodes
//! of the control, the integrals discretized per interval.

use log::{debug, info, warn};
use tranche_core::{
    ExecutionError, MeanVarianceObjective, Result, TradingEnhancedVolatilityParameters,
};
use tranche_dynamics::TrajectoryControl;
use tranche_numerics::{
    DescentObjective, DescentSettings, Evaluation, SymmetricTridiagonal, minimize,
};

use crate::ac2000::sinh_ratio;
use crate::generator::TrajectoryGenerator;
use crate::trajectory::{Trajectory, TrajectoryCharacteristics};

/// `sqrt(η / λσ²)`; infinite without risk aversion
fn characteristic_time(params: &TradingEnhancedVolatilityParameters, risk_aversion: f64) -> f64 {
    let sigma = params.volatility();
    (params.temporary().slope() / (risk_aversion * sigma * sigma)).sqrt()
}

// ============================================================================
// Constant execution price volatility
// ============================================================================

/// Continuous closed form for a rate-independent execution price volatility `α`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantTradingEnhancedGenerator {
    params: TradingEnhancedVolatilityParameters,
}

impl ConstantTradingEnhancedGenerator {
    pub fn new(params: TradingEnhancedVolatilityParameters) -> Result<Self> {
        if params.volatility_slope() != 0.0 {
            return Err(ExecutionError::Unsupported(format!(
                "constant trading-enhanced scheme needs β = 0, got {}",
                params.volatility_slope()
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &TradingEnhancedVolatilityParameters {
        &self.params
    }

    /// `η + λα²`
    pub fn effective_temporary_slope(&self, objective: &MeanVarianceObjective) -> f64 {
        let alpha = self.params.volatility_offset();
        self.params.temporary().slope() + objective.risk_aversion() * alpha * alpha
    }

    /// `1/κ`; infinite for a risk-neutral or riskless order
    pub fn characteristic_time(&self, objective: &MeanVarianceObjective) -> f64 {
        let sigma = self.params.volatility();
        (self.effective_temporary_slope(objective) / (objective.risk_aversion() * sigma * sigma))
            .sqrt()
    }
}

impl TrajectoryGenerator for ConstantTradingEnhancedGenerator {
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory> {
        let x = control.start_holdings();
        let horizon = control.finish_time();
        let t_star = self.characteristic_time(objective);

        // ∫ v² dt and ∫ x² dt over the continuous schedule
        let (holdings, rate_integral, holdings_integral) = if t_star.is_finite() {
            let kappa = 1.0 / t_star;
            let u = kappa * horizon;
            let holdings: Vec<f64> = control
                .time_nodes()
                .iter()
                .map(|t| x * sinh_ratio(kappa * (horizon - t), u))
                .collect();
            let coth = 1.0 / u.tanh();
            let edge = horizon / (2.0 * u.sinh().powi(2));
            (
                holdings,
                x * x * kappa * kappa * (edge + coth / (2.0 * kappa)),
                x * x * (coth / (2.0 * kappa) - edge),
            )
        } else {
            (
                control.linear_holdings(),
                x * x / horizon,
                x * x * horizon / 3.0,
            )
        };

        let temporary = self.params.temporary();
        let alpha = self.params.volatility_offset();
        let sigma = self.params.volatility();
        let expectation = temporary.offset() * x.abs() + temporary.slope() * rate_integral;
        let enhanced_variance = alpha * alpha * rate_integral;
        let variance = sigma * sigma * holdings_integral + enhanced_variance;

        info!(
            "Constant trading-enhanced trajectory: α={} T*={:.6} E={:.6e} V={:.6e}",
            alpha, t_star, expectation, variance
        );
        Trajectory::new(
            control,
            holdings,
            expectation,
            variance,
            TrajectoryCharacteristics::TradingEnhanced {
                characteristic_time: t_star,
                characteristic_size: f64::NAN,
                enhanced_variance,
                iterations: 0,
                converged: true,
            },
        )
    }

    fn name(&self) -> &str {
        "constant_trading_enhanced"
    }
}

// ============================================================================
// Linear execution price volatility
// ============================================================================

/// `(α + β|v|)² v²` with its first and second rate derivatives
fn enhanced_variance_rate(alpha: f64, beta: f64, rate: f64) -> (f64, f64, f64) {
    let speed = rate.abs();
    let value = (alpha + beta * speed).powi(2) * rate * rate;
    let first = 2.0 * alpha * alpha * rate
        + 6.0 * alpha * beta * speed * rate
        + 4.0 * beta * beta * rate * rate * rate;
    let second =
        2.0 * alpha * alpha + 12.0 * alpha * beta * speed + 12.0 * beta * beta * rate * rate;
    (value, first, second)
}

/// Discretized cost moments of one schedule
#[derive(Debug, Clone, Copy, PartialEq)]
struct DiscreteMoments {
    expectation: f64,
    market_variance: f64,
    enhanced_variance: f64,
}

impl DiscreteMoments {
    fn variance(&self) -> f64 {
        self.market_variance + self.enhanced_variance
    }
}

/// Interior holdings problem; interval `i` runs from node `i` to node `i + 1`
struct EnhancedRiskProblem<'a> {
    params: &'a TradingEnhancedVolatilityParameters,
    control: &'a TrajectoryControl,
    risk_aversion: f64,
}

impl EnhancedRiskProblem<'_> {
    fn full_holdings(&self, interior: &[f64]) -> Vec<f64> {
        let mut holdings = Vec::with_capacity(interior.len() + 2);
        holdings.push(self.control.start_holdings());
        holdings.extend_from_slice(interior);
        holdings.push(0.0);
        holdings
    }

    fn moments(&self, holdings: &[f64]) -> DiscreteMoments {
        let temporary = self.params.temporary();
        let (alpha, beta) = (self.params.volatility_offset(), self.params.volatility_slope());
        let variance_rate = self.params.volatility() * self.params.volatility();

        let mut moments = DiscreteMoments {
            expectation: 0.0,
            market_variance: 0.0,
            enhanced_variance: 0.0,
        };
        for (h, dt) in holdings.windows(2).zip(self.control.intervals()) {
            let sold = h[0] - h[1];
            let (enhanced, _, _) = enhanced_variance_rate(alpha, beta, sold / dt);
            moments.expectation +=
                temporary.offset() * sold.abs() + temporary.slope() * sold * sold / dt;
            moments.market_variance += variance_rate * dt * h[1] * h[1];
            moments.enhanced_variance += dt * enhanced;
        }
        moments
    }
}

impl DescentObjective for EnhancedRiskProblem<'_> {
    type Error = ExecutionError;

    fn dimension(&self) -> usize {
        self.control.node_count() - 2
    }

    fn evaluate(&self, variate: &[f64]) -> Result<Evaluation> {
        let holdings = self.full_holdings(variate);
        let nodes = holdings.len();
        let temporary = self.params.temporary();
        let (alpha, beta) = (self.params.volatility_offset(), self.params.volatility_slope());
        let lambda = self.risk_aversion;
        let risk_rate = lambda * self.params.volatility() * self.params.volatility();

        let mut gradient = vec![0.0; nodes];
        let mut hessian = SymmetricTridiagonal::zeros(nodes);
        for (i, (h, dt)) in holdings.windows(2).zip(self.control.intervals()).enumerate() {
            let sold = h[0] - h[1];
            let (_, first, second) = enhanced_variance_rate(alpha, beta, sold / dt);
            let direction = if sold == 0.0 { 0.0 } else { sold.signum() };

            let slope = temporary.offset() * direction
                + 2.0 * temporary.slope() * sold / dt
                + lambda * first;
            gradient[i] += slope;
            gradient[i + 1] += 2.0 * risk_rate * dt * h[1] - slope;

            let curvature = (2.0 * temporary.slope() + lambda * second) / dt;
            hessian.add_block(
                i,
                &[
                    [curvature, -curvature],
                    [-curvature, curvature + 2.0 * risk_rate * dt],
                ],
            )?;
        }

        let moments = self.moments(&holdings);
        let interior = nodes - 2;
        Ok(Evaluation {
            value: moments.expectation + lambda * moments.variance(),
            gradient: gradient[1..=interior].to_vec(),
            curvature: Some(if interior == 0 {
                SymmetricTridiagonal::zeros(0)
            } else {
                hessian.principal_block(1, interior)?
            }),
        })
    }
}

/// Discrete scheme for an execution price volatility `α + β|v|`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTradingEnhancedGenerator {
    params: TradingEnhancedVolatilityParameters,
    settings: DescentSettings,
}

impl LinearTradingEnhancedGenerator {
    pub fn new(params: TradingEnhancedVolatilityParameters) -> Self {
        Self {
            params,
            settings: DescentSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DescentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn params(&self) -> &TradingEnhancedVolatilityParameters {
        &self.params
    }

    /// `sqrt(η / λσ²)`, the time scale of the rate-independent part
    pub fn characteristic_time(&self, objective: &MeanVarianceObjective) -> f64 {
        characteristic_time(&self.params, objective.risk_aversion())
    }

    /// Order size `η / (λσβ)` beyond which the enhanced volatility dominates the
    /// temporary cost at the characteristic rate; NaN for `β = 0`
    pub fn characteristic_size(&self, objective: &MeanVarianceObjective) -> f64 {
        let denominator =
            objective.risk_aversion() * self.params.volatility() * self.params.volatility_slope();
        if denominator > 0.0 {
            self.params.temporary().slope() / denominator
        } else {
            f64::NAN
        }
    }
}

impl TrajectoryGenerator for LinearTradingEnhancedGenerator {
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory> {
        let problem = EnhancedRiskProblem {
            params: &self.params,
            control,
            risk_aversion: objective.risk_aversion(),
        };
        let linear = control.linear_holdings();
        let start = linear[1..linear.len() - 1].to_vec();

        let outcome = minimize(&problem, start, &self.settings)?;
        if !outcome.converged {
            warn!(
                "Trading-enhanced scheme stopped after {} iterations with gradient norm {:.3e}",
                outcome.iterations,
                outcome.gradient_norm()
            );
        }
        debug!(
            "Trading-enhanced descent: {} curvature failures",
            outcome.curvature_failures
        );

        let holdings = problem.full_holdings(&outcome.variate);
        let moments = problem.moments(&holdings);
        let t_star = self.characteristic_time(objective);
        info!(
            "Linear trading-enhanced trajectory: β={} T*={:.6} E={:.6e} V={:.6e}",
            self.params.volatility_slope(),
            t_star,
            moments.expectation,
            moments.variance()
        );

        Trajectory::new(
            control,
            holdings,
            moments.expectation,
            moments.variance(),
            TrajectoryCharacteristics::TradingEnhanced {
                characteristic_time: t_star,
                characteristic_size: self.characteristic_size(objective),
                enhanced_variance: moments.enhanced_variance,
                iterations: outcome.iterations,
                converged: outcome.converged,
            },
        )
    }

    fn name(&self) -> &str {
        "linear_trading_enhanced"
    }
}
