//! Unconstrained Descent
//!
//! Minimizes a smooth objective that reports its value, gradient and (optionally)
//! banded curvature.
//!
//! Each iteration:
//! 1. Newton direction `d = -H⁻¹∇f` when curvature is available, solvable and the
//!    result points downhill
//! 2. Steepest descent `d = -∇f` otherwise
//! 3. Backtracking line search along `d` (see [`crate::line_search`])
//!
//! A trial point whose evaluation fails with an error the objective marks as
//! [`DescentObjective::rejects_trial`] is treated as a rejected step. Failure at the
//! starting point is always fatal.
//!
//! Convergence is declared when `‖∇f‖∞ ≤ tol × (1 + |f|)`.

use log::{debug, warn};

use crate::error::NumericsError;
use crate::line_search::{LineSearchSettings, backtracking_search};
use crate::linalg::{SymmetricTridiagonal, dot, max_abs};

/// Objective value, gradient and optional banded curvature at one variate
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub gradient: Vec<f64>,
    pub curvature: Option<SymmetricTridiagonal>,
}

/// Objective interface for [`minimize`]
pub trait DescentObjective {
    type Error: From<NumericsError> + std::fmt::Display;

    /// Number of free variates
    fn dimension(&self) -> usize;

    fn evaluate(&self, variate: &[f64]) -> Result<Evaluation, Self::Error>;

    /// Whether `error` only means the variate lies outside the objective's domain
    fn rejects_trial(&self, _error: &Self::Error) -> bool {
        false
    }
}

/// Descent configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentSettings {
    pub max_iterations: usize,
    /// Relative gradient tolerance
    pub gradient_tolerance: f64,
    pub line_search: LineSearchSettings,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            gradient_tolerance: 1e-10,
            line_search: LineSearchSettings::default(),
        }
    }
}

/// Result of a descent run
#[derive(Debug, Clone, PartialEq)]
pub struct DescentOutcome {
    pub variate: Vec<f64>,
    pub evaluation: Evaluation,
    pub iterations: usize,
    pub converged: bool,
    /// Accepted steps that failed the Wolfe curvature check
    pub curvature_failures: usize,
}

impl DescentOutcome {
    pub fn gradient_norm(&self) -> f64 {
        max_abs(&self.evaluation.gradient)
    }
}

fn is_converged(evaluation: &Evaluation, tolerance: f64) -> bool {
    max_abs(&evaluation.gradient) <= tolerance * (1.0 + evaluation.value.abs())
}

fn search_direction(evaluation: &Evaluation) -> Vec<f64> {
    let steepest: Vec<f64> = evaluation.gradient.iter().map(|g| -g).collect();

    let Some(curvature) = &evaluation.curvature else {
        return steepest;
    };

    match curvature.solve(&steepest) {
        Ok(newton) => match dot(&newton, &evaluation.gradient) {
            Ok(slope) if slope < 0.0 => newton,
            _ => {
                debug!("Newton direction is not downhill, using steepest descent");
                steepest
            }
        },
        Err(e) => {
            debug!("Newton system not solvable ({e}), using steepest descent");
            steepest
        }
    }
}

/// Minimize `objective` starting from `start`
pub fn minimize<O: DescentObjective>(
    objective: &O,
    start: Vec<f64>,
    settings: &DescentSettings,
) -> Result<DescentOutcome, O::Error> {
    if start.len() != objective.dimension() {
        return Err(NumericsError::DimensionMismatch {
            expected: objective.dimension(),
            actual: start.len(),
        }
        .into());
    }
    if !(settings.gradient_tolerance.is_finite() && settings.gradient_tolerance > 0.0) {
        return Err(NumericsError::InvalidSetting {
            name: "gradient_tolerance",
            value: settings.gradient_tolerance,
        }
        .into());
    }

    let mut variate = start;
    let mut evaluation = objective.evaluate(&variate)?;
    if !evaluation.value.is_finite() {
        return Err(NumericsError::NonFinite("objective at starting point").into());
    }

    let mut curvature_failures = 0;

    for iteration in 0..settings.max_iterations {
        if variate.is_empty() || is_converged(&evaluation, settings.gradient_tolerance) {
            debug!(
                "Descent converged after {iteration} iterations (value={:.6e})",
                evaluation.value
            );
            return Ok(DescentOutcome {
                variate,
                evaluation,
                iterations: iteration,
                converged: true,
                curvature_failures,
            });
        }

        let direction = search_direction(&evaluation);
        let Some(step) = backtracking_search(
            |x: &[f64]| match objective.evaluate(x) {
                Ok(evaluation) => Ok(Some(evaluation)),
                Err(e) if objective.rejects_trial(&e) => {
                    debug!("Trial point rejected: {e}");
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            &variate,
            &direction,
            &evaluation,
            &settings.line_search,
        )?
        else {
            warn!(
                "Descent stopped at iteration {iteration}: no sufficient decrease along search direction"
            );
            return Ok(DescentOutcome {
                variate,
                evaluation,
                iterations: iteration,
                converged: false,
                curvature_failures,
            });
        };

        if !step.curvature_satisfied {
            curvature_failures += 1;
        }
        debug!(
            "Descent iteration {iteration}: step={:.3e} backtracks={} value={:.6e}",
            step.step_length, step.backtracks, step.evaluation.value
        );

        variate = step.variate;
        evaluation = step.evaluation;
    }

    let converged = is_converged(&evaluation, settings.gradient_tolerance);
    if !converged {
        warn!(
            "Descent hit the iteration cap ({}) with gradient norm {:.3e}",
            settings.max_iterations,
            max_abs(&evaluation.gradient)
        );
    }

    Ok(DescentOutcome {
        variate,
        evaluation,
        iterations: settings.max_iterations,
        converged,
        curvature_failures,
    })
}
