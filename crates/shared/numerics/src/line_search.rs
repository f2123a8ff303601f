//! Line Search
//!
//! Step-length selection along a descent direction.
//!
//! A trial step `x + α·d` is accepted when it satisfies the Armijo sufficient-decrease
//! condition
//!
//! ```text
//! f(x + α·d) ≤ f(x) + c₁·α·∇f(x)ᵀd
//! ```
//!
//! The Wolfe curvature condition is then checked on the accepted step (weak form
//! `∇f(x + α·d)ᵀd ≥ c₂·∇f(x)ᵀd`, strong form on absolute values) and reported
//! alongside the step; backtracking alone cannot repair a curvature failure.

use log::debug;

use crate::descent::Evaluation;
use crate::error::{NumericsError, NumericsResult};
use crate::linalg::dot;

/// Backtracking line search settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchSettings {
    /// First trial step length (1.0 is the natural Newton step)
    pub initial_step: f64,
    /// Step contraction factor applied after each rejection, in (0, 1)
    pub contraction: f64,
    /// Armijo parameter c₁
    pub sufficient_decrease: f64,
    /// Wolfe curvature parameter c₂, with c₁ < c₂ < 1
    pub curvature: f64,
    /// Apply the strong curvature criterion
    pub strong_curvature: bool,
    /// Maximum number of contractions before giving up
    pub max_backtracks: usize,
}

impl Default for LineSearchSettings {
    fn default() -> Self {
        Self {
            initial_step: 1.0,
            contraction: 0.5,
            sufficient_decrease: 1e-4,
            curvature: 0.9,
            strong_curvature: false,
            max_backtracks: 60,
        }
    }
}

impl LineSearchSettings {
    pub fn validate(&self) -> NumericsResult<()> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(NumericsError::InvalidSetting {
                name: "initial_step",
                value: self.initial_step,
            });
        }
        if !(self.contraction > 0.0 && self.contraction < 1.0) {
            return Err(NumericsError::InvalidSetting {
                name: "contraction",
                value: self.contraction,
            });
        }
        if !(self.sufficient_decrease > 0.0 && self.sufficient_decrease < 1.0) {
            return Err(NumericsError::InvalidSetting {
                name: "sufficient_decrease",
                value: self.sufficient_decrease,
            });
        }
        if !(self.curvature > self.sufficient_decrease && self.curvature < 1.0) {
            return Err(NumericsError::InvalidSetting {
                name: "curvature",
                value: self.curvature,
            });
        }
        Ok(())
    }
}

/// Armijo sufficient-decrease criterion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SufficientDecreaseVerifier {
    parameter: f64,
}

impl SufficientDecreaseVerifier {
    pub fn new(parameter: f64) -> Self {
        Self { parameter }
    }

    /// `directional_derivative` is `∇f(x)ᵀd` at the current variate
    pub fn verify(
        &self,
        current_value: f64,
        next_value: f64,
        step_length: f64,
        directional_derivative: f64,
    ) -> bool {
        next_value.is_finite()
            && next_value <= current_value + self.parameter * step_length * directional_derivative
    }
}

/// Wolfe curvature criterion (weak or strong)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvatureVerifier {
    parameter: f64,
    strong: bool,
}

impl CurvatureVerifier {
    pub fn new(parameter: f64, strong: bool) -> Self {
        Self { parameter, strong }
    }

    pub fn verify(
        &self,
        direction: &[f64],
        current_gradient: &[f64],
        next_gradient: &[f64],
    ) -> NumericsResult<bool> {
        let next_increment = dot(direction, next_gradient)?;
        let parametrized_current = self.parameter * dot(direction, current_gradient)?;

        Ok(if self.strong {
            next_increment.abs() <= parametrized_current.abs()
        } else {
            next_increment >= parametrized_current
        })
    }
}

/// Accepted line search step
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchStep {
    pub step_length: f64,
    pub variate: Vec<f64>,
    pub evaluation: Evaluation,
    pub curvature_satisfied: bool,
    pub backtracks: usize,
}

/// Backtrack from `settings.initial_step` until the Armijo condition holds
///
/// `evaluate` returns `Ok(None)` for a trial point outside the objective's domain;
/// that trial is rejected and the step contracted like any other Armijo failure.
/// Returns `Ok(None)` when no trial step achieves sufficient decrease within
/// `max_backtracks` contractions. Errors from `evaluate` are propagated unchanged.
pub fn backtracking_search<E, F>(
    mut evaluate: F,
    variate: &[f64],
    direction: &[f64],
    current: &Evaluation,
    settings: &LineSearchSettings,
) -> Result<Option<LineSearchStep>, E>
where
    E: From<NumericsError>,
    F: FnMut(&[f64]) -> Result<Option<Evaluation>, E>,
{
    settings.validate()?;
    if direction.len() != variate.len() {
        return Err(NumericsError::DimensionMismatch {
            expected: variate.len(),
            actual: direction.len(),
        }
        .into());
    }

    let directional_derivative = dot(direction, &current.gradient)?;
    if !(directional_derivative < 0.0) {
        return Err(NumericsError::LineSearchFailed(format!(
            "direction is not a descent direction (slope {directional_derivative})"
        ))
        .into());
    }

    let armijo = SufficientDecreaseVerifier::new(settings.sufficient_decrease);
    let curvature = CurvatureVerifier::new(settings.curvature, settings.strong_curvature);

    let mut step_length = settings.initial_step;
    for backtracks in 0..=settings.max_backtracks {
        let trial: Vec<f64> = variate
            .iter()
            .zip(direction)
            .map(|(x, d)| x + step_length * d)
            .collect();
        let Some(evaluation) = evaluate(&trial)? else {
            debug!("Trial step {step_length:.3e} outside the objective domain, contracting");
            step_length *= settings.contraction;
            continue;
        };

        if armijo.verify(
            current.value,
            evaluation.value,
            step_length,
            directional_derivative,
        ) {
            let curvature_satisfied =
                curvature.verify(direction, &current.gradient, &evaluation.gradient)?;
            return Ok(Some(LineSearchStep {
                step_length,
                variate: trial,
                evaluation,
                curvature_satisfied,
                backtracks,
            }));
        }

        step_length *= settings.contraction;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parabola(x: &[f64]) -> NumericsResult<Option<Evaluation>> {
        Ok(Some(Evaluation {
            value: x.iter().map(|v| v * v).sum(),
            gradient: x.iter().map(|v| 2.0 * v).collect(),
            curvature: None,
        }))
    }

    #[test]
    fn test_armijo_verifier() {
        let verifier = SufficientDecreaseVerifier::new(0.5);
        assert!(verifier.verify(10.0, 4.0, 1.0, -10.0));
        assert!(!verifier.verify(10.0, 6.0, 1.0, -10.0));
        assert!(!verifier.verify(10.0, f64::NAN, 1.0, -10.0));
    }

    #[test]
    fn test_curvature_verifier_weak_and_strong() {
        let direction = [-1.0];
        let weak = CurvatureVerifier::new(0.9, false);
        let strong = CurvatureVerifier::new(0.9, true);

        // Overshoot: slope flips sign and grows
        assert!(weak.verify(&direction, &[2.0], &[-3.0]).unwrap());
        assert!(!strong.verify(&direction, &[2.0], &[-3.0]).unwrap());

        // Exact minimizer
        assert!(strong.verify(&direction, &[2.0], &[0.0]).unwrap());
    }

    #[test]
    fn test_full_step_accepted_on_newton_direction() {
        let x = vec![3.0, -1.0];
        let current = parabola(&x).unwrap().unwrap();
        let direction = vec![-3.0, 1.0];

        let step = backtracking_search(
            parabola,
            &x,
            &direction,
            &current,
            &LineSearchSettings::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(step.backtracks, 0);
        assert_abs_diff_eq!(step.step_length, 1.0);
        assert_abs_diff_eq!(step.evaluation.value, 0.0);
        assert!(step.curvature_satisfied);
    }

    #[test]
    fn test_backtracks_on_overlong_direction() {
        let x = vec![1.0];
        let current = parabola(&x).unwrap().unwrap();
        let direction = vec![-10.0];

        let step = backtracking_search(
            parabola,
            &x,
            &direction,
            &current,
            &LineSearchSettings::default(),
        )
        .unwrap()
        .unwrap();

        assert!(step.backtracks > 0);
        assert!(step.evaluation.value < current.value);
    }

    #[test]
    fn test_ascent_direction_rejected() {
        let x = vec![1.0];
        let current = parabola(&x).unwrap().unwrap();
        let result = backtracking_search(
            parabola,
            &x,
            &[1.0],
            &current,
            &LineSearchSettings::default(),
        );
        assert!(matches!(result, Err(NumericsError::LineSearchFailed(_))));
    }

    #[test]
    fn test_exhaustion_returns_none() {
        // Objective that never decreases away from the current point
        let flat_then_wall = |x: &[f64]| -> NumericsResult<Option<Evaluation>> {
            Ok(Some(Evaluation {
                value: if x[0] == 1.0 { 1.0 } else { 2.0 },
                gradient: vec![1.0],
                curvature: None,
            }))
        };
        let current = flat_then_wall(&[1.0]).unwrap().unwrap();
        let settings = LineSearchSettings {
            max_backtracks: 5,
            ..Default::default()
        };
        let result = backtracking_search(flat_then_wall, &[1.0], &[-1.0], &current, &settings);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_undefined_trial_points_contract() {
        // Parabola on x > 0 only; the full step lands on -1
        let half_line = |x: &[f64]| -> NumericsResult<Option<Evaluation>> {
            if x[0] <= 0.0 {
                return Ok(None);
            }
            parabola(x)
        };
        let x = vec![1.0];
        let current = half_line(&x).unwrap().unwrap();

        let step = backtracking_search(
            half_line,
            &x,
            &[-2.0],
            &current,
            &LineSearchSettings::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(step.backtracks, 2);
        assert_abs_diff_eq!(step.step_length, 0.25);
        assert_abs_diff_eq!(step.variate[0], 0.5);
    }
}
