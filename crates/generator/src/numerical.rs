//! Numerical Mean-Variance Scheme
//!
//! Minimizes `E[cost] + λ Var[cost]` over the interior holdings for arbitrary
//! impact functions. Endpoints stay fixed at `X` and `0`; the aggregated
//! gradient and tridiagonal Hessian drive a Newton / steepest descent with
//! backtracking line search from the straight-line schedule.

use log::{info, warn};
use tranche_core::{EvolutionParameters, ExecutionError, MeanVarianceObjective, Result};
use tranche_dynamics::{SensitivityAggregator, TrajectoryControl};
use tranche_numerics::{DescentObjective, DescentSettings, Evaluation, minimize};

use crate::generator::{TrajectoryGenerator, trajectory_moments};
use crate::trajectory::{Trajectory, TrajectoryCharacteristics};

/// One minimization problem: fixed parameters, control and risk aversion
struct InteriorProblem<'a> {
    params: &'a EvolutionParameters,
    control: &'a TrajectoryControl,
    objective: &'a MeanVarianceObjective,
}

impl InteriorProblem<'_> {
    fn full_holdings(&self, interior: &[f64]) -> Vec<f64> {
        let mut holdings = Vec::with_capacity(interior.len() + 2);
        holdings.push(self.control.start_holdings());
        holdings.extend_from_slice(interior);
        holdings.push(0.0);
        holdings
    }
}

impl DescentObjective for InteriorProblem<'_> {
    type Error = ExecutionError;

    fn dimension(&self) -> usize {
        self.control.node_count() - 2
    }

    fn evaluate(&self, variate: &[f64]) -> Result<Evaluation> {
        let slices = self.control.slices(&self.full_holdings(variate))?;
        let greek = SensitivityAggregator::new(self.params)
            .aggregate(&slices)?
            .objective(self.objective)?
            .restrict_to_interior()?;

        Ok(Evaluation {
            value: greek.value(),
            gradient: greek.gradient().to_vec(),
            curvature: Some(greek.hessian().clone()),
        })
    }

    /// A trial with a zero trade under a sub-linear impact has no derivative there
    fn rejects_trial(&self, error: &ExecutionError) -> bool {
        matches!(error, ExecutionError::NumericalDomain { .. })
    }
}

/// Descent-based scheme for general impact functions
#[derive(Debug, Clone)]
pub struct NumericalGenerator {
    params: EvolutionParameters,
    settings: DescentSettings,
}

impl NumericalGenerator {
    pub fn new(params: EvolutionParameters) -> Self {
        Self {
            params,
            settings: DescentSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DescentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn params(&self) -> &EvolutionParameters {
        &self.params
    }

    pub fn settings(&self) -> &DescentSettings {
        &self.settings
    }
}

impl TrajectoryGenerator for NumericalGenerator {
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory> {
        let problem = InteriorProblem {
            params: &self.params,
            control,
            objective,
        };
        let linear = control.linear_holdings();
        let start = linear[1..linear.len() - 1].to_vec();

        let outcome = minimize(&problem, start, &self.settings)?;
        if !outcome.converged {
            warn!(
                "Numerical scheme stopped after {} iterations with gradient norm {:.3e}",
                outcome.iterations,
                outcome.gradient_norm()
            );
        }

        let holdings = problem.full_holdings(&outcome.variate);
        let moments = trajectory_moments(&self.params, control, &holdings)?;
        info!(
            "Numerical trajectory: {} iterations, converged={}, objective={:.6e}",
            outcome.iterations, outcome.converged, outcome.evaluation.value
        );

        Trajectory::new(
            control,
            holdings,
            moments.expectation.value(),
            moments.variance.value(),
            TrajectoryCharacteristics::Numerical {
                iterations: outcome.iterations,
                converged: outcome.converged,
                objective_value: outcome.evaluation.value,
                gradient_norm: outcome.gradient_norm(),
                curvature_failures: outcome.curvature_failures,
            },
        )
    }

    fn name(&self) -> &str {
        "numerical"
    }
}
