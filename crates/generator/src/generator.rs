//! Trajectory Generator Protocol

use tranche_core::{EvolutionParameters, MeanVarianceObjective, Result};
use tranche_dynamics::{SensitivityAggregator, TrajectoryControl, TrajectorySensitivity};

use crate::trajectory::Trajectory;

/// Optimal trajectory scheme
///
/// Implementations hold their evolution parameters and are stateless per call.
/// All implementations must be thread-safe (Send + Sync).
pub trait TrajectoryGenerator: Send + Sync {
    /// Generate the optimal holdings on the control's time nodes
    fn generate(
        &self,
        control: &TrajectoryControl,
        objective: &MeanVarianceObjective,
    ) -> Result<Trajectory>;

    /// Get the scheme name for logging/debugging
    fn name(&self) -> &str;
}

/// Expectation and variance of a holdings schedule through the slice engine
pub fn trajectory_moments(
    params: &EvolutionParameters,
    control: &TrajectoryControl,
    holdings: &[f64],
) -> Result<TrajectorySensitivity> {
    let slices = control.slices(holdings)?;
    SensitivityAggregator::new(params).aggregate(&slices)
}
