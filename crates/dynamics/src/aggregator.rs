//! Sensitivity Aggregator
//!
//! Sums per-slice control-node Greeks into trajectory-wide sensitivities.
//!
//! Slice `i` couples nodes `i` and `i + 1`, so its 2×2 Hessian block lands on the
//! diagonal at `(i, i)` and the trajectory Hessian is symmetric tridiagonal:
//!
//! ```text
//! ┌ H⁰₀₀   H⁰₀₁                     ┐
//! │ H⁰₁₀   H⁰₁₁+H¹₀₀   H¹₀₁         │
//! │        H¹₁₀        H¹₁₁+H²₀₀  … │
//! └                    …            ┘
//! ```
//!
//! Per-slice Greeks are computed first; the reduction always runs in slice order.

use log::debug;
use serde::Serialize;
use tranche_core::{
    ControlNodesGreek, EvolutionParameters, ExecutionError, MeanVarianceObjective, Result,
};
use tranche_numerics::SymmetricTridiagonal;

use crate::sensitivity::ControlNodesGreekGenerator;
use crate::slice::Slice;

/// Value, gradient and banded Hessian of a trajectory-wide scalar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryGreek {
    value: f64,
    gradient: Vec<f64>,
    hessian: SymmetricTridiagonal,
}

impl TrajectoryGreek {
    /// Reduce per-slice Greeks, slice `i` acting on nodes `(i, i + 1)`
    pub fn from_slice_greeks(greeks: &[ControlNodesGreek]) -> Result<Self> {
        let nodes = greeks.len() + 1;
        let mut value = 0.0;
        let mut gradient = vec![0.0; nodes];
        let mut hessian = SymmetricTridiagonal::zeros(nodes);

        for (i, greek) in greeks.iter().enumerate() {
            value += greek.value();
            gradient[i] += greek.left_jacobian();
            gradient[i + 1] += greek.right_jacobian();
            hessian.add_block(i, greek.hessian())?;
        }

        Ok(Self {
            value,
            gradient,
            hessian,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    pub fn hessian(&self) -> &SymmetricTridiagonal {
        &self.hessian
    }

    pub fn node_count(&self) -> usize {
        self.gradient.len()
    }

    /// `self + factor × other`
    pub fn scaled_add(&self, other: &Self, factor: f64) -> Result<Self> {
        if self.node_count() != other.node_count() {
            return Err(ExecutionError::DimensionMismatch {
                expected: self.node_count(),
                actual: other.node_count(),
            });
        }
        Ok(Self {
            value: self.value + factor * other.value,
            gradient: self
                .gradient
                .iter()
                .zip(&other.gradient)
                .map(|(a, b)| a + factor * b)
                .collect(),
            hessian: self.hessian.scaled_add(&other.hessian, factor)?,
        })
    }

    /// Drop the first and last node (fixed endpoints)
    pub fn restrict_to_interior(&self) -> Result<Self> {
        let interior = self.node_count().saturating_sub(2);
        let hessian = if interior == 0 {
            SymmetricTridiagonal::zeros(0)
        } else {
            self.hessian.principal_block(1, interior)?
        };
        let gradient = if interior == 0 {
            Vec::new()
        } else {
            self.gradient[1..=interior].to_vec()
        };
        Ok(Self {
            value: self.value,
            gradient,
            hessian,
        })
    }
}

/// Expectation and variance sensitivities of one trajectory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySensitivity {
    pub expectation: TrajectoryGreek,
    pub variance: TrajectoryGreek,
}

impl TrajectorySensitivity {
    /// `E + λ V` with its gradient and Hessian
    pub fn objective(&self, objective: &MeanVarianceObjective) -> Result<TrajectoryGreek> {
        self.expectation
            .scaled_add(&self.variance, objective.risk_aversion())
    }
}

/// Aggregates slice sensitivities under one set of evolution parameters
#[derive(Debug, Clone, Copy)]
pub struct SensitivityAggregator<'a> {
    params: &'a EvolutionParameters,
}

impl<'a> SensitivityAggregator<'a> {
    pub fn new(params: &'a EvolutionParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EvolutionParameters {
        self.params
    }

    pub fn expectation(&self, slices: &[Slice]) -> Result<TrajectoryGreek> {
        check_contiguous(slices)?;
        let greeks = slices
            .iter()
            .map(|slice| slice.expectation_contribution(self.params))
            .collect::<Result<Vec<_>>>()?;
        TrajectoryGreek::from_slice_greeks(&greeks)
    }

    pub fn variance(&self, slices: &[Slice]) -> Result<TrajectoryGreek> {
        check_contiguous(slices)?;
        let greeks = slices
            .iter()
            .map(|slice| slice.variance_contribution(self.params))
            .collect::<Result<Vec<_>>>()?;
        TrajectoryGreek::from_slice_greeks(&greeks)
    }

    pub fn aggregate(&self, slices: &[Slice]) -> Result<TrajectorySensitivity> {
        let sensitivity = TrajectorySensitivity {
            expectation: self.expectation(slices)?,
            variance: self.variance(slices)?,
        };
        debug!(
            "Aggregated {} slices: E={:.6e} V={:.6e}",
            slices.len(),
            sensitivity.expectation.value(),
            sensitivity.variance.value()
        );
        Ok(sensitivity)
    }
}

/// Consecutive slices must share their boundary holdings
fn check_contiguous(slices: &[Slice]) -> Result<()> {
    if slices.is_empty() {
        return Err(ExecutionError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    }
    for pair in slices.windows(2) {
        if pair[0].right_holdings() != pair[1].left_holdings() {
            return Err(ExecutionError::InvalidInput {
                field: "left_holdings",
                value: pair[1].left_holdings(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use tranche_core::{LinearImpact, MarketCore};

    fn params() -> EvolutionParameters {
        EvolutionParameters::new(
            MarketCore::new(0.01, 0.5, 0.0).unwrap(),
            Arc::new(LinearImpact::slope_only(1e-6).unwrap()),
            Arc::new(LinearImpact::new(0.01, 2e-6).unwrap()),
            Arc::new(LinearImpact::zero()),
            Some(Arc::new(LinearImpact::slope_only(1e-6).unwrap())),
        )
        .unwrap()
    }

    fn slices() -> Vec<Slice> {
        vec![
            Slice::new(1000.0, 700.0, 1.0).unwrap(),
            Slice::new(700.0, 300.0, 1.0).unwrap(),
            Slice::new(300.0, 0.0, 2.0).unwrap(),
        ]
    }

    #[test]
    fn test_gradient_and_hessian_assembly() {
        let params = params();
        let slices = slices();
        let aggregator = SensitivityAggregator::new(&params);
        let expectation = aggregator.expectation(&slices).unwrap();

        let greeks: Vec<ControlNodesGreek> = slices
            .iter()
            .map(|s| s.expectation_contribution(&params).unwrap())
            .collect();

        assert_eq!(expectation.node_count(), 4);
        assert_relative_eq!(
            expectation.value(),
            greeks.iter().map(|g| g.value()).sum::<f64>()
        );
        assert_relative_eq!(
            expectation.gradient()[1],
            greeks[0].right_jacobian() + greeks[1].left_jacobian()
        );
        assert_relative_eq!(
            expectation.hessian().get(1, 1),
            greeks[0].hessian()[1][1] + greeks[1].hessian()[0][0]
        );
        assert_eq!(expectation.hessian().get(2, 3), greeks[2].cross_hessian());
        assert_eq!(expectation.hessian().get(0, 2), 0.0);
    }

    #[test]
    fn test_objective_combines_moments() {
        let params = params();
        let sensitivity = SensitivityAggregator::new(&params)
            .aggregate(&slices())
            .unwrap();
        let objective = MeanVarianceObjective::new(1e-3).unwrap();
        let combined = sensitivity.objective(&objective).unwrap();

        assert_relative_eq!(
            combined.value(),
            sensitivity.expectation.value() + 1e-3 * sensitivity.variance.value()
        );
        assert_relative_eq!(
            combined.gradient()[2],
            sensitivity.expectation.gradient()[2] + 1e-3 * sensitivity.variance.gradient()[2]
        );
    }

    #[test]
    fn test_interior_restriction() {
        let params = params();
        let expectation = SensitivityAggregator::new(&params)
            .expectation(&slices())
            .unwrap();
        let interior = expectation.restrict_to_interior().unwrap();

        assert_eq!(interior.node_count(), 2);
        assert_eq!(interior.gradient(), &expectation.gradient()[1..3]);
        assert_eq!(interior.hessian().get(0, 1), expectation.hessian().get(1, 2));
        assert_eq!(interior.value(), expectation.value());

        let single = SensitivityAggregator::new(&params)
            .expectation(&[Slice::new(10.0, 0.0, 1.0).unwrap()])
            .unwrap()
            .restrict_to_interior()
            .unwrap();
        assert_eq!(single.node_count(), 0);
    }

    #[test]
    fn test_serialized_greek_carries_hessian_bands() {
        let params = params();
        let expectation = SensitivityAggregator::new(&params)
            .expectation(&slices())
            .unwrap();
        let json = serde_json::to_value(&expectation).unwrap();

        let diagonal = json["hessian"]["diagonal"].as_array().unwrap();
        let off_diagonal = json["hessian"]["off_diagonal"].as_array().unwrap();
        assert_eq!(diagonal.len(), 4);
        assert_eq!(off_diagonal.len(), 3);
        assert_relative_eq!(
            off_diagonal[2].as_f64().unwrap(),
            expectation.hessian().get(2, 3),
            max_relative = 1e-12
        );
        assert_eq!(json["gradient"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_disjoint_slices_rejected() {
        let params = params();
        let aggregator = SensitivityAggregator::new(&params);
        let broken = vec![
            Slice::new(1000.0, 700.0, 1.0).unwrap(),
            Slice::new(650.0, 0.0, 1.0).unwrap(),
        ];
        assert!(aggregator.expectation(&broken).is_err());
        assert!(aggregator.variance(&[]).is_err());
    }

    #[test]
    fn test_slice_failure_fails_aggregation() {
        let params = EvolutionParameters::new(
            MarketCore::driftless(1.0).unwrap(),
            Arc::new(LinearImpact::zero()),
            Arc::new(LinearImpact::slope_only(1e-6).unwrap()),
            Arc::new(LinearImpact::zero()),
            None,
        )
        .unwrap();
        let result = SensitivityAggregator::new(&params).aggregate(&slices());
        assert_eq!(
            result.unwrap_err(),
            ExecutionError::MissingImpactFunction("temporary volatility")
        );
    }
}
