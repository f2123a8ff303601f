//! Control-node Greek generation protocol

use tranche_core::{ControlNodesGreek, EvolutionParameters, Result};

/// Sensitivities of one slice's cost moments to its boundary holdings
///
/// The three expectation parts and the three variance parts are computed
/// separately; the contributions are their element-wise sums.
pub trait ControlNodesGreekGenerator {
    fn permanent_impact_expectation(&self, params: &EvolutionParameters)
    -> Result<ControlNodesGreek>;

    fn temporary_impact_expectation(&self, params: &EvolutionParameters)
    -> Result<ControlNodesGreek>;

    fn market_core_expectation(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek>;

    fn permanent_impact_variance(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek>;

    fn temporary_impact_variance(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek>;

    fn market_core_variance(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek>;

    fn expectation_contribution(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        Ok(self.permanent_impact_expectation(params)?
            + self.temporary_impact_expectation(params)?
            + self.market_core_expectation(params)?)
    }

    fn variance_contribution(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        Ok(self.permanent_impact_variance(params)?
            + self.temporary_impact_variance(params)?
            + self.market_core_variance(params)?)
    }
}
