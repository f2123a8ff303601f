//! Serializable impact function description

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ImpactFunction, LinearImpact, PowerLawImpact};
use crate::error::Result;

/// Impact function as it appears in configuration files
///
/// ```json
/// { "kind": "linear", "offset": 0.0625, "slope": 2.5e-6 }
/// { "kind": "power_law", "constant": 0.1, "exponent": 0.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImpactSpec {
    Linear {
        #[serde(default)]
        offset: f64,
        slope: f64,
    },
    PowerLaw {
        constant: f64,
        exponent: f64,
    },
}

impl ImpactSpec {
    pub fn zero() -> Self {
        ImpactSpec::Linear {
            offset: 0.0,
            slope: 0.0,
        }
    }

    /// Validate and build a shareable impact function
    pub fn build(&self) -> Result<Arc<dyn ImpactFunction>> {
        let function: Arc<dyn ImpactFunction> = match *self {
            ImpactSpec::Linear { offset, slope } => Arc::new(LinearImpact::new(offset, slope)?),
            ImpactSpec::PowerLaw { constant, exponent } => {
                Arc::new(PowerLawImpact::new(constant, exponent)?)
            }
        };
        debug!("Built {} impact from {:?}", function.name(), self);
        Ok(function)
    }

    pub fn as_linear(&self) -> Result<Option<LinearImpact>> {
        match *self {
            ImpactSpec::Linear { offset, slope } => Ok(Some(LinearImpact::new(offset, slope)?)),
            ImpactSpec::PowerLaw { .. } => Ok(None),
        }
    }

    pub fn as_power_law(&self) -> Result<Option<PowerLawImpact>> {
        match *self {
            ImpactSpec::PowerLaw { constant, exponent } => {
                Ok(Some(PowerLawImpact::new(constant, exponent)?))
            }
            ImpactSpec::Linear { .. } => Ok(None),
        }
    }
}

impl Default for ImpactSpec {
    fn default() -> Self {
        Self::zero()
    }
}
