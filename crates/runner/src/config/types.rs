use serde::{Deserialize, Serialize};
use tranche_core::{ImpactSpec, MarketCore};

/// Top-level run configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfigFile {
    pub order: OrderConfig,
    /// Number of equal sub-intervals; ignored when `time_nodes` is given
    #[serde(default = "default_intervals")]
    pub intervals: usize,
    /// Explicit time nodes from 0 to the finish time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_nodes: Option<Vec<f64>>,
    /// λ in `E + λV`
    pub risk_aversion: f64,
    pub market_core: MarketCore,
    pub scheme: SchemeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

fn default_intervals() -> usize {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Positive to sell down, negative to buy back
    pub start_holdings: f64,
    pub finish_time: f64,
}

/// Trajectory scheme with its impact functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemeConfig {
    /// Continuous power-law closed form; `temporary` must be a power law
    #[serde(rename = "almgren_2003")]
    Almgren2003 {
        #[serde(default = "ImpactSpec::zero")]
        permanent: ImpactSpec,
        temporary: ImpactSpec,
    },
    /// Discrete linear closed form; both impacts must be linear
    Ac2000 {
        #[serde(default = "ImpactSpec::zero")]
        permanent: ImpactSpec,
        temporary: ImpactSpec,
    },
    Numerical {
        #[serde(default = "ImpactSpec::zero")]
        permanent: ImpactSpec,
        temporary: ImpactSpec,
        #[serde(default = "ImpactSpec::zero")]
        permanent_volatility: ImpactSpec,
        #[serde(default = "default_temporary_volatility")]
        temporary_volatility: Option<ImpactSpec>,
        #[serde(default)]
        descent: DescentConfig,
    },
    /// Continuous closed form under a constant execution price volatility `α`
    ConstantTradingEnhanced {
        temporary: ImpactSpec,
        /// Linear: offset `α`, slope `β` (must be zero)
        temporary_volatility: ImpactSpec,
    },
    /// Discrete descent under an execution price volatility `α + β|v|`
    LinearTradingEnhanced {
        temporary: ImpactSpec,
        temporary_volatility: ImpactSpec,
        #[serde(default)]
        descent: DescentConfig,
    },
}

fn default_temporary_volatility() -> Option<ImpactSpec> {
    Some(ImpactSpec::zero())
}

impl SchemeConfig {
    pub fn name(&self) -> &'static str {
        match self {
            SchemeConfig::Almgren2003 { .. } => "almgren_2003",
            SchemeConfig::Ac2000 { .. } => "ac2000",
            SchemeConfig::Numerical { .. } => "numerical",
            SchemeConfig::ConstantTradingEnhanced { .. } => "constant_trading_enhanced",
            SchemeConfig::LinearTradingEnhanced { .. } => "linear_trading_enhanced",
        }
    }

    /// Whether the scheme's cost model can be replayed by the path simulator
    pub fn supports_simulation(&self) -> bool {
        !matches!(
            self,
            SchemeConfig::ConstantTradingEnhanced { .. }
                | SchemeConfig::LinearTradingEnhanced { .. }
        )
    }
}

/// Overrides for the descent defaults
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_tolerance: Option<f64>,
}

/// Monte-Carlo realization of the generated trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_price: f64,
    #[serde(default = "default_paths")]
    pub paths: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_paths() -> usize {
    1000
}
