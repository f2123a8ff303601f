use std::path::Path;
use thiserror::Error;
use tranche_core::{
    ExecutionError, ImpactSpec, MeanVarianceObjective, OrderSpecification,
    TradingEnhancedVolatilityParameters,
};
use tranche_dynamics::TrajectoryControl;

use super::types::{DescentConfig, RunConfigFile, SchemeConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ExecutionError> for ConfigError {
    fn from(error: ExecutionError) -> Self {
        ConfigError::Invalid(error.to_string())
    }
}

/// Load a run configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load a run configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunConfigFile, ConfigError> {
    let config: RunConfigFile = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunConfigFile, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl RunConfigFile {
    pub fn order(&self) -> Result<OrderSpecification, ConfigError> {
        Ok(OrderSpecification::new(
            self.order.start_holdings,
            self.order.finish_time,
        )?)
    }

    /// Explicit nodes when given, otherwise a fixed-interval partition
    pub fn control(&self) -> Result<TrajectoryControl, ConfigError> {
        let order = self.order()?;
        let control = match &self.time_nodes {
            Some(nodes) => TrajectoryControl::from_nodes(order, nodes.clone())?,
            None => TrajectoryControl::fixed_interval(order, self.intervals)?,
        };
        Ok(control)
    }

    pub fn objective(&self) -> Result<MeanVarianceObjective, ConfigError> {
        Ok(MeanVarianceObjective::new(self.risk_aversion)?)
    }

    /// Market volatility with a linear temporary impact and linear execution price volatility
    pub fn trading_enhanced_parameters(
        &self,
        temporary: &ImpactSpec,
        temporary_volatility: &ImpactSpec,
    ) -> Result<TradingEnhancedVolatilityParameters, ConfigError> {
        let (Some(temporary), Some(temporary_volatility)) =
            (temporary.as_linear()?, temporary_volatility.as_linear()?)
        else {
            return Err(ConfigError::Invalid(format!(
                "{} needs linear temporary impact and volatility",
                self.scheme.name()
            )));
        };
        Ok(TradingEnhancedVolatilityParameters::new(
            self.market_core.volatility,
            temporary,
            temporary_volatility,
        )?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.control()?;
        self.objective()?;
        self.market_core.validate()?;

        match &self.scheme {
            SchemeConfig::Almgren2003 {
                permanent,
                temporary,
            } => {
                if permanent.as_linear()?.is_none() {
                    return Err(ConfigError::Invalid(
                        "almgren_2003 needs a linear permanent impact".into(),
                    ));
                }
                if temporary.as_power_law()?.is_none() {
                    return Err(ConfigError::Invalid(
                        "almgren_2003 needs a power_law temporary impact".into(),
                    ));
                }
                if self.market_core.drift != 0.0 || self.market_core.serial_correlation != 0.0 {
                    return Err(ConfigError::Invalid(
                        "almgren_2003 has no drift or serial correlation".into(),
                    ));
                }
            }
            SchemeConfig::Ac2000 {
                permanent,
                temporary,
            } => {
                if permanent.as_linear()?.is_none() || temporary.as_linear()?.is_none() {
                    return Err(ConfigError::Invalid(
                        "ac2000 needs linear permanent and temporary impact".into(),
                    ));
                }
                if self.market_core.serial_correlation != 0.0 {
                    return Err(ConfigError::Invalid(
                        "ac2000 has no serial correlation".into(),
                    ));
                }
            }
            SchemeConfig::Numerical {
                permanent,
                temporary,
                permanent_volatility,
                temporary_volatility,
                descent,
            } => {
                permanent.build()?;
                temporary.build()?;
                permanent_volatility.build()?;
                if let Some(spec) = temporary_volatility {
                    spec.build()?;
                }
                validate_descent(descent)?;
            }
            SchemeConfig::ConstantTradingEnhanced {
                temporary,
                temporary_volatility,
            }
            | SchemeConfig::LinearTradingEnhanced {
                temporary,
                temporary_volatility,
                ..
            } => {
                let params = self.trading_enhanced_parameters(temporary, temporary_volatility)?;
                if matches!(self.scheme, SchemeConfig::ConstantTradingEnhanced { .. })
                    && params.volatility_slope() != 0.0
                {
                    return Err(ConfigError::Invalid(
                        "constant_trading_enhanced needs a zero volatility slope".into(),
                    ));
                }
                if self.market_core.drift != 0.0 || self.market_core.serial_correlation != 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{} has no drift or serial correlation",
                        self.scheme.name()
                    )));
                }
                if let SchemeConfig::LinearTradingEnhanced { descent, .. } = &self.scheme {
                    validate_descent(descent)?;
                }
            }
        }

        if self.simulation.is_some() && !self.scheme.supports_simulation() {
            return Err(ConfigError::Invalid(format!(
                "{} cannot be simulated",
                self.scheme.name()
            )));
        }

        if let Some(simulation) = &self.simulation {
            if simulation.paths < 2 {
                return Err(ConfigError::Invalid(format!(
                    "simulation.paths must be at least 2, got {}",
                    simulation.paths
                )));
            }
            if !simulation.initial_price.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "simulation.initial_price must be finite, got {}",
                    simulation.initial_price
                )));
            }
        }
        Ok(())
    }
}

fn validate_descent(descent: &DescentConfig) -> Result<(), ConfigError> {
    if descent.max_iterations == Some(0) {
        return Err(ConfigError::Invalid("descent.max_iterations must be positive".into()));
    }
    if let Some(tolerance) = descent.gradient_tolerance {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "descent.gradient_tolerance must be positive, got {tolerance}"
            )));
        }
    }
    Ok(())
}
