//! Run orchestration
//!
//! Configuration → scheme → trajectory → (optional) Monte-Carlo realization → report.

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use tranche_core::{
    EvolutionParameters, ExecutionError, LinearImpactParameters, OrderSpecification,
    PowerLawImpactParameters,
};
use tranche_dynamics::{PathSimulator, ShortfallStatistics, TrajectoryControl};
use tranche_generator::{
    Ac2000Generator, Almgren2003Generator, ConstantTradingEnhancedGenerator,
    LinearTradingEnhancedGenerator, NumericalGenerator, Trajectory, TrajectoryGenerator,
};
use tranche_numerics::DescentSettings;

use crate::config::{ConfigError, DescentConfig, RunConfigFile, SchemeConfig, SimulationConfig};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// Generator bound to its parameters, plus the general form used for simulation
pub struct Scheme {
    generator: Box<dyn TrajectoryGenerator>,
    /// None for schemes the slice engine cannot replay
    params: Option<EvolutionParameters>,
}

impl Scheme {
    pub fn from_config(config: &RunConfigFile) -> Result<Self, RunError> {
        let market_core = config.market_core;

        let scheme = match &config.scheme {
            SchemeConfig::Almgren2003 {
                permanent,
                temporary,
            } => {
                let permanent = permanent.as_linear()?.ok_or_else(|| {
                    ConfigError::Invalid("almgren_2003 needs a linear permanent impact".into())
                })?;
                let temporary = temporary.as_power_law()?.ok_or_else(|| {
                    ConfigError::Invalid("almgren_2003 needs a power_law temporary impact".into())
                })?;
                let params =
                    PowerLawImpactParameters::new(market_core.volatility, permanent, temporary)?;
                Self {
                    generator: Box::new(Almgren2003Generator::new(params)),
                    params: Some(params.evolution_parameters()?),
                }
            }
            SchemeConfig::Ac2000 {
                permanent,
                temporary,
            } => {
                let (Some(permanent), Some(temporary)) =
                    (permanent.as_linear()?, temporary.as_linear()?)
                else {
                    return Err(ConfigError::Invalid(
                        "ac2000 needs linear permanent and temporary impact".into(),
                    )
                    .into());
                };
                let params = LinearImpactParameters::new(market_core, permanent, temporary)?;
                Self {
                    generator: Box::new(Ac2000Generator::new(params)),
                    params: Some(params.evolution_parameters()?),
                }
            }
            SchemeConfig::Numerical {
                permanent,
                temporary,
                permanent_volatility,
                temporary_volatility,
                descent,
            } => {
                let params = EvolutionParameters::from_specs(
                    market_core,
                    permanent,
                    temporary,
                    permanent_volatility,
                    temporary_volatility.as_ref(),
                )?;
                Self {
                    generator: Box::new(
                        NumericalGenerator::new(params.clone())
                            .with_settings(descent_settings(descent)),
                    ),
                    params: Some(params),
                }
            }
            SchemeConfig::ConstantTradingEnhanced {
                temporary,
                temporary_volatility,
            } => {
                let params = config.trading_enhanced_parameters(temporary, temporary_volatility)?;
                Self {
                    generator: Box::new(ConstantTradingEnhancedGenerator::new(params)?),
                    params: None,
                }
            }
            SchemeConfig::LinearTradingEnhanced {
                temporary,
                temporary_volatility,
                descent,
            } => {
                let params = config.trading_enhanced_parameters(temporary, temporary_volatility)?;
                Self {
                    generator: Box::new(
                        LinearTradingEnhancedGenerator::new(params)
                            .with_settings(descent_settings(descent)),
                    ),
                    params: None,
                }
            }
        };
        Ok(scheme)
    }

    pub fn generator(&self) -> &dyn TrajectoryGenerator {
        self.generator.as_ref()
    }

    pub fn params(&self) -> Option<&EvolutionParameters> {
        self.params.as_ref()
    }
}

fn descent_settings(config: &DescentConfig) -> DescentSettings {
    let defaults = DescentSettings::default();
    DescentSettings {
        max_iterations: config.max_iterations.unwrap_or(defaults.max_iterations),
        gradient_tolerance: config
            .gradient_tolerance
            .unwrap_or(defaults.gradient_tolerance),
        ..defaults
    }
}

/// Monte-Carlo shortfall against the analytic moments
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationReport {
    pub initial_price: f64,
    pub seed: u64,
    pub statistics: ShortfallStatistics,
    pub standard_error: f64,
    /// `(sample mean − E) / standard error`
    pub mean_z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub scheme: String,
    pub order: OrderSpecification,
    pub risk_aversion: f64,
    pub objective_value: f64,
    pub trajectory: Trajectory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationReport>,
}

/// Generate the configured trajectory and optionally simulate it
pub fn run(config: &RunConfigFile) -> Result<RunReport, RunError> {
    config.validate()?;
    let control = config.control()?;
    let objective = config.objective()?;
    let scheme = Scheme::from_config(config)?;

    info!(
        "Running {} on X={} over T={} with {} intervals",
        scheme.generator().name(),
        control.start_holdings(),
        control.finish_time(),
        control.interval_count()
    );
    let trajectory = scheme.generator().generate(&control, &objective)?;
    if !trajectory.is_monotone() {
        warn!("Generated trajectory reverses direction");
    }

    let simulation = match &config.simulation {
        Some(settings) => Some(simulate(&scheme, &control, &trajectory, settings)?),
        None => None,
    };

    Ok(RunReport {
        scheme: scheme.generator().name().to_string(),
        order: *control.order(),
        risk_aversion: objective.risk_aversion(),
        objective_value: trajectory.objective_value(&objective),
        trajectory,
        simulation,
    })
}

fn simulate(
    scheme: &Scheme,
    control: &TrajectoryControl,
    trajectory: &Trajectory,
    settings: &SimulationConfig,
) -> Result<SimulationReport, RunError> {
    let params = scheme.params().ok_or_else(|| {
        ConfigError::Invalid(format!("{} cannot be simulated", scheme.generator().name()))
    })?;
    let slices = control.slices(trajectory.holdings())?;
    let statistics = PathSimulator::new(params, settings.initial_price)?.simulate_many(
        &slices,
        settings.paths,
        settings.seed,
    )?;

    let standard_error = statistics.standard_error();
    let mean_z_score =
        (statistics.mean - trajectory.transaction_cost_expectation()) / standard_error;
    info!(
        "Simulated {} paths: mean={:.6e} (analytic {:.6e}), variance={:.6e} (analytic {:.6e})",
        statistics.paths,
        statistics.mean,
        trajectory.transaction_cost_expectation(),
        statistics.variance,
        trajectory.transaction_cost_variance()
    );

    Ok(SimulationReport {
        initial_price: settings.initial_price,
        seed: settings.seed,
        statistics,
        standard_error,
        mean_z_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, load_default_config};

    #[test]
    fn test_scheme_from_default_config() {
        let config = load_default_config().unwrap();
        let scheme = Scheme::from_config(&config).unwrap();
        assert_eq!(scheme.generator().name(), "numerical");
        assert_eq!(scheme.params().unwrap().volatility(), 1.0);
    }

    #[test]
    fn test_descent_overrides() {
        let settings = descent_settings(&DescentConfig {
            max_iterations: Some(7),
            gradient_tolerance: None,
        });
        assert_eq!(settings.max_iterations, 7);
        assert_eq!(
            settings.gradient_tolerance,
            DescentSettings::default().gradient_tolerance
        );
    }

    #[test]
    fn test_ac2000_run_with_simulation() {
        let config = load_config_from_str(
            r#"{
                "order": { "start_holdings": 1000.0, "finish_time": 1.0 },
                "intervals": 4,
                "risk_aversion": 1e-4,
                "market_core": { "volatility": 0.5 },
                "scheme": {
                    "kind": "ac2000",
                    "temporary": { "kind": "linear", "slope": 1e-4 }
                },
                "simulation": { "initial_price": 20.0, "paths": 50, "seed": 3 }
            }"#,
        )
        .unwrap();
        let report = run(&config).unwrap();
        assert_eq!(report.scheme, "ac2000");
        assert_eq!(report.simulation.unwrap().statistics.paths, 50);
    }

    #[test]
    fn test_trading_enhanced_schemes_skip_engine_parameters() {
        let config = load_config_from_str(
            r#"{
                "order": { "start_holdings": 100000.0, "finish_time": 5.0 },
                "risk_aversion": 1e-5,
                "market_core": { "volatility": 1.0 },
                "scheme": {
                    "kind": "constant_trading_enhanced",
                    "temporary": { "kind": "linear", "slope": 5e-6 },
                    "temporary_volatility": { "kind": "linear", "offset": 0.5, "slope": 0.0 }
                }
            }"#,
        )
        .unwrap();
        let scheme = Scheme::from_config(&config).unwrap();
        assert_eq!(scheme.generator().name(), "constant_trading_enhanced");
        assert!(scheme.params().is_none());

        let report = run(&config).unwrap();
        assert!(report.simulation.is_none());
        assert!(report.trajectory.is_monotone());
    }
}
