//! Evolution parameters
//!
//! Market-core dynamics and the four impact functions of one asset:
//!
//! | component   | expectation            | volatility            |
//! |-------------|------------------------|-----------------------|
//! | permanent   | `permanent_expectation`| `permanent_volatility`|
//! | temporary   | `temporary_expectation`| `temporary_volatility`|
//!
//! The two scheme-specific parametrizations ([`LinearImpactParameters`] for
//! Almgren–Chriss 2000 and [`PowerLawImpactParameters`] for Almgren 2003) carry
//! concrete impact types and lift into the general form.
//! [`TradingEnhancedVolatilityParameters`] stays scheme-specific: its rate-driven
//! variance is measured per unit time rather than per slice.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, Result, ensure_finite};
use crate::impact::{ImpactFunction, ImpactSpec, LinearImpact, PowerLawImpact};

/// Arithmetic random walk driving the unaffected price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCore {
    /// Price drift per unit time
    #[serde(default)]
    pub drift: f64,
    /// Price volatility per square-root unit time
    pub volatility: f64,
    /// Correlation of consecutive market-core shocks
    #[serde(default)]
    pub serial_correlation: f64,
}

impl MarketCore {
    pub fn new(drift: f64, volatility: f64, serial_correlation: f64) -> Result<Self> {
        let core = Self {
            drift,
            volatility,
            serial_correlation,
        };
        core.validate()?;
        Ok(core)
    }

    /// Driftless, uncorrelated walk
    pub fn driftless(volatility: f64) -> Result<Self> {
        Self::new(0.0, volatility, 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("drift", self.drift)?;
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "volatility",
                value: self.volatility,
            });
        }
        if !(-1.0..=1.0).contains(&self.serial_correlation) {
            return Err(ExecutionError::InvalidInput {
                field: "serial_correlation",
                value: self.serial_correlation,
            });
        }
        Ok(())
    }

    pub fn variance_rate(&self) -> f64 {
        self.volatility * self.volatility
    }
}

/// Full per-asset dynamics shared read-only by every slice
#[derive(Debug, Clone)]
pub struct EvolutionParameters {
    market_core: MarketCore,
    permanent_expectation: Arc<dyn ImpactFunction>,
    temporary_expectation: Arc<dyn ImpactFunction>,
    permanent_volatility: Arc<dyn ImpactFunction>,
    temporary_volatility: Option<Arc<dyn ImpactFunction>>,
}

impl EvolutionParameters {
    pub fn new(
        market_core: MarketCore,
        permanent_expectation: Arc<dyn ImpactFunction>,
        temporary_expectation: Arc<dyn ImpactFunction>,
        permanent_volatility: Arc<dyn ImpactFunction>,
        temporary_volatility: Option<Arc<dyn ImpactFunction>>,
    ) -> Result<Self> {
        market_core.validate()?;
        Ok(Self {
            market_core,
            permanent_expectation,
            temporary_expectation,
            permanent_volatility,
            temporary_volatility,
        })
    }

    /// Build from configuration descriptions
    pub fn from_specs(
        market_core: MarketCore,
        permanent_expectation: &ImpactSpec,
        temporary_expectation: &ImpactSpec,
        permanent_volatility: &ImpactSpec,
        temporary_volatility: Option<&ImpactSpec>,
    ) -> Result<Self> {
        Self::new(
            market_core,
            permanent_expectation.build()?,
            temporary_expectation.build()?,
            permanent_volatility.build()?,
            temporary_volatility.map(ImpactSpec::build).transpose()?,
        )
    }

    pub fn market_core(&self) -> &MarketCore {
        &self.market_core
    }

    pub fn drift(&self) -> f64 {
        self.market_core.drift
    }

    pub fn volatility(&self) -> f64 {
        self.market_core.volatility
    }

    pub fn serial_correlation(&self) -> f64 {
        self.market_core.serial_correlation
    }

    pub fn permanent_expectation(&self) -> &dyn ImpactFunction {
        self.permanent_expectation.as_ref()
    }

    pub fn temporary_expectation(&self) -> &dyn ImpactFunction {
        self.temporary_expectation.as_ref()
    }

    pub fn permanent_volatility(&self) -> &dyn ImpactFunction {
        self.permanent_volatility.as_ref()
    }

    pub fn temporary_volatility(&self) -> Option<&dyn ImpactFunction> {
        self.temporary_volatility.as_deref()
    }

    pub fn require_temporary_volatility(&self) -> Result<&dyn ImpactFunction> {
        self.temporary_volatility()
            .ok_or(ExecutionError::MissingImpactFunction("temporary volatility"))
    }
}

/// Almgren–Chriss 2000 parametrization: linear permanent and temporary impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearImpactParameters {
    pub market_core: MarketCore,
    /// γ
    pub permanent: LinearImpact,
    /// ε sign(n) + η n/τ
    pub temporary: LinearImpact,
}

impl LinearImpactParameters {
    pub fn new(
        market_core: MarketCore,
        permanent: LinearImpact,
        temporary: LinearImpact,
    ) -> Result<Self> {
        market_core.validate()?;
        Ok(Self {
            market_core,
            permanent,
            temporary,
        })
    }

    /// General form with zero impact volatility
    pub fn evolution_parameters(&self) -> Result<EvolutionParameters> {
        EvolutionParameters::new(
            self.market_core,
            Arc::new(self.permanent),
            Arc::new(self.temporary),
            Arc::new(LinearImpact::zero()),
            Some(Arc::new(LinearImpact::zero())),
        )
    }
}

/// Almgren 2003 parametrization: linear permanent, power-law temporary, no drift
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerLawImpactParameters {
    volatility: f64,
    permanent: LinearImpact,
    temporary: PowerLawImpact,
}

impl PowerLawImpactParameters {
    pub fn new(volatility: f64, permanent: LinearImpact, temporary: PowerLawImpact) -> Result<Self> {
        MarketCore::driftless(volatility)?;
        Ok(Self {
            volatility,
            permanent,
            temporary,
        })
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn permanent(&self) -> &LinearImpact {
        &self.permanent
    }

    pub fn temporary(&self) -> &PowerLawImpact {
        &self.temporary
    }

    pub fn market_core(&self) -> MarketCore {
        MarketCore {
            drift: 0.0,
            volatility: self.volatility,
            serial_correlation: 0.0,
        }
    }

    /// General form with zero impact volatility
    pub fn evolution_parameters(&self) -> Result<EvolutionParameters> {
        EvolutionParameters::new(
            self.market_core(),
            Arc::new(self.permanent),
            Arc::new(self.temporary),
            Arc::new(LinearImpact::zero()),
            Some(Arc::new(LinearImpact::zero())),
        )
    }
}

/// Almgren 2003 trading-enhanced risk: linear temporary impact whose execution
/// price volatility grows linearly with the trading rate, `α + β|v|`
///
/// The rate-dependent volatility adds `∫ (α + β|v|)² v² dt` to the cost variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradingEnhancedVolatilityParameters {
    volatility: f64,
    temporary: LinearImpact,
    temporary_volatility: LinearImpact,
}

impl TradingEnhancedVolatilityParameters {
    /// `temporary_volatility` carries `α` as its offset and `β` as its slope
    pub fn new(
        volatility: f64,
        temporary: LinearImpact,
        temporary_volatility: LinearImpact,
    ) -> Result<Self> {
        MarketCore::driftless(volatility)?;
        if !(temporary.slope() > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "temporary slope",
                value: temporary.slope(),
            });
        }
        for (field, value) in [
            ("temporary volatility offset", temporary_volatility.offset()),
            ("temporary volatility slope", temporary_volatility.slope()),
        ] {
            if value < 0.0 {
                return Err(ExecutionError::InvalidInput { field, value });
            }
        }
        Ok(Self {
            volatility,
            temporary,
            temporary_volatility,
        })
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn temporary(&self) -> &LinearImpact {
        &self.temporary
    }

    pub fn temporary_volatility(&self) -> &LinearImpact {
        &self.temporary_volatility
    }

    /// `α`
    pub fn volatility_offset(&self) -> f64 {
        self.temporary_volatility.offset()
    }

    /// `β`
    pub fn volatility_slope(&self) -> f64 {
        self.temporary_volatility.slope()
    }

    /// Execution price volatility `α + β|v|` at trading rate `v`
    pub fn enhanced_volatility(&self, rate: f64) -> f64 {
        self.volatility_offset() + self.volatility_slope() * rate.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_core_validation() {
        assert!(MarketCore::new(0.0, 0.3, 0.5).is_ok());
        assert!(MarketCore::new(0.0, -0.3, 0.0).is_err());
        assert!(MarketCore::new(f64::NAN, 0.3, 0.0).is_err());
        assert!(matches!(
            MarketCore::new(0.0, 0.3, 1.5),
            Err(ExecutionError::InvalidInput {
                field: "serial_correlation",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_temporary_volatility() {
        let params = EvolutionParameters::from_specs(
            MarketCore::driftless(1.0).unwrap(),
            &ImpactSpec::zero(),
            &ImpactSpec::Linear {
                offset: 0.0,
                slope: 5e-6,
            },
            &ImpactSpec::zero(),
            None,
        )
        .unwrap();

        assert!(params.temporary_volatility().is_none());
        assert_eq!(
            params.require_temporary_volatility().unwrap_err(),
            ExecutionError::MissingImpactFunction("temporary volatility")
        );
        approx::assert_relative_eq!(params.temporary_expectation().evaluate_rate(1e5), 0.5);
    }

    #[test]
    fn test_scheme_parameters_lift() {
        let linear = LinearImpactParameters::new(
            MarketCore::new(0.01, 0.95, 0.0).unwrap(),
            LinearImpact::slope_only(2.5e-7).unwrap(),
            LinearImpact::new(0.0625, 2.5e-6).unwrap(),
        )
        .unwrap();
        let general = linear.evolution_parameters().unwrap();
        assert_eq!(general.drift(), 0.01);
        assert_eq!(general.permanent_expectation().name(), "linear");
        assert!(general.require_temporary_volatility().is_ok());

        let power = PowerLawImpactParameters::new(
            0.3,
            LinearImpact::zero(),
            PowerLawImpact::new(0.1, 0.5).unwrap(),
        )
        .unwrap();
        let general = power.evolution_parameters().unwrap();
        assert_eq!(general.drift(), 0.0);
        assert_eq!(general.volatility(), 0.3);
        assert_eq!(general.temporary_expectation().name(), "power_law");

        assert!(
            PowerLawImpactParameters::new(
                -1.0,
                LinearImpact::zero(),
                PowerLawImpact::new(0.1, 0.5).unwrap()
            )
            .is_err()
        );
    }

    #[test]
    fn test_trading_enhanced_parameters() {
        let params = TradingEnhancedVolatilityParameters::new(
            1.0,
            LinearImpact::slope_only(5e-6).unwrap(),
            LinearImpact::new(0.5, 1e-6).unwrap(),
        )
        .unwrap();
        assert_eq!(params.volatility_offset(), 0.5);
        assert_eq!(params.volatility_slope(), 1e-6);
        approx::assert_relative_eq!(params.enhanced_volatility(-2e4), 0.52, max_relative = 1e-12);

        assert!(
            TradingEnhancedVolatilityParameters::new(
                1.0,
                LinearImpact::zero(),
                LinearImpact::zero()
            )
            .is_err()
        );
        assert!(matches!(
            TradingEnhancedVolatilityParameters::new(
                1.0,
                LinearImpact::slope_only(5e-6).unwrap(),
                LinearImpact::new(0.0, -1e-6).unwrap()
            ),
            Err(ExecutionError::InvalidInput {
                field: "temporary volatility slope",
                ..
            })
        ));
    }
}
