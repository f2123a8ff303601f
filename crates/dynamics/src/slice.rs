//! Slice
//!
//! One interval of a trading trajectory: holdings move from `left` to `right`
//! over `dt`, at execution rate `r = (right - left) / dt`.
//!
//! Cost moments of the slice, with `a = right - left` and `s = -1` for a sell:
//!
//! ```text
//! permanent expectation   s · dt · right · f(r)
//! temporary expectation   a · g(r)
//! market-core expectation -dt · μ · right
//! temporary variance      a² · h(r)² · dt
//! market-core variance    dt · σ² · right²
//! permanent variance      0
//! ```
//!
//! where `f`, `g` are the permanent and temporary expectation impacts and `h` the
//! temporary volatility impact. Every moment comes with its Jacobian and Hessian
//! with respect to `(left, right)`.

use serde::Serialize;
use tranche_core::{
    ControlNodesGreek, DerivativeOrder, EvolutionParameters, ExecutionError, ImpactFunction,
    Result, ensure_finite,
};

use crate::distribution::ShortfallIncrementDistribution;
use crate::increment::{MarketImpactComponent, PriceIncrement, ShortfallIncrement};
use crate::sensitivity::ControlNodesGreekGenerator;
use crate::walk::WalkSuite;

const SERIAL_CORRELATION_POLE: f64 = 1e-12;

/// Optimal schedule adjustment attributable to serial correlation of the market core
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SerialCorrelationAdjustment {
    pub offset_term: f64,
    pub variance_term: f64,
}

/// Value and holdings derivatives of an impact function on one slice
struct ImpactSensitivity {
    value: f64,
    left: f64,
    right: f64,
    left_left: f64,
    right_right: f64,
    left_right: f64,
}

impl ImpactSensitivity {
    fn of(function: &dyn ImpactFunction, trade_amount: f64, dt: f64) -> Result<Self> {
        Ok(Self {
            value: function.evaluate(trade_amount, dt)?,
            left: function.left_holdings_derivative(trade_amount, dt, DerivativeOrder::First)?,
            right: function.right_holdings_derivative(trade_amount, dt, DerivativeOrder::First)?,
            left_left: function.left_holdings_derivative(
                trade_amount,
                dt,
                DerivativeOrder::Second,
            )?,
            right_right: function.right_holdings_derivative(
                trade_amount,
                dt,
                DerivativeOrder::Second,
            )?,
            left_right: function.cross_holdings_derivative(trade_amount, dt)?,
        })
    }
}

/// Holdings transition over one time interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slice {
    left_holdings: f64,
    right_holdings: f64,
    time_interval: f64,
}

impl Slice {
    pub fn new(left_holdings: f64, right_holdings: f64, time_interval: f64) -> Result<Self> {
        ensure_finite("left_holdings", left_holdings)?;
        ensure_finite("right_holdings", right_holdings)?;
        if !(time_interval.is_finite() && time_interval > 0.0) {
            return Err(ExecutionError::InvalidInput {
                field: "time_interval",
                value: time_interval,
            });
        }
        Ok(Self {
            left_holdings,
            right_holdings,
            time_interval,
        })
    }

    pub fn left_holdings(&self) -> f64 {
        self.left_holdings
    }

    pub fn right_holdings(&self) -> f64 {
        self.right_holdings
    }

    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    /// Signed trade `right - left`
    pub fn trade_amount(&self) -> f64 {
        self.right_holdings - self.left_holdings
    }

    pub fn execution_rate(&self) -> f64 {
        self.trade_amount() / self.time_interval
    }

    pub fn is_sell(&self) -> bool {
        self.left_holdings > self.right_holdings
    }

    fn sell_sign(&self) -> f64 {
        if self.right_holdings < self.left_holdings {
            -1.0
        } else {
            1.0
        }
    }

    /// Realized price move given the slice's walk draws
    pub fn price_increment_realization(
        &self,
        previous_price: f64,
        walk: &WalkSuite,
        params: &EvolutionParameters,
    ) -> Result<PriceIncrement> {
        ensure_finite("previous_price", previous_price)?;
        let temporary_volatility = params.require_temporary_volatility()?;

        let dt = self.time_interval;
        let dt_sqrt = dt.sqrt();
        let rate = self.execution_rate();
        let rho = params.serial_correlation();
        let market_core_jump = params.volatility() * dt_sqrt;

        let deterministic = MarketImpactComponent::new(
            dt * params.drift(),
            0.0,
            dt * params.permanent_expectation().evaluate_rate(rate),
            params.temporary_expectation().evaluate_rate(rate),
        );
        let stochastic = MarketImpactComponent::new(
            market_core_jump * (1.0 + rho * rho).sqrt() * walk.market_core_current,
            market_core_jump * rho * walk.market_core_previous,
            dt_sqrt * params.permanent_volatility().evaluate_rate(rate) * walk.permanent_impact,
            dt_sqrt * temporary_volatility.evaluate_rate(rate) * walk.temporary_impact,
        );

        Ok(PriceIncrement::new(previous_price, deterministic, stochastic))
    }

    /// Realized shortfall given the slice's walk draws
    pub fn cost_increment_realization(
        &self,
        previous_price: f64,
        walk: &WalkSuite,
        params: &EvolutionParameters,
    ) -> Result<ShortfallIncrement> {
        Ok(ShortfallIncrement::new(
            self.price_increment_realization(previous_price, walk, params)?,
            self.left_holdings,
            self.trade_amount(),
        ))
    }

    /// Closed-form normal moments of the slice's shortfall
    pub fn cost_increment_distribution(
        &self,
        params: &EvolutionParameters,
    ) -> Result<ShortfallIncrementDistribution> {
        let temporary_volatility = params.require_temporary_volatility()?;

        let dt = self.time_interval;
        let trade_amount = self.trade_amount().abs();
        let rate = trade_amount / dt;
        let sigma = params.volatility();
        let right = self.right_holdings;

        let volatility = temporary_volatility.evaluate(trade_amount, dt)?;

        Ok(ShortfallIncrementDistribution::new(
            dt * right * params.permanent_expectation().evaluate_rate(rate),
            trade_amount * params.temporary_expectation().evaluate_rate(rate),
            -right * params.drift() * dt,
            0.0,
            rate * rate * volatility * volatility * dt,
            right * right * sigma * sigma * dt,
        ))
    }

    /// Serial-correlation correction to the optimal holdings on this slice
    pub fn serial_correlation_adjustment(
        &self,
        params: &EvolutionParameters,
    ) -> Result<SerialCorrelationAdjustment> {
        let rho_sigma = params.serial_correlation() * params.volatility();
        let rate = self.execution_rate();
        let temporary = params.temporary_expectation();

        let denominator = rate * temporary.derivative(rate, DerivativeOrder::Second)?
            + 2.0 * temporary.derivative(rate, DerivativeOrder::First)?;
        if !denominator.is_finite() || denominator.abs() < SERIAL_CORRELATION_POLE {
            return Err(ExecutionError::domain(
                "serial correlation adjustment",
                format!("temporary impact curvature term {denominator:e} at rate {rate:e}"),
            ));
        }

        let inverse = 1.0 / denominator;
        let dt = self.time_interval;
        Ok(SerialCorrelationAdjustment {
            offset_term: inverse * rho_sigma * dt.powf(1.5),
            variance_term: 0.5 * inverse * rho_sigma * rho_sigma * dt * dt,
        })
    }
}

impl ControlNodesGreekGenerator for Slice {
    fn permanent_impact_expectation(
        &self,
        params: &EvolutionParameters,
    ) -> Result<ControlNodesGreek> {
        let dt = self.time_interval;
        let right = self.right_holdings;
        let scale = self.sell_sign() * dt;
        let f = ImpactSensitivity::of(params.permanent_expectation(), self.trade_amount(), dt)?;

        ControlNodesGreek::new(
            scale * right * f.value,
            [scale * right * f.left, scale * right * f.right + scale * f.value],
            scale * right * f.left_left,
            scale * f.left + scale * right * f.left_right,
            scale * right * f.right_right + 2.0 * scale * f.right,
        )
    }

    fn temporary_impact_expectation(
        &self,
        params: &EvolutionParameters,
    ) -> Result<ControlNodesGreek> {
        let a = self.trade_amount();
        let g = ImpactSensitivity::of(params.temporary_expectation(), a, self.time_interval)?;

        ControlNodesGreek::new(
            a * g.value,
            [-g.value + a * g.left, g.value + a * g.right],
            -2.0 * g.left + a * g.left_left,
            -g.right + g.left + a * g.left_right,
            2.0 * g.right + a * g.right_right,
        )
    }

    fn market_core_expectation(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        let slope = -self.time_interval * params.drift();

        ControlNodesGreek::new(slope * self.right_holdings, [0.0, slope], 0.0, 0.0, 0.0)
    }

    fn permanent_impact_variance(&self, _params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        Ok(ControlNodesGreek::ZERO)
    }

    fn temporary_impact_variance(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        let dt = self.time_interval;
        let a = self.trade_amount();
        let a2 = a * a;
        let h = ImpactSensitivity::of(params.require_temporary_volatility()?, a, dt)?;
        let h2 = h.value * h.value;

        ControlNodesGreek::new(
            a2 * h2 * dt,
            [
                2.0 * a2 * h.value * h.left * dt - 2.0 * a * h2 * dt,
                2.0 * a2 * h.value * h.right * dt + 2.0 * a * h2 * dt,
            ],
            2.0 * a2 * h.left * h.left * dt + 2.0 * a2 * h.value * h.left_left * dt
                - 8.0 * a * h.value * h.left * dt
                + 2.0 * h2 * dt,
            2.0 * a2 * h.left * h.right * dt + 2.0 * a2 * h.value * h.left_right * dt
                + 4.0 * a * h.value * h.left * dt
                - 4.0 * a * h.value * h.right * dt
                - 2.0 * h2 * dt,
            2.0 * a2 * h.right * h.right * dt
                + 2.0 * a2 * h.value * h.right_right * dt
                + 8.0 * a * h.value * h.right * dt
                + 2.0 * h2 * dt,
        )
    }

    fn market_core_variance(&self, params: &EvolutionParameters) -> Result<ControlNodesGreek> {
        let curvature = 2.0 * self.time_interval * params.market_core().variance_rate();

        ControlNodesGreek::new(
            0.5 * curvature * self.right_holdings * self.right_holdings,
            [0.0, curvature * self.right_holdings],
            0.0,
            0.0,
            curvature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::sync::Arc;
    use tranche_core::{ImpactSpec, LinearImpact, MarketCore, PowerLawImpact};

    fn linear_params(drift: f64, rho: f64) -> EvolutionParameters {
        EvolutionParameters::new(
            MarketCore::new(drift, 0.95, rho).unwrap(),
            Arc::new(LinearImpact::slope_only(2.5e-7).unwrap()),
            Arc::new(LinearImpact::new(0.0625, 2.5e-6).unwrap()),
            Arc::new(LinearImpact::slope_only(1e-7).unwrap()),
            Some(Arc::new(LinearImpact::slope_only(4e-6).unwrap())),
        )
        .unwrap()
    }

    fn power_params() -> EvolutionParameters {
        EvolutionParameters::new(
            MarketCore::new(0.02, 1.2, 0.1).unwrap(),
            Arc::new(LinearImpact::slope_only(1e-6).unwrap()),
            Arc::new(PowerLawImpact::new(3e-4, 0.6).unwrap()),
            Arc::new(PowerLawImpact::new(1e-5, 0.5).unwrap()),
            Some(Arc::new(PowerLawImpact::new(2e-5, 1.4).unwrap())),
        )
        .unwrap()
    }

    fn assert_symmetric(greek: &ControlNodesGreek) {
        assert_eq!(greek.hessian()[0][1], greek.hessian()[1][0]);
    }

    #[test]
    fn test_construction_validates_inputs() {
        assert!(Slice::new(1.0, 0.5, 1.0).is_ok());
        assert!(Slice::new(1.0, 0.5, 0.0).is_err());
        assert!(Slice::new(1.0, 0.5, -1.0).is_err());
        assert!(Slice::new(f64::NAN, 0.5, 1.0).is_err());
        assert!(matches!(
            Slice::new(1.0, f64::INFINITY, 1.0),
            Err(ExecutionError::InvalidInput {
                field: "right_holdings",
                ..
            })
        ));
    }

    #[test]
    fn test_derived_quantities() {
        let slice = Slice::new(1000.0, 400.0, 2.0).unwrap();
        assert_eq!(slice.trade_amount(), -600.0);
        assert_eq!(slice.execution_rate(), -300.0);
        assert!(slice.is_sell());
        assert!(!Slice::new(0.0, 10.0, 1.0).unwrap().is_sell());
    }

    #[test]
    fn test_hessians_are_symmetric() {
        let slice = Slice::new(8000.0, 5000.0, 0.5).unwrap();
        for params in [linear_params(0.01, 0.2), power_params()] {
            assert_symmetric(&slice.expectation_contribution(&params).unwrap());
            assert_symmetric(&slice.variance_contribution(&params).unwrap());
            assert_symmetric(&slice.temporary_impact_variance(&params).unwrap());
        }
    }

    #[test]
    fn test_contributions_sum_their_parts() {
        let slice = Slice::new(8000.0, 5000.0, 0.5).unwrap();
        let params = power_params();

        let expectation = slice.expectation_contribution(&params).unwrap();
        let parts = slice.permanent_impact_expectation(&params).unwrap()
            + slice.temporary_impact_expectation(&params).unwrap()
            + slice.market_core_expectation(&params).unwrap();
        assert_eq!(expectation, parts);

        let variance = slice.variance_contribution(&params).unwrap();
        let parts = slice.permanent_impact_variance(&params).unwrap()
            + slice.temporary_impact_variance(&params).unwrap()
            + slice.market_core_variance(&params).unwrap();
        assert_eq!(variance, parts);
    }

    #[test]
    fn test_market_core_greeks() {
        let slice = Slice::new(100.0, 60.0, 2.0).unwrap();
        let params = linear_params(0.5, 0.0);
        let sigma2 = 0.95 * 0.95;

        let expectation = slice.market_core_expectation(&params).unwrap();
        assert_relative_eq!(expectation.value(), -2.0 * 0.5 * 60.0);
        assert_eq!(expectation.jacobian(), &[0.0, -1.0]);

        let variance = slice.market_core_variance(&params).unwrap();
        assert_relative_eq!(variance.value(), 2.0 * sigma2 * 3600.0, max_relative = 1e-12);
        assert_relative_eq!(variance.right_jacobian(), 4.0 * sigma2 * 60.0, max_relative = 1e-12);
        assert_relative_eq!(variance.hessian()[1][1], 4.0 * sigma2, max_relative = 1e-12);
        assert_eq!(variance.hessian()[0][0], 0.0);
    }

    #[test]
    fn test_degenerate_slice_has_no_temporary_cost() {
        let slice = Slice::new(500.0, 500.0, 1.0).unwrap();
        let params = linear_params(0.0, 0.0);

        assert_eq!(slice.execution_rate(), 0.0);
        assert_eq!(slice.temporary_impact_expectation(&params).unwrap().value(), 0.0);
        assert_eq!(slice.temporary_impact_variance(&params).unwrap().value(), 0.0);
    }

    #[test]
    fn test_distribution_variance_splits() {
        let slice = Slice::new(8000.0, 5000.0, 0.5).unwrap();
        let params = linear_params(0.01, 0.0);
        let distribution = slice.cost_increment_distribution(&params).unwrap();

        let rate: f64 = 6000.0;
        let temporary_volatility = 4e-6 * rate;
        assert_relative_eq!(
            distribution.temporary_variance(),
            rate * rate * temporary_volatility * temporary_volatility * 0.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            distribution.market_core_variance(),
            5000.0 * 5000.0 * 0.95 * 0.95 * 0.5,
            max_relative = 1e-12
        );
        assert_eq!(distribution.cross_term(), 0.0);
        assert_relative_eq!(
            distribution.variance(),
            distribution.temporary_variance() + distribution.market_core_variance()
        );
    }

    #[test]
    fn test_zero_draw_realization_matches_mean() {
        let params = linear_params(0.03, 0.4);
        for slice in [
            Slice::new(8000.0, 5000.0, 0.5).unwrap(),
            Slice::new(300.0, 0.0, 2.0).unwrap(),
        ] {
            let realized = slice
                .cost_increment_realization(50.0, &WalkSuite::zero(), &params)
                .unwrap();
            let distribution = slice.cost_increment_distribution(&params).unwrap();
            assert_relative_eq!(realized.total(), distribution.mean(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_realization_scales_draws() {
        let slice = Slice::new(1000.0, 600.0, 4.0).unwrap();
        let params = linear_params(0.0, 0.5);
        let walk = WalkSuite::new(1.0, -2.0, 0.5, 1.5);
        let increment = slice.price_increment_realization(10.0, &walk, &params).unwrap();

        let jump = 0.95 * 2.0;
        let stochastic = increment.stochastic();
        assert_relative_eq!(
            stochastic.market_core_current,
            jump * 1.25_f64.sqrt(),
            max_relative = 1e-12
        );
        assert_relative_eq!(stochastic.market_core_previous, jump * 0.5 * -2.0, max_relative = 1e-12);
        assert_relative_eq!(stochastic.permanent_impact, -1e-5, max_relative = 1e-12);
        assert_relative_eq!(stochastic.temporary_impact, -1.2e-3, max_relative = 1e-12);
        assert_eq!(increment.previous_price(), 10.0);
    }

    #[test]
    fn test_missing_temporary_volatility_fails_explicitly() {
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
        let slice = Slice::new(10.0, 5.0, 1.0).unwrap();

        let missing = ExecutionError::MissingImpactFunction("temporary volatility");
        assert_eq!(slice.variance_contribution(&params).unwrap_err(), missing);
        assert_eq!(slice.cost_increment_distribution(&params).unwrap_err(), missing);
        assert_eq!(
            slice
                .price_increment_realization(1.0, &WalkSuite::zero(), &params)
                .unwrap_err(),
            missing
        );
        assert!(slice.expectation_contribution(&params).is_ok());
    }

    #[test]
    fn test_serial_correlation_adjustment() {
        let slice = Slice::new(1000.0, 600.0, 4.0).unwrap();
        let params = linear_params(0.0, 0.5);
        let adjustment = slice.serial_correlation_adjustment(&params).unwrap();

        let inverse = 1.0 / (2.0 * 2.5e-6);
        let rho_sigma = 0.5 * 0.95;
        assert_relative_eq!(
            adjustment.offset_term,
            inverse * rho_sigma * 8.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            adjustment.variance_term,
            0.5 * inverse * rho_sigma * rho_sigma * 16.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_serial_correlation_pole_is_domain_error() {
        let params = EvolutionParameters::new(
            MarketCore::new(0.0, 1.0, 0.3).unwrap(),
            Arc::new(LinearImpact::zero()),
            Arc::new(LinearImpact::zero()),
            Arc::new(LinearImpact::zero()),
            None,
        )
        .unwrap();
        let slice = Slice::new(10.0, 5.0, 1.0).unwrap();

        let err = slice.serial_correlation_adjustment(&params).unwrap_err();
        assert!(err.is_numerical_domain());
    }

    #[test]
    fn test_sell_and_buy_permanent_expectation_agree_in_magnitude() {
        let params = linear_params(0.0, 0.0);
        let sell = Slice::new(1000.0, 600.0, 1.0).unwrap();
        let buy = Slice::new(200.0, 600.0, 1.0).unwrap();

        let sell_value = sell.permanent_impact_expectation(&params).unwrap().value();
        let buy_value = buy.permanent_impact_expectation(&params).unwrap().value();
        assert_abs_diff_eq!(sell_value, buy_value, epsilon = 1e-15);
        assert!(sell_value > 0.0);
    }
}
