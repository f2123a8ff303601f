//! Shortfall increment distribution
//!
//! Normal moments of the cost of one slice.
//!
//! ```text
//! mean     = permanent + temporary + drift
//! variance = cross + temporary + market core
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShortfallIncrementDistribution {
    permanent_expectation: f64,
    temporary_expectation: f64,
    drift_expectation: f64,
    /// Covariance between market-core and temporary shocks; zero for independent draws
    cross_term: f64,
    temporary_variance: f64,
    market_core_variance: f64,
}

impl ShortfallIncrementDistribution {
    pub fn new(
        permanent_expectation: f64,
        temporary_expectation: f64,
        drift_expectation: f64,
        cross_term: f64,
        temporary_variance: f64,
        market_core_variance: f64,
    ) -> Self {
        Self {
            permanent_expectation,
            temporary_expectation,
            drift_expectation,
            cross_term,
            temporary_variance,
            market_core_variance,
        }
    }

    pub fn permanent_expectation(&self) -> f64 {
        self.permanent_expectation
    }

    pub fn temporary_expectation(&self) -> f64 {
        self.temporary_expectation
    }

    pub fn drift_expectation(&self) -> f64 {
        self.drift_expectation
    }

    pub fn cross_term(&self) -> f64 {
        self.cross_term
    }

    pub fn temporary_variance(&self) -> f64 {
        self.temporary_variance
    }

    pub fn market_core_variance(&self) -> f64 {
        self.market_core_variance
    }

    pub fn mean(&self) -> f64 {
        self.permanent_expectation + self.temporary_expectation + self.drift_expectation
    }

    pub fn variance(&self) -> f64 {
        self.cross_term + self.temporary_variance + self.market_core_variance
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments_sum_components() {
        let distribution = ShortfallIncrementDistribution::new(1.0, 2.0, -0.5, 0.0, 9.0, 16.0);
        assert_eq!(distribution.mean(), 2.5);
        assert_eq!(distribution.variance(), 25.0);
        assert_eq!(distribution.standard_deviation(), 5.0);
    }
}
