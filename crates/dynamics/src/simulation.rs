//! Realized path simulation
//!
//! Walks a trajectory's slices from an initial equilibrium price, realizing each
//! slice against its walk suite and chaining the next equilibrium price forward.
//! Repeating this over many seeded paths gives Monte-Carlo moments of the total
//! shortfall to hold against the closed-form distribution.

use log::{debug, info};
use serde::Serialize;
use tranche_core::{EvolutionParameters, ExecutionError, Result, ensure_finite};

use crate::increment::{PriceIncrement, ShortfallIncrement};
use crate::slice::Slice;
use crate::walk::{WalkGenerator, WalkSuite};

/// One realized execution path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRealization {
    pub price_increments: Vec<PriceIncrement>,
    pub shortfalls: Vec<ShortfallIncrement>,
    /// Equilibrium price at every node, starting with the initial price
    pub equilibrium_prices: Vec<f64>,
    pub execution_prices: Vec<f64>,
    pub total_shortfall: f64,
}

/// Sample moments of total shortfall over many paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShortfallStatistics {
    pub paths: usize,
    pub mean: f64,
    pub variance: f64,
}

impl ShortfallStatistics {
    pub fn standard_error(&self) -> f64 {
        (self.variance / self.paths as f64).sqrt()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PathSimulator<'a> {
    params: &'a EvolutionParameters,
    initial_price: f64,
}

impl<'a> PathSimulator<'a> {
    pub fn new(params: &'a EvolutionParameters, initial_price: f64) -> Result<Self> {
        ensure_finite("initial_price", initial_price)?;
        Ok(Self {
            params,
            initial_price,
        })
    }

    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    /// Realize `slices` against explicit walk suites, one per slice
    pub fn realize(&self, slices: &[Slice], suites: &[WalkSuite]) -> Result<PathRealization> {
        if suites.len() != slices.len() {
            return Err(ExecutionError::DimensionMismatch {
                expected: slices.len(),
                actual: suites.len(),
            });
        }

        let mut price = self.initial_price;
        let mut price_increments = Vec::with_capacity(slices.len());
        let mut shortfalls = Vec::with_capacity(slices.len());
        let mut equilibrium_prices = Vec::with_capacity(slices.len() + 1);
        let mut execution_prices = Vec::with_capacity(slices.len());
        equilibrium_prices.push(price);

        for (slice, suite) in slices.iter().zip(suites) {
            let shortfall = slice.cost_increment_realization(price, suite, self.params)?;
            let increment = *shortfall.price_increment();

            price = increment.next_equilibrium_price();
            equilibrium_prices.push(price);
            execution_prices.push(increment.execution_price());
            price_increments.push(increment);
            shortfalls.push(shortfall);
        }

        let total_shortfall = shortfalls.iter().map(ShortfallIncrement::total).sum();
        Ok(PathRealization {
            price_increments,
            shortfalls,
            equilibrium_prices,
            execution_prices,
            total_shortfall,
        })
    }

    /// Realize one path drawing suites from `walks`
    pub fn simulate(&self, slices: &[Slice], walks: &mut WalkGenerator) -> Result<PathRealization> {
        walks.start_path();
        let suites = walks.suites(slices.len());
        self.realize(slices, &suites)
    }

    /// Sample mean and variance of total shortfall over `paths` seeded paths
    pub fn simulate_many(
        &self,
        slices: &[Slice],
        paths: usize,
        seed: u64,
    ) -> Result<ShortfallStatistics> {
        if paths < 2 {
            return Err(ExecutionError::InvalidInput {
                field: "paths",
                value: paths as f64,
            });
        }

        let mut walks = WalkGenerator::seeded(seed);
        let mut totals = Vec::with_capacity(paths);
        for path in 0..paths {
            let realization = self.simulate(slices, &mut walks)?;
            if path == 0 {
                debug!(
                    "First simulated path: shortfall={:.6e}, final price={:.6}",
                    realization.total_shortfall,
                    realization
                        .equilibrium_prices
                        .last()
                        .copied()
                        .unwrap_or(self.initial_price)
                );
            }
            totals.push(realization.total_shortfall);
        }

        let n = paths as f64;
        let mean = totals.iter().sum::<f64>() / n;
        let variance = totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (n - 1.0);

        info!(
            "Simulated {} paths over {} slices: mean shortfall={:.6e}, variance={:.6e}",
            paths,
            slices.len(),
            mean,
            variance
        );

        Ok(ShortfallStatistics {
            paths,
            mean,
            variance,
        })
    }
}
