//! Random walk draws
//!
//! Every slice consumes four independent standard normal draws. The market-core
//! shock of one slice is carried into the next as its "previous" draw, which is
//! how serial correlation enters the realized dynamics.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

/// Standard normal draws driving one slice
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WalkSuite {
    pub market_core_current: f64,
    pub market_core_previous: f64,
    pub permanent_impact: f64,
    pub temporary_impact: f64,
}

impl WalkSuite {
    pub fn new(
        market_core_current: f64,
        market_core_previous: f64,
        permanent_impact: f64,
        temporary_impact: f64,
    ) -> Self {
        Self {
            market_core_current,
            market_core_previous,
            permanent_impact,
            temporary_impact,
        }
    }

    /// All draws zero: the realization collapses onto its deterministic part
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Seeded generator of chained walk suites
#[derive(Debug, Clone)]
pub struct WalkGenerator {
    rng: StdRng,
    previous_market_core: f64,
}

impl WalkGenerator {
    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let previous_market_core = rng.sample(StandardNormal);
        Self {
            rng,
            previous_market_core,
        }
    }

    pub fn from_entropy() -> Self {
        let mut rng = StdRng::from_entropy();
        let previous_market_core = rng.sample(StandardNormal);
        Self {
            rng,
            previous_market_core,
        }
    }

    /// Begin an independent path: the pre-execution market-core shock is redrawn
    pub fn start_path(&mut self) {
        self.previous_market_core = self.rng.sample(StandardNormal);
    }

    /// Draw the suite for the next slice
    pub fn next_suite(&mut self) -> WalkSuite {
        let current: f64 = self.rng.sample(StandardNormal);
        let suite = WalkSuite {
            market_core_current: current,
            market_core_previous: self.previous_market_core,
            permanent_impact: self.rng.sample(StandardNormal),
            temporary_impact: self.rng.sample(StandardNormal),
        };
        self.previous_market_core = current;
        suite
    }

    /// Suites for `count` consecutive slices
    pub fn suites(&mut self, count: usize) -> Vec<WalkSuite> {
        (0..count).map(|_| self.next_suite()).collect()
    }
}
