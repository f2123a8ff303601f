//! Realized increments
//!
//! A price increment over one slice is split into four components, each with a
//! deterministic and a stochastic part:
//!
//! ```text
//! ΔS = market core (current) + market core (previous) + permanent  → equilibrium move
//! S̃  = S_next + temporary                                          → execution price
//! ```
//!
//! The shortfall charged for the slice follows the inventory convention: holdings
//! left after the slice (`left + trade`) lose whatever the equilibrium price loses,
//! and the traded amount pays the temporary component.

use serde::Serialize;

/// Decomposition of a price move over one slice
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MarketImpactComponent {
    pub market_core_current: f64,
    pub market_core_previous: f64,
    pub permanent_impact: f64,
    pub temporary_impact: f64,
}

impl MarketImpactComponent {
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

    pub fn market_core(&self) -> f64 {
        self.market_core_current + self.market_core_previous
    }

    /// Move of the equilibrium (unaffected + permanently impacted) price
    pub fn equilibrium(&self) -> f64 {
        self.market_core() + self.permanent_impact
    }

    pub fn total(&self) -> f64 {
        self.equilibrium() + self.temporary_impact
    }
}

/// Realized price move over one slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceIncrement {
    previous_price: f64,
    deterministic: MarketImpactComponent,
    stochastic: MarketImpactComponent,
}

impl PriceIncrement {
    pub fn new(
        previous_price: f64,
        deterministic: MarketImpactComponent,
        stochastic: MarketImpactComponent,
    ) -> Self {
        Self {
            previous_price,
            deterministic,
            stochastic,
        }
    }

    pub fn previous_price(&self) -> f64 {
        self.previous_price
    }

    pub fn deterministic(&self) -> &MarketImpactComponent {
        &self.deterministic
    }

    pub fn stochastic(&self) -> &MarketImpactComponent {
        &self.stochastic
    }

    pub fn market_core_increment(&self) -> f64 {
        self.deterministic.market_core() + self.stochastic.market_core()
    }

    pub fn permanent_impact_increment(&self) -> f64 {
        self.deterministic.permanent_impact + self.stochastic.permanent_impact
    }

    /// Temporary price concession paid on the executed amount
    pub fn temporary_impact(&self) -> f64 {
        self.deterministic.temporary_impact + self.stochastic.temporary_impact
    }

    pub fn equilibrium_increment(&self) -> f64 {
        self.deterministic.equilibrium() + self.stochastic.equilibrium()
    }

    pub fn next_equilibrium_price(&self) -> f64 {
        self.previous_price + self.equilibrium_increment()
    }

    pub fn execution_price(&self) -> f64 {
        self.next_equilibrium_price() + self.temporary_impact()
    }
}

/// Realized implementation shortfall over one slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShortfallIncrement {
    price_increment: PriceIncrement,
    left_holdings: f64,
    trade_amount: f64,
}

impl ShortfallIncrement {
    pub fn new(price_increment: PriceIncrement, left_holdings: f64, trade_amount: f64) -> Self {
        Self {
            price_increment,
            left_holdings,
            trade_amount,
        }
    }

    pub fn price_increment(&self) -> &PriceIncrement {
        &self.price_increment
    }

    pub fn left_holdings(&self) -> f64 {
        self.left_holdings
    }

    pub fn trade_amount(&self) -> f64 {
        self.trade_amount
    }

    /// Holdings carried through the slice's price move
    pub fn right_holdings(&self) -> f64 {
        self.left_holdings + self.trade_amount
    }

    pub fn market_core_shortfall(&self) -> f64 {
        -self.right_holdings() * self.price_increment.market_core_increment()
    }

    pub fn permanent_impact_shortfall(&self) -> f64 {
        -self.right_holdings() * self.price_increment.permanent_impact_increment()
    }

    pub fn temporary_impact_shortfall(&self) -> f64 {
        self.trade_amount * self.price_increment.temporary_impact()
    }

    pub fn total(&self) -> f64 {
        self.market_core_shortfall()
            + self.permanent_impact_shortfall()
            + self.temporary_impact_shortfall()
    }
}
