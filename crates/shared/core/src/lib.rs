//! Tranche Core Domain
//!
//! Pure domain types for execution-cost modelling.
//! This crate contains no I/O and is 100% unit testable.
//!
//! - **Impact functions**: the [`ImpactFunction`] contract and its linear / power-law variants
//! - **Evolution parameters**: market-core drift, volatility, serial correlation plus the four
//!   impact functions of one asset
//! - **Greeks**: value, Jacobian and Hessian of a slice contribution w.r.t. its control nodes
//! - **Order & objective**: the parent order and the mean-variance risk objective

pub mod error;
pub mod greek;
pub mod impact;
pub mod order;
pub mod parameters;

// Re-export commonly used types at crate root
pub use error::{ExecutionError, Result, ensure_finite};
pub use greek::ControlNodesGreek;
pub use impact::{DerivativeOrder, ImpactFunction, ImpactSpec, LinearImpact, PowerLawImpact};
pub use order::{MeanVarianceObjective, OrderSpecification};
pub use parameters::{
    EvolutionParameters, LinearImpactParameters, MarketCore, PowerLawImpactParameters,
    TradingEnhancedVolatilityParameters,
};
