//! Tranche Generator
//!
//! Optimal liquidation trajectories under a mean-variance objective `E + λV`.
//!
//! ## Schemes
//!
//! | scheme | impact | method |
//! |--------|--------|--------|
//! | [`Almgren2003Generator`] | linear permanent, power-law temporary, no drift | continuous closed form |
//! | [`Ac2000Generator`] | linear permanent and temporary, optional drift | discrete closed form |
//! | [`NumericalGenerator`] | any impact functions | Newton / steepest descent on the aggregated Greeks |
//! | [`ConstantTradingEnhancedGenerator`] | linear temporary, volatility `α` | continuous closed form |
//! | [`LinearTradingEnhancedGenerator`] | linear temporary, volatility `α + β\|v\|` | descent on the discretized moments |
//!
//! Every scheme is a [`TrajectoryGenerator`] bound to its parameters at
//! construction and produces a [`Trajectory`] on the nodes of a
//! [`TrajectoryControl`](tranche_dynamics::TrajectoryControl).

pub mod ac2000;
pub mod almgren2003;
pub mod generator;
pub mod numerical;
pub mod trading_enhanced;
pub mod trajectory;

// Re-export main types
pub use ac2000::Ac2000Generator;
pub use almgren2003::Almgren2003Generator;
pub use generator::{TrajectoryGenerator, trajectory_moments};
pub use numerical::NumericalGenerator;
pub use trading_enhanced::{ConstantTradingEnhancedGenerator, LinearTradingEnhancedGenerator};
pub use trajectory::{PowerLawHoldings, Trajectory, TrajectoryCharacteristics};
