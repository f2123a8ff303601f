//! Tranche Dynamics
//!
//! Discrete arithmetic dynamics of a liquidation schedule.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       TrajectoryControl                           │
//! │        time nodes t₀ = 0 < t₁ < … < tₙ = T, order X               │
//! └──────────────────────────────┬───────────────────────────────────┘
//!                                │ holdings h₀ … hₙ
//!                                ▼
//!        ┌──────────┐  ┌──────────┐          ┌──────────┐
//!        │ Slice 0  │  │ Slice 1  │   …      │ Slice n-1│
//!        │(h₀,h₁,τ₀)│  │(h₁,h₂,τ₁)│          │          │
//!        └────┬─────┘  └────┬─────┘          └────┬─────┘
//!             │ ControlNodesGreek (E and V)       │
//!             ▼                                   ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    SensitivityAggregator                          │
//! │     gradient (n+1) + symmetric tridiagonal Hessian (n+1)          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each slice can also be *realized* against a [`WalkSuite`] of standard normal
//! draws, yielding price and shortfall increments; [`PathSimulator`] strings those
//! together into full sample paths.

pub mod aggregator;
pub mod control;
pub mod distribution;
pub mod increment;
pub mod sensitivity;
pub mod simulation;
pub mod slice;
pub mod walk;

// Re-export main types
pub use aggregator::{SensitivityAggregator, TrajectoryGreek, TrajectorySensitivity};
pub use control::TrajectoryControl;
pub use distribution::ShortfallIncrementDistribution;
pub use increment::{MarketImpactComponent, PriceIncrement, ShortfallIncrement};
pub use sensitivity::ControlNodesGreekGenerator;
pub use simulation::{PathRealization, PathSimulator, ShortfallStatistics};
pub use slice::{SerialCorrelationAdjustment, Slice};
pub use walk::{WalkGenerator, WalkSuite};
