//! Tranche Numerics
//!
//! Generic numerical infrastructure used by the trajectory solvers.
//! Nothing in this crate knows about execution: it provides
//!
//! - **Linear algebra**: dot products and a symmetric tridiagonal matrix with a Thomas solver
//! - **Line search**: Armijo sufficient-decrease and Wolfe curvature verifiers, backtracking search
//! - **Descent**: an unconstrained minimizer taking Newton steps on banded curvature
//!   and falling back to steepest descent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tranche_numerics::{DescentSettings, minimize};
//!
//! let outcome = minimize(&objective, start, &DescentSettings::default())?;
//! assert!(outcome.converged);
//! ```

pub mod descent;
pub mod error;
pub mod line_search;
pub mod linalg;

// Re-export main types
pub use descent::{DescentObjective, DescentOutcome, DescentSettings, Evaluation, minimize};
pub use error::{NumericsError, NumericsResult};
pub use line_search::{
    CurvatureVerifier, LineSearchSettings, LineSearchStep, SufficientDecreaseVerifier,
    backtracking_search,
};
pub use linalg::{SymmetricTridiagonal, dot, max_abs};
