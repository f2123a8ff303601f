//! Impact functions
//!
//! Scalar functions of the execution rate `r = trade / duration` that drive the
//! permanent and temporary price components and their volatilities.

pub mod linear;
pub mod power_law;
pub mod protocol;
pub mod spec;

pub use linear::LinearImpact;
pub use power_law::PowerLawImpact;
pub use protocol::{DerivativeOrder, ImpactFunction};
pub use spec::ImpactSpec;
