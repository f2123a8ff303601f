//! Tranche Runner - Configured Trajectory Runs
//!
//! Loads a JSON run configuration, builds the selected scheme, generates the
//! optimal trajectory and optionally realizes it over Monte-Carlo paths.
//!
//! ## Flow
//!
//! ```text
//!   run.json ──► RunConfigFile ──► Scheme ──► TrajectoryGenerator::generate
//!                     │                │                 │
//!                     │                │                 ▼
//!                     │                │            Trajectory
//!                     │                │                 │
//!                     │                └──► PathSimulator (optional)
//!                     │                                  │
//!                     └──────────────────────────────► RunReport (JSON)
//! ```

pub mod app;
pub mod config;

// Re-export main types
pub use app::{RunError, RunReport, Scheme, SimulationReport, run};
pub use config::{
    ConfigError, RunConfigFile, SchemeConfig, load_config, load_config_from_str,
    load_default_config,
};
