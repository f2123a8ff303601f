use thiserror::Error;

/// Errors raised by the generic numerical toolkit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericsError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Singular matrix: zero pivot at row {row}")]
    SingularMatrix { row: usize },

    #[error("Non-finite value encountered in {0}")]
    NonFinite(&'static str),

    #[error("Line search failed: {0}")]
    LineSearchFailed(String),

    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: f64 },
}

pub type NumericsResult<T> = std::result::Result<T, NumericsError>;
