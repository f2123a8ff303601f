//! Execution errors

use thiserror::Error;
use tranche_numerics::NumericsError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// Non-finite or out-of-domain scalar rejected at construction
    #[error("Invalid input {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// Failure in the middle of a computation (poles, singular derivatives, non-finite greeks)
    #[error("Numerical domain violation in {context}: {reason}")]
    NumericalDomain {
        context: &'static str,
        reason: String,
    },

    #[error("Missing impact function: {0}")]
    MissingImpactFunction(&'static str),

    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Numerics(#[from] NumericsError),
}

impl ExecutionError {
    pub fn domain(context: &'static str, reason: impl Into<String>) -> Self {
        Self::NumericalDomain {
            context,
            reason: reason.into(),
        }
    }

    /// True for failures that arise mid-computation rather than at construction
    pub fn is_numerical_domain(&self) -> bool {
        matches!(
            self,
            Self::NumericalDomain { .. } | Self::MissingImpactFunction(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Reject NaN and infinities
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExecutionError::InvalidInput { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("x", 1.5).unwrap(), 1.5);
        assert!(matches!(
            ensure_finite("x", f64::NAN),
            Err(ExecutionError::InvalidInput { field: "x", .. })
        ));
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_classification() {
        assert!(ExecutionError::domain("slice", "pole").is_numerical_domain());
        assert!(ExecutionError::MissingImpactFunction("temporary volatility").is_numerical_domain());
        assert!(
            !ExecutionError::InvalidInput {
                field: "x",
                value: 0.0
            }
            .is_numerical_domain()
        );
    }

    #[test]
    fn test_numerics_error_converts() {
        let err: ExecutionError = NumericsError::SingularMatrix { row: 3 }.into();
        assert_eq!(err.to_string(), "Singular matrix: zero pivot at row 3");
    }
}
