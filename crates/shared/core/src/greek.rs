//! Control-node sensitivities
//!
//! Value, Jacobian and Hessian of a slice contribution with respect to its two
//! boundary holdings `(left, right)`.

use std::ops::Add;

use serde::Serialize;

use crate::error::{ExecutionError, Result};

/// Second-order sensitivity of a scalar w.r.t. `(left, right)` holdings
///
/// The Hessian is built from a single cross term, so it is symmetric by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlNodesGreek {
    value: f64,
    jacobian: [f64; 2],
    hessian: [[f64; 2]; 2],
}

impl ControlNodesGreek {
    pub const ZERO: Self = Self {
        value: 0.0,
        jacobian: [0.0; 2],
        hessian: [[0.0; 2]; 2],
    };

    pub fn new(
        value: f64,
        jacobian: [f64; 2],
        left_hessian: f64,
        cross_hessian: f64,
        right_hessian: f64,
    ) -> Result<Self> {
        let greek = Self {
            value,
            jacobian,
            hessian: [[left_hessian, cross_hessian], [cross_hessian, right_hessian]],
        };
        if !greek.is_finite() {
            return Err(ExecutionError::domain(
                "control nodes greek",
                format!("non-finite entry in {greek:?}"),
            ));
        }
        Ok(greek)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn jacobian(&self) -> &[f64; 2] {
        &self.jacobian
    }

    pub fn hessian(&self) -> &[[f64; 2]; 2] {
        &self.hessian
    }

    pub fn left_jacobian(&self) -> f64 {
        self.jacobian[0]
    }

    pub fn right_jacobian(&self) -> f64 {
        self.jacobian[1]
    }

    pub fn cross_hessian(&self) -> f64 {
        self.hessian[0][1]
    }

    fn is_finite(&self) -> bool {
        self.value.is_finite()
            && self.jacobian.iter().all(|v| v.is_finite())
            && self.hessian.iter().flatten().all(|v| v.is_finite())
    }
}

impl Add for ControlNodesGreek {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            value: self.value + other.value,
            jacobian: [
                self.jacobian[0] + other.jacobian[0],
                self.jacobian[1] + other.jacobian[1],
            ],
            hessian: [
                [
                    self.hessian[0][0] + other.hessian[0][0],
                    self.hessian[0][1] + other.hessian[0][1],
                ],
                [
                    self.hessian[1][0] + other.hessian[1][0],
                    self.hessian[1][1] + other.hessian[1][1],
                ],
            ],
        }
    }
}

impl Default for ControlNodesGreek {
    fn default() -> Self {
        Self::ZERO
    }
}
