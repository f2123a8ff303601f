//! Linear Algebra
//!
//! Vector helpers and a symmetric tridiagonal matrix.
//!
//! Curvature of a trajectory objective is banded: every slice only couples its two
//! boundary nodes, so the Hessian has non-zero entries on the diagonal and the first
//! off-diagonal only. Storing the two bands keeps assembly O(n) and lets the Thomas
//! algorithm solve Newton systems in O(n).

use serde::Serialize;

use crate::error::{NumericsError, NumericsResult};

/// Inner product of two equally sized vectors
pub fn dot(left: &[f64], right: &[f64]) -> NumericsResult<f64> {
    if left.len() != right.len() {
        return Err(NumericsError::DimensionMismatch {
            expected: left.len(),
            actual: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(a, b)| a * b).sum())
}

/// Largest absolute component (infinity norm); zero for an empty vector
pub fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Symmetric tridiagonal matrix stored as its diagonal and first super-diagonal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymmetricTridiagonal {
    diagonal: Vec<f64>,
    /// `off_diagonal[i]` is the entry at `(i, i + 1)` and `(i + 1, i)`
    off_diagonal: Vec<f64>,
}

impl SymmetricTridiagonal {
    /// Zero matrix of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            diagonal: vec![0.0; dimension],
            off_diagonal: vec![0.0; dimension.saturating_sub(1)],
        }
    }

    /// Build from explicit bands
    pub fn from_bands(diagonal: Vec<f64>, off_diagonal: Vec<f64>) -> NumericsResult<Self> {
        let expected = diagonal.len().saturating_sub(1);
        if off_diagonal.len() != expected {
            return Err(NumericsError::DimensionMismatch {
                expected,
                actual: off_diagonal.len(),
            });
        }
        Ok(Self {
            diagonal,
            off_diagonal,
        })
    }

    pub fn dimension(&self) -> usize {
        self.diagonal.len()
    }

    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    pub fn off_diagonal(&self) -> &[f64] {
        &self.off_diagonal
    }

    /// Entry at `(row, column)`; zero outside the band or the matrix
    pub fn get(&self, row: usize, column: usize) -> f64 {
        if row >= self.dimension() || column >= self.dimension() {
            return 0.0;
        }
        match row.abs_diff(column) {
            0 => self.diagonal[row],
            1 => self.off_diagonal[row.min(column)],
            _ => 0.0,
        }
    }

    /// Accumulate a symmetric 2×2 block whose top-left corner sits at `(index, index)`
    pub fn add_block(&mut self, index: usize, block: &[[f64; 2]; 2]) -> NumericsResult<()> {
        if index + 1 >= self.dimension() {
            return Err(NumericsError::DimensionMismatch {
                expected: self.dimension(),
                actual: index + 2,
            });
        }
        self.diagonal[index] += block[0][0];
        self.diagonal[index + 1] += block[1][1];
        self.off_diagonal[index] += block[0][1];
        Ok(())
    }

    /// `self + factor × other`
    pub fn scaled_add(&self, other: &Self, factor: f64) -> NumericsResult<Self> {
        if self.dimension() != other.dimension() {
            return Err(NumericsError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }
        Ok(Self {
            diagonal: self
                .diagonal
                .iter()
                .zip(&other.diagonal)
                .map(|(a, b)| a + factor * b)
                .collect(),
            off_diagonal: self
                .off_diagonal
                .iter()
                .zip(&other.off_diagonal)
                .map(|(a, b)| a + factor * b)
                .collect(),
        })
    }

    /// Square block of `length` rows/columns starting at `start`
    pub fn principal_block(&self, start: usize, length: usize) -> NumericsResult<Self> {
        if start + length > self.dimension() {
            return Err(NumericsError::DimensionMismatch {
                expected: self.dimension(),
                actual: start + length,
            });
        }
        let diagonal = self.diagonal[start..start + length].to_vec();
        let off_diagonal = if length > 1 {
            self.off_diagonal[start..start + length - 1].to_vec()
        } else {
            Vec::new()
        };
        Ok(Self {
            diagonal,
            off_diagonal,
        })
    }

    /// Matrix-vector product
    pub fn multiply(&self, vector: &[f64]) -> NumericsResult<Vec<f64>> {
        let n = self.dimension();
        if vector.len() != n {
            return Err(NumericsError::DimensionMismatch {
                expected: n,
                actual: vector.len(),
            });
        }

        let mut product = Vec::with_capacity(n);
        for i in 0..n {
            let mut sum = self.diagonal[i] * vector[i];
            if i > 0 {
                sum += self.off_diagonal[i - 1] * vector[i - 1];
            }
            if i + 1 < n {
                sum += self.off_diagonal[i] * vector[i + 1];
            }
            product.push(sum);
        }
        Ok(product)
    }

    /// Solve `A x = rhs` with the Thomas algorithm
    ///
    /// No pivoting is performed; a pivot that vanishes relative to the matrix scale
    /// is reported as [`NumericsError::SingularMatrix`].
    pub fn solve(&self, rhs: &[f64]) -> NumericsResult<Vec<f64>> {
        let n = self.dimension();
        if rhs.len() != n {
            return Err(NumericsError::DimensionMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let scale = max_abs(&self.diagonal).max(max_abs(&self.off_diagonal));
        let tolerance = f64::EPSILON * scale.max(f64::MIN_POSITIVE);

        let mut upper = vec![0.0; n];
        let mut forward = vec![0.0; n];

        let mut pivot = self.diagonal[0];
        if pivot.abs() <= tolerance {
            return Err(NumericsError::SingularMatrix { row: 0 });
        }
        if n > 1 {
            upper[0] = self.off_diagonal[0] / pivot;
        }
        forward[0] = rhs[0] / pivot;

        for i in 1..n {
            pivot = self.diagonal[i] - self.off_diagonal[i - 1] * upper[i - 1];
            if pivot.abs() <= tolerance || !pivot.is_finite() {
                return Err(NumericsError::SingularMatrix { row: i });
            }
            if i + 1 < n {
                upper[i] = self.off_diagonal[i] / pivot;
            }
            forward[i] = (rhs[i] - self.off_diagonal[i - 1] * forward[i - 1]) / pivot;
        }

        let mut solution = forward;
        for i in (0..n - 1).rev() {
            solution[i] -= upper[i] * solution[i + 1];
        }

        if solution.iter().any(|v| !v.is_finite()) {
            return Err(NumericsError::NonFinite("tridiagonal solve"));
        }
        Ok(solution)
    }

    /// Dense row-major copy, mostly useful for diagnostics and tests
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let n = self.dimension();
        (0..n)
            .map(|row| (0..n).map(|column| self.get(row, column)).collect())
            .collect()
    }
}
