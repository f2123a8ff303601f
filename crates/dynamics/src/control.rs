//! Trajectory control
//!
//! Partition of the execution horizon `[0, T]` into time nodes. A holdings vector
//! `h₀ … hₙ` on those nodes is turned into the `n` slices `(hᵢ, hᵢ₊₁, tᵢ₊₁ - tᵢ)`.

use serde::Serialize;
use tranche_core::{ExecutionError, OrderSpecification, Result};

use crate::slice::Slice;

const UNIFORM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryControl {
    order: OrderSpecification,
    time_nodes: Vec<f64>,
}

impl TrajectoryControl {
    /// Split `[0, T]` into `intervals` equal sub-intervals
    pub fn fixed_interval(order: OrderSpecification, intervals: usize) -> Result<Self> {
        if intervals == 0 {
            return Err(ExecutionError::InvalidInput {
                field: "intervals",
                value: 0.0,
            });
        }
        let finish_time = order.finish_time();
        let step = finish_time / intervals as f64;
        let mut time_nodes: Vec<f64> = (0..intervals).map(|i| i as f64 * step).collect();
        time_nodes.push(finish_time);

        Ok(Self { order, time_nodes })
    }

    /// Explicit nodes: strictly increasing, starting at 0 and ending at the order's finish time
    pub fn from_nodes(order: OrderSpecification, time_nodes: Vec<f64>) -> Result<Self> {
        if time_nodes.len() < 2 {
            return Err(ExecutionError::InvalidInput {
                field: "time_nodes",
                value: time_nodes.len() as f64,
            });
        }
        if time_nodes[0] != 0.0 {
            return Err(ExecutionError::InvalidInput {
                field: "first time node",
                value: time_nodes[0],
            });
        }
        let last = time_nodes[time_nodes.len() - 1];
        let finish_time = order.finish_time();
        if (last - finish_time).abs() > UNIFORM_TOLERANCE * finish_time {
            return Err(ExecutionError::InvalidInput {
                field: "last time node",
                value: last,
            });
        }

        // Ordering is checked against the snapped horizon
        let mut time_nodes = time_nodes;
        if let Some(end) = time_nodes.last_mut() {
            *end = finish_time;
        }
        for pair in time_nodes.windows(2) {
            if !(pair[1].is_finite() && pair[1] > pair[0]) {
                return Err(ExecutionError::InvalidInput {
                    field: "time node",
                    value: pair[1],
                });
            }
        }
        Ok(Self { order, time_nodes })
    }

    pub fn order(&self) -> &OrderSpecification {
        &self.order
    }

    pub fn start_holdings(&self) -> f64 {
        self.order.start_holdings()
    }

    pub fn finish_time(&self) -> f64 {
        self.order.finish_time()
    }

    pub fn time_nodes(&self) -> &[f64] {
        &self.time_nodes
    }

    pub fn node_count(&self) -> usize {
        self.time_nodes.len()
    }

    pub fn interval_count(&self) -> usize {
        self.time_nodes.len() - 1
    }

    pub fn intervals(&self) -> Vec<f64> {
        self.time_nodes.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Common interval length when the partition is uniform
    pub fn uniform_interval(&self) -> Option<f64> {
        let tau = self.finish_time() / self.interval_count() as f64;
        self.intervals()
            .iter()
            .all(|dt| (dt - tau).abs() <= UNIFORM_TOLERANCE * tau)
            .then_some(tau)
    }

    /// Straight-line (TWAP) schedule `X (1 - t/T)`
    pub fn linear_holdings(&self) -> Vec<f64> {
        let x = self.start_holdings();
        let finish_time = self.finish_time();
        let mut holdings: Vec<f64> = self
            .time_nodes
            .iter()
            .map(|t| x * (1.0 - t / finish_time))
            .collect();
        if let Some(last) = holdings.last_mut() {
            *last = 0.0;
        }
        holdings
    }

    /// Holdings must have one finite entry per node
    pub fn validate_holdings(&self, holdings: &[f64]) -> Result<()> {
        if holdings.len() != self.node_count() {
            return Err(ExecutionError::DimensionMismatch {
                expected: self.node_count(),
                actual: holdings.len(),
            });
        }
        if let Some(bad) = holdings.iter().find(|h| !h.is_finite()) {
            return Err(ExecutionError::InvalidInput {
                field: "holdings",
                value: *bad,
            });
        }
        Ok(())
    }

    /// Trades `hᵢ₊₁ - hᵢ` (negative for sells)
    pub fn trades(&self, holdings: &[f64]) -> Result<Vec<f64>> {
        self.validate_holdings(holdings)?;
        Ok(holdings.windows(2).map(|w| w[1] - w[0]).collect())
    }

    pub fn slices(&self, holdings: &[f64]) -> Result<Vec<Slice>> {
        self.validate_holdings(holdings)?;
        holdings
            .windows(2)
            .zip(self.time_nodes.windows(2))
            .map(|(h, t)| Slice::new(h[0], h[1], t[1] - t[0]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn order() -> OrderSpecification {
        OrderSpecification::new(1e5, 5.0).unwrap()
    }

    #[test]
    fn test_fixed_interval() {
        let control = TrajectoryControl::fixed_interval(order(), 10).unwrap();

        assert_eq!(control.node_count(), 11);
        assert_eq!(control.interval_count(), 10);
        assert_eq!(control.time_nodes()[0], 0.0);
        assert_eq!(control.time_nodes()[10], 5.0);
        assert_relative_eq!(control.uniform_interval().unwrap(), 0.5);
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert!(matches!(
            TrajectoryControl::fixed_interval(order(), 0),
            Err(ExecutionError::InvalidInput {
                field: "intervals",
                ..
            })
        ));
    }

    #[test]
    fn test_explicit_nodes() {
        let control = TrajectoryControl::from_nodes(order(), vec![0.0, 1.0, 2.5, 5.0]).unwrap();
        assert_eq!(control.intervals(), vec![1.0, 1.5, 2.5]);
        assert!(control.uniform_interval().is_none());

        assert!(TrajectoryControl::from_nodes(order(), vec![0.0, 2.0, 2.0, 5.0]).is_err());
        assert!(TrajectoryControl::from_nodes(order(), vec![0.5, 2.0, 5.0]).is_err());
        assert!(TrajectoryControl::from_nodes(order(), vec![0.0, 2.0, 4.0]).is_err());
        assert!(TrajectoryControl::from_nodes(order(), vec![0.0]).is_err());
    }

    #[test]
    fn test_nodes_past_horizon_rejected_after_snapping() {
        // Both trailing nodes sit within tolerance of T but beyond it
        let result = TrajectoryControl::from_nodes(order(), vec![0.0, 5.0 + 3e-9, 5.0 + 4e-9]);
        assert!(matches!(
            result,
            Err(ExecutionError::InvalidInput {
                field: "time node",
                ..
            })
        ));

        let snapped =
            TrajectoryControl::from_nodes(order(), vec![0.0, 2.5, 5.0 + 4e-9]).unwrap();
        assert_eq!(snapped.time_nodes()[2], 5.0);
        assert!(snapped.intervals().iter().all(|dt| *dt > 0.0));
    }

    #[test]
    fn test_linear_holdings_and_slices() {
        let control = TrajectoryControl::fixed_interval(order(), 4).unwrap();
        let holdings = control.linear_holdings();
        assert_eq!(holdings, vec![1e5, 75e3, 5e4, 25e3, 0.0]);

        let slices = control.slices(&holdings).unwrap();
        assert_eq!(slices.len(), 4);
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.left_holdings(), holdings[i]);
            assert_eq!(slice.right_holdings(), holdings[i + 1]);
            assert_relative_eq!(slice.time_interval(), 1.25);
        }

        assert_eq!(
            control.trades(&holdings).unwrap(),
            vec![-25e3, -25e3, -25e3, -25e3]
        );
    }

    #[test]
    fn test_holdings_validation() {
        let control = TrajectoryControl::fixed_interval(order(), 2).unwrap();
        assert!(matches!(
            control.slices(&[1.0, 0.0]),
            Err(ExecutionError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(control.slices(&[1.0, f64::NAN, 0.0]).is_err());
    }
}
