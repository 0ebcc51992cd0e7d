//! Cost estimates

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Estimated cost of a plan node or subtree
///
/// Adding two estimates composes them sequentially: time and memory sum,
/// rows keep the larger intermediate result, selectivities multiply and
/// the weaker confidence wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Rows produced
    pub rows: f64,
    /// Abstract time units
    pub time: f64,
    /// Bytes held
    pub memory: f64,
    /// Fraction of input rows surviving, in [0, 1]
    pub selectivity: f64,
    /// Trust in the estimate, in [0, 1]
    pub confidence: f64,
}

impl CostEstimate {
    pub fn new(rows: f64, time: f64, memory: f64, selectivity: f64, confidence: f64) -> Self {
        Self {
            rows: rows.max(0.0),
            time: time.max(0.0),
            memory: memory.max(0.0),
            selectivity: selectivity.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The identity for `+`
    pub fn zero() -> Self {
        Self {
            rows: 0.0,
            time: 0.0,
            memory: 0.0,
            selectivity: 1.0,
            confidence: 1.0,
        }
    }

    /// Fractional time saved going from `self` to `other`, 0.0 when nothing was saved
    pub fn reduction_to(&self, other: &CostEstimate) -> f64 {
        if self.time <= 0.0 {
            return 0.0;
        }
        ((self.time - other.time) / self.time).max(0.0)
    }
}

impl Default for CostEstimate {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for CostEstimate {
    type Output = CostEstimate;

    fn add(self, other: CostEstimate) -> CostEstimate {
        CostEstimate {
            rows: self.rows.max(other.rows),
            time: self.time + other.time,
            memory: self.memory + other.memory,
            selectivity: self.selectivity * other.selectivity,
            confidence: self.confidence.min(other.confidence),
        }
    }
}

impl Mul<f64> for CostEstimate {
    type Output = CostEstimate;

    /// Scale rows, time and memory
    fn mul(self, factor: f64) -> CostEstimate {
        CostEstimate {
            rows: self.rows * factor,
            time: self.time * factor,
            memory: self.memory * factor,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition() {
        let a = CostEstimate::new(100.0, 2.0, 10.0, 0.5, 0.9);
        let b = CostEstimate::new(40.0, 3.0, 5.0, 0.1, 0.7);
        let sum = a + b;
        assert_eq!(sum.rows, 100.0);
        assert_eq!(sum.time, 5.0);
        assert_eq!(sum.memory, 15.0);
        assert!((sum.selectivity - 0.05).abs() < 1e-12);
        assert_eq!(sum.confidence, 0.7);
    }

    #[test]
    fn test_zero_is_identity() {
        let a = CostEstimate::new(7.0, 1.5, 3.0, 0.3, 0.8);
        assert_eq!(a + CostEstimate::zero(), a);
    }

    #[test]
    fn test_scaling() {
        let a = CostEstimate::new(10.0, 2.0, 4.0, 0.5, 0.9) * 5.0;
        assert_eq!((a.rows, a.time, a.memory), (50.0, 10.0, 20.0));
        assert_eq!((a.selectivity, a.confidence), (0.5, 0.9));
    }

    #[test]
    fn test_new_clamps() {
        let a = CostEstimate::new(-1.0, 1.0, 1.0, 1.5, -0.2);
        assert_eq!(a.rows, 0.0);
        assert_eq!(a.selectivity, 1.0);
        assert_eq!(a.confidence, 0.0);
    }

    #[test]
    fn test_reduction() {
        let before = CostEstimate::new(1.0, 10.0, 0.0, 1.0, 1.0);
        let after = CostEstimate::new(1.0, 4.0, 0.0, 1.0, 1.0);
        assert!((before.reduction_to(&after) - 0.6).abs() < 1e-12);
        assert_eq!(after.reduction_to(&before), 0.0);
        assert_eq!(CostEstimate::zero().reduction_to(&after), 0.0);
    }
}
