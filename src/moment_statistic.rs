//! Numerically stable (mean, variance) accumulator over an arbitrary
//! additive container — a scalar or a matrix.
//!
//! Ported from `original_source/hypotheses/moment_statistic.hpp`. The
//! accumulator stores a count, a running sum, and a shift-anchored sum of
//! squared deviations (`sum_of_shifted_squares`), where the shift is a
//! fixed "anticipated value" prior fixed at construction. This shape —
//! rather than a naive Welford update — is what lets two partial
//! accumulators be merged by simply adding their `count`, `sum`, and
//! `sum_of_shifted_squares` fields (see [`MomentStatistic::merge`]).

use nalgebra::DMatrix;
use std::ops::{Add, Div, Mul, Sub};

/// Types that support an elementwise (Hadamard) self-product, used to
/// compute `(x - shift)^2` for both scalars and matrices.
pub trait ElementSquare {
    fn element_square(&self) -> Self;
}

impl ElementSquare for f64 {
    fn element_square(&self) -> Self {
        self * self
    }
}

impl ElementSquare for DMatrix<f64> {
    fn element_square(&self) -> Self {
        self.component_mul(self)
    }
}

/// A mean/variance accumulator anchored at `shift`.
#[derive(Clone, Debug)]
pub struct MomentStatistic<T> {
    count: usize,
    shift: T,
    sum: T,
    sum_of_shifted_squares: T,
}

impl<T> MomentStatistic<T>
where
    T: Clone
        + ElementSquare
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<f64, Output = T>
        + Div<f64, Output = T>,
{
    /// Create an empty accumulator. `zero` is the additive identity of `T`
    /// (e.g. `0.0`, or a zero matrix of the target shape); `shift` is the
    /// anticipated mean used to stabilize the variance computation.
    pub fn new(zero: T, shift: T) -> Self {
        MomentStatistic {
            count: 0,
            shift,
            sum: zero.clone(),
            sum_of_shifted_squares: zero,
        }
    }

    /// Number of observations folded into this accumulator.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Fold a single observation into the accumulator.
    pub fn observe(&mut self, value: T) {
        let deviation = value.clone() - self.shift.clone();
        self.sum = self.sum.clone() + value;
        self.sum_of_shifted_squares =
            self.sum_of_shifted_squares.clone() + deviation.element_square();
        self.count += 1;
    }

    /// Merge another accumulator's counts and sums into this one. Merging
    /// is commutative and associative up to floating-point
    /// non-associativity, which is exactly what lets per-worker
    /// aggregators be reduced in any order.
    pub fn merge(&mut self, other: &MomentStatistic<T>) {
        self.sum = self.sum.clone() + other.sum.clone();
        self.sum_of_shifted_squares =
            self.sum_of_shifted_squares.clone() + other.sum_of_shifted_squares.clone();
        self.count += other.count;
    }

    /// Sample mean. Caller must ensure `count() > 0`.
    pub fn mean(&self) -> T {
        self.sum.clone() / (self.count as f64)
    }

    /// Sample variance (n-1 denominator). Caller must ensure `count() > 1`.
    ///
    /// `(n-1) var = sum(x - shift)^2 - n (mean - shift)^2`
    pub fn variance(&self) -> T {
        let n = self.count as f64;
        let mean_minus_shift = self.mean() - self.shift.clone();
        let correction = mean_minus_shift.element_square() * n;
        (self.sum_of_shifted_squares.clone() - correction) / (n - 1.0)
    }
}
