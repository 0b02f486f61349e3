//! Parallel stopping-time machinery: evaluates an `m`x`n` grid of
//! (alt-threshold, null-threshold) pairs concurrently against a stream of
//! per-step decision values, recording first-crossing time and decision
//! for each cell.
//!
//! Grounded on spec.md §3/§4.3. The legacy `two_sprt` in
//! `original_source/hypotheses/two_sprt.hpp` tracks the same idea with
//! separate boolean "have crossed" matrices; here the decision and the
//! crossing time are latched together once, as `which`/`when`, matching
//! the modern `parallel_stopping_time` referenced by
//! `original_source/src/gaussian_mean_hypotheses/xsprt.hpp`.

use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// The decision recorded for a single cell of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Decision {
    /// The cell has not yet crossed either boundary.
    #[default]
    Open,
    /// The vertical boundary (`B`) was crossed first: accept the null.
    Vertical,
    /// The horizontal boundary (`A`) was crossed first: reject the null.
    Horizontal,
}

/// Tracks, for an `m`x`n` grid of threshold pairs, when and which boundary
/// each cell first crosses.
///
/// `alt_thresholds` (`A`, length `m`) is compared against the "alt-side"
/// decision value each step; `null_thresholds` (`B`, length `n`) is
/// compared against the "null-side" decision value. Both vectors must be
/// supplied sorted (non-decreasing).
#[derive(Clone, Debug)]
pub struct ParallelStoppingTime {
    alt_thresholds: Vec<f64>,
    null_thresholds: Vec<f64>,
    which: DMatrix<Decision>,
    when: DMatrix<usize>,
    stopped_statistic: DMatrix<f64>,
    first_open: Vec<usize>,
    open_count: usize,
    pending_change_of_measure: f64,
}

impl ParallelStoppingTime {
    /// Build a new, fully-open stopping time over the given thresholds.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if either vector is empty, or
    /// [`Error::Domain`] if either is not sorted non-decreasing.
    pub fn new(alt_thresholds: Vec<f64>, null_thresholds: Vec<f64>) -> Result<Self> {
        if alt_thresholds.is_empty() {
            return Err(Error::invalid_argument(
                "at least one alt threshold must be specified",
            ));
        }
        if null_thresholds.is_empty() {
            return Err(Error::invalid_argument(
                "at least one null threshold must be specified",
            ));
        }
        if !is_sorted(&alt_thresholds) {
            return Err(Error::Domain("alt thresholds must be sorted".to_owned()));
        }
        if !is_sorted(&null_thresholds) {
            return Err(Error::Domain("null thresholds must be sorted".to_owned()));
        }

        let m = alt_thresholds.len();
        let n = null_thresholds.len();
        Ok(ParallelStoppingTime {
            alt_thresholds,
            null_thresholds,
            which: DMatrix::from_element(m, n, Decision::Open),
            when: DMatrix::zeros(m, n),
            stopped_statistic: DMatrix::zeros(m, n),
            first_open: vec![0; m],
            open_count: m * n,
            pending_change_of_measure: 0.0,
        })
    }

    pub fn height(&self) -> usize {
        self.alt_thresholds.len()
    }

    pub fn width(&self) -> usize {
        self.null_thresholds.len()
    }

    pub fn which(&self) -> &DMatrix<Decision> {
        &self.which
    }

    pub fn when(&self) -> &DMatrix<usize> {
        &self.when
    }

    pub fn stopped_statistic(&self) -> &DMatrix<f64> {
        &self.stopped_statistic
    }

    /// `true` while at least one cell is still open.
    pub fn is_running(&self) -> bool {
        self.open_count > 0
    }

    /// Reset every cell to open, clearing all recorded decisions.
    pub fn reset(&mut self) {
        self.which.fill(Decision::Open);
        self.when.fill(0);
        self.stopped_statistic.fill(0.0);
        for f in &mut self.first_open {
            *f = 0;
        }
        self.open_count = self.height() * self.width();
        self.pending_change_of_measure = 0.0;
    }

    /// Latch the change-of-measure statistic `c` to be recorded against
    /// any cell that crosses on the next call to [`Self::observe`].
    pub fn if_stopped(&mut self, c: f64) {
        self.pending_change_of_measure = c;
    }

    /// Feed one step's (alt-side, null-side) decision values, recorded as
    /// having occurred at observation count `t`.
    ///
    /// For row `i`, columns are evaluated from `first_open[i]` upward; as
    /// soon as a column neither crosses the alt-side threshold (row-wide)
    /// nor the null-side threshold (column-wide), evaluation of that row
    /// stops for this step — thresholds are sorted, so no later column
    /// could cross this step either. On simultaneous crossing, the
    /// horizontal (reject-null) decision wins.
    pub fn observe(&mut self, v_alt: f64, v_null: f64, t: usize) {
        if !self.is_running() {
            return;
        }
        let n = self.width();
        let c = self.pending_change_of_measure;

        for i in 0..self.height() {
            let crossed_alt = v_alt > self.alt_thresholds[i];
            let mut j = self.first_open[i];
            while j < n {
                let crossed_null = v_null > self.null_thresholds[j];
                if !crossed_alt && !crossed_null {
                    break;
                }
                let decision = if crossed_alt {
                    Decision::Horizontal
                } else {
                    Decision::Vertical
                };
                self.which[(i, j)] = decision;
                self.when[(i, j)] = t;
                self.stopped_statistic[(i, j)] = c;
                self.open_count -= 1;
                j += 1;
            }
            self.first_open[i] = j;
        }
    }
}

fn is_sorted(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_thresholds() {
        assert!(ParallelStoppingTime::new(vec![], vec![1.0]).is_err());
        assert!(ParallelStoppingTime::new(vec![1.0], vec![]).is_err());
    }

    #[test]
    fn rejects_unsorted_thresholds() {
        assert!(ParallelStoppingTime::new(vec![2.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn never_crossing_thresholds_stay_open_forever() {
        let mut pst =
            ParallelStoppingTime::new(vec![f64::INFINITY], vec![f64::INFINITY]).unwrap();
        for t in 1..1000 {
            pst.if_stopped(0.0);
            pst.observe(1.0, 1.0, t);
        }
        assert!(pst.is_running());
        assert_eq!(pst.when()[(0, 0)], 0);
    }

    #[test]
    fn always_crossing_thresholds_stop_at_first_observation_with_horizontal_tiebreak() {
        let mut pst =
            ParallelStoppingTime::new(vec![f64::NEG_INFINITY], vec![f64::NEG_INFINITY]).unwrap();
        pst.if_stopped(0.0);
        pst.observe(0.0, 0.0, 1);
        assert!(!pst.is_running());
        assert_eq!(pst.when()[(0, 0)], 1);
        assert_eq!(pst.which()[(0, 0)], Decision::Horizontal);
    }

    #[test]
    fn when_never_changes_once_set() {
        let mut pst = ParallelStoppingTime::new(vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        pst.if_stopped(0.0);
        pst.observe(1.5, 0.0, 1);
        let after_first = pst.when()[(0, 0)];
        pst.if_stopped(0.0);
        pst.observe(1.5, 0.0, 2);
        assert_eq!(pst.when()[(0, 0)], after_first);
    }

    #[test]
    fn monotone_in_thresholds() {
        // Larger thresholds should stop no earlier than smaller ones.
        let mut small = ParallelStoppingTime::new(vec![1.0], vec![1.0]).unwrap();
        let mut large = ParallelStoppingTime::new(vec![5.0], vec![5.0]).unwrap();
        for t in 1..20 {
            let v = t as f64 * 0.5;
            small.if_stopped(0.0);
            small.observe(v, v, t);
            large.if_stopped(0.0);
            large.observe(v, v, t);
        }
        if !small.is_running() && !large.is_running() {
            assert!(small.when()[(0, 0)] <= large.when()[(0, 0)]);
        }
    }

    #[test]
    fn stopped_statistic_records_latched_change_of_measure() {
        let mut pst =
            ParallelStoppingTime::new(vec![f64::NEG_INFINITY], vec![f64::NEG_INFINITY]).unwrap();
        pst.if_stopped(42.0);
        pst.observe(0.0, 0.0, 1);
        assert_eq!(pst.stopped_statistic()[(0, 0)], 42.0);
    }
}
