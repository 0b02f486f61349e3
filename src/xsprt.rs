//! The incremental XSPRT statistic: maintains running sufficient
//! statistics and emits, per observation, decision values for two
//! stopping rules (ASPRT and GSPRT), delegating stopping to a pair of
//! [`ParallelStoppingTime`] children.
//!
//! Grounded on spec.md §4.2 and
//! `original_source/src/gaussian_mean_hypotheses/xsprt.hpp`.

use nalgebra::DMatrix;

use crate::clip::was_above;
use crate::error::Result;
use crate::model::Model;
use crate::stopping_time::{Decision, ParallelStoppingTime};

/// Running sufficient statistics shared by the ASPRT and GSPRT decision
/// streams. Mutated only by [`Xsprt::observe`] and [`Xsprt::reset`].
#[derive(Clone, Copy, Debug, Default)]
pub struct XsprtState {
    pub sum_sy: f64,
    pub sum_ss: f64,
    pub sum_adaptive: f64,
    pub init_null: f64,
    pub init_alt: f64,
    pub delayed_mu_hat: f64,
    pub n: usize,
}

impl XsprtState {
    /// The log-likelihood ratio kernel `L(a, b) = (a-b) * (sum_sy - (a+b)/2 * sum_ss)`.
    ///
    /// Antisymmetric: `L(a, b) == -L(b, a)`.
    pub fn log_likelihood_ratio(&self, a: f64, b: f64) -> f64 {
        (a - b) * (self.sum_sy - ((a + b) / 2.0) * self.sum_ss)
    }
}

/// A pair of values, one for ASPRT and one for GSPRT, as produced by
/// [`Xsprt::output`].
#[derive(Clone, Debug)]
pub struct XsprtPair<T> {
    pub asprt: T,
    pub gsprt: T,
}

/// A replication's recorded outcome: for each stopping rule, the
/// element-wise stopping time, direct-error indicator, and
/// importance-error indicator over the threshold grid.
#[derive(Clone, Debug)]
pub struct SimulationOutput {
    pub anticipated_sample_size: f64,
    pub when_stopped: XsprtPair<DMatrix<usize>>,
    pub direct_error_indicator: XsprtPair<DMatrix<f64>>,
    pub importance_error_indicator: XsprtPair<DMatrix<f64>>,
}

impl SimulationOutput {
    pub fn height(&self) -> usize {
        self.when_stopped.asprt.nrows()
    }

    pub fn width(&self) -> usize {
        self.when_stopped.asprt.ncols()
    }
}

/// Threshold grid passed to a single [`ParallelStoppingTime`]: `(alt,
/// null)` vectors.
pub type Thresholds = (Vec<f64>, Vec<f64>);

/// The incremental sequential statistic underlying both ASPRT and GSPRT.
///
/// Owns the model, the running [`XsprtState`], and two
/// [`ParallelStoppingTime`] children (one per stopping rule). Per
/// observation, `observe` updates the shared state once, then submits a
/// (alt-side, null-side) decision-value pair to each child.
#[derive(Clone, Debug)]
pub struct Xsprt {
    model: Model,
    n: usize,
    state: XsprtState,
    asprt: ParallelStoppingTime,
    gsprt: ParallelStoppingTime,
    simulated_signal_strength: f64,
    change_of_measure_signal_strength: f64,
    anticipated_sample_size: f64,
}

impl Xsprt {
    pub fn new(
        model: Model,
        asprt_thresholds: Thresholds,
        gsprt_thresholds: Thresholds,
        simulated_signal_strength: f64,
        change_of_measure_signal_strength: f64,
        anticipated_sample_size: f64,
    ) -> Result<Self> {
        let asprt = ParallelStoppingTime::new(asprt_thresholds.0, asprt_thresholds.1)?;
        let gsprt = ParallelStoppingTime::new(gsprt_thresholds.0, gsprt_thresholds.1)?;
        Ok(Xsprt {
            model,
            n: 0,
            state: XsprtState::default(),
            asprt,
            gsprt,
            simulated_signal_strength,
            change_of_measure_signal_strength,
            anticipated_sample_size,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn simulated_signal_strength(&self) -> f64 {
        self.simulated_signal_strength
    }

    pub fn change_of_measure_signal_strength(&self) -> f64 {
        self.change_of_measure_signal_strength
    }

    pub fn anticipated_sample_size(&self) -> f64 {
        self.anticipated_sample_size
    }

    /// Current value of the running sufficient statistics. Exposed
    /// primarily for tests of the numeric invariants in spec.md §8.
    pub fn state(&self) -> &XsprtState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.asprt.is_running() || self.gsprt.is_running()
    }

    pub fn reset(&mut self) {
        self.n = 0;
        self.state = XsprtState::default();
        self.asprt.reset();
        self.gsprt.reset();
    }

    /// Fold one new observation `x` into the running statistics and
    /// advance both stopping times by one step.
    ///
    /// See spec.md §4.2 steps 1-9. The one-step delay between computing
    /// `mu_hat` and using it in the ASPRT likelihood is load-bearing for
    /// the martingale property and must not be "optimized away".
    pub fn observe(&mut self, x: f64) {
        self.n += 1;
        let t = self.n;
        let s = self.model.signal_at(t);

        self.state.sum_sy += s * x;
        self.state.sum_ss += s * s;

        let mut mu_hat = self.state.sum_sy / self.state.sum_ss;
        was_above(&mut mu_hat, 0.0);
        let mut mu_tilde = mu_hat;
        was_above(&mut mu_tilde, self.model.weakest_signal_strength());

        if t == 1 {
            self.state.init_null = 0.0;
            let y = mu_tilde * s;
            self.state.init_alt = y * (x - y / 2.0);
        } else {
            let y = self.state.delayed_mu_hat * s;
            self.state.sum_adaptive += y * (x - y / 2.0);
        }

        let change_of_measure = self.state.log_likelihood_ratio(
            self.simulated_signal_strength,
            self.change_of_measure_signal_strength,
        );
        self.asprt.if_stopped(change_of_measure);
        self.gsprt.if_stopped(change_of_measure);

        // ASPRT decision values.
        let asprt_null = self.state.init_null + self.state.sum_adaptive;
        let asprt_alt = self.state.init_alt
            + self.state.sum_adaptive
            + self.state.log_likelihood_ratio(0.0, mu_tilde);
        self.asprt.observe(asprt_alt, asprt_null, t);

        // GSPRT decision values.
        let gsprt_null = self.state.log_likelihood_ratio(mu_hat, 0.0);
        let gsprt_alt = self.state.log_likelihood_ratio(mu_hat, mu_tilde);
        self.gsprt.observe(gsprt_alt, gsprt_null, t);

        self.state.delayed_mu_hat = mu_hat;
    }

    fn truth(&self, signal_strength: f64) -> Option<Decision> {
        if signal_strength == 0.0 {
            Some(Decision::Vertical)
        } else if signal_strength >= self.model.weakest_signal_strength() {
            Some(Decision::Horizontal)
        } else {
            None
        }
    }

    fn direct_error_indicator(&self, stopping_time: &ParallelStoppingTime) -> DMatrix<f64> {
        let correct = self.truth(self.simulated_signal_strength);
        stopping_time.which().map(|cell| match correct {
            Some(c) if cell == c => 0.0,
            _ => 1.0,
        })
    }

    fn importance_error_indicator(&self, stopping_time: &ParallelStoppingTime) -> DMatrix<f64> {
        let correct = self.truth(self.change_of_measure_signal_strength);
        let which = stopping_time.which();
        let stat = stopping_time.stopped_statistic();
        DMatrix::from_fn(which.nrows(), which.ncols(), |i, j| match correct {
            Some(c) if which[(i, j)] == c => 0.0,
            _ => (-stat[(i, j)]).exp(),
        })
    }

    /// Snapshot the current decision grids as a [`SimulationOutput`].
    pub fn output(&self) -> SimulationOutput {
        SimulationOutput {
            anticipated_sample_size: self.anticipated_sample_size,
            when_stopped: XsprtPair {
                asprt: self.asprt.when().clone(),
                gsprt: self.gsprt.when().clone(),
            },
            direct_error_indicator: XsprtPair {
                asprt: self.direct_error_indicator(&self.asprt),
                gsprt: self.direct_error_indicator(&self.gsprt),
            },
            importance_error_indicator: XsprtPair {
                asprt: self.importance_error_indicator(&self.asprt),
                gsprt: self.importance_error_indicator(&self.gsprt),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn make(thresholds: Thresholds, sim: f64, cm: f64) -> Xsprt {
        let model = Model::new(1.0).unwrap();
        Xsprt::new(model, thresholds.clone(), thresholds, sim, cm, 0.0).unwrap()
    }

    #[test]
    fn sum_ss_matches_sum_of_squared_signal() {
        let mut x = make((vec![1.0], vec![1.0]), 0.0, 1.0);
        for v in [0.3, -0.2, 0.1, 0.5, -0.9] {
            x.observe(v);
        }
        // signal_at(t) == 1 for all t in this core, so sum_ss == n.
        assert_eq!(x.state().sum_ss, 5.0);
        assert!(x.state().sum_ss >= 0.0);
    }

    #[test]
    fn log_likelihood_kernel_is_antisymmetric() {
        let mut x = make((vec![1.0], vec![1.0]), 0.0, 1.0);
        x.observe(1.0);
        x.observe(-0.5);
        let ab = x.state().log_likelihood_ratio(0.3, 1.7);
        let ba = x.state().log_likelihood_ratio(1.7, 0.3);
        assert!((ab + ba).abs() < 1e-12);
    }

    #[test]
    fn matching_sim_and_cm_strength_zeroes_change_of_measure() {
        let mut x = make((vec![0.5, 1.0], vec![0.5, 1.0]), 1.0, 1.0);
        for v in [1.2, 0.8, 1.5, 0.9, 1.1] {
            x.observe(v);
        }
        let out = x.output();
        assert_eq!(
            out.direct_error_indicator.asprt,
            out.importance_error_indicator.asprt
        );
        assert_eq!(
            out.direct_error_indicator.gsprt,
            out.importance_error_indicator.gsprt
        );
    }

    #[test]
    fn constant_zero_observations_keep_gsprt_open() {
        // Scenario 10 from spec.md §8.
        let mut x = make((vec![0.5, 1.0], vec![0.5, 1.0]), 0.0, 1.0);
        for _ in 0..10 {
            x.observe(0.0);
        }
        assert_eq!(x.state().sum_sy, 0.0);
        assert_eq!(x.state().sum_ss, 10.0);
        assert!(x.is_running());
    }

    #[test]
    fn constant_signal_crosses_gsprt_null_at_expected_step() {
        // Scenario 11 from spec.md §8.
        let mut x = make((vec![9.0, 11.0], vec![9.0, 11.0]), 2.0, 0.0);
        let values = [2.0, 2.0, 2.0, 2.0, 2.0];
        for v in values {
            x.observe(v);
        }
        assert_eq!(x.state().sum_sy, 10.0);
        assert_eq!(x.state().sum_ss, 5.0);
        let l = x.state().log_likelihood_ratio(2.0, 0.0);
        assert!((l - 10.0).abs() < 1e-9);
    }

    #[test]
    fn delayed_estimator_lags_by_one_step() {
        let mut x = make((vec![100.0], vec![100.0]), 0.0, 1.0);
        let observations = [1.0, 2.0, -1.0, 0.5];
        let mut expected_delayed = 0.0;
        for &v in &observations {
            // Before this call, delayed_mu_hat must equal the unconstrained
            // estimator computed from all *prior* observations only.
            assert!((x.state().delayed_mu_hat - expected_delayed).abs() < 1e-12);
            x.observe(v);
            let mu_hat = (x.state().sum_sy / x.state().sum_ss).max(0.0);
            expected_delayed = mu_hat;
        }
    }
}
