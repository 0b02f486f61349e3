//! Folds [`SimulationOutput`]s into moment statistics (mean, variance)
//! over the threshold grid, for each of {ASPRT, GSPRT} and each of
//! {sample size, direct-error indicator, importance-error indicator}.
//!
//! Grounded on
//! `original_source/src/gaussian_mean_hypotheses/aggregator.hpp`: lazily
//! initialized on the first observed output (so the grid shape and the
//! sample-size variance-stabilizing shift need not be known up front),
//! and mergeable — two partial aggregators combine by adding counts and
//! sums, which is what lets the Monte-Carlo driver run one `Aggregator`
//! per worker thread and reduce them at the end.

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::moment_statistic::MomentStatistic;
use crate::xsprt::{SimulationOutput, XsprtPair};

type GridStatistic = MomentStatistic<DMatrix<f64>>;

fn counts_to_f64(counts: &DMatrix<usize>) -> DMatrix<f64> {
    DMatrix::from_fn(counts.nrows(), counts.ncols(), |i, j| counts[(i, j)] as f64)
}

/// Accumulates moment statistics across replications for a single model,
/// signal strength, and threshold grid.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    sample_size: Option<XsprtPair<GridStatistic>>,
    direct_error_indicator: Option<XsprtPair<GridStatistic>>,
    importance_error_indicator: Option<XsprtPair<GridStatistic>>,
    height: usize,
    width: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator::default()
    }

    fn is_empty(&self) -> bool {
        self.sample_size.is_none()
    }

    fn initialize(&mut self, height: usize, width: usize, anticipated_sample_size: f64) {
        let zero = DMatrix::<f64>::zeros(height, width);
        let anticipated = DMatrix::from_element(height, width, anticipated_sample_size);

        self.sample_size = Some(XsprtPair {
            asprt: MomentStatistic::new(zero.clone(), anticipated.clone()),
            gsprt: MomentStatistic::new(zero.clone(), anticipated),
        });
        self.direct_error_indicator = Some(XsprtPair {
            asprt: MomentStatistic::new(zero.clone(), zero.clone()),
            gsprt: MomentStatistic::new(zero.clone(), zero.clone()),
        });
        self.importance_error_indicator = Some(XsprtPair {
            asprt: MomentStatistic::new(zero.clone(), zero.clone()),
            gsprt: MomentStatistic::new(zero.clone(), zero),
        });
        self.height = height;
        self.width = width;
    }

    /// Fold a single replication's output into the accumulators.
    pub fn observe(&mut self, value: &SimulationOutput) {
        if self.is_empty() {
            self.initialize(value.height(), value.width(), value.anticipated_sample_size);
        }

        let sample_size = self.sample_size.as_mut().expect("initialized above");
        sample_size
            .asprt
            .observe(counts_to_f64(&value.when_stopped.asprt));
        sample_size
            .gsprt
            .observe(counts_to_f64(&value.when_stopped.gsprt));

        let direct = self
            .direct_error_indicator
            .as_mut()
            .expect("initialized above");
        direct
            .asprt
            .observe(value.direct_error_indicator.asprt.clone());
        direct
            .gsprt
            .observe(value.direct_error_indicator.gsprt.clone());

        let importance = self
            .importance_error_indicator
            .as_mut()
            .expect("initialized above");
        importance
            .asprt
            .observe(value.importance_error_indicator.asprt.clone());
        importance
            .gsprt
            .observe(value.importance_error_indicator.gsprt.clone());
    }

    /// Merge another (independently accumulated) aggregator into this
    /// one. Commutative and associative up to floating-point
    /// non-associativity.
    pub fn merge(&mut self, other: &Aggregator) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }

        let s = self.sample_size.as_mut().expect("non-empty");
        let o = other.sample_size.as_ref().expect("non-empty");
        s.asprt.merge(&o.asprt);
        s.gsprt.merge(&o.gsprt);

        let d = self.direct_error_indicator.as_mut().expect("non-empty");
        let od = other.direct_error_indicator.as_ref().expect("non-empty");
        d.asprt.merge(&od.asprt);
        d.gsprt.merge(&od.gsprt);

        let i = self
            .importance_error_indicator
            .as_mut()
            .expect("non-empty");
        let oi = other.importance_error_indicator.as_ref().expect("non-empty");
        i.asprt.merge(&oi.asprt);
        i.gsprt.merge(&oi.gsprt);
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn sample_size(&self) -> Result<&XsprtPair<GridStatistic>> {
        self.sample_size
            .as_ref()
            .ok_or_else(|| Error::runtime("aggregator has not observed any replications"))
    }

    pub fn direct_error_indicator(&self) -> Result<&XsprtPair<GridStatistic>> {
        self.direct_error_indicator
            .as_ref()
            .ok_or_else(|| Error::runtime("aggregator has not observed any replications"))
    }

    pub fn importance_error_indicator(&self) -> Result<&XsprtPair<GridStatistic>> {
        self.importance_error_indicator
            .as_ref()
            .ok_or_else(|| Error::runtime("aggregator has not observed any replications"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::xsprt::Xsprt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::simulator::Simulator;

    #[test]
    fn empty_aggregator_reports_runtime_error() {
        let agg = Aggregator::new();
        assert!(agg.sample_size().is_err());
    }

    #[test]
    fn merging_empty_with_nonempty_yields_nonempty() {
        let model = Model::new(1.0).unwrap();
        let template = Xsprt::new(
            model,
            (vec![3.0], vec![3.0]),
            (vec![3.0], vec![3.0]),
            0.0,
            1.0,
            50.0,
        )
        .unwrap();
        let mut sim: Simulator<StdRng> = Simulator::new(template, StdRng::seed_from_u64(3));

        let mut a = Aggregator::new();
        a.observe(&sim.run_once());

        let b = Aggregator::new();
        let mut merged = b.clone();
        merged.merge(&a);
        assert!(merged.sample_size().is_ok());
        assert_eq!(merged.sample_size().unwrap().asprt.count(), 1);
    }

    #[test]
    fn merge_associative_counts_match_direct_accumulation() {
        let model = Model::new(1.0).unwrap();
        let template = Xsprt::new(
            model,
            (vec![3.0], vec![3.0]),
            (vec![3.0], vec![3.0]),
            0.0,
            1.0,
            50.0,
        )
        .unwrap();

        let mut direct = Aggregator::new();
        let mut partials = Vec::new();
        for seed in 0..6u64 {
            let mut sim: Simulator<StdRng> = Simulator::new(template.clone(), StdRng::seed_from_u64(seed));
            let output = sim.run_once();
            direct.observe(&output);

            let mut partial = Aggregator::new();
            partial.observe(&output);
            partials.push(partial);
        }

        let mut a = partials[0].clone();
        a.merge(&partials[1]);
        a.merge(&partials[2]);
        let mut b = partials[3].clone();
        b.merge(&partials[4]);
        b.merge(&partials[5]);
        a.merge(&b);

        assert_eq!(a.sample_size().unwrap().asprt.count(), direct.sample_size().unwrap().asprt.count());
        let direct_mean = direct.sample_size().unwrap().asprt.mean();
        let reduced_mean = a.sample_size().unwrap().asprt.mean();
        assert!((direct_mean[(0, 0)] - reduced_mean[(0, 0)]).abs() < 1e-9);
    }
}
