//! Owns a noise source and an XSPRT template; runs one replication to
//! stopping and returns its [`SimulationOutput`].
//!
//! Grounded on
//! `original_source/src/gaussian_mean_hypotheses/simulator.hpp`: draws
//! IID standard-normal observations in blocks, adds the simulated signal,
//! and feeds them to the statistic one at a time until it stops.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::xsprt::{SimulationOutput, Xsprt};

/// Number of observations drawn per batch before re-checking whether the
/// statistic has stopped.
const BLOCK_SIZE: usize = 100;

/// Runs independent replications of a single [`Xsprt`] template against
/// an owned, seedable noise source.
///
/// Not thread-safe by design — each worker in the Monte-Carlo driver owns
/// its own `Simulator`.
pub struct Simulator<R> {
    rng: R,
    template: Xsprt,
}

impl<R> Simulator<R>
where
    R: Rng + SeedableRng,
{
    pub fn new(template: Xsprt, rng: R) -> Self {
        Simulator { rng, template }
    }

    /// Deterministically re-seed the noise source.
    pub fn seed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }

    /// Run one replication to stopping, returning its recorded output.
    pub fn run_once(&mut self) -> SimulationOutput {
        let mut statistic = self.template.clone();
        statistic.reset();

        let model = *statistic.model();
        let signal_strength = statistic.simulated_signal_strength();
        let mut time = 0usize;

        while statistic.is_running() {
            let mut block = [0.0_f64; BLOCK_SIZE];
            for slot in &mut block {
                time += 1;
                let noise: f64 = self.rng.sample(StandardNormal);
                *slot = noise + signal_strength * model.signal_at(time);
            }
            for x in block {
                statistic.observe(x);
            }
        }

        statistic.output()
    }
}
