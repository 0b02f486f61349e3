//! Monte-Carlo estimation of operating characteristics (expected sample
//! size, direct and importance-sampled error rates) for the ASPRT and
//! GSPRT sequential tests on a Gaussian mean change-detection problem.
//!
//! The crate is organized bottom-up:
//!
//! - [`clip`] and [`moment_statistic`]: small numeric building blocks.
//! - [`model`]: the signal model under test.
//! - [`stopping_time`]: the matrix-valued first-crossing time over a grid
//!   of thresholds.
//! - [`xsprt`]: the incremental statistic tying a model and a pair of
//!   stopping times together into one replication's worth of state.
//! - [`spacing`] and [`config`]: JSON configuration and threshold-grid
//!   generation.
//! - [`simulator`]: runs one replication to stopping.
//! - [`aggregator`]: folds many replications into moment statistics.
//! - [`driver`]: partitions replications across worker threads.
//! - [`report`]: renders an aggregator's results to stdout.

pub mod aggregator;
pub mod clip;
pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod moment_statistic;
pub mod report;
pub mod simulator;
pub mod spacing;
pub mod stopping_time;
pub mod xsprt;

pub use aggregator::Aggregator;
pub use config::Config;
pub use driver::MonteCarloDriver;
pub use error::{Error, Result};
pub use model::Model;
pub use simulator::Simulator;
pub use xsprt::Xsprt;
