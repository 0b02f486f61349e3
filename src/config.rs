//! JSON configuration loading.
//!
//! Wire format fixed by spec.md §6, ported from
//! `original_source/src/gaussian_mean_hypotheses/config.hpp`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Model;
use crate::spacing::Spacing;
use crate::xsprt::Thresholds;

/// A pair of [`Spacing`] generators: the first explodes into the alt-side
/// threshold vector, the second into the null-side vector — matching the
/// `(first, second)` pairing used by `original_source`'s
/// `config<T>::thresholds_type` and threaded straight into
/// `ParallelStoppingTime::new(alt, null)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThresholdSpec(pub Spacing, pub Spacing);

impl ThresholdSpec {
    pub fn explode(&self) -> Result<Thresholds> {
        Ok((self.0.explode()?, self.1.explode()?))
    }
}

/// The top-level configuration read once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "simulations")]
    pub simulations: usize,

    pub model: Model,

    #[serde(rename = "anticipated sample size")]
    pub anticipated_sample_size: (f64, f64),

    #[serde(rename = "ASPRT thresholds")]
    pub asprt_thresholds: ThresholdSpec,

    #[serde(rename = "GSPRT thresholds")]
    pub gsprt_thresholds: ThresholdSpec,
}

impl Config {
    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::Io`] if the file cannot be read, or
    /// [`crate::error::Error::Json`] if it cannot be parsed as a
    /// conforming `Config`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }
}
