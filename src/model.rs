//! The Gaussian-mean hypotheses model: signal shape and weakest detectable
//! signal strength.
//!
//! Grounded on `original_source/src/gaussian_mean_hypotheses/model.hpp`:
//! a single positive, finite scalar (`weakest_signal_strength`) and a
//! signal-at-time function that, for this core, is constant at 1.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name reported in the `"type"` field of the config's `"model"` object.
pub const MODEL_NAME: &str = "Gaussian mean hypotheses";

/// Describes the signal shape and the weakest alternative signal strength
/// μ₁ for the Gaussian-mean change-point problem.
///
/// Immutable once constructed: `Model::new` is the only way to produce one,
/// and it validates `weakest_signal_strength` on the way in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModel", into = "RawModel")]
pub struct Model {
    weakest_signal_strength: f64,
}

/// Wire representation used purely for serde round-tripping and
/// validation; `Model` itself never exposes a way to bypass `new`.
#[derive(Serialize, Deserialize)]
struct RawModel {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "weakest signal strength")]
    weakest_signal_strength: f64,
}

impl std::convert::TryFrom<RawModel> for Model {
    type Error = String;

    fn try_from(raw: RawModel) -> std::result::Result<Self, Self::Error> {
        if raw.kind != MODEL_NAME {
            return Err(format!(
                "unrecognized model type {:?}, expected {:?}",
                raw.kind, MODEL_NAME
            ));
        }
        Model::new(raw.weakest_signal_strength).map_err(|e| e.to_string())
    }
}

impl From<Model> for RawModel {
    fn from(model: Model) -> Self {
        RawModel {
            kind: MODEL_NAME.to_owned(),
            weakest_signal_strength: model.weakest_signal_strength,
        }
    }
}

impl Model {
    /// Construct a new model.
    ///
    /// # Errors
    /// Returns [`Error::Logic`] if `weakest_signal_strength` is not finite
    /// or not strictly positive.
    pub fn new(weakest_signal_strength: f64) -> Result<Self> {
        if !weakest_signal_strength.is_finite() {
            return Err(Error::logic("weakest signal strength must be finite"));
        }
        if weakest_signal_strength <= 0.0 {
            return Err(Error::logic("weakest signal strength must be positive"));
        }
        Ok(Model {
            weakest_signal_strength,
        })
    }

    /// Signal value s(t) at observation index `t` (1-based). Constant at 1
    /// for the Gaussian-mean core.
    #[inline]
    pub fn signal_at(&self, _t: usize) -> f64 {
        1.0
    }

    /// The weakest detectable signal strength μ₁.
    #[inline]
    pub fn weakest_signal_strength(&self) -> f64 {
        self.weakest_signal_strength
    }
}
