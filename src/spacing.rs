//! One-dimensional threshold-grid generators.
//!
//! Ported from `original_source/src/gaussian_mean_hypotheses/config.hpp`'s
//! `vector_initializer_t`, which dispatches over
//! `std::variant<linear_spacing, logarithmic_spacing, exponential_spacing>`.
//! Rust expresses that variant dispatch naturally as an internally-tagged
//! enum.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A generator for a sorted, 1-D grid of `count` points in `[from, to]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Spacing {
    /// `count` equally spaced points in `[from, to]`.
    Linear { from: f64, to: f64, count: usize },
    /// `count` points forming a geometric progression in `[from, to]`
    /// (equal ratio between consecutive points; endpoints included).
    Logarithmic { from: f64, to: f64, count: usize },
    /// `count` points forming [`Spacing::Logarithmic`]'s progression
    /// reflected about the midpoint of `[from, to]`, so density
    /// concentrates at `to` rather than `from`. Endpoints included.
    Exponential { from: f64, to: f64, count: usize },
}

impl Spacing {
    fn bounds(&self) -> (f64, f64, usize) {
        match *self {
            Spacing::Linear { from, to, count } => (from, to, count),
            Spacing::Logarithmic { from, to, count } => (from, to, count),
            Spacing::Exponential { from, to, count } => (from, to, count),
        }
    }

    fn validate(&self) -> Result<()> {
        let (from, to, count) = self.bounds();
        if count < 1 {
            return Err(Error::invalid_argument("spacing count must be at least 1"));
        }
        if from > to {
            return Err(Error::invalid_argument("spacing requires from <= to"));
        }
        match self {
            Spacing::Logarithmic { from, .. } | Spacing::Exponential { from, .. } if *from <= 0.0 => {
                Err(Error::Domain(
                    "logarithmic/exponential spacing requires from > 0".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Expand this generator into its sorted grid of `count` points.
    /// Endpoints are included exactly when `count >= 2`.
    pub fn explode(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let (from, to, count) = self.bounds();

        if count == 1 {
            return Ok(vec![from]);
        }

        let step = (count - 1) as f64;
        let points = match self {
            Spacing::Linear { .. } => (0..count)
                .map(|i| from + (to - from) * (i as f64) / step)
                .collect(),
            Spacing::Logarithmic { .. } => {
                // Geometric progression: equal ratio between consecutive
                // points, i.e. linear spacing of the log10 exponents,
                // exponentiated back so the endpoints are `from`/`to`
                // themselves (not their exponents).
                let log_from = from.log10();
                let log_to = to.log10();
                (0..count)
                    .map(|i| {
                        let x = log_from + (log_to - log_from) * (i as f64) / step;
                        10f64.powf(x)
                    })
                    .collect()
            }
            Spacing::Exponential { .. } => {
                // The inverse shape of `Logarithmic`: same geometric
                // progression, reflected about the midpoint of [from, to]
                // so density concentrates at `to` instead of `from`, while
                // still landing on the exact endpoints.
                let log_from = from.log10();
                let log_to = to.log10();
                (0..count)
                    .map(|i| {
                        let j = count - 1 - i;
                        let x = log_from + (log_to - log_from) * (j as f64) / step;
                        from + to - 10f64.powf(x)
                    })
                    .collect()
            }
        };
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_includes_endpoints() {
        let s = Spacing::Linear {
            from: 0.0,
            to: 10.0,
            count: 5,
        };
        let pts = s.explode().unwrap();
        assert_eq!(pts.first().copied(), Some(0.0));
        assert_eq!(pts.last().copied(), Some(10.0));
        assert_eq!(pts.len(), 5);
        assert!(pts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn single_point_returns_from() {
        let s = Spacing::Linear {
            from: 3.0,
            to: 7.0,
            count: 1,
        };
        assert_eq!(s.explode().unwrap(), vec![3.0]);
    }

    #[test]
    fn logarithmic_spacing_is_geometric_and_includes_endpoints() {
        let s = Spacing::Logarithmic {
            from: 1.0,
            to: 100.0,
            count: 3,
        };
        let pts = s.explode().unwrap();
        assert!((pts[0] - 1.0).abs() < 1e-9);
        assert!((pts[1] - 10.0).abs() < 1e-9);
        assert!((pts[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_is_mirror_of_logarithmic_and_includes_endpoints() {
        let s = Spacing::Exponential {
            from: 1.0,
            to: 100.0,
            count: 3,
        };
        let pts = s.explode().unwrap();
        assert!((pts[0] - 1.0).abs() < 1e-9);
        assert!((pts[1] - 91.0).abs() < 1e-9);
        assert!((pts[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn every_generator_includes_endpoints_exactly_for_count_at_least_two() {
        for s in [
            Spacing::Linear {
                from: 2.0,
                to: 50.0,
                count: 4,
            },
            Spacing::Logarithmic {
                from: 2.0,
                to: 50.0,
                count: 4,
            },
            Spacing::Exponential {
                from: 2.0,
                to: 50.0,
                count: 4,
            },
        ] {
            let pts = s.explode().unwrap();
            assert!((pts.first().copied().unwrap() - 2.0).abs() < 1e-9);
            assert!((pts.last().copied().unwrap() - 50.0).abs() < 1e-9);
            assert!(pts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn rejects_from_greater_than_to() {
        let s = Spacing::Linear {
            from: 10.0,
            to: 0.0,
            count: 2,
        };
        assert!(s.explode().is_err());
    }

    #[test]
    fn rejects_zero_count() {
        let s = Spacing::Linear {
            from: 0.0,
            to: 1.0,
            count: 0,
        };
        assert!(s.explode().is_err());
    }

    #[test]
    fn rejects_non_positive_from_for_log_spacing() {
        let s = Spacing::Logarithmic {
            from: 0.0,
            to: 10.0,
            count: 2,
        };
        assert!(s.explode().is_err());
    }
}
