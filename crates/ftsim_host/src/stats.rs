//! Logical error rate estimation.
//!
//! Turns the failure count of a run into a rate with a confidence interval,
//! so that runs with different trial counts can be compared on a threshold
//! plot.

use std::fmt;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// Failures observed over a number of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEstimate {
    pub errors: usize,
    pub trials: usize,
}

impl RateEstimate {
    pub fn new(errors: usize, trials: usize) -> Self {
        Self { errors, trials }
    }

    /// Observed failure fraction, or 0.0 for an empty run.
    pub fn rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.errors as f64 / self.trials as f64
        }
    }

    /// Wilson score interval at normal quantile `z`.
    ///
    /// Stays inside `[0, 1]` and is well behaved at zero and full failure
    /// counts, where the normal approximation collapses. An empty run gives
    /// the uninformative `(0, 1)`.
    pub fn wilson_interval(&self, z: f64) -> (f64, f64) {
        if self.trials == 0 {
            return (0.0, 1.0);
        }
        let n = self.trials as f64;
        let p = self.rate();
        let z2 = z * z;
        let denom = 1.0 + z2 / n;
        let centre = (p + z2 / (2.0 * n)) / denom;
        let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
        ((centre - half).max(0.0), (centre + half).min(1.0))
    }

    pub fn wilson_95(&self) -> (f64, f64) {
        self.wilson_interval(Z_95)
    }
}

impl fmt::Display for RateEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.wilson_95();
        write!(
            f,
            "{}/{} failed, rate {:.4} (95% CI {:.4}..{:.4})",
            self.errors,
            self.trials,
            self.rate(),
            lo,
            hi
        )
    }
}
