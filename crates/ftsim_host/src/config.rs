//! Run parameters and execution settings.

use anyhow::{Context, Result, bail};
use ftsim_common::{Boundary, EcScheme, defaults};

/// Parameters of one simulation run, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub distance: usize,
    pub ec: EcScheme,
    pub boundaries: Boundary,
    pub delta: f64,
    pub p_swap: f64,
    pub trials: usize,
    pub passive: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            distance: defaults::DISTANCE,
            ec: defaults::EC,
            boundaries: defaults::BOUNDARIES,
            delta: defaults::DELTA,
            p_swap: defaults::P_SWAP,
            trials: defaults::TRIALS,
            passive: defaults::PASSIVE,
        }
    }
}

impl RunConfig {
    /// Rejects parameters no trial could run with.
    pub fn validate(&self) -> Result<()> {
        if self.distance < 2 {
            bail!("distance must be at least 2, got {}", self.distance);
        }
        if !(self.delta.is_finite() && self.delta > 0.0) {
            bail!("delta must be finite and positive, got {}", self.delta);
        }
        if !(0.0..=1.0).contains(&self.p_swap) {
            bail!("p_swap must lie in [0, 1], got {}", self.p_swap);
        }
        Ok(())
    }
}

/// How the trials are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Master seed of every random stream in the run.
    pub seed: u64,
    /// Worker threads; 1 runs the engine loop on the calling thread.
    pub threads: usize,
}

impl Execution {
    pub const SEED_VAR: &'static str = "FTSIM_SEED";
    pub const THREADS_VAR: &'static str = "FTSIM_THREADS";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`. An unset seed is drawn from OS
    /// entropy; unset threads mean a sequential run.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let seed = match lookup(Self::SEED_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} is not a u64: {raw:?}", Self::SEED_VAR))?,
            None => rand::random(),
        };
        let threads = match lookup(Self::THREADS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{} is not a count: {raw:?}", Self::THREADS_VAR))?,
            None => 1,
        };
        if threads == 0 {
            bail!("{} must be at least 1", Self::THREADS_VAR);
        }
        Ok(Self { seed, threads })
    }

    pub fn is_parallel(&self) -> bool {
        self.threads > 1
    }
}
