//! Assembles the reference models for a run and drives the trial engine.

use crate::config::{Execution, RunConfig};
use crate::parallel::run_trials_parallel;
use anyhow::{Context, Result};
use ftsim_core::{Architecture, TrialEngine};
use ftsim_models::{MacronodeReducer, MatchingDecoder, NoiseLayer, SurfaceCode, build_bundle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Runs `config.trials` trials and returns the number of logical failures.
pub fn run(config: &RunConfig, exec: &Execution) -> Result<usize> {
    let code = SurfaceCode::new(config.distance, config.ec, config.boundaries)
        .context("Failed to build the surface code")?;
    let bundle = if config.passive {
        Some(build_bundle(code.lattice()).context("Failed to build the macronode bundle")?)
    } else {
        None
    };
    if let Some(bundle) = &bundle {
        debug!(
            macronodes = bundle.macro_lattice.num_macronodes(),
            padded = bundle.macro_lattice.num_padded(),
            "built passive bundle"
        );
    }

    let noise = NoiseLayer;
    let reducer = MacronodeReducer;
    let decoder = MatchingDecoder::new();
    let engine = TrialEngine::new(&code, &noise, &reducer, &decoder);
    let architecture = Architecture::from_bundle(bundle.as_ref());

    let errors = if exec.is_parallel() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(exec.threads)
            .build()
            .context("Failed to start the worker pool")?;
        pool.install(|| {
            run_trials_parallel(
                &engine,
                architecture,
                config.trials,
                config.delta,
                config.p_swap,
                exec.seed,
            )
        })
    } else {
        let mut rng = ChaCha8Rng::seed_from_u64(exec.seed);
        engine.run_trials(
            architecture,
            config.trials,
            config.delta,
            config.p_swap,
            &mut rng,
        )
    }
    .context("Simulation aborted")?;

    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftsim_common::{Boundary, EcScheme};

    fn config(passive: bool) -> RunConfig {
        RunConfig {
            distance: 3,
            ec: EcScheme::Primal,
            boundaries: Boundary::Open,
            delta: 1e-4,
            p_swap: 0.0,
            trials: 20,
            passive,
        }
    }

    #[test]
    fn quiet_runs_have_no_failures() {
        let seq = Execution { seed: 1, threads: 1 };
        let par = Execution { seed: 1, threads: 2 };
        for passive in [false, true] {
            assert_eq!(run(&config(passive), &seq).unwrap(), 0);
            assert_eq!(run(&config(passive), &par).unwrap(), 0);
        }
    }

    #[test]
    fn default_run_stays_within_bounds() {
        let config = RunConfig::default();
        let errors = run(&config, &Execution { seed: 7, threads: 1 }).unwrap();
        assert!(errors <= config.trials);
    }

    #[test]
    fn seeded_parallel_runs_reproduce() {
        let config = RunConfig {
            delta: 0.5,
            p_swap: 0.3,
            trials: 60,
            ..config(true)
        };
        let exec = Execution { seed: 99, threads: 3 };
        assert_eq!(run(&config, &exec).unwrap(), run(&config, &exec).unwrap());
    }

    #[test]
    fn engine_errors_surface() {
        let config = RunConfig {
            p_swap: 2.0,
            ..config(false)
        };
        assert!(run(&config, &Execution { seed: 1, threads: 1 }).is_err());
    }
}
