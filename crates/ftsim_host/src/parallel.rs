//! Data-parallel trial runner.
//!
//! Spreads the trials of one run over a rayon pool. Every trial owns a
//! ChaCha8 stream derived from the master seed and its index, so a seeded
//! run reproduces its count at any thread count.

use ftsim_core::{Architecture, Code, Decoder, NoiseProvider, PassiveReducer, TrialEngine};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Random stream of one trial: the master seed, on the trial's own stream.
pub fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// Runs `trials` trials across the current rayon pool and returns the
/// number of failures.
///
/// The pipeline is selected once and shared by every worker. Trial `i`
/// draws from its own stream of `seed`, so the count does not depend on
/// scheduling. The first collaborator error aborts the remaining work and
/// is returned.
pub fn run_trials_parallel<'a, C, N, P, D, S, E>(
    engine: &TrialEngine<'a, C, N, P, D>,
    architecture: Architecture<'a, P::Bundle>,
    trials: usize,
    delta: f64,
    p_swap: f64,
    seed: u64,
) -> Result<usize, E>
where
    C: Code + Sync + ?Sized,
    C::Graph: Sync,
    N: NoiseProvider<C, Syndrome = S, Error = E> + Sync,
    P: PassiveReducer<Syndrome = S, Error = E> + Sync,
    P::Bundle: Sync,
    D: Decoder<C, S, Error = E> + Sync,
    E: Send,
{
    let pipeline = engine.select(architecture, delta);

    let successes = (0..trials)
        .into_par_iter()
        .try_fold(
            || 0usize,
            |acc, trial| -> Result<usize, E> {
                let mut rng = trial_rng(seed, trial);
                let success = engine.run_trial(&pipeline, p_swap, &mut rng)?;
                Ok(acc + usize::from(success))
            },
        )
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    Ok(trials - successes)
}
