//! Monte Carlo trial engine.
//!
//! Orchestrates one of the two simulation pipelines per trial and reduces
//! the stream of success/failure verdicts into an error count. The engine
//! holds borrowed handles to all four collaborators; which of them are
//! called is decided once per run by the selected [`Pipeline`].
//!
//! The engine performs no validation, logging or I/O. Any failure raised by
//! a collaborator is returned unchanged and ends the run.

use crate::config::Quadrature;
use crate::pipeline::{Architecture, Pipeline};
use crate::traits::{Code, Decoder, NoiseProvider, PassiveReducer};
use rand::Rng;

/// Trial engine over a code, an active noise layer, a passive reducer and a
/// decoder.
///
/// All collaborators must agree on the syndrome record type `S` and the
/// error type `E`. Only the collaborators of the selected pipeline are
/// invoked during a run.
pub struct TrialEngine<'a, C: ?Sized, N, P, D> {
    code: &'a C,
    noise: &'a N,
    reducer: &'a P,
    decoder: &'a D,
}

impl<C: ?Sized, N, P, D> Clone for TrialEngine<'_, C, N, P, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized, N, P, D> Copy for TrialEngine<'_, C, N, P, D> {}

impl<'a, C, N, P, D, S, E> TrialEngine<'a, C, N, P, D>
where
    C: Code + ?Sized,
    N: NoiseProvider<C, Syndrome = S, Error = E>,
    P: PassiveReducer<Syndrome = S, Error = E>,
    D: Decoder<C, S, Error = E>,
{
    pub fn new(code: &'a C, noise: &'a N, reducer: &'a P, decoder: &'a D) -> Self {
        Self {
            code,
            noise,
            reducer,
            decoder,
        }
    }

    /// Selects the pipeline for a run. See [`Pipeline::select`].
    pub fn select(
        &self,
        architecture: Architecture<'a, P::Bundle>,
        delta: f64,
    ) -> Pipeline<'a, C::Graph, P::Bundle> {
        Pipeline::select(self.code, architecture, delta)
    }

    /// Runs `trials` independent trials and returns the number of failures.
    ///
    /// The pipeline is selected once before the loop. Each trial draws its
    /// randomness from `rng`, so a seeded generator reproduces the count.
    /// With `trials == 0` no collaborator is invoked and `Ok(0)` is
    /// returned.
    ///
    /// # Arguments
    ///
    /// * `architecture` - Active, or passive with the shared bundle
    /// * `trials` - Number of trials to run
    /// * `delta` - Noise width parameter
    /// * `p_swap` - Probability of swapping an encoded state for a degraded one
    /// * `rng` - Source of randomness for every collaborator call
    ///
    /// # Returns
    ///
    /// The failure count, always in `0..=trials`, or the first collaborator
    /// error encountered.
    pub fn run_trials<R: Rng + ?Sized>(
        &self,
        architecture: Architecture<'a, P::Bundle>,
        trials: usize,
        delta: f64,
        p_swap: f64,
        rng: &mut R,
    ) -> Result<usize, E> {
        let pipeline = self.select(architecture, delta);

        let mut successes = 0usize;
        for _ in 0..trials {
            if self.run_trial(&pipeline, p_swap, rng)? {
                successes += 1;
            }
        }

        Ok(trials - successes)
    }

    /// Runs a single trial of an already selected pipeline.
    ///
    /// Active: fresh state, noise, p-homodyne measurement of the code's
    /// syndrome indices, decode. Passive: one reducer call over the bundle,
    /// decode. Returns the decoder's verdict.
    pub fn run_trial<R: Rng + ?Sized>(
        &self,
        pipeline: &Pipeline<'a, C::Graph, P::Bundle>,
        p_swap: f64,
        rng: &mut R,
    ) -> Result<bool, E> {
        let syndrome = match pipeline {
            Pipeline::Active { graph, noise, .. } => {
                let mut state = self.noise.prepare(*graph, p_swap, rng)?;
                self.noise.apply_noise(&mut state, noise, rng)?;
                self.noise.measure(
                    &mut state,
                    Quadrature::P,
                    self.code.syndrome_indices(),
                    rng,
                )?
            }
            Pipeline::Passive { bundle, delta, .. } => {
                self.reducer
                    .reduce_and_simulate(*bundle, p_swap, *delta, rng)?
            }
        };

        self.decoder
            .correct(self.code, &syndrome, pipeline.decoder_config())
    }
}
