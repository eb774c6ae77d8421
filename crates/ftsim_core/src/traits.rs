//! Capabilities the trial engine consumes.
//!
//! The engine never names a concrete code, noise model, reducer or decoder.
//! Each collaborator is described by one trait here, and a run is assembled
//! from any set of implementations whose syndrome and error types agree.

use crate::config::{DecoderConfig, NoiseConfig, Quadrature};
use rand::Rng;

/// A quantum error-correcting code instance.
///
/// Exposes the structural graph the physical layer is built on and the
/// indices of the locations that take part in syndrome extraction. The
/// instance is immutable for the duration of a run and only ever borrowed
/// by the engine.
pub trait Code {
    /// Structural (lattice) graph of the code.
    type Graph: ?Sized;

    /// Returns the structural graph.
    fn graph(&self) -> &Self::Graph;

    /// Returns the indices measured during syndrome extraction.
    fn syndrome_indices(&self) -> &[usize];
}

/// Physical noise and measurement layer used by the active pipeline.
///
/// A provider hands out a fresh noisy-state handle for every trial, applies
/// a noise configuration to it and measures the syndrome-relevant modes.
/// The measured record is what the decoder consumes.
pub trait NoiseProvider<C: Code + ?Sized> {
    /// Per-trial physical state, bound to the code's structural graph.
    type State;

    /// Measurement record handed to the decoder.
    type Syndrome;

    /// Failure raised by state preparation, noise or measurement.
    type Error;

    /// Builds a fresh state on `graph`, swapping each encoded state for a
    /// degraded one with probability `p_swap`.
    fn prepare<R: Rng + ?Sized>(
        &self,
        graph: &C::Graph,
        p_swap: f64,
        rng: &mut R,
    ) -> Result<Self::State, Self::Error>;

    /// Samples physical noise into `state` according to `noise`.
    fn apply_noise<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        noise: &NoiseConfig,
        rng: &mut R,
    ) -> Result<(), Self::Error>;

    /// Performs a homodyne measurement of `quadrature` on `indices`.
    fn measure<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        quadrature: Quadrature,
        indices: &[usize],
        rng: &mut R,
    ) -> Result<Self::Syndrome, Self::Error>;
}

/// Combined noise, measurement and weight precomputation for the passive
/// (macronode) pipeline.
///
/// The bundle is shared read-only between trials. Implementations must not
/// mutate it through interior mutability; every call produces a fresh
/// syndrome record.
pub trait PassiveReducer {
    /// Externally constructed inputs: reduced lattice, base lattice, empty
    /// noise layer and beamsplitter network.
    type Bundle;

    /// Measurement record handed to the decoder.
    type Syndrome;

    /// Failure raised by the reduction.
    type Error;

    /// Runs one noise-measure-weight pass over `bundle`.
    fn reduce_and_simulate<R: Rng + ?Sized>(
        &self,
        bundle: &Self::Bundle,
        p_swap: f64,
        delta: f64,
        rng: &mut R,
    ) -> Result<Self::Syndrome, Self::Error>;
}

/// Syndrome decoder with logical verification.
///
/// Infers a correction from `syndrome`, applies it, and reports whether the
/// corrected state is logically correct. `Ok(true)` is a successful trial,
/// `Ok(false)` a logical error.
pub trait Decoder<C: Code + ?Sized, S> {
    /// Failure raised while decoding.
    type Error;

    fn correct(
        &self,
        code: &C,
        syndrome: &S,
        config: &DecoderConfig,
    ) -> Result<bool, Self::Error>;
}

