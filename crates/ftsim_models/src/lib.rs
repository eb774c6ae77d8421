//! Reference collaborators for the trial engine.
//!
//! A qubit-level surface code with GKP-encoded qubits: the matching
//! lattice, a Gaussian noise layer for the active architecture, a macronode
//! reducer for the passive architecture and a matching decoder. All four
//! share [`SyndromeRecord`] as their syndrome type and [`ModelError`] as
//! their error type, so they plug into one
//! [`TrialEngine`](ftsim_core::TrialEngine).

/// Minimum-weight perfect matching over the blueprint weights of a sector.
///
/// Exact for small defect counts, greedy beyond them.
pub mod decoder;

pub mod error;

/// GKP binning and bit error probabilities.
pub mod gkp;

/// The surface-code matching lattice and the [`SurfaceCode`] wrapper that
/// exposes it through [`Code`](ftsim_core::Code).
pub mod lattice;

/// Macronode reduction for the passive architecture.
///
/// Builds the macronode bundle once per run and, per trial, samples the
/// mode states, reduces each macronode onto its star mode and records the
/// bit values with their conditional error probabilities.
pub mod macro_reduce;

/// Gaussian noise layer and homodyne measurement for the active pipeline.
pub mod noise;

/// Syndrome record shared by the noise layer, the reducer and the decoder.
pub mod record;

pub use decoder::MatchingDecoder;
pub use error::{ModelError, Result};
pub use lattice::{Lattice, SurfaceCode};
pub use macro_reduce::{
    BeamsplitterNetwork, MacroBundle, MacroLattice, MacronodeReducer, build_bundle,
};
pub use noise::{LayerState, NoiseLayer};
pub use record::{Precomputed, SyndromeRecord};
