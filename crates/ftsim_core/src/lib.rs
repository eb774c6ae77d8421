//! Monte Carlo trial engine for fault-tolerance threshold estimation.
//!
//! This crate estimates the logical failure rate of an error-correcting code
//! by repeated randomized trials. It contains only the orchestration layer:
//! the code, the physical noise layer, the passive macronode reducer and the
//! decoder are collaborators described by traits, so any compatible
//! implementation can be plugged in. The crate is `no_std` and allocation
//! free so it can be embedded anywhere a random number generator exists.

#![cfg_attr(not(test), no_std)]

/// Tagged configuration records for noise, decoding and edge weighting.
///
/// Replaces free-form key/value configuration with closed types. Active and
/// passive decoder configurations are separate variants so that a passive
/// run cannot carry an inner decoder and an active run cannot claim
/// precomputed probabilities.
pub mod config;

/// The trial engine.
///
/// Runs a fixed number of independent trials through the selected pipeline
/// and reduces the success verdicts into an error count. Collaborator
/// failures propagate unchanged and abort the run.
pub mod engine;

/// Pipeline selection.
///
/// Turns the caller's architecture choice into a frozen pipeline with its
/// noise and decoder configuration, once per run.
pub mod pipeline;

/// Collaborator capabilities: code, noise provider, passive reducer and
/// decoder.
pub mod traits;

pub use config::{
    BlueprintWeights, DecoderConfig, InnerDecoder, NoiseConfig, NoiseKind, OuterDecoder,
    Quadrature, SamplingOrder, WeightMethod,
};
pub use engine::TrialEngine;
pub use pipeline::{Architecture, Mode, PassiveBundle, Pipeline};
pub use traits::{Code, Decoder, NoiseProvider, PassiveReducer};
