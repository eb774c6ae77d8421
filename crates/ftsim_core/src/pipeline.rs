//! Pipeline decision logic.
//!
//! A run is either active (noise and measurement through a
//! [`NoiseProvider`](crate::traits::NoiseProvider)) or passive (one combined
//! call to a [`PassiveReducer`](crate::traits::PassiveReducer) over a shared
//! bundle). The choice is made once, from the [`Architecture`] the caller
//! passes in, and frozen into a [`Pipeline`] together with the noise and
//! decoder configuration for the whole run.

use crate::config::{DecoderConfig, NoiseConfig};
use crate::traits::Code;

/// Externally constructed inputs of the passive pipeline.
///
/// Passed through unmodified on every trial. The engine only ever hands out
/// shared references to it.
#[derive(Debug, Clone)]
pub struct PassiveBundle<M, L, Y, W> {
    /// Lattice with macronodes.
    pub macro_lattice: M,
    /// Base (reduced) lattice.
    pub lattice: L,
    /// Physical layer on the base lattice with no noise model applied.
    pub layer: Y,
    /// Beamsplitter network applied inside every macronode.
    pub network: W,
}

impl<M, L, Y, W> PassiveBundle<M, L, Y, W> {
    pub fn new(macro_lattice: M, lattice: L, layer: Y, network: W) -> Self {
        Self {
            macro_lattice,
            lattice,
            layer,
            network,
        }
    }
}

/// Architecture requested by the caller for one run.
pub enum Architecture<'a, B: ?Sized> {
    /// Direct noise-and-measure pipeline on the code's own graph.
    Active,
    /// Macronode-reduction pipeline over a shared bundle.
    Passive(&'a B),
}

impl<'a, B: ?Sized> Architecture<'a, B> {
    /// Passive when a bundle is present, active otherwise.
    pub fn from_bundle(bundle: Option<&'a B>) -> Self {
        match bundle {
            Some(bundle) => Architecture::Passive(bundle),
            None => Architecture::Active,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Architecture::Active => Mode::Active,
            Architecture::Passive(_) => Mode::Passive,
        }
    }
}

impl<B: ?Sized> Clone for Architecture<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for Architecture<'_, B> {}

/// The two pipeline states. There are no transitions within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Active,
    Passive,
}

/// A pipeline selected for a run, with its configuration assembled.
pub enum Pipeline<'a, G: ?Sized, B: ?Sized> {
    Active {
        /// Structural graph, read once from the code.
        graph: &'a G,
        noise: NoiseConfig,
        decoder: DecoderConfig,
    },
    Passive {
        bundle: &'a B,
        delta: f64,
        decoder: DecoderConfig,
    },
}

impl<'a, G: ?Sized, B: ?Sized> Pipeline<'a, G, B> {
    /// Selects the pipeline for a run and builds its configuration.
    ///
    /// A passive architecture yields `{outer: MWPM}` decoding over
    /// precomputed blueprint probabilities and never touches the code's
    /// graph. An active architecture reads the structural graph exactly once
    /// and yields Gaussian noise of width `delta` with `{inner: basic,
    /// outer: MWPM}` decoding and blueprint weights derived from `delta`.
    pub fn select<C>(code: &'a C, architecture: Architecture<'a, B>, delta: f64) -> Self
    where
        C: Code<Graph = G> + ?Sized,
    {
        match architecture {
            Architecture::Passive(bundle) => Pipeline::Passive {
                bundle,
                delta,
                decoder: DecoderConfig::precomputed(),
            },
            Architecture::Active => Pipeline::Active {
                graph: code.graph(),
                noise: NoiseConfig::gaussian(delta),
                decoder: DecoderConfig::direct(delta),
            },
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Pipeline::Active { .. } => Mode::Active,
            Pipeline::Passive { .. } => Mode::Passive,
        }
    }

    pub fn decoder_config(&self) -> &DecoderConfig {
        match self {
            Pipeline::Active { decoder, .. } | Pipeline::Passive { decoder, .. } => decoder,
        }
    }

    /// Noise configuration of an active pipeline; `None` when passive.
    pub fn noise_config(&self) -> Option<&NoiseConfig> {
        match self {
            Pipeline::Active { noise, .. } => Some(noise),
            Pipeline::Passive { .. } => None,
        }
    }
}
