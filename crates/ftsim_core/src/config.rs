//! Tagged configuration records passed to the collaborators.
//!
//! Each record is a small closed type: the noise model, the decoding
//! strategy and the weighting policy. Decoder configuration is split by
//! pipeline so that a passive run can never carry an inner decoder or
//! delta-derived weights, and an active run can never claim precomputed
//! probabilities.

use core::fmt;

/// Physical noise model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseKind {
    /// Gaussian random noise on GKP states.
    Grn,
}

/// Point in the preparation at which noise is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingOrder {
    /// Noise is drawn on the initial states, before any entangling gates.
    Initial,
}

/// Noise configuration: `{ kind, delta, sampling_order }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    pub kind: NoiseKind,
    /// Width (squeezing) parameter of the noise.
    pub delta: f64,
    pub sampling_order: SamplingOrder,
}

impl NoiseConfig {
    /// Gaussian random noise of width `delta`, sampled on initial states.
    pub fn gaussian(delta: f64) -> Self {
        Self {
            kind: NoiseKind::Grn,
            delta,
            sampling_order: SamplingOrder::Initial,
        }
    }
}

/// Homodyne measurement quadrature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrature {
    /// Position quadrature.
    Q,
    /// Momentum quadrature.
    P,
}

/// Inner decoder, turning homodyne outcomes into bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InnerDecoder {
    /// Standard GKP binning.
    Basic,
}

/// Outer decoder, turning a qubit-level syndrome into a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OuterDecoder {
    /// Minimum-weight perfect matching.
    Mwpm,
}

/// Method used to assign edge weights in the matching graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightMethod {
    /// Weights derived from per-qubit error probabilities.
    Blueprint,
}

/// Blueprint weighting computed by the decoder from the noise width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlueprintWeights {
    /// Round weights to integers after scaling.
    pub integer: bool,
    /// Scale factor applied to every weight.
    pub multiplier: u32,
    /// Noise width the error probabilities are derived from.
    pub delta: f64,
}

/// Decoder configuration for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecoderConfig {
    /// Active pipeline: inner decoding of raw outcomes, then outer decoding
    /// with blueprint weights computed from `delta`.
    Direct {
        inner: InnerDecoder,
        outer: OuterDecoder,
        weights: BlueprintWeights,
    },
    /// Passive pipeline: bit values and error probabilities come from the
    /// reducer, so only the outer strategy is named.
    Precomputed { outer: OuterDecoder },
}

impl DecoderConfig {
    /// `{inner: basic, outer: MWPM}` with blueprint weights
    /// `{integer: false, multiplier: 1, delta}`.
    pub fn direct(delta: f64) -> Self {
        DecoderConfig::Direct {
            inner: InnerDecoder::Basic,
            outer: OuterDecoder::Mwpm,
            weights: BlueprintWeights {
                integer: false,
                multiplier: 1,
                delta,
            },
        }
    }

    /// `{outer: MWPM}` with blueprint weights over precomputed probabilities.
    pub fn precomputed() -> Self {
        DecoderConfig::Precomputed {
            outer: OuterDecoder::Mwpm,
        }
    }

    pub fn inner(&self) -> Option<InnerDecoder> {
        match self {
            DecoderConfig::Direct { inner, .. } => Some(*inner),
            DecoderConfig::Precomputed { .. } => None,
        }
    }

    pub fn outer(&self) -> OuterDecoder {
        match self {
            DecoderConfig::Direct { outer, .. } | DecoderConfig::Precomputed { outer } => *outer,
        }
    }

    pub fn weight_method(&self) -> WeightMethod {
        WeightMethod::Blueprint
    }

    /// Whether edge probabilities arrive with the syndrome record.
    pub fn probabilities_precomputed(&self) -> bool {
        matches!(self, DecoderConfig::Precomputed { .. })
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseKind::Grn => f.write_str("grn"),
        }
    }
}

impl fmt::Display for SamplingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingOrder::Initial => f.write_str("initial"),
        }
    }
}

impl fmt::Display for Quadrature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quadrature::Q => f.write_str("q"),
            Quadrature::P => f.write_str("p"),
        }
    }
}

impl fmt::Display for InnerDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InnerDecoder::Basic => f.write_str("basic"),
        }
    }
}

impl fmt::Display for OuterDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OuterDecoder::Mwpm => f.write_str("MWPM"),
        }
    }
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightMethod::Blueprint => f.write_str("blueprint"),
        }
    }
}

impl fmt::Display for NoiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "noise={} delta={} sampling_order={}",
            self.kind, self.delta, self.sampling_order
        )
    }
}

impl fmt::Display for DecoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderConfig::Direct {
                inner,
                outer,
                weights,
            } => write!(
                f,
                "inner={} outer={} method={} integer={} multiplier={} delta={}",
                inner,
                outer,
                self.weight_method(),
                weights.integer,
                weights.multiplier,
                weights.delta
            ),
            DecoderConfig::Precomputed { outer } => write!(
                f,
                "outer={} method={} prob_precomputed=true",
                outer,
                self.weight_method()
            ),
        }
    }
}
