//! Measurement record handed from the physical layer to the decoder.

use bitvec::prelude::*;

/// Bit values and error probabilities computed ahead of decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Precomputed {
    /// Bit value read from every qubit.
    pub bits: BitVec,
    /// Probability that each bit value is wrong.
    pub error_probs: Vec<f64>,
}

/// Homodyne outcomes of one trial.
///
/// Indexed by global qubit. Active runs fill `outcomes` for the measured
/// qubits and leave `precomputed` empty; passive runs carry bit values and
/// error probabilities from the macronode reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct SyndromeRecord {
    pub outcomes: Vec<f64>,
    pub measured: BitVec,
    /// Qubits realised as p-squeezed instead of GKP states.
    pub swapped: BitVec,
    pub precomputed: Option<Precomputed>,
}

impl SyndromeRecord {
    /// Number of qubits the record covers.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
