//! Macronode reduction for the passive architecture.
//!
//! In the passive architecture every qubit of the lattice is a macronode of
//! `MACRONODE_SIZE` modes joined by a fixed beamsplitter network. Each mode
//! is independently a GKP or a p-squeezed state. The network concentrates
//! the GKP information of the macronode onto its star mode: the reduced
//! outcome has a Gaussian shift whose variance is the single-mode variance
//! divided by the network weight that lands on GKP modes. A macronode with
//! no GKP mode yields a random bit.

use crate::error::{ModelError, Result, check_delta, check_probability};
use crate::gkp::{
    SQRT_PI, SWAPPED_ERROR_PROBABILITY, bin_outcome, bit_error_probability_for_std, noise_std,
};
use crate::lattice::Lattice;
use crate::noise::LayerState;
use crate::record::{Precomputed, SyndromeRecord};
use bitvec::prelude::*;
use ftsim_common::macronode::{MACRONODE_SIZE, STAR};
use ftsim_core::{PassiveBundle, PassiveReducer};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand_distr::Normal;

/// Bundle consumed by [`MacronodeReducer`].
pub type MacroBundle = PassiveBundle<MacroLattice, Lattice, LayerState, BeamsplitterNetwork>;

/// The lattice with every qubit expanded into a macronode.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroLattice {
    macronodes: usize,
    padded: BitVec,
}

impl MacroLattice {
    pub fn new(macronodes: usize, padded: BitVec) -> Self {
        Self { macronodes, padded }
    }

    pub fn num_macronodes(&self) -> usize {
        self.macronodes
    }

    pub fn num_modes(&self) -> usize {
        self.macronodes * MACRONODE_SIZE
    }

    /// Whether the last planet of macronode `q` is a padding mode.
    pub fn is_padded(&self, q: usize) -> bool {
        self.padded[q]
    }

    pub fn num_padded(&self) -> usize {
        self.padded.count_ones()
    }
}

/// Real orthogonal network of balanced beamsplitters.
///
/// Stored row-major. Built as a butterfly of 50:50 beamsplitters, so the
/// size must be a power of two.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamsplitterNetwork {
    size: usize,
    matrix: Vec<f64>,
}

impl BeamsplitterNetwork {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(ModelError::InvalidNetwork(format!(
                "{size} modes is not a power of two"
            )));
        }

        let mut matrix = vec![0.0; size * size];
        for i in 0..size {
            matrix[i * size + i] = 1.0;
        }

        let t = core::f64::consts::FRAC_1_SQRT_2;
        let mut span = 1;
        while span < size {
            for block in (0..size).step_by(2 * span) {
                for a in block..block + span {
                    let b = a + span;
                    for col in 0..size {
                        let x = matrix[a * size + col];
                        let y = matrix[b * size + col];
                        matrix[a * size + col] = t * (x + y);
                        matrix[b * size + col] = t * (x - y);
                    }
                }
            }
            span *= 2;
        }

        Ok(Self { size, matrix })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.matrix[row * self.size + col]
    }

    /// Fraction of the star's output that comes from each input mode.
    pub fn star_weights(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.size).map(|j| self.entry(STAR, j).powi(2))
    }
}

/// Builds the passive bundle for a lattice.
///
/// Periodic lattices have no boundary and are never padded.
pub fn build_bundle(lattice: &Lattice) -> Result<MacroBundle> {
    let macro_lattice = lattice.macronize(lattice.boundary().pads_macronodes());
    let layer = LayerState::empty(lattice);
    let network = BeamsplitterNetwork::new(MACRONODE_SIZE)?;
    Ok(PassiveBundle::new(
        macro_lattice,
        lattice.clone(),
        layer,
        network,
    ))
}

/// Noise, reduction and probability precomputation in one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacronodeReducer;

impl MacronodeReducer {
    fn check_bundle(bundle: &MacroBundle) -> Result<()> {
        let qubits = bundle.lattice.num_qubits();
        if bundle.macro_lattice.num_macronodes() != qubits {
            return Err(ModelError::BundleMismatch(format!(
                "{} macronodes for {} qubits",
                bundle.macro_lattice.num_macronodes(),
                qubits
            )));
        }
        if bundle.layer.num_qubits() != qubits {
            return Err(ModelError::BundleMismatch(format!(
                "layer holds {} modes for {} qubits",
                bundle.layer.num_qubits(),
                qubits
            )));
        }
        if bundle.layer.is_noisy() {
            return Err(ModelError::BundleMismatch(
                "layer already carries a noise realisation".into(),
            ));
        }
        if bundle.network.size() != MACRONODE_SIZE {
            return Err(ModelError::BundleMismatch(format!(
                "network acts on {} modes, macronodes have {}",
                bundle.network.size(),
                MACRONODE_SIZE
            )));
        }
        Ok(())
    }
}

impl PassiveReducer for MacronodeReducer {
    type Bundle = MacroBundle;
    type Syndrome = SyndromeRecord;
    type Error = ModelError;

    fn reduce_and_simulate<R: Rng + ?Sized>(
        &self,
        bundle: &MacroBundle,
        p_swap: f64,
        delta: f64,
        rng: &mut R,
    ) -> Result<SyndromeRecord> {
        check_probability("p_swap", p_swap)?;
        check_delta(delta)?;
        Self::check_bundle(bundle)?;

        let n = bundle.layer.num_qubits();
        let sigma = noise_std(delta);
        let star_weights: Vec<f64> = bundle.network.star_weights().collect();
        let period = Uniform::new(-SQRT_PI, SQRT_PI);

        let mut outcomes = vec![0.0; n];
        let mut swapped = bitvec![0; n];
        let mut bits = bitvec![0; n];
        let mut error_probs = vec![SWAPPED_ERROR_PROBABILITY; n];

        for q in 0..n {
            let padded = bundle.macro_lattice.is_padded(q);
            let mut gkp_weight = 0.0;
            for (mode, &w) in star_weights.iter().enumerate() {
                let padding = padded && mode == MACRONODE_SIZE - 1;
                if !padding && !rng.gen_bool(p_swap) {
                    gkp_weight += w;
                }
            }

            if gkp_weight > 0.0 {
                let sigma_eff = sigma / gkp_weight.sqrt();
                let gaussian = Normal::new(0.0, sigma_eff)
                    .map_err(|e| ModelError::invalid_parameter("delta", e.to_string()))?;
                outcomes[q] = gaussian.sample(rng);
                error_probs[q] = bit_error_probability_for_std(sigma_eff);
            } else {
                outcomes[q] = period.sample(rng);
                swapped.set(q, true);
            }
            bits.set(q, bin_outcome(outcomes[q]));
        }

        Ok(SyndromeRecord {
            outcomes,
            measured: bitvec![1; n],
            swapped,
            precomputed: Some(Precomputed { bits, error_probs }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftsim_common::{Boundary, EcScheme};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lattice() -> Lattice {
        Lattice::new(3, EcScheme::Primal, Boundary::Open).unwrap()
    }

    #[test]
    fn network_is_orthogonal() {
        let net = BeamsplitterNetwork::new(4).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let dot: f64 = (0..4).map(|k| net.entry(i, k) * net.entry(j, k)).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-12, "({i}, {j}) = {dot}");
            }
        }
        let total: f64 = net.star_weights().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(net.star_weights().all(|w| (w - 0.25).abs() < 1e-12));
    }

    #[test]
    fn network_size_must_be_power_of_two() {
        assert!(BeamsplitterNetwork::new(3).is_err());
        assert!(BeamsplitterNetwork::new(0).is_err());
        assert_eq!(BeamsplitterNetwork::new(8).unwrap().size(), 8);
    }

    #[test]
    fn bundle_is_consistent() {
        let lattice = lattice();
        let bundle = build_bundle(&lattice).unwrap();
        assert_eq!(bundle.macro_lattice.num_macronodes(), lattice.num_qubits());
        assert_eq!(bundle.macro_lattice.num_modes(), 4 * lattice.num_qubits());
        assert!(bundle.macro_lattice.num_padded() > 0);
        assert!(MacronodeReducer::check_bundle(&bundle).is_ok());
    }

    #[test]
    fn reduction_precomputes_bits_and_probabilities() {
        let bundle = build_bundle(&lattice()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let record = MacronodeReducer
            .reduce_and_simulate(&bundle, 0.3, 0.05, &mut rng)
            .unwrap();
        let pre = record.precomputed.as_ref().unwrap();
        assert_eq!(pre.bits.len(), record.len());
        assert_eq!(record.measured.count_ones(), record.len());
        for q in 0..record.len() {
            assert_eq!(pre.bits[q], bin_outcome(record.outcomes[q]));
            assert!(pre.error_probs[q] > 0.0 && pre.error_probs[q] <= 0.5);
            if record.swapped[q] {
                assert_eq!(pre.error_probs[q], SWAPPED_ERROR_PROBABILITY);
            }
        }
    }

    #[test]
    fn all_swapped_modes_give_random_bits() {
        let bundle = build_bundle(&lattice()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let record = MacronodeReducer
            .reduce_and_simulate(&bundle, 1.0, 0.05, &mut rng)
            .unwrap();
        assert_eq!(record.swapped.count_ones(), record.len());
    }

    #[test]
    fn bundle_is_left_untouched() {
        let bundle = build_bundle(&lattice()).unwrap();
        let before = bundle.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..3 {
            MacronodeReducer
                .reduce_and_simulate(&bundle, 0.5, 0.1, &mut rng)
                .unwrap();
        }
        assert_eq!(bundle.layer, before.layer);
        assert_eq!(bundle.macro_lattice, before.macro_lattice);
        assert_eq!(bundle.network, before.network);
    }

    #[test]
    fn mismatched_bundle_is_rejected() {
        let mut bundle = build_bundle(&lattice()).unwrap();
        bundle.macro_lattice = Lattice::new(4, EcScheme::Primal, Boundary::Open)
            .unwrap()
            .macronize(true);
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let err = MacronodeReducer
            .reduce_and_simulate(&bundle, 0.5, 0.1, &mut rng)
            .unwrap_err();
        assert!(matches!(err, ModelError::BundleMismatch(_)));
    }
}
