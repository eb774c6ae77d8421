//! Physical layer for the active pipeline.
//!
//! Every qubit of the lattice starts as a GKP state, or with probability
//! `p_swap` as a p-squeezed state. Gaussian random noise shifts GKP
//! outcomes by a normal deviate of variance `delta / 2`; a p-squeezed state
//! carries no bit information, so its outcome is uniform over one period.

use crate::error::{ModelError, Result, check_delta, check_probability};
use crate::gkp::{SQRT_PI, noise_std};
use crate::lattice::{Lattice, SurfaceCode};
use crate::record::SyndromeRecord;
use bitvec::prelude::*;
use ftsim_core::{NoiseConfig, NoiseKind, NoiseProvider, Quadrature, SamplingOrder};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand_distr::Normal;

/// Per-trial physical state of the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerState {
    swapped: BitVec,
    outcomes: Vec<f64>,
    noisy: bool,
}

impl LayerState {
    /// A layer of GKP states with no noise model applied.
    pub fn empty(lattice: &Lattice) -> Self {
        let n = lattice.num_qubits();
        Self {
            swapped: bitvec![0; n],
            outcomes: vec![0.0; n],
            noisy: false,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_noisy(&self) -> bool {
        self.noisy
    }

    pub fn swapped(&self) -> &BitSlice {
        &self.swapped
    }
}

/// Gaussian noise and p-homodyne measurement over a surface-code lattice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseLayer;

impl NoiseLayer {
    /// Samples outcomes for every qubit of `state` from the noise width.
    pub(crate) fn sample_outcomes<R: Rng + ?Sized>(
        state: &mut LayerState,
        delta: f64,
        rng: &mut R,
    ) -> Result<()> {
        check_delta(delta)?;
        let gaussian = Normal::new(0.0, noise_std(delta))
            .map_err(|e| ModelError::invalid_parameter("delta", e.to_string()))?;
        let period = Uniform::new(-SQRT_PI, SQRT_PI);

        for (q, outcome) in state.outcomes.iter_mut().enumerate() {
            *outcome = if state.swapped[q] {
                period.sample(rng)
            } else {
                gaussian.sample(rng)
            };
        }
        state.noisy = true;
        Ok(())
    }
}

impl NoiseProvider<SurfaceCode> for NoiseLayer {
    type State = LayerState;
    type Syndrome = SyndromeRecord;
    type Error = ModelError;

    fn prepare<R: Rng + ?Sized>(
        &self,
        graph: &Lattice,
        p_swap: f64,
        rng: &mut R,
    ) -> Result<LayerState> {
        check_probability("p_swap", p_swap)?;
        let mut state = LayerState::empty(graph);
        for q in 0..state.num_qubits() {
            state.swapped.set(q, rng.gen_bool(p_swap));
        }
        Ok(state)
    }

    fn apply_noise<R: Rng + ?Sized>(
        &self,
        state: &mut LayerState,
        noise: &NoiseConfig,
        rng: &mut R,
    ) -> Result<()> {
        match (noise.kind, noise.sampling_order) {
            (NoiseKind::Grn, SamplingOrder::Initial) => {
                Self::sample_outcomes(state, noise.delta, rng)
            }
        }
    }

    fn measure<R: Rng + ?Sized>(
        &self,
        state: &mut LayerState,
        quadrature: Quadrature,
        indices: &[usize],
        _rng: &mut R,
    ) -> Result<SyndromeRecord> {
        if quadrature != Quadrature::P {
            return Err(ModelError::UnsupportedQuadrature(quadrature));
        }
        if !state.noisy {
            return Err(ModelError::NoiseNotApplied);
        }

        let n = state.num_qubits();
        let mut outcomes = vec![0.0; n];
        let mut measured = bitvec![0; n];
        for &q in indices {
            if q >= n {
                return Err(ModelError::IndexOutOfBounds { index: q, len: n });
            }
            outcomes[q] = state.outcomes[q];
            measured.set(q, true);
        }

        Ok(SyndromeRecord {
            outcomes,
            measured,
            swapped: state.swapped.clone(),
            precomputed: None,
        })
    }
}
