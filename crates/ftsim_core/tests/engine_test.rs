use ftsim_core::{
    Architecture, Code, Decoder, DecoderConfig, NoiseConfig, NoiseProvider, PassiveBundle,
    PassiveReducer, Quadrature, TrialEngine,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::Cell;

#[derive(Debug, Clone, PartialEq)]
enum StubError {
    Noise(usize),
    Decode(usize),
}

struct StubCode {
    graph: Vec<u32>,
    indices: Vec<usize>,
}

impl Code for StubCode {
    type Graph = [u32];

    fn graph(&self) -> &[u32] {
        &self.graph
    }

    fn syndrome_indices(&self) -> &[usize] {
        &self.indices
    }
}

#[derive(Default)]
struct Calls {
    prepare: Cell<usize>,
    apply: Cell<usize>,
    measure: Cell<usize>,
    reduce: Cell<usize>,
    decode: Cell<usize>,
    last_config: Cell<Option<DecoderConfig>>,
}

impl Calls {
    fn active_calls(&self) -> usize {
        self.prepare.get() + self.apply.get() + self.measure.get()
    }

    fn total(&self) -> usize {
        self.active_calls() + self.reduce.get() + self.decode.get()
    }
}

fn bump(cell: &Cell<usize>) -> usize {
    let n = cell.get();
    cell.set(n + 1);
    n
}

struct StubState {
    graph_len: usize,
    sample: Option<u64>,
}

struct StubNoise<'c> {
    calls: &'c Calls,
    fail_measure_at: Option<usize>,
}

impl NoiseProvider<StubCode> for StubNoise<'_> {
    type State = StubState;
    type Syndrome = u64;
    type Error = StubError;

    fn prepare<R: Rng + ?Sized>(
        &self,
        graph: &[u32],
        p_swap: f64,
        _rng: &mut R,
    ) -> Result<StubState, StubError> {
        bump(&self.calls.prepare);
        assert_eq!(p_swap, 0.5);
        Ok(StubState {
            graph_len: graph.len(),
            sample: None,
        })
    }

    fn apply_noise<R: Rng + ?Sized>(
        &self,
        state: &mut StubState,
        noise: &NoiseConfig,
        rng: &mut R,
    ) -> Result<(), StubError> {
        bump(&self.calls.apply);
        assert_eq!(*noise, NoiseConfig::gaussian(0.01));
        state.sample = Some(rng.next_u64());
        Ok(())
    }

    fn measure<R: Rng + ?Sized>(
        &self,
        state: &mut StubState,
        quadrature: Quadrature,
        indices: &[usize],
        _rng: &mut R,
    ) -> Result<u64, StubError> {
        let n = bump(&self.calls.measure);
        assert_eq!(quadrature, Quadrature::P);
        assert_eq!(indices, &[1, 3, 5]);
        assert_eq!(state.graph_len, 6);
        if self.fail_measure_at == Some(n) {
            return Err(StubError::Noise(n));
        }
        Ok(state.sample.expect("noise applied before measurement"))
    }
}

type StubBundle = PassiveBundle<&'static str, &'static str, &'static str, [f64; 4]>;

struct StubReducer<'c> {
    calls: &'c Calls,
}

impl PassiveReducer for StubReducer<'_> {
    type Bundle = StubBundle;
    type Syndrome = u64;
    type Error = StubError;

    fn reduce_and_simulate<R: Rng + ?Sized>(
        &self,
        bundle: &StubBundle,
        p_swap: f64,
        delta: f64,
        rng: &mut R,
    ) -> Result<u64, StubError> {
        bump(&self.calls.reduce);
        assert_eq!(bundle.macro_lattice, "macro");
        assert_eq!(p_swap, 0.5);
        assert_eq!(delta, 0.01);
        Ok(rng.next_u64())
    }
}

struct ScriptedDecoder<'c> {
    calls: &'c Calls,
    verdict: Box<dyn Fn(usize, u64) -> bool>,
    fail_at: Option<usize>,
}

impl Decoder<StubCode, u64> for ScriptedDecoder<'_> {
    type Error = StubError;

    fn correct(
        &self,
        code: &StubCode,
        syndrome: &u64,
        config: &DecoderConfig,
    ) -> Result<bool, StubError> {
        let n = bump(&self.calls.decode);
        assert_eq!(code.indices.len(), 3);
        self.calls.last_config.set(Some(*config));
        if self.fail_at == Some(n) {
            return Err(StubError::Decode(n));
        }
        Ok((self.verdict)(n, *syndrome))
    }
}

fn stub_code() -> StubCode {
    StubCode {
        graph: vec![0, 1, 2, 3, 4, 5],
        indices: vec![1, 3, 5],
    }
}

fn stub_bundle() -> StubBundle {
    PassiveBundle::new("macro", "lattice", "layer", [0.5; 4])
}

struct Harness {
    code: StubCode,
    bundle: StubBundle,
    calls: Calls,
}

impl Harness {
    fn new() -> Self {
        Self {
            code: stub_code(),
            bundle: stub_bundle(),
            calls: Calls::default(),
        }
    }

    fn run(
        &self,
        passive: bool,
        trials: usize,
        verdict: impl Fn(usize, u64) -> bool + 'static,
        seed: u64,
    ) -> Result<usize, StubError> {
        self.run_with_failures(passive, trials, verdict, seed, None, None)
    }

    fn run_with_failures(
        &self,
        passive: bool,
        trials: usize,
        verdict: impl Fn(usize, u64) -> bool + 'static,
        seed: u64,
        fail_measure_at: Option<usize>,
        fail_decode_at: Option<usize>,
    ) -> Result<usize, StubError> {
        let noise = StubNoise {
            calls: &self.calls,
            fail_measure_at,
        };
        let reducer = StubReducer { calls: &self.calls };
        let decoder = ScriptedDecoder {
            calls: &self.calls,
            verdict: Box::new(verdict),
            fail_at: fail_decode_at,
        };
        let engine = TrialEngine::new(&self.code, &noise, &reducer, &decoder);
        let architecture = if passive {
            Architecture::Passive(&self.bundle)
        } else {
            Architecture::Active
        };
        let mut rng = StdRng::seed_from_u64(seed);
        engine.run_trials(architecture, trials, 0.01, 0.5, &mut rng)
    }
}

#[test]
fn zero_trials_invoke_no_collaborator() {
    for passive in [false, true] {
        let harness = Harness::new();
        let errors = harness.run(passive, 0, |_, _| false, 1).unwrap();
        assert_eq!(errors, 0);
        assert_eq!(harness.calls.total(), 0, "passive={passive}");
    }
}

#[test]
fn always_successful_decoder_gives_no_errors() {
    for passive in [false, true] {
        let harness = Harness::new();
        assert_eq!(harness.run(passive, 37, |_, _| true, 2).unwrap(), 0);
        assert_eq!(harness.calls.decode.get(), 37);
    }
}

#[test]
fn always_failing_decoder_fails_every_trial() {
    for passive in [false, true] {
        let harness = Harness::new();
        assert_eq!(harness.run(passive, 37, |_, _| false, 3).unwrap(), 37);
    }
}

#[test]
fn first_k_successes_leave_t_minus_k_errors() {
    let trials = 20;
    for k in [0, 1, 7, 20] {
        let harness = Harness::new();
        let errors = harness.run(false, trials, move |n, _| n < k, 4).unwrap();
        assert_eq!(errors, trials - k);
    }
}

#[test]
fn passive_run_never_touches_active_collaborators() {
    let harness = Harness::new();
    harness.run(true, 5, |n, _| n % 2 == 0, 5).unwrap();
    assert_eq!(harness.calls.active_calls(), 0);
    assert_eq!(harness.calls.reduce.get(), 5);
    assert_eq!(harness.calls.decode.get(), 5);
    assert_eq!(
        harness.calls.last_config.get(),
        Some(DecoderConfig::precomputed())
    );
}

#[test]
fn active_run_never_touches_reducer() {
    let harness = Harness::new();
    harness.run(false, 5, |n, _| n % 2 == 0, 6).unwrap();
    assert_eq!(harness.calls.reduce.get(), 0);
    assert_eq!(harness.calls.prepare.get(), 5);
    assert_eq!(harness.calls.apply.get(), 5);
    assert_eq!(harness.calls.measure.get(), 5);
    assert_eq!(harness.calls.decode.get(), 5);
    assert_eq!(
        harness.calls.last_config.get(),
        Some(DecoderConfig::direct(0.01))
    );
}

#[test]
fn fixed_seventy_percent_pattern_gives_exact_count() {
    let harness = Harness::new();
    let errors = harness.run(false, 100, |n, _| n % 10 < 7, 7).unwrap();
    assert_eq!(errors, 30);
}

#[test]
fn decoder_failure_aborts_the_run() {
    let harness = Harness::new();
    let result = harness.run_with_failures(false, 10, |_, _| true, 8, None, Some(3));
    assert_eq!(result, Err(StubError::Decode(3)));
    assert_eq!(harness.calls.decode.get(), 4);
    assert_eq!(harness.calls.prepare.get(), 4);
}

#[test]
fn measurement_failure_skips_decoding() {
    let harness = Harness::new();
    let result = harness.run_with_failures(false, 10, |_, _| true, 9, Some(2), None);
    assert_eq!(result, Err(StubError::Noise(2)));
    assert_eq!(harness.calls.measure.get(), 3);
    assert_eq!(harness.calls.decode.get(), 2);
}

#[test]
fn seeded_runs_are_reproducible() {
    let verdict = |_: usize, sample: u64| sample % 3 != 0;
    for passive in [false, true] {
        let first = Harness::new().run(passive, 200, verdict, 42).unwrap();
        let second = Harness::new().run(passive, 200, verdict, 42).unwrap();
        assert_eq!(first, second);
    }
}

proptest! {
    #[test]
    fn error_count_never_exceeds_trials(
        trials in 0usize..300,
        seed in any::<u64>(),
        passive in any::<bool>(),
        modulus in 1u64..8,
    ) {
        let harness = Harness::new();
        let errors = harness
            .run(passive, trials, move |_, sample| sample % modulus == 0, seed)
            .unwrap();
        prop_assert!(errors <= trials);
        prop_assert_eq!(harness.calls.decode.get(), trials);
    }
}
