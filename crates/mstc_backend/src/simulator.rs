//! Simulator backend for MSTC
//!
//! Gantree: L2_Backend → SimulatorBackend
//!
//! Ideal state-vector simulator with dynamic-circuit support: mid-circuit
//! measurement, reset, classically conditioned X, and repeat-until-success
//! loops. Circuits whose only non-unitary tail is a final measurement layer
//! are simulated once and sampled per shot.

use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
use mstc_core::{drive, Circuit, Counts, Gate, MstcError, MstcResult, QubitId};
use num_complex::Complex64;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::time::Instant;

/// Largest register the simulator accepts
const MAX_SIMULATED_QUBITS: usize = 24;

/// Ideal state-vector simulator
/// Gantree: SimulatorBackend // 시뮬레이터 구현
pub struct SimulatorBackend {
    /// Backend name
    name: String,

    /// Number of qubits
    num_qubits: usize,

    /// Random seed
    seed: Option<u64>,
}

/// Per-shot mutable simulation state
struct ShotState {
    amplitudes: Vec<Complex64>,
    clbits: Vec<bool>,
    rus_loops: u64,
    rus_attempts: u64,
}

impl SimulatorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create ideal simulator
    pub fn new(num_qubits: usize) -> Self {
        Self {
            name: "mstc_simulator".to_string(),
            num_qubits: num_qubits.min(MAX_SIMULATED_QUBITS),
            seed: None,
        }
    }

    /// Alias for `new`
    pub fn ideal(num_qubits: usize) -> Self {
        Self::new(num_qubits)
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ========================================================================
    // Exact Evaluation
    // ========================================================================

    /// Final state vector of a unitary circuit (measurements are ignored)
    /// Gantree: statevector(circuit) -> Result<Vec<Complex64>> // 상태 벡터
    pub fn statevector(&self, circuit: &Circuit) -> MstcResult<Vec<Complex64>> {
        self.check_width(circuit)?;
        let mut amplitudes = zero_state(circuit.num_qubits());
        for gate in circuit.gates() {
            match gate {
                Gate::Measure(_, _) | Gate::Barrier(_) => {}
                g if g.is_dynamic() => {
                    return Err(MstcError::BackendError(format!(
                        "statevector needs a unitary circuit, found '{}'",
                        g.name()
                    )))
                }
                g => apply_unitary(&mut amplitudes, g),
            }
        }
        Ok(amplitudes)
    }

    /// Basis-state probabilities of a unitary circuit
    pub fn probabilities(&self, circuit: &Circuit) -> MstcResult<Vec<f64>> {
        Ok(self
            .statevector(circuit)?
            .iter()
            .map(|a| a.norm_sqr())
            .collect())
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn check_width(&self, circuit: &Circuit) -> MstcResult<()> {
        if circuit.num_qubits() > self.num_qubits {
            return Err(MstcError::QubitOutOfRange {
                qubit: circuit.num_qubits(),
                max: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Simulate circuit and return counts plus RUS statistics
    fn simulate(
        &self,
        circuit: &Circuit,
        shots: u64,
        rng: &mut StdRng,
    ) -> MstcResult<(Counts, u64, u64)> {
        if let Some(split) = circuit.unitary_prefix_len() {
            return self.sample_terminal(circuit, split, shots, rng);
        }

        let mut counts: Counts = HashMap::new();
        let mut rus_loops = 0;
        let mut rus_attempts = 0;
        for _ in 0..shots {
            let shot = self.simulate_single_shot(circuit, rng)?;
            rus_loops += shot.rus_loops;
            rus_attempts += shot.rus_attempts;
            *counts.entry(readout(circuit, &shot, rng)?).or_insert(0) += 1;
        }
        Ok((counts, rus_loops, rus_attempts))
    }

    /// Fast path: evolve once, then sample the final measurement layer
    fn sample_terminal(
        &self,
        circuit: &Circuit,
        split: usize,
        shots: u64,
        rng: &mut StdRng,
    ) -> MstcResult<(Counts, u64, u64)> {
        let mut amplitudes = zero_state(circuit.num_qubits());
        for gate in &circuit.gates()[..split] {
            apply_unitary(&mut amplitudes, gate);
        }
        let weights: Vec<f64> = amplitudes.iter().map(|a| a.norm_sqr()).collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| MstcError::BackendError(format!("degenerate state: {}", e)))?;

        let measurements: Vec<(QubitId, usize)> = circuit.gates()[split..]
            .iter()
            .filter_map(|g| match g {
                Gate::Measure(q, c) => Some((*q, *c)),
                _ => None,
            })
            .collect();

        let mut by_basis: HashMap<usize, u64> = HashMap::new();
        for _ in 0..shots {
            *by_basis.entry(dist.sample(rng)).or_insert(0) += 1;
        }

        let mut counts: Counts = HashMap::new();
        for (basis, count) in by_basis {
            let key = if circuit.num_clbits() == 0 {
                format!("{:0width$b}", basis, width = circuit.num_qubits())
            } else {
                let mut clbits = vec![false; circuit.num_clbits()];
                for &(q, c) in &measurements {
                    clbits[c] = (basis >> q) & 1 == 1;
                }
                bits_to_string(&clbits)
            };
            *counts.entry(key).or_insert(0) += count;
        }
        Ok((counts, 0, 0))
    }

    /// Simulate a single shot
    fn simulate_single_shot(&self, circuit: &Circuit, rng: &mut StdRng) -> MstcResult<ShotState> {
        let mut shot = ShotState {
            amplitudes: zero_state(circuit.num_qubits()),
            clbits: vec![false; circuit.num_clbits()],
            rus_loops: 0,
            rus_attempts: 0,
        };
        for gate in circuit.gates() {
            apply_gate(&mut shot, gate, rng)?;
        }
        Ok(shot)
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn execute(&self, circuit: &Circuit, shots: u64) -> MstcResult<ExecutionResult> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(circuit, shots, &mut rng, self.seed)
    }

    fn execute_seeded(
        &self,
        circuit: &Circuit,
        shots: u64,
        seed: u64,
    ) -> MstcResult<ExecutionResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(circuit, shots, &mut rng, Some(seed))
    }
}

impl SimulatorBackend {
    fn run(
        &self,
        circuit: &Circuit,
        shots: u64,
        rng: &mut StdRng,
        seed: Option<u64>,
    ) -> MstcResult<ExecutionResult> {
        self.check_width(circuit)?;
        if shots > self.max_shots() {
            return Err(MstcError::BackendError(format!(
                "{} shots requested, limit is {}",
                shots,
                self.max_shots()
            )));
        }

        let started = Instant::now();
        let (counts, rus_loops, rus_attempts) = self.simulate(circuit, shots, rng)?;
        log::debug!(
            "{}: {} shots on {} qubits, {} outcomes, {} RUS attempts",
            self.name,
            shots,
            circuit.num_qubits(),
            counts.len(),
            rus_attempts
        );

        Ok(ExecutionResult {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: self.name.clone(),
                execution_time_ms: Some(started.elapsed().as_millis() as u64),
                simulated: true,
                seed,
                rus_loops,
                rus_attempts,
                ..Default::default()
            },
        })
    }
}

// ============================================================================
// Gate Application
// ============================================================================

fn zero_state(num_qubits: usize) -> Vec<Complex64> {
    let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
    amplitudes[0] = Complex64::new(1.0, 0.0);
    amplitudes
}

fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().rev().map(|&b| if b { '1' } else { '0' }).collect()
}

fn readout(circuit: &Circuit, shot: &ShotState, rng: &mut StdRng) -> MstcResult<String> {
    if circuit.num_clbits() > 0 {
        return Ok(bits_to_string(&shot.clbits));
    }
    // No classical register: read out every qubit
    let weights: Vec<f64> = shot.amplitudes.iter().map(|a| a.norm_sqr()).collect();
    let basis = WeightedIndex::new(&weights)
        .map_err(|e| MstcError::BackendError(format!("degenerate state: {}", e)))?
        .sample(rng);
    Ok(format!("{:0width$b}", basis, width = circuit.num_qubits()))
}

/// Apply one gate, possibly non-unitary
fn apply_gate(shot: &mut ShotState, gate: &Gate, rng: &mut StdRng) -> MstcResult<()> {
    match gate {
        Gate::Measure(q, c) => {
            let outcome = measure(&mut shot.amplitudes, *q, rng);
            shot.clbits[*c] = outcome;
        }
        Gate::Reset(q) => reset(&mut shot.amplitudes, *q, rng),
        Gate::CondX(cond, q) => {
            if cond.holds(&shot.clbits) {
                apply_x(&mut shot.amplitudes, *q);
            }
        }
        Gate::RepeatUntil(rus) => {
            let outcome = drive(rus.budget(), |attempt| {
                if attempt > 1 {
                    for &q in &rus.reset {
                        reset(&mut shot.amplitudes, q, rng);
                    }
                }
                for g in &rus.body {
                    if let Err(err) = apply_gate(&mut *shot, g, &mut *rng) {
                        log::warn!("RUS body failed: {}", err);
                        return Some(Err(err));
                    }
                }
                let flag = measure(&mut shot.amplitudes, rus.flag, rng);
                shot.clbits[rus.flag_clbit] = flag;
                (flag == rus.accept).then_some(Ok(()))
            })?;
            outcome.value?;
            shot.rus_loops += 1;
            shot.rus_attempts += outcome.attempts;
        }
        g => apply_unitary(&mut shot.amplitudes, g),
    }
    Ok(())
}

/// Projective Z measurement with collapse
fn measure(state: &mut [Complex64], q: QubitId, rng: &mut StdRng) -> bool {
    let mask = 1 << q;
    let p1: f64 = state
        .iter()
        .enumerate()
        .filter(|(i, _)| i & mask != 0)
        .map(|(_, a)| a.norm_sqr())
        .sum();
    let outcome = rng.gen::<f64>() < p1;
    let norm = if outcome { p1 } else { 1.0 - p1 }.sqrt();
    for (i, amp) in state.iter_mut().enumerate() {
        if ((i & mask) != 0) == outcome {
            if norm > 0.0 {
                *amp /= norm;
            }
        } else {
            *amp = Complex64::new(0.0, 0.0);
        }
    }
    outcome
}

fn reset(state: &mut [Complex64], q: QubitId, rng: &mut StdRng) {
    if measure(state, q, rng) {
        apply_x(state, q);
    }
}

/// Apply a unitary gate (non-unitary gates are no-ops here)
fn apply_unitary(state: &mut [Complex64], gate: &Gate) {
    let i = Complex64::new(0.0, 1.0);
    match gate {
        Gate::H(q) => {
            let r = std::f64::consts::FRAC_1_SQRT_2;
            apply_single(state, *q, |a, b| ((a + b) * r, (a - b) * r));
        }
        Gate::X(q) => apply_x(state, *q),
        Gate::Y(q) => apply_single(state, *q, |a, b| (-i * b, i * a)),
        Gate::Z(q) => apply_single(state, *q, |a, b| (a, -b)),
        Gate::S(q) => apply_single(state, *q, |a, b| (a, i * b)),
        Gate::Sdg(q) => apply_single(state, *q, |a, b| (a, -i * b)),
        Gate::Rx(q, angle) => {
            let (c, s) = ((angle / 2.0).cos(), (angle / 2.0).sin());
            apply_single(state, *q, |a, b| (a * c - i * b * s, b * c - i * a * s));
        }
        Gate::Ry(q, angle) => apply_ry(state, *q, *angle, |_| true),
        Gate::Rz(q, angle) => {
            let neg = Complex64::from_polar(1.0, -angle / 2.0);
            let pos = Complex64::from_polar(1.0, angle / 2.0);
            apply_single(state, *q, |a, b| (a * neg, b * pos));
        }
        Gate::Cnot(c, t) => apply_controlled_x(state, *t, |idx| idx & (1 << *c) != 0),
        Gate::Cz(c, t) => {
            let mask = (1 << *c) | (1 << *t);
            for (idx, amp) in state.iter_mut().enumerate() {
                if idx & mask == mask {
                    *amp = -*amp;
                }
            }
        }
        Gate::Swap(a, b) => {
            let (ma, mb) = (1 << *a, 1 << *b);
            for idx in 0..state.len() {
                if idx & ma != 0 && idx & mb == 0 {
                    state.swap(idx, idx ^ ma ^ mb);
                }
            }
        }
        Gate::Cry(c, t, angle) => apply_ry(state, *t, *angle, |idx| idx & (1 << *c) != 0),
        Gate::Ccx(c1, c2, t) => {
            let mask = (1 << *c1) | (1 << *c2);
            apply_controlled_x(state, *t, |idx| idx & mask == mask);
        }
        Gate::McRy(controls, t, angle) => apply_ry(state, *t, *angle, |idx| controls.matches(idx)),
        Gate::McX(controls, t) => apply_controlled_x(state, *t, |idx| controls.matches(idx)),
        Gate::Measure(_, _)
        | Gate::Reset(_)
        | Gate::CondX(_, _)
        | Gate::Barrier(_)
        | Gate::RepeatUntil(_) => {}
    }
}

fn apply_single<F>(state: &mut [Complex64], q: QubitId, f: F)
where
    F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
{
    let mask = 1 << q;
    for idx in 0..state.len() {
        if idx & mask == 0 {
            let j = idx | mask;
            let (a, b) = f(state[idx], state[j]);
            state[idx] = a;
            state[j] = b;
        }
    }
}

fn apply_x(state: &mut [Complex64], q: QubitId) {
    apply_controlled_x(state, q, |_| true);
}

fn apply_controlled_x<P>(state: &mut [Complex64], target: QubitId, fires: P)
where
    P: Fn(usize) -> bool,
{
    let mask = 1 << target;
    for idx in 0..state.len() {
        if idx & mask == 0 && fires(idx) {
            state.swap(idx, idx | mask);
        }
    }
}

fn apply_ry<P>(state: &mut [Complex64], target: QubitId, angle: f64, fires: P)
where
    P: Fn(usize) -> bool,
{
    let (c, s) = ((angle / 2.0).cos(), (angle / 2.0).sin());
    let mask = 1 << target;
    for idx in 0..state.len() {
        if idx & mask == 0 && fires(idx) {
            let j = idx | mask;
            let (a, b) = (state[idx], state[j]);
            state[idx] = a * c - b * s;
            state[j] = a * s + b * c;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mstc_core::{CircuitBuilder, Controls, RusLoop};
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_simulator_bell() {
        let backend = SimulatorBackend::ideal(3).with_seed(42);
        let circuit = CircuitBuilder::new(2, 2)
            .h(0)
            .cnot(0, 1)
            .measure_range(&[0, 1], 0)
            .build();

        let result = backend.execute(&circuit, 1000).unwrap();
        let p00 = result.probability("00");
        let p11 = result.probability("11");

        assert!(p00 > 0.4 && p00 < 0.6, "P(00) = {}", p00);
        assert!(p11 > 0.4 && p11 < 0.6, "P(11) = {}", p11);
        assert_eq!(result.total_counts(), 1000);
    }

    #[test]
    fn test_no_clbits_reads_all_qubits() {
        let backend = SimulatorBackend::ideal(3).with_seed(1);
        let circuit = CircuitBuilder::new(3, 0).x(0).x(2).build();
        let result = backend.execute(&circuit, 10).unwrap();
        assert_eq!(result.counts["101"], 10);
    }

    #[test]
    fn test_rz_gate() {
        let backend = SimulatorBackend::ideal(1).with_seed(42);
        let circuit = CircuitBuilder::new(1, 1).h(0).rz(0, PI).h(0).measure(0, 0).build();
        let result = backend.execute(&circuit, 1000).unwrap();
        assert_eq!(result.probability("1"), 1.0);
    }

    #[test]
    fn test_statevector_ry() {
        let backend = SimulatorBackend::ideal(2);
        let circuit = CircuitBuilder::new(1, 0).ry(0, 2.0 * (0.25f64).sqrt().acos()).build();
        let probs = backend.probabilities(&circuit).unwrap();
        assert_relative_eq!(probs[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_mcry_pattern() {
        let backend = SimulatorBackend::ideal(2);
        // q1 = 1, then rotate q0 only when q1 is 0 (never fires)
        let circuit = CircuitBuilder::new(2, 0)
            .x(1)
            .mcry(Controls::new(vec![1], 0), 0, PI)
            .mcx(Controls::new(vec![1], 1), 0)
            .build();
        let probs = backend.probabilities(&circuit).unwrap();
        assert_relative_eq!(probs[0b11], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mid_circuit_measure_and_cond_x() {
        let backend = SimulatorBackend::ideal(2).with_seed(7);
        // Copy a random bit classically onto q1
        let circuit = CircuitBuilder::new(2, 2)
            .h(0)
            .measure(0, 0)
            .cond_x(vec![0], 1, 1)
            .measure(1, 1)
            .build();
        assert_eq!(circuit.unitary_prefix_len(), None);

        let result = backend.execute(&circuit, 500).unwrap();
        let agree = result.probability("00") + result.probability("11");
        assert_relative_eq!(agree, 1.0, epsilon = 1e-12);
        assert!(result.probability("11") > 0.4);
    }

    #[test]
    fn test_reset() {
        let backend = SimulatorBackend::ideal(1).with_seed(3);
        let circuit = CircuitBuilder::new(1, 1).h(0).reset(0).measure(0, 0).build();
        let result = backend.execute(&circuit, 200).unwrap();
        assert_eq!(result.counts["0"], 200);
    }

    #[test]
    fn test_repeat_until_conditions_outcome() {
        let backend = SimulatorBackend::ideal(2).with_seed(11);
        // Uniform q0; flag q1 fires with certainty only when q0 = 1
        let rus = RusLoop {
            body: vec![
                Gate::Ry(0, FRAC_PI_2),
                Gate::McRy(Controls::new(vec![0], 1), 1, PI),
            ],
            flag: 1,
            flag_clbit: 0,
            accept: true,
            reset: vec![0, 1],
            max_attempts: None,
        };
        let circuit = CircuitBuilder::new(2, 2)
            .repeat_until(rus)
            .measure(0, 1)
            .build();

        let result = backend.execute(&circuit, 400).unwrap();
        assert_eq!(result.counts["11"], 400);
        assert_eq!(result.metadata.rus_loops, 400);
        let mean = result.metadata.mean_rus_attempts().unwrap();
        assert!(mean > 1.7 && mean < 2.3, "mean attempts = {}", mean);
    }

    #[test]
    fn test_repeat_until_budget_exceeded() {
        let backend = SimulatorBackend::ideal(2).with_seed(5);
        // Flag can never be 1
        let rus = RusLoop {
            body: vec![Gate::Ry(0, FRAC_PI_2)],
            flag: 1,
            flag_clbit: 0,
            accept: true,
            reset: vec![0, 1],
            max_attempts: Some(3),
        };
        let circuit = CircuitBuilder::new(2, 1).repeat_until(rus).build();
        assert_eq!(
            backend.execute(&circuit, 1).unwrap_err(),
            MstcError::RetryBudgetExceeded { attempts: 3 }
        );
    }

    #[test]
    fn test_qubit_limit() {
        let backend = SimulatorBackend::ideal(3);
        let circuit = CircuitBuilder::new(5, 0).build();
        assert!(backend.execute(&circuit, 100).is_err());
    }

    #[test]
    fn test_seed_reproducibility() {
        let backend = SimulatorBackend::ideal(3).with_seed(42);
        let circuit = CircuitBuilder::new(2, 2)
            .h(0)
            .measure(0, 0)
            .cond_x(vec![0], 1, 1)
            .measure(1, 1)
            .build();

        let first = backend.execute(&circuit, 100).unwrap();
        let second = backend.execute(&circuit, 100).unwrap();
        assert_eq!(first.counts, second.counts);

        let a = backend.execute_seeded(&circuit, 100, 9).unwrap();
        let b = backend.execute_seeded(&circuit, 100, 9).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.metadata.seed, Some(9));
    }
}
