//! Mixed-state preparation
//!
//! Gantree: L3_Prep → MixedStatePreparer
//!
//! Builds the composite test-case circuit: a control register holding the
//! target distribution (directly or through repeat-until-success), and a
//! data register that copies the basis state selected by each control
//! label. Tracing out the control register leaves the data register in
//! `Σ_c v_c |d(c)⟩⟨d(c)|`.
//!
//! Qubit layout: `[control | flag (RUS only) | data | program ancillas]`.
//! Classical layout: `[flag | scratch | program | outputs]`, each block
//! present only when used.

use crate::config::{DataPrepMode, PrepConfig};
use crate::control::{ControlFragment, ControlStatePreparer};
use crate::rus::RUSBlock;
use mstc_core::{
    prep, qubits_for, Circuit, ClassicalCondition, ClbitId, Controls, Gate, LabelSpace,
    MstcError, MstcResult, ProbabilityVector, QubitId,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// MixedState
// ============================================================================

/// Distribution over control labels plus the data state each label selects
/// Gantree: MixedState // 혼합 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedState {
    distribution: ProbabilityVector,
    data_width: usize,
    data_states: Vec<usize>,
}

impl MixedState {
    /// Explicit label → data basis state mapping
    /// Gantree: new(dist, width, states) -> Result<MixedState> // 생성
    pub fn new(
        distribution: ProbabilityVector,
        data_width: usize,
        data_states: Vec<usize>,
    ) -> MstcResult<Self> {
        if data_states.len() != distribution.len() {
            return Err(MstcError::LabelSpaceMismatch {
                expected: distribution.len(),
                actual: data_states.len(),
            });
        }
        if data_width == 0 {
            return Err(MstcError::InvalidConfig(
                "data register needs at least one qubit".to_string(),
            ));
        }
        let limit = 1usize.checked_shl(data_width as u32).unwrap_or(usize::MAX);
        if let Some(&state) = data_states.iter().find(|&&s| s >= limit) {
            return Err(MstcError::QubitOutOfRange {
                qubit: (usize::BITS - 1 - state.leading_zeros()) as usize,
                max: data_width - 1,
            });
        }
        Ok(Self {
            distribution,
            data_width,
            data_states,
        })
    }

    /// Label `c` selects data state `c` on a register as wide as the control
    pub fn identity(distribution: ProbabilityVector) -> Self {
        let data_width = distribution.num_qubits();
        let data_states = (0..distribution.len()).collect();
        Self {
            distribution,
            data_width,
            data_states,
        }
    }

    /// Labels of a radix-m space, one digit per `⌈log2 m⌉` data qubits
    /// Gantree: over_labels(dist, space) -> Result<MixedState> // 레이블 공간
    pub fn over_labels(distribution: ProbabilityVector, space: LabelSpace) -> MstcResult<Self> {
        if space.len() != distribution.len() {
            return Err(MstcError::LabelSpaceMismatch {
                expected: space.len(),
                actual: distribution.len(),
            });
        }
        let states = (0..space.len()).map(|i| space.basis_state(i)).collect();
        Self::new(distribution, space.num_qubits(), states)
    }

    /// Labels in the low data bits, `pinned` fixed in the bits above them
    /// Gantree: with_pinned(dist, width, pinned) -> Result<MixedState> // 고정 상위 비트
    pub fn with_pinned(
        distribution: ProbabilityVector,
        data_width: usize,
        pinned: usize,
    ) -> MstcResult<Self> {
        let low = qubits_for(distribution.len());
        if low > data_width {
            return Err(MstcError::QubitOutOfRange {
                qubit: low - 1,
                max: data_width.saturating_sub(1),
            });
        }
        let states = (0..distribution.len()).map(|c| c | (pinned << low)).collect();
        Self::new(distribution, data_width, states)
    }

    /// Control distribution
    pub fn distribution(&self) -> &ProbabilityVector {
        &self.distribution
    }

    /// Data register width
    pub fn data_width(&self) -> usize {
        self.data_width
    }

    /// Data state of every label
    pub fn data_states(&self) -> &[usize] {
        &self.data_states
    }

    /// Bits set in the data state of every supported label
    /// Gantree: pinned_bits() -> usize // 공통 비트
    pub fn pinned_bits(&self) -> usize {
        self.distribution
            .support()
            .into_iter()
            .map(|c| self.data_states[c])
            .fold(usize::MAX, |acc, s| acc & s)
            & self.width_mask()
    }

    /// Distribution over data basis states (length `2^data_width`)
    pub fn data_distribution(&self) -> MstcResult<ProbabilityVector> {
        let mut values = vec![0.0; 1usize << self.data_width];
        for (c, &p) in self.distribution.values().iter().enumerate() {
            values[self.data_states[c]] += p;
        }
        ProbabilityVector::new(values)
    }

    fn width_mask(&self) -> usize {
        1usize
            .checked_shl(self.data_width as u32)
            .map_or(usize::MAX, |v| v - 1)
    }

    /// Data bits left to the multiplexer once pinned bits are set
    fn residual(&self, c: usize) -> usize {
        self.data_states[c] & !self.pinned_bits()
    }
}

// ============================================================================
// Composite Circuit
// ============================================================================

/// Register assignment of a composite circuit
/// Gantree: RegisterLayout // 레지스터 배치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterLayout {
    /// Control register, least significant first
    pub control: Vec<QubitId>,
    /// RUS flag qubit
    pub flag: Option<QubitId>,
    /// Classical bit receiving the flag
    pub flag_clbit: Option<ClbitId>,
    /// Data register, least significant first
    pub data: Vec<QubitId>,
    /// Program qubits beyond the data register
    pub program: Vec<QubitId>,
    /// Classical copy of the control register (classically controlled mode)
    pub scratch_clbits: Vec<ClbitId>,
    /// Classical bits owned by appended programs
    pub program_clbits: Vec<ClbitId>,
    /// Output measurements in request order
    pub output_clbits: Vec<ClbitId>,
}

impl RegisterLayout {
    /// JSON export
    pub fn to_json(&self) -> MstcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Mixed-state circuit ready for the program under test
/// Gantree: CompositeCircuit // 합성 회로
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCircuit {
    circuit: Circuit,
    layout: RegisterLayout,
}

impl CompositeCircuit {
    /// Underlying circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume into the circuit
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Register assignment
    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Composite qubit of program qubit `q` (program inputs start on the data register)
    pub fn program_qubit(&self, q: QubitId) -> QubitId {
        self.data_offset() + q
    }

    fn data_offset(&self) -> QubitId {
        self.layout.data.first().copied().unwrap_or(0)
    }

    /// Append a program whose qubit 0 lands on data qubit 0
    /// Gantree: append_program(program) -> Result // 프로그램 결합
    ///
    /// Qubits past the data register become program ancillas; program
    /// classical bits are appended after the existing ones.
    pub fn append_program(&mut self, program: &Circuit) -> MstcResult<()> {
        let offset = self.data_offset();
        let needed = offset + program.num_qubits();
        if needed > self.circuit.num_qubits() {
            let first = self.circuit.num_qubits();
            self.circuit.add_qubits(needed - first);
            self.layout.program.extend(first..needed);
        }
        let clbit_offset = self.circuit.add_clbits(program.num_clbits());
        self.layout
            .program_clbits
            .extend(clbit_offset..clbit_offset + program.num_clbits());
        self.circuit.append(program, offset, clbit_offset)
    }

    /// Measure composite qubits into fresh output bits
    /// Gantree: measure_qubits(qubits) -> Result<Vec<ClbitId>> // 출력 측정
    ///
    /// The returned bits, passed to `ExecutionResult::marginal`, print
    /// `qubits[0]` rightmost.
    pub fn measure_qubits(&mut self, qubits: &[QubitId]) -> MstcResult<Vec<ClbitId>> {
        let first = self.circuit.add_clbits(qubits.len());
        let clbits: Vec<ClbitId> = (first..first + qubits.len()).collect();
        for (&q, &c) in qubits.iter().zip(&clbits) {
            self.circuit.add_gate(Gate::Measure(q, c))?;
        }
        self.layout.output_clbits.extend(&clbits);
        Ok(clbits)
    }

    /// Measure program qubits (program-relative indices)
    pub fn measure_program(&mut self, qubits: &[QubitId]) -> MstcResult<Vec<ClbitId>> {
        let mapped: Vec<QubitId> = qubits.iter().map(|&q| self.program_qubit(q)).collect();
        self.measure_qubits(&mapped)
    }

    /// Measure the whole data register
    pub fn measure_data(&mut self) -> MstcResult<Vec<ClbitId>> {
        let data = self.layout.data.clone();
        self.measure_qubits(&data)
    }
}

// ============================================================================
// Preparer
// ============================================================================

/// How the control register is realized
/// Gantree: ControlRoute // 제어 경로
#[derive(Debug, Clone, PartialEq)]
pub enum ControlRoute {
    /// Vocabulary realizes the vector directly
    Direct(ControlFragment),
    /// Rejection through a flag qubit
    RepeatUntilSuccess(RUSBlock),
}

impl ControlRoute {
    /// True for the RUS route
    pub fn is_rus(&self) -> bool {
        matches!(self, ControlRoute::RepeatUntilSuccess(_))
    }
}

/// Builds mixed-state test-case circuits
/// Gantree: MixedStatePreparer // 혼합 상태 준비기
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MixedStatePreparer {
    config: PrepConfig,
}

impl MixedStatePreparer {
    /// Preparer with the given configuration
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Pick the control route for a vector
    /// Gantree: route(vector) -> Result<ControlRoute> // 경로 선택
    pub fn route(&self, vector: &ProbabilityVector) -> MstcResult<ControlRoute> {
        let preparer =
            ControlStatePreparer::new(self.config.vocabulary).with_tolerance(self.config.tolerance);
        if preparer.is_representable(vector) {
            return preparer.prepare_within(vector).map(ControlRoute::Direct);
        }
        if self.config.use_rus {
            return Ok(ControlRoute::RepeatUntilSuccess(RUSBlock::build(vector)));
        }
        Err(MstcError::UnrepresentableDistribution {
            vocabulary: self.config.vocabulary.to_string(),
        })
    }

    /// Identity-mapped mixed state over `vector`
    pub fn prepare_vector(&self, vector: &ProbabilityVector) -> MstcResult<CompositeCircuit> {
        self.prepare_mixed(&MixedState::identity(vector.clone()))
    }

    /// Build the composite circuit for a mixed state
    /// Gantree: prepare_mixed(state) -> Result<CompositeCircuit> // 혼합 상태 준비
    pub fn prepare_mixed(&self, state: &MixedState) -> MstcResult<CompositeCircuit> {
        self.config.validate()?;
        let m = state.distribution().num_qubits();
        if m > prep::MAX_CONTROL_QUBITS {
            return Err(MstcError::InvalidConfig(format!(
                "{} control qubits exceed the limit of {}",
                m,
                prep::MAX_CONTROL_QUBITS
            )));
        }
        let route = self.route(state.distribution())?;

        let rus = route.is_rus();
        let data_offset = m + usize::from(rus);
        let classical = self.config.data_prep == DataPrepMode::ClassicallyControlled;
        let flag_clbits = usize::from(rus);
        let scratch_clbits = if classical { m } else { 0 };

        let layout = RegisterLayout {
            control: (0..m).collect(),
            flag: rus.then_some(m),
            flag_clbit: rus.then_some(0),
            data: (data_offset..data_offset + state.data_width()).collect(),
            program: Vec::new(),
            scratch_clbits: (flag_clbits..flag_clbits + scratch_clbits).collect(),
            program_clbits: Vec::new(),
            output_clbits: Vec::new(),
        };
        let mut circuit = Circuit::with_name(
            data_offset + state.data_width(),
            flag_clbits + scratch_clbits,
            "mstc",
        );

        match &route {
            ControlRoute::Direct(fragment) => circuit.append(fragment.circuit(), 0, 0)?,
            ControlRoute::RepeatUntilSuccess(block) => {
                log::debug!(
                    "routing control register through RUS: p = {:.4}, E[attempts] = {:.2}",
                    block.success_probability(),
                    block.expected_attempts()
                );
                circuit.add_gate(Gate::RepeatUntil(
                    block.to_circuit_fragment(self.config.retry_budget(), 0),
                ))?;
            }
        }

        prepare_data(&mut circuit, state, &layout, self.config.data_prep)?;

        log::debug!(
            "prepared mixed state over {} labels: {} qubits, {} gates, rus={}",
            state.distribution().len(),
            circuit.num_qubits(),
            circuit.gate_count(),
            rus
        );
        Ok(CompositeCircuit { circuit, layout })
    }
}

/// Copy each control label's data state onto the data register
fn prepare_data(
    circuit: &mut Circuit,
    state: &MixedState,
    layout: &RegisterLayout,
    mode: DataPrepMode,
) -> MstcResult<()> {
    let pinned = state.pinned_bits();
    for (j, &q) in layout.data.iter().enumerate() {
        if (pinned >> j) & 1 == 1 {
            circuit.add_gate(Gate::X(q))?;
        }
    }

    if mode == DataPrepMode::ClassicallyControlled {
        for (&q, &c) in layout.control.iter().zip(&layout.scratch_clbits) {
            circuit.add_gate(Gate::Measure(q, c))?;
        }
    }

    let support = state.distribution().support();
    let fan_out = support.iter().all(|&c| state.residual(c) == c);
    if fan_out {
        // Control bit i drives data bit i
        for (i, (&control, &data)) in layout.control.iter().zip(&layout.data).enumerate() {
            let gate = match mode {
                DataPrepMode::Coherent => Gate::Cnot(control, data),
                DataPrepMode::ClassicallyControlled => {
                    cond_x(vec![layout.scratch_clbits[i]], 1, data)
                }
            };
            circuit.add_gate(gate)?;
        }
        return Ok(());
    }

    for c in support {
        let residual = state.residual(c);
        for (j, &data) in layout.data.iter().enumerate() {
            if (residual >> j) & 1 == 0 {
                continue;
            }
            let gate = match mode {
                DataPrepMode::Coherent => {
                    Gate::McX(Controls::new(layout.control.clone(), c), data)
                }
                DataPrepMode::ClassicallyControlled => {
                    cond_x(layout.scratch_clbits.clone(), c, data)
                }
            };
            circuit.add_gate(gate)?;
        }
    }
    Ok(())
}

fn cond_x(clbits: Vec<ClbitId>, value: usize, target: QubitId) -> Gate {
    Gate::CondX(ClassicalCondition { clbits, value }, target)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mstc_backend::{Backend, SimulatorBackend};
    use mstc_core::CircuitBuilder;

    /// Exact distribution of the data register from the state vector
    fn data_marginal(composite: &CompositeCircuit) -> Vec<f64> {
        let circuit = composite.circuit();
        let probs = SimulatorBackend::ideal(circuit.num_qubits())
            .probabilities(circuit)
            .unwrap();
        let layout = composite.layout();
        let mut marginal = vec![0.0; 1 << layout.data.len()];
        for (idx, p) in probs.iter().enumerate() {
            let d = layout
                .data
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &q)| acc | (((idx >> q) & 1) << j));
            marginal[d] += p;
        }
        marginal
    }

    fn sampled(composite: &mut CompositeCircuit, shots: u64, seed: u64) -> mstc_core::Counts {
        let clbits = composite.measure_data().unwrap();
        let circuit = composite.circuit();
        SimulatorBackend::ideal(circuit.num_qubits())
            .with_seed(seed)
            .execute(circuit, shots)
            .unwrap()
            .marginal(&clbits)
    }

    fn freq(counts: &mstc_core::Counts, label: &str, shots: u64) -> f64 {
        counts.get(label).copied().unwrap_or(0) as f64 / shots as f64
    }

    #[test]
    fn test_identity_uses_fan_out() {
        let v = ProbabilityVector::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let composite = MixedStatePreparer::default().prepare_vector(&v).unwrap();

        let layout = composite.layout();
        assert_eq!(layout.control, vec![0, 1]);
        assert_eq!(layout.flag, None);
        assert_eq!(layout.data, vec![2, 3]);

        let cnots = composite
            .circuit()
            .gates()
            .iter()
            .filter(|g| matches!(g, Gate::Cnot(..)))
            .count();
        assert_eq!(cnots, 2);
        assert!(!composite
            .circuit()
            .gates()
            .iter()
            .any(|g| matches!(g, Gate::McX(..))));

        for (a, b) in v.values().iter().zip(data_marginal(&composite)) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_general_mapping_uses_multiplexer() {
        let v = ProbabilityVector::new(vec![0.25, 0.75]).unwrap();
        let state = MixedState::new(v, 2, vec![0b11, 0b01]).unwrap();
        assert_eq!(state.pinned_bits(), 0b01);

        let composite = MixedStatePreparer::default().prepare_mixed(&state).unwrap();
        let multiplexed = composite
            .circuit()
            .gates()
            .iter()
            .filter(|g| matches!(g, Gate::McX(..)))
            .count();
        assert_eq!(multiplexed, 1);

        let marginal = data_marginal(&composite);
        assert_relative_eq!(marginal[0b11], 0.25, epsilon = 1e-12);
        assert_relative_eq!(marginal[0b01], 0.75, epsilon = 1e-12);
        assert_relative_eq!(marginal[0b00] + marginal[0b10], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pinned_high_bits() {
        let v = ProbabilityVector::new(vec![0.5, 0.5]).unwrap();
        let state = MixedState::with_pinned(v, 3, 0b10).unwrap();
        assert_eq!(state.data_states(), &[0b100, 0b101]);
        assert_eq!(state.pinned_bits(), 0b100);

        let composite = MixedStatePreparer::default().prepare_mixed(&state).unwrap();
        let marginal = data_marginal(&composite);
        assert_relative_eq!(marginal[0b100], 0.5, epsilon = 1e-12);
        assert_relative_eq!(marginal[0b101], 0.5, epsilon = 1e-12);

        let expected = state.data_distribution().unwrap();
        for (a, b) in expected.values().iter().zip(&marginal) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ternary_labels() {
        let space = LabelSpace::new(3, 1).unwrap();
        let v = ProbabilityVector::new(vec![0.2, 0.3, 0.5]).unwrap();
        let state = MixedState::over_labels(v, space).unwrap();
        assert_eq!(state.data_width(), 2);

        let composite = MixedStatePreparer::default().prepare_mixed(&state).unwrap();
        let marginal = data_marginal(&composite);
        assert_relative_eq!(marginal[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(marginal[1], 0.3, epsilon = 1e-12);
        assert_relative_eq!(marginal[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(marginal[3], 0.0, epsilon = 1e-12);

        let wrong = LabelSpace::binary(3).unwrap();
        assert!(matches!(
            MixedState::over_labels(ProbabilityVector::uniform(3).unwrap(), wrong),
            Err(MstcError::LabelSpaceMismatch { expected: 8, actual: 3 })
        ));
    }

    #[test]
    fn test_mixed_state_validation() {
        let v = ProbabilityVector::uniform(2).unwrap();
        assert!(MixedState::new(v.clone(), 1, vec![0]).is_err());
        assert!(MixedState::new(v.clone(), 1, vec![0, 2]).is_err());
        assert!(MixedState::new(v.clone(), 0, vec![0, 0]).is_err());
        assert!(MixedState::with_pinned(ProbabilityVector::uniform(4).unwrap(), 1, 0).is_err());
    }

    #[test]
    fn test_classically_controlled() {
        let config = PrepConfig::default().with_data_prep(DataPrepMode::ClassicallyControlled);
        let v = ProbabilityVector::new(vec![0.5, 0.0, 0.25, 0.25]).unwrap();
        let preparer = MixedStatePreparer::new(config);

        let mut composite = preparer.prepare_vector(&v).unwrap();
        assert_eq!(composite.layout().scratch_clbits, vec![0, 1]);
        assert!(composite.circuit().has_dynamic_gates());

        let counts = sampled(&mut composite, 4000, 11);
        assert!((freq(&counts, "00", 4000) - 0.5).abs() < 0.04);
        assert_eq!(freq(&counts, "01", 4000), 0.0);
        assert!((freq(&counts, "10", 4000) - 0.25).abs() < 0.04);
        assert!((freq(&counts, "11", 4000) - 0.25).abs() < 0.04);
    }

    #[test]
    fn test_classically_controlled_multiplexer() {
        let config = PrepConfig::default().with_data_prep(DataPrepMode::ClassicallyControlled);
        let v = ProbabilityVector::new(vec![0.5, 0.5]).unwrap();
        let state = MixedState::new(v, 2, vec![0b10, 0b01]).unwrap();

        let mut composite = MixedStatePreparer::new(config).prepare_mixed(&state).unwrap();
        let counts = sampled(&mut composite, 2000, 5);
        assert!((freq(&counts, "10", 2000) - 0.5).abs() < 0.05);
        assert!((freq(&counts, "01", 2000) - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_rus_route() {
        let preparer = MixedStatePreparer::new(PrepConfig::separable_with_rus());
        let third = ProbabilityVector::uniform(3).unwrap();
        assert!(preparer.route(&third).unwrap().is_rus());

        // Product vectors stay on the direct path
        let product = ProbabilityVector::new(vec![0.125, 0.375, 0.125, 0.375]).unwrap();
        assert!(!preparer.route(&product).unwrap().is_rus());

        let mut composite = preparer.prepare_vector(&third).unwrap();
        let layout = composite.layout().clone();
        assert_eq!(layout.flag, Some(2));
        assert_eq!(layout.flag_clbit, Some(0));
        assert_eq!(layout.data, vec![3, 4]);

        let counts = sampled(&mut composite, 3000, 19);
        assert_eq!(freq(&counts, "11", 3000), 0.0);
        for label in ["00", "01", "10"] {
            assert!((freq(&counts, label, 3000) - 1.0 / 3.0).abs() < 0.04);
        }
    }

    #[test]
    fn test_unrepresentable_without_rus() {
        let preparer = MixedStatePreparer::new(PrepConfig::separable_with_rus().with_rus(false));
        let third = ProbabilityVector::uniform(3).unwrap();
        assert!(matches!(
            preparer.prepare_vector(&third),
            Err(MstcError::UnrepresentableDistribution { .. })
        ));
    }

    #[test]
    fn test_retry_budget_surfaces() {
        let preparer =
            MixedStatePreparer::new(PrepConfig::separable_with_rus().with_max_attempts(1));
        let skewed = ProbabilityVector::new(vec![0.97, 0.01, 0.01, 0.01]).unwrap();
        let mut composite = preparer.prepare_vector(&skewed).unwrap();
        composite.measure_data().unwrap();

        let circuit = composite.circuit();
        let result = SimulatorBackend::ideal(circuit.num_qubits())
            .with_seed(2)
            .execute(circuit, 500);
        assert!(matches!(
            result,
            Err(MstcError::RetryBudgetExceeded { attempts: 1 })
        ));
    }

    #[test]
    fn test_append_program_and_measure() {
        let v = ProbabilityVector::new(vec![0.5, 0.5]).unwrap();
        let mut composite = MixedStatePreparer::default().prepare_vector(&v).unwrap();
        assert_eq!(composite.layout().data, vec![1]);

        // Copy the input into a program ancilla, then flip it
        let program = CircuitBuilder::new(2, 0).cnot(0, 1).x(1).build();
        composite.append_program(&program).unwrap();
        assert_eq!(composite.layout().program, vec![2]);
        assert_eq!(composite.program_qubit(1), 2);

        let outputs = composite.measure_program(&[1]).unwrap();
        assert_eq!(composite.layout().output_clbits, outputs);

        let circuit = composite.circuit();
        let counts = SimulatorBackend::ideal(3)
            .with_seed(4)
            .execute(circuit, 2000)
            .unwrap()
            .marginal(&outputs);
        assert!((freq(&counts, "0", 2000) - 0.5).abs() < 0.05);
        assert!((freq(&counts, "1", 2000) - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_preparation_is_deterministic() {
        let preparer = MixedStatePreparer::new(PrepConfig::dyadic_with_rus());
        let v = ProbabilityVector::new(vec![0.2, 0.3, 0.5]).unwrap();
        let a = preparer.prepare_vector(&v).unwrap();
        let b = preparer.prepare_vector(&v).unwrap();
        assert_eq!(a, b);
        assert!(a.layout().flag.is_some());
    }

    #[test]
    fn test_layout_json() {
        let v = ProbabilityVector::uniform(2).unwrap();
        let composite = MixedStatePreparer::default().prepare_vector(&v).unwrap();
        let json = composite.layout().to_json().unwrap();
        let back: RegisterLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, composite.layout());
    }
}
