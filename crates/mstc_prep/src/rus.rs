//! Repeat-until-success block
//!
//! Gantree: L3_Prep → RUSBlock
//!
//! Realizes a control distribution `v` by rejection. Each attempt prepares
//! the uniform proposal over the `m` control qubits, then rotates a flag
//! qubit conditioned on every label `c` so that `P(flag = 1 | c) = v_c /
//! max(v)`. Post-selecting on flag = 1 leaves the control register
//! distributed exactly as `v`; the per-attempt success probability is
//! `1 / (N · max(v))` with `N = 2^m`.

use mstc_core::{
    drive, Circuit, CircuitBuilder, ClbitId, Controls, Gate, MstcResult, ProbabilityVector,
    QubitId, RetryBudget, RusLoop, RusOutcome,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// One simulated execution of the block
/// Gantree: RusAttempt // 시도 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RusAttempt {
    /// 1-based attempt number
    pub attempt: u64,
    /// Flag read the accepting value
    pub success: bool,
    /// Control basis index left in the register after a success
    pub control_state: Option<usize>,
}

/// Repeat-until-success preparation of a control distribution
/// Gantree: RUSBlock // RUS 블록
#[derive(Debug, Clone, PartialEq)]
pub struct RUSBlock {
    target: ProbabilityVector,
    num_control: usize,
    max_entry: f64,
}

impl RUSBlock {
    /// Build the block for a target vector
    /// Gantree: build(vector) -> RUSBlock // 생성
    pub fn build(target: &ProbabilityVector) -> Self {
        Self {
            num_control: target.num_qubits(),
            max_entry: target.max(),
            target: target.clone(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Target distribution
    pub fn target(&self) -> &ProbabilityVector {
        &self.target
    }

    /// Control qubits (`0..num_control`)
    pub fn num_control(&self) -> usize {
        self.num_control
    }

    /// Flag qubit index (directly above the control register)
    pub fn flag_qubit(&self) -> QubitId {
        self.num_control
    }

    /// Control plus flag qubits
    pub fn num_qubits(&self) -> usize {
        self.num_control + 1
    }

    /// Proposal probability of each control label
    fn proposal(&self) -> f64 {
        1.0 / (1usize << self.num_control) as f64
    }

    /// P(flag = 1 | control = c)
    pub fn acceptance(&self, c: usize) -> f64 {
        (self.target.get(c) / self.max_entry).clamp(0.0, 1.0)
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    /// Per-attempt success probability `p = 1 / (N · max v)`
    /// Gantree: success_probability() -> f64 // 성공 확률
    pub fn success_probability(&self) -> f64 {
        self.proposal() / self.max_entry
    }

    /// Mean attempts until success (`1/p`)
    pub fn expected_attempts(&self) -> f64 {
        1.0 / self.success_probability()
    }

    /// Joint distribution over control ⊗ flag (flag is the top qubit)
    /// Gantree: joint_distribution() -> ProbabilityVector // 결합 분포
    pub fn joint_distribution(&self) -> MstcResult<ProbabilityVector> {
        let n = 1usize << self.num_control;
        let q = self.proposal();
        let mut values = vec![0.0; 2 * n];
        for c in 0..n {
            let accept = self.acceptance(c);
            values[c] = q * (1.0 - accept);
            values[n + c] = q * accept;
        }
        ProbabilityVector::new(values)
    }

    /// Control distribution conditioned on success (equals the target)
    /// Gantree: conditional_distribution() -> ProbabilityVector // 조건부 분포
    pub fn conditional_distribution(&self) -> MstcResult<ProbabilityVector> {
        let joint = self.joint_distribution()?;
        let n = 1usize << self.num_control;
        let success = &joint.values()[n..];
        let p: f64 = success.iter().sum();
        ProbabilityVector::new(
            success[..self.target.len()]
                .iter()
                .map(|v| v / p)
                .collect(),
        )
    }

    // ========================================================================
    // Circuit Form
    // ========================================================================

    /// Gates of one attempt over control (`0..m`) and flag (`m`)
    /// Gantree: attempt_gates() -> Vec<Gate> // 시도 회로
    pub fn attempt_gates(&self) -> Vec<Gate> {
        let control: Vec<QubitId> = (0..self.num_control).collect();
        let mut gates: Vec<Gate> = control.iter().map(|&q| Gate::Ry(q, FRAC_PI_2)).collect();
        for c in self.target.support() {
            let angle = 2.0 * self.acceptance(c).sqrt().asin();
            gates.push(Gate::McRy(
                Controls::new(control.clone(), c),
                self.flag_qubit(),
                angle,
            ));
        }
        gates
    }

    /// Single instruction repeating the attempt until the flag reads 1
    /// Gantree: to_circuit_fragment(budget, clbit) -> RusLoop // 회로 조각
    pub fn to_circuit_fragment(&self, budget: RetryBudget, flag_clbit: ClbitId) -> RusLoop {
        RusLoop {
            body: self.attempt_gates(),
            flag: self.flag_qubit(),
            flag_clbit,
            accept: true,
            reset: (0..self.num_qubits()).collect(),
            max_attempts: budget.limit(),
        }
    }

    /// Standalone circuit: the loop plus control measurement into clbits `1..=m`
    pub fn to_circuit(&self, budget: RetryBudget) -> MstcResult<Circuit> {
        let control: Vec<QubitId> = (0..self.num_control).collect();
        CircuitBuilder::with_name(self.num_qubits(), self.num_control + 1, "rus")
            .repeat_until(self.to_circuit_fragment(budget, 0))
            .measure_range(&control, 1)
            .try_build()
    }

    // ========================================================================
    // Classical Simulation
    // ========================================================================

    /// Sample one attempt of the protocol
    /// Gantree: sample_attempt(rng) -> RusAttempt // 시도 샘플링
    pub fn sample_attempt<R: Rng + ?Sized>(&self, rng: &mut R, attempt: u64) -> RusAttempt {
        let proposed = rng.gen_range(0..1usize << self.num_control);
        let success = rng.gen::<f64>() < self.acceptance(proposed);
        RusAttempt {
            attempt,
            success,
            control_state: success.then_some(proposed),
        }
    }

    /// Run attempts until success or until the budget is spent
    /// Gantree: run(rng, budget) -> Result<RusOutcome> // 반복 실행
    pub fn run<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        budget: RetryBudget,
    ) -> MstcResult<RusOutcome<RusAttempt>> {
        drive(budget, |n| {
            let attempt = self.sample_attempt(rng, n);
            attempt.success.then_some(attempt)
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
