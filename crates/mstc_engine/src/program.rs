//! Programs under test
//!
//! Gantree: L5_Engine → ObjectProgram

use mstc_core::{Circuit, CircuitBuilder, Controls, MstcError, MstcResult, QubitId};
use serde::{Deserialize, Serialize};

/// Quantum program under test
/// Gantree: ObjectProgram // 대상 프로그램 (trait)
///
/// Input qubits are the low program qubits in order (`input_qubits()[i] ==
/// i`); the harness places the data register on them.
pub trait ObjectProgram: Send + Sync {
    /// Display name
    fn name(&self) -> &str {
        "program"
    }

    /// Qubits the program acts on
    fn num_qubits(&self) -> usize;

    /// Classical bits the program writes
    fn num_clbits(&self) -> usize {
        0
    }

    /// Qubits carrying the classical input
    fn input_qubits(&self) -> Vec<QubitId>;

    /// Qubits measured for the output, least significant first
    fn output_qubits(&self) -> Vec<QubitId>;

    /// Append the program with its qubit 0 at `offset`
    /// Gantree: append_to(circuit, offset) -> Result // 회로 추가
    fn append_to(&self, circuit: &mut Circuit, offset: usize) -> MstcResult<()>;
}

/// Program given as a fixed circuit
/// Gantree: CircuitProgram // 회로 프로그램
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitProgram {
    name: String,
    circuit: Circuit,
    inputs: usize,
    outputs: Vec<QubitId>,
}

impl CircuitProgram {
    /// Wrap a circuit whose first `inputs` qubits take the input
    pub fn new(
        name: impl Into<String>,
        circuit: Circuit,
        inputs: usize,
        outputs: Vec<QubitId>,
    ) -> MstcResult<Self> {
        let n = circuit.num_qubits();
        if inputs > n {
            return Err(MstcError::QubitOutOfRange {
                qubit: inputs - 1,
                max: n.saturating_sub(1),
            });
        }
        if let Some(&q) = outputs.iter().find(|&&q| q >= n) {
            return Err(MstcError::QubitOutOfRange {
                qubit: q,
                max: n.saturating_sub(1),
            });
        }
        Ok(Self {
            name: name.into(),
            circuit,
            inputs,
            outputs,
        })
    }

    /// `x ↦ x + 1 mod 2^n`, in place on `n` qubits
    /// Gantree: increment(n) -> CircuitProgram // 증가 연산
    pub fn increment(n: usize) -> MstcResult<Self> {
        let mut builder = CircuitBuilder::with_name(n, 0, "increment");
        for target in (1..n).rev() {
            let below: Vec<QubitId> = (0..target).collect();
            builder = builder.mcx(Controls::new(below, (1 << target) - 1), target);
        }
        if n > 0 {
            builder = builder.x(0);
        }
        let qubits: Vec<QubitId> = (0..n).collect();
        Self::new("increment", builder.try_build()?, n, qubits)
    }

    /// Underlying circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}

impl ObjectProgram for CircuitProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    fn num_clbits(&self) -> usize {
        self.circuit.num_clbits()
    }

    fn input_qubits(&self) -> Vec<QubitId> {
        (0..self.inputs).collect()
    }

    fn output_qubits(&self) -> Vec<QubitId> {
        self.outputs.clone()
    }

    fn append_to(&self, circuit: &mut Circuit, offset: usize) -> MstcResult<()> {
        circuit.append(&self.circuit, offset, 0)
    }
}

/// Reject programs whose inputs are not the low qubits in order
pub(crate) fn check_inputs<P: ObjectProgram + ?Sized>(
    program: &P,
    data_width: usize,
) -> MstcResult<()> {
    let inputs = program.input_qubits();
    if inputs.iter().enumerate().any(|(i, &q)| i != q) {
        return Err(MstcError::InvalidConfig(format!(
            "{}: input qubits must be 0..{} in order",
            program.name(),
            inputs.len()
        )));
    }
    if data_width > inputs.len() {
        return Err(MstcError::LabelSpaceMismatch {
            expected: inputs.len(),
            actual: data_width,
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
