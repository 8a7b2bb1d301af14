//! Quantum circuit structure for MSTC
//!
//! Gantree: L1_Circuit → Circuit
//!
//! Dynamic circuits: a qubit register, a classical register, and a gate
//! sequence that may contain mid-circuit measurement, reset, classical
//! conditions, and repeat-until-success loops.

use crate::error::{MstcError, MstcResult};
use crate::gate::Gate;
use crate::types::{ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Number of classical bits
    /// Gantree: num_clbits: usize // 고전 비트 수
    num_clbits: usize,

    /// Gate sequence
    /// Gantree: gates: Vec<Gate> // 게이트 목록
    gates: Vec<Gate>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n, k) -> Self // 생성자
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits,
            gates: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, num_clbits: usize, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(num_qubits, num_clbits)
        }
    }

    /// Create from a vector of gates
    pub fn from_gates(num_qubits: usize, num_clbits: usize, gates: Vec<Gate>) -> MstcResult<Self> {
        let mut circuit = Self::new(num_qubits, num_clbits);
        circuit.add_gates(gates)?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> MstcResult<()> {
        self.check_gate(&gate)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> MstcResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Append another circuit, relocating its qubits and clbits
    /// Gantree: append(&mut, other, offset, clbit_offset) -> Result // 회로 합성
    pub fn append(&mut self, other: &Circuit, offset: usize, clbit_offset: usize) -> MstcResult<()> {
        if other.num_qubits + offset > self.num_qubits {
            return Err(MstcError::QubitOutOfRange {
                qubit: other.num_qubits + offset - 1,
                max: self.num_qubits.saturating_sub(1),
            });
        }
        for gate in &other.gates {
            self.add_gate(gate.shifted(offset, clbit_offset))?;
        }
        Ok(())
    }

    /// Grow the qubit register
    pub fn add_qubits(&mut self, count: usize) {
        self.num_qubits += count;
    }

    /// Grow the classical register, returning the first new clbit
    pub fn add_clbits(&mut self, count: usize) -> ClbitId {
        let first = self.num_clbits;
        self.num_clbits += count;
        first
    }

    /// Clear all gates
    pub fn clear(&mut self) {
        self.gates.clear();
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get number of classical bits
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            for &q in &qubits {
                if let Some(d) = qubit_depths.get_mut(q) {
                    *d = max_depth + 1;
                }
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total gate count
    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count two-qubit gates
    pub fn count_2q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// Count gates controlled on two or more qubits
    pub fn count_multi_controlled(&self) -> usize {
        self.gates.iter().filter(|g| g.is_multi_controlled()).count()
    }

    /// Count measurement operations
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Get qubits used in the circuit
    pub fn used_qubits(&self) -> HashSet<QubitId> {
        self.gates.iter().flat_map(|g| g.qubits()).collect()
    }

    /// Check whether any gate breaks unitarity
    pub fn has_dynamic_gates(&self) -> bool {
        self.gates.iter().any(|g| g.is_dynamic())
    }

    /// Split point after which only measurements follow
    /// Gantree: unitary_prefix_len(&self) -> Option<usize> // 단일 측정 구간
    ///
    /// Returns `Some(k)` when `gates[..k]` is unitary and `gates[k..]` holds
    /// only measurements of distinct qubits (and barriers). A circuit of that
    /// shape can be simulated once and sampled per shot.
    pub fn unitary_prefix_len(&self) -> Option<usize> {
        let split = self
            .gates
            .iter()
            .rposition(|g| !matches!(g, Gate::Measure(_, _) | Gate::Barrier(_)))
            .map_or(0, |i| i + 1);
        if self.gates[..split].iter().any(|g| g.is_dynamic()) {
            return None;
        }
        let mut measured = HashSet::new();
        for gate in &self.gates[split..] {
            if let Gate::Measure(q, _) = gate {
                if !measured.insert(*q) {
                    return None;
                }
            }
        }
        Some(split)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn check_gate(&self, gate: &Gate) -> MstcResult<()> {
        for qubit in gate.qubits() {
            if qubit >= self.num_qubits {
                return Err(MstcError::GateQubitMismatch {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        for clbit in gate.clbits() {
            if clbit >= self.num_clbits {
                return Err(MstcError::ClbitOutOfRange {
                    clbit,
                    num_clbits: self.num_clbits,
                });
            }
        }
        if let Gate::RepeatUntil(rus) = gate {
            if rus.body.iter().any(|g| matches!(g, Gate::RepeatUntil(_))) {
                return Err(MstcError::InvalidGateParameter(
                    "repeat-until-success loops cannot nest".into(),
                ));
            }
            if rus.max_attempts == Some(0) {
                return Err(MstcError::InvalidGateParameter(
                    "repeat-until-success needs at least one attempt".into(),
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 3.0 string
    /// Gantree: to_qasm(&self) -> String // QASM3 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 3.0;".to_string(),
            "include \"stdgates.inc\";".to_string(),
            String::new(),
            format!("qubit[{}] q;", self.num_qubits),
        ];
        if self.num_clbits > 0 {
            lines.push(format!("bit[{}] c;", self.num_clbits));
        }
        lines.push(String::new());

        for gate in &self.gates {
            lines.push(gate.to_qasm());
        }

        lines.join("\n")
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} clbits, {} gates)",
            self.num_qubits,
            self.num_clbits,
            self.gates.len()
        )?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  1Q gates: {}", self.count_1q())?;
        writeln!(f, "  2Q gates: {}", self.count_2q())?;
        writeln!(f, "  Multi-controlled: {}", self.count_multi_controlled())?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
