//! Circuit builder for MSTC
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for constructing circuits. Invalid gates are dropped and
//! the first rejection is remembered, so `try_build` can surface it.

use crate::circuit::Circuit;
use crate::error::{MstcError, MstcResult};
use crate::gate::{ClassicalCondition, Controls, Gate};
use crate::repeat::RusLoop;
use crate::types::{Angle, ClbitId, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal circuit being built
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,

    /// First gate rejected by the circuit
    error: Option<MstcError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n, k) -> Self // 생성자
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits, num_clbits),
            error: None,
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, num_clbits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, num_clbits, name),
            error: None,
        }
    }

    /// Add any gate
    /// Gantree: gate(self, Gate) -> Self // 게이트 추가
    pub fn gate(mut self, gate: Gate) -> Self {
        if let Err(err) = self.circuit.add_gate(gate) {
            self.error.get_or_insert(err);
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(self, qubit: QubitId) -> Self {
        self.gate(Gate::H(qubit))
    }

    /// Add Pauli-X gate
    /// Gantree: x(self, q) -> Self // X 추가
    pub fn x(self, qubit: QubitId) -> Self {
        self.gate(Gate::X(qubit))
    }

    /// Add Ry rotation
    /// Gantree: ry(self, q, a) -> Self // Ry 추가
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Ry(qubit, angle))
    }

    /// Add Rz rotation
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Rz(qubit, angle))
    }

    // ========================================================================
    // Controlled Gates
    // ========================================================================

    /// Add CNOT gate
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.gate(Gate::Cnot(control, target))
    }

    /// Alias for cnot
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.cnot(control, target)
    }

    /// Add controlled Ry
    pub fn cry(self, control: QubitId, target: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Cry(control, target, angle))
    }

    /// Add Toffoli (CCX) gate
    pub fn ccx(self, c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        self.gate(Gate::Ccx(c1, c2, target))
    }

    /// Add Ry conditioned on a control basis pattern
    /// Gantree: mcry(self, controls, t, a) -> Self // 패턴 제어 Ry
    pub fn mcry(self, controls: Controls, target: QubitId, angle: Angle) -> Self {
        self.gate(Gate::McRy(controls, target, angle))
    }

    /// Add X conditioned on a control basis pattern
    /// Gantree: mcx(self, controls, t) -> Self // 패턴 제어 X
    pub fn mcx(self, controls: Controls, target: QubitId) -> Self {
        self.gate(Gate::McX(controls, target))
    }

    // ========================================================================
    // Measurement and Classical Control
    // ========================================================================

    /// Measure a qubit into a classical bit
    /// Gantree: measure(self, q, c) -> Self // 측정 추가
    pub fn measure(self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.gate(Gate::Measure(qubit, clbit))
    }

    /// Measure `qubits[i]` into clbit `first_clbit + i`
    pub fn measure_range(mut self, qubits: &[QubitId], first_clbit: ClbitId) -> Self {
        for (i, &q) in qubits.iter().enumerate() {
            self = self.measure(q, first_clbit + i);
        }
        self
    }

    /// Add reset
    pub fn reset(self, qubit: QubitId) -> Self {
        self.gate(Gate::Reset(qubit))
    }

    /// Add X applied when the classical bits read `value`
    /// Gantree: cond_x(self, clbits, value, q) -> Self // 고전 제어 X
    pub fn cond_x(self, clbits: Vec<ClbitId>, value: usize, target: QubitId) -> Self {
        self.gate(Gate::CondX(ClassicalCondition { clbits, value }, target))
    }

    /// Add a repeat-until-success loop
    pub fn repeat_until(self, rus: RusLoop) -> Self {
        self.gate(Gate::RepeatUntil(rus))
    }

    /// Add barrier on all qubits
    /// Gantree: barrier(self) -> Self // 배리어
    pub fn barrier(self) -> Self {
        let qubits: Vec<QubitId> = (0..self.circuit.num_qubits()).collect();
        self.gate(Gate::Barrier(qubits))
    }

    // ========================================================================
    // Layer Operations
    // ========================================================================

    /// Add `Ry(angles[i])` on `qubits[i]`
    /// Gantree: ry_layer(self, qubits, angles) -> Self // Ry 레이어
    pub fn ry_layer(mut self, qubits: &[QubitId], angles: &[Angle]) -> Self {
        for (&q, &angle) in qubits.iter().zip(angles) {
            self = self.ry(q, angle);
        }
        self
    }

    /// Flip `qubits[i]` for every set bit `i` of `pattern`
    /// Gantree: x_pattern(self, qubits, pattern) -> Self // 기저 상태 설정
    pub fn x_pattern(mut self, qubits: &[QubitId], pattern: usize) -> Self {
        for (i, &q) in qubits.iter().enumerate() {
            if (pattern >> i) & 1 == 1 {
                self = self.x(q);
            }
        }
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the circuit
    /// Gantree: build(self) -> Circuit // 빌드
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Build, failing on the first rejected gate
    pub fn try_build(self) -> MstcResult<Circuit> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.circuit),
        }
    }

    /// Get reference to current circuit state
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let circuit = CircuitBuilder::new(3, 3)
            .h(0)
            .cnot(0, 1)
            .cnot(1, 2)
            .measure_range(&[0, 1, 2], 0)
            .build();

        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.gate_count(), 6);
        assert_eq!(circuit.count_measurements(), 3);
    }

    #[test]
    fn test_builder_layers() {
        let circuit = CircuitBuilder::new(3, 0)
            .ry_layer(&[0, 2], &[0.1, 0.2, 0.3])
            .build();
        assert_eq!(circuit.gates(), &[Gate::Ry(0, 0.1), Gate::Ry(2, 0.2)]);
    }

    #[test]
    fn test_builder_x_pattern() {
        let circuit = CircuitBuilder::new(3, 0).x_pattern(&[0, 1, 2], 0b101).build();
        assert_eq!(circuit.gates(), &[Gate::X(0), Gate::X(2)]);
    }

    #[test]
    fn test_try_build_reports_first_error() {
        let result = CircuitBuilder::new(2, 0).h(0).x(7).measure(0, 4).try_build();
        assert_eq!(
            result,
            Err(MstcError::GateQubitMismatch {
                qubit: 7,
                num_qubits: 2
            })
        );

        assert!(CircuitBuilder::new(2, 1).h(0).measure(0, 0).try_build().is_ok());
    }

    #[test]
    fn test_builder_classical_control() {
        let circuit = CircuitBuilder::new(2, 1)
            .h(0)
            .measure(0, 0)
            .cond_x(vec![0], 1, 1)
            .build();
        assert!(circuit.has_dynamic_gates());
        assert_eq!(circuit.gate_count(), 3);
    }
}
