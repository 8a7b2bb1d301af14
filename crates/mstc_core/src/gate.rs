//! Quantum gate definitions for MSTC
//!
//! Gantree: L1_Circuit → Gate
//!
//! Gate enum covering the standard gates, basis-pattern controlled gates used
//! by the rotation tree and the data multiplexer, classically conditioned X,
//! and the repeat-until-success loop.

use crate::repeat::RusLoop;
use crate::types::{Angle, ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Control qubits plus the basis pattern they must be in
/// Gantree: Controls // 제어 패턴
///
/// Bit `i` of `state` is the required value of `qubits[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    /// Control qubits
    pub qubits: Vec<QubitId>,
    /// Required basis pattern
    pub state: usize,
}

impl Controls {
    /// Controls requiring `qubits` to be in pattern `state`
    pub fn new(qubits: Vec<QubitId>, state: usize) -> Self {
        Self { qubits, state }
    }

    /// No controls (the gate always fires)
    pub fn none() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Check whether a full basis index satisfies the pattern
    #[inline]
    pub fn matches(&self, basis_index: usize) -> bool {
        self.qubits
            .iter()
            .enumerate()
            .all(|(i, &q)| ((basis_index >> q) & 1) == ((self.state >> i) & 1))
    }

    fn qasm_modifiers(&self) -> String {
        (0..self.qubits.len())
            .map(|i| {
                if (self.state >> i) & 1 == 1 {
                    "ctrl @ "
                } else {
                    "negctrl @ "
                }
            })
            .collect()
    }
}

/// Classical condition: the listed bits must read `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// Classical bits inspected
    pub clbits: Vec<ClbitId>,
    /// Required value (bit `i` for `clbits[i]`)
    pub value: usize,
}

impl ClassicalCondition {
    /// Check the condition against a classical register
    pub fn holds(&self, register: &[bool]) -> bool {
        self.clbits.iter().enumerate().all(|(i, &c)| {
            register.get(c).copied().unwrap_or(false) == ((self.value >> i) & 1 == 1)
        })
    }
}

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================
    /// Hadamard gate
    H(QubitId),

    /// Pauli-X gate (NOT)
    X(QubitId),

    /// Pauli-Y gate
    Y(QubitId),

    /// Pauli-Z gate
    Z(QubitId),

    /// S gate (sqrt(Z))
    S(QubitId),

    /// S-dagger gate
    Sdg(QubitId),

    /// Rotation around X-axis
    Rx(QubitId, Angle),

    /// Rotation around Y-axis
    /// Gantree: Ry(QubitId, Angle) // Y 회전 (분포 분할)
    Ry(QubitId, Angle),

    /// Rotation around Z-axis
    Rz(QubitId, Angle),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-NOT (CX)
    Cnot(QubitId, QubitId),

    /// Controlled-Z
    Cz(QubitId, QubitId),

    /// SWAP gate
    Swap(QubitId, QubitId),

    /// Controlled-Ry
    Cry(QubitId, QubitId, Angle),

    // ========================================================================
    // Multi-Controlled Gates
    // ========================================================================
    /// Toffoli (CCX)
    Ccx(QubitId, QubitId, QubitId),

    /// Ry fired only when the controls hold their basis pattern
    /// Gantree: McRy(Controls, QubitId, Angle) // 패턴 제어 Ry
    McRy(Controls, QubitId, Angle),

    /// X fired only when the controls hold their basis pattern
    /// Gantree: McX(Controls, QubitId) // 패턴 제어 X
    McX(Controls, QubitId),

    // ========================================================================
    // Measurement and Classical Control
    // ========================================================================
    /// Measure a qubit into a classical bit
    Measure(QubitId, ClbitId),

    /// Reset qubit to |0⟩
    Reset(QubitId),

    /// X applied when a classical condition holds
    CondX(ClassicalCondition, QubitId),

    /// Barrier (visual/scheduling only)
    Barrier(Vec<QubitId>),

    /// Repeat a body until a flag measurement succeeds
    /// Gantree: RepeatUntil(RusLoop) // RUS 루프
    RepeatUntil(RusLoop),
}

impl Gate {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Get qubits involved in this gate
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::Measure(q, _)
            | Gate::Reset(q)
            | Gate::CondX(_, q) => vec![*q],

            Gate::Cnot(c, t) | Gate::Cz(c, t) | Gate::Swap(c, t) | Gate::Cry(c, t, _) => {
                vec![*c, *t]
            }

            Gate::Ccx(c1, c2, t) => vec![*c1, *c2, *t],

            Gate::McRy(controls, t, _) | Gate::McX(controls, t) => {
                let mut qs = controls.qubits.clone();
                qs.push(*t);
                qs
            }

            Gate::Barrier(qs) => qs.clone(),
            Gate::RepeatUntil(rus) => rus.qubits(),
        }
    }

    /// Classical bits written or read by this gate
    pub fn clbits(&self) -> Vec<ClbitId> {
        match self {
            Gate::Measure(_, c) => vec![*c],
            Gate::CondX(cond, _) => cond.clbits.clone(),
            Gate::RepeatUntil(rus) => rus.clbits(),
            _ => vec![],
        }
    }

    /// Check if gate is single-qubit unitary
    pub fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            Gate::H(_)
                | Gate::X(_)
                | Gate::Y(_)
                | Gate::Z(_)
                | Gate::S(_)
                | Gate::Sdg(_)
                | Gate::Rx(_, _)
                | Gate::Ry(_, _)
                | Gate::Rz(_, _)
        ) || matches!(self, Gate::McRy(c, _, _) | Gate::McX(c, _) if c.qubits.is_empty())
    }

    /// Check if gate is two-qubit unitary
    pub fn is_two_qubit(&self) -> bool {
        matches!(
            self,
            Gate::Cnot(_, _) | Gate::Cz(_, _) | Gate::Swap(_, _) | Gate::Cry(_, _, _)
        ) || matches!(self, Gate::McRy(c, _, _) | Gate::McX(c, _) if c.qubits.len() == 1)
    }

    /// Check if gate is controlled on two or more qubits
    pub fn is_multi_controlled(&self) -> bool {
        matches!(self, Gate::Ccx(_, _, _))
            || matches!(self, Gate::McRy(c, _, _) | Gate::McX(c, _) if c.qubits.len() >= 2)
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        matches!(
            self,
            Gate::Rx(_, _) | Gate::Ry(_, _) | Gate::Rz(_, _) | Gate::Cry(_, _, _) | Gate::McRy(_, _, _)
        )
    }

    /// Check if gate is measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(_, _))
    }

    /// Check if gate breaks unitarity (measure, reset, classical control, loops)
    /// Gantree: is_dynamic(&self) -> bool // 동적 회로 여부
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Gate::Measure(_, _) | Gate::Reset(_) | Gate::CondX(_, _) | Gate::RepeatUntil(_)
        )
    }

    /// Same gate with every qubit shifted by `offset` and clbit by `clbit_offset`
    /// Gantree: shifted(offset) -> Gate // 레지스터 이동
    pub fn shifted(&self, offset: usize, clbit_offset: usize) -> Gate {
        let s = |q: &QubitId| q + offset;
        let shift_controls = |c: &Controls| Controls::new(c.qubits.iter().map(s).collect(), c.state);
        match self {
            Gate::H(q) => Gate::H(s(q)),
            Gate::X(q) => Gate::X(s(q)),
            Gate::Y(q) => Gate::Y(s(q)),
            Gate::Z(q) => Gate::Z(s(q)),
            Gate::S(q) => Gate::S(s(q)),
            Gate::Sdg(q) => Gate::Sdg(s(q)),
            Gate::Rx(q, a) => Gate::Rx(s(q), *a),
            Gate::Ry(q, a) => Gate::Ry(s(q), *a),
            Gate::Rz(q, a) => Gate::Rz(s(q), *a),
            Gate::Cnot(c, t) => Gate::Cnot(s(c), s(t)),
            Gate::Cz(c, t) => Gate::Cz(s(c), s(t)),
            Gate::Swap(a, b) => Gate::Swap(s(a), s(b)),
            Gate::Cry(c, t, a) => Gate::Cry(s(c), s(t), *a),
            Gate::Ccx(c1, c2, t) => Gate::Ccx(s(c1), s(c2), s(t)),
            Gate::McRy(c, t, a) => Gate::McRy(shift_controls(c), s(t), *a),
            Gate::McX(c, t) => Gate::McX(shift_controls(c), s(t)),
            Gate::Measure(q, c) => Gate::Measure(s(q), c + clbit_offset),
            Gate::Reset(q) => Gate::Reset(s(q)),
            Gate::CondX(cond, q) => Gate::CondX(
                ClassicalCondition {
                    clbits: cond.clbits.iter().map(|c| c + clbit_offset).collect(),
                    value: cond.value,
                },
                s(q),
            ),
            Gate::Barrier(qs) => Gate::Barrier(qs.iter().map(s).collect()),
            Gate::RepeatUntil(rus) => Gate::RepeatUntil(rus.shifted(offset, clbit_offset)),
        }
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::Rx(_, _) => "rx",
            Gate::Ry(_, _) => "ry",
            Gate::Rz(_, _) => "rz",
            Gate::Cnot(_, _) => "cx",
            Gate::Cz(_, _) => "cz",
            Gate::Swap(_, _) => "swap",
            Gate::Cry(_, _, _) => "cry",
            Gate::Ccx(_, _, _) => "ccx",
            Gate::McRy(_, _, _) => "mcry",
            Gate::McX(_, _) => "mcx",
            Gate::Measure(_, _) => "measure",
            Gate::Reset(_) => "reset",
            Gate::CondX(_, _) => "if_x",
            Gate::Barrier(_) => "barrier",
            Gate::RepeatUntil(_) => "repeat_until",
        }
    }

    /// Convert to OpenQASM 3 statement(s)
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self {
            Gate::H(q) => format!("h q[{}];", q),
            Gate::X(q) => format!("x q[{}];", q),
            Gate::Y(q) => format!("y q[{}];", q),
            Gate::Z(q) => format!("z q[{}];", q),
            Gate::S(q) => format!("s q[{}];", q),
            Gate::Sdg(q) => format!("sdg q[{}];", q),
            Gate::Rx(q, theta) => format!("rx({}) q[{}];", theta, q),
            Gate::Ry(q, theta) => format!("ry({}) q[{}];", theta, q),
            Gate::Rz(q, theta) => format!("rz({}) q[{}];", theta, q),

            Gate::Cnot(c, t) => format!("cx q[{}],q[{}];", c, t),
            Gate::Cz(c, t) => format!("cz q[{}],q[{}];", c, t),
            Gate::Swap(a, b) => format!("swap q[{}],q[{}];", a, b),
            Gate::Cry(c, t, theta) => format!("cry({}) q[{}],q[{}];", theta, c, t),
            Gate::Ccx(c1, c2, t) => format!("ccx q[{}],q[{}],q[{}];", c1, c2, t),

            Gate::McRy(controls, t, theta) => format!(
                "{}ry({}) {};",
                controls.qasm_modifiers(),
                theta,
                qubit_list(&controls.qubits, *t)
            ),
            Gate::McX(controls, t) => format!(
                "{}x {};",
                controls.qasm_modifiers(),
                qubit_list(&controls.qubits, *t)
            ),

            Gate::Measure(q, c) => format!("c[{}] = measure q[{}];", c, q),
            Gate::Reset(q) => format!("reset q[{}];", q),
            Gate::CondX(cond, q) => {
                let checks: Vec<String> = cond
                    .clbits
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!("c[{}] == {}", c, (cond.value >> i) & 1))
                    .collect();
                format!("if ({}) x q[{}];", checks.join(" && "), q)
            }
            Gate::Barrier(qs) => {
                if qs.is_empty() {
                    "barrier q;".to_string()
                } else {
                    let qubits: Vec<String> = qs.iter().map(|q| format!("q[{}]", q)).collect();
                    format!("barrier {};", qubits.join(","))
                }
            }
            Gate::RepeatUntil(rus) => rus.to_qasm(),
        }
    }
}

fn qubit_list(controls: &[QubitId], target: QubitId) -> String {
    controls
        .iter()
        .chain(std::iter::once(&target))
        .map(|q| format!("q[{}]", q))
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::H(0).qubits(), vec![0]);
        assert_eq!(Gate::Cnot(0, 1).qubits(), vec![0, 1]);
        assert_eq!(
            Gate::McRy(Controls::new(vec![2, 3], 0b01), 1, 0.3).qubits(),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn test_gate_classification() {
        assert!(Gate::H(0).is_single_qubit());
        assert!(Gate::Cnot(0, 1).is_two_qubit());
        assert!(Gate::McRy(Controls::none(), 0, 1.0).is_single_qubit());
        assert!(Gate::McX(Controls::new(vec![0, 1], 3), 2).is_multi_controlled());
        assert!(Gate::Ry(0, 1.0).is_parameterized());
        assert!(Gate::Measure(0, 0).is_dynamic());
        assert!(!Gate::Cnot(0, 1).is_dynamic());
    }

    #[test]
    fn test_controls_matches() {
        // q1 must be 1, q3 must be 0
        let controls = Controls::new(vec![1, 3], 0b01);
        assert!(controls.matches(0b0010));
        assert!(controls.matches(0b0011));
        assert!(!controls.matches(0b1010));
        assert!(!controls.matches(0b0000));
        assert!(Controls::none().matches(0b1111));
    }

    #[test]
    fn test_classical_condition() {
        let cond = ClassicalCondition {
            clbits: vec![0, 2],
            value: 0b10,
        };
        assert!(cond.holds(&[false, true, true]));
        assert!(!cond.holds(&[true, false, true]));
    }

    #[test]
    fn test_gate_shifted() {
        let gate = Gate::McX(Controls::new(vec![0, 1], 0b10), 2);
        assert_eq!(
            gate.shifted(3, 0),
            Gate::McX(Controls::new(vec![3, 4], 0b10), 5)
        );
        assert_eq!(Gate::Measure(1, 0).shifted(2, 4), Gate::Measure(3, 4));
    }

    #[test]
    fn test_gate_to_qasm() {
        assert_eq!(Gate::H(0).to_qasm(), "h q[0];");
        assert_eq!(Gate::Cnot(0, 1).to_qasm(), "cx q[0],q[1];");
        assert_eq!(Gate::Measure(2, 0).to_qasm(), "c[0] = measure q[2];");
        assert_eq!(
            Gate::McX(Controls::new(vec![0, 1], 0b01), 2).to_qasm(),
            "ctrl @ negctrl @ x q[0],q[1],q[2];"
        );
    }
}
