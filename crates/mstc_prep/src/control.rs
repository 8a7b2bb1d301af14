//! Control-state preparation
//!
//! Gantree: L3_Prep → ControlStatePreparer
//!
//! Turns a rotation tree into a circuit over the control register: the root
//! is an unconditioned Ry on the most significant qubit, every deeper
//! reachable node an Ry conditioned on the exact basis pattern of the more
//! significant qubits. A gate vocabulary restricts which vectors the
//! preparer may realize directly.

use crate::codec::{ProbabilityVectorCodec, RotationTree};
use crate::config::GateVocabulary;
use mstc_core::{
    prep, Circuit, CircuitBuilder, Controls, MstcError, MstcResult, ProbabilityVector, QubitId,
};

/// Prepared control register
/// Gantree: ControlFragment // 제어 레지스터 회로
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFragment {
    circuit: Circuit,
    target: ProbabilityVector,
}

impl ControlFragment {
    /// Circuit over the control register (qubits `0..num_qubits`)
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume into the circuit
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Control qubits used
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Distribution an ideal measurement reproduces
    pub fn target(&self) -> &ProbabilityVector {
        &self.target
    }
}

/// Builds control-register fragments
/// Gantree: ControlStatePreparer // 제어 상태 준비기
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlStatePreparer {
    vocabulary: GateVocabulary,
    tolerance: f64,
}

impl ControlStatePreparer {
    /// Preparer with the given vocabulary and the default tolerance
    pub fn new(vocabulary: GateVocabulary) -> Self {
        Self {
            vocabulary,
            tolerance: prep::REPRESENTABILITY_TOLERANCE,
        }
    }

    /// Set representability tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Configured vocabulary
    pub fn vocabulary(&self) -> GateVocabulary {
        self.vocabulary
    }

    // ========================================================================
    // Preparation
    // ========================================================================

    /// Rotation-tree fragment for any vector
    /// Gantree: prepare(vector) -> ControlFragment // 트리 회로
    pub fn prepare(&self, vector: &ProbabilityVector) -> ControlFragment {
        let tree = ProbabilityVectorCodec::new().encode_vector(vector);
        ControlFragment {
            circuit: tree_circuit(&tree),
            target: vector.clone(),
        }
    }

    /// Fragment restricted to the configured vocabulary
    /// Gantree: prepare_within(vector) -> Result<ControlFragment> // 어휘 제한
    pub fn prepare_within(&self, vector: &ProbabilityVector) -> MstcResult<ControlFragment> {
        if !self.is_representable(vector) {
            return Err(MstcError::UnrepresentableDistribution {
                vocabulary: self.vocabulary.to_string(),
            });
        }
        match self.vocabulary {
            GateVocabulary::Separable => {
                let marginals = marginals(vector);
                let qubits: Vec<QubitId> = (0..marginals.len()).collect();
                let angles: Vec<f64> = marginals
                    .iter()
                    .map(|p1| 2.0 * p1.clamp(0.0, 1.0).sqrt().asin())
                    .collect();
                let circuit = CircuitBuilder::with_name(qubits.len(), 0, "control")
                    .ry_layer(&qubits, &angles)
                    .try_build()?;
                Ok(ControlFragment {
                    circuit,
                    target: vector.clone(),
                })
            }
            GateVocabulary::Continuous | GateVocabulary::Dyadic { .. } => Ok(self.prepare(vector)),
        }
    }

    /// Check whether the vocabulary can realize `vector` exactly
    /// Gantree: is_representable(vector) -> bool // 표현 가능성
    pub fn is_representable(&self, vector: &ProbabilityVector) -> bool {
        match self.vocabulary {
            GateVocabulary::Continuous => true,
            GateVocabulary::Separable => is_product(vector, self.tolerance),
            GateVocabulary::Dyadic { precision_bits } => {
                vector.is_dyadic(precision_bits, self.tolerance)
            }
        }
    }
}

impl Default for ControlStatePreparer {
    fn default() -> Self {
        Self::new(GateVocabulary::Continuous)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Circuit applying a rotation tree top-down
fn tree_circuit(tree: &RotationTree) -> Circuit {
    let m = tree.num_qubits();
    let mut builder = CircuitBuilder::with_name(m, 0, "control");
    for depth in 0..m {
        let target = m - 1 - depth;
        // Controls listed most significant first; bit i of the pattern is
        // bit (depth-1-i) of the in-level position
        let controls: Vec<QubitId> = (0..depth).map(|i| m - 1 - i).collect();
        for (position, node) in tree.reachable_at(depth) {
            if node.angle == 0.0 {
                continue;
            }
            if depth == 0 {
                builder = builder.ry(target, node.angle);
            } else {
                let pattern = (0..depth).fold(0usize, |acc, i| {
                    acc | (((position >> (depth - 1 - i)) & 1) << i)
                });
                builder = builder.mcry(Controls::new(controls.clone(), pattern), target, node.angle);
            }
        }
    }
    builder.build()
}

/// P(qubit q = 1) for every control qubit
fn marginals(vector: &ProbabilityVector) -> Vec<f64> {
    let m = vector.num_qubits();
    (0..m)
        .map(|q| {
            vector
                .values()
                .iter()
                .enumerate()
                .filter(|(idx, _)| (idx >> q) & 1 == 1)
                .map(|(_, p)| p)
                .sum()
        })
        .collect()
}

/// Check whether the padded vector factors into its per-qubit marginals
fn is_product(vector: &ProbabilityVector, tolerance: f64) -> bool {
    let p1 = marginals(vector);
    vector.padded().iter().enumerate().all(|(idx, &p)| {
        let product: f64 = p1
            .iter()
            .enumerate()
            .map(|(q, &m1)| if (idx >> q) & 1 == 1 { m1 } else { 1.0 - m1 })
            .product();
        (product - p).abs() <= tolerance
    })
}

// ============================================================================
// Tests
// ============================================================================
