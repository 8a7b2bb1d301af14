//! Probability vector codec
//!
//! Gantree: L3_Prep → ProbabilityVectorCodec
//!
//! Encodes a probability vector as a binary tree of Ry angles stored as an
//! array-backed heap: node `k` has children `2k+1` and `2k+2`, leaves are the
//! zero-padded vector entries. The node at depth `d` and in-level position
//! `p` splits on control qubit `m-1-d`, where the bits of `p` are the values
//! of the more significant qubits.

use mstc_core::{prep, MstcResult, ProbabilityVector};
use serde::{Deserialize, Serialize};

/// One internal node of the rotation tree
/// Gantree: RotationNode // 회전 노드
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationNode {
    /// Probability mass below this node
    pub mass: f64,
    /// Ry angle with cos²(θ/2) = left mass / mass
    pub angle: f64,
    /// False iff the subtree holds no mass
    pub reachable: bool,
}

/// Heap-indexed rotation tree
/// Gantree: RotationTree // 회전 트리 (arena)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationTree {
    depth: usize,
    len: usize,
    nodes: Vec<RotationNode>,
}

impl RotationTree {
    /// Tree depth (= control qubits)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Control qubits the tree addresses
    pub fn num_qubits(&self) -> usize {
        self.depth
    }

    /// Length of the encoded (unpadded) vector
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for an encoded vector
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Internal nodes in heap order
    pub fn nodes(&self) -> &[RotationNode] {
        &self.nodes
    }

    /// Node `k`, if internal
    pub fn node(&self, k: usize) -> Option<&RotationNode> {
        self.nodes.get(k)
    }

    /// Angle sequence in heap order
    /// Gantree: angles(&self) -> Vec<f64> // 각도 시퀀스
    pub fn angles(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.angle).collect()
    }

    /// Heap index of the first node at `depth`
    pub fn level_start(depth: usize) -> usize {
        (1 << depth) - 1
    }

    /// Depth of heap index `k`
    pub fn depth_of(k: usize) -> usize {
        (usize::BITS - 1 - (k + 1).leading_zeros()) as usize
    }

    /// Reachable nodes at `depth` as (in-level position, node)
    pub fn reachable_at(&self, depth: usize) -> impl Iterator<Item = (usize, &RotationNode)> {
        let start = Self::level_start(depth);
        let end = (Self::level_start(depth + 1)).min(self.nodes.len());
        self.nodes[start.min(end)..end]
            .iter()
            .enumerate()
            .filter(|(_, n)| n.reachable)
    }
}

/// Encoder/decoder between probability vectors and rotation trees
/// Gantree: ProbabilityVectorCodec // 확률 벡터 ↔ 회전 트리
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityVectorCodec {
    tolerance: f64,
}

impl ProbabilityVectorCodec {
    /// Codec with the default sum tolerance
    pub fn new() -> Self {
        Self {
            tolerance: prep::DIST_TOLERANCE,
        }
    }

    /// Codec with an explicit sum tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Validate raw entries and encode them
    /// Gantree: encode(values) -> Result<RotationTree> // 인코딩
    pub fn encode(&self, values: &[f64]) -> MstcResult<RotationTree> {
        let vector = ProbabilityVector::with_tolerance(values.to_vec(), self.tolerance)?;
        Ok(self.encode_vector(&vector))
    }

    /// Encode a validated vector
    pub fn encode_vector(&self, vector: &ProbabilityVector) -> RotationTree {
        let depth = vector.num_qubits();
        let leaves = vector.padded();
        let width = leaves.len();

        // Subtree masses for every heap slot; leaves occupy [width-1, 2*width-1)
        let mut mass = vec![0.0; 2 * width - 1];
        mass[width - 1..].copy_from_slice(&leaves);
        for k in (0..width - 1).rev() {
            mass[k] = mass[2 * k + 1] + mass[2 * k + 2];
        }

        let nodes = (0..width - 1)
            .map(|k| {
                let m = mass[k];
                if m <= 0.0 {
                    RotationNode {
                        mass: 0.0,
                        angle: 0.0,
                        reachable: false,
                    }
                } else {
                    let ratio = (mass[2 * k + 1] / m).clamp(0.0, 1.0);
                    RotationNode {
                        mass: m,
                        angle: (2.0 * ratio.sqrt().acos()).clamp(0.0, std::f64::consts::PI),
                        reachable: true,
                    }
                }
            })
            .collect();

        RotationTree {
            depth,
            len: vector.len(),
            nodes,
        }
    }

    /// Recompute the leaf distribution from the angles
    /// Gantree: decode(tree) -> Vec<f64> // 디코딩
    pub fn decode(&self, tree: &RotationTree) -> Vec<f64> {
        let m = tree.depth;
        (0..tree.len)
            .map(|leaf| {
                let mut k = 0;
                let mut p = 1.0;
                for d in 0..m {
                    let bit = (leaf >> (m - 1 - d)) & 1;
                    let half = tree.nodes[k].angle / 2.0;
                    p *= if bit == 0 {
                        half.cos().powi(2)
                    } else {
                        half.sin().powi(2)
                    };
                    k = 2 * k + 1 + bit;
                }
                p
            })
            .collect()
    }
}

impl Default for ProbabilityVectorCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mstc_core::MstcError;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_single_qubit_angle() {
        let tree = ProbabilityVectorCodec::new().encode(&[0.25, 0.75]).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.nodes().len(), 1);
        // cos²(θ/2) = 0.25
        assert_relative_eq!((tree.angles()[0] / 2.0).cos().powi(2), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_angles() {
        let tree = ProbabilityVectorCodec::new().encode(&[0.25; 4]).unwrap();
        for angle in tree.angles() {
            assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_mass_subtree_unreachable() {
        let tree = ProbabilityVectorCodec::new()
            .encode(&[0.5, 0.5, 0.0, 0.0])
            .unwrap();
        // Root sends everything left
        assert_relative_eq!(tree.angles()[0], 0.0, epsilon = 1e-12);
        assert!(tree.node(1).unwrap().reachable);
        let right = tree.node(2).unwrap();
        assert!(!right.reachable);
        assert_eq!(right.angle, 0.0);
        assert_eq!(tree.reachable_at(1).count(), 1);
    }

    #[test]
    fn test_point_mass_on_last_label() {
        let tree = ProbabilityVectorCodec::new().encode(&[0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(tree.angles()[0], PI, epsilon = 1e-12);
        assert!(!tree.node(1).unwrap().reachable);
        assert_relative_eq!(tree.angles()[2], PI, epsilon = 1e-12);
    }

    #[test]
    fn test_padding_non_power_of_two() {
        let codec = ProbabilityVectorCodec::new();
        let tree = codec.encode(&[0.2, 0.3, 0.5]).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.len(), 3);
        // Padded leaf 3 is empty, so node 2 only goes left
        assert_relative_eq!(tree.angles()[2], 0.0, epsilon = 1e-12);

        let decoded = codec.decode(&tree);
        assert_eq!(decoded.len(), 3);
        assert_relative_eq!(decoded[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_distribution() {
        let codec = ProbabilityVectorCodec::new();
        assert!(matches!(
            codec.encode(&[0.5, 0.6]),
            Err(MstcError::InvalidDistribution(_))
        ));
        assert!(codec.encode(&[]).is_err());
        assert!(codec.encode(&[1.5, -0.5]).is_err());
    }

    #[test]
    fn test_heap_helpers() {
        assert_eq!(RotationTree::level_start(0), 0);
        assert_eq!(RotationTree::level_start(2), 3);
        assert_eq!(RotationTree::depth_of(0), 0);
        assert_eq!(RotationTree::depth_of(2), 1);
        assert_eq!(RotationTree::depth_of(3), 2);
        assert_eq!(RotationTree::depth_of(6), 2);
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(weights in prop::collection::vec(0.0f64..1.0, 1..33)) {
            prop_assume!(weights.iter().sum::<f64>() > 1e-6);
            let vector = ProbabilityVector::from_weights(&weights).unwrap();
            let codec = ProbabilityVectorCodec::new();
            let tree = codec.encode_vector(&vector);

            prop_assert_eq!(tree.nodes().len(), (1 << tree.depth()) - 1);
            for (expected, actual) in vector.values().iter().zip(codec.decode(&tree)) {
                prop_assert!((expected - actual).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_angles_in_range(weights in prop::collection::vec(0.0f64..1.0, 1..17)) {
            prop_assume!(weights.iter().sum::<f64>() > 1e-6);
            let vector = ProbabilityVector::from_weights(&weights).unwrap();
            let tree = ProbabilityVectorCodec::new().encode_vector(&vector);
            for node in tree.nodes() {
                prop_assert!(node.angle >= 0.0 && node.angle <= PI);
                if !node.reachable {
                    prop_assert_eq!(node.angle, 0.0);
                }
            }
        }
    }
}
