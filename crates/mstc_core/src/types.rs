//! Core types for MSTC
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases plus the two validated value types everything else is built
//! on: `ProbabilityVector` and `LabelSpace`.

use crate::constants::prep::DIST_TOLERANCE;
use crate::error::{MstcError, MstcResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Classical bit identifier (0-indexed)
pub type ClbitId = usize;

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Measurement counts: label -> count
/// Gantree: Counts // pub type Counts = HashMap<String, u64>
pub type Counts = HashMap<String, u64>;

/// Number of qubits needed to index `len` basis states (at least one)
pub fn qubits_for(len: usize) -> usize {
    let mut qubits = 0;
    while (1usize << qubits) < len {
        qubits += 1;
    }
    qubits.max(1)
}

// ============================================================================
// ProbabilityVector
// ============================================================================

/// Discrete probability distribution over basis-state labels
/// Gantree: ProbabilityVector // 검증된 확률 벡터
///
/// Entries are finite, non-negative, and sum to 1 within tolerance. The
/// vector is never renormalized behind the caller's back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector {
    values: Vec<f64>,
}

impl ProbabilityVector {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with validation against the default tolerance
    /// Gantree: new(Vec<f64>) -> Result<Self> // 생성+검증
    pub fn new(values: Vec<f64>) -> MstcResult<Self> {
        Self::with_tolerance(values, DIST_TOLERANCE)
    }

    /// Create with validation against an explicit tolerance
    pub fn with_tolerance(values: Vec<f64>, tolerance: f64) -> MstcResult<Self> {
        if values.is_empty() {
            return Err(MstcError::InvalidDistribution("vector is empty".into()));
        }
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(MstcError::InvalidDistribution(format!(
                "entry {} is {}",
                i, v
            )));
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(MstcError::InvalidDistribution(format!(
                "entries sum to {}",
                sum
            )));
        }
        Ok(Self { values })
    }

    /// Uniform distribution over `len` labels
    pub fn uniform(len: usize) -> MstcResult<Self> {
        if len == 0 {
            return Err(MstcError::InvalidDistribution("vector is empty".into()));
        }
        Ok(Self {
            values: vec![1.0 / len as f64; len],
        })
    }

    /// Point mass on a single label (a pure basis state)
    pub fn point(len: usize, index: usize) -> MstcResult<Self> {
        if index >= len {
            return Err(MstcError::InvalidDistribution(format!(
                "point index {} outside {} labels",
                index, len
            )));
        }
        let mut values = vec![0.0; len];
        values[index] = 1.0;
        Ok(Self { values })
    }

    /// Normalize non-negative weights into a distribution
    pub fn from_weights(weights: &[f64]) -> MstcResult<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MstcError::InvalidDistribution(
                "weights must be finite and non-negative".into(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(MstcError::InvalidDistribution(
                "weights sum to zero".into(),
            ));
        }
        Self::new(weights.iter().map(|w| w / total).collect())
    }

    /// Convex combination `Σ w_i · v_i` of equally sized vectors
    /// Gantree: mixture(parts) -> Result<Self> // 혼합
    pub fn mixture(parts: &[(f64, &ProbabilityVector)]) -> MstcResult<Self> {
        let len = parts
            .first()
            .map(|(_, v)| v.len())
            .ok_or_else(|| MstcError::InvalidDistribution("empty mixture".into()))?;
        let mut values = vec![0.0; len];
        for (weight, vector) in parts {
            if vector.len() != len {
                return Err(MstcError::LabelSpaceMismatch {
                    expected: len,
                    actual: vector.len(),
                });
            }
            for (acc, v) in values.iter_mut().zip(vector.values()) {
                *acc += weight * v;
            }
        }
        Self::new(values)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Entries in label order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a validated vector
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Probability of label `index` (0 outside the vector)
    pub fn get(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Largest entry
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Indices with non-zero probability
    pub fn support(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &p)| p > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Qubits needed to address every label
    pub fn num_qubits(&self) -> usize {
        qubits_for(self.values.len())
    }

    /// Zero-padded entries up to the next power of two
    pub fn padded(&self) -> Vec<f64> {
        let mut values = self.values.clone();
        values.resize(1 << self.num_qubits(), 0.0);
        values
    }

    /// Mean label index `Σ c · p_c`
    pub fn mean_index(&self) -> f64 {
        self.values
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p)
            .sum()
    }

    /// Check whether every entry is a multiple of `2^-bits`
    /// Gantree: is_dyadic(bits, tol) -> bool // 이진 유리수
    pub fn is_dyadic(&self, bits: u32, tolerance: f64) -> bool {
        let scale = (1u64 << bits.min(52)) as f64;
        self.values.iter().all(|p| {
            let scaled = p * scale;
            (scaled - scaled.round()).abs() <= tolerance * scale
        })
    }

    /// Total variation distance to another vector of the same length
    pub fn total_variation(&self, other: &ProbabilityVector) -> MstcResult<f64> {
        if other.len() != self.len() {
            return Err(MstcError::LabelSpaceMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(0.5
            * self
                .values
                .iter()
                .zip(other.values())
                .map(|(a, b)| (a - b).abs())
                .sum::<f64>())
    }
}

impl fmt::Display for ProbabilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.6}", p)?;
        }
        write!(f, "]")
    }
}

impl TryFrom<Vec<f64>> for ProbabilityVector {
    type Error = MstcError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

// ============================================================================
// LabelSpace
// ============================================================================

/// Fixed-width digit labels in radix `m`
/// Gantree: LabelSpace // 레이블 공간 (m^n)
///
/// Labels print most significant digit first. Digit `i` is stored in qubits
/// `[i·w, (i+1)·w)` with `w = ⌈log2 m⌉`, so for radix 2 the label string is
/// the backend bitstring with qubit 0 rightmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSpace {
    radix: usize,
    digits: usize,
}

impl LabelSpace {
    /// Create a validated label space
    pub fn new(radix: usize, digits: usize) -> MstcResult<Self> {
        if !(2..=36).contains(&radix) || digits == 0 || digits > 63 {
            return Err(MstcError::InvalidLabelSpace { radix, digits });
        }
        if (radix as f64).powi(digits as i32) > (1u64 << 40) as f64 {
            return Err(MstcError::InvalidLabelSpace { radix, digits });
        }
        Ok(Self { radix, digits })
    }

    /// Binary labels over `digits` bits
    pub fn binary(digits: usize) -> MstcResult<Self> {
        Self::new(2, digits)
    }

    /// Radix m
    pub fn radix(&self) -> usize {
        self.radix
    }

    /// Digit count n
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Number of labels m^n
    pub fn len(&self) -> usize {
        self.radix.pow(self.digits as u32)
    }

    /// Always false for a validated space
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Qubits used per digit
    pub fn qubits_per_digit(&self) -> usize {
        qubits_for(self.radix)
    }

    /// Qubits used by the whole label
    pub fn num_qubits(&self) -> usize {
        self.qubits_per_digit() * self.digits
    }

    /// Label string for an index
    /// Gantree: label(index) -> String // 인덱스→레이블
    pub fn label(&self, index: usize) -> String {
        let mut digits = vec!['0'; self.digits];
        let mut rest = index;
        for slot in digits.iter_mut().rev() {
            let d = (rest % self.radix) as u32;
            *slot = std::char::from_digit(d, self.radix as u32).unwrap_or('?');
            rest /= self.radix;
        }
        digits.into_iter().collect()
    }

    /// All labels in index order
    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    /// Index of a label string
    /// Gantree: index_of(label) -> Result<usize> // 레이블→인덱스
    pub fn index_of(&self, label: &str) -> MstcResult<usize> {
        if label.chars().count() != self.digits {
            return Err(MstcError::InvalidLabel(label.to_string()));
        }
        label.chars().try_fold(0usize, |acc, c| {
            c.to_digit(self.radix as u32)
                .map(|d| acc * self.radix + d as usize)
                .ok_or_else(|| MstcError::InvalidLabel(label.to_string()))
        })
    }

    /// Computational basis index (over `num_qubits()` qubits) encoding a label index
    pub fn basis_state(&self, index: usize) -> usize {
        let width = self.qubits_per_digit();
        let mut rest = index;
        let mut state = 0usize;
        for digit in 0..self.digits {
            state |= (rest % self.radix) << (digit * width);
            rest /= self.radix;
        }
        state
    }

    /// Inverse of `basis_state`; None when a digit field is out of radix
    pub fn index_of_basis_state(&self, state: usize) -> Option<usize> {
        let width = self.qubits_per_digit();
        let mask = (1usize << width) - 1;
        let mut index = 0usize;
        for digit in (0..self.digits).rev() {
            let d = (state >> (digit * width)) & mask;
            if d >= self.radix {
                return None;
            }
            index = index * self.radix + d;
        }
        Some(index)
    }
}

impl fmt::Display for LabelSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelSpace(radix={}, digits={})", self.radix, self.digits)
    }
}

// ============================================================================
// Tests
// ============================================================================
