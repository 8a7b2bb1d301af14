//! Empirical distribution estimation
//!
//! Gantree: L4_Oracle → DistributionEstimator
//!
//! Converts backend counts into a probability vector over a declared label
//! order, or into one label index per shot for rank-based testing.

use mstc_core::{Counts, LabelSpace, MstcError, MstcResult, ProbabilityVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counts → empirical distribution
/// Gantree: DistributionEstimator // 분포 추정기
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEstimator {
    /// Smallest total count accepted
    pub min_shots: u64,
}

impl DistributionEstimator {
    /// Estimator accepting any non-empty result
    pub fn new() -> Self {
        Self { min_shots: 1 }
    }

    /// Require at least `min_shots` counts
    pub fn with_min_shots(mut self, min_shots: u64) -> Self {
        self.min_shots = min_shots.max(1);
        self
    }

    // ========================================================================
    // Estimation
    // ========================================================================

    /// Empirical probabilities in the order of `labels`
    /// Gantree: estimate(counts, labels) -> Result<ProbabilityVector> // 추정
    pub fn estimate<S: AsRef<str>>(
        &self,
        counts: &Counts,
        labels: &[S],
    ) -> MstcResult<ProbabilityVector> {
        let tallies = self.tally(counts, labels)?;
        let total: u64 = tallies.iter().sum();
        ProbabilityVector::new(
            tallies
                .iter()
                .map(|&n| n as f64 / total as f64)
                .collect(),
        )
    }

    /// Estimate over a label space from bitstrings of its register
    /// Gantree: estimate_space(counts, space) -> Result<ProbabilityVector> // 레이블 공간 추정
    ///
    /// Keys are read as basis states of the `space.num_qubits()` register,
    /// so radix-m labels work with plain backend bitstrings.
    pub fn estimate_space(
        &self,
        counts: &Counts,
        space: &LabelSpace,
    ) -> MstcResult<ProbabilityVector> {
        let mut tallies = vec![0u64; space.len()];
        for (key, &n) in counts.iter().filter(|(_, &n)| n > 0) {
            tallies[space_index(key, space)?] += n;
        }
        let total: u64 = tallies.iter().sum();
        self.check_total(total)?;
        ProbabilityVector::new(
            tallies
                .iter()
                .map(|&n| n as f64 / total as f64)
                .collect(),
        )
    }

    /// One label index per shot, ascending
    /// Gantree: to_outcomes(counts, labels) -> Result<Vec<usize>> // 샘플 전개
    pub fn to_outcomes<S: AsRef<str>>(
        &self,
        counts: &Counts,
        labels: &[S],
    ) -> MstcResult<Vec<usize>> {
        let tallies = self.tally(counts, labels)?;
        Ok(expand(&tallies))
    }

    /// One label index per shot over a label space
    pub fn to_outcomes_space(&self, counts: &Counts, space: &LabelSpace) -> MstcResult<Vec<usize>> {
        let mut tallies = vec![0u64; space.len()];
        for (key, &n) in counts.iter().filter(|(_, &n)| n > 0) {
            tallies[space_index(key, space)?] += n;
        }
        self.check_total(tallies.iter().sum())?;
        Ok(expand(&tallies))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn tally<S: AsRef<str>>(&self, counts: &Counts, labels: &[S]) -> MstcResult<Vec<u64>> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.as_ref(), i).is_some() {
                return Err(MstcError::InvalidLabel(format!(
                    "{} (declared twice)",
                    label.as_ref()
                )));
            }
        }

        let mut tallies = vec![0u64; labels.len()];
        for (key, &n) in counts.iter().filter(|(_, &n)| n > 0) {
            let i = index
                .get(key.as_str())
                .ok_or_else(|| MstcError::InvalidLabel(key.clone()))?;
            tallies[*i] += n;
        }
        self.check_total(tallies.iter().sum())?;
        Ok(tallies)
    }

    fn check_total(&self, total: u64) -> MstcResult<()> {
        if total == 0 || total < self.min_shots {
            return Err(MstcError::InsufficientShots);
        }
        Ok(())
    }
}

impl Default for DistributionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Label index of a bitstring over the label-space register
fn space_index(key: &str, space: &LabelSpace) -> MstcResult<usize> {
    if key.len() != space.num_qubits() {
        return Err(MstcError::InvalidLabel(key.to_string()));
    }
    usize::from_str_radix(key, 2)
        .ok()
        .and_then(|state| space.index_of_basis_state(state))
        .ok_or_else(|| MstcError::InvalidLabel(key.to_string()))
}

fn expand(tallies: &[u64]) -> Vec<usize> {
    tallies
        .iter()
        .enumerate()
        .flat_map(|(i, &n)| std::iter::repeat(i).take(n as usize))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
