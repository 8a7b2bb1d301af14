//! # MSTC Oracle
//!
//! Empirical distribution estimation, program specifications, and the
//! rank-based output-probability oracle.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mstc_oracle // L4: Oracle (완료)
//!     DistributionEstimator // 카운트 → 경험 분포 (완료)
//!     MannWhitney // 순위합 검정 (완료)
//!     StatisticalTestOracle // 통합/레이블별 판정 (완료)
//!     SpecificationOracle // 기대 분포 인터페이스 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mstc_oracle::prelude::*;
//! use mstc_core::{Counts, LabelSpace, ProbabilityVector};
//! use rand::SeedableRng;
//!
//! // Program that should flip a single bit
//! let space = LabelSpace::binary(1).unwrap();
//! let spec = TableSpecification::deterministic("not", space, 2, |i| 1 - i).unwrap();
//! let mixture = ProbabilityVector::new(vec![0.25, 0.75]).unwrap();
//! let expected = expected_for_mixture(&spec, &mixture).unwrap();
//!
//! let counts: Counts = [("0".to_string(), 740), ("1".to_string(), 260)].into();
//! let observed = DistributionEstimator::new()
//!     .to_outcomes(&counts, &space.labels())
//!     .unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(5);
//! let samples = sample_outcomes(&expected, 1000, &mut rng).unwrap();
//!
//! let verdict = StatisticalTestOracle::pooled()
//!     .evaluate(SampleSet::Outcomes(observed), SampleSet::Outcomes(samples), 0.05)
//!     .unwrap();
//! println!("{}", verdict);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Counts → distributions (Gantree: L4_Oracle → DistributionEstimator)
pub mod estimator;

/// Rank-sum test (Gantree: L4_Oracle → MannWhitney)
pub mod mann_whitney;

/// Output-probability oracle (Gantree: L4_Oracle → StatisticalTestOracle)
pub mod oracle;

/// Specifications (Gantree: L4_Oracle → SpecificationOracle)
pub mod specification;

// ============================================================================
// Re-exports
// ============================================================================

pub use estimator::DistributionEstimator;
pub use mann_whitney::{MannWhitney, UTestResult};
pub use oracle::{
    AggregationPolicy, Correction, Decision, LabelTest, SampleSet, StatisticalTestOracle, Verdict,
};
pub use specification::{
    expected_for_inputs, expected_for_mixture, sample_outcomes, SpecificationOracle,
    TableSpecification,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use mstc_oracle::prelude::*;
    //! ```

    pub use crate::estimator::DistributionEstimator;
    pub use crate::mann_whitney::MannWhitney;
    pub use crate::oracle::{
        AggregationPolicy, Correction, Decision, SampleSet, StatisticalTestOracle, Verdict,
    };
    pub use crate::specification::{
        expected_for_inputs, expected_for_mixture, sample_outcomes, SpecificationOracle,
        TableSpecification,
    };
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use mstc_core::{Counts, LabelSpace, ProbabilityVector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counts_from(dist: &ProbabilityVector, shots: usize, seed: u64) -> Counts {
        let space = LabelSpace::binary(2).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = Counts::new();
        for s in sample_outcomes(dist, shots, &mut rng).unwrap() {
            *counts.entry(space.label(s)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_correct_program_passes() {
        let space = LabelSpace::binary(2).unwrap();
        let spec = TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap();
        let mixture = ProbabilityVector::uniform(4).unwrap();
        let expected = expected_for_mixture(&spec, &mixture).unwrap();

        // Observed counts drawn from the right distribution
        let counts = counts_from(&expected, 1024, 1);
        let estimator = DistributionEstimator::new();
        let observed = estimator.to_outcomes(&counts, &space.labels()).unwrap();
        let estimate = estimator.estimate(&counts, &space.labels()).unwrap();
        assert!(estimate.total_variation(&expected).unwrap() < 0.1);

        let mut rng = StdRng::seed_from_u64(2);
        let samples = sample_outcomes(&expected, 1024, &mut rng).unwrap();
        let verdict = StatisticalTestOracle::pooled()
            .evaluate(SampleSet::Outcomes(observed), SampleSet::Outcomes(samples), 0.01)
            .unwrap();
        assert!(verdict.is_pass(), "{}", verdict);
    }

    #[test]
    fn test_wrong_program_fails() {
        let space = LabelSpace::binary(2).unwrap();
        let spec = TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap();
        let input = ProbabilityVector::new(vec![0.7, 0.1, 0.1, 0.1]).unwrap();
        let expected = expected_for_mixture(&spec, &input).unwrap();

        // Mutant returns its input unchanged
        let counts = counts_from(&input, 1024, 3);
        let observed = DistributionEstimator::new()
            .to_outcomes(&counts, &space.labels())
            .unwrap();

        let mut rng = StdRng::seed_from_u64(4);
        let samples = sample_outcomes(&expected, 1024, &mut rng).unwrap();
        let verdict = StatisticalTestOracle::pooled()
            .evaluate(SampleSet::Outcomes(observed), SampleSet::Outcomes(samples), 0.05)
            .unwrap();
        assert!(verdict.is_fail(), "{}", verdict);
    }
}
