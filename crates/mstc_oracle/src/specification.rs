//! Program specifications
//!
//! Gantree: L4_Oracle → SpecificationOracle
//!
//! A specification maps each classical input of a program to its expected
//! output distribution. The mixed-state expectation is the mixture of the
//! pure-input expectations weighted by the input distribution.

use mstc_core::{LabelSpace, MstcError, MstcResult, ProbabilityVector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Expected behavior of a program under test
/// Gantree: SpecificationOracle // 명세 오라클 (trait)
pub trait SpecificationOracle: Send + Sync {
    /// Output labels the distributions are indexed by
    fn output_space(&self) -> LabelSpace;

    /// Expected output distribution for a pure classical input
    /// Gantree: expected_distribution(input) -> Result<ProbabilityVector> // 기대 분포
    fn expected_distribution(&self, input: usize) -> MstcResult<ProbabilityVector>;

    /// Display name
    fn name(&self) -> &str {
        "specification"
    }
}

/// Expected output of a mixture given as (weight, input) pairs
/// Gantree: expected_for_inputs(spec, weighted) -> Result<ProbabilityVector> // 가중 기대 분포
pub fn expected_for_inputs<S, I>(spec: &S, weighted: I) -> MstcResult<ProbabilityVector>
where
    S: SpecificationOracle + ?Sized,
    I: IntoIterator<Item = (f64, usize)>,
{
    let len = spec.output_space().len();
    let mut values = vec![0.0; len];
    for (weight, input) in weighted {
        if weight <= 0.0 {
            continue;
        }
        let expected = spec.expected_distribution(input)?;
        if expected.len() != len {
            return Err(MstcError::LabelSpaceMismatch {
                expected: len,
                actual: expected.len(),
            });
        }
        for (acc, p) in values.iter_mut().zip(expected.values()) {
            *acc += weight * p;
        }
    }
    ProbabilityVector::new(values)
}

/// Expected output when input `c` is drawn with probability `mixture[c]`
/// Gantree: expected_for_mixture(spec, mixture) -> Result<ProbabilityVector> // 혼합 기대 분포
pub fn expected_for_mixture<S>(spec: &S, mixture: &ProbabilityVector) -> MstcResult<ProbabilityVector>
where
    S: SpecificationOracle + ?Sized,
{
    expected_for_inputs(spec, mixture.values().iter().copied().zip(0..))
}

/// Draw `shots` label indices from `dist`
/// Gantree: sample_outcomes(dist, shots, rng) -> Result<Vec<usize>> // 기대 표본
pub fn sample_outcomes<R: Rng + ?Sized>(
    dist: &ProbabilityVector,
    shots: usize,
    rng: &mut R,
) -> MstcResult<Vec<usize>> {
    let index = WeightedIndex::new(dist.values())
        .map_err(|e| MstcError::InvalidDistribution(e.to_string()))?;
    Ok((0..shots).map(|_| index.sample(rng)).collect())
}

// ============================================================================
// Table Specification
// ============================================================================

/// Specification stored as one expected distribution per input
/// Gantree: TableSpecification // 표 명세
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpecification {
    name: String,
    space: LabelSpace,
    rows: Vec<ProbabilityVector>,
}

impl TableSpecification {
    /// Validated table; every row must span `space`
    pub fn new(
        name: impl Into<String>,
        space: LabelSpace,
        rows: Vec<ProbabilityVector>,
    ) -> MstcResult<Self> {
        if let Some(row) = rows.iter().find(|r| r.len() != space.len()) {
            return Err(MstcError::LabelSpaceMismatch {
                expected: space.len(),
                actual: row.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            space,
            rows,
        })
    }

    /// Classical function: input `i` always yields output `f(i)`
    /// Gantree: deterministic(space, inputs, f) -> Result<TableSpecification> // 결정적 명세
    pub fn deterministic<F>(
        name: impl Into<String>,
        space: LabelSpace,
        inputs: usize,
        f: F,
    ) -> MstcResult<Self>
    where
        F: Fn(usize) -> usize,
    {
        let rows = (0..inputs)
            .map(|i| ProbabilityVector::point(space.len(), f(i)))
            .collect::<MstcResult<Vec<_>>>()?;
        Self::new(name, space, rows)
    }

    /// Number of inputs covered
    pub fn num_inputs(&self) -> usize {
        self.rows.len()
    }
}

impl SpecificationOracle for TableSpecification {
    fn output_space(&self) -> LabelSpace {
        self.space
    }

    fn expected_distribution(&self, input: usize) -> MstcResult<ProbabilityVector> {
        self.rows
            .get(input)
            .cloned()
            .ok_or_else(|| MstcError::InvalidLabel(format!("input {}", input)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn increment() -> TableSpecification {
        let space = LabelSpace::binary(2).unwrap();
        TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap()
    }

    #[test]
    fn test_deterministic_rows() {
        let spec = increment();
        assert_eq!(spec.num_inputs(), 4);
        assert_eq!(spec.name(), "inc");
        let row = spec.expected_distribution(3).unwrap();
        assert_relative_eq!(row.get(0), 1.0);
        assert!(spec.expected_distribution(4).is_err());
    }

    #[test]
    fn test_expected_for_mixture() {
        let spec = increment();
        let mixture = ProbabilityVector::new(vec![0.5, 0.0, 0.25, 0.25]).unwrap();
        let expected = expected_for_mixture(&spec, &mixture).unwrap();
        assert_relative_eq!(expected.get(1), 0.5);
        assert_relative_eq!(expected.get(2), 0.0);
        assert_relative_eq!(expected.get(3), 0.25);
        assert_relative_eq!(expected.get(0), 0.25);
    }

    #[test]
    fn test_expected_for_inputs_skips_zero_weight() {
        // Input 9 is outside the table but carries no weight
        let spec = increment();
        let expected = expected_for_inputs(&spec, vec![(1.0, 0), (0.0, 9)]).unwrap();
        assert_relative_eq!(expected.get(1), 1.0);
    }

    #[test]
    fn test_table_validation() {
        let space = LabelSpace::binary(1).unwrap();
        let bad = ProbabilityVector::uniform(3).unwrap();
        assert!(TableSpecification::new("bad", space, vec![bad]).is_err());
    }

    #[test]
    fn test_sample_outcomes() {
        let mut rng = StdRng::seed_from_u64(9);
        let dist = ProbabilityVector::new(vec![0.2, 0.0, 0.8]).unwrap();
        let samples = sample_outcomes(&dist, 5000, &mut rng).unwrap();
        assert_eq!(samples.len(), 5000);
        assert!(samples.iter().all(|&s| s != 1));
        let twos = samples.iter().filter(|&&s| s == 2).count() as f64 / 5000.0;
        assert!((twos - 0.8).abs() < 0.03);
    }

    #[test]
    fn test_trait_object() {
        let spec: Box<dyn SpecificationOracle> = Box::new(increment());
        let uniform = ProbabilityVector::uniform(4).unwrap();
        let expected = expected_for_mixture(spec.as_ref(), &uniform).unwrap();
        for p in expected.values() {
            assert_relative_eq!(*p, 0.25);
        }
    }
}
