//! Statistical test oracle
//!
//! Gantree: L4_Oracle → StatisticalTestOracle
//!
//! Decides PASS/FAIL by comparing observed samples of the program under test
//! against samples of the expected output distribution with a Mann-Whitney
//! U test, either pooled over all labels or label by label with a multiple
//! comparison correction.

use crate::mann_whitney::{MannWhitney, UTestResult};
use mstc_core::{MstcError, MstcResult, ProbabilityVector};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Samples
// ============================================================================

/// Samples of an output distribution
/// Gantree: SampleSet // 표본 집합
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleSet {
    /// One label index per shot
    /// Gantree: Outcomes(Vec<usize>) // 원시 결과
    Outcomes(Vec<usize>),

    /// One empirical distribution per trial
    /// Gantree: Trials(Vec<ProbabilityVector>) // 시행별 분포
    Trials(Vec<ProbabilityVector>),
}

impl SampleSet {
    /// Number of samples (shots or trials)
    pub fn len(&self) -> usize {
        match self {
            SampleSet::Outcomes(o) => o.len(),
            SampleSet::Trials(t) => t.len(),
        }
    }

    /// Check if no samples were collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short kind name
    pub fn kind(&self) -> &'static str {
        match self {
            SampleSet::Outcomes(_) => "outcomes",
            SampleSet::Trials(_) => "trials",
        }
    }

    /// Labels spanned by the samples
    pub fn num_labels(&self) -> usize {
        match self {
            SampleSet::Outcomes(o) => o.iter().max().map_or(0, |m| m + 1),
            SampleSet::Trials(t) => t.iter().map(|v| v.len()).max().unwrap_or(0),
        }
    }

    /// Values for the pooled test: label indices, or per-trial mean label index
    /// Gantree: pooled_values() -> Vec<f64> // 통합 값
    pub fn pooled_values(&self) -> Vec<f64> {
        match self {
            SampleSet::Outcomes(o) => o.iter().map(|&c| c as f64).collect(),
            SampleSet::Trials(t) => t.iter().map(|v| v.mean_index()).collect(),
        }
    }

    /// Values for one label: shot indicators, or per-trial probabilities
    /// Gantree: label_values(label) -> Vec<f64> // 레이블별 값
    pub fn label_values(&self, label: usize) -> Vec<f64> {
        match self {
            SampleSet::Outcomes(o) => o
                .iter()
                .map(|&c| if c == label { 1.0 } else { 0.0 })
                .collect(),
            SampleSet::Trials(t) => t
                .iter()
                .map(|v| v.values().get(label).copied().unwrap_or(0.0))
                .collect(),
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Multiple-comparison correction for per-label tests
/// Gantree: Correction // 다중 비교 보정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Correction {
    /// Raw p-values
    None,
    /// p · k
    Bonferroni,
    /// Holm step-down
    #[default]
    Holm,
}

impl Correction {
    /// Adjusted p-values, in input order
    /// Gantree: adjust(p_values) -> Vec<f64> // 보정
    pub fn adjust(&self, p_values: &[f64]) -> Vec<f64> {
        let k = p_values.len() as f64;
        match self {
            Correction::None => p_values.to_vec(),
            Correction::Bonferroni => p_values.iter().map(|p| (p * k).min(1.0)).collect(),
            Correction::Holm => {
                let mut order: Vec<usize> = (0..p_values.len()).collect();
                order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));
                let mut adjusted = vec![0.0; p_values.len()];
                let mut running = 0.0f64;
                for (rank, &i) in order.iter().enumerate() {
                    let scaled = ((k - rank as f64) * p_values[i]).min(1.0);
                    running = running.max(scaled);
                    adjusted[i] = running;
                }
                adjusted
            }
        }
    }
}

/// How the samples are aggregated into test decisions
/// Gantree: AggregationPolicy // 집계 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AggregationPolicy {
    /// One test over the whole distribution
    #[default]
    Pooled,
    /// One test per label with a correction
    PerLabel {
        /// Correction across labels
        correction: Correction,
    },
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationPolicy::Pooled => write!(f, "pooled"),
            AggregationPolicy::PerLabel { correction } => {
                write!(f, "per-label({:?})", correction)
            }
        }
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Test decision
/// Gantree: Decision // 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// No significant difference
    Pass,
    /// Distributions differ at the significance level
    Fail,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Pass => write!(f, "PASS"),
            Decision::Fail => write!(f, "FAIL"),
        }
    }
}

/// Outcome of the test on one label
/// Gantree: LabelTest // 레이블 검정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelTest {
    /// Label index
    pub label: usize,
    /// U statistic of the observed samples
    pub statistic: f64,
    /// Unadjusted p-value
    pub p_value: f64,
    /// p-value after correction
    pub adjusted_p_value: f64,
    /// adjusted_p_value < α
    pub rejected: bool,
}

/// Result of one oracle evaluation
/// Gantree: Verdict // 판정 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// PASS or FAIL
    pub decision: Decision,
    /// Statistic behind the decision
    pub statistic: f64,
    /// p-value behind the decision (corrected for per-label tests)
    pub p_value: f64,
    /// Significance level
    pub alpha: f64,
    /// Policy that produced the verdict
    pub policy: AggregationPolicy,
    /// Per-label detail (empty for pooled tests)
    pub label_tests: Vec<LabelTest>,
}

impl Verdict {
    /// Check for PASS
    pub fn is_pass(&self) -> bool {
        self.decision == Decision::Pass
    }

    /// Check for FAIL
    pub fn is_fail(&self) -> bool {
        self.decision == Decision::Fail
    }

    /// Labels whose test rejected
    pub fn rejected_labels(&self) -> Vec<usize> {
        self.label_tests
            .iter()
            .filter(|t| t.rejected)
            .map(|t| t.label)
            .collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (U = {:.1}, p = {:.4}, α = {}, {})",
            self.decision, self.statistic, self.p_value, self.alpha, self.policy
        )
    }
}

// ============================================================================
// Oracle
// ============================================================================

/// Output-probability oracle
/// Gantree: StatisticalTestOracle // 통계 검정 오라클
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticalTestOracle {
    /// Aggregation policy
    pub policy: AggregationPolicy,
    /// Underlying rank test
    pub test: MannWhitney,
}

impl StatisticalTestOracle {
    /// Pooled oracle (one test over the whole distribution)
    pub fn pooled() -> Self {
        Self::default()
    }

    /// Oracle with an explicit policy
    pub fn with_policy(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            test: MannWhitney::new(),
        }
    }

    /// Smallest p-value reachable with `n1` and `n2` samples per label
    /// Gantree: smallest_p_value(n1, n2, num_labels) -> Result<f64> // 최소 p 값
    ///
    /// Reached by fully separated samples, ties inside each group included.
    /// Under per-label aggregation the correction over `num_labels` tests is
    /// applied, so a set-up whose result is `>= α` can never FAIL.
    pub fn smallest_p_value(&self, n1: usize, n2: usize, num_labels: usize) -> MstcResult<f64> {
        let extreme = self.test.test(&vec![0.0; n1], &vec![1.0; n2])?.p_value;
        match self.policy {
            AggregationPolicy::Pooled => Ok(extreme),
            AggregationPolicy::PerLabel { correction } => {
                let mut p_values = vec![1.0; num_labels.max(1)];
                p_values[0] = extreme;
                Ok(correction.adjust(&p_values)[0])
            }
        }
    }

    /// Compare observed against expected samples at level α
    /// Gantree: evaluate(observed, expected, alpha) -> Result<Verdict> // 평가
    pub fn evaluate(
        &self,
        observed: SampleSet,
        expected: SampleSet,
        alpha: f64,
    ) -> MstcResult<Verdict> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(MstcError::InvalidSignificance(alpha));
        }
        if observed.kind() != expected.kind() {
            return Err(MstcError::StatisticalTestError(format!(
                "cannot compare {} with {}",
                observed.kind(),
                expected.kind()
            )));
        }
        check_trial_lengths(&observed, &expected)?;

        let verdict = match self.policy {
            AggregationPolicy::Pooled => {
                let result = self
                    .test
                    .test(&observed.pooled_values(), &expected.pooled_values())?;
                Verdict {
                    decision: decide(result.p_value, alpha),
                    statistic: result.statistic,
                    p_value: result.p_value,
                    alpha,
                    policy: self.policy,
                    label_tests: Vec::new(),
                }
            }
            AggregationPolicy::PerLabel { correction } => {
                self.per_label(&observed, &expected, alpha, correction)?
            }
        };

        log::debug!(
            "oracle {} over {} observed / {} expected samples",
            verdict,
            observed.len(),
            expected.len()
        );
        Ok(verdict)
    }

    fn per_label(
        &self,
        observed: &SampleSet,
        expected: &SampleSet,
        alpha: f64,
        correction: Correction,
    ) -> MstcResult<Verdict> {
        let labels = observed.num_labels().max(expected.num_labels());
        let results: Vec<UTestResult> = (0..labels)
            .map(|label| {
                self.test
                    .test(&observed.label_values(label), &expected.label_values(label))
            })
            .collect::<MstcResult<_>>()?;

        let raw: Vec<f64> = results.iter().map(|r| r.p_value).collect();
        let adjusted = correction.adjust(&raw);
        let label_tests: Vec<LabelTest> = results
            .iter()
            .zip(&adjusted)
            .enumerate()
            .map(|(label, (r, &adj))| LabelTest {
                label,
                statistic: r.statistic,
                p_value: r.p_value,
                adjusted_p_value: adj,
                rejected: adj < alpha,
            })
            .collect();

        let driver = label_tests
            .iter()
            .min_by(|a, b| a.adjusted_p_value.total_cmp(&b.adjusted_p_value))
            .copied()
            .ok_or_else(|| MstcError::StatisticalTestError("no labels to test".to_string()))?;

        Ok(Verdict {
            decision: decide(driver.adjusted_p_value, alpha),
            statistic: driver.statistic,
            p_value: driver.adjusted_p_value,
            alpha,
            policy: AggregationPolicy::PerLabel { correction },
            label_tests,
        })
    }
}

fn decide(p_value: f64, alpha: f64) -> Decision {
    if p_value < alpha {
        Decision::Fail
    } else {
        Decision::Pass
    }
}

fn check_trial_lengths(observed: &SampleSet, expected: &SampleSet) -> MstcResult<()> {
    if let (SampleSet::Trials(a), SampleSet::Trials(b)) = (observed, expected) {
        let expected_len = a.first().or_else(|| b.first()).map_or(0, |v| v.len());
        if let Some(v) = a.iter().chain(b).find(|v| v.len() != expected_len) {
            return Err(MstcError::LabelSpaceMismatch {
                expected: expected_len,
                actual: v.len(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
