//! Mann-Whitney U test
//!
//! Gantree: L4_Oracle → MannWhitney
//!
//! Two-sided rank-sum test with average ranks for ties, tie-corrected
//! variance, and the continuity-corrected normal approximation.

use mstc_core::{stats, MstcError, MstcResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::cmp::Ordering;

/// Result of one Mann-Whitney U test
/// Gantree: UTestResult // U 검정 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UTestResult {
    /// U statistic of the first sample
    /// Gantree: statistic: f64 // U1
    pub statistic: f64,

    /// Normal approximation z (≥ 0)
    pub z_score: f64,

    /// Two-sided p-value
    /// Gantree: p_value: f64 // 유의 확률
    pub p_value: f64,

    /// First sample size
    pub n1: usize,

    /// Second sample size
    pub n2: usize,
}

/// Mann-Whitney U test
/// Gantree: MannWhitney // 순위합 검정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitney {
    /// Subtracted from |U − μ| before standardizing
    pub continuity_correction: f64,
}

impl MannWhitney {
    /// Test with the standard 0.5 continuity correction
    pub fn new() -> Self {
        Self {
            continuity_correction: stats::CONTINUITY_CORRECTION,
        }
    }

    /// Test without continuity correction
    pub fn uncorrected() -> Self {
        Self {
            continuity_correction: 0.0,
        }
    }

    /// Run the two-sided test
    /// Gantree: test(x, y) -> Result<UTestResult> // 검정
    pub fn test(&self, x: &[f64], y: &[f64]) -> MstcResult<UTestResult> {
        if x.is_empty() || y.is_empty() {
            return Err(MstcError::StatisticalTestError(format!(
                "empty sample (n1 = {}, n2 = {})",
                x.len(),
                y.len()
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(MstcError::StatisticalTestError(
                "samples must be finite".to_string(),
            ));
        }

        let n1 = x.len() as f64;
        let n2 = y.len() as f64;
        let n = n1 + n2;

        let (ranks, tie_sum) = average_ranks(x, y);
        let r1: f64 = ranks[..x.len()].iter().sum();
        let u1 = r1 - n1 * (n1 + 1.0) / 2.0;
        let mu = n1 * n2 / 2.0;
        let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_sum / (n * (n - 1.0)));

        if variance <= 0.0 {
            return Ok(UTestResult {
                statistic: mu,
                z_score: 0.0,
                p_value: 1.0,
                n1: x.len(),
                n2: y.len(),
            });
        }

        let z = ((u1 - mu).abs() - self.continuity_correction).max(0.0) / variance.sqrt();
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| MstcError::StatisticalTestError(e.to_string()))?;
        let p_value = (2.0 * (1.0 - normal.cdf(z))).min(1.0);

        Ok(UTestResult {
            statistic: u1,
            z_score: z,
            p_value,
            n1: x.len(),
            n2: y.len(),
        })
    }
}

impl Default for MannWhitney {
    fn default() -> Self {
        Self::new()
    }
}

/// Average ranks of `x ++ y` (1-based) and Σ(t³ − t) over tie groups
fn average_ranks(x: &[f64], y: &[f64]) -> (Vec<f64>, f64) {
    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&a, &b| {
        pooled[a]
            .partial_cmp(&pooled[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![0.0; pooled.len()];
    let mut tie_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && pooled[order[end]] == pooled[order[start]] {
            end += 1;
        }
        // Positions start..end share ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        let t = (end - start) as f64;
        tie_sum += t * t * t - t;
        start = end;
    }
    (ranks, tie_sum)
}

// ============================================================================
// Tests
// ============================================================================
