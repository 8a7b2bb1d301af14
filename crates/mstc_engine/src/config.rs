//! Test configuration
//!
//! Gantree: L5_Engine → TestConfig
//!
//! One configuration for preparation, execution, and the oracle.

use mstc_core::{prep, stats, MstcError, MstcResult};
use mstc_oracle::{AggregationPolicy, Correction, StatisticalTestOracle};
use mstc_prep::{DataPrepMode, GateVocabulary, PrepConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Test harness configuration
/// Gantree: TestConfig // 테스트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    // ========================================================================
    // Preparation
    // ========================================================================
    /// Route unrepresentable control distributions through RUS
    pub use_rus: bool,

    /// RUS attempt cap (`None` = unbounded)
    pub max_attempts: Option<u64>,

    /// Control-state gate vocabulary
    pub vocabulary: GateVocabulary,

    /// Data-preparation mode
    pub data_prep: DataPrepMode,

    // ========================================================================
    // Execution
    // ========================================================================
    /// Shots per trial
    /// Gantree: shots_per_trial: u64 // 시행당 샷
    pub shots_per_trial: u64,

    /// Independent trials per test case
    /// Gantree: num_trials: usize // 시행 수
    pub num_trials: usize,

    /// Master seed (`None` = fresh entropy per run)
    pub seed: Option<u64>,

    // ========================================================================
    // Oracle
    // ========================================================================
    /// Significance level α
    /// Gantree: alpha: f64 // 유의 수준
    pub alpha: f64,

    /// Aggregation policy
    pub aggregation: AggregationPolicy,
}

impl TestConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Settings of the reference experiments: 1024 shots, one trial, pooled U test
    pub fn reference() -> Self {
        Self {
            use_rus: false,
            max_attempts: prep::DEFAULT_MAX_ATTEMPTS,
            vocabulary: GateVocabulary::Continuous,
            data_prep: DataPrepMode::Coherent,
            shots_per_trial: stats::DEFAULT_SHOTS,
            num_trials: stats::DEFAULT_TRIALS,
            seed: None,
            alpha: stats::DEFAULT_ALPHA,
            aggregation: AggregationPolicy::Pooled,
        }
    }

    /// Separable control states with RUS fallback
    pub fn separable_with_rus() -> Self {
        Self {
            use_rus: true,
            vocabulary: GateVocabulary::Separable,
            ..Self::reference()
        }
    }

    /// Several short trials compared label by label
    pub fn per_label(num_trials: usize, correction: Correction) -> Self {
        Self {
            num_trials,
            shots_per_trial: 256,
            aggregation: AggregationPolicy::PerLabel { correction },
            ..Self::reference()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Enable/disable RUS
    pub fn with_rus(mut self, enabled: bool) -> Self {
        self.use_rus = enabled;
        self
    }

    /// Cap RUS attempts
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set vocabulary
    pub fn with_vocabulary(mut self, vocabulary: GateVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set data-preparation mode
    pub fn with_data_prep(mut self, mode: DataPrepMode) -> Self {
        self.data_prep = mode;
        self
    }

    /// Set shots per trial
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots_per_trial = shots;
        self
    }

    /// Set trial count
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.num_trials = trials;
        self
    }

    /// Set master seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set significance level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set aggregation policy
    pub fn with_aggregation(mut self, aggregation: AggregationPolicy) -> Self {
        self.aggregation = aggregation;
        self
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Preparation settings
    pub fn prep_config(&self) -> PrepConfig {
        PrepConfig {
            use_rus: self.use_rus,
            max_attempts: self.max_attempts,
            vocabulary: self.vocabulary,
            data_prep: self.data_prep,
            tolerance: prep::REPRESENTABILITY_TOLERANCE,
        }
    }

    /// Oracle for the configured policy
    pub fn oracle(&self) -> StatisticalTestOracle {
        StatisticalTestOracle::with_policy(self.aggregation)
    }

    /// JSON export
    pub fn to_json(&self) -> MstcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON import (validated)
    pub fn from_json(json: &str) -> MstcResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> MstcResult<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(MstcError::InvalidSignificance(self.alpha));
        }
        if self.shots_per_trial == 0 {
            return Err(MstcError::InvalidConfig(
                "shots_per_trial must be > 0".to_string(),
            ));
        }
        if self.num_trials == 0 {
            return Err(MstcError::InvalidConfig(
                "num_trials must be > 0".to_string(),
            ));
        }
        if matches!(self.aggregation, AggregationPolicy::PerLabel { .. }) && self.num_trials == 1 {
            log::warn!("per-label aggregation with a single trial tests shot indicators");
        }
        self.check_trial_power(1)?;
        self.prep_config().validate()
    }

    /// Reject trial counts too small for any result over `num_labels` labels to FAIL
    /// Gantree: check_trial_power(num_labels) -> Result // 검정력 확인
    ///
    /// A single trial tests raw shots and is always accepted.
    pub fn check_trial_power(&self, num_labels: usize) -> MstcResult<()> {
        if self.num_trials <= 1 {
            return Ok(());
        }
        let floor = self
            .oracle()
            .smallest_p_value(self.num_trials, self.num_trials, num_labels)?;
        if floor >= self.alpha {
            return Err(MstcError::InvalidConfig(format!(
                "{} trials over {} labels cannot reach p < {} (smallest p = {:.4})",
                self.num_trials, num_labels, self.alpha, floor
            )));
        }
        Ok(())
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl fmt::Display for TestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TestConfig(shots={}, trials={}, α={}, {}, {})",
            self.shots_per_trial,
            self.num_trials,
            self.alpha,
            self.aggregation,
            self.prep_config()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.shots_per_trial, 1024);
        assert_eq!(config.num_trials, 1);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.aggregation, AggregationPolicy::Pooled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_prep_config() {
        let config = TestConfig::separable_with_rus()
            .with_max_attempts(32)
            .with_data_prep(DataPrepMode::ClassicallyControlled)
            .with_seed(7);

        let prep = config.prep_config();
        assert!(prep.use_rus);
        assert_eq!(prep.vocabulary, GateVocabulary::Separable);
        assert_eq!(prep.max_attempts, Some(32));
        assert_eq!(prep.data_prep, DataPrepMode::ClassicallyControlled);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TestConfig::default().with_alpha(1.5).validate(),
            Err(MstcError::InvalidSignificance(_))
        ));
        assert!(TestConfig::default().with_shots(0).validate().is_err());
        assert!(TestConfig::default().with_trials(0).validate().is_err());
        assert!(TestConfig::default().with_max_attempts(0).validate().is_err());
    }

    #[test]
    fn test_too_few_trials_rejected() {
        let two = TestConfig::default().with_trials(2);
        assert!(matches!(two.validate(), Err(MstcError::InvalidConfig(_))));
        assert!(TestConfig::default().with_trials(3).validate().is_ok());
        // Looser α makes two trials usable
        assert!(two.with_alpha(0.25).validate().is_ok());

        // Holm over many labels needs more trials than one label does
        let per_label = TestConfig::per_label(4, Correction::Holm);
        assert!(per_label.validate().is_ok());
        assert!(per_label.check_trial_power(1).is_ok());
        assert!(per_label.check_trial_power(16).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = TestConfig::per_label(8, Correction::Bonferroni).with_seed(3);
        let json = config.to_json().unwrap();
        assert!(json.contains("Bonferroni"));
        assert_eq!(TestConfig::from_json(&json).unwrap(), config);

        let bad = TestConfig::default().with_alpha(0.0);
        let json = serde_json::to_string(&bad).unwrap();
        assert!(TestConfig::from_json(&json).is_err());
    }
}
