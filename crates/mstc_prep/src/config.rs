//! Preparation configuration
//!
//! Gantree: L3_Prep → PrepConfig
//!
//! Gate vocabulary, data-preparation mode, and RUS routing for the
//! mixed-state preparer.

use mstc_core::{prep, MstcError, MstcResult, RetryBudget};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gate vocabulary available to the control-state preparer
/// Gantree: GateVocabulary // 게이트 어휘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GateVocabulary {
    /// Arbitrary angles and pattern-controlled rotations
    /// Gantree: Continuous // 연속 회전 트리
    #[default]
    Continuous,

    /// One unconditioned Ry per control qubit (product distributions only)
    /// Gantree: Separable // 분리 가능 (sep)
    Separable,

    /// Rotation tree restricted to vectors with entries k / 2^precision_bits
    /// Gantree: Dyadic{precision_bits} // 이진 유리수
    Dyadic {
        /// Bits of binary precision
        precision_bits: u32,
    },
}

impl GateVocabulary {
    /// Short name used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            GateVocabulary::Continuous => "continuous",
            GateVocabulary::Separable => "separable",
            GateVocabulary::Dyadic { .. } => "dyadic",
        }
    }
}

impl fmt::Display for GateVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateVocabulary::Dyadic { precision_bits } => write!(f, "dyadic({})", precision_bits),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// How each control label drives the data register
/// Gantree: DataPrepMode // 데이터 준비 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataPrepMode {
    /// Pattern-controlled X multiplexer; control is never measured
    /// Gantree: Coherent // 양자 제어 (qubits)
    #[default]
    Coherent,

    /// Measure control into scratch bits, then classically conditioned X
    /// Gantree: ClassicallyControlled // 고전 제어 (bits)
    ClassicallyControlled,
}

/// Mixed-state preparation configuration
/// Gantree: PrepConfig // 준비 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Route unrepresentable vectors through repeat-until-success
    /// Gantree: use_rus: bool // RUS 사용
    pub use_rus: bool,

    /// Attempt cap for RUS (`None` = unbounded)
    /// Gantree: max_attempts: Option<u64> // 재시도 상한
    pub max_attempts: Option<u64>,

    /// Control-state gate vocabulary
    pub vocabulary: GateVocabulary,

    /// Data-preparation mode
    pub data_prep: DataPrepMode,

    /// Representability tolerance
    pub tolerance: f64,
}

impl PrepConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Continuous vocabulary without RUS
    pub fn continuous() -> Self {
        Self {
            use_rus: false,
            max_attempts: prep::DEFAULT_MAX_ATTEMPTS,
            vocabulary: GateVocabulary::Continuous,
            data_prep: DataPrepMode::Coherent,
            tolerance: prep::REPRESENTABILITY_TOLERANCE,
        }
    }

    /// Separable control states, RUS for everything else
    pub fn separable_with_rus() -> Self {
        Self {
            use_rus: true,
            vocabulary: GateVocabulary::Separable,
            ..Self::continuous()
        }
    }

    /// Dyadic vocabulary at the default precision, RUS for the rest
    pub fn dyadic_with_rus() -> Self {
        Self {
            use_rus: true,
            vocabulary: GateVocabulary::Dyadic {
                precision_bits: prep::DEFAULT_DYADIC_BITS,
            },
            ..Self::continuous()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Enable/disable RUS routing
    pub fn with_rus(mut self, enabled: bool) -> Self {
        self.use_rus = enabled;
        self
    }

    /// Cap RUS attempts
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Remove the RUS attempt cap
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Set gate vocabulary
    pub fn with_vocabulary(mut self, vocabulary: GateVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set data-preparation mode
    pub fn with_data_prep(mut self, mode: DataPrepMode) -> Self {
        self.data_prep = mode;
        self
    }

    /// Set representability tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    // ========================================================================
    // Derived Values
    // ========================================================================

    /// Retry budget implied by `max_attempts`
    pub fn retry_budget(&self) -> RetryBudget {
        RetryBudget::from_max_attempts(self.max_attempts)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> MstcResult<()> {
        if self.max_attempts == Some(0) {
            return Err(MstcError::InvalidConfig(
                "max_attempts must be > 0".to_string(),
            ));
        }
        if !(self.tolerance >= 0.0 && self.tolerance < 1.0) {
            return Err(MstcError::InvalidConfig(format!(
                "tolerance must be in [0, 1), got {}",
                self.tolerance
            )));
        }
        if let GateVocabulary::Dyadic { precision_bits } = self.vocabulary {
            if precision_bits == 0 || precision_bits > 52 {
                return Err(MstcError::InvalidConfig(format!(
                    "dyadic precision must be in 1..=52 bits, got {}",
                    precision_bits
                )));
            }
        }
        Ok(())
    }
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self::continuous()
    }
}

impl fmt::Display for PrepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrepConfig(vocabulary={}, rus={}, budget={}, data={:?})",
            self.vocabulary,
            self.use_rus,
            self.retry_budget(),
            self.data_prep
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
    fn test_default() {
        let config = PrepConfig::default();
        assert!(!config.use_rus);
        assert_eq!(config.vocabulary, GateVocabulary::Continuous);
        assert_eq!(config.retry_budget(), RetryBudget::Unbounded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PrepConfig::separable_with_rus()
            .with_max_attempts(64)
            .with_data_prep(DataPrepMode::ClassicallyControlled);

        assert!(config.use_rus);
        assert_eq!(config.retry_budget(), RetryBudget::Limited(64));
        assert_eq!(config.data_prep, DataPrepMode::ClassicallyControlled);
        assert_eq!(config.clone().unbounded().max_attempts, None);
    }

    #[test]
    fn test_validation() {
        assert!(PrepConfig::default().with_max_attempts(0).validate().is_err());
        assert!(PrepConfig::default().with_tolerance(-1.0).validate().is_err());
        assert!(PrepConfig::default()
            .with_vocabulary(GateVocabulary::Dyadic { precision_bits: 0 })
            .validate()
            .is_err());
        assert!(PrepConfig::dyadic_with_rus().validate().is_ok());
    }

    #[test]
    fn test_display() {
        let text = PrepConfig::dyadic_with_rus().with_max_attempts(8).to_string();
        assert!(text.contains("dyadic(10)"));
        assert!(text.contains("8 attempts"));
    }
}
