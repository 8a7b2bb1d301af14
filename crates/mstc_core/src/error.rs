//! Error types for MSTC
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by preparation, execution, and the test oracle.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for MSTC
/// Gantree: MstcError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MstcError {
    // ========================================================================
    // Distribution Errors
    // ========================================================================
    /// Probability vector is empty, negative, non-finite, or does not sum to 1
    /// Gantree: InvalidDistribution(String) // 분포 검증
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Vector cannot be realized by the configured gate vocabulary
    /// Gantree: UnrepresentableDistribution{vocabulary} // 표현 불가
    #[error("Distribution is not representable by the {vocabulary} vocabulary and RUS is disabled")]
    UnrepresentableDistribution { vocabulary: String },

    /// Label space and vector disagree in size
    #[error("Label space of {expected} labels does not match vector of length {actual}")]
    LabelSpaceMismatch { expected: usize, actual: usize },

    /// Label string not part of the declared label space
    #[error("Invalid label '{0}'")]
    InvalidLabel(String),

    /// Radix or digit count out of range
    #[error("Invalid label space: radix {radix}, digits {digits}")]
    InvalidLabelSpace { radix: usize, digits: usize },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Zero-count execution result
    /// Gantree: InsufficientShots // 샷 부족
    #[error("Insufficient shots: execution result holds no counts")]
    InsufficientShots,

    /// Retry cap exceeded by a repeat-until-success block
    /// Gantree: RetryBudgetExceeded{attempts} // 재시도 초과
    #[error("Repeat-until-success exceeded its retry budget after {attempts} attempts")]
    RetryBudgetExceeded { attempts: u64 },

    /// Backend execution error
    #[error("Backend error: {0}")]
    BackendError(String),

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Measurement into non-existent classical bit
    #[error("Classical bit {clbit} out of range: circuit has {num_clbits} classical bits")]
    ClbitOutOfRange { clbit: usize, num_clbits: usize },

    /// Qubit index out of range
    #[error("Qubit {qubit} out of range: max is {max}")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Invalid gate parameter
    #[error("Invalid gate parameter: {0}")]
    InvalidGateParameter(String),

    // ========================================================================
    // Oracle Errors
    // ========================================================================
    /// Significance level outside (0, 1)
    #[error("Invalid significance level {0}: must be in (0, 1)")]
    InvalidSignificance(f64),

    /// Statistical test cannot be computed
    #[error("Statistical test error: {0}")]
    StatisticalTestError(String),

    // ========================================================================
    // Configuration / I/O Errors
    // ========================================================================
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for MSTC operations
/// Gantree: MstcResult<T> // type alias
pub type MstcResult<T> = Result<T, MstcError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for MstcError {
    fn from(err: serde_json::Error) -> Self {
        MstcError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl MstcError {
    /// Check if the caller may reasonably retry (re-execute or raise the budget)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MstcError::InsufficientShots
                | MstcError::RetryBudgetExceeded { .. }
                | MstcError::BackendError(_)
        )
    }

    /// Check if error concerns the shape or content of a distribution
    pub fn is_distribution_error(&self) -> bool {
        matches!(
            self,
            MstcError::InvalidDistribution(_)
                | MstcError::UnrepresentableDistribution { .. }
                | MstcError::LabelSpaceMismatch { .. }
                | MstcError::InvalidLabel(_)
                | MstcError::InvalidLabelSpace { .. }
        )
    }

    /// Check if error is a circuit construction error
    pub fn is_circuit_error(&self) -> bool {
        matches!(
            self,
            MstcError::GateQubitMismatch { .. }
                | MstcError::ClbitOutOfRange { .. }
                | MstcError::QubitOutOfRange { .. }
                | MstcError::InvalidGateParameter(_)
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
    fn test_error_display() {
        let err = MstcError::InvalidDistribution("sum is 0.9".into());
        assert!(err.to_string().contains("0.9"));

        let err = MstcError::RetryBudgetExceeded { attempts: 64 };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(MstcError::InsufficientShots.is_recoverable());
        assert!(MstcError::RetryBudgetExceeded { attempts: 3 }.is_recoverable());
        assert!(!MstcError::InvalidDistribution("x".into()).is_recoverable());
    }

    #[test]
    fn test_is_distribution_error() {
        assert!(MstcError::UnrepresentableDistribution {
            vocabulary: "separable".into()
        }
        .is_distribution_error());
        assert!(!MstcError::InsufficientShots.is_distribution_error());
    }

    #[test]
    fn test_is_circuit_error() {
        assert!(MstcError::GateQubitMismatch {
            qubit: 4,
            num_qubits: 2
        }
        .is_circuit_error());
        assert!(!MstcError::InvalidSignificance(1.5).is_circuit_error());
    }
}
