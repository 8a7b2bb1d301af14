//! # MSTC Engine
//!
//! Test harness for quantum programs: prepares pure or mixed input states,
//! runs the program under test for independent trials, and decides PASS or
//! FAIL with the statistical oracle.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mstc_engine // L5: Engine (완료)
//!     TestConfig // 준비/실행/오라클 설정 (완료)
//!     ObjectProgram // 대상 프로그램 인터페이스 (완료)
//!     TestHarness // PSTC/MSTC 실행 (완료)
//!         run_mstc // 혼합 상태 테스트 (완료)
//!         run_pstc // 순수 상태 테스트 (완료)
//!         run_suite // 반복 스위트 (완료)
//!         run_shots_sweep // 샷 스윕 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mstc_engine::prelude::*;
//! use mstc_core::{LabelSpace, ProbabilityVector};
//!
//! let program = CircuitProgram::increment(2).unwrap();
//! let space = LabelSpace::binary(2).unwrap();
//! let spec = TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap();
//!
//! let state = MixedState::identity(ProbabilityVector::uniform(4).unwrap());
//! let harness = TestHarness::ideal(8, TestConfig::default().with_seed(42));
//! let report = harness.run_mstc(&program, &spec, &state).unwrap();
//!
//! assert!(report.passed());
//! println!("{}", report.verdict);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Harness configuration (Gantree: L5_Engine → TestConfig)
pub mod config;

/// Programs under test (Gantree: L5_Engine → ObjectProgram)
pub mod program;

/// Test execution (Gantree: L5_Engine → TestHarness)
pub mod harness;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TestConfig;
pub use harness::{
    CaseInput, CaseKind, CaseSummary, SuiteReport, TestCase, TestCaseReport, TestHarness,
};
pub use program::{CircuitProgram, ObjectProgram};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use mstc_engine::prelude::*;
    //! ```

    pub use crate::config::TestConfig;
    pub use crate::harness::{CaseInput, SuiteReport, TestCase, TestCaseReport, TestHarness};
    pub use crate::program::{CircuitProgram, ObjectProgram};
    pub use mstc_oracle::{
        AggregationPolicy, Correction, SpecificationOracle, TableSpecification, Verdict,
    };
    pub use mstc_prep::{DataPrepMode, GateVocabulary, MixedState};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use mstc_core::{Circuit, CircuitBuilder, LabelSpace, MstcResult, ProbabilityVector, QubitId};

    /// Spec: the first output qubit copies the input, the second is a fair coin
    struct CopyAndCoin;

    impl SpecificationOracle for CopyAndCoin {
        fn output_space(&self) -> LabelSpace {
            LabelSpace::binary(2).unwrap()
        }

        fn expected_distribution(&self, input: usize) -> MstcResult<ProbabilityVector> {
            let mut values = vec![0.0; 4];
            values[input & 1] = 0.5;
            values[(input & 1) | 2] = 0.5;
            ProbabilityVector::new(values)
        }

        fn name(&self) -> &str {
            "copy_and_coin"
        }
    }

    /// Program with an ancilla: CNOT input → ancilla, H on a coin qubit
    struct CopyProgram {
        coin: bool,
    }

    impl ObjectProgram for CopyProgram {
        fn name(&self) -> &str {
            if self.coin {
                "copy_and_coin"
            } else {
                "copy_without_coin"
            }
        }

        fn num_qubits(&self) -> usize {
            3
        }

        fn input_qubits(&self) -> Vec<QubitId> {
            vec![0]
        }

        fn output_qubits(&self) -> Vec<QubitId> {
            vec![1, 2]
        }

        fn append_to(&self, circuit: &mut Circuit, offset: usize) -> MstcResult<()> {
            let mut builder = CircuitBuilder::new(3, 0).cnot(0, 1);
            if self.coin {
                builder = builder.h(2);
            }
            circuit.append(&builder.try_build()?, offset, 0)
        }
    }

    #[test]
    fn test_custom_program_and_spec() {
        let harness = TestHarness::ideal(8, TestConfig::default().with_seed(4));
        let state = MixedState::identity(ProbabilityVector::new(vec![0.3, 0.7]).unwrap());

        let good = harness
            .run_mstc(&CopyProgram { coin: true }, &CopyAndCoin, &state)
            .unwrap();
        assert!(good.passed(), "{}", good.verdict);

        let bad = harness
            .run_mstc(&CopyProgram { coin: false }, &CopyAndCoin, &state)
            .unwrap();
        assert!(!bad.passed(), "{}", bad.verdict);
    }

    #[test]
    fn test_mixed_and_pure_suite() {
        let harness = TestHarness::ideal(8, TestConfig::default().with_seed(77));
        let program = CircuitProgram::increment(2).unwrap();
        let space = LabelSpace::binary(2).unwrap();
        let spec = TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap();
        let mixed = MixedState::identity(ProbabilityVector::new(vec![0.4, 0.3, 0.2, 0.1]).unwrap());

        let cases = [
            TestCase {
                name: "inc/mixed".to_string(),
                program: &program,
                spec: &spec,
                input: CaseInput::Mixed(mixed),
            },
            TestCase {
                name: "inc/pure".to_string(),
                program: &program,
                spec: &spec,
                input: CaseInput::Pure(2),
            },
        ];

        let report = harness.run_suite(&cases, 5).unwrap();
        assert_eq!(report.repeats, 5);
        assert_eq!(report.cases[1].failures, 0);
        // Correct program: false alarms stay rare at α = 0.05
        assert!(report.cases[0].failures <= 2);
        assert!(report.cases.iter().all(|c| c.errors == 0));
    }

    #[test]
    fn test_report_json() {
        let config = TestConfig::default()
            .with_data_prep(DataPrepMode::ClassicallyControlled)
            .with_seed(3);
        let harness = TestHarness::ideal(8, config);
        let program = CircuitProgram::increment(2).unwrap();
        let space = LabelSpace::binary(2).unwrap();
        let spec = TableSpecification::deterministic("inc", space, 4, |i| (i + 1) % 4).unwrap();
        let state = MixedState::identity(ProbabilityVector::uniform(4).unwrap());

        let report = harness.run_mstc(&program, &spec, &state).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"program\": \"increment\""));
        assert!(json.contains("\"layout\""));
        assert!(report.layout.unwrap().scratch_clbits.len() == 2);
    }
}
