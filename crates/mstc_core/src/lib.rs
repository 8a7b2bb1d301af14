//! # MSTC Core
//!
//! Foundation types, dynamic circuits, and the repeat-until-success state
//! machine for mixed-state test case generation.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mstc_core // L0+L1: Foundation + Circuit (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // 확률 벡터, 레이블 공간 (완료)
//!         Constants // 준비/통계 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Gate // 게이트 enum (완료)
//!         RepeatUntil // RUS 상태 기계 (완료)
//!         Circuit // 동적 회로 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mstc_core::prelude::*;
//!
//! // Bell pair with both qubits measured
//! let circuit = CircuitBuilder::new(2, 2)
//!     .h(0)
//!     .cnot(0, 1)
//!     .measure_range(&[0, 1], 0)
//!     .build();
//!
//! println!("{}", circuit);
//! println!("{}", circuit.to_qasm());
//! ```
//!
//! ## Distributions and Labels
//!
//! ```rust
//! use mstc_core::prelude::*;
//!
//! let v = ProbabilityVector::new(vec![0.5, 0.25, 0.25]).unwrap();
//! assert_eq!(v.num_qubits(), 2);
//!
//! let space = LabelSpace::new(3, 1).unwrap();
//! assert_eq!(space.labels(), vec!["0", "1", "2"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Repeat-until-success control flow (Gantree: L1_Circuit → RepeatUntil)
pub mod repeat;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{prep, stats};
pub use error::{MstcError, MstcResult};
pub use gate::{ClassicalCondition, Controls, Gate};
pub use repeat::{drive, RetryBudget, RusLoop, RusMachine, RusOutcome, RusState};
pub use types::{
    qubits_for, Angle, ClbitId, Counts, LabelSpace, ProbabilityVector, QubitId,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use mstc_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{prep, stats};
    pub use crate::error::{MstcError, MstcResult};
    pub use crate::gate::{ClassicalCondition, Controls, Gate};
    pub use crate::repeat::{RetryBudget, RusLoop, RusOutcome, RusState};
    pub use crate::types::{
        Angle, ClbitId, Counts, LabelSpace, ProbabilityVector, QubitId,
    };
}

// ============================================================================
// Integration Tests
// ============================================================================
