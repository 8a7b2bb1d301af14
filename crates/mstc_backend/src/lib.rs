//! # MSTC Backend
//!
//! Circuit executor interface and an ideal dynamic-circuit simulator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mstc_backend // L2: Backend (완료)
//!     BackendTrait // 실행 인터페이스 (완료)
//!     ExecutionResult // 카운트 + 메타데이터 (완료)
//!     SimulatorBackend // 상태 벡터 시뮬레이터 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mstc_backend::prelude::*;
//! use mstc_core::CircuitBuilder;
//!
//! let backend = SimulatorBackend::ideal(5).with_seed(42);
//!
//! let circuit = CircuitBuilder::new(3, 3)
//!     .h(0)
//!     .cnot(0, 1)
//!     .cnot(1, 2)
//!     .measure_range(&[0, 1, 2], 0)
//!     .build();
//!
//! let result = backend.execute(&circuit, 1000).unwrap();
//! println!("P(000) = {:.3}", result.probability("000"));
//! ```
//!
//! ## Dynamic Circuits
//!
//! ```rust
//! use mstc_backend::prelude::*;
//! use mstc_core::CircuitBuilder;
//!
//! // Measure a coin, copy it classically to a second qubit
//! let circuit = CircuitBuilder::new(2, 2)
//!     .h(0)
//!     .measure(0, 0)
//!     .cond_x(vec![0], 1, 1)
//!     .measure(1, 1)
//!     .build();
//!
//! let result = SimulatorBackend::ideal(2)
//!     .with_seed(7)
//!     .execute(&circuit, 200)
//!     .unwrap();
//! assert_eq!(result.probability("01") + result.probability("10"), 0.0);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Execution types and backend trait (Gantree: L2_Backend)
pub mod execution;

/// Simulator backend (Gantree: L2_Backend → SimulatorBackend)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{Backend, ExecutionMetadata, ExecutionResult};
pub use simulator::SimulatorBackend;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use mstc_backend::prelude::*;
    //! ```

    pub use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
    pub use crate::simulator::SimulatorBackend;
}

// ============================================================================
// Integration Tests
// ============================================================================
