//! # MSTC Prep
//!
//! Probability-vector encoding, control-state preparation,
//! repeat-until-success, and mixed-state circuit construction.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mstc_prep // L3: Prep (완료)
//!     PrepConfig // 어휘/RUS/데이터 모드 설정 (완료)
//!     ProbabilityVectorCodec // 확률 벡터 ↔ 회전 트리 (완료)
//!     ControlStatePreparer // 제어 레지스터 준비 (완료)
//!     RUSBlock // 반복-성공 블록 (완료)
//!     MixedStatePreparer // 혼합 상태 합성 회로 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mstc_prep::prelude::*;
//! use mstc_core::ProbabilityVector;
//!
//! let v = ProbabilityVector::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
//! let mut composite = MixedStatePreparer::default().prepare_vector(&v).unwrap();
//! let outputs = composite.measure_data().unwrap();
//!
//! assert_eq!(outputs.len(), 2);
//! println!("{}", composite.circuit());
//! ```
//!
//! ## Repeat-Until-Success
//!
//! ```rust
//! use mstc_prep::prelude::*;
//! use mstc_core::{ProbabilityVector, RetryBudget};
//! use rand::SeedableRng;
//!
//! let third = ProbabilityVector::uniform(3).unwrap();
//! let block = RUSBlock::build(&third);
//! assert!((block.success_probability() - 0.75).abs() < 1e-12);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let outcome = block.run(&mut rng, RetryBudget::Limited(64)).unwrap();
//! assert!(outcome.value.success);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Preparation configuration (Gantree: L3_Prep → PrepConfig)
pub mod config;

/// Rotation-tree codec (Gantree: L3_Prep → ProbabilityVectorCodec)
pub mod codec;

/// Control register (Gantree: L3_Prep → ControlStatePreparer)
pub mod control;

/// Repeat-until-success (Gantree: L3_Prep → RUSBlock)
pub mod rus;

/// Composite circuits (Gantree: L3_Prep → MixedStatePreparer)
pub mod mixed;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{ProbabilityVectorCodec, RotationNode, RotationTree};
pub use config::{DataPrepMode, GateVocabulary, PrepConfig};
pub use control::{ControlFragment, ControlStatePreparer};
pub use mixed::{CompositeCircuit, ControlRoute, MixedState, MixedStatePreparer, RegisterLayout};
pub use rus::{RUSBlock, RusAttempt};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use mstc_prep::prelude::*;
    //! ```

    pub use crate::codec::{ProbabilityVectorCodec, RotationTree};
    pub use crate::config::{DataPrepMode, GateVocabulary, PrepConfig};
    pub use crate::control::{ControlFragment, ControlStatePreparer};
    pub use crate::mixed::{CompositeCircuit, MixedState, MixedStatePreparer, RegisterLayout};
    pub use crate::rus::{RUSBlock, RusAttempt};
}

// ============================================================================
// Integration Tests
// ============================================================================
