//! Constants for MSTC
//!
//! Gantree: L0_Foundation → Constants
//!
//! Numeric tolerances, preparation defaults, and statistical defaults.

// ============================================================================
// Preparation Constants
// Gantree: prep // 준비 상수
// ============================================================================

pub mod prep {
    //! Defaults for control-state and mixed-state preparation

    /// Tolerance when checking that a probability vector sums to 1
    /// Gantree: DIST_TOLERANCE: f64 = 1e-9
    pub const DIST_TOLERANCE: f64 = 1e-9;

    /// Tolerance for product-structure and dyadic representability checks
    pub const REPRESENTABILITY_TOLERANCE: f64 = 1e-9;

    /// Default precision for the dyadic gate vocabulary (entries k / 2^bits)
    pub const DEFAULT_DYADIC_BITS: u32 = 10;

    /// Default retry cap for repeat-until-success blocks (None = unbounded)
    pub const DEFAULT_MAX_ATTEMPTS: Option<u64> = None;

    /// Largest control register the preparers will address
    pub const MAX_CONTROL_QUBITS: usize = 20;
}

// ============================================================================
// Statistical Constants
// Gantree: stats // 통계 상수
// ============================================================================

pub mod stats {
    //! Defaults for the output-probability oracle

    /// Default significance level α
    /// Gantree: DEFAULT_ALPHA: f64 = 0.05
    pub const DEFAULT_ALPHA: f64 = 0.05;

    /// Default shots per circuit execution (the research drivers use 1024)
    pub const DEFAULT_SHOTS: u64 = 1024;

    /// Default number of independent trials per test case
    pub const DEFAULT_TRIALS: usize = 1;

    /// Continuity correction applied to the Mann-Whitney normal approximation
    pub const CONTINUITY_CORRECTION: f64 = 0.5;

    /// Default number of repeats in a test suite
    pub const DEFAULT_SUITE_REPEATS: usize = 20;
}

// ============================================================================
// Tests
// ============================================================================
