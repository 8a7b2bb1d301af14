//! Backend execution types and traits
//!
//! Gantree: L2_Backend → BackendTrait
//!
//! Defines the circuit executor interface. Counts are keyed by the classical
//! register printed with clbit 0 rightmost; a circuit without classical bits
//! is read out over all qubits instead.

use mstc_core::{ClbitId, Circuit, Counts, MstcResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Shots of one executed circuit
/// Gantree: ExecutionResult // 실행 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Bitstring → occurrences
    pub counts: Counts,

    /// Shots requested
    pub shots: u64,

    /// Run details
    pub metadata: ExecutionMetadata,
}

/// How a result was produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend that ran the circuit
    pub backend: String,

    /// Wall-clock time
    pub execution_time_ms: Option<u64>,

    /// Produced by a simulator
    pub simulated: bool,

    /// Seed of the shot sampler
    pub seed: Option<u64>,

    /// Repeat-until-success loops executed across all shots
    pub rus_loops: u64,

    /// Repeat-until-success attempts across all shots
    pub rus_attempts: u64,
}

impl ExecutionMetadata {
    /// Mean attempts per repeat-until-success loop
    pub fn mean_rus_attempts(&self) -> Option<f64> {
        if self.rus_loops == 0 {
            None
        } else {
            Some(self.rus_attempts as f64 / self.rus_loops as f64)
        }
    }
}

impl ExecutionResult {
    /// Result from raw counts
    pub fn new(counts: Counts, shots: u64, backend: &str) -> Self {
        Self {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                simulated: true,
                ..Default::default()
            },
        }
    }

    /// Sum of all counts
    pub fn total_counts(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Relative frequency of one bitstring (0 for an empty result)
    pub fn probability(&self, bitstring: &str) -> f64 {
        match self.total_counts() {
            0 => 0.0,
            total => self.counts.get(bitstring).map_or(0.0, |&n| n as f64 / total as f64),
        }
    }

    /// JSON export
    pub fn to_json(&self) -> MstcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Counts restricted to a subset of classical bits
    /// Gantree: marginal(&self, clbits) -> Counts // 주변 분포
    ///
    /// The new keys print `clbits[0]` rightmost. Bits beyond a key's width
    /// read as 0.
    pub fn marginal(&self, clbits: &[ClbitId]) -> Counts {
        let mut marginal: Counts = HashMap::new();
        for (key, &count) in &self.counts {
            let bytes = key.as_bytes();
            let width = bytes.len();
            let projected: String = clbits
                .iter()
                .rev()
                .map(|&c| {
                    if c < width && bytes[width - 1 - c] == b'1' {
                        '1'
                    } else {
                        '0'
                    }
                })
                .collect();
            *marginal.entry(projected).or_insert(0) += count;
        }
        marginal
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(shots={}, unique={}",
            self.shots,
            self.counts.len()
        )?;
        if let Some(mean) = self.metadata.mean_rus_attempts() {
            write!(f, ", rus_attempts={:.2}", mean)?;
        }
        write!(f, ")")
    }
}

/// Circuit executor
/// Gantree: BackendTrait // 백엔드 인터페이스
///
/// Shared across rayon workers, so implementations must be `Send + Sync`.
pub trait Backend: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Largest circuit width accepted
    fn num_qubits(&self) -> usize;

    /// Execute with fresh randomness
    /// Gantree: execute(circuit, shots) -> Result<ExecutionResult>
    fn execute(&self, circuit: &Circuit, shots: u64) -> MstcResult<ExecutionResult>;

    /// Execute with an explicit seed
    ///
    /// Backends without seed control ignore it.
    fn execute_seeded(
        &self,
        circuit: &Circuit,
        shots: u64,
        seed: u64,
    ) -> MstcResult<ExecutionResult> {
        let _ = seed;
        self.execute(circuit, shots)
    }

    /// Shot limit per execution
    fn max_shots(&self) -> u64 {
        100_000
    }
}

// ============================================================================
// Tests
// ============================================================================
