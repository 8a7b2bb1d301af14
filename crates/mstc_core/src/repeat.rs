//! Repeat-until-success control flow
//!
//! Gantree: L1_Circuit → RepeatUntil
//!
//! The retry loop is an explicit state machine over
//! `Attempt → (Success | Retry → Attempt)`, driven iteratively with an
//! optional attempt cap. `RusLoop` is its circuit-level form: a gate body
//! re-run (after resetting its register) until a flag qubit reads the
//! accepting value.

use crate::error::{MstcError, MstcResult};
use crate::gate::Gate;
use crate::types::{ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Retry Budget
// ============================================================================

/// Cap on repeat-until-success attempts
/// Gantree: RetryBudget // 재시도 예산
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RetryBudget {
    /// Retry forever (termination is probabilistic)
    #[default]
    Unbounded,
    /// At most this many attempts
    Limited(u64),
}

impl RetryBudget {
    /// Build from an optional cap (`None` = unbounded)
    pub fn from_max_attempts(max_attempts: Option<u64>) -> Self {
        match max_attempts {
            Some(max) => RetryBudget::Limited(max),
            None => RetryBudget::Unbounded,
        }
    }

    /// The cap, if any
    pub fn limit(&self) -> Option<u64> {
        match self {
            RetryBudget::Unbounded => None,
            RetryBudget::Limited(max) => Some(*max),
        }
    }

    /// Check whether another attempt may start after `attempts_made`
    pub fn allows(&self, attempts_made: u64) -> bool {
        match self {
            RetryBudget::Unbounded => true,
            RetryBudget::Limited(max) => attempts_made < *max,
        }
    }
}

impl fmt::Display for RetryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryBudget::Unbounded => write!(f, "unbounded"),
            RetryBudget::Limited(max) => write!(f, "{} attempts", max),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// State of a repeat-until-success loop
/// Gantree: RusState // ATTEMPT / SUCCESS / RETRY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RusState {
    /// Attempt number `n` (1-based) is about to run
    Attempt(u64),
    /// Attempt `n` failed; the register must be reset before the next one
    Retry(u64),
    /// Attempt `n` succeeded
    Success(u64),
}

/// Iterative retry state machine
/// Gantree: RusMachine // 상태 기계
#[derive(Debug, Clone)]
pub struct RusMachine {
    budget: RetryBudget,
    state: RusState,
}

impl RusMachine {
    /// Start at the first attempt
    pub fn new(budget: RetryBudget) -> Self {
        Self {
            budget,
            state: RusState::Attempt(1),
        }
    }

    /// Current state
    pub fn state(&self) -> RusState {
        self.state
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u64 {
        match self.state {
            RusState::Attempt(n) => n - 1,
            RusState::Retry(n) | RusState::Success(n) => n,
        }
    }

    /// Record the outcome of the running attempt
    /// Gantree: record(&mut, success) -> RusState // 결과 기록
    pub fn record(&mut self, success: bool) -> RusState {
        if let RusState::Attempt(n) = self.state {
            self.state = if success {
                RusState::Success(n)
            } else {
                RusState::Retry(n)
            };
        }
        self.state
    }

    /// Leave `Retry` for the next `Attempt`, or fail when the budget is spent
    /// Gantree: retry(&mut) -> Result<RusState> // 재시도
    pub fn retry(&mut self) -> MstcResult<RusState> {
        if let RusState::Retry(n) = self.state {
            if !self.budget.allows(n) {
                return Err(MstcError::RetryBudgetExceeded { attempts: n });
            }
            self.state = RusState::Attempt(n + 1);
        }
        Ok(self.state)
    }
}

/// Outcome of a completed repeat-until-success loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RusOutcome<T> {
    /// Value produced by the successful attempt
    pub value: T,
    /// Attempts used, including the successful one
    pub attempts: u64,
}

/// Run `attempt` until it yields a value or the budget is spent
/// Gantree: drive(budget, attempt) -> Result<RusOutcome> // 반복 실행
///
/// `attempt` receives the 1-based attempt number and returns `None` on
/// failure. A budget of zero attempts fails before `attempt` is called.
pub fn drive<T, F>(budget: RetryBudget, mut attempt: F) -> MstcResult<RusOutcome<T>>
where
    F: FnMut(u64) -> Option<T>,
{
    if !budget.allows(0) {
        return Err(MstcError::RetryBudgetExceeded { attempts: 0 });
    }
    let mut machine = RusMachine::new(budget);
    let mut n = 1;
    loop {
        match attempt(n) {
            Some(value) => {
                machine.record(true);
                return Ok(RusOutcome { value, attempts: n });
            }
            None => {
                machine.record(false);
                machine.retry()?;
                n += 1;
            }
        }
    }
}

// ============================================================================
// Circuit Form
// ============================================================================

/// Repeat-until-success loop as a circuit instruction
/// Gantree: RusLoop // 회로 수준 RUS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RusLoop {
    /// Gates of one attempt (must not measure the flag itself)
    pub body: Vec<Gate>,
    /// Flag qubit measured after the body
    pub flag: QubitId,
    /// Classical bit receiving the flag outcome
    pub flag_clbit: ClbitId,
    /// Flag value meaning success
    pub accept: bool,
    /// Qubits returned to |0⟩ before every retry
    pub reset: Vec<QubitId>,
    /// Attempt cap (`None` = unbounded)
    pub max_attempts: Option<u64>,
}

impl RusLoop {
    /// Retry budget of this loop
    pub fn budget(&self) -> RetryBudget {
        RetryBudget::from_max_attempts(self.max_attempts)
    }

    /// Every qubit the loop touches, ascending
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut set: BTreeSet<QubitId> = self.body.iter().flat_map(|g| g.qubits()).collect();
        set.insert(self.flag);
        set.extend(self.reset.iter().copied());
        set.into_iter().collect()
    }

    /// Every classical bit the loop touches, ascending
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut set: BTreeSet<ClbitId> = self.body.iter().flat_map(|g| g.clbits()).collect();
        set.insert(self.flag_clbit);
        set.into_iter().collect()
    }

    /// Same loop relocated by a qubit and clbit offset
    pub fn shifted(&self, offset: usize, clbit_offset: usize) -> RusLoop {
        RusLoop {
            body: self
                .body
                .iter()
                .map(|g| g.shifted(offset, clbit_offset))
                .collect(),
            flag: self.flag + offset,
            flag_clbit: self.flag_clbit + clbit_offset,
            accept: self.accept,
            reset: self.reset.iter().map(|q| q + offset).collect(),
            max_attempts: self.max_attempts,
        }
    }

    /// OpenQASM 3 rendering (the attempt cap is emitted as a comment)
    pub fn to_qasm(&self) -> String {
        let body: Vec<String> = self.body.iter().map(|g| g.to_qasm()).collect();
        let resets: Vec<String> = self
            .reset
            .iter()
            .map(|q| format!("reset q[{}];", q))
            .collect();
        let measure = format!("c[{}] = measure q[{}];", self.flag_clbit, self.flag);
        let mut lines = Vec::new();
        if let Some(max) = self.max_attempts {
            lines.push(format!("// repeat-until-success, at most {} attempts", max));
        }
        lines.extend(body.iter().cloned());
        lines.push(measure.clone());
        lines.push(format!(
            "while (c[{}] != {}) {{",
            self.flag_clbit,
            u8::from(self.accept)
        ));
        for line in resets.iter().chain(body.iter()) {
            lines.push(format!("  {}", line));
        }
        lines.push(format!("  {}", measure));
        lines.push("}".to_string());
        lines.join("\n")
    }
}

// ============================================================================
// Tests
// ============================================================================
