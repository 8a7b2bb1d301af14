//! Test harness
//!
//! Gantree: L5_Engine → TestHarness
//!
//! Runs pure- and mixed-state test cases end to end: prepare the input,
//! append the program, measure its outputs, execute independent trials in
//! parallel, and hand observed and expected samples to the oracle.

use crate::config::TestConfig;
use crate::program::{check_inputs, ObjectProgram};
use mstc_backend::{Backend, ExecutionResult, SimulatorBackend};
use mstc_core::{
    Circuit, CircuitBuilder, ClbitId, Counts, Gate, LabelSpace, MstcError, MstcResult,
    ProbabilityVector,
};
use mstc_oracle::{
    expected_for_inputs, sample_outcomes, DistributionEstimator, SampleSet, SpecificationOracle,
    Verdict,
};
use mstc_prep::{MixedState, MixedStatePreparer, RegisterLayout};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ============================================================================
// Reports
// ============================================================================

/// Kind of test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseKind {
    /// Mixed-state test case
    Mixed,
    /// Pure-state test case
    Pure,
}

/// Result of one test case
/// Gantree: TestCaseReport // 테스트 케이스 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseReport {
    /// Program name
    pub program: String,
    /// Mixed or pure
    pub kind: CaseKind,
    /// Oracle verdict
    pub verdict: Verdict,
    /// Expected output distribution
    pub expected: ProbabilityVector,
    /// Output distribution over all trials
    pub observed: ProbabilityVector,
    /// Total variation distance between the two
    pub total_variation: f64,
    /// Shots per trial
    pub shots_per_trial: u64,
    /// Trials executed
    pub num_trials: usize,
    /// Circuit width
    pub num_qubits: usize,
    /// Circuit size
    pub gate_count: usize,
    /// Mean RUS attempts per shot (RUS route only)
    pub mean_rus_attempts: Option<f64>,
    /// Wall-clock time
    pub elapsed_ms: u64,
    /// Register layout of the composite circuit (mixed cases)
    pub layout: Option<RegisterLayout>,
}

impl TestCaseReport {
    /// Verdict was PASS
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }

    /// JSON export
    pub fn to_json(&self) -> MstcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Input of a suite case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseInput {
    /// Mixed state over data states
    Mixed(MixedState),
    /// Single classical input
    Pure(usize),
}

/// One entry of a test suite
/// Gantree: TestCase // 테스트 케이스
pub struct TestCase<'a> {
    /// Case name
    pub name: String,
    /// Program under test
    pub program: &'a dyn ObjectProgram,
    /// Its specification
    pub spec: &'a dyn SpecificationOracle,
    /// Input
    pub input: CaseInput,
}

/// Failure statistics of one suite case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// Case name
    pub name: String,
    /// Completed runs
    pub runs: usize,
    /// FAIL verdicts
    pub failures: usize,
    /// Runs aborted by an error
    pub errors: usize,
    /// failures / repeats
    pub failure_rate: f64,
    /// Mean wall-clock time of a completed run
    pub mean_elapsed_ms: f64,
}

/// Result of a repeated suite
/// Gantree: SuiteReport // 스위트 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-case statistics
    pub cases: Vec<CaseSummary>,
    /// Shots per trial used for every run
    pub shots_per_trial: u64,
    /// Repeats per case
    pub repeats: usize,
    /// FAIL verdicts over all cases and repeats
    pub total_failures: usize,
    /// total_failures / (cases · repeats)
    pub failure_rate: f64,
    /// Wall-clock time
    pub elapsed_ms: u64,
}

impl SuiteReport {
    /// JSON export
    pub fn to_json(&self) -> MstcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Executes test cases on a backend
/// Gantree: TestHarness // 테스트 하네스
pub struct TestHarness<B: Backend> {
    backend: B,
    config: TestConfig,
}

impl TestHarness<SimulatorBackend> {
    /// Harness on the ideal simulator
    pub fn ideal(num_qubits: usize, config: TestConfig) -> Self {
        Self::new(SimulatorBackend::ideal(num_qubits), config)
    }
}

impl<B: Backend> TestHarness<B> {
    /// Harness on a backend
    pub fn new(backend: B, config: TestConfig) -> Self {
        Self { backend, config }
    }

    /// Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Configuration
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    // ========================================================================
    // Test Cases
    // ========================================================================

    /// Mixed-state test case
    /// Gantree: run_mstc(program, spec, state) -> Result<TestCaseReport> // MSTC 실행
    pub fn run_mstc<P, S>(
        &self,
        program: &P,
        spec: &S,
        state: &MixedState,
    ) -> MstcResult<TestCaseReport>
    where
        P: ObjectProgram + ?Sized,
        S: SpecificationOracle + ?Sized,
    {
        self.mixed_case(&self.config, program, spec, state, self.master_seed())
    }

    /// Pure-state test case
    /// Gantree: run_pstc(program, spec, input) -> Result<TestCaseReport> // PSTC 실행
    pub fn run_pstc<P, S>(&self, program: &P, spec: &S, input: usize) -> MstcResult<TestCaseReport>
    where
        P: ObjectProgram + ?Sized,
        S: SpecificationOracle + ?Sized,
    {
        self.pure_case(&self.config, program, spec, input, self.master_seed())
    }

    /// Run every case `repeats` times and tally failures
    /// Gantree: run_suite(cases, repeats) -> Result<SuiteReport> // 스위트 실행
    pub fn run_suite(&self, cases: &[TestCase<'_>], repeats: usize) -> MstcResult<SuiteReport> {
        self.suite(&self.config, cases, repeats)
    }

    /// Run the suite once per shot count
    /// Gantree: run_shots_sweep(cases, shots_list, repeats) -> Result<Vec<SuiteReport>> // 샷 스윕
    ///
    /// Every entry starts from the same master seed, so shot counts differ
    /// only in the number of samples drawn.
    pub fn run_shots_sweep(
        &self,
        cases: &[TestCase<'_>],
        shots_list: &[u64],
        repeats: usize,
    ) -> MstcResult<Vec<SuiteReport>> {
        let seed = self.master_seed();
        shots_list
            .iter()
            .map(|&shots| {
                let config = self.config.clone().with_shots(shots).with_seed(seed);
                let report = self.suite(&config, cases, repeats)?;
                log::info!(
                    "{} shots: failure rate {:.3}",
                    shots,
                    report.failure_rate
                );
                Ok(report)
            })
            .collect()
    }

    fn suite(
        &self,
        config: &TestConfig,
        cases: &[TestCase<'_>],
        repeats: usize,
    ) -> MstcResult<SuiteReport> {
        config.validate()?;
        if repeats == 0 {
            return Err(MstcError::InvalidConfig("repeats must be > 0".to_string()));
        }
        let start = Instant::now();
        let mut seeds = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let mut elapsed = vec![0.0f64; cases.len()];
        let mut summaries: Vec<CaseSummary> = cases
            .iter()
            .map(|case| CaseSummary {
                name: case.name.clone(),
                runs: 0,
                failures: 0,
                errors: 0,
                failure_rate: 0.0,
                mean_elapsed_ms: 0.0,
            })
            .collect();

        for _ in 0..repeats {
            for ((case, summary), spent) in cases
                .iter()
                .zip(summaries.iter_mut())
                .zip(elapsed.iter_mut())
            {
                let seed = seeds.next_u64();
                let run_start = Instant::now();
                let result = match &case.input {
                    CaseInput::Mixed(state) => {
                        self.mixed_case(config, case.program, case.spec, state, seed)
                    }
                    CaseInput::Pure(input) => {
                        self.pure_case(config, case.program, case.spec, *input, seed)
                    }
                };
                match result {
                    Ok(report) => {
                        *spent += run_start.elapsed().as_secs_f64() * 1000.0;
                        summary.runs += 1;
                        if !report.passed() {
                            summary.failures += 1;
                        }
                    }
                    Err(err) if err.is_recoverable() => {
                        log::warn!("{}: run aborted: {}", case.name, err);
                        summary.errors += 1;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        for (summary, spent) in summaries.iter_mut().zip(&elapsed) {
            summary.failure_rate = summary.failures as f64 / repeats as f64;
            if summary.runs > 0 {
                summary.mean_elapsed_ms = spent / summary.runs as f64;
            }
        }
        let total_failures: usize = summaries.iter().map(|s| s.failures).sum();
        let failure_rate = if cases.is_empty() {
            0.0
        } else {
            total_failures as f64 / (cases.len() * repeats) as f64
        };
        log::info!(
            "suite finished: {} cases × {} repeats, failure rate {:.3}",
            cases.len(),
            repeats,
            failure_rate
        );

        Ok(SuiteReport {
            cases: summaries,
            shots_per_trial: config.shots_per_trial,
            repeats,
            total_failures,
            failure_rate,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    // ========================================================================
    // Case Construction
    // ========================================================================

    fn mixed_case<P, S>(
        &self,
        config: &TestConfig,
        program: &P,
        spec: &S,
        state: &MixedState,
        seed: u64,
    ) -> MstcResult<TestCaseReport>
    where
        P: ObjectProgram + ?Sized,
        S: SpecificationOracle + ?Sized,
    {
        config.validate()?;
        check_inputs(program, state.data_width())?;

        let mut composite = MixedStatePreparer::new(config.prep_config()).prepare_mixed(state)?;
        let mut body = Circuit::with_name(program.num_qubits(), program.num_clbits(), program.name());
        program.append_to(&mut body, 0)?;
        composite.append_program(&body)?;
        let outputs = composite.measure_program(&program.output_qubits())?;

        let weighted = state
            .distribution()
            .values()
            .iter()
            .copied()
            .zip(state.data_states().iter().copied());
        let expected = expected_for_inputs(spec, weighted)?;

        let layout = composite.layout().clone();
        let circuit = composite.into_circuit();
        let mut report = self.execute_case(
            config,
            program.name(),
            CaseKind::Mixed,
            &circuit,
            &outputs,
            spec.output_space(),
            expected,
            seed,
        )?;
        report.layout = Some(layout);
        Ok(report)
    }

    fn pure_case<P, S>(
        &self,
        config: &TestConfig,
        program: &P,
        spec: &S,
        input: usize,
        seed: u64,
    ) -> MstcResult<TestCaseReport>
    where
        P: ObjectProgram + ?Sized,
        S: SpecificationOracle + ?Sized,
    {
        config.validate()?;
        let inputs = program.input_qubits();
        check_inputs(program, inputs.len())?;
        if inputs.len() < usize::BITS as usize && input >> inputs.len() != 0 {
            return Err(MstcError::InvalidLabel(format!(
                "input {} does not fit {} qubits",
                input,
                inputs.len()
            )));
        }

        let mut circuit =
            CircuitBuilder::with_name(program.num_qubits(), program.num_clbits(), program.name())
                .x_pattern(&inputs, input)
                .try_build()?;
        program.append_to(&mut circuit, 0)?;
        let output_qubits = program.output_qubits();
        let first = circuit.add_clbits(output_qubits.len());
        let outputs: Vec<ClbitId> = (first..first + output_qubits.len()).collect();
        for (&q, &c) in output_qubits.iter().zip(&outputs) {
            circuit.add_gate(Gate::Measure(q, c))?;
        }

        let expected = spec.expected_distribution(input)?;
        self.execute_case(
            config,
            program.name(),
            CaseKind::Pure,
            &circuit,
            &outputs,
            spec.output_space(),
            expected,
            seed,
        )
    }

    // ========================================================================
    // Execution
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn execute_case(
        &self,
        config: &TestConfig,
        name: &str,
        kind: CaseKind,
        circuit: &Circuit,
        outputs: &[ClbitId],
        space: LabelSpace,
        expected: ProbabilityVector,
        seed: u64,
    ) -> MstcResult<TestCaseReport> {
        if outputs.len() != space.num_qubits() {
            return Err(MstcError::LabelSpaceMismatch {
                expected: space.num_qubits(),
                actual: outputs.len(),
            });
        }
        if expected.len() != space.len() {
            return Err(MstcError::LabelSpaceMismatch {
                expected: space.len(),
                actual: expected.len(),
            });
        }
        config.check_trial_power(space.len())?;

        let start = Instant::now();
        let shots = config.shots_per_trial;
        let trials = config.num_trials;

        // Trial seeds first, then the expected-sample stream
        let mut seeds = ChaCha8Rng::seed_from_u64(seed);
        let trial_seeds: Vec<u64> = (0..trials).map(|_| seeds.next_u64()).collect();
        let mut sampler = ChaCha8Rng::seed_from_u64(seeds.next_u64());

        let results: Vec<ExecutionResult> = trial_seeds
            .par_iter()
            .map(|&s| self.backend.execute_seeded(circuit, shots, s))
            .collect::<MstcResult<_>>()?;
        let counts: Vec<Counts> = results.iter().map(|r| r.marginal(outputs)).collect();

        let estimator = DistributionEstimator::new();
        let (observed, expected_samples) = if trials == 1 {
            let observed = estimator.to_outcomes_space(&counts[0], &space)?;
            let samples = sample_outcomes(&expected, shots as usize, &mut sampler)?;
            (SampleSet::Outcomes(observed), SampleSet::Outcomes(samples))
        } else {
            let observed = counts
                .iter()
                .map(|c| estimator.estimate_space(c, &space))
                .collect::<MstcResult<Vec<_>>>()?;
            let samples = (0..trials)
                .map(|_| {
                    sample_outcomes(&expected, shots as usize, &mut sampler)
                        .and_then(|s| empirical(&s, space.len()))
                })
                .collect::<MstcResult<Vec<_>>>()?;
            (SampleSet::Trials(observed), SampleSet::Trials(samples))
        };

        let verdict = config
            .oracle()
            .evaluate(observed, expected_samples, config.alpha)?;

        let merged = merge(&counts);
        let observed_dist = estimator.estimate_space(&merged, &space)?;
        let total_variation = observed_dist.total_variation(&expected)?;
        let (loops, attempts) = results.iter().fold((0u64, 0u64), |(l, a), r| {
            (l + r.metadata.rus_loops, a + r.metadata.rus_attempts)
        });

        log::debug!(
            "{} [{:?}]: {} after {} × {} shots (TV = {:.4})",
            name,
            kind,
            verdict,
            trials,
            shots,
            total_variation
        );

        Ok(TestCaseReport {
            program: name.to_string(),
            kind,
            verdict,
            expected,
            observed: observed_dist,
            total_variation,
            shots_per_trial: shots,
            num_trials: trials,
            num_qubits: circuit.num_qubits(),
            gate_count: circuit.gate_count(),
            mean_rus_attempts: (loops > 0).then(|| attempts as f64 / loops as f64),
            elapsed_ms: start.elapsed().as_millis() as u64,
            layout: None,
        })
    }

    fn master_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }
}

/// Empirical distribution of label indices
fn empirical(samples: &[usize], len: usize) -> MstcResult<ProbabilityVector> {
    if samples.is_empty() {
        return Err(MstcError::InsufficientShots);
    }
    let mut values = vec![0.0; len];
    for &s in samples {
        values[s] += 1.0;
    }
    let n = samples.len() as f64;
    ProbabilityVector::new(values.into_iter().map(|v| v / n).collect())
}

fn merge(counts: &[Counts]) -> Counts {
    let mut merged = Counts::new();
    for c in counts {
        for (key, n) in c {
            *merged.entry(key.clone()).or_insert(0) += n;
        }
    }
    merged
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::CircuitProgram;
    use mstc_oracle::{AggregationPolicy, Correction, TableSpecification};

    fn increment_spec(n: usize) -> TableSpecification {
        let space = LabelSpace::binary(n).unwrap();
        TableSpecification::deterministic("inc", space, 1 << n, move |i| (i + 1) % (1 << n))
            .unwrap()
    }

    /// Increment that forgets the carry into the top bit
    fn carry_mutant(n: usize) -> CircuitProgram {
        let mut builder = CircuitBuilder::with_name(n, 0, "carry_mutant");
        for target in (1..n - 1).rev() {
            let below: Vec<usize> = (0..target).collect();
            builder = builder.mcx(mstc_core::Controls::new(below, (1 << target) - 1), target);
        }
        builder = builder.x(0);
        CircuitProgram::new("carry_mutant", builder.build(), n, (0..n).collect()).unwrap()
    }

    #[test]
    fn test_mstc_correct_program_passes() {
        let harness = TestHarness::ideal(8, TestConfig::default().with_seed(11));
        let program = CircuitProgram::increment(2).unwrap();
        let state = MixedState::identity(ProbabilityVector::uniform(4).unwrap());

        let report = harness
            .run_mstc(&program, &increment_spec(2), &state)
            .unwrap();
        assert!(report.passed(), "{}", report.verdict);
        assert_eq!(report.kind, CaseKind::Mixed);
        assert!(report.total_variation < 0.1);
        assert!(report.layout.is_some());
        assert!(report.mean_rus_attempts.is_none());
    }

    #[test]
    fn test_mstc_mutant_fails() {
        let harness = TestHarness::ideal(8, TestConfig::default().with_seed(12));
        let state = MixedState::identity(ProbabilityVector::uniform(8).unwrap());

        // 3 ↦ 0 and 7 ↦ 4 where 4 and 0 are expected
        let report = harness
            .run_mstc(&carry_mutant(3), &increment_spec(3), &state)
            .unwrap();
        // Uniform input hides the swap, but a skewed mixture exposes it
        assert!(report.total_variation < 0.1);

        let skewed = MixedState::identity(
            ProbabilityVector::new(vec![0.0, 0.0, 0.0, 0.7, 0.0, 0.0, 0.0, 0.3]).unwrap(),
        );
        let report = harness
            .run_mstc(&carry_mutant(3), &increment_spec(3), &skewed)
            .unwrap();
        assert!(!report.passed(), "{}", report.verdict);
    }

    #[test]
    fn test_pstc() {
        let harness = TestHarness::ideal(3, TestConfig::default().with_seed(5));
        let spec = increment_spec(3);

        let report = harness
            .run_pstc(&CircuitProgram::increment(3).unwrap(), &spec, 3)
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.kind, CaseKind::Pure);
        approx::assert_relative_eq!(report.observed.get(4), 1.0);

        let report = harness.run_pstc(&carry_mutant(3), &spec, 3).unwrap();
        assert!(!report.passed());

        assert!(harness
            .run_pstc(&CircuitProgram::increment(3).unwrap(), &spec, 8)
            .is_err());
    }

    #[test]
    fn test_rus_and_trials() {
        let config = TestConfig::separable_with_rus()
            .with_trials(6)
            .with_shots(400)
            .with_aggregation(AggregationPolicy::PerLabel {
                correction: Correction::Holm,
            })
            .with_seed(21);
        let harness = TestHarness::ideal(8, config);
        let state = MixedState::identity(ProbabilityVector::uniform(3).unwrap());

        let report = harness
            .run_mstc(&CircuitProgram::increment(2).unwrap(), &increment_spec(2), &state)
            .unwrap();
        assert_eq!(report.num_trials, 6);
        assert_eq!(report.verdict.label_tests.len(), 4);
        assert!(report.layout.as_ref().unwrap().flag.is_some());
        let mean = report.mean_rus_attempts.unwrap();
        assert!((mean - 4.0 / 3.0).abs() < 0.1, "mean attempts = {}", mean);
    }

    #[test]
    fn test_same_seed_reproduces() {
        let config = TestConfig::default().with_trials(3).with_seed(99);
        let harness = TestHarness::ideal(4, config);
        let state = MixedState::identity(ProbabilityVector::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap());
        let program = CircuitProgram::increment(2).unwrap();
        let spec = increment_spec(2);

        let a = harness.run_mstc(&program, &spec, &state).unwrap();
        let b = harness.run_mstc(&program, &spec, &state).unwrap();
        assert_eq!(a.observed, b.observed);
        assert_eq!(a.verdict, b.verdict);
    }

    fn identity(n: usize) -> CircuitProgram {
        CircuitProgram::new("identity", Circuit::new(n, 0), n, (0..n).collect()).unwrap()
    }

    #[test]
    fn test_disjoint_output_needs_enough_trials() {
        let spec = increment_spec(2);

        // Two trials per side can never reach p < 0.05
        let two = TestHarness::ideal(2, TestConfig::default().with_trials(2).with_seed(6));
        assert!(matches!(
            two.run_pstc(&identity(2), &spec, 2),
            Err(MstcError::InvalidConfig(_))
        ));

        let three = TestHarness::ideal(2, TestConfig::default().with_trials(3).with_seed(6));
        let report = three.run_pstc(&identity(2), &spec, 2).unwrap();
        approx::assert_relative_eq!(report.total_variation, 1.0);
        assert!(report.verdict.is_fail(), "{}", report.verdict);
    }

    #[test]
    fn test_per_label_trials_checked_against_label_count() {
        // Four trials suffice for one label but not after Holm over 16
        let config = TestConfig::per_label(4, Correction::Holm).with_seed(2);
        assert!(config.validate().is_ok());
        let harness = TestHarness::ideal(4, config);
        let result = harness.run_pstc(&CircuitProgram::increment(4).unwrap(), &increment_spec(4), 0);
        assert!(matches!(result, Err(MstcError::InvalidConfig(_))));
    }

    #[test]
    fn test_correct_mixed_case_false_alarm_rate() {
        // Sampling a prepared [0.5, 0.5] mixture matches direct sampling
        let harness = TestHarness::ideal(4, TestConfig::default().with_seed(2718));
        let program = identity(1);
        let space = LabelSpace::binary(1).unwrap();
        let spec = TableSpecification::deterministic("identity", space, 2, |i| i).unwrap();
        let cases = [TestCase {
            name: "identity/half".to_string(),
            program: &program,
            spec: &spec,
            input: CaseInput::Mixed(MixedState::identity(
                ProbabilityVector::uniform(2).unwrap(),
            )),
        }];

        let report = harness.run_suite(&cases, 300).unwrap();
        assert_eq!(report.cases[0].runs, 300);
        assert!(
            report.failure_rate <= 0.08,
            "false alarm rate {}",
            report.failure_rate
        );
    }

    #[test]
    fn test_shots_sweep_exposes_small_deviation() {
        // NOT gate that leaves 10% of the mass on the input value
        let angle = 2.0 * 0.9f64.sqrt().asin();
        let circuit = CircuitBuilder::new(1, 0).ry(0, angle).build();
        let mutant = CircuitProgram::new("leaky_not", circuit, 1, vec![0]).unwrap();
        let space = LabelSpace::binary(1).unwrap();
        let spec = TableSpecification::deterministic("not", space, 2, |i| 1 - i).unwrap();
        let cases = [TestCase {
            name: "leaky_not".to_string(),
            program: &mutant,
            spec: &spec,
            input: CaseInput::Pure(0),
        }];

        let harness = TestHarness::ideal(1, TestConfig::default().with_seed(31));
        let sweep = harness.run_shots_sweep(&cases, &[16, 4096], 10).unwrap();
        assert_eq!(sweep.len(), 2);
        assert_eq!(sweep[0].shots_per_trial, 16);
        assert_eq!(sweep[1].shots_per_trial, 4096);
        assert!(sweep[0].failure_rate < sweep[1].failure_rate);
        approx::assert_relative_eq!(sweep[1].failure_rate, 1.0);
        assert!(sweep[1].cases[0].mean_elapsed_ms >= 0.0);
        assert_eq!(sweep[1].cases[0].runs, 10);
    }

    #[test]
    fn test_suite_failure_rates() {
        let harness = TestHarness::ideal(8, TestConfig::default().with_seed(1));
        let correct = CircuitProgram::increment(3).unwrap();
        let mutant = carry_mutant(3);
        let spec = increment_spec(3);
        let cases = [
            TestCase {
                name: "correct/pure".to_string(),
                program: &correct,
                spec: &spec,
                input: CaseInput::Pure(7),
            },
            TestCase {
                name: "mutant/pure".to_string(),
                program: &mutant,
                spec: &spec,
                input: CaseInput::Pure(7),
            },
        ];

        let report = harness.run_suite(&cases, 4).unwrap();
        assert_eq!(report.cases[0].failures, 0);
        assert_eq!(report.cases[1].failures, 4);
        approx::assert_relative_eq!(report.cases[1].failure_rate, 1.0);
        approx::assert_relative_eq!(report.failure_rate, 0.5);
        assert!(report.to_json().unwrap().contains("mutant/pure"));
    }

    #[test]
    fn test_suite_counts_budget_errors() {
        let config = TestConfig::separable_with_rus()
            .with_max_attempts(1)
            .with_seed(8);
        let harness = TestHarness::ideal(8, config);
        let program = CircuitProgram::increment(2).unwrap();
        let spec = increment_spec(2);
        let skewed = ProbabilityVector::new(vec![0.97, 0.01, 0.01, 0.01]).unwrap();
        let cases = [TestCase {
            name: "skewed".to_string(),
            program: &program,
            spec: &spec,
            input: CaseInput::Mixed(MixedState::identity(skewed)),
        }];

        let report = harness.run_suite(&cases, 2).unwrap();
        assert_eq!(report.cases[0].errors, 2);
        assert_eq!(report.cases[0].runs, 0);
    }

    #[test]
    fn test_output_space_mismatch() {
        let harness = TestHarness::ideal(4, TestConfig::default().with_seed(2));
        let program = CircuitProgram::new(
            "one_output",
            CircuitBuilder::new(2, 0).gate(Gate::X(0)).build(),
            2,
            vec![0],
        )
        .unwrap();
        let result = harness.run_pstc(&program, &increment_spec(2), 0);
        assert!(matches!(
            result,
            Err(MstcError::LabelSpaceMismatch { .. })
        ));
    }
}
