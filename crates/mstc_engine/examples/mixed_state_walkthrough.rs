//! Mixed-state testing of an increment circuit
//!
//! Runs one correct program and one mutant against the same specification,
//! first with pure inputs, then with a single mixed-state test case, and
//! then as a repeated suite and a sweep over shot counts.

use anyhow::Result;
use mstc_core::{CircuitBuilder, Controls, LabelSpace, ProbabilityVector};
use mstc_engine::prelude::*;

fn carry_mutant() -> Result<CircuitProgram> {
    // Drops the carry into qubit 2
    let circuit = CircuitBuilder::with_name(3, 0, "carry_mutant")
        .mcx(Controls::new(vec![0], 1), 1)
        .x(0)
        .try_build()?;
    Ok(CircuitProgram::new("carry_mutant", circuit, 3, vec![0, 1, 2])?)
}

fn main() -> Result<()> {
    let space = LabelSpace::binary(3)?;
    let spec = TableSpecification::deterministic("increment", space, 8, |i| (i + 1) % 8)?;
    let correct = CircuitProgram::increment(3)?;
    let mutant = carry_mutant()?;

    let config = TestConfig::default().with_seed(2024);
    let harness = TestHarness::ideal(10, config.clone());
    println!("{}", config);

    // Pure-state cases need one run per input
    println!("\n== Pure-state cases ==");
    for input in 0..8 {
        let report = harness.run_pstc(&mutant, &spec, input)?;
        println!("  input {}: {}", input, report.verdict);
    }

    // One mixed-state case covers every input at once
    println!("\n== Mixed-state case ==");
    let state = MixedState::identity(ProbabilityVector::new(vec![
        0.05, 0.05, 0.05, 0.35, 0.05, 0.05, 0.05, 0.35,
    ])?);
    for program in [&correct, &mutant] {
        let report = harness.run_mstc(program, &spec, &state)?;
        println!(
            "  {:<14} {}  (TV = {:.4}, {} qubits, {} gates)",
            program.name(),
            report.verdict,
            report.total_variation,
            report.num_qubits,
            report.gate_count
        );
    }

    // Separable control vocabulary falls back to repeat-until-success
    println!("\n== Repeat-until-success ==");
    let rus = TestHarness::ideal(10, TestConfig::separable_with_rus().with_seed(7));
    let report = rus.run_mstc(&correct, &spec, &state)?;
    println!(
        "  {}  mean attempts = {:.3}",
        report.verdict,
        report.mean_rus_attempts.unwrap_or(1.0)
    );

    println!("\n== Suite ==");
    let cases = [
        TestCase {
            name: "increment".to_string(),
            program: &correct,
            spec: &spec,
            input: CaseInput::Mixed(state.clone()),
        },
        TestCase {
            name: "carry_mutant".to_string(),
            program: &mutant,
            spec: &spec,
            input: CaseInput::Mixed(state),
        },
    ];
    let suite = harness.run_suite(&cases, 20)?;
    for case in &suite.cases {
        println!(
            "  {:<14} failure rate {:.2} ({} errors)",
            case.name, case.failure_rate, case.errors
        );
    }
    println!("\n{}", suite.to_json()?);

    // More shots resolve smaller deviations
    println!("\n== Shots sweep ==");
    for report in harness.run_shots_sweep(&cases, &[64, 1024], 10)? {
        println!(
            "  {:>5} shots: failure rate {:.2}",
            report.shots_per_trial, report.failure_rate
        );
    }

    Ok(())
}
