use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ccu::document::{LoadedProblem, ProblemDocument};
use ccu::oracle::NaiveOracle;
use ccu::timeout::DeadlineTimeout;
use ccu::{Solver, SolveOutcome};
use serde_json::json;

use crate::cli::{CheckArgs, CoreArgs, SolveArgs, StrategyArg};
use crate::output::{fmt_dim, fmt_sat, fmt_section, fmt_unsat, OutputConfig};

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read problem document from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))
    }
}

fn load_document(input: &Path) -> Result<LoadedProblem> {
    let text = read_input(input)?;
    let doc: ProblemDocument =
        serde_json::from_str(&text).context("problem document is not valid JSON")?;
    doc.load().context("problem document failed validation")
}

fn run_timeout(timeout_ms: Option<u64>) -> DeadlineTimeout {
    let budget = timeout_ms.map(Duration::from_millis).unwrap_or(Duration::from_secs(3600));
    DeadlineTimeout::from_now(budget)
}

pub fn check(args: &CheckArgs, out: &OutputConfig) -> Result<()> {
    let loaded = load_document(&args.input)?;
    out.note(&format!(
        "{} {} terms, {} sub-problems",
        fmt_section("ok:"),
        loaded.num_terms,
        loaded.sub_problems.len()
    ));
    out.emit_with_default_name(
        "check",
        &format!("{}", fmt_sat("valid")),
        &json!({"valid": true, "num_terms": loaded.num_terms, "sub_problems": loaded.sub_problems.len()}),
    )
}

pub fn solve(args: &SolveArgs, out: &OutputConfig) -> Result<()> {
    let loaded = load_document(&args.input)?;
    let strategy: ccu::Strategy = args.strategy.into();
    let mut solver = Solver::new(strategy, NaiveOracle::new());
    solver
        .create_problem(loaded.num_terms, loaded.domains.clone(), loaded.sub_problems.clone())
        .context("problem rejected by the engine")?;

    let mut timeout = run_timeout(args.timeout_ms);
    let outcome = solver
        .solve_with(&mut timeout)
        .context("solve failed")?;

    match outcome {
        SolveOutcome::Sat => {
            let model = solver.model().expect("SAT result implies a model");
            let named = loaded.decode_model(model);
            let human = format!(
                "{}\n{}",
                fmt_sat("SAT"),
                named
                    .iter()
                    .map(|(k, v)| format!("  {k} = {}", fmt_dim(v)))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            out.emit_with_default_name("solve", &human, &json!({"result": "sat", "model": named}))
        }
        SolveOutcome::Unsat => {
            out.emit_with_default_name("solve", &fmt_unsat("UNSAT"), &json!({"result": "unsat"}))
        }
    }
}

pub fn core(args: &CoreArgs, out: &OutputConfig) -> Result<()> {
    let loaded = load_document(&args.input)?;
    let strategy: ccu::Strategy = args.strategy.into();
    let mut solver = Solver::new(strategy, NaiveOracle::new());
    solver
        .create_problem(loaded.num_terms, loaded.domains.clone(), loaded.sub_problems.clone())
        .context("problem rejected by the engine")?;

    let mut timeout = run_timeout(args.timeout_ms);
    let outcome = solver.solve_with(&mut timeout).context("solve failed")?;

    match outcome {
        SolveOutcome::Sat => {
            out.note("problem is SAT; there is no unsat core to report");
            out.emit_with_default_name("core", &fmt_sat("SAT (no core)"), &json!({"result": "sat"}))
        }
        SolveOutcome::Unsat => {
            let core = solver.unsat_core(&mut timeout).context("unsat-core extraction failed")?;
            let human = format!(
                "{}\n  sub-problems: {}",
                fmt_unsat("UNSAT"),
                core.iter().map(usize::to_string).collect::<Vec<_>>().join(", ")
            );
            out.emit_with_default_name("core", &human, &json!({"result": "unsat", "core": core}))
        }
    }
}
