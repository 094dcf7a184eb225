//! Shared solve driver (§3 "Lifecycle", §6 Core API): problem installation,
//! strategy dispatch, model decoding, reset and unsat-core access wired
//! against a concrete [`SatOracle`] and [`TimeoutChecker`].

use std::collections::HashSet;

use crate::alloc::VarAllocator;
use crate::error::{CcuError, Result};
use crate::lazy;
use crate::oracle::SatOracle;
use crate::problem::{FunEquation, Goal, Problem};
use crate::table;
use crate::timeout::{NoTimeout, TimeoutChecker};
use crate::types::{SolveOutcome, Strategy, TermId};
use crate::unsat_core;

/// Top-level engine: owns the SAT oracle and variable allocator, and drives
/// exactly one installed [`Problem`] through `solve` / `model` / `unsatCore`
/// per the documented lifecycle (`createProblem` once, `solve` once,
/// `unsatCore` only after UNSAT, `reset` to start over).
pub struct Solver<O: SatOracle> {
    strategy: Strategy,
    oracle: O,
    alloc: Option<VarAllocator>,
    problem: Option<Problem>,
    cached_core: Option<HashSet<usize>>,
}

impl<O: SatOracle> Solver<O> {
    /// Construct an engine around a fresh oracle, choosing which of the two
    /// strategies (§9 "Variants") will drive every subsequent `solve`.
    pub fn new(strategy: Strategy, oracle: O) -> Self {
        Self {
            strategy,
            oracle,
            alloc: None,
            problem: None,
            cached_core: None,
        }
    }

    /// Install a multi-sub-problem. May only be called once per instance
    /// (or once per `reset`); installing validates `domains` and every
    /// sub-problem's term references per §7.
    pub fn create_problem(
        &mut self,
        num_terms: usize,
        domains: Vec<Vec<TermId>>,
        sub_problems: Vec<(Vec<FunEquation>, Goal)>,
    ) -> Result<()> {
        if self.problem.is_some() {
            return Err(CcuError::InvariantViolation(
                "createProblem called twice without an intervening reset".to_string(),
            ));
        }
        let problem = Problem::create(num_terms, domains, sub_problems)?;
        let alloc = VarAllocator::new(&mut self.oracle)?;
        self.alloc = Some(alloc);
        self.problem = Some(problem);
        self.cached_core = None;
        Ok(())
    }

    /// Run the configured strategy to completion against a caller-supplied
    /// timeout checker.
    pub fn solve_with(&mut self, timeout: &mut impl TimeoutChecker) -> Result<SolveOutcome> {
        let alloc = self
            .alloc
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("solve called before createProblem".to_string()))?;
        let problem = self
            .problem
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("solve called before createProblem".to_string()))?;

        let core = match self.strategy {
            Strategy::Lazy => lazy::solve(&mut self.oracle, alloc, problem, timeout)?,
            Strategy::Table => table::solve(&mut self.oracle, alloc, problem, timeout)?,
        };
        self.cached_core = Some(core);
        problem
            .result
            .clone()
            .ok_or_else(|| CcuError::InvariantViolation("strategy returned without a result".to_string()))
    }

    /// Run the configured strategy with no timeout.
    pub fn solve(&mut self) -> Result<SolveOutcome> {
        self.solve_with(&mut NoTimeout)
    }

    /// Re-solve the current problem after sub-problem activation toggles.
    /// Table-solver only, since the lazy solver has no persistent table
    /// state for activation to act on.
    pub fn solve_again(&mut self) -> Result<SolveOutcome> {
        if self.strategy != Strategy::Table {
            return Err(CcuError::InvariantViolation(
                "solveAgain is only meaningful for the table strategy".to_string(),
            ));
        }
        self.problem
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("solveAgain called before createProblem".to_string()))?
            .reset_result();
        self.solve()
    }

    /// Mapping term -> assigned term, valid only after a SAT result.
    pub fn model(&self) -> Result<&[TermId]> {
        let problem = self
            .problem
            .as_ref()
            .ok_or_else(|| CcuError::InvariantViolation("model called before createProblem".to_string()))?;
        match problem.result {
            Some(SolveOutcome::Sat) => Ok(&problem.int_assignment),
            _ => Err(CcuError::InvariantViolation(
                "model called without a prior SAT result".to_string(),
            )),
        }
    }

    /// Subset of sub-problem indices whose simultaneous conjunction is
    /// itself UNSAT. Valid only after an UNSAT result.
    pub fn unsat_core(&mut self, timeout: &mut impl TimeoutChecker) -> Result<Vec<usize>> {
        let cached = self.cached_core.clone();
        let problem = self
            .problem
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("unsatCore called before createProblem".to_string()))?;
        match problem.result {
            Some(SolveOutcome::Unsat) => {}
            Some(SolveOutcome::Sat) => {
                return Err(CcuError::InvariantViolation(
                    "unsatCore called after a SAT result".to_string(),
                ))
            }
            None => {
                return Err(CcuError::InvariantViolation(
                    "unsatCore called before solve".to_string(),
                ))
            }
        }
        let alloc = self.alloc.as_mut().expect("problem installed implies alloc installed");
        let extraction = unsat_core::extract(&mut self.oracle, alloc, problem, timeout, cached.as_ref());
        // Per §5 cancellation semantics: a timed-out extraction conservatively
        // falls back to the full set of sub-problem indices.
        match extraction {
            Ok(core) => Ok(core),
            Err(CcuError::Timeout) => Ok((0..problem.sub_problems.len()).collect()),
            Err(e) => Err(e),
        }
    }

    pub fn activate_problem(&mut self, index: usize) -> Result<()> {
        self.problem
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("activateProblem called before createProblem".to_string()))?
            .activate(index);
        Ok(())
    }

    pub fn deactivate_problem(&mut self, index: usize) -> Result<()> {
        self.problem
            .as_mut()
            .ok_or_else(|| CcuError::InvariantViolation("deactivateProblem called before createProblem".to_string()))?
            .deactivate(index);
        Ok(())
    }

    /// Release all installed problem and allocator state. The oracle itself
    /// is cleared too, since the engine owns it exclusively (§5 "Shared
    /// resources").
    pub fn reset(&mut self) {
        self.oracle.clear();
        self.alloc = None;
        self.problem = None;
        self.cached_core = None;
    }
}
