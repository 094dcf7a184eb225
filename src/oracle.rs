//! The SAT oracle boundary.
//!
//! The decision procedure is generic over [`SatOracle`]: an incremental CNF
//! solver exposing `alloc / add_clause / remove_constr / is_satisfiable /
//! model / set_timeout_ms`. Hosts are expected to plug in their own
//! production CDCL solver; this module additionally ships [`NaiveOracle`], a
//! small chronological-backtracking reference implementation used by the
//! crate's own tests and by the CLI when no other oracle is configured.

use std::collections::BTreeMap;

use crate::error::{CcuError, Result};
use crate::types::{ClauseHandle, Lit, VarId};

/// The incremental SAT backend the engine drives.
///
/// Implementations own the propositional variable id space: every id handed
/// out by `alloc` must stay unique and valid until `reset`.
pub trait SatOracle {
    /// Return the first of `n` freshly allocated, contiguous variable ids.
    fn alloc(&mut self, n: u32) -> VarId;

    /// Add a permanent clause, returning a handle usable with
    /// [`remove_constr`](SatOracle::remove_constr). May fail with
    /// [`CcuError::OracleContradiction`] if the clause set becomes
    /// trivially unsatisfiable as a direct, synchronous consequence (e.g. a
    /// duplicate unit clause contradicting a prior one).
    fn add_clause(&mut self, literals: &[Lit]) -> Result<ClauseHandle>;

    /// Detach a previously added clause. No-op if already removed.
    fn remove_constr(&mut self, handle: ClauseHandle);

    /// Run the oracle. The result (and `model`) is valid until the next
    /// clause mutation.
    fn is_satisfiable(&mut self) -> bool;

    /// Last model's value for `var`. Only meaningful immediately after an
    /// `is_satisfiable` call that returned `true`.
    fn model(&self, var: VarId) -> bool;

    /// Set the time budget (milliseconds) for the next `is_satisfiable` call.
    /// Reference oracles may ignore this; production oracles should honor it.
    fn set_timeout_ms(&mut self, _timeout_ms: u64) {}

    /// Drop all clauses and model state, keeping the variable id space
    /// (mirrors the engine's own `reset`, which re-creates the oracle
    /// entirely in practice, but the method is provided for oracles that
    /// prefer to recycle internal buffers).
    fn clear(&mut self);
}

/// A small DPLL (unit-propagation + backtracking, no clause learning)
/// reference oracle. Intended for tests and for driving the CLI without a
/// host-supplied backend — not a performance-competitive CDCL solver.
#[derive(Debug, Default)]
pub struct NaiveOracle {
    next_var: VarId,
    next_handle: ClauseHandle,
    clauses: BTreeMap<ClauseHandle, Vec<Lit>>,
    model: Vec<bool>,
}

impl NaiveOracle {
    /// Create an empty oracle with no allocated variables.
    pub fn new() -> Self {
        Self {
            next_var: 1,
            next_handle: 0,
            clauses: BTreeMap::new(),
            model: Vec::new(),
        }
    }

    fn active_clauses(&self) -> Vec<&[Lit]> {
        self.clauses.values().map(|c| c.as_slice()).collect()
    }

    fn is_unsat_by_empty_clause(&self) -> bool {
        self.clauses.values().any(|c| c.is_empty())
    }
}

impl SatOracle for NaiveOracle {
    fn alloc(&mut self, n: u32) -> VarId {
        let first = self.next_var;
        self.next_var += n;
        first
    }

    fn add_clause(&mut self, literals: &[Lit]) -> Result<ClauseHandle> {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.clauses.insert(handle, literals.to_vec());
        if literals.is_empty() {
            return Err(CcuError::OracleContradiction);
        }
        Ok(handle)
    }

    fn remove_constr(&mut self, handle: ClauseHandle) {
        self.clauses.remove(&handle);
    }

    fn is_satisfiable(&mut self) -> bool {
        if self.is_unsat_by_empty_clause() {
            self.model.clear();
            return false;
        }
        let num_vars = (self.next_var.saturating_sub(1)) as usize;
        let clauses: Vec<Vec<Lit>> = self.active_clauses().into_iter().map(|c| c.to_vec()).collect();
        let mut assignment: Vec<Option<bool>> = vec![None; num_vars + 1];
        match dpll(&clauses, &mut assignment) {
            true => {
                self.model = vec![false; num_vars + 1];
                for (var, value) in assignment.into_iter().enumerate().skip(1) {
                    self.model[var] = value.unwrap_or(false);
                }
                true
            }
            false => {
                self.model.clear();
                false
            }
        }
    }

    fn model(&self, var: VarId) -> bool {
        self.model.get(var as usize).copied().unwrap_or(false)
    }

    fn clear(&mut self) {
        self.next_var = 1;
        self.next_handle = 0;
        self.clauses.clear();
        self.model.clear();
    }
}

/// Evaluate a clause under a partial assignment: `Some(true)` if satisfied,
/// `Some(false)` if falsified (every literal assigned and none true),
/// `None` if undetermined.
fn clause_status(clause: &[Lit], assignment: &[Option<bool>]) -> Option<bool> {
    let mut all_assigned = true;
    for &lit in clause {
        let var = lit.unsigned_abs() as usize;
        match assignment[var] {
            Some(v) => {
                let satisfied = if lit > 0 { v } else { !v };
                if satisfied {
                    return Some(true);
                }
            }
            None => all_assigned = false,
        }
    }
    if all_assigned {
        Some(false)
    } else {
        None
    }
}

/// Find a clause with exactly one unassigned literal and all others false —
/// return that literal for unit propagation.
fn find_unit(clauses: &[Vec<Lit>], assignment: &[Option<bool>]) -> Option<Lit> {
    for clause in clauses {
        let mut unassigned = None;
        let mut falsified_count = 0;
        let mut satisfied = false;
        for &lit in clause {
            let var = lit.unsigned_abs() as usize;
            match assignment[var] {
                Some(v) => {
                    let is_true = if lit > 0 { v } else { !v };
                    if is_true {
                        satisfied = true;
                        break;
                    } else {
                        falsified_count += 1;
                    }
                }
                None => {
                    if unassigned.is_some() {
                        unassigned = None;
                        break;
                    }
                    unassigned = Some(lit);
                }
            }
        }
        if !satisfied && falsified_count == clause.len() - 1 {
            if let Some(lit) = unassigned {
                return Some(lit);
            }
        }
    }
    None
}

fn dpll(clauses: &[Vec<Lit>], assignment: &mut Vec<Option<bool>>) -> bool {
    loop {
        if clauses
            .iter()
            .any(|c| clause_status(c, assignment) == Some(false))
        {
            return false;
        }
        if clauses
            .iter()
            .all(|c| clause_status(c, assignment) == Some(true))
        {
            return true;
        }
        match find_unit(clauses, assignment) {
            Some(lit) => {
                let var = lit.unsigned_abs() as usize;
                assignment[var] = Some(lit > 0);
            }
            None => break,
        }
    }

    let var = match assignment.iter().skip(1).position(|v| v.is_none()) {
        Some(idx) => idx + 1,
        None => return clauses.iter().all(|c| clause_status(c, assignment) == Some(true)),
    };

    for value in [true, false] {
        assignment[var] = Some(value);
        if dpll(clauses, assignment) {
            return true;
        }
    }
    assignment[var] = None;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_and_solves_a_trivial_formula() {
        let mut oracle = NaiveOracle::new();
        let x = oracle.alloc(1);
        let y = oracle.alloc(1);
        oracle.add_clause(&[x as Lit, y as Lit]).unwrap();
        oracle.add_clause(&[-(x as Lit), y as Lit]).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(y));
    }

    #[test]
    fn detects_unsat() {
        let mut oracle = NaiveOracle::new();
        let x = oracle.alloc(1);
        oracle.add_clause(&[x as Lit]).unwrap();
        oracle.add_clause(&[-(x as Lit)]).unwrap();
        assert!(!oracle.is_satisfiable());
    }

    #[test]
    fn remove_constr_restores_satisfiability() {
        let mut oracle = NaiveOracle::new();
        let x = oracle.alloc(1);
        oracle.add_clause(&[x as Lit]).unwrap();
        let h = oracle.add_clause(&[-(x as Lit)]).unwrap();
        assert!(!oracle.is_satisfiable());
        oracle.remove_constr(h);
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(x));
    }
}
