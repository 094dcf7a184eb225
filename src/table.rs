//! Table solver (§4.6): encodes a bounded unfolding of the congruence-closure
//! derivation directly into the clause database, one column per step, and
//! grows the unfolding until the goal is satisfiable or the derivation
//! saturates.
//!
//! Per sub-problem the encoding is only instantiated lazily, the first time
//! its goal does not already hold under the model the oracle happened to
//! find (§4.6 "why lazy table instantiation").

use std::collections::{HashMap, HashSet};

use crate::alloc::VarAllocator;
use crate::assignment::AssignmentVector;
use crate::bits::{term_eq_int, term_eq_term, term_eq_term_memo, term_gt_term, EqMemo};
use crate::cc::verify;
use crate::error::{CcuError, Result};
use crate::gates::{and, or};
use crate::oracle::SatOracle;
use crate::problem::Problem;
use crate::timeout::TimeoutChecker;
use crate::types::{ClauseHandle, Lit, SolveOutcome, TermId, VarId};

type Column = Vec<Vec<VarId>>;

fn domain_constraints_for_column(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    column: &Column,
    domains: &[Vec<TermId>],
) -> Result<()> {
    for (t, domain) in domains.iter().enumerate() {
        let mut disjuncts = Vec::with_capacity(domain.len());
        for &d in domain {
            disjuncts.push(term_eq_int(oracle, alloc, &column[t], d)? as Lit);
        }
        let satisfied = or(oracle, alloc, &disjuncts)? as Lit;
        oracle.add_clause(&[satisfied])?;
    }
    Ok(())
}

/// A candidate functionality-triggered rewrite: `v_bit` fires when `loser`'s
/// value is strictly greater than `winner`'s, and their arguments unify —
/// in which case row `loser` rewrites to `winner`'s value.
struct VEntry {
    v_bit: VarId,
    loser: TermId,
    winner: TermId,
}

/// One sub-problem's bounded unfolding: a growing sequence of columns plus
/// the most recently emitted V-set (used for the combined V-constraint).
pub struct Table {
    columns: Vec<Column>,
    last_v_bits: Vec<VarId>,
    goal_handle: Option<ClauseHandle>,
}

impl Table {
    /// `Fresh -> Column0 -> Column1`: wrap the shared global assignment as
    /// column 0, then immediately derive column 1.
    fn new(
        oracle: &mut impl SatOracle,
        alloc: &mut VarAllocator,
        problem: &Problem,
        sp_idx: usize,
        col0: &AssignmentVector,
    ) -> Result<Self> {
        let column0: Column = (0..col0.num_terms()).map(|t| col0.of(t).to_vec()).collect();
        let mut table = Self {
            columns: vec![column0],
            last_v_bits: Vec::new(),
            goal_handle: None,
        };
        table.add_derived_column(oracle, alloc, problem, sp_idx)?;
        Ok(table)
    }

    fn current(&self) -> &Column {
        self.columns.last().expect("table always has >=1 column")
    }

    /// Build column `c = columns.len()` from `columns[c-1]` per the four
    /// derived-column clause groups (§4.6 steps 1-5; step 5's canonical
    /// symmetry break is implemented as a pairwise mutual-exclusion among
    /// same-row rewrite candidates rather than the full allocation-order
    /// chain — see `DESIGN.md`).
    fn add_derived_column(
        &mut self,
        oracle: &mut impl SatOracle,
        alloc: &mut VarAllocator,
        problem: &Problem,
        sp_idx: usize,
    ) -> Result<()> {
        let prev = self.current().clone();
        let num_terms = prev.len();
        let width = prev[0].len();
        let domains = problem.domains();
        let sp = &problem.sub_problems[sp_idx];

        let new_col: Column = (0..num_terms)
            .map(|_| (0..width).map(|_| alloc.alloc(oracle, 1)).collect())
            .collect();

        // Step 3: V-set. Enumerate ordered pairs of equations sharing a
        // symbol/arity whose arguments are mutually unifiable under DQ.
        let mut v_entries: Vec<VEntry> = Vec::new();
        let mut eq_memo = EqMemo::new();
        for (i, e1) in sp.fun_eqs.iter().enumerate() {
            for (j, e2) in sp.fun_eqs.iter().enumerate() {
                if i == j || e1.symbol != e2.symbol || e1.args.len() != e2.args.len() {
                    continue;
                }
                let (r1, r2) = (e1.result, e2.result);
                if r1 == r2 {
                    continue;
                }
                let statically_unifiable = e1
                    .args
                    .iter()
                    .zip(&e2.args)
                    .all(|(&a, &b)| sp.dq.get(a, b));
                if !statically_unifiable {
                    continue;
                }
                let arg_bit = if e1.args.is_empty() {
                    alloc.one_bit() as Lit
                } else {
                    let mut lits = Vec::with_capacity(e1.args.len());
                    for (&a, &b) in e1.args.iter().zip(&e2.args) {
                        lits.push(term_eq_term_memo(oracle, alloc, &mut eq_memo, a, &prev[a], b, &prev[b])? as Lit);
                    }
                    and(oracle, alloc, &lits)? as Lit
                };
                let gt_bit = term_gt_term(oracle, alloc, &prev[r1], &prev[r2])? as Lit;
                let v_bit = and(oracle, alloc, &[arg_bit, gt_bit])?;
                v_entries.push(VEntry {
                    v_bit,
                    loser: r1,
                    winner: r2,
                });
            }
        }

        // Step 5: at most one rewrite candidate may fire per row.
        for a in 0..v_entries.len() {
            for b in (a + 1)..v_entries.len() {
                if v_entries[a].loser == v_entries[b].loser {
                    oracle.add_clause(&[-(v_entries[a].v_bit as Lit), -(v_entries[b].v_bit as Lit)])?;
                }
            }
        }

        let mut by_loser: HashMap<TermId, Vec<&VEntry>> = HashMap::new();
        for entry in &v_entries {
            by_loser.entry(entry.loser).or_default().push(entry);
        }

        for t in 0..num_terms {
            let rep_bit = term_eq_int(oracle, alloc, &prev[t], t)?;
            let rep_lit = rep_bit as Lit;
            let not_rep = crate::gates::not(oracle, alloc, rep_lit)? as Lit;

            // Step 1: non-representative carry.
            let carry_eq = term_eq_term(oracle, alloc, &new_col[t], &prev[t])? as Lit;
            oracle.add_clause(&[-not_rep, carry_eq])?;

            // Step 2: equivalence carry through DQ-compatible domain peers.
            for &u in &domains[t] {
                if u == t || !sp.dq.get(t, u) {
                    continue;
                }
                let at_u = term_eq_int(oracle, alloc, &prev[t], u)? as Lit;
                let eq_bit = term_eq_term(oracle, alloc, &new_col[t], &new_col[u])? as Lit;
                oracle.add_clause(&[-at_u, eq_bit])?;
            }

            // Step 4: representative commitment.
            let candidates = by_loser.get(&t).cloned().unwrap_or_default();
            let any_fire_lits: Vec<Lit> = candidates.iter().map(|e| e.v_bit as Lit).collect();
            let any_fire = or(oracle, alloc, &any_fire_lits)? as Lit;
            let no_fire = crate::gates::not(oracle, alloc, any_fire)? as Lit;
            let identity_cond = and(oracle, alloc, &[rep_lit, no_fire])? as Lit;
            let identity_eq = term_eq_int(oracle, alloc, &new_col[t], t)? as Lit;
            oracle.add_clause(&[-identity_cond, identity_eq])?;

            for entry in &candidates {
                let cond = and(oracle, alloc, &[entry.v_bit as Lit, rep_lit])? as Lit;
                let eq_bit = term_eq_term(oracle, alloc, &new_col[t], &new_col[entry.winner])? as Lit;
                oracle.add_clause(&[-cond, eq_bit])?;
            }
        }

        domain_constraints_for_column(oracle, alloc, &new_col, domains)?;

        self.last_v_bits = v_entries.iter().map(|e| e.v_bit).collect();
        self.columns.push(new_col);
        Ok(())
    }

    /// Push the goal constraint for this table's current column: a clause
    /// disjoining, over every sub-goal, the conjunction of `termEqTerm` on
    /// its pairs. An empty disjunction (no sub-goals at all) means this
    /// sub-problem's goal can never hold for any column — that's a
    /// structural fact, not a per-round one, so it's reported via the
    /// return value rather than pushed as an empty clause the oracle could
    /// never un-see.
    fn push_goal_constraint(&mut self, oracle: &mut impl SatOracle, alloc: &mut VarAllocator, sp: &crate::problem::SubProblem) -> Result<bool> {
        let col = self.current();
        let mut disjuncts = Vec::with_capacity(sp.goal.sub_goals.len());
        for sub_goal in &sp.goal.sub_goals {
            if sub_goal.is_empty() {
                disjuncts.push(alloc.one_bit() as Lit);
                continue;
            }
            let mut lits = Vec::with_capacity(sub_goal.len());
            for &(s, t) in sub_goal {
                lits.push(term_eq_term(oracle, alloc, &col[s], &col[t])? as Lit);
            }
            disjuncts.push(and(oracle, alloc, &lits)? as Lit);
        }
        if disjuncts.is_empty() {
            self.goal_handle = None;
            return Ok(false);
        }
        let handle = oracle.add_clause(&disjuncts)?;
        self.goal_handle = Some(handle);
        Ok(true)
    }

    fn pop_goal_constraint(&mut self, oracle: &mut impl SatOracle) {
        if let Some(h) = self.goal_handle.take() {
            oracle.remove_constr(h);
        }
    }
}

/// Run the table solver's main loop to completion. Returns the set of
/// sub-problem indices that were ever instantiated as tables — the
/// solver's unsat core on an UNSAT result.
pub fn solve(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    problem: &mut Problem,
    timeout: &mut impl TimeoutChecker,
) -> Result<HashSet<usize>> {
    let col0 = AssignmentVector::alloc(oracle, alloc, problem.num_terms(), problem.bits());
    col0.encode_domain_constraints(oracle, alloc, problem.domains())?;

    let mut tables: HashMap<usize, Table> = HashMap::new();
    let mut round = 0u64;

    loop {
        timeout.check()?;
        round += 1;
        #[cfg(feature = "logging")]
        log::trace!("table solver round {round}, {} instantiated tables", tables.len());

        let mut any_goal_vacuously_unsat = false;
        for (&idx, table) in tables.iter_mut() {
            if !table.push_goal_constraint(oracle, alloc, &problem.sub_problems[idx])? {
                any_goal_vacuously_unsat = true;
            }
        }

        // A sub-problem with an empty-disjunction goal can never be
        // satisfied by any column, so the round can't be SAT regardless of
        // what the oracle would say about the rest of the clause database.
        let is_sat = !any_goal_vacuously_unsat && oracle.is_satisfiable();

        for table in tables.values_mut() {
            table.pop_goal_constraint(oracle);
        }

        if is_sat {
            let int_assignment = col0.decode(oracle);
            let mut all_verified = true;
            for idx in problem.active_indices() {
                let sp = &problem.sub_problems[idx];
                if verify(problem.num_terms(), &int_assignment, &sp.fun_eqs, &sp.goal) {
                    continue;
                }
                all_verified = false;
                if !tables.contains_key(&idx) {
                    let table = Table::new(oracle, alloc, problem, idx, &col0)?;
                    tables.insert(idx, table);
                }
            }
            if all_verified {
                problem.result = Some(SolveOutcome::Sat);
                problem.int_assignment = int_assignment;
                return Ok(tables.keys().copied().collect());
            }
        } else {
            // Combined V-constraint: can any instantiated table still fire?
            let all_v_bits: Vec<Lit> = tables
                .values()
                .flat_map(|t| t.last_v_bits.iter().map(|&v| v as Lit))
                .collect();
            if all_v_bits.is_empty() {
                problem.result = Some(SolveOutcome::Unsat);
                return Ok(tables.keys().copied().collect());
            }
            let saturated = !v_constraint_satisfiable(oracle, &all_v_bits)?;
            if saturated {
                problem.result = Some(SolveOutcome::Unsat);
                return Ok(tables.keys().copied().collect());
            }
            for (&idx, table) in tables.iter_mut() {
                timeout.check()?;
                table.add_derived_column(oracle, alloc, problem, idx)?;
            }
        }
    }
}

/// Push the V-constraint (disjunction of every instantiated table's current
/// V-set) as a temporary assumption, check satisfiability, then pop it.
fn v_constraint_satisfiable(oracle: &mut impl SatOracle, v_bits: &[Lit]) -> Result<bool> {
    match oracle.add_clause(v_bits) {
        Ok(handle) => {
            let sat = oracle.is_satisfiable();
            oracle.remove_constr(handle);
            Ok(sat)
        }
        Err(CcuError::OracleContradiction) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NaiveOracle;
    use crate::problem::{FunEquation, Goal};
    use crate::timeout::NoTimeout;

    fn feq(sym: &str, args: Vec<TermId>, result: TermId) -> FunEquation {
        FunEquation {
            symbol: sym.to_string(),
            args,
            result,
        }
    }

    #[test]
    fn s1_direct_goal_is_sat_with_no_tables() {
        let domains = vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]];
        let goal = Goal::new(vec![vec![(0, 1)]]);
        let mut problem = Problem::create(3, domains, vec![(vec![], goal)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        let core = solve(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout).unwrap();
        assert_eq!(problem.result, Some(SolveOutcome::Sat));
        assert!(core.is_empty());
    }

    #[test]
    fn s6_empty_conjunction_sub_goal_is_sat_on_first_iteration() {
        let domains = vec![vec![0], vec![1]];
        let goal = Goal::new(vec![vec![]]);
        let mut problem = Problem::create(2, domains, vec![(vec![], goal)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        let core = solve(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout).unwrap();
        assert_eq!(problem.result, Some(SolveOutcome::Sat));
        assert!(core.is_empty());
    }

    #[test]
    fn s3_functionality_can_require_a_table() {
        // a,b,c,d: f(a)=c, f(b)=d; goal c=d, achievable by collapsing a,b.
        let domains = vec![vec![0, 1], vec![0, 1], vec![2, 3], vec![2, 3]];
        let fun_eqs = vec![feq("f", vec![0], 2), feq("f", vec![1], 3)];
        let goal = Goal::new(vec![vec![(2, 3)]]);
        let mut problem = Problem::create(4, domains, vec![(fun_eqs, goal)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        solve(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout).unwrap();
        assert_eq!(problem.result, Some(SolveOutcome::Sat));
    }

    #[test]
    fn empty_disjunction_sub_problem_is_unsat() {
        let domains = vec![vec![0], vec![1]];
        let goal = Goal::new(vec![]);
        let mut problem = Problem::create(2, domains, vec![(vec![], goal)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        solve(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout).unwrap();
        assert_eq!(problem.result, Some(SolveOutcome::Unsat));
    }
}
