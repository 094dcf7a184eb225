//! Lazy / CEGAR solver (§4.5): guess a total model, verify every sub-problem
//! by explicit congruence closure, and on the first rejection add a
//! minimised blocking clause ruling out the spurious model.

use std::collections::HashSet;

use crate::alloc::VarAllocator;
use crate::assignment::AssignmentVector;
use crate::bits::{term_eq_term_memo, EqMemo};
use crate::cc::{same_class_pairs, verify};
use crate::error::{CcuError, Result};
use crate::oracle::SatOracle;
use crate::problem::Problem;
use crate::timeout::TimeoutChecker;
use crate::types::{Lit, SolveOutcome, TermId};

/// Run the CEGAR loop to completion, mutating `problem` with the cached
/// result and (on SAT) the decoded integer assignment. Returns the set of
/// sub-problem indices that ever contributed a blocking clause — the
/// lazy solver's unsat core on an UNSAT result.
pub fn solve(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    problem: &mut Problem,
    timeout: &mut impl TimeoutChecker,
) -> Result<HashSet<usize>> {
    let assignments = AssignmentVector::alloc(oracle, alloc, problem.num_terms(), problem.bits());
    assignments.encode_domain_constraints(oracle, alloc, problem.domains())?;

    let mut memo = EqMemo::new();
    let mut core = HashSet::new();

    let mut iteration = 0u64;
    loop {
        timeout.check()?;
        iteration += 1;
        #[cfg(feature = "logging")]
        log::trace!("lazy solver iteration {iteration}, {} blocking clauses so far", core.len());

        if !oracle.is_satisfiable() {
            #[cfg(feature = "logging")]
            log::debug!("lazy solver: oracle UNSAT after {iteration} iterations");
            problem.result = Some(SolveOutcome::Unsat);
            return Ok(core);
        }

        let int_assignment = assignments.decode(oracle);

        let rejected = problem
            .active_indices()
            .into_iter()
            .find(|&i| {
                let sp = &problem.sub_problems[i];
                !verify(problem.num_terms(), &int_assignment, &sp.fun_eqs, &sp.goal)
            });

        let Some(idx) = rejected else {
            #[cfg(feature = "logging")]
            log::debug!("lazy solver: SAT after {iteration} iterations");
            problem.result = Some(SolveOutcome::Sat);
            problem.int_assignment = int_assignment;
            return Ok(core);
        };

        #[cfg(feature = "logging")]
        log::trace!("lazy solver: sub-problem {idx} rejected the candidate model, refining");
        core.insert(idx);
        let blocking_pairs = blocking_pairs_for(problem, idx, &int_assignment, timeout)?;

        let mut disjuncts = Vec::with_capacity(blocking_pairs.len());
        for (s, t) in blocking_pairs {
            let bit = term_eq_term_memo(
                oracle,
                alloc,
                &mut memo,
                s,
                assignments.of(s),
                t,
                assignments.of(t),
            )?;
            disjuncts.push(bit as Lit);
        }

        match oracle.add_clause(&disjuncts) {
            Ok(_) => {}
            Err(CcuError::OracleContradiction) => {
                problem.result = Some(SolveOutcome::Unsat);
                return Ok(core);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Build the minimised set of term pairs whose equality must be forced to
/// rule out the current spurious model for sub-problem `idx`.
fn blocking_pairs_for(
    problem: &mut Problem,
    idx: usize,
    int_assignment: &[TermId],
    timeout: &mut impl TimeoutChecker,
) -> Result<Vec<(TermId, TermId)>> {
    let num_terms = problem.num_terms();
    let sp = &mut problem.sub_problems[idx];
    let collapsed: HashSet<(TermId, TermId)> =
        same_class_pairs(num_terms, int_assignment, &sp.fun_eqs).into_iter().collect();

    sp.dq.disequality_check(&sp.fun_eqs);
    for &(s, t) in &collapsed {
        timeout.check()?;
        sp.dq.cascade_remove(s, t, &sp.fun_eqs);
    }
    sp.dq.minimise(&sp.goal.sub_goals, &sp.fun_eqs);
    timeout.check()?;

    let mut pairs: HashSet<(TermId, TermId)> = sp
        .dq
        .get_ineq()
        .into_iter()
        .filter(|&(s, t)| !sp.dq.is_base_disequality(s, t))
        .collect();

    // The DQ-derived set above only catches pairs whose structural path to
    // equality got retracted by this model's own collapses. When the
    // rejected model collapses nothing at all (same_class_pairs is empty),
    // that set is empty too even though a goal pair is still disequal —
    // include the goal's own currently-disequal pairs directly so the
    // blocking clause is never spuriously empty and always forces progress
    // toward satisfying some sub-goal.
    for sub_goal in &sp.goal.sub_goals {
        for &(s, t) in sub_goal {
            let pair = if s <= t { (s, t) } else { (t, s) };
            if !collapsed.contains(&pair) {
                pairs.insert(pair);
            }
        }
    }

    Ok(pairs.into_iter().collect())
}
