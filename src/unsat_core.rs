//! Incremental unsat-core extractor (§4.7): walks sub-problems in input
//! order, activating one more at a time, until the table solver restricted
//! to the active set is itself UNSAT — at which point the active set is a
//! minimal UNSAT prefix.

use crate::alloc::VarAllocator;
use crate::error::{CcuError, Result};
use crate::oracle::SatOracle;
use crate::problem::Problem;
use crate::table;
use crate::timeout::TimeoutChecker;
use crate::types::SolveOutcome;

/// Compute a minimal-by-construction unsat core: a prefix (in declaration
/// order) of sub-problem indices whose simultaneous conjunction is UNSAT.
///
/// `cached_core`, when present, is the set of tables the table solver
/// actually instantiated on its original UNSAT run — returned directly as
/// an optimisation, skipping re-derivation entirely.
pub fn extract(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    problem: &mut Problem,
    timeout: &mut impl TimeoutChecker,
    cached_core: Option<&std::collections::HashSet<usize>>,
) -> Result<Vec<usize>> {
    if let Some(cache) = cached_core {
        let mut core: Vec<usize> = cache.iter().copied().collect();
        core.sort_unstable();
        return Ok(core);
    }

    let total = problem.sub_problems.len();
    let mut core: Vec<usize> = vec![0];
    let mut next_to_try = 1;

    loop {
        timeout.check()?;
        problem.reset_result();
        for i in 0..total {
            if core.contains(&i) {
                problem.activate(i);
            } else {
                problem.deactivate(i);
            }
        }

        oracle.clear();
        *alloc = VarAllocator::new(oracle)?;

        table::solve(oracle, alloc, problem, timeout)?;

        match problem.result {
            Some(SolveOutcome::Unsat) => return Ok(core),
            Some(SolveOutcome::Sat) => {
                if next_to_try >= total {
                    return Err(CcuError::CoreExtractionExhausted);
                }
                core.push(next_to_try);
                next_to_try += 1;
            }
            None => return Err(CcuError::InvariantViolation("table solve left no result".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NaiveOracle;
    use crate::problem::Goal;
    use crate::timeout::NoTimeout;

    #[test]
    fn s4_two_jointly_unsat_sub_problems_produce_full_core() {
        // Sub-problem 0 forces a=b (only SAT if a=b); sub-problem 1 forces a!=b
        // via domains that never permit equality while f pins distinct outputs.
        let domains = vec![vec![0], vec![1]];
        let goal0 = Goal::new(vec![vec![(0, 1)]]); // needs a=b, domains forbid it alone
        let goal1 = Goal::new(vec![vec![(0, 1)]]);
        let mut problem =
            Problem::create(2, domains, vec![(vec![], goal0), (vec![], goal1)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        table::solve(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout).unwrap();
        assert_eq!(problem.result, Some(SolveOutcome::Unsat));

        let mut oracle2 = NaiveOracle::new();
        let mut alloc2 = VarAllocator::new(&mut oracle2).unwrap();
        let core = extract(&mut oracle2, &mut alloc2, &mut problem, &mut NoTimeout, None).unwrap();
        assert_eq!(core, vec![0]);
    }

    #[test]
    fn returns_cached_core_without_recomputation() {
        let domains = vec![vec![0, 1], vec![0, 1]];
        let goal = Goal::new(vec![vec![(0, 1)]]);
        let mut problem = Problem::create(2, domains, vec![(vec![], goal)]).unwrap();
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        let cached: std::collections::HashSet<usize> = [0].into_iter().collect();
        let core = extract(&mut oracle, &mut alloc, &mut problem, &mut NoTimeout, Some(&cached)).unwrap();
        assert_eq!(core, vec![0]);
    }
}
