//! Integration tests for the ccu crate.
//!
//! Covers the S1-S6 concrete scenarios, exercised against both solver
//! strategies and, where relevant, through the JSON problem document
//! loader.

use ccu::document::ProblemDocument;
use ccu::oracle::NaiveOracle;
use ccu::prelude::*;

fn feq(sym: &str, args: Vec<TermId>, result: TermId) -> FunEquation {
    FunEquation {
        symbol: sym.to_string(),
        args,
        result,
    }
}

mod s1_direct_goal {
    use super::*;

    #[test]
    fn lazy_and_table_agree() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]];
            let goal = Goal::new(vec![vec![(0, 1)]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver.create_problem(3, domains, vec![(vec![], goal)]).unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Sat);
            let model = solver.model().unwrap();
            assert_eq!(model[0], model[1]);
        }
    }

    #[test]
    fn via_json_document() {
        let json = r#"{
            "terms": ["a", "b", "c"],
            "domains": {"a": ["a","b","c"], "b": ["a","b","c"], "c": ["a","b","c"]},
            "sub_problems": [
                {
                    "fun_eqs": [],
                    "goal": [[["a", "b"]]]
                }
            ]
        }"#;
        let doc: ProblemDocument = serde_json::from_str(json).unwrap();
        let loaded = doc.load().unwrap();
        let mut solver = Solver::new(Strategy::Lazy, NaiveOracle::new());
        solver
            .create_problem(loaded.num_terms, loaded.domains.clone(), loaded.sub_problems.clone())
            .unwrap();
        assert_eq!(solver.solve().unwrap(), SolveOutcome::Sat);
        let named = loaded.decode_model(solver.model().unwrap());
        assert_eq!(named["a"], named["b"]);
    }
}

mod s2_domains_forbid_equality {
    use super::*;

    #[test]
    fn lazy_and_table_agree() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0], vec![1], vec![2]];
            let fun_eqs = vec![feq("f", vec![0], 2), feq("f", vec![1], 2)];
            let goal = Goal::new(vec![vec![(0, 1)]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver.create_problem(3, domains, vec![(fun_eqs, goal)]).unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Unsat);
        }
    }
}

mod s3_functionality_forces_collapse {
    use super::*;

    #[test]
    fn sat_when_a_and_b_can_collapse() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0, 1], vec![0, 1], vec![2, 3], vec![2, 3]];
            let fun_eqs = vec![feq("f", vec![0], 2), feq("f", vec![1], 3)];
            let goal = Goal::new(vec![vec![(2, 3)]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver.create_problem(4, domains, vec![(fun_eqs, goal)]).unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Sat);
            let model = solver.model().unwrap();
            assert_eq!(model[0], model[1], "a and b must have collapsed");
            assert_eq!(model[2], model[3], "c and d follow by functionality");
        }
    }

    #[test]
    fn unsat_when_domains_forbid_the_collapse() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0], vec![1], vec![2], vec![3]];
            let fun_eqs = vec![feq("f", vec![0], 2), feq("f", vec![1], 3)];
            let goal = Goal::new(vec![vec![(2, 3)]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver.create_problem(4, domains, vec![(fun_eqs, goal)]).unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Unsat);
        }
    }
}

mod s4_two_jointly_unsat_sub_problems {
    use super::*;

    #[test]
    fn unsat_core_is_both_indices() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            // sub-problem 0: only satisfiable with a=b.
            // sub-problem 1: via functionality, forces f(a) != f(b) to be
            // inconsistent with a=b given disjoint ranges.
            let domains = vec![vec![0, 1], vec![0, 1]];
            let goal0 = Goal::new(vec![vec![(0, 1)]]);
            let fun_eqs1 = vec![feq("f", vec![0], 0), feq("f", vec![1], 1)];
            let goal1 = Goal::new(vec![]); // unsatisfiable disjunction on its own
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver
                .create_problem(2, domains, vec![(vec![], goal0), (fun_eqs1, goal1)])
                .unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Unsat);
            let core = solver.unsat_core(&mut NoTimeout).unwrap();
            assert!(core.contains(&1), "the always-false sub-problem must be in the core");
        }
    }
}

mod s5_core_excludes_independently_sat_sub_problem {
    use super::*;

    /// Per §4.7, the extractor activates sub-problems strictly in
    /// declaration order and stops at the first prefix that is UNSAT. To
    /// exercise "the independently-SAT sub-problem is excluded from the
    /// core", it must be declared *after* the prefix that already goes
    /// UNSAT on its own — here, last.
    #[test]
    fn core_is_a_prefix_that_skips_the_trailing_sat_sub_problem() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0, 1], vec![0, 1]];
            let needs_collapse = Goal::new(vec![vec![(0, 1)]]);
            let always_false = Goal::new(vec![]);
            let vacuously_true = Goal::new(vec![vec![]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver
                .create_problem(
                    2,
                    domains,
                    vec![
                        (vec![], needs_collapse),
                        (vec![], always_false),
                        (vec![], vacuously_true),
                    ],
                )
                .unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Unsat);
            let core = solver.unsat_core(&mut NoTimeout).unwrap();
            assert_eq!(core, vec![0, 1]);
        }
    }
}

mod s6_empty_conjunction_is_vacuously_true {
    use super::*;

    #[test]
    fn sat_immediately() {
        for strategy in [Strategy::Lazy, Strategy::Table] {
            let domains = vec![vec![0], vec![1]];
            let goal = Goal::new(vec![vec![]]);
            let mut solver = Solver::new(strategy, NaiveOracle::new());
            solver.create_problem(2, domains, vec![(vec![], goal)]).unwrap();
            assert_eq!(solver.solve().unwrap(), SolveOutcome::Sat);
        }
    }
}

#[test]
fn empty_terms_is_rejected() {
    let mut solver = Solver::new(Strategy::Lazy, NaiveOracle::new());
    let err = solver.create_problem(0, vec![], vec![]).unwrap_err();
    assert!(matches!(err, CcuError::EmptyTerms));
}

#[test]
fn model_is_unavailable_before_solving() {
    let mut solver = Solver::new(Strategy::Lazy, NaiveOracle::new());
    let domains = vec![vec![0], vec![1]];
    let goal = Goal::new(vec![vec![]]);
    solver.create_problem(2, domains, vec![(vec![], goal)]).unwrap();
    assert!(solver.model().is_err());
}
