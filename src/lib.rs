//! # ccu
//!
//! A decision procedure for simultaneous congruence-closure unification with
//! finite domains (CCU): given a family of independent sub-problems sharing
//! a common set of term variables, each supplying a finite domain per term,
//! a set of ground function-equations, and a disjunctive equality goal,
//! decide whether some assignment of terms to domain values exists such
//! that, under the congruence closure induced by every sub-problem's
//! function-equations, at least one sub-goal holds in every sub-problem.
//!
//! The engine reduces CCU to propositional SAT via a tabular incremental
//! encoding and exposes two interchangeable solver strategies:
//!
//! - [`Strategy::Lazy`]: a CEGAR loop that guesses a total model, verifies
//!   it by explicit congruence closure, and refines with a minimised
//!   blocking clause on failure.
//! - [`Strategy::Table`]: a bounded unfolding of the congruence-closure
//!   derivation encoded directly into the clause database.
//!
//! The crate is generic over the SAT backend via the [`oracle::SatOracle`]
//! trait; [`oracle::NaiveOracle`] is a small reference DPLL solver suitable
//! for tests and the bundled CLI, not production workloads.
//!
//! ## Example
//!
//! ```rust
//! use ccu::prelude::*;
//!
//! let mut solver = Solver::new(Strategy::Lazy, NaiveOracle::new());
//! let domains = vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]];
//! let goal = Goal::new(vec![vec![(0, 1)]]);
//! solver.create_problem(3, domains, vec![(vec![], goal)]).unwrap();
//! assert_eq!(solver.solve().unwrap(), SolveOutcome::Sat);
//! ```

pub mod alloc;
pub mod assignment;
pub mod bits;
pub mod cc;
pub mod document;
pub mod driver;
pub mod dq;
pub mod error;
pub mod gates;
pub mod lazy;
pub mod oracle;
pub mod problem;
pub mod table;
pub mod timeout;
pub mod types;
pub mod unsat_core;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::document::{LoadedProblem, ProblemDocument};
    pub use crate::driver::Solver;
    pub use crate::error::{CcuError, Result};
    pub use crate::oracle::{NaiveOracle, SatOracle};
    pub use crate::problem::{FunEquation, Goal, Problem, SubProblem};
    pub use crate::timeout::{DeadlineTimeout, NoTimeout, TimeoutChecker};
    pub use crate::types::{SolveOutcome, Strategy, TermId};
}

pub use driver::Solver;
pub use error::{CcuError, Result};
pub use types::{SolveOutcome, Strategy, TermId};
