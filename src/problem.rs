//! Problem data model (§3): the multi-sub-problem container, its
//! function-equations and goals, and the activation / cached-result state
//! the solvers and driver share.

use serde::{Deserialize, Serialize};

use crate::dq::DisequalityMatrix;
use crate::error::{CcuError, Result};
use crate::types::{bits_required, SolveOutcome, TermId};

/// A ground function-equation `f(a1..an) = r`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunEquation {
    pub symbol: String,
    pub args: Vec<TermId>,
    pub result: TermId,
}

/// A disjunctive goal: a set of conjunctive sub-goals, each a list of
/// equality pairs. An empty sub-goal is vacuously satisfied; an empty
/// disjunction (no sub-goals at all) is UNSAT for the owning sub-problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub sub_goals: Vec<Vec<(TermId, TermId)>>,
}

impl Goal {
    pub fn new(sub_goals: Vec<Vec<(TermId, TermId)>>) -> Self {
        Self { sub_goals }
    }
}

/// One independent sub-problem: its own domains, function-equations, goal,
/// and precomputed disequality matrix, plus activation state used by
/// incremental unsat-core extraction.
#[derive(Debug, Clone)]
pub struct SubProblem {
    pub fun_eqs: Vec<FunEquation>,
    pub goal: Goal,
    pub dq: DisequalityMatrix,
    pub active: bool,
}

impl SubProblem {
    fn new(num_terms: usize, domains: &[Vec<TermId>], fun_eqs: Vec<FunEquation>, goal: Goal) -> Self {
        let mut dq = DisequalityMatrix::new(num_terms, domains);
        dq.disequality_check(&fun_eqs);
        Self {
            fun_eqs,
            goal,
            dq,
            active: true,
        }
    }
}

/// Ordered collection of sub-problems sharing a common `terms` universe and
/// bit width, with cached solve state.
#[derive(Debug, Clone)]
pub struct Problem {
    num_terms: usize,
    bits: u32,
    domains: Vec<Vec<TermId>>,
    pub sub_problems: Vec<SubProblem>,
    pub result: Option<SolveOutcome>,
    pub int_assignment: Vec<TermId>,
}

impl Problem {
    /// Validate and install a multi-sub-problem.
    ///
    /// `domains[t]` lists the term ids `t` may be assigned to; every domain
    /// must include `t` itself (the representative case) and reference only
    /// in-bounds term ids. Each entry of `sub_problems` is `(fun_eqs, goal)`.
    pub fn create(
        num_terms: usize,
        domains: Vec<Vec<TermId>>,
        sub_problems: Vec<(Vec<FunEquation>, Goal)>,
    ) -> Result<Self> {
        if num_terms == 0 {
            return Err(CcuError::EmptyTerms);
        }
        if domains.len() != num_terms {
            return Err(CcuError::InvariantViolation(format!(
                "expected {num_terms} domains, got {}",
                domains.len()
            )));
        }
        for (t, dom) in domains.iter().enumerate() {
            if !dom.contains(&t) {
                return Err(CcuError::InvalidDomain {
                    term: t,
                    reason: "domain must contain the term itself".to_string(),
                });
            }
            for &d in dom {
                if d >= num_terms {
                    return Err(CcuError::TermOutOfBounds {
                        id: d,
                        num_terms,
                    });
                }
            }
        }
        let bits = bits_required(num_terms);
        let mut installed = Vec::with_capacity(sub_problems.len());
        for (fun_eqs, goal) in sub_problems {
            for eq in &fun_eqs {
                for &a in &eq.args {
                    if a >= num_terms {
                        return Err(CcuError::TermOutOfBounds { id: a, num_terms });
                    }
                }
                if eq.result >= num_terms {
                    return Err(CcuError::TermOutOfBounds {
                        id: eq.result,
                        num_terms,
                    });
                }
            }
            for sub_goal in &goal.sub_goals {
                for &(s, t) in sub_goal {
                    if s >= num_terms || t >= num_terms {
                        return Err(CcuError::TermOutOfBounds {
                            id: s.max(t),
                            num_terms,
                        });
                    }
                }
            }
            installed.push(SubProblem::new(num_terms, &domains, fun_eqs, goal));
        }
        Ok(Self {
            num_terms,
            bits,
            domains,
            sub_problems: installed,
            result: None,
            int_assignment: Vec::new(),
        })
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn domains(&self) -> &[Vec<TermId>] {
        &self.domains
    }

    pub fn activate(&mut self, index: usize) {
        if let Some(sp) = self.sub_problems.get_mut(index) {
            sp.active = true;
        }
    }

    pub fn deactivate(&mut self, index: usize) {
        if let Some(sp) = self.sub_problems.get_mut(index) {
            sp.active = false;
        }
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.sub_problems
            .iter()
            .enumerate()
            .filter(|(_, sp)| sp.active)
            .map(|(i, _)| i)
            .collect()
    }

    /// Reset cached solve state, keeping the installed sub-problems and
    /// their domains intact (mirrors a fresh `reset` on the owning solver).
    pub fn reset_result(&mut self) {
        self.result = None;
        self.int_assignment.clear();
        for sp in &mut self.sub_problems {
            sp.active = true;
        }
    }
}
