//! Disequality propagator (§4.3): the symmetric boolean matrix `DQ` used to
//! bound the lazy solver's search and to minimise its blocking clauses.
//!
//! `eq[s][t] == true` means "s and t may be equal" (no disequality is
//! currently enforced between them); `eq[s][t] == false` means a
//! disequality is enforced. The matrix is stored as a flat `bitvec` over
//! `n * n` row-major bits, matching the teacher lineage's preference for
//! `bitvec` as compact boolean state.

use std::collections::HashSet;

use bitvec::prelude::*;

use crate::problem::FunEquation;
use crate::types::TermId;

/// Symmetric boolean matrix over terms tracking which pairs may still be
/// equal under the sub-problem's domains and function-equations.
#[derive(Debug, Clone)]
pub struct DisequalityMatrix {
    n: usize,
    /// `eq[s][t] == true` from domain compatibility alone — never retracted.
    base: BitVec,
    /// Current (possibly cascade-reduced) relation.
    eq: BitVec,
    /// Pairs explicitly forced to `false` beyond the domain-incompatible
    /// base, via `cascade_remove`. Re-deriving from `base` plus these
    /// pinned exclusions is how retraction is propagated (see `recompute`).
    forced_zero: HashSet<(TermId, TermId)>,
}

fn key(s: TermId, t: TermId) -> (TermId, TermId) {
    if s <= t {
        (s, t)
    } else {
        (t, s)
    }
}

impl DisequalityMatrix {
    /// Build the initial matrix: `eq[s][t] = 1` iff `t` is in `s`'s domain
    /// and `s` is in `t`'s domain.
    pub fn new(n: usize, domains: &[Vec<TermId>]) -> Self {
        let mut base = bitvec![0; n * n];
        for (s, dom) in domains.iter().enumerate() {
            for &t in dom {
                if t < n && domains.get(t).is_some_and(|dt| dt.contains(&s)) {
                    base.set(s * n + t, true);
                    base.set(t * n + s, true);
                }
            }
        }
        let eq = base.clone();
        Self {
            n,
            base,
            eq,
            forced_zero: HashSet::new(),
        }
    }

    /// Current value of `eq[s][t]`.
    pub fn get(&self, s: TermId, t: TermId) -> bool {
        self.eq[s * self.n + t]
    }

    fn set_eq(&mut self, s: TermId, t: TermId, value: bool) {
        self.eq.set(s * self.n + t, value);
        self.eq.set(t * self.n + s, value);
    }

    /// Run the functionality + two-result-transitivity fixpoint from
    /// `base`, honoring any pairs already pinned to zero by
    /// `cascade_remove`. This both implements `disequalityCheck` (called
    /// with no pinned exclusions) and re-derives the relation after a
    /// retraction.
    fn recompute(&mut self, fun_eqs: &[FunEquation]) {
        self.eq = self.base.clone();
        for &(s, t) in &self.forced_zero {
            self.set_eq(s, t, false);
        }
        loop {
            let mut changed = false;
            for i in 0..fun_eqs.len() {
                for j in (i + 1)..fun_eqs.len() {
                    let (e1, e2) = (&fun_eqs[i], &fun_eqs[j]);
                    if e1.symbol != e2.symbol || e1.args.len() != e2.args.len() {
                        continue;
                    }
                    let (r1, r2) = (e1.result, e2.result);
                    if r1 == r2 || self.get(r1, r2) {
                        continue;
                    }
                    if self.forced_zero.contains(&key(r1, r2)) {
                        continue;
                    }
                    let args_match = e1.args.iter().zip(&e2.args).all(|(&a, &b)| self.get(a, b));
                    if args_match {
                        self.set_eq(r1, r2, true);
                        changed = true;
                        for i2 in 0..self.n {
                            if !self.get(r1, i2) {
                                continue;
                            }
                            for j2 in 0..self.n {
                                if self.get(r2, j2)
                                    && !self.get(i2, j2)
                                    && !self.forced_zero.contains(&key(i2, j2))
                                {
                                    self.set_eq(i2, j2, true);
                                    changed = true;
                                }
                            }
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Fixpoint closure of the initial (domain-only) matrix under
    /// functionality and the bounded two-result transitivity step.
    pub fn disequality_check(&mut self, fun_eqs: &[FunEquation]) {
        self.forced_zero.clear();
        self.recompute(fun_eqs);
    }

    /// Force `eq[s][t] := 0` and propagate the retraction through every
    /// functionality pair whose conclusion depended on it.
    pub fn cascade_remove(&mut self, s: TermId, t: TermId, fun_eqs: &[FunEquation]) {
        self.forced_zero.insert(key(s, t));
        self.recompute(fun_eqs);
    }

    /// Shrink the current disequality set to a hitting set over `sub_goals`:
    /// greedily drop each forced-zero pair whose removal still leaves
    /// every sub-goal underivable.
    pub fn minimise(&mut self, sub_goals: &[Vec<(TermId, TermId)>], fun_eqs: &[FunEquation]) {
        let candidates: Vec<(TermId, TermId)> = self.forced_zero.iter().copied().collect();
        for cand in candidates {
            self.forced_zero.remove(&cand);
            self.recompute(fun_eqs);
            if !self.blocks_all(sub_goals) {
                self.forced_zero.insert(cand);
                self.recompute(fun_eqs);
            }
        }
    }

    fn blocks_all(&self, sub_goals: &[Vec<(TermId, TermId)>]) -> bool {
        sub_goals
            .iter()
            .all(|sub_goal| sub_goal.iter().any(|&(s, t)| !self.get(s, t)))
    }

    /// All pairs `(s, t)` with `s < t` currently enforced disequal.
    pub fn get_ineq(&self) -> Vec<(TermId, TermId)> {
        let mut out = Vec::new();
        for s in 0..self.n {
            for t in (s + 1)..self.n {
                if !self.get(s, t) {
                    out.push((s, t));
                }
            }
        }
        out
    }

    /// True if `(s, t)` is disequal purely because of domain incompatibility
    /// (independent of any model or functionality derivation).
    pub fn is_base_disequality(&self, s: TermId, t: TermId) -> bool {
        !self.base[s * self.n + t]
    }
}
