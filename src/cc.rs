//! Reference congruence-closure verifier (§4.4): an external semantic check
//! used by the lazy solver (to decide which sub-problem to refine next) and
//! available to the table solver as a cross-check on decoded models.

use crate::problem::{FunEquation, Goal};
use crate::types::TermId;

/// Union-find with path compression and union by size.
struct UnionFind {
    parent: Vec<TermId>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, x: TermId) -> TermId {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: TermId, b: TermId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            self.parent[ra] = rb;
            self.size[rb] += self.size[ra];
        } else {
            self.parent[rb] = ra;
            self.size[ra] += self.size[rb];
        }
    }
}

/// Build the congruence closure of `assignment` (each term unioned with its
/// assigned value) under `fun_eqs`, and return the resulting union-find.
fn close(num_terms: usize, assignment: &[TermId], fun_eqs: &[FunEquation]) -> UnionFind {
    let mut uf = UnionFind::new(num_terms);
    for (t, &v) in assignment.iter().enumerate() {
        uf.union(t, v);
    }
    loop {
        let mut changed = false;
        for i in 0..fun_eqs.len() {
            for j in (i + 1)..fun_eqs.len() {
                let (e1, e2) = (&fun_eqs[i], &fun_eqs[j]);
                if e1.symbol != e2.symbol || e1.args.len() != e2.args.len() {
                    continue;
                }
                let args_match = e1
                    .args
                    .iter()
                    .zip(&e2.args)
                    .all(|(&a, &b)| uf.find(a) == uf.find(b));
                if args_match && uf.find(e1.result) != uf.find(e2.result) {
                    uf.union(e1.result, e2.result);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    uf
}

/// True iff, under the congruence closure of `assignment` and `fun_eqs`,
/// at least one sub-goal of `goal` holds (every pair in the sub-goal ends
/// up in the same class). An empty sub-goal is vacuously satisfied.
pub fn verify(num_terms: usize, assignment: &[TermId], fun_eqs: &[FunEquation], goal: &Goal) -> bool {
    let mut uf = close(num_terms, assignment, fun_eqs);
    goal.sub_goals
        .iter()
        .any(|sub_goal| sub_goal.iter().all(|&(s, t)| uf.find(s) == uf.find(t)))
}

/// Unordered pairs `(s, t)` with `s < t` that end up in the same class under
/// the closure — used by the lazy solver to drive `cascadeRemoveDQ`.
pub fn same_class_pairs(
    num_terms: usize,
    assignment: &[TermId],
    fun_eqs: &[FunEquation],
) -> Vec<(TermId, TermId)> {
    let mut uf = close(num_terms, assignment, fun_eqs);
    let mut out = Vec::new();
    for s in 0..num_terms {
        for t in (s + 1)..num_terms {
            if uf.find(s) == uf.find(t) {
                out.push((s, t));
            }
        }
    }
    out
}
