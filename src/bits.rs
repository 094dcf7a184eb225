//! Bit-encoding primitives (§4.2): `termEqInt`, `termEqTerm`, `termGtTerm`.
//!
//! These operate on plain bit vectors (little-endian, LSB first) rather
//! than on the table's column structure directly, so both the lazy
//! solver's single assignment vector and the table solver's per-column
//! vectors can share one implementation.

use std::collections::HashMap;

use crate::alloc::VarAllocator;
use crate::error::Result;
use crate::gates::{and, iff, not, or};
use crate::oracle::SatOracle;
use crate::types::{Lit, TermId, VarId};

/// Symmetric memoisation table for `termEqTerm`, keyed by unordered term
/// pair, scoped to one column (or to the single assignment vector for the
/// lazy solver, which has exactly one "column").
#[derive(Debug, Default)]
pub struct EqMemo {
    cache: HashMap<(TermId, TermId), VarId>,
}

impl EqMemo {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: TermId, b: TermId) -> (TermId, TermId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// `e <-> (value(bits) = index)`, via per-bit negate-or-keep against the
/// binary expansion of `index`, conjoined.
pub fn term_eq_int(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    bits: &[VarId],
    index: usize,
) -> Result<VarId> {
    let lits: Vec<Lit> = bits
        .iter()
        .enumerate()
        .map(|(k, &v)| {
            let vl = v as Lit;
            if (index >> k) & 1 == 1 {
                vl
            } else {
                -vl
            }
        })
        .collect();
    and(oracle, alloc, &lits)
}

/// `e <-> AND_i (bit_i(a) <-> bit_i(b))`, zero-padding the shorter vector
/// with `ZEROBIT` on the high side.
pub fn term_eq_term(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    a: &[VarId],
    b: &[VarId],
) -> Result<VarId> {
    let width = a.len().max(b.len());
    let zero = alloc.zero_bit() as Lit;
    let mut per_bit = Vec::with_capacity(width);
    for k in 0..width {
        let al = a.get(k).map(|&v| v as Lit).unwrap_or(zero);
        let bl = b.get(k).map(|&v| v as Lit).unwrap_or(zero);
        per_bit.push(iff(oracle, alloc, al, bl)? as Lit);
    }
    and(oracle, alloc, &per_bit)
}

/// Memoised `termEqTerm`: returns the cached bit for `(term_a, term_b)`
/// within this column if one was already emitted.
pub fn term_eq_term_memo(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    memo: &mut EqMemo,
    term_a: TermId,
    bits_a: &[VarId],
    term_b: TermId,
    bits_b: &[VarId],
) -> Result<VarId> {
    let key = EqMemo::key(term_a, term_b);
    if let Some(&cached) = memo.cache.get(&key) {
        return Ok(cached);
    }
    let e = term_eq_term(oracle, alloc, bits_a, bits_b)?;
    memo.cache.insert(key, e);
    Ok(e)
}

/// `e <-> (value(a) > value(b))` as unsigned integers, high-to-low rolling
/// comparison.
///
/// The spec's literal chain formula for `m_bits[b]` contains a redundant
/// disjunct (`bit_gt_b ∨ (e_bits[b-1] ∧ bit_gt_b)`, which collapses to
/// `bit_gt_b` alone by absorption and would make the comparator ignore
/// higher-order bits entirely — see `DESIGN.md`). This implementation uses
/// the corrected, standard rolling comparator: a lower bit can only flip
/// `m` to true when every higher bit was still tied.
pub fn term_gt_term(
    oracle: &mut impl SatOracle,
    alloc: &mut VarAllocator,
    a: &[VarId],
    b: &[VarId],
) -> Result<VarId> {
    let width = a.len().max(b.len());
    let zero = alloc.zero_bit() as Lit;
    let mut e_prev = alloc.one_bit() as Lit;
    let mut m_prev = alloc.zero_bit() as Lit;
    for k in (0..width).rev() {
        let al = a.get(k).map(|&v| v as Lit).unwrap_or(zero);
        let bl = b.get(k).map(|&v| v as Lit).unwrap_or(zero);
        let not_bl = not(oracle, alloc, bl)? as Lit;
        let bit_gt = and(oracle, alloc, &[al, not_bl])? as Lit;
        let bit_eq = iff(oracle, alloc, al, bl)? as Lit;
        let e_k = and(oracle, alloc, &[e_prev, bit_eq])? as Lit;
        let guarded_gt = and(oracle, alloc, &[e_prev, bit_gt])? as Lit;
        let m_k = or(oracle, alloc, &[guarded_gt, m_prev])? as Lit;
        e_prev = e_k;
        m_prev = m_k;
    }
    // m_prev is already a gate output literal (positive, since `or` always
    // returns a fresh positive var); recover its VarId.
    Ok(m_prev as VarId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::VarAllocator;
    use crate::oracle::NaiveOracle;

    fn setup() -> (NaiveOracle, VarAllocator) {
        let mut oracle = NaiveOracle::new();
        let alloc = VarAllocator::new(&mut oracle).unwrap();
        (oracle, alloc)
    }

    fn fresh_bits(oracle: &mut NaiveOracle, alloc: &mut VarAllocator, width: u32) -> Vec<VarId> {
        (0..width).map(|_| alloc.alloc(oracle, 1)).collect()
    }

    fn fix(oracle: &mut NaiveOracle, bits: &[VarId], value: usize) {
        for (k, &v) in bits.iter().enumerate() {
            let lit = if (value >> k) & 1 == 1 {
                v as Lit
            } else {
                -(v as Lit)
            };
            oracle.add_clause(&[lit]).unwrap();
        }
    }

    #[test]
    fn term_eq_int_matches_binary_expansion() {
        let (mut oracle, mut alloc) = setup();
        let bits = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_eq_int(&mut oracle, &mut alloc, &bits, 5).unwrap();
        fix(&mut oracle, &bits, 5);
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(e));
    }

    #[test]
    fn term_eq_int_false_on_mismatch() {
        let (mut oracle, mut alloc) = setup();
        let bits = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_eq_int(&mut oracle, &mut alloc, &bits, 5).unwrap();
        fix(&mut oracle, &bits, 2);
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(e));
    }

    #[test]
    fn term_eq_term_true_when_equal_values() {
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 3);
        let b = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_eq_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 4);
        fix(&mut oracle, &b, 4);
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(e));
    }

    #[test]
    fn term_eq_term_false_when_different_values() {
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 3);
        let b = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_eq_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 4);
        fix(&mut oracle, &b, 5);
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(e));
    }

    #[test]
    fn term_gt_term_true_when_strictly_greater() {
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 3);
        let b = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_gt_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 5);
        fix(&mut oracle, &b, 2);
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(e));
    }

    #[test]
    fn term_gt_term_false_when_equal() {
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 3);
        let b = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_gt_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 3);
        fix(&mut oracle, &b, 3);
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(e));
    }

    #[test]
    fn term_gt_term_false_when_smaller() {
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 3);
        let b = fresh_bits(&mut oracle, &mut alloc, 3);
        let e = term_gt_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 1);
        fix(&mut oracle, &b, 6);
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(e));
    }

    #[test]
    fn term_gt_term_low_bit_cannot_override_high_bit_tie_break() {
        // Regression test for the absorption bug in the spec's literal
        // m_bits formula: a=01 (1), b=10 (2). The MSB alone decides this
        // (left < right), so a lower-order bit_gt must not flip the result.
        let (mut oracle, mut alloc) = setup();
        let a = fresh_bits(&mut oracle, &mut alloc, 2);
        let b = fresh_bits(&mut oracle, &mut alloc, 2);
        let e = term_gt_term(&mut oracle, &mut alloc, &a, &b).unwrap();
        fix(&mut oracle, &a, 0b01);
        fix(&mut oracle, &b, 0b10);
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(e));
    }
}
