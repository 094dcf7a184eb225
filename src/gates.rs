//! Tseitin gate translator (§4.1): emits clauses making a fresh output bit
//! logically equivalent to a boolean combination of input literals.

use crate::alloc::VarAllocator;
use crate::error::Result;
use crate::oracle::SatOracle;
use crate::types::{Lit, VarId};

fn neg(lit: Lit) -> Lit {
    -lit
}

/// `y <-> AND(inputs)`. An empty input list yields a gate pinned true.
pub fn and(oracle: &mut impl SatOracle, alloc: &mut VarAllocator, inputs: &[Lit]) -> Result<VarId> {
    let y = alloc.alloc(oracle, 1);
    let yl = y as Lit;
    if inputs.is_empty() {
        oracle.add_clause(&[yl])?;
        return Ok(y);
    }
    for &x in inputs {
        oracle.add_clause(&[neg(yl), x])?;
    }
    let mut big = vec![yl];
    big.extend(inputs.iter().map(|&x| neg(x)));
    oracle.add_clause(&big)?;
    Ok(y)
}

/// `y <-> OR(inputs)`. An empty input list yields a gate pinned false.
pub fn or(oracle: &mut impl SatOracle, alloc: &mut VarAllocator, inputs: &[Lit]) -> Result<VarId> {
    let y = alloc.alloc(oracle, 1);
    let yl = y as Lit;
    if inputs.is_empty() {
        oracle.add_clause(&[neg(yl)])?;
        return Ok(y);
    }
    for &x in inputs {
        oracle.add_clause(&[yl, neg(x)])?;
    }
    let mut big = vec![neg(yl)];
    big.extend(inputs.iter().copied());
    oracle.add_clause(&big)?;
    Ok(y)
}

/// `y <-> (a <-> b)`.
pub fn iff(oracle: &mut impl SatOracle, alloc: &mut VarAllocator, a: Lit, b: Lit) -> Result<VarId> {
    let y = alloc.alloc(oracle, 1);
    let yl = y as Lit;
    oracle.add_clause(&[neg(yl), neg(a), b])?;
    oracle.add_clause(&[neg(yl), a, neg(b)])?;
    oracle.add_clause(&[yl, a, b])?;
    oracle.add_clause(&[yl, neg(a), neg(b)])?;
    Ok(y)
}

/// `y <-> NOT x`.
pub fn not(oracle: &mut impl SatOracle, alloc: &mut VarAllocator, x: Lit) -> Result<VarId> {
    let y = alloc.alloc(oracle, 1);
    let yl = y as Lit;
    oracle.add_clause(&[neg(yl), neg(x)])?;
    oracle.add_clause(&[yl, x])?;
    Ok(y)
}

/// Force `y` false via a unit clause.
pub fn gate_false(oracle: &mut impl SatOracle, y: VarId) -> Result<()> {
    oracle.add_clause(&[-(y as Lit)])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NaiveOracle;

    fn setup() -> (NaiveOracle, VarAllocator) {
        let mut oracle = NaiveOracle::new();
        let alloc = VarAllocator::new(&mut oracle).unwrap();
        (oracle, alloc)
    }

    #[test]
    fn and_gate_is_conjunction() {
        let (mut oracle, mut alloc) = setup();
        let a = alloc.alloc(&mut oracle, 1) as Lit;
        let b = alloc.alloc(&mut oracle, 1) as Lit;
        let y = and(&mut oracle, &mut alloc, &[a, b]).unwrap();
        oracle.add_clause(&[a]).unwrap();
        oracle.add_clause(&[-b]).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(y));
    }

    #[test]
    fn or_gate_is_disjunction() {
        let (mut oracle, mut alloc) = setup();
        let a = alloc.alloc(&mut oracle, 1) as Lit;
        let b = alloc.alloc(&mut oracle, 1) as Lit;
        let y = or(&mut oracle, &mut alloc, &[a, b]).unwrap();
        oracle.add_clause(&[-a]).unwrap();
        oracle.add_clause(&[-b]).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(y));
    }

    #[test]
    fn iff_gate_matches_equivalence() {
        let (mut oracle, mut alloc) = setup();
        let a = alloc.alloc(&mut oracle, 1) as Lit;
        let b = alloc.alloc(&mut oracle, 1) as Lit;
        let y = iff(&mut oracle, &mut alloc, a, b).unwrap();
        oracle.add_clause(&[a]).unwrap();
        oracle.add_clause(&[-b]).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(y));
    }

    #[test]
    fn gate_false_pins_output() {
        let (mut oracle, mut alloc) = setup();
        let y = alloc.alloc(&mut oracle, 1);
        gate_false(&mut oracle, y).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(!oracle.model(y));
    }
}
