//! Variable allocator (§4.1): hands out fresh propositional ids and pins the
//! two reserved constant bits every bit-encoder relies on.

use crate::error::Result;
use crate::oracle::SatOracle;
use crate::types::{Lit, VarId};

/// Thin wrapper around a [`SatOracle`]'s id space that pins `ONEBIT` /
/// `ZEROBIT` once at construction time.
#[derive(Debug, Clone, Copy)]
pub struct VarAllocator {
    one_bit: VarId,
    zero_bit: VarId,
}

impl VarAllocator {
    /// Allocate and pin `ONEBIT` (unit-true) and `ZEROBIT` (unit-false) on
    /// the given oracle.
    pub fn new(oracle: &mut impl SatOracle) -> Result<Self> {
        let one_bit = oracle.alloc(1);
        let zero_bit = oracle.alloc(1);
        oracle.add_clause(&[one_bit as Lit])?;
        oracle.add_clause(&[-(zero_bit as Lit)])?;
        Ok(Self { one_bit, zero_bit })
    }

    /// Allocate `n` fresh contiguous variable ids.
    pub fn alloc(&mut self, oracle: &mut impl SatOracle, n: u32) -> VarId {
        oracle.alloc(n)
    }

    /// The pinned unit-true variable.
    pub fn one_bit(&self) -> VarId {
        self.one_bit
    }

    /// The pinned unit-false variable.
    pub fn zero_bit(&self) -> VarId {
        self.zero_bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NaiveOracle;

    #[test]
    fn pins_one_and_zero() {
        let mut oracle = NaiveOracle::new();
        let alloc = VarAllocator::new(&mut oracle).unwrap();
        assert!(oracle.is_satisfiable());
        assert!(oracle.model(alloc.one_bit()));
        assert!(!oracle.model(alloc.zero_bit()));
    }
}
