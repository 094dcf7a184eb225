//! Shared assignment-vector machinery (§3, §4.5 step 1-2, §4.6 column 0):
//! allocating a `bits`-wide propositional vector per term, encoding the
//! domain constraint that a term's value bits must name an element of its
//! domain, and decoding a SAT model back to integer term ids.

use crate::alloc::VarAllocator;
use crate::bits::term_eq_int;
use crate::error::Result;
use crate::gates::or;
use crate::oracle::SatOracle;
use crate::types::{Lit, TermId, VarId};

/// Per-term `bits`-wide vectors of propositional variable ids, little-endian
/// against the index of the assigned term in `terms`.
#[derive(Debug, Clone)]
pub struct AssignmentVector {
    bits: Vec<Vec<VarId>>,
}

impl AssignmentVector {
    /// Allocate a fresh `width`-wide vector for each of `num_terms` terms.
    pub fn alloc(oracle: &mut impl SatOracle, alloc: &mut VarAllocator, num_terms: usize, width: u32) -> Self {
        let bits = (0..num_terms)
            .map(|_| (0..width).map(|_| alloc.alloc(oracle, 1)).collect())
            .collect();
        Self { bits }
    }

    pub fn of(&self, term: TermId) -> &[VarId] {
        &self.bits[term]
    }

    pub fn num_terms(&self) -> usize {
        self.bits.len()
    }

    /// For each term, constrain its value bits to encode the index of some
    /// element of its domain: `OR_{d in domain(t)} termEqInt(bits(t), d)`.
    pub fn encode_domain_constraints(
        &self,
        oracle: &mut impl SatOracle,
        alloc: &mut VarAllocator,
        domains: &[Vec<TermId>],
    ) -> Result<()> {
        for (t, domain) in domains.iter().enumerate() {
            let mut disjuncts = Vec::with_capacity(domain.len());
            for &d in domain {
                disjuncts.push(term_eq_int(oracle, alloc, self.of(t), d)? as Lit);
            }
            let satisfied = or(oracle, alloc, &disjuncts)? as Lit;
            oracle.add_clause(&[satisfied])?;
        }
        Ok(())
    }

    /// Decode the oracle's last model into term ids, interpreting each
    /// term's bit vector as a little-endian binary index into `terms`.
    pub fn decode(&self, oracle: &impl SatOracle) -> Vec<TermId> {
        self.bits
            .iter()
            .map(|bits| {
                bits.iter()
                    .enumerate()
                    .filter(|(_, &v)| oracle.model(v))
                    .fold(0usize, |acc, (k, _)| acc | (1 << k))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NaiveOracle;

    #[test]
    fn domain_constraint_restricts_decoded_value_to_domain() {
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        let vec = AssignmentVector::alloc(&mut oracle, &mut alloc, 3, 2);
        let domains = vec![vec![0], vec![1, 2], vec![1, 2]];
        vec.encode_domain_constraints(&mut oracle, &mut alloc, &domains)
            .unwrap();
        assert!(oracle.is_satisfiable());
        let decoded = vec.decode(&oracle);
        assert_eq!(decoded[0], 0);
        assert!(decoded[1] == 1 || decoded[1] == 2);
        assert!(decoded[2] == 1 || decoded[2] == 2);
    }

    #[test]
    fn decode_round_trips_a_pinned_value() {
        let mut oracle = NaiveOracle::new();
        let mut alloc = VarAllocator::new(&mut oracle).unwrap();
        let vec = AssignmentVector::alloc(&mut oracle, &mut alloc, 1, 3);
        let e = term_eq_int(&mut oracle, &mut alloc, vec.of(0), 5).unwrap();
        oracle.add_clause(&[e as Lit]).unwrap();
        assert!(oracle.is_satisfiable());
        assert_eq!(vec.decode(&oracle)[0], 5);
    }
}
