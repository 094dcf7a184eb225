//! Error types for the ccu library.

use thiserror::Error;

/// Errors that can occur while loading or solving a CCU problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CcuError {
    /// `createProblem` was given an empty `terms` sequence.
    #[error("empty terms: a problem must declare at least one term")]
    EmptyTerms,

    /// A term id referenced out of the declared `terms` bound.
    #[error("term id {id} out of bounds: declared {num_terms} terms")]
    TermOutOfBounds { id: usize, num_terms: usize },

    /// A domain referenced a term id outside `terms`, or violated the
    /// `t in domains(t)` invariant.
    #[error("invalid domain for term {term}: {reason}")]
    InvalidDomain { term: usize, reason: String },

    /// The timeout checker raised an abort condition mid-solve.
    #[error("solve aborted: timeout")]
    Timeout,

    /// Adding a clause to the SAT oracle raised a synchronous contradiction.
    #[error("oracle contradiction while adding a clause")]
    OracleContradiction,

    /// A programmer error: violated a documented precondition of the API.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Incremental unsat-core extraction activated every sub-problem and
    /// still observed SAT, contradicting the original UNSAT result.
    #[error("unsat-core extraction exhausted all sub-problems without reproducing UNSAT")]
    CoreExtractionExhausted,
}

/// Result type alias for ccu operations.
pub type Result<T> = std::result::Result<T, CcuError>;
