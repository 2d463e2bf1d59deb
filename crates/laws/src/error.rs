//! Structural errors for witness construction.
//!
//! These fire fail-fast when a witness is assembled from incompatible
//! pieces and are never swallowed. Law *violations* are not errors:
//! every oracle returns a report with `holds == false` and attributed
//! failures instead of an `Err`, so a caller can run a whole battery of
//! checks in one pass.

use finstoch_algebra::AlgebraError;
use thiserror::Error;

/// Errors raised while building or evaluating law-checking witnesses.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LawError {
    /// The tail statistic's domain is not the prior's codomain.
    #[error("Statistic domain {stat} is not the prior codomain {prior}")]
    StatDomainMismatch { prior: String, stat: String },

    /// A finite marginal's projection domain is not the statistic's
    /// domain.
    #[error("Finite marginal {label}: projection domain does not match the statistic domain")]
    MarginalDomainMismatch { label: String },

    /// A joint kernel's domain is not the conditional witness's domain
    /// object.
    #[error("Joint kernel domain does not match the witness domain object")]
    JointDomainMismatch,

    /// A joint kernel's codomain does not decompose over the declared
    /// output objects.
    #[error("Joint codomain element {index} is not a {arity}-tuple over the output objects")]
    JointCodomainMismatch { index: usize, arity: usize },

    /// A symmetry whose index map is not a bijection.
    #[error("Permutation {label}: map is not a bijection on 0..{len}")]
    InvalidPermutation { label: String, len: usize },

    /// A symmetry sized for a different index set than the prior's.
    #[error("Permutation {label}: acts on {got} indices, prior configurations have {expected}")]
    PermutationLengthMismatch {
        label: String,
        expected: usize,
        got: usize,
    },

    /// A marginal coordinate outside the configuration length.
    #[error("Marginal {label}: coordinate {coord} out of range for configurations of length {len}")]
    CoordinateOutOfRange {
        label: String,
        coord: usize,
        len: usize,
    },

    /// A structural error surfaced by the underlying kernel algebra.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}
