//! # Laws - Oracles for Markov-Category Structure
//!
//! This crate certifies categorical laws of finite stochastic maps
//! built with `finstoch-algebra`: determinism and thunkability
//! recognizers, the copy/discard comonoid laws, conditional
//! independence against a supplied witness, permutation invariance, and
//! the Kolmogorov and Hewitt–Savage zero-one oracles, following the
//! treatment in Tobias Fritz's "Markov categories".
//!
//! ## Core Concepts
//!
//! - **Laws are checked, not assumed**: every oracle enumerates the
//!   finite objects involved and reports each violation it finds
//! - **Structural errors fail fast**: mis-wired objects and malformed
//!   witnesses are `Err(LawError)`, never a `holds: false` verdict
//! - **Violations are data**: a failed law comes back as a report with
//!   the inputs, points, and weights that broke it
//! - **Tolerance is explicit**: comparisons go through the semiring's
//!   `eq_within` at the tolerance carried in [`CheckOptions`]
//!
//! ## Example: a pure function is thunkable
//!
//! ```rust
//! use finstoch_algebra::{Fin, FinMarkov, ProbSemiring};
//! use finstoch_laws::{check_thunkability, CheckOptions};
//!
//! let r = ProbSemiring::probability();
//! let bits = Fin::new(vec![0u8, 1]).unwrap();
//! let flip = FinMarkov::det(r, bits.clone(), bits, |b: &u8| 1 - b);
//!
//! let report = check_thunkability(&flip, &CheckOptions::default()).unwrap();
//! assert!(report.thunkable);
//! ```

mod comonoid;
mod consistency;
mod determinism;
mod error;
mod independence;
mod permutation;
mod thunkability;
mod zero_one;

pub use comonoid::{
    build_comonoid_witness, check_comonoid, check_comonoid_hom, ComonoidHomReport, ComonoidReport,
    ComonoidWitness,
};
pub use consistency::{
    check_tail_invariance, run_kolmogorov_consistency, ConsistencyFailure, ConsistencyReport,
    FinitePatch, TailCounterexample, TailInvarianceReport,
};
pub use determinism::{
    dirac_point, is_deterministic, is_deterministic_kernel, DeterminismFailure, DeterminismReport,
    DeterministicBase, DiracOutcome,
};
pub use error::LawError;
pub use independence::{
    build_conditional_witness, check_conditional_independence, CiFailure, CiReport,
    ConditionalWitness,
};
pub use permutation::{
    check_finite_permutation_invariance, IndexPermutation, PermutationFailure, PermutationReport,
};
pub use thunkability::{check_thunkability, ProbeFailure, ThunkabilityReport};
pub use zero_one::{
    build_hewitt_savage_witness, build_kolmogorov_witness, check_hewitt_savage_zero_one,
    check_kolmogorov_zero_one, coordinate_marginal, FiniteMarginal, HewittSavageReport,
    HewittSavageWitness, KolmogorovWitness, MarginalVerdict, ZeroOneFailure, ZeroOneReport,
};

/// Tolerance for weight comparisons when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Knobs shared by every law check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOptions {
    /// Tolerance handed to the semiring's `eq_within`.
    pub tolerance: f64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
