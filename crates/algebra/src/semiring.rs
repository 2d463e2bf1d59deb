//! Semiring parameters for weight arithmetic.
//!
//! Every kernel operation is parametrized by a commutative-semiring-like
//! value: a zero, a one, addition, multiplication, and an equality
//! predicate. Nothing else is assumed — the carrier need not be a field,
//! and "probability" (weights summing to one) is a property individual
//! oracles check, never a representation invariant.
//!
//! Semiring values are plain immutable configuration passed explicitly at
//! construction sites. There is no global default.

use std::fmt;

/// A commutative semiring over a weight carrier `W`.
///
/// Implementors are small value types (usually `Copy`) that are cloned
/// into morphisms at construction time. All numeric comparison in the
/// engine routes through [`Semiring::eq`] / [`Semiring::eq_within`], never
/// through `==` on the carrier.
pub trait Semiring: Clone {
    /// The weight carrier.
    type W: Clone + fmt::Debug;

    /// Additive identity.
    fn zero(&self) -> Self::W;

    /// Multiplicative identity.
    fn one(&self) -> Self::W;

    /// Weight addition.
    fn add(&self, a: &Self::W, b: &Self::W) -> Self::W;

    /// Weight multiplication.
    fn mul(&self, a: &Self::W, b: &Self::W) -> Self::W;

    /// Weight equality. For floating-point carriers this is tolerance
    /// comparison, not bit equality.
    fn eq(&self, a: &Self::W, b: &Self::W) -> bool;

    /// Whether a weight is (indistinguishable from) zero.
    fn is_zero(&self, a: &Self::W) -> bool {
        self.eq(a, &self.zero())
    }

    /// Embed a plain float weight, when the carrier supports arbitrary
    /// numeric weights. Oracles use this to generate non-uniform probe
    /// mixtures; `None` disables those probes.
    fn from_f64(&self, _v: f64) -> Option<Self::W> {
        None
    }

    /// Equality sharpened (or relaxed) to an oracle-supplied tolerance.
    ///
    /// The default ignores the tolerance and defers to [`Semiring::eq`],
    /// which is correct for exact carriers.
    fn eq_within(&self, a: &Self::W, b: &Self::W, _tolerance: f64) -> bool {
        self.eq(a, b)
    }
}

/// Which normalization discipline a probability-flavoured semiring
/// carries.
///
/// The three kinds share one carrier and one arithmetic; they differ only
/// in which row totals [`ProbSemiring::admits_total`] accepts. This keeps
/// the Dist / SubProb / Weighted family as tagged configurations of a
/// single value rather than three parallel implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    /// Rows must sum to one (within tolerance).
    Probability,
    /// Rows may sum to at most one.
    SubProbability,
    /// Arbitrary non-negative weights; no total constraint.
    Weighted,
}

/// The probability semiring on `f64`: ordinary `+` and `*`, equality
/// within `tolerance`.
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::{ProbSemiring, Semiring};
///
/// let r = ProbSemiring::probability();
/// assert!(Semiring::eq(&r, &(0.1 + 0.2), &0.3));
/// assert!(r.is_zero(&0.0));
/// assert_eq!(r.from_f64(0.7), Some(0.7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbSemiring {
    /// Normalization discipline checked by oracles.
    pub kind: WeightKind,
    /// Default comparison tolerance.
    pub tolerance: f64,
}

impl ProbSemiring {
    /// Probability weights: rows sum to one.
    pub fn probability() -> Self {
        Self {
            kind: WeightKind::Probability,
            tolerance: 1e-9,
        }
    }

    /// Sub-probability weights: rows sum to at most one.
    pub fn sub_probability() -> Self {
        Self {
            kind: WeightKind::SubProbability,
            tolerance: 1e-9,
        }
    }

    /// Arbitrary non-negative weights.
    pub fn weighted() -> Self {
        Self {
            kind: WeightKind::Weighted,
            tolerance: 1e-9,
        }
    }

    /// Same kind, different default tolerance.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    /// Whether a row total satisfies this semiring's normalization
    /// discipline, within the given tolerance.
    pub fn admits_total(&self, total: f64, tolerance: f64) -> bool {
        match self.kind {
            WeightKind::Probability => (total - 1.0).abs() <= tolerance,
            WeightKind::SubProbability => total <= 1.0 + tolerance,
            WeightKind::Weighted => true,
        }
    }
}

impl Semiring for ProbSemiring {
    type W = f64;

    fn zero(&self) -> f64 {
        0.0
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn eq(&self, a: &f64, b: &f64) -> bool {
        (a - b).abs() <= self.tolerance
    }

    fn from_f64(&self, v: f64) -> Option<f64> {
        Some(v)
    }

    fn eq_within(&self, a: &f64, b: &f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }
}

/// The boolean semiring (or / and). Used as an opaque non-numeric
/// parameter: possibility rather than probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoolSemiring;

impl Semiring for BoolSemiring {
    type W = bool;

    fn zero(&self) -> bool {
        false
    }

    fn one(&self) -> bool {
        true
    }

    fn add(&self, a: &bool, b: &bool) -> bool {
        *a || *b
    }

    fn mul(&self, a: &bool, b: &bool) -> bool {
        *a && *b
    }

    fn eq(&self, a: &bool, b: &bool) -> bool {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prob_eq_is_tolerance_based() {
        // `Semiring::eq`, not the derived `PartialEq` on the semiring
        // value itself.
        let r = ProbSemiring::probability();
        assert!(Semiring::eq(&r, &0.1, &(0.1 + 1e-12)));
        assert!(!Semiring::eq(&r, &0.1, &0.2));
    }

    #[test]
    fn prob_admits_total_per_kind() {
        let tol = 1e-9;
        assert!(ProbSemiring::probability().admits_total(1.0, tol));
        assert!(!ProbSemiring::probability().admits_total(0.6, tol));
        assert!(ProbSemiring::sub_probability().admits_total(0.6, tol));
        assert!(!ProbSemiring::sub_probability().admits_total(1.5, tol));
        assert!(ProbSemiring::weighted().admits_total(17.0, tol));
    }

    #[test]
    fn eq_within_overrides_default_tolerance() {
        let r = ProbSemiring::probability();
        assert!(!Semiring::eq(&r, &0.0, &1e-7));
        assert!(r.eq_within(&0.0, &1e-7, 1e-6));
    }

    #[test]
    fn bool_semiring_has_no_numeric_embedding() {
        let b = BoolSemiring;
        assert_eq!(b.from_f64(0.5), None);
        assert!(b.add(&false, &true));
        assert!(!b.mul(&false, &true));
    }
}
