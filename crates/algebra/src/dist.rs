//! Finite weighted collections over a semiring.
//!
//! A [`Dist`] maps finitely many elements to weights; absent keys
//! implicitly carry the semiring zero. No normalization invariant is
//! enforced here — weights summing to one is a property oracles check,
//! not a representation invariant.

use crate::error::AlgebraError;
use crate::fin::Fin;
use crate::semiring::Semiring;

/// A finite weighted collection: sparse `(element, weight)` entries.
///
/// Entries may repeat a key; densification against a [`Fin`] merges
/// duplicates with semiring addition. Weight-first so the type reads as
/// "a `W`-weighted distribution over `X`".
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::{Dist, Fin, ProbSemiring};
///
/// let r = ProbSemiring::probability();
/// let outcomes = Fin::new(vec!["ok", "inspect"]).unwrap();
/// let d = Dist::new(vec![("ok", 0.82), ("inspect", 0.18)]);
/// assert_eq!(d.dense(&r, &outcomes).unwrap(), vec![0.82, 0.18]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dist<W, X> {
    /// The weighted support. Keys outside any entry carry zero.
    pub entries: Vec<(X, W)>,
}

impl<W: Clone, X: Clone> Dist<W, X> {
    /// A distribution from explicit entries.
    pub fn new(entries: Vec<(X, W)>) -> Self {
        Self { entries }
    }

    /// The empty distribution (all weight zero).
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// The Dirac distribution: all weight on one element.
    pub fn dirac(x: X, one: W) -> Self {
        Self {
            entries: vec![(x, one)],
        }
    }

    /// Rebuild a sparse distribution from a dense weight vector aligned
    /// to a [`Fin`]'s enumeration order, dropping zero weights.
    pub fn from_dense<S>(sem: &S, fin: &Fin<X>, weights: &[W]) -> Self
    where
        S: Semiring<W = W>,
        X: 'static,
    {
        let entries = fin
            .elems()
            .iter()
            .zip(weights.iter())
            .filter(|(_, w)| !sem.is_zero(w))
            .map(|(x, w)| (x.clone(), w.clone()))
            .collect();
        Self { entries }
    }

    /// Push the distribution forward along a pure function. Duplicate
    /// images are kept as separate entries; densification merges them.
    pub fn push_forward<Y: Clone>(&self, f: impl Fn(&X) -> Y) -> Dist<W, Y> {
        Dist {
            entries: self
                .entries
                .iter()
                .map(|(x, w)| (f(x), w.clone()))
                .collect(),
        }
    }

    /// Materialize the dense weight vector over a [`Fin`], merging
    /// duplicate keys with semiring addition.
    ///
    /// # Errors
    ///
    /// Fails if any entry's key lies outside the given set.
    pub fn dense<S>(&self, sem: &S, fin: &Fin<X>) -> Result<Vec<W>, AlgebraError>
    where
        S: Semiring<W = W>,
        X: 'static,
    {
        let mut out = vec![sem.zero(); fin.len()];
        for (x, w) in &self.entries {
            let i = fin.index_of(x).ok_or_else(|| AlgebraError::UnknownElement {
                fin: fin.describe(),
            })?;
            out[i] = sem.add(&out[i], w);
        }
        Ok(out)
    }

    /// Total weight, summed with semiring addition.
    pub fn total<S>(&self, sem: &S) -> W
    where
        S: Semiring<W = W>,
    {
        self.entries
            .iter()
            .fold(sem.zero(), |acc, (_, w)| sem.add(&acc, w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::{BoolSemiring, ProbSemiring};

    #[test]
    fn dense_merges_duplicate_keys() {
        let r = ProbSemiring::probability();
        let fin = Fin::new(vec!["a", "b"]).unwrap();
        let d = Dist::new(vec![("a", 0.25), ("b", 0.5), ("a", 0.25)]);
        assert_eq!(d.dense(&r, &fin).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn dense_rejects_foreign_elements() {
        let r = ProbSemiring::probability();
        let fin = Fin::new(vec!["a", "b"]).unwrap();
        let d = Dist::new(vec![("c", 1.0)]);
        assert!(matches!(
            d.dense(&r, &fin),
            Err(AlgebraError::UnknownElement { .. })
        ));
    }

    #[test]
    fn dirac_concentrates_all_weight() {
        let r = ProbSemiring::probability();
        let fin = Fin::new(vec![0, 1, 2]).unwrap();
        let d = Dist::dirac(1, r.one());
        assert_eq!(d.dense(&r, &fin).unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(d.total(&r), 1.0);
    }

    #[test]
    fn push_forward_then_dense() {
        let r = ProbSemiring::probability();
        let parity = Fin::new(vec![0, 1]).unwrap();
        let d = Dist::new(vec![(0, 0.1), (1, 0.2), (2, 0.3), (3, 0.4)]);
        let pushed = d.push_forward(|x| x % 2);
        // Summed floats: compare within tolerance, not bitwise.
        let row = pushed.dense(&r, &parity).unwrap();
        assert!((row[0] - 0.4).abs() < 1e-12);
        assert!((row[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn works_over_the_boolean_semiring() {
        let b = BoolSemiring;
        let fin = Fin::new(vec!["p", "q"]).unwrap();
        let d = Dist::new(vec![("p", true), ("q", false)]);
        assert_eq!(d.dense(&b, &fin).unwrap(), vec![true, false]);
        assert!(d.total(&b));
    }
}
