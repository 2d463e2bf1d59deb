//! Copy-discard (comonoid) structure on finite objects.
//!
//! Every finite object carries a canonical comonoid: copy is
//! `x ↦ (x, x)` and discard is `x ↦ ()`, both derived from the object's
//! equality alone. No externally supplied copy function is accepted —
//! the canonical comonoid on a finite set is unique up to the chosen
//! equality. The laws are checked by direct enumeration over the
//! object's elements; no sampling is involved.

use finstoch_algebra::{Fin, FinMarkov, Semiring};
use serde::{Deserialize, Serialize};

use crate::error::LawError;
use crate::CheckOptions;

/// The canonical copy/discard structure on a finite object.
///
/// Immutable once built: the pair and unit objects are constructed here
/// so that morphisms derived from the same witness compose against the
/// same objects.
#[derive(Clone)]
pub struct ComonoidWitness<T> {
    object: Fin<T>,
    pair: Fin<(T, T)>,
    unit: Fin<()>,
    label: String,
}

/// Derive the copy/discard witness for a finite object.
pub fn build_comonoid_witness<T: Clone + 'static>(
    object: &Fin<T>,
    label: impl Into<String>,
) -> ComonoidWitness<T> {
    ComonoidWitness {
        object: object.clone(),
        pair: Fin::pair(object, object),
        unit: Fin::unit(),
        label: label.into(),
    }
}

impl<T: Clone + 'static> ComonoidWitness<T> {
    /// The underlying object.
    pub fn object(&self) -> &Fin<T> {
        &self.object
    }

    /// The pair object `T ⊗ T` copy lands in.
    pub fn pair_object(&self) -> &Fin<(T, T)> {
        &self.pair
    }

    /// The terminal object discard lands in.
    pub fn unit_object(&self) -> &Fin<()> {
        &self.unit
    }

    /// Diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The copy morphism `x ↦ (x, x)`.
    pub fn copy<S: Semiring + 'static>(&self, sem: &S) -> FinMarkov<S, T, (T, T)> {
        FinMarkov::det(
            sem.clone(),
            self.object.clone(),
            self.pair.clone(),
            |x: &T| (x.clone(), x.clone()),
        )
    }

    /// The discard morphism `x ↦ ()`.
    pub fn discard<S: Semiring + 'static>(&self, sem: &S) -> FinMarkov<S, T, ()> {
        FinMarkov::det(sem.clone(), self.object.clone(), self.unit.clone(), |_| ())
    }
}

/// Verdict of the comonoid law check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComonoidReport {
    /// Conjunction of all four laws.
    pub holds: bool,
    pub coassociative: bool,
    pub copy_commutative: bool,
    pub left_counit: bool,
    pub right_counit: bool,
    /// One message per violated law instance.
    pub failures: Vec<String>,
}

/// Check coassociativity, commutativity of copy, and both counit laws
/// by exhaustive enumeration over the object's elements.
pub fn check_comonoid<S, T>(
    sem: &S,
    witness: &ComonoidWitness<T>,
    options: &CheckOptions,
) -> Result<ComonoidReport, LawError>
where
    S: Semiring + 'static,
    T: Clone + std::fmt::Debug + 'static,
{
    let object = witness.object();
    let copy = witness.copy(sem);
    let triple = Fin::pair(object, witness.pair_object());

    let mut coassociative = true;
    let mut copy_commutative = true;
    let mut left_counit = true;
    let mut right_counit = true;
    let mut failures = Vec::new();

    for x in object.elems() {
        let d = copy.at(x);

        // Counits: discard one leg of the copy, recover the input.
        let mut point = vec![sem.zero(); object.len()];
        if let Some(i) = object.index_of(x) {
            point[i] = sem.one();
        }
        let left = d.push_forward(|(_, b): &(T, T)| b.clone()).dense(sem, object)?;
        if !rows_eq(sem, &left, &point, options.tolerance) {
            left_counit = false;
            failures.push(format!("left counit violated at {:?}", x));
        }
        let right = d.push_forward(|(a, _): &(T, T)| a.clone()).dense(sem, object)?;
        if !rows_eq(sem, &right, &point, options.tolerance) {
            right_counit = false;
            failures.push(format!("right counit violated at {:?}", x));
        }

        // Commutativity: swapping the copies changes nothing.
        let straight = d.dense(sem, witness.pair_object())?;
        let swapped = d
            .push_forward(|(a, b): &(T, T)| (b.clone(), a.clone()))
            .dense(sem, witness.pair_object())?;
        if !rows_eq(sem, &straight, &swapped, options.tolerance) {
            copy_commutative = false;
            failures.push(format!("copy not commutative at {:?}", x));
        }

        // Coassociativity: copy a leg again on either side, compare as
        // distributions over (T, (T, T)).
        let mut assoc_left = vec![sem.zero(); triple.len()];
        let mut assoc_right = vec![sem.zero(); triple.len()];
        for (pair, w) in &d.entries {
            let (a, b) = pair;
            for (inner, v) in &copy.at(a).entries {
                let (a1, a2) = inner;
                let flat = (a1.clone(), (a2.clone(), b.clone()));
                if let Some(i) = triple.index_of(&flat) {
                    assoc_left[i] = sem.add(&assoc_left[i], &sem.mul(w, v));
                }
            }
            for (inner, v) in &copy.at(b).entries {
                let (b1, b2) = inner;
                let flat = (a.clone(), (b1.clone(), b2.clone()));
                if let Some(i) = triple.index_of(&flat) {
                    assoc_right[i] = sem.add(&assoc_right[i], &sem.mul(w, v));
                }
            }
        }
        if !rows_eq(sem, &assoc_left, &assoc_right, options.tolerance) {
            coassociative = false;
            failures.push(format!("coassociativity violated at {:?}", x));
        }
    }

    Ok(ComonoidReport {
        holds: coassociative && copy_commutative && left_counit && right_counit,
        coassociative,
        copy_commutative,
        left_counit,
        right_counit,
        failures,
    })
}

/// Verdict of the comonoid homomorphism check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComonoidHomReport {
    pub holds: bool,
    /// `f ; copy_B  =  copy_A ; (f ⊗ f)` at every input.
    pub preserves_copy: bool,
    /// `f ; discard_B  =  discard_A`, i.e. every row has total weight
    /// one.
    pub preserves_discard: bool,
    pub failures: Vec<String>,
}

/// Check that a kernel commutes with copy and discard — that it is a
/// homomorphism of the canonical comonoids. The two obligations are
/// reported independently.
pub fn check_comonoid_hom<S, A, B>(
    domain: &ComonoidWitness<A>,
    codomain: &ComonoidWitness<B>,
    f: &FinMarkov<S, A, B>,
    options: &CheckOptions,
) -> Result<ComonoidHomReport, LawError>
where
    S: Semiring + 'static,
    A: Clone + std::fmt::Debug + 'static,
    B: Clone + 'static,
{
    let sem = f.semiring();
    let pair = codomain.pair_object();

    let mut preserves_copy = true;
    let mut preserves_discard = true;
    let mut failures = Vec::new();

    for a in domain.object().elems() {
        let d = f.at(a);
        let row = d.dense(sem, f.cod())?;

        // f then copy: the diagonal of the output distribution.
        let diagonal = d
            .push_forward(|b: &B| (b.clone(), b.clone()))
            .dense(sem, pair)?;

        // copy then f ⊗ f: two independent draws from the output.
        let mut product = vec![sem.zero(); pair.len()];
        for (j1, w1) in row.iter().enumerate() {
            if sem.is_zero(w1) {
                continue;
            }
            for (j2, w2) in row.iter().enumerate() {
                let p = (
                    f.cod().elems()[j1].clone(),
                    f.cod().elems()[j2].clone(),
                );
                if let Some(i) = pair.index_of(&p) {
                    product[i] = sem.add(&product[i], &sem.mul(w1, w2));
                }
            }
        }
        if !rows_eq(sem, &diagonal, &product, options.tolerance) {
            preserves_copy = false;
            failures.push(format!("copy not preserved at input {:?}", a));
        }

        let total = row.iter().fold(sem.zero(), |acc, w| sem.add(&acc, w));
        if !sem.eq_within(&total, &sem.one(), options.tolerance) {
            preserves_discard = false;
            failures.push(format!(
                "discard not preserved at input {:?}: total weight {:?}",
                a, total
            ));
        }
    }

    Ok(ComonoidHomReport {
        holds: preserves_copy && preserves_discard,
        preserves_copy,
        preserves_discard,
        failures,
    })
}

pub(crate) fn rows_eq<S: Semiring>(sem: &S, a: &[S::W], b: &[S::W], tolerance: f64) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| sem.eq_within(x, y, tolerance))
}
