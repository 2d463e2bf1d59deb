//! Markov kernels between finite sets, bundled as category morphisms.
//!
//! A kernel is a pure function from a finite set into weighted
//! distributions over another finite set. [`FinMarkov`] bundles the
//! kernel with its domain and codomain objects and the semiring the
//! weights live in, and derives the categorical operations:
//!
//! - Kleisli composition [`FinMarkov::then`]:
//!   `(f ; g)(x)(z) = Σ_y f(x)(y) · g(y)(z)`
//! - Tensor [`FinMarkov::tensor`]: independent combination on pair
//!   objects
//! - Matrix form [`FinMarkov::matrix`] for display and comparison
//!
//! Composition demands that `cod(f)` and `dom(g)` are the *same object*
//! ([`Fin::same_object`]), not merely structurally equal sets.

use std::rc::Rc;

use crate::dist::Dist;
use crate::error::AlgebraError;
use crate::fin::Fin;
use crate::semiring::Semiring;

/// The kernel function type: elements in, weighted distributions out.
pub type KernelFn<W, X, Y> = Rc<dyn Fn(&X) -> Dist<W, Y>>;

/// A morphism of the finite Markov category: domain, codomain, kernel,
/// and the semiring its weights are drawn from.
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::{Dist, Fin, FinMarkov, ProbSemiring};
///
/// let r = ProbSemiring::probability();
/// let gauge = Fin::new(vec!["calibrated", "uncalibrated"]).unwrap();
/// let verdict = Fin::new(vec!["ok", "inspect"]).unwrap();
///
/// let inspect = FinMarkov::det(r, gauge, verdict.clone(), |g: &&str| {
///     if *g == "calibrated" { "ok" } else { "inspect" }
/// });
/// let row = inspect.row(&"uncalibrated").unwrap();
/// assert_eq!(row, vec![0.0, 1.0]);
/// ```
pub struct FinMarkov<S: Semiring, X, Y> {
    dom: Fin<X>,
    cod: Fin<Y>,
    kernel: KernelFn<S::W, X, Y>,
    sem: S,
}

impl<S: Semiring, X, Y> Clone for FinMarkov<S, X, Y> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            cod: self.cod.clone(),
            kernel: Rc::clone(&self.kernel),
            sem: self.sem.clone(),
        }
    }
}

impl<S, X, Y> FinMarkov<S, X, Y>
where
    S: Semiring + 'static,
    X: Clone + 'static,
    Y: Clone + 'static,
{
    /// Wrap a kernel function as a morphism.
    pub fn new(sem: S, dom: Fin<X>, cod: Fin<Y>, kernel: impl Fn(&X) -> Dist<S::W, Y> + 'static) -> Self {
        Self {
            dom,
            cod,
            kernel: Rc::new(kernel),
            sem,
        }
    }

    /// Lift a pure function to a Dirac kernel.
    pub fn det(sem: S, dom: Fin<X>, cod: Fin<Y>, f: impl Fn(&X) -> Y + 'static) -> Self {
        let one = sem.one();
        Self::new(sem, dom, cod, move |x| Dist::dirac(f(x), one.clone()))
    }

    /// The domain object.
    pub fn dom(&self) -> &Fin<X> {
        &self.dom
    }

    /// The codomain object.
    pub fn cod(&self) -> &Fin<Y> {
        &self.cod
    }

    /// The semiring this morphism's weights live in.
    pub fn semiring(&self) -> &S {
        &self.sem
    }

    /// Evaluate the kernel at an input.
    pub fn at(&self, x: &X) -> Dist<S::W, Y> {
        (self.kernel)(x)
    }

    /// The dense weight row at an input, aligned to the codomain's
    /// enumeration order.
    pub fn row(&self, x: &X) -> Result<Vec<S::W>, AlgebraError> {
        self.at(x).dense(&self.sem, &self.cod)
    }

    /// The full `|dom| × |cod|` weight table, for display/comparison.
    pub fn matrix(&self) -> Result<Vec<Vec<S::W>>, AlgebraError> {
        self.dom.elems().iter().map(|x| self.row(x)).collect()
    }

    /// Kleisli composition `self ; g`.
    ///
    /// # Errors
    ///
    /// Fails with [`AlgebraError::CompositionMismatch`] unless this
    /// morphism's codomain is the same object as `g`'s domain. Also
    /// surfaces any kernel output outside its declared codomain, since
    /// all rows are materialized here.
    pub fn then<Z>(&self, g: &FinMarkov<S, Y, Z>) -> Result<FinMarkov<S, X, Z>, AlgebraError>
    where
        Z: Clone + 'static,
    {
        if !self.cod.same_object(&g.dom) {
            return Err(AlgebraError::CompositionMismatch {
                codomain: self.cod.describe(),
                domain: g.dom.describe(),
            });
        }

        let sem = &self.sem;

        // Rows of g, one per middle element, computed once.
        let g_rows: Vec<Vec<S::W>> = g.matrix()?;

        let mut table: Vec<Dist<S::W, Z>> = Vec::with_capacity(self.dom.len());
        for x in self.dom.elems() {
            let f_row = self.row(x)?;
            let mut out = vec![sem.zero(); g.cod.len()];
            for (j, w) in f_row.iter().enumerate() {
                if sem.is_zero(w) {
                    continue;
                }
                for (k, v) in g_rows[j].iter().enumerate() {
                    out[k] = sem.add(&out[k], &sem.mul(w, v));
                }
            }
            table.push(Dist::from_dense(sem, &g.cod, &out));
        }

        let dom = self.dom.clone();
        let lookup = self.dom.clone();
        Ok(FinMarkov::new(
            self.sem.clone(),
            dom,
            g.cod.clone(),
            move |x| match lookup.index_of(x) {
                Some(i) => table[i].clone(),
                None => Dist::empty(),
            },
        ))
    }

    /// Tensor product `self ⊗ g`: independent combination of weights on
    /// freshly built pair objects.
    pub fn tensor<X2, Y2>(&self, g: &FinMarkov<S, X2, Y2>) -> FinMarkov<S, (X, X2), (Y, Y2)>
    where
        X2: Clone + 'static,
        Y2: Clone + 'static,
    {
        let dom = Fin::pair(&self.dom, &g.dom);
        let cod = Fin::pair(&self.cod, &g.cod);
        let f = self.clone();
        let g = g.clone();
        let sem = self.sem.clone();
        FinMarkov::new(self.sem.clone(), dom, cod, move |(x1, x2): &(X, X2)| {
            let d1 = f.at(x1);
            let d2 = g.at(x2);
            let mut entries = Vec::with_capacity(d1.entries.len() * d2.entries.len());
            for (y1, w1) in &d1.entries {
                for (y2, w2) in &d2.entries {
                    entries.push(((y1.clone(), y2.clone()), sem.mul(w1, w2)));
                }
            }
            Dist::new(entries)
        })
    }
}

impl<S, X> FinMarkov<S, X, X>
where
    S: Semiring + 'static,
    X: Clone + 'static,
{
    /// The identity morphism on an object.
    pub fn identity(sem: S, fin: &Fin<X>) -> Self {
        Self::det(sem, fin.clone(), fin.clone(), |x: &X| x.clone())
    }
}
