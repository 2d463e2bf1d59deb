//! Determinism recognizers: Dirac detection and base extraction.
//!
//! A kernel is deterministic when every sampled output distribution
//! concentrates all weight on a single element. The recognizer extracts
//! the underlying pure function as a [`DeterministicBase`], which is
//! honest about partiality: it was only observed on the sampled inputs,
//! so lookups return `Option` rather than panicking on unseen inputs.

use finstoch_algebra::{Dist, Fin, FinMarkov, Semiring};

use crate::error::LawError;

/// Outcome of Dirac detection on a single distribution.
#[derive(Debug, Clone, PartialEq)]
pub enum DiracOutcome<X> {
    /// All non-zero weight sits on this element.
    Dirac(X),
    /// Zero or several support points carry non-zero weight.
    NotDirac { support: usize },
}

/// Position of the sole non-zero weight in a dense row, if there is
/// exactly one.
pub(crate) fn dirac_index<S: Semiring>(sem: &S, row: &[S::W]) -> Result<usize, usize> {
    let mut found = None;
    let mut support = 0;
    for (i, w) in row.iter().enumerate() {
        if !sem.is_zero(w) {
            support += 1;
            found = Some(i);
        }
    }
    match (support, found) {
        (1, Some(i)) => Ok(i),
        _ => Err(support),
    }
}

/// Detect whether a distribution is Dirac: exactly one element of its
/// support carries non-zero weight.
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::{Dist, Fin, ProbSemiring, Semiring};
/// use finstoch_laws::{dirac_point, DiracOutcome};
///
/// let r = ProbSemiring::probability();
/// let fin = Fin::new(vec!["ok", "inspect"]).unwrap();
///
/// let point = Dist::dirac("ok", r.one());
/// assert_eq!(dirac_point(&r, &fin, &point).unwrap(), DiracOutcome::Dirac("ok"));
///
/// let noisy = Dist::new(vec![("ok", 0.82), ("inspect", 0.18)]);
/// assert_eq!(
///     dirac_point(&r, &fin, &noisy).unwrap(),
///     DiracOutcome::NotDirac { support: 2 },
/// );
/// ```
pub fn dirac_point<S, X>(
    sem: &S,
    fin: &Fin<X>,
    d: &Dist<S::W, X>,
) -> Result<DiracOutcome<X>, LawError>
where
    S: Semiring,
    X: Clone + 'static,
{
    let row = d.dense(sem, fin)?;
    match dirac_index(sem, &row) {
        Ok(i) => Ok(DiracOutcome::Dirac(fin.elems()[i].clone())),
        Err(support) => Ok(DiracOutcome::NotDirac { support }),
    }
}

/// The pure function extracted from a Dirac-everywhere kernel, defined
/// only on the inputs it was sampled at.
#[derive(Debug, Clone)]
pub struct DeterministicBase<X, Y> {
    dom: Fin<X>,
    images: Vec<(X, Y)>,
}

impl<X: Clone + 'static, Y> DeterministicBase<X, Y> {
    pub(crate) fn from_pairs(dom: Fin<X>, images: Vec<(X, Y)>) -> Self {
        Self { dom, images }
    }

    /// The image of an input, if the base was sampled there.
    pub fn image_of(&self, x: &X) -> Option<&Y> {
        self.images
            .iter()
            .find(|(k, _)| self.dom.eq_elems(k, x))
            .map(|(_, y)| y)
    }

    /// The sampled `(input, image)` pairs.
    pub fn pairs(&self) -> &[(X, Y)] {
        &self.images
    }
}

/// An input where the kernel turned out not to be Dirac.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterminismFailure<X> {
    pub input: X,
    pub support: usize,
}

/// Result of the determinism recognizer.
#[derive(Debug, Clone)]
pub struct DeterminismReport<X, Y> {
    /// Whether every sampled input produced a Dirac output.
    pub deterministic: bool,
    /// The extracted base, present only when deterministic.
    pub base: Option<DeterministicBase<X, Y>>,
    /// Every sampled input that was not Dirac.
    pub failures: Vec<DeterminismFailure<X>>,
}

/// Apply Dirac detection to `f` at every sample; if all outputs are
/// Dirac, extract the deterministic base.
///
/// Extraction is partial by construction: the returned base answers
/// `None` for inputs outside the sample set instead of guessing.
pub fn is_deterministic<S, X, Y>(
    f: &FinMarkov<S, X, Y>,
    samples: &[X],
) -> Result<DeterminismReport<X, Y>, LawError>
where
    S: Semiring + 'static,
    X: Clone + 'static,
    Y: Clone + 'static,
{
    let sem = f.semiring();
    let mut images = Vec::with_capacity(samples.len());
    let mut failures = Vec::new();
    for a in samples {
        match dirac_point(sem, f.cod(), &f.at(a))? {
            DiracOutcome::Dirac(y) => images.push((a.clone(), y)),
            DiracOutcome::NotDirac { support } => failures.push(DeterminismFailure {
                input: a.clone(),
                support,
            }),
        }
    }
    let deterministic = failures.is_empty();
    Ok(DeterminismReport {
        deterministic,
        base: deterministic.then(|| DeterministicBase {
            dom: f.dom().clone(),
            images,
        }),
        failures,
    })
}

/// Inputs whose rows are not one-hot within `tolerance`: exactly one
/// weight indistinguishable from `one`, all others from `zero`.
pub(crate) fn rows_not_one_hot<S, X, Y>(
    f: &FinMarkov<S, X, Y>,
    tolerance: f64,
) -> Result<Vec<X>, LawError>
where
    S: Semiring + 'static,
    X: Clone + 'static,
    Y: Clone + 'static,
{
    let sem = f.semiring();
    let (zero, one) = (sem.zero(), sem.one());
    let mut offenders = Vec::new();
    for x in f.dom().elems() {
        let row = f.row(x)?;
        let live: Vec<&S::W> = row
            .iter()
            .filter(|w| !sem.eq_within(w, &zero, tolerance))
            .collect();
        let exact = live.len() == 1 && sem.eq_within(live[0], &one, tolerance);
        if !exact {
            offenders.push(x.clone());
        }
    }
    Ok(offenders)
}

/// Whether every row of the kernel is exactly deterministic within
/// `tolerance` — the stronger, tolerance-explicit form the zero-one
/// oracles require on top of Dirac recognition.
pub fn is_deterministic_kernel<S, X, Y>(
    f: &FinMarkov<S, X, Y>,
    tolerance: f64,
) -> Result<bool, LawError>
where
    S: Semiring + 'static,
    X: Clone + 'static,
    Y: Clone + 'static,
{
    Ok(rows_not_one_hot(f, tolerance)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstoch_algebra::ProbSemiring;

    fn gauge() -> Fin<&'static str> {
        Fin::new(vec!["calibrated", "uncalibrated"]).unwrap()
    }

    fn verdict() -> Fin<&'static str> {
        Fin::new(vec!["ok", "inspect"]).unwrap()
    }

    #[test]
    fn pure_lift_is_deterministic_and_base_agrees() {
        let r = ProbSemiring::probability();
        let f = FinMarkov::det(r, gauge(), verdict(), |g: &&str| {
            if *g == "calibrated" {
                "ok"
            } else {
                "inspect"
            }
        });
        let report = is_deterministic(&f, f.dom().elems()).unwrap();
        assert!(report.deterministic);
        let base = report.base.unwrap();
        assert_eq!(base.image_of(&"calibrated"), Some(&"ok"));
        assert_eq!(base.image_of(&"uncalibrated"), Some(&"inspect"));
    }

    #[test]
    fn noisy_kernel_is_not_deterministic() {
        let r = ProbSemiring::probability();
        let cod = verdict();
        let vc = cod.clone();
        let f = FinMarkov::new(r, gauge(), cod, move |g: &&str| {
            if *g == "calibrated" {
                Dist::new(vec![(vc.elems()[0], 0.82), (vc.elems()[1], 0.18)])
            } else {
                Dist::dirac(vc.elems()[1], 1.0)
            }
        });
        let report = is_deterministic(&f, f.dom().elems()).unwrap();
        assert!(!report.deterministic);
        assert!(report.base.is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].input, "calibrated");
        assert_eq!(report.failures[0].support, 2);
    }

    #[test]
    fn base_is_partial_outside_the_samples() {
        let r = ProbSemiring::probability();
        let f = FinMarkov::det(r, gauge(), verdict(), |_: &&str| "ok");
        let report = is_deterministic(&f, &["calibrated"]).unwrap();
        let base = report.base.unwrap();
        assert_eq!(base.image_of(&"calibrated"), Some(&"ok"));
        assert_eq!(base.image_of(&"uncalibrated"), None);
    }

    #[test]
    fn one_hot_within_tolerance() {
        let r = ProbSemiring::probability();
        let cod = verdict();
        let vc = cod.clone();
        let f = FinMarkov::new(r, gauge(), cod, move |_: &&str| {
            // Within 1e-6 of one-hot but not within 1e-9.
            Dist::new(vec![(vc.elems()[0], 1.0 - 5e-7), (vc.elems()[1], 5e-7)])
        });
        assert!(!is_deterministic_kernel(&f, 1e-9).unwrap());
        assert!(is_deterministic_kernel(&f, 1e-6).unwrap());
    }

    #[test]
    fn dirac_of_empty_distribution_reports_empty_support() {
        let r = ProbSemiring::probability();
        let fin = verdict();
        let d: Dist<f64, &str> = Dist::empty();
        assert_eq!(
            dirac_point(&r, &fin, &d).unwrap(),
            DiracOutcome::NotDirac { support: 0 }
        );
    }
}
