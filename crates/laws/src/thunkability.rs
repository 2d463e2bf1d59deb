//! Thunkability: determinism that survives arbitrary input mixtures.
//!
//! A kernel is thunkable iff it is Dirac at every input *and* its
//! Kleisli lift `P f : Dist(A) → Dist(B)` agrees with push-forward along
//! the extracted base on every probe distribution. Probe generation is
//! systematic, not random: one Dirac probe per domain element, the
//! unnormalized uniform probe (weight one per element), and — when the
//! semiring embeds plain floats — two fixed non-uniform mixtures over
//! the leading domain elements.

use finstoch_algebra::{FinMarkov, Semiring};

use crate::determinism::{dirac_index, DeterministicBase};
use crate::error::LawError;
use crate::CheckOptions;

/// The first probe on which the lift and the push-forward diverged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeFailure<Y, W> {
    /// Which probe distribution exposed the divergence.
    pub probe: String,
    /// The codomain element where the weights differ.
    pub point: Y,
    /// Weight assigned by the Kleisli lift.
    pub via_kernel: W,
    /// Weight assigned by push-forward along the base.
    pub via_base: W,
}

/// Result of the thunkability oracle.
#[derive(Debug, Clone)]
pub struct ThunkabilityReport<X, Y, W> {
    /// Whether the kernel is thunkable.
    pub thunkable: bool,
    /// The extracted base; present only when thunkable.
    pub base: Option<DeterministicBase<X, Y>>,
    /// How many probe distributions were evaluated.
    pub probes_run: usize,
    /// The short-circuiting probe failure, if any.
    pub failure: Option<ProbeFailure<Y, W>>,
    /// Human-readable summary.
    pub details: String,
}

/// Check thunkability of a kernel over its whole domain.
///
/// Failing any probe short-circuits to "not thunkable" with no base
/// returned.
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::{Fin, FinMarkov, ProbSemiring};
/// use finstoch_laws::{check_thunkability, CheckOptions};
///
/// let r = ProbSemiring::probability();
/// let bits = Fin::new(vec![0u8, 1]).unwrap();
/// let flip = FinMarkov::det(r, bits.clone(), bits, |b: &u8| 1 - b);
///
/// let report = check_thunkability(&flip, &CheckOptions::default()).unwrap();
/// assert!(report.thunkable);
/// assert_eq!(report.base.unwrap().image_of(&0), Some(&1));
/// ```
pub fn check_thunkability<S, X, Y>(
    f: &FinMarkov<S, X, Y>,
    options: &CheckOptions,
) -> Result<ThunkabilityReport<X, Y, S::W>, LawError>
where
    S: Semiring + 'static,
    X: Clone + std::fmt::Debug + 'static,
    Y: Clone + 'static,
{
    let sem = f.semiring();
    let n = f.dom().len();
    let m = f.cod().len();

    // Dirac everywhere, recording the codomain index per input.
    let mut rows: Vec<Vec<S::W>> = Vec::with_capacity(n);
    let mut base_idx: Vec<usize> = Vec::with_capacity(n);
    for x in f.dom().elems() {
        let row = f.row(x)?;
        match dirac_index(sem, &row) {
            Ok(j) => base_idx.push(j),
            Err(support) => {
                return Ok(ThunkabilityReport {
                    thunkable: false,
                    base: None,
                    probes_run: 0,
                    failure: None,
                    details: format!(
                        "not dirac at input {:?}: {} support points",
                        x, support
                    ),
                });
            }
        }
        rows.push(row);
    }

    // Probe schedule.
    let mut probes: Vec<(String, Vec<S::W>)> = Vec::new();
    for (i, x) in f.dom().elems().iter().enumerate() {
        let mut p = vec![sem.zero(); n];
        p[i] = sem.one();
        probes.push((format!("dirac at {:?}", x), p));
    }
    // Deliberately unnormalized: weight one per element.
    probes.push(("uniform".to_string(), vec![sem.one(); n]));
    if sem.from_f64(0.5).is_some() {
        for mixture in [&[0.7, 0.3][..], &[0.2, 0.3, 0.5][..]] {
            if n >= mixture.len() {
                let mut p = vec![sem.zero(); n];
                for (i, v) in mixture.iter().enumerate() {
                    if let Some(w) = sem.from_f64(*v) {
                        p[i] = w;
                    }
                }
                probes.push((format!("mixture {:?}", mixture), p));
            }
        }
    }

    // Each probe: Kleisli lift vs push-forward along the base.
    for (probes_run, (name, probe)) in probes.iter().enumerate() {
        let mut lifted = vec![sem.zero(); m];
        let mut pushed = vec![sem.zero(); m];
        for (i, w) in probe.iter().enumerate() {
            if sem.is_zero(w) {
                continue;
            }
            for (j, v) in rows[i].iter().enumerate() {
                lifted[j] = sem.add(&lifted[j], &sem.mul(w, v));
            }
            pushed[base_idx[i]] = sem.add(&pushed[base_idx[i]], w);
        }
        for j in 0..m {
            if !sem.eq_within(&lifted[j], &pushed[j], options.tolerance) {
                return Ok(ThunkabilityReport {
                    thunkable: false,
                    base: None,
                    probes_run: probes_run + 1,
                    failure: Some(ProbeFailure {
                        probe: name.clone(),
                        point: f.cod().elems()[j].clone(),
                        via_kernel: lifted[j].clone(),
                        via_base: pushed[j].clone(),
                    }),
                    details: format!("lift and push-forward diverge on probe {}", name),
                });
            }
        }
    }

    let pairs = f
        .dom()
        .elems()
        .iter()
        .zip(base_idx.iter())
        .map(|(x, &j)| (x.clone(), f.cod().elems()[j].clone()))
        .collect::<Vec<_>>();
    Ok(ThunkabilityReport {
        thunkable: true,
        base: Some(DeterministicBase::from_pairs(f.dom().clone(), pairs)),
        probes_run: probes.len(),
        failure: None,
        details: format!("all {} probes agree", probes.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstoch_algebra::{Dist, Fin, ProbSemiring};

    #[test]
    fn pure_lift_is_thunkable_with_matching_base() {
        let r = ProbSemiring::probability();
        let dom = Fin::new(vec![0u8, 1, 2]).unwrap();
        let cod = Fin::new(vec![0u8, 1]).unwrap();
        let f = FinMarkov::det(r, dom.clone(), cod, |x: &u8| x % 2);
        let report = check_thunkability(&f, &CheckOptions::default()).unwrap();
        assert!(report.thunkable);
        let base = report.base.unwrap();
        for x in dom.elems() {
            assert_eq!(base.image_of(x), Some(&(x % 2)));
        }
        // 3 dirac probes + uniform + two mixtures.
        assert_eq!(report.probes_run, 6);
    }

    #[test]
    fn noisy_kernel_is_never_thunkable() {
        let r = ProbSemiring::probability();
        let dom = Fin::new(vec![0u8, 1]).unwrap();
        let cod = Fin::new(vec![0u8, 1]).unwrap();
        let cc = cod.clone();
        let f = FinMarkov::new(r, dom, cod, move |_: &u8| {
            Dist::new(vec![(cc.elems()[0], 0.82), (cc.elems()[1], 0.18)])
        });
        let report = check_thunkability(&f, &CheckOptions::default()).unwrap();
        assert!(!report.thunkable);
        assert!(report.base.is_none());
        assert_eq!(report.probes_run, 0);
    }

    #[test]
    fn mixtures_are_skipped_without_numeric_weights() {
        use finstoch_algebra::BoolSemiring;
        let b = BoolSemiring;
        let dom = Fin::new(vec!["p", "q"]).unwrap();
        let cod = Fin::new(vec!["p", "q"]).unwrap();
        let f = FinMarkov::det(b, dom, cod, |x: &&str| *x);
        let report = check_thunkability(&f, &CheckOptions::default()).unwrap();
        assert!(report.thunkable);
        // 2 dirac probes + uniform, no mixtures.
        assert_eq!(report.probes_run, 3);
    }
}
