//! Consistency diagnostics that complement the zero-one oracles.
//!
//! Two auxiliary checks: Kolmogorov consistency of a witness's finite
//! marginals with its prior (the projection morphism must agree with
//! summing the prior over the dropped coordinates), and invariance of a
//! boolean tail event under finite patches of a configuration.

use finstoch_algebra::Semiring;
use serde::{Deserialize, Serialize};

use crate::error::LawError;
use crate::zero_one::KolmogorovWitness;
use crate::CheckOptions;

/// One disagreement between a marginal projection and the directly
/// restricted prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyFailure {
    pub marginal: String,
    pub input: String,
    pub point: String,
    pub projected: String,
    pub restricted: String,
}

/// Verdict of the marginal-consistency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub ok: bool,
    pub failures: Vec<ConsistencyFailure>,
}

/// Check that every finite marginal of the witness is consistent with
/// its prior: pushing the prior through the projection morphism must
/// give the same distribution as restricting each configuration to the
/// marginal's coordinates and summing.
pub fn run_kolmogorov_consistency<S, A, X, T>(
    witness: &KolmogorovWitness<S, A, X, T>,
    options: &CheckOptions,
) -> Result<ConsistencyReport, LawError>
where
    S: Semiring + 'static,
    A: Clone + std::fmt::Debug + 'static,
    X: Clone + std::fmt::Debug + 'static,
    T: Clone + 'static,
{
    let sem = witness.prior.semiring();
    let configs = witness.prior.cod();

    let mut failures = Vec::new();
    for m in &witness.finite_marginals {
        let cod = m.proj.cod();
        let proj_rows = m.proj.matrix()?;
        for a in witness.prior.dom().elems() {
            let p_row = witness.prior.row(a)?;

            let mut projected = vec![sem.zero(); cod.len()];
            let mut restricted = vec![sem.zero(); cod.len()];
            for (j, w) in p_row.iter().enumerate() {
                if sem.is_zero(w) {
                    continue;
                }
                for (k, v) in proj_rows[j].iter().enumerate() {
                    projected[k] = sem.add(&projected[k], &sem.mul(w, v));
                }
                let xs = &configs.elems()[j];
                let picked: Vec<X> = m.coords.iter().map(|&c| xs[c].clone()).collect();
                if let Some(k) = cod.index_of(&picked) {
                    restricted[k] = sem.add(&restricted[k], w);
                }
            }

            for k in 0..cod.len() {
                if !sem.eq_within(&projected[k], &restricted[k], options.tolerance) {
                    failures.push(ConsistencyFailure {
                        marginal: m.label.clone(),
                        input: format!("{:?}", a),
                        point: format!("{:?}", cod.elems()[k]),
                        projected: format!("{:?}", projected[k]),
                        restricted: format!("{:?}", restricted[k]),
                    });
                }
            }
        }
    }

    Ok(ConsistencyReport {
        ok: failures.is_empty(),
        failures,
    })
}

/// A finite rewrite of a configuration: replace the value at each
/// listed coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinitePatch<X> {
    pub label: String,
    pub assignments: Vec<(usize, X)>,
}

impl<X: Clone> FinitePatch<X> {
    pub fn new(label: impl Into<String>, assignments: Vec<(usize, X)>) -> Self {
        Self {
            label: label.into(),
            assignments,
        }
    }

    /// Apply the patch; out-of-range coordinates are ignored.
    pub fn apply(&self, xs: &[X]) -> Vec<X> {
        let mut out = xs.to_vec();
        for (c, v) in &self.assignments {
            if *c < out.len() {
                out[*c] = v.clone();
            }
        }
        out
    }
}

/// One configuration where a finite patch flips the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailCounterexample {
    pub section: String,
    pub patch: String,
    pub before: bool,
    pub after: bool,
}

/// Verdict of the tail-invariance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailInvarianceReport {
    pub ok: bool,
    pub counterexamples: Vec<TailCounterexample>,
}

/// Check that a boolean event on configurations is a tail event with
/// respect to the supplied patches: no patch may change the event's
/// value on any section.
pub fn check_tail_invariance<X, F>(
    event: F,
    sections: &[Vec<X>],
    patches: &[FinitePatch<X>],
) -> TailInvarianceReport
where
    X: Clone + std::fmt::Debug,
    F: Fn(&[X]) -> bool,
{
    let mut counterexamples = Vec::new();
    for xs in sections {
        let before = event(xs);
        for p in patches {
            let after = event(&p.apply(xs));
            if after != before {
                counterexamples.push(TailCounterexample {
                    section: format!("{:?}", xs),
                    patch: p.label.clone(),
                    before,
                    after,
                });
            }
        }
    }
    TailInvarianceReport {
        ok: counterexamples.is_empty(),
        counterexamples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zero_one::{build_kolmogorov_witness, coordinate_marginal};
    use finstoch_algebra::{Dist, Fin, FinMarkov, ProbSemiring};

    fn biased_prior(
        n: usize,
        bias: f64,
    ) -> (
        FinMarkov<ProbSemiring, &'static str, Vec<u8>>,
        Fin<Vec<u8>>,
    ) {
        let r = ProbSemiring::probability();
        let bit = Fin::new(vec![0u8, 1]).unwrap();
        let configs = Fin::power(&bit, n);
        let input = Fin::new(vec!["go"]).unwrap();
        let cc = configs.clone();
        let prior = FinMarkov::new(r, input, configs.clone(), move |_: &&str| {
            let entries = cc
                .elems()
                .iter()
                .map(|xs| {
                    let ones = xs.iter().filter(|&&b| b == 1).count();
                    let w = bias.powi(ones as i32) * (1.0 - bias).powi((xs.len() - ones) as i32);
                    (xs.clone(), w)
                })
                .collect();
            Dist::new(entries)
        });
        (prior, configs)
    }

    #[test]
    fn coordinate_marginals_are_consistent_with_the_prior() {
        let r = ProbSemiring::probability();
        let (prior, configs) = biased_prior(3, 0.3);
        let value = Fin::new(vec![0u8]).unwrap();
        let stat = FinMarkov::det(r, configs.clone(), value, |_: &Vec<u8>| 0u8);
        let bit = Fin::new(vec![0u8, 1]).unwrap();
        let m0 = coordinate_marginal(&r, &configs, &Fin::power(&bit, 1), "F={0}", vec![0]).unwrap();
        let m02 =
            coordinate_marginal(&r, &configs, &Fin::power(&bit, 2), "F={0,2}", vec![0, 2]).unwrap();
        let witness =
            build_kolmogorov_witness(prior, stat, vec![m0, m02], "cylinders").unwrap();
        let report = run_kolmogorov_consistency(&witness, &CheckOptions::default()).unwrap();
        assert!(report.ok, "failures: {:?}", report.failures);
    }

    #[test]
    fn mislabelled_projection_is_flagged() {
        let r = ProbSemiring::probability();
        let bit = Fin::new(vec![0u8, 1]).unwrap();
        let configs = Fin::power(&bit, 2);
        let input = Fin::new(vec!["go"]).unwrap();
        // Coordinate 0 biased, coordinate 1 fair, so the two coordinate
        // marginals differ.
        let cc = configs.clone();
        let prior = FinMarkov::new(r, input, configs.clone(), move |_: &&str| {
            let entries = cc
                .elems()
                .iter()
                .map(|xs| {
                    let w0 = if xs[0] == 1 { 0.9 } else { 0.1 };
                    (xs.clone(), w0 * 0.5)
                })
                .collect();
            Dist::new(entries)
        });
        let value = Fin::new(vec![0u8]).unwrap();
        let stat = FinMarkov::det(r, configs.clone(), value, |_: &Vec<u8>| 0u8);
        // The morphism reads coordinate 1 while the declared coordinate
        // set says 0: the restriction disagrees with the projection.
        let cod = Fin::power(&bit, 1);
        let mut m =
            coordinate_marginal(&r, &configs, &cod, "F={0}", vec![0]).unwrap();
        m.proj = FinMarkov::det(r, configs.clone(), cod, |xs: &Vec<u8>| vec![xs[1]]);
        let witness = build_kolmogorov_witness(prior, stat, vec![m], "mislabelled").unwrap();
        let report = run_kolmogorov_consistency(&witness, &CheckOptions::default()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.failures[0].marginal, "F={0}");
    }

    #[test]
    fn parity_is_not_a_tail_event() {
        // Both sections carry 0 at coordinate 0, so the patch changes
        // each of them.
        let sections = vec![vec![0u8, 0, 0, 0], vec![0, 1, 1, 0]];
        let patches = vec![FinitePatch::new("set 0 to 1", vec![(0usize, 1u8)])];
        let report = check_tail_invariance(
            |xs: &[u8]| xs.iter().map(|&b| b as u32).sum::<u32>() % 2 == 0,
            &sections,
            &patches,
        );
        assert!(!report.ok);
        assert_eq!(report.counterexamples.len(), 2);
    }

    #[test]
    fn eventually_constant_suffix_is_tail_invariant() {
        // Event: the last two coordinates agree. Patching the head
        // cannot change it.
        let sections = vec![
            vec![0u8, 1, 1, 1],
            vec![1, 0, 0, 1],
            vec![0, 0, 1, 1],
        ];
        let patches = vec![
            FinitePatch::new("flip 0", vec![(0usize, 1u8)]),
            FinitePatch::new("flip 0 and 1", vec![(0, 1), (1, 1)]),
        ];
        let report = check_tail_invariance(
            |xs: &[u8]| xs[xs.len() - 1] == xs[xs.len() - 2],
            &sections,
            &patches,
        );
        assert!(report.ok);
    }

    #[test]
    fn out_of_range_patch_coordinates_are_ignored() {
        let p = FinitePatch::new("overflow", vec![(7usize, 1u8)]);
        assert_eq!(p.apply(&[0u8, 0]), vec![0, 0]);
    }
}
