//! Conditional independence of a joint kernel's output components.
//!
//! Given a joint kernel `A → Y_1 ⊗ … ⊗ Y_k`, the outputs are
//! conditionally independent given the input when, for every `a`, the
//! joint distribution equals the pointwise semiring product of the
//! per-component marginals. The factorization core works in a
//! mixed-radix index space over the component objects and is shared
//! with the zero-one oracles.

use finstoch_algebra::{FinMarkov, Semiring};

use crate::comonoid::ComonoidWitness;
use crate::error::LawError;
use crate::CheckOptions;

// ============================================================================
// Mixed-radix product factorization core
// ============================================================================

pub(crate) fn radix_len(sizes: &[usize]) -> usize {
    sizes.iter().product()
}

/// Row-major digits of `flat` with respect to `sizes`.
pub(crate) fn radix_decode(mut flat: usize, sizes: &[usize]) -> Vec<usize> {
    let mut digits = vec![0; sizes.len()];
    for i in (0..sizes.len()).rev() {
        digits[i] = flat % sizes[i];
        flat /= sizes[i];
    }
    digits
}

pub(crate) fn radix_encode(digits: &[usize], sizes: &[usize]) -> usize {
    digits
        .iter()
        .zip(sizes.iter())
        .fold(0, |acc, (d, s)| acc * s + d)
}

/// A point of the product space where the joint and the product of its
/// marginals disagree.
pub(crate) struct FactorMismatch<W> {
    pub flat: usize,
    pub observed: W,
    pub expected: W,
}

/// Compare a dense joint distribution over a mixed-radix product space
/// against the product of its own marginals.
pub(crate) fn factorization_mismatches<S: Semiring>(
    sem: &S,
    joint: &[S::W],
    sizes: &[usize],
    tolerance: f64,
) -> Vec<FactorMismatch<S::W>> {
    let mut marginals: Vec<Vec<S::W>> = sizes.iter().map(|&s| vec![sem.zero(); s]).collect();
    for (flat, w) in joint.iter().enumerate() {
        if sem.is_zero(w) {
            continue;
        }
        for (i, d) in radix_decode(flat, sizes).into_iter().enumerate() {
            marginals[i][d] = sem.add(&marginals[i][d], w);
        }
    }

    let mut mismatches = Vec::new();
    for (flat, observed) in joint.iter().enumerate() {
        let digits = radix_decode(flat, sizes);
        let expected = digits
            .iter()
            .enumerate()
            .fold(sem.one(), |acc, (i, &d)| sem.mul(&acc, &marginals[i][d]));
        if !sem.eq_within(observed, &expected, tolerance) {
            mismatches.push(FactorMismatch {
                flat,
                observed: observed.clone(),
                expected,
            });
        }
    }
    mismatches
}

// ============================================================================
// Conditional-independence witness
// ============================================================================

/// A joint kernel bundled with the comonoid witnesses of its domain and
/// output components. Built once, checked without mutation.
#[derive(Clone)]
pub struct ConditionalWitness<S: Semiring, A, Y> {
    domain: ComonoidWitness<A>,
    outputs: Vec<ComonoidWitness<Y>>,
    joint: FinMarkov<S, A, Vec<Y>>,
    label: String,
}

/// Bundle a joint kernel with its domain and output witnesses.
///
/// # Errors
///
/// Fails fast when the joint's domain is not the witness's domain
/// object, or when any joint codomain element is not a well-formed
/// tuple over the output objects.
pub fn build_conditional_witness<S, A, Y>(
    domain: ComonoidWitness<A>,
    outputs: Vec<ComonoidWitness<Y>>,
    joint: FinMarkov<S, A, Vec<Y>>,
    label: impl Into<String>,
) -> Result<ConditionalWitness<S, A, Y>, LawError>
where
    S: Semiring + 'static,
    A: Clone + 'static,
    Y: Clone + 'static,
{
    if !joint.dom().same_object(domain.object()) {
        return Err(LawError::JointDomainMismatch);
    }
    let arity = outputs.len();
    for (index, tuple) in joint.cod().elems().iter().enumerate() {
        let well_formed = tuple.len() == arity
            && tuple
                .iter()
                .zip(outputs.iter())
                .all(|(y, w)| w.object().contains(y));
        if !well_formed {
            return Err(LawError::JointCodomainMismatch { index, arity });
        }
    }
    Ok(ConditionalWitness {
        domain,
        outputs,
        joint,
        label: label.into(),
    })
}

impl<S: Semiring, A, Y> ConditionalWitness<S, A, Y> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn domain(&self) -> &ComonoidWitness<A>
    where
        A: Clone + 'static,
    {
        &self.domain
    }

    pub fn outputs(&self) -> &[ComonoidWitness<Y>] {
        &self.outputs
    }

    pub fn joint(&self) -> &FinMarkov<S, A, Vec<Y>> {
        &self.joint
    }
}

/// First factorization mismatch recorded for an input.
#[derive(Debug, Clone, PartialEq)]
pub struct CiFailure<A, Y, W> {
    /// The conditioning input.
    pub input: A,
    /// The offending support point of the joint.
    pub point: Vec<Y>,
    /// Joint weight observed there.
    pub observed: W,
    /// Product of the marginal weights expected there.
    pub expected: W,
}

/// Verdict of the conditional-independence check.
#[derive(Debug, Clone)]
pub struct CiReport<A, Y, W> {
    pub holds: bool,
    /// At most one failure per conditioning input.
    pub failures: Vec<CiFailure<A, Y, W>>,
}

/// Check that the joint factors into the product of its per-component
/// marginals at every input. The first mismatch per input is recorded
/// with both compared weights.
pub fn check_conditional_independence<S, A, Y>(
    witness: &ConditionalWitness<S, A, Y>,
    options: &CheckOptions,
) -> Result<CiReport<A, Y, S::W>, LawError>
where
    S: Semiring + 'static,
    A: Clone + 'static,
    Y: Clone + 'static,
{
    let sem = witness.joint.semiring();
    let sizes: Vec<usize> = witness.outputs.iter().map(|w| w.object().len()).collect();
    let full = radix_len(&sizes);

    let mut failures = Vec::new();
    for a in witness.domain.object().elems() {
        // Spread the joint row over the full product index space.
        let row = witness.joint.row(a)?;
        let mut dense = vec![sem.zero(); full];
        for (tuple, w) in witness.joint.cod().elems().iter().zip(row.iter()) {
            let digits: Vec<usize> = tuple
                .iter()
                .zip(witness.outputs.iter())
                .filter_map(|(y, out)| out.object().index_of(y))
                .collect();
            let flat = radix_encode(&digits, &sizes);
            dense[flat] = sem.add(&dense[flat], w);
        }

        if let Some(m) =
            factorization_mismatches(sem, &dense, &sizes, options.tolerance).into_iter().next()
        {
            let digits = radix_decode(m.flat, &sizes);
            let point: Vec<Y> = digits
                .iter()
                .zip(witness.outputs.iter())
                .map(|(&d, out)| out.object().elems()[d].clone())
                .collect();
            failures.push(CiFailure {
                input: a.clone(),
                point,
                observed: m.observed,
                expected: m.expected,
            });
        }
    }

    Ok(CiReport {
        holds: failures.is_empty(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comonoid::build_comonoid_witness;
    use finstoch_algebra::{Dist, Fin, ProbSemiring};

    fn bit() -> Fin<u8> {
        Fin::new(vec![0u8, 1]).unwrap()
    }

    /// Joint kernel over two coordinates; `correlated` couples them.
    fn two_coin_joint(correlated: bool) -> ConditionalWitness<ProbSemiring, &'static str, u8> {
        let r = ProbSemiring::probability();
        let input = Fin::new(vec!["go"]).unwrap();
        let y1 = bit();
        let y2 = bit();
        let cod = Fin::product(&[y1.clone(), y2.clone()]);

        let joint = FinMarkov::new(r, input.clone(), cod, move |_: &&str| {
            let w = |pattern: &[u8], p: f64| (pattern.to_vec(), p);
            let entries = if correlated {
                vec![w(&[0, 0], 0.5), w(&[1, 1], 0.5)]
            } else {
                vec![
                    w(&[0, 0], 0.25),
                    w(&[0, 1], 0.25),
                    w(&[1, 0], 0.25),
                    w(&[1, 1], 0.25),
                ]
            };
            Dist::new(entries)
        });

        build_conditional_witness(
            build_comonoid_witness(&input, "input"),
            vec![
                build_comonoid_witness(&y1, "Y1"),
                build_comonoid_witness(&y2, "Y2"),
            ],
            joint,
            "two coins",
        )
        .unwrap()
    }

    #[test]
    fn independent_coins_factorize() {
        let report =
            check_conditional_independence(&two_coin_joint(false), &CheckOptions::default())
                .unwrap();
        assert!(report.holds);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn correlated_coins_do_not_factorize() {
        let report =
            check_conditional_independence(&two_coin_joint(true), &CheckOptions::default())
                .unwrap();
        assert!(!report.holds);
        assert_eq!(report.failures.len(), 1);
        let f = &report.failures[0];
        // Observed 0.5 on the diagonal vs expected 0.25 product.
        assert!((f.observed - 0.5).abs() < 1e-9 || (f.observed - 0.0).abs() < 1e-9);
        assert!((f.expected - 0.25).abs() < 1e-9);
    }

    #[test]
    fn holds_is_symmetric_in_marginal_ordering() {
        // Asymmetric but independent marginals: Y1 biased, Y2 fair.
        let r = ProbSemiring::probability();
        let input = Fin::new(vec!["go"]).unwrap();
        let y1 = bit();
        let y2 = bit();

        let build = |outputs: Vec<ComonoidWitness<u8>>, flip: bool| {
            let cod = Fin::product(&[bit(), bit()]);
            let joint = FinMarkov::new(r, input.clone(), cod, move |_: &&str| {
                let (p1, q1) = (0.9, 0.1);
                let (p2, q2) = (0.5, 0.5);
                let mut entries = Vec::new();
                for (b1, w1) in [(0u8, p1), (1u8, q1)] {
                    for (b2, w2) in [(0u8, p2), (1u8, q2)] {
                        let tuple = if flip { vec![b2, b1] } else { vec![b1, b2] };
                        entries.push((tuple, w1 * w2));
                    }
                }
                Dist::new(entries)
            });
            build_conditional_witness(
                build_comonoid_witness(&input, "input"),
                outputs,
                joint,
                "ordering",
            )
            .unwrap()
        };

        let forward = build(
            vec![build_comonoid_witness(&y1, "Y1"), build_comonoid_witness(&y2, "Y2")],
            false,
        );
        let reversed = build(
            vec![build_comonoid_witness(&y2, "Y2"), build_comonoid_witness(&y1, "Y1")],
            true,
        );
        let opts = CheckOptions::default();
        assert_eq!(
            check_conditional_independence(&forward, &opts).unwrap().holds,
            check_conditional_independence(&reversed, &opts).unwrap().holds,
        );
    }

    #[test]
    fn build_rejects_mismatched_domain() {
        let r = ProbSemiring::probability();
        let input = Fin::new(vec!["go"]).unwrap();
        let other = Fin::new(vec!["go"]).unwrap();
        let y = bit();
        let cod = Fin::power(&y, 1);
        let joint = FinMarkov::det(r, other, cod, |_: &&str| vec![0u8]);
        let result = build_conditional_witness(
            build_comonoid_witness(&input, "input"),
            vec![build_comonoid_witness(&y, "Y")],
            joint,
            "bad",
        );
        assert!(matches!(result, Err(LawError::JointDomainMismatch)));
    }

    #[test]
    fn build_rejects_malformed_tuples() {
        let r = ProbSemiring::probability();
        let input = Fin::new(vec!["go"]).unwrap();
        let y = bit();
        // Codomain tuples have arity 2, but only one output is declared.
        let cod = Fin::power(&y, 2);
        let joint = FinMarkov::det(r, input.clone(), cod, |_: &&str| vec![0u8, 0]);
        let result = build_conditional_witness(
            build_comonoid_witness(&input, "input"),
            vec![build_comonoid_witness(&y, "Y")],
            joint,
            "bad",
        );
        assert!(matches!(
            result,
            Err(LawError::JointCodomainMismatch { .. })
        ));
    }

    #[test]
    fn radix_round_trip() {
        let sizes = [2usize, 3, 2];
        for flat in 0..radix_len(&sizes) {
            let digits = radix_decode(flat, &sizes);
            assert_eq!(radix_encode(&digits, &sizes), flat);
        }
    }
}
