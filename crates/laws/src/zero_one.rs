//! Zero-one law oracles: Kolmogorov and Hewitt–Savage certification.
//!
//! A zero-one witness bundles a prior kernel into an indexed product
//! object, a tail statistic out of it, and a family of finite marginal
//! projections (plus, for Hewitt–Savage, index symmetries). The checks
//! compose the lower oracles: conditional independence of the marginals
//! from the statistic (globally and per marginal), determinism of the
//! composite `prior ; stat`, and — for Hewitt–Savage — permutation
//! invariance. Every obligation family is evaluated independently and
//! every failure lands in a single attributed list; `holds` is the
//! conjunction.
//!
//! Witnesses are value objects; reports are freshly computed,
//! side-effect-free projections over them.

use std::fmt;

use finstoch_algebra::{Fin, FinMarkov, Semiring};
use serde::{Deserialize, Serialize};

use crate::determinism::{is_deterministic, rows_not_one_hot};
use crate::error::LawError;
use crate::independence::{factorization_mismatches, radix_decode, radix_len};
use crate::permutation::{check_finite_permutation_invariance, IndexPermutation, PermutationReport};
use crate::CheckOptions;

// ============================================================================
// Witnesses
// ============================================================================

/// A named finite marginal: a projection morphism out of the product
/// object, together with the coordinates it reads.
#[derive(Clone)]
pub struct FiniteMarginal<S: Semiring, X> {
    /// Name used in failure attribution, e.g. `"F={0,2}"`.
    pub label: String,
    /// The coordinates this marginal restricts to.
    pub coords: Vec<usize>,
    /// The projection morphism.
    pub proj: FinMarkov<S, Vec<X>, Vec<X>>,
}

/// Build the deterministic coordinate-restriction marginal for a set of
/// coordinates.
///
/// # Errors
///
/// Fails if a coordinate is out of range for the domain's
/// configurations.
pub fn coordinate_marginal<S, X>(
    sem: &S,
    domain: &Fin<Vec<X>>,
    codomain: &Fin<Vec<X>>,
    label: impl Into<String>,
    coords: Vec<usize>,
) -> Result<FiniteMarginal<S, X>, LawError>
where
    S: Semiring + 'static,
    X: Clone + 'static,
{
    let label = label.into();
    let len = domain.elems().first().map_or(0, |xs| xs.len());
    if let Some(&coord) = coords.iter().find(|&&c| c >= len) {
        return Err(LawError::CoordinateOutOfRange { label, coord, len });
    }
    let picked = coords.clone();
    let proj = FinMarkov::det(sem.clone(), domain.clone(), codomain.clone(), move |xs: &Vec<X>| {
        picked.iter().map(|&c| xs[c].clone()).collect()
    });
    Ok(FiniteMarginal { label, coords, proj })
}

/// A Kolmogorov zero-one witness: prior, tail statistic, and finite
/// marginals, all over the same product object.
#[derive(Clone)]
pub struct KolmogorovWitness<S: Semiring, A, X, T> {
    pub prior: FinMarkov<S, A, Vec<X>>,
    pub stat: FinMarkov<S, Vec<X>, T>,
    pub finite_marginals: Vec<FiniteMarginal<S, X>>,
    pub label: String,
}

/// Bundle a Kolmogorov witness, failing fast on wiring mistakes.
///
/// # Errors
///
/// The statistic's domain must be the prior's codomain (same object),
/// and every marginal projection must share that domain.
pub fn build_kolmogorov_witness<S, A, X, T>(
    prior: FinMarkov<S, A, Vec<X>>,
    stat: FinMarkov<S, Vec<X>, T>,
    finite_marginals: Vec<FiniteMarginal<S, X>>,
    label: impl Into<String>,
) -> Result<KolmogorovWitness<S, A, X, T>, LawError>
where
    S: Semiring + 'static,
    A: Clone + 'static,
    X: Clone + 'static,
    T: Clone + 'static,
{
    if !prior.cod().same_object(stat.dom()) {
        return Err(LawError::StatDomainMismatch {
            prior: prior.cod().describe(),
            stat: stat.dom().describe(),
        });
    }
    for m in &finite_marginals {
        if !m.proj.dom().same_object(stat.dom()) {
            return Err(LawError::MarginalDomainMismatch {
                label: m.label.clone(),
            });
        }
    }
    Ok(KolmogorovWitness {
        prior,
        stat,
        finite_marginals,
        label: label.into(),
    })
}

/// A Hewitt–Savage witness: a Kolmogorov witness plus finite index
/// symmetries.
#[derive(Clone)]
pub struct HewittSavageWitness<S: Semiring, A, X, T> {
    pub kolmogorov: KolmogorovWitness<S, A, X, T>,
    pub permutations: Vec<IndexPermutation>,
}

/// Bundle a Hewitt–Savage witness.
///
/// # Errors
///
/// In addition to the Kolmogorov wiring checks, every permutation must
/// act on exactly the prior's configuration length.
pub fn build_hewitt_savage_witness<S, A, X, T>(
    prior: FinMarkov<S, A, Vec<X>>,
    stat: FinMarkov<S, Vec<X>, T>,
    finite_marginals: Vec<FiniteMarginal<S, X>>,
    permutations: Vec<IndexPermutation>,
    label: impl Into<String>,
) -> Result<HewittSavageWitness<S, A, X, T>, LawError>
where
    S: Semiring + 'static,
    A: Clone + 'static,
    X: Clone + 'static,
    T: Clone + 'static,
{
    let kolmogorov = build_kolmogorov_witness(prior, stat, finite_marginals, label)?;
    let expected = kolmogorov
        .prior
        .cod()
        .elems()
        .first()
        .map_or(0, |xs| xs.len());
    for p in &permutations {
        if p.len() != expected {
            return Err(LawError::PermutationLengthMismatch {
                label: p.label().to_string(),
                expected,
                got: p.len(),
            });
        }
    }
    Ok(HewittSavageWitness {
        kolmogorov,
        permutations,
    })
}

// ============================================================================
// Reports
// ============================================================================

/// One attributed zero-one obligation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZeroOneFailure {
    /// The joint over all finite marginals and the statistic does not
    /// factor, conditionally on this input.
    GlobalIndependence {
        input: String,
        point: String,
        observed: String,
        expected: String,
    },
    /// One named marginal fails conditional independence from the
    /// statistic.
    MarginalIndependence {
        marginal: String,
        input: String,
        point: String,
        observed: String,
        expected: String,
    },
    /// The composite `prior ; stat` is not Dirac at this input.
    NotDeterministic { input: String, support: usize },
    /// The composite is Dirac but not one-hot within the requested
    /// tolerance.
    DeterminismTolerance { input: String },
    /// A symmetry moves the composite (Hewitt–Savage only).
    PermutationVariance {
        permutation: String,
        input: String,
        output: String,
    },
}

impl fmt::Display for ZeroOneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalIndependence {
                input,
                point,
                observed,
                expected,
            } => write!(
                f,
                "global independence fails at input {input}, point {point}: observed {observed}, expected {expected}"
            ),
            Self::MarginalIndependence {
                marginal,
                input,
                point,
                observed,
                expected,
            } => write!(
                f,
                "marginal {marginal} fails independence at input {input}, point {point}: observed {observed}, expected {expected}"
            ),
            Self::NotDeterministic { input, support } => write!(
                f,
                "composite statistic is not deterministic at input {input}: {support} support points"
            ),
            Self::DeterminismTolerance { input } => write!(
                f,
                "composite statistic is dirac but not one-hot within tolerance at input {input}"
            ),
            Self::PermutationVariance {
                permutation,
                input,
                output,
            } => write!(
                f,
                "permutation {permutation} moves the composite at input {input}, output {output}"
            ),
        }
    }
}

/// Per-marginal verdict inside a zero-one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalVerdict {
    pub label: String,
    pub independent: bool,
}

/// The Kolmogorov zero-one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroOneReport {
    /// Conjunction of every obligation family.
    pub holds: bool,
    /// Global conditional independence across all marginals jointly.
    pub ci_global: bool,
    /// Per-marginal conditional independence verdicts.
    pub ci_marginals: Vec<MarginalVerdict>,
    /// Determinism of `prior ; stat`.
    pub deterministic: bool,
    /// Every failure, with source attribution.
    pub failures: Vec<ZeroOneFailure>,
    /// Human-readable summary.
    pub details: String,
}

/// The Hewitt–Savage report: the Kolmogorov report extended with the
/// permutation obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HewittSavageReport {
    pub kolmogorov: ZeroOneReport,
    pub permutation_invariant: bool,
    pub permutation_failures: Vec<ZeroOneFailure>,
    /// Conjunction of the Kolmogorov verdict and permutation
    /// invariance.
    pub holds: bool,
}

impl HewittSavageReport {
    /// Every failure from both layers, in evaluation order.
    pub fn all_failures(&self) -> Vec<ZeroOneFailure> {
        let mut out = self.kolmogorov.failures.clone();
        out.extend(self.permutation_failures.iter().cloned());
        out
    }
}

// ============================================================================
// Checks
// ============================================================================

struct Component<'a, S: Semiring> {
    label: String,
    rows: Vec<Vec<S::W>>,
    render: Box<dyn Fn(usize) -> String + 'a>,
}

/// Rows of a kernel per configuration of the shared domain, plus a
/// renderer for its codomain elements.
fn component_of<'a, S, X, Y>(
    label: impl Into<String>,
    k: &'a FinMarkov<S, Vec<X>, Y>,
) -> Result<Component<'a, S>, LawError>
where
    S: Semiring + 'static,
    X: Clone + 'static,
    Y: Clone + fmt::Debug + 'static,
{
    Ok(Component {
        label: label.into(),
        rows: k.matrix()?,
        render: Box::new(move |i| format!("{:?}", k.cod().elems()[i])),
    })
}

/// First factorization mismatch per input for the joint of the given
/// components conditioned through the prior.
fn conditional_factorization<S, A, X>(
    prior: &FinMarkov<S, A, Vec<X>>,
    components: &[Component<'_, S>],
    tolerance: f64,
) -> Result<Vec<(String, String, String, String)>, LawError>
where
    S: Semiring + 'static,
    A: Clone + fmt::Debug + 'static,
    X: Clone + 'static,
{
    let sem = prior.semiring();
    let sizes: Vec<usize> = components
        .iter()
        .map(|c| c.rows.first().map_or(0, Vec::len))
        .collect();
    let full = radix_len(&sizes);

    let mut out = Vec::new();
    for a in prior.dom().elems() {
        let p_row = prior.row(a)?;
        let mut joint = vec![sem.zero(); full];
        for (j, w) in p_row.iter().enumerate() {
            if sem.is_zero(w) {
                continue;
            }
            for (flat, cell) in joint.iter_mut().enumerate() {
                let digits = radix_decode(flat, &sizes);
                let contribution = digits
                    .iter()
                    .enumerate()
                    .fold(w.clone(), |acc, (i, &d)| sem.mul(&acc, &components[i].rows[j][d]));
                *cell = sem.add(cell, &contribution);
            }
        }
        if let Some(m) = factorization_mismatches(sem, &joint, &sizes, tolerance)
            .into_iter()
            .next()
        {
            let digits = radix_decode(m.flat, &sizes);
            let point = digits
                .iter()
                .enumerate()
                .map(|(i, &d)| format!("{}={}", components[i].label, (components[i].render)(d)))
                .collect::<Vec<_>>()
                .join(", ");
            out.push((
                format!("{:?}", a),
                point,
                format!("{:?}", m.observed),
                format!("{:?}", m.expected),
            ));
        }
    }
    Ok(out)
}

/// Certify the Kolmogorov zero-one obligations for a witness.
///
/// Three obligation families are evaluated independently: global
/// conditional independence of all finite marginals jointly from the
/// tail statistic, per-marginal conditional independence, and
/// determinism of the composite `prior ; stat`. `holds` is their
/// conjunction; every failure is attributed in `failures`.
pub fn check_kolmogorov_zero_one<S, A, X, T>(
    witness: &KolmogorovWitness<S, A, X, T>,
    options: &CheckOptions,
) -> Result<ZeroOneReport, LawError>
where
    S: Semiring + 'static,
    A: Clone + fmt::Debug + 'static,
    X: Clone + fmt::Debug + 'static,
    T: Clone + fmt::Debug + 'static,
{
    let mut failures = Vec::new();

    // (a) Global: all marginals jointly, plus the statistic.
    let mut components = Vec::with_capacity(witness.finite_marginals.len() + 1);
    for m in &witness.finite_marginals {
        components.push(component_of(m.label.clone(), &m.proj)?);
    }
    components.push(component_of("stat", &witness.stat)?);
    let global = conditional_factorization(&witness.prior, &components, options.tolerance)?;
    let ci_global = global.is_empty();
    for (input, point, observed, expected) in global {
        failures.push(ZeroOneFailure::GlobalIndependence {
            input,
            point,
            observed,
            expected,
        });
    }

    // (b) Each named marginal against the statistic.
    let mut ci_marginals = Vec::with_capacity(witness.finite_marginals.len());
    for m in &witness.finite_marginals {
        let pair = vec![
            component_of(m.label.clone(), &m.proj)?,
            component_of("stat", &witness.stat)?,
        ];
        let mismatches = conditional_factorization(&witness.prior, &pair, options.tolerance)?;
        ci_marginals.push(MarginalVerdict {
            label: m.label.clone(),
            independent: mismatches.is_empty(),
        });
        for (input, point, observed, expected) in mismatches {
            failures.push(ZeroOneFailure::MarginalIndependence {
                marginal: m.label.clone(),
                input,
                point,
                observed,
                expected,
            });
        }
    }

    // (c) The composite statistic must be deterministic, exactly so
    // within tolerance.
    let composite = witness.prior.then(&witness.stat)?;
    let recognizer = is_deterministic(&composite, composite.dom().elems())?;
    for f in &recognizer.failures {
        failures.push(ZeroOneFailure::NotDeterministic {
            input: format!("{:?}", f.input),
            support: f.support,
        });
    }
    let mut deterministic = recognizer.deterministic;
    if deterministic {
        for input in rows_not_one_hot(&composite, options.tolerance)? {
            deterministic = false;
            failures.push(ZeroOneFailure::DeterminismTolerance {
                input: format!("{:?}", input),
            });
        }
    }

    let holds = failures.is_empty();
    let details = if holds {
        format!("{}: all zero-one obligations hold", witness.label)
    } else {
        format!("{}: {} obligation(s) failed", witness.label, failures.len())
    };
    Ok(ZeroOneReport {
        holds,
        ci_global,
        ci_marginals,
        deterministic,
        failures,
        details,
    })
}

/// Certify the Hewitt–Savage obligations: everything Kolmogorov checks,
/// plus invariance of the composite under every supplied symmetry.
pub fn check_hewitt_savage_zero_one<S, A, X, T>(
    witness: &HewittSavageWitness<S, A, X, T>,
    options: &CheckOptions,
) -> Result<HewittSavageReport, LawError>
where
    S: Semiring + 'static,
    A: Clone + fmt::Debug + 'static,
    X: Clone + fmt::Debug + 'static,
    T: Clone + fmt::Debug + 'static,
{
    let kolmogorov = check_kolmogorov_zero_one(&witness.kolmogorov, options)?;
    let PermutationReport { holds, failures } = check_finite_permutation_invariance(
        &witness.kolmogorov.prior,
        &witness.kolmogorov.stat,
        &witness.permutations,
        options,
    )?;
    let permutation_failures = failures
        .into_iter()
        .map(|f| ZeroOneFailure::PermutationVariance {
            permutation: f.permutation,
            input: f.input,
            output: f.output,
        })
        .collect::<Vec<_>>();
    Ok(HewittSavageReport {
        holds: kolmogorov.holds && holds,
        kolmogorov,
        permutation_invariant: holds,
        permutation_failures,
    })
}
