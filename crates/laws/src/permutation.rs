//! Invariance of composite kernels under finite index symmetries.
//!
//! A prior over an indexed product object (configurations `Vec<X>`) and
//! a statistic out of it are permutation invariant when relabelling the
//! prior's coordinates by any supplied symmetry leaves the composite
//! `prior ; stat` unchanged at every input.

use finstoch_algebra::{FinMarkov, Semiring};
use serde::{Deserialize, Deserializer, Serialize};

use crate::comonoid::rows_eq;
use crate::error::LawError;
use crate::CheckOptions;

/// A named finite symmetry of the coordinate index set.
///
/// Deserialization re-runs the bijection validation, so a decoded value
/// upholds the same invariant as one built through
/// [`IndexPermutation::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPermutation {
    label: String,
    map: Vec<usize>,
}

impl<'de> Deserialize<'de> for IndexPermutation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            label: String,
            map: Vec<usize>,
        }
        let raw = Raw::deserialize(deserializer)?;
        IndexPermutation::new(raw.label, raw.map).map_err(serde::de::Error::custom)
    }
}

impl IndexPermutation {
    /// Build a permutation; `map[i]` is the source coordinate placed at
    /// position `i`.
    ///
    /// # Errors
    ///
    /// Fails unless `map` is a bijection on `0..map.len()`.
    pub fn new(label: impl Into<String>, map: Vec<usize>) -> Result<Self, LawError> {
        let label = label.into();
        let len = map.len();
        let mut seen = vec![false; len];
        for &i in &map {
            if i >= len || seen[i] {
                return Err(LawError::InvalidPermutation { label, len });
            }
            seen[i] = true;
        }
        Ok(Self { label, map })
    }

    /// The identity symmetry on `n` coordinates.
    pub fn identity(n: usize) -> Self {
        Self {
            label: "identity".to_string(),
            map: (0..n).collect(),
        }
    }

    /// The transposition of two coordinates.
    pub fn swap(n: usize, i: usize, j: usize) -> Result<Self, LawError> {
        let mut map: Vec<usize> = (0..n).collect();
        if i >= n || j >= n {
            return Err(LawError::InvalidPermutation {
                label: format!("swap {}<->{}", i, j),
                len: n,
            });
        }
        map.swap(i, j);
        Self::new(format!("swap {}<->{}", i, j), map)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of coordinates acted on.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Relabel a configuration's coordinates.
    pub fn apply_to<X: Clone>(&self, xs: &[X]) -> Vec<X> {
        self.map.iter().map(|&i| xs[i].clone()).collect()
    }
}

/// A divergence exposed by one symmetry at one input/output pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationFailure {
    /// Label of the violating symmetry.
    pub permutation: String,
    /// The domain input where the composites diverge.
    pub input: String,
    /// The statistic output where the weights differ.
    pub output: String,
    /// Weight under the original composite.
    pub original: String,
    /// Weight under the relabelled composite.
    pub relabelled: String,
}

/// Verdict of the permutation-invariance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationReport {
    pub holds: bool,
    pub failures: Vec<PermutationFailure>,
}

/// Check that `relabel(prior) ; stat` equals `prior ; stat` for every
/// supplied symmetry and every domain input, under tolerance.
pub fn check_finite_permutation_invariance<S, A, X, T>(
    prior: &FinMarkov<S, A, Vec<X>>,
    stat: &FinMarkov<S, Vec<X>, T>,
    permutations: &[IndexPermutation],
    options: &CheckOptions,
) -> Result<PermutationReport, LawError>
where
    S: Semiring + 'static,
    A: Clone + std::fmt::Debug + 'static,
    X: Clone + 'static,
    T: Clone + std::fmt::Debug + 'static,
{
    if !prior.cod().same_object(stat.dom()) {
        return Err(LawError::StatDomainMismatch {
            prior: prior.cod().describe(),
            stat: stat.dom().describe(),
        });
    }
    let sem = prior.semiring();
    let configs = prior.cod();

    // Statistic rows per configuration, computed once.
    let stat_rows: Vec<Vec<S::W>> = stat.matrix()?;

    let mut failures = Vec::new();
    for sigma in permutations {
        for a in prior.dom().elems() {
            let p_row = prior.row(a)?;

            let mut original = vec![sem.zero(); stat.cod().len()];
            let mut relabelled = vec![sem.zero(); stat.cod().len()];
            for (j, w) in p_row.iter().enumerate() {
                if sem.is_zero(w) {
                    continue;
                }
                for (k, v) in stat_rows[j].iter().enumerate() {
                    original[k] = sem.add(&original[k], &sem.mul(w, v));
                }
                let moved = sigma.apply_to(&configs.elems()[j]);
                let jm = configs.index_of(&moved).ok_or_else(|| {
                    LawError::Algebra(finstoch_algebra::AlgebraError::UnknownElement {
                        fin: configs.describe(),
                    })
                })?;
                for (k, v) in stat_rows[jm].iter().enumerate() {
                    relabelled[k] = sem.add(&relabelled[k], &sem.mul(w, v));
                }
            }

            if !rows_eq(sem, &original, &relabelled, options.tolerance) {
                let k = (0..original.len())
                    .find(|&k| !sem.eq_within(&original[k], &relabelled[k], options.tolerance))
                    .unwrap_or(0);
                failures.push(PermutationFailure {
                    permutation: sigma.label().to_string(),
                    input: format!("{:?}", a),
                    output: format!("{:?}", stat.cod().elems()[k]),
                    original: format!("{:?}", original[k]),
                    relabelled: format!("{:?}", relabelled[k]),
                });
            }
        }
    }

    Ok(PermutationReport {
        holds: failures.is_empty(),
        failures,
    })
}
