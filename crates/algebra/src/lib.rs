//! # finstoch-algebra — Finite Kernel Algebra
//!
//! The leaf layers of a finite Markov-category engine: semiring
//! parameters, finite sets, semiring-weighted distributions, and Markov
//! kernels wrapped as category morphisms.
//!
//! ## Core Concepts
//!
//! - **Weights are a parameter**: all arithmetic and comparison route
//!   through a [`Semiring`] value passed at construction — probabilities
//!   are one instance, not an assumption.
//! - **Objects are finite sets**: a [`Fin`] carries a stable enumeration
//!   order and an explicit equality predicate, shared by reference so
//!   composition can insist on the *same* object at each boundary.
//! - **Kernels are morphisms**: a [`FinMarkov`] is a pure function from
//!   domain elements to weighted distributions over the codomain, with
//!   Kleisli composition, tensor, and a matrix form.
//!
//! ## Example: a noisy sensor as a morphism
//!
//! ```rust
//! use finstoch_algebra::{Dist, Fin, FinMarkov, ProbSemiring};
//!
//! let r = ProbSemiring::probability();
//! let gauge = Fin::new(vec!["calibrated", "uncalibrated"]).unwrap();
//! let verdict = Fin::new(vec!["ok", "inspect"]).unwrap();
//!
//! let cod = verdict.clone();
//! let sensor = FinMarkov::new(r, gauge, verdict, move |g: &&str| {
//!     let (ok, inspect) = if *g == "calibrated" { (0.82, 0.18) } else { (0.05, 0.95) };
//!     Dist::new(vec![(cod.elems()[0], ok), (cod.elems()[1], inspect)])
//! });
//!
//! let row = sensor.row(&"calibrated").unwrap();
//! assert!((row[0] - 0.82).abs() < 1e-9);
//! ```
//!
//! Everything here is pure and immutable: morphisms never mutate their
//! objects, and two evaluations of the same kernel may run concurrently
//! without coordination.

mod dist;
mod error;
mod fin;
mod kernel;
mod semiring;

pub use dist::Dist;
pub use error::AlgebraError;
pub use fin::Fin;
pub use kernel::{FinMarkov, KernelFn};
pub use semiring::{BoolSemiring, ProbSemiring, Semiring, WeightKind};
