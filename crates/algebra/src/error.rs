//! Error types for the finite kernel algebra.
//!
//! These are structural errors: attempts to build or wire objects that
//! are mathematically undefined. Composition `f ; g` only exists when
//! `cod(f)` and `dom(g)` are the same object, so a mismatch is not a
//! recoverable condition — it is programmer error in model construction.
//! Law violations are never represented here; oracles report those as
//! plain values.

use thiserror::Error;

/// Errors raised by finite sets, distributions, and kernel composition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlgebraError {
    /// A finite set was built from an enumeration with repeated elements.
    #[error("Duplicate element at position {index} while building {fin}")]
    DuplicateElement { index: usize, fin: String },

    /// A distribution entry (or kernel output) lies outside the finite
    /// set it is being read against.
    #[error("Element not found in {fin}")]
    UnknownElement { fin: String },

    /// Kleisli composition across objects that are not the same object.
    #[error("Cannot compose: codomain {codomain} is not the domain {domain}")]
    CompositionMismatch { codomain: String, domain: String },
}
