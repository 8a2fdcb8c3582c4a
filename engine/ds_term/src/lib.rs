//! Core model of the DS deduction language.
//!
//! This crate contains the value types every other engine crate builds on:
//! - [`Term`]: the variable / item / list sum type, with the canonical
//!   lisp-form parser and unparser
//! - [`Rule`]: premises plus conclusion, with the multi-line canonical form
//! - substitution: [`Term::ground`], [`Term::rename`], [`Term::matches`]
//!   and their pointwise lifts on [`Rule`]
//! - [`buffer`]: the process-wide serialisation ceiling with scoped
//!   overrides
//!
//! Serialisation is fallible by design: any rendering that would exceed
//! the active byte ceiling fails with [`DsError::BufferTooSmall`] instead
//! of truncating. Semantic failures of the substitution operations (no
//! match, ill-shaped dictionary) are in-band `None` values, never errors.

pub mod buffer;
mod error;
mod parser;
mod rule;
mod subst;
mod term;

pub use error::DsError;
pub use rule::Rule;
pub use term::Term;
