//! Bidirectional bridge between the canonical lisp form (*Ds*) and the
//! human-readable surface syntax (*Dsp*).
//!
//! The mapping is shape-for-shape and total in both directions on the four
//! recognised list heads:
//!
//! ```text
//! (binary OP a b)     <->  (a OP b)
//! (unary OP a)        <->  OP a
//! (function f a ...)  <->  f(a, ...)
//! (subscript a i ...) <->  a[i, ...]
//! ```
//!
//! Rules keep their two renderings: premises comma-separated before `->`
//! on the Dsp side, premises stacked over a dash separator line on the Ds
//! side. A fact unparses to ` -> term` and parses back.
//!
//! The bridge works purely on strings with its own readers for both
//! syntaxes; it does not depend on the engine crates. Errors carry
//! line/column diagnostics.

mod ds;
mod dsp;
mod error;
mod token;

pub use ds::unparse;
pub use dsp::parse;
pub use error::SurfaceError;
