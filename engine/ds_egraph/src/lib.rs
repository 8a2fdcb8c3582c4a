//! E-graph over DS terms: hash-consing, union-find, congruence closure.
//!
//! An [`EGraph`] maintains equivalence classes of e-nodes. [`EGraph::add`]
//! hash-conses a node into its class, [`EGraph::merge`] unifies two classes
//! and defers congruence repair, and [`EGraph::rebuild`] drains the pending
//! worklist until the congruence invariant holds again: nodes with equal
//! operators and pairwise-equivalent children share a class.
//!
//! Between `merge` and the next `rebuild` the hashcons and parent index may
//! hold stale entries; [`EGraph::find`] stays correct throughout.

mod egraph;
mod enode;
mod union_find;

pub use egraph::EGraph;
pub use enode::ENode;
pub use union_find::{EClassId, UnionFind};
