//! E-nodes: an operator over e-class children.

use std::fmt;

use smallvec::SmallVec;

use crate::{EClassId, UnionFind};

/// An e-node: an operator string and ordered child e-class ids.
///
/// List terms use the literal operator `"()"`; leaves (items and
/// variables) use their canonical text and have no children. Equality and
/// hashing are structural.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ENode {
    op: String,
    children: SmallVec<[EClassId; 4]>,
}

impl ENode {
    /// Build a node from an operator and its children.
    pub fn new(op: impl Into<String>, children: impl IntoIterator<Item = EClassId>) -> ENode {
        ENode {
            op: op.into(),
            children: children.into_iter().collect(),
        }
    }

    /// Build a childless node.
    pub fn leaf(op: impl Into<String>) -> ENode {
        ENode::new(op, [])
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn children(&self) -> &[EClassId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The node with every child replaced by its representative.
    pub(crate) fn canonicalize(&self, unionfind: &mut UnionFind) -> ENode {
        ENode {
            op: self.op.clone(),
            children: self
                .children
                .iter()
                .map(|&child| unionfind.find(child))
                .collect(),
        }
    }
}

impl fmt::Display for ENode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.op);
        }
        write!(f, "({}", self.op)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}
