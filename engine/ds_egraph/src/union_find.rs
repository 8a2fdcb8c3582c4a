//! Disjoint sets of e-class ids.

use std::fmt;

/// Identifier of an e-class.
///
/// Ids are dense integers drawn monotonically from a per-graph counter, so
/// the union-find stores them as indices into a flat vector.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct EClassId(u32);

impl EClassId {
    pub(crate) fn from_index(index: usize) -> EClassId {
        let id = u32::try_from(index).unwrap_or_else(|_| panic!("e-class id space exhausted"));
        EClassId(id)
    }

    /// Position of this id in dense storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Union-find with path halving.
#[derive(Default, Clone, Debug)]
pub struct UnionFind {
    parents: Vec<EClassId>,
}

impl UnionFind {
    pub fn new() -> UnionFind {
        UnionFind::default()
    }

    /// Allocate a fresh singleton set.
    pub fn make_set(&mut self) -> EClassId {
        let id = EClassId::from_index(self.parents.len());
        self.parents.push(id);
        id
    }

    fn parent(&self, id: EClassId) -> EClassId {
        self.parents[id.index()]
    }

    /// Canonical representative of `id`'s set.
    ///
    /// Compresses the walked path, so `find(find(x)) == find(x)`.
    pub fn find(&mut self, mut id: EClassId) -> EClassId {
        while self.parent(id) != id {
            let grandparent = self.parent(self.parent(id));
            self.parents[id.index()] = grandparent;
            id = grandparent;
        }
        id
    }

    /// Unify two sets; the left representative wins.
    pub fn union(&mut self, a: EClassId, b: EClassId) -> EClassId {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parents[root_b.index()] = root_a;
        }
        root_a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_sets_are_their_own_representative() {
        let mut uf = UnionFind::new();
        let a = uf.make_set();
        assert_eq!(uf.find(a), a);
    }

    #[test]
    fn union_left_wins() {
        let mut uf = UnionFind::new();
        let a = uf.make_set();
        let b = uf.make_set();
        assert_eq!(uf.union(a, b), a);
        assert_eq!(uf.find(b), a);
    }

    #[test]
    fn union_same_set_is_noop() {
        let mut uf = UnionFind::new();
        let a = uf.make_set();
        assert_eq!(uf.union(a, a), a);
    }

    #[test]
    fn find_is_idempotent_across_chains() {
        let mut uf = UnionFind::new();
        let a = uf.make_set();
        let b = uf.make_set();
        let c = uf.make_set();
        uf.union(a, b);
        uf.union(b, c);
        assert_eq!(uf.find(c), a);
        let root = uf.find(c);
        assert_eq!(uf.find(root), root);
    }
}
