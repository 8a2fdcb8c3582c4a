//! The e-graph: hashcons, class members, parent index, deferred repair.

use ds_term::Term;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{EClassId, ENode, UnionFind};

/// An e-graph maintaining equivalence classes of e-nodes under congruence.
///
/// Repair is deferred: `merge` only unifies ids and records the touched
/// class on a worklist; `rebuild` drains the worklist to a fixed point and
/// restores the invariants:
///
/// - every hashcons entry maps a canonical node to its representative;
/// - congruent nodes (equal op, pairwise-equivalent children) share a class;
/// - every child's parent index covers every node it appears in.
#[derive(Default)]
pub struct EGraph {
    unionfind: UnionFind,
    hashcons: FxHashMap<ENode, EClassId>,
    /// Members of each representative class.
    classes: FxHashMap<EClassId, FxHashSet<ENode>>,
    /// For each representative, the (parent node, parent class) pairs the
    /// class appears in. A relation over ids, not an ownership link.
    parents: FxHashMap<EClassId, FxHashSet<(ENode, EClassId)>>,
    /// Classes touched by merges since the last rebuild.
    worklist: Vec<EClassId>,
}

impl EGraph {
    pub fn new() -> EGraph {
        EGraph::default()
    }

    /// Canonical representative of `id`.
    pub fn find(&mut self, id: EClassId) -> EClassId {
        self.unionfind.find(id)
    }

    /// True when no merge is pending repair.
    pub fn is_clean(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Number of live (representative) classes.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// All hash-consed nodes with their classes.
    pub fn enodes(&self) -> impl Iterator<Item = (&ENode, EClassId)> {
        self.hashcons.iter().map(|(node, &id)| (node, id))
    }

    /// Members of a class. The id must be canonical (pass it through
    /// [`EGraph::find`] first); a stale id reads as empty.
    pub fn class_nodes(&self, id: EClassId) -> impl Iterator<Item = &ENode> {
        self.classes.get(&id).into_iter().flatten()
    }

    /// The class a node currently belongs to, if hash-consed.
    pub fn lookup(&mut self, enode: &ENode) -> Option<EClassId> {
        let canonical = enode.canonicalize(&mut self.unionfind);
        let id = *self.hashcons.get(&canonical)?;
        Some(self.unionfind.find(id))
    }

    /// Add a node, returning its class.
    ///
    /// The node is canonicalised first; a hashcons hit returns the existing
    /// class, otherwise a fresh class is allocated and the node registered
    /// in each child's parent index.
    pub fn add(&mut self, enode: ENode) -> EClassId {
        let enode = enode.canonicalize(&mut self.unionfind);
        if let Some(&existing) = self.hashcons.get(&enode) {
            return self.unionfind.find(existing);
        }
        let id = self.unionfind.make_set();
        for &child in enode.children() {
            self.parents
                .entry(child)
                .or_default()
                .insert((enode.clone(), id));
        }
        let mut members = FxHashSet::default();
        members.insert(enode.clone());
        self.classes.insert(id, members);
        self.hashcons.insert(enode, id);
        id
    }

    /// Add a DS term bottom-up.
    ///
    /// Lists become `"()"` nodes over their children's classes; items and
    /// variables become leaves labelled with their canonical text, so the
    /// variable `` `x `` and the item `x` land in distinct classes.
    pub fn add_term(&mut self, term: &Term) -> EClassId {
        match term {
            Term::List(children) => {
                let child_ids: Vec<EClassId> =
                    children.iter().map(|child| self.add_term(child)).collect();
                self.add(ENode::new("()", child_ids))
            }
            Term::Variable(name) => self.add(ENode::leaf(format!("`{name}"))),
            Term::Item(name) => self.add(ENode::leaf(name.clone())),
        }
    }

    /// Unify two classes, the left representative winning.
    ///
    /// Members and parent entries of the losing id move to the winner, and
    /// the winner is queued for repair. Congruence is *not* restored until
    /// [`EGraph::rebuild`].
    pub fn merge(&mut self, a: EClassId, b: EClassId) -> EClassId {
        let root_a = self.unionfind.find(a);
        let root_b = self.unionfind.find(b);
        if root_a == root_b {
            return root_a;
        }
        let winner = self.unionfind.union(root_a, root_b);
        if let Some(members) = self.classes.remove(&root_b) {
            self.classes.entry(winner).or_default().extend(members);
        }
        if let Some(entries) = self.parents.remove(&root_b) {
            self.parents.entry(winner).or_default().extend(entries);
        }
        self.worklist.push(winner);
        winner
    }

    /// Drain pending repairs to a fixed point, restoring congruence.
    pub fn rebuild(&mut self) {
        while !self.worklist.is_empty() {
            let pending = std::mem::take(&mut self.worklist);
            let todo: FxHashSet<EClassId> = pending
                .into_iter()
                .map(|id| self.unionfind.find(id))
                .collect();
            for class in todo {
                self.repair(class);
            }
        }
        self.normalise();
    }

    /// Re-canonicalise the parents of one repaired class, merging parents
    /// that became congruent.
    fn repair(&mut self, class: EClassId) {
        let class = self.unionfind.find(class);
        let stale = match self.parents.remove(&class) {
            Some(entries) => entries,
            None => return,
        };
        // Refresh the hashcons before deduplicating, so lookups during the
        // merges below see canonical keys.
        for (node, parent) in &stale {
            self.hashcons.remove(node);
            let canonical = node.canonicalize(&mut self.unionfind);
            let parent = self.unionfind.find(*parent);
            self.hashcons.insert(canonical, parent);
        }
        let mut fresh: FxHashMap<ENode, EClassId> = FxHashMap::default();
        for (node, parent) in stale {
            let canonical = node.canonicalize(&mut self.unionfind);
            if let Some(&existing) = fresh.get(&canonical) {
                // Two parents collapsed onto one canonical node: congruent.
                let merged = self.merge(parent, existing);
                fresh.insert(canonical, merged);
            } else {
                let parent = self.unionfind.find(parent);
                fresh.insert(canonical, parent);
            }
        }
        for (node, parent) in &fresh {
            self.hashcons.insert(node.clone(), *parent);
        }
        // A merge above may have demoted `class` itself; write the parent
        // set back under whatever representative it has now.
        let class = self.unionfind.find(class);
        self.parents.entry(class).or_default().extend(fresh);
    }

    /// Final pass of a rebuild: fold every index through `find` so the
    /// stored form of each invariant holds literally, not just up to
    /// canonicalisation.
    fn normalise(&mut self) {
        let hashcons = std::mem::take(&mut self.hashcons);
        for (node, id) in hashcons {
            let node = node.canonicalize(&mut self.unionfind);
            let id = self.unionfind.find(id);
            self.hashcons.insert(node, id);
        }
        let classes = std::mem::take(&mut self.classes);
        for (id, members) in classes {
            let id = self.unionfind.find(id);
            let folded = self.classes.entry(id).or_default();
            for member in members {
                let member = member.canonicalize(&mut self.unionfind);
                folded.insert(member);
            }
        }
        let parents = std::mem::take(&mut self.parents);
        for (id, entries) in parents {
            let id = self.unionfind.find(id);
            let folded = self.parents.entry(id).or_default();
            for (node, parent) in entries {
                let node = node.canonicalize(&mut self.unionfind);
                let parent = self.unionfind.find(parent);
                folded.insert((node, parent));
            }
        }
    }
}
