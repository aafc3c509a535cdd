//! The write side of the authenticated overlay.

use std::collections::{HashMap, HashSet};

use crate::{
    builder::TreeBuilder,
    error::Result,
    hashable::{HashableMutableNode, hash::NodeHasher, prover::Prover, tree::HashableTree},
    node::Node,
    pool::MapPool,
};

/// A [`TreeBuilder`] that keeps cached hashes honest.
///
/// Each insert invalidates the cached hash of every ancestor the
/// rebalance touched, so a later
/// [`root_hash`](HashableTree::root_hash) recomputes exactly the changed
/// spine and reuses everything else.
pub struct HashableTreeBuilder<N: HashableMutableNode> {
    inner: TreeBuilder<N>,
}

impl<N: HashableMutableNode> HashableTreeBuilder<N> {
    /// Start an empty session.
    pub fn new() -> Self {
        Self {
            inner: TreeBuilder::new(),
        }
    }

    /// The current root, if any node has been added.
    pub fn root(&self) -> Option<N> {
        self.inner.root()
    }

    /// Every node added so far, by key.
    pub fn nodes(&self) -> &HashMap<Vec<u8>, N> {
        self.inner.nodes()
    }

    /// Number of distinct keys added.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the session holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Insert one node and invalidate the changed ancestors' hashes.
    ///
    /// Returns the same ancestor list as [`TreeBuilder::add`].
    pub fn add(&mut self, node: N) -> Result<Vec<N>> {
        let updated = self.inner.add(node)?;
        for node in &updated {
            node.reset_hash();
        }
        Ok(updated)
    }

    /// Insert many nodes in order, invalidating each changed ancestor
    /// once. Equivalent to calling [`HashableTreeBuilder::add`] for each
    /// node, with the returned set deduplicated across the whole call.
    pub fn add_many(&mut self, nodes: impl IntoIterator<Item = N>) -> Result<Vec<N>> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut updated = Vec::new();

        for node in nodes {
            for parent in self.inner.add(node)? {
                if seen.insert(parent.key()) {
                    parent.reset_hash();
                    updated.push(parent);
                }
            }
        }

        Ok(updated)
    }

    /// Finish the session, yielding an authenticated view over the built
    /// nodes.
    pub fn into_tree<H: NodeHasher>(
        self,
        prover: Prover<H>,
    ) -> Result<HashableTree<N, MapPool<N>, H>> {
        Ok(HashableTree::from_tree(self.inner.into_tree()?, prover))
    }
}

impl<N: HashableMutableNode> Default for HashableTreeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashable::{HashableNode, node::HashNode, prover::Prover};

    #[test]
    fn add_resets_ancestor_hashes() {
        let mut builder = HashableTreeBuilder::new();
        builder.add(HashNode::new(b"100")).expect("add");

        let root = builder.root().expect("root");
        root.set_hash(vec![0xaa; 32]).expect("set_hash");

        let updated = builder.add(HashNode::new(b"050")).expect("add");
        assert_eq!(updated.len(), 1);
        assert_eq!(root.hash(), None);
    }

    #[test]
    fn add_many_reports_each_ancestor_once() {
        let mut builder = HashableTreeBuilder::new();
        builder.add(HashNode::new(b"100")).expect("add");

        let updated = builder
            .add_many([
                HashNode::new(b"050"),
                HashNode::new(b"150"),
                HashNode::new(b"030"),
            ])
            .expect("add_many");

        let mut keys: Vec<Vec<u8>> = updated.iter().map(|n| n.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), updated.len(), "duplicated ancestor reported");
    }

    #[test]
    fn built_trees_hash_consistently_after_updates() {
        let mut builder = HashableTreeBuilder::new();
        builder
            .add_many((1..=12u8).map(|i| {
                HashNode::with_value_hash(format!("{i:03}").as_bytes(), &[i; 32])
            }))
            .expect("add_many");

        let tree = builder.into_tree(Prover::blake3()).expect("tree");
        tree.is_valid().expect("valid");
        tree.root_hash().expect("root hash");
    }
}
