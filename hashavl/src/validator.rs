//! Full-tree structural validation.

use crate::{
    error::{Error, Result},
    node::{Node, validate_node},
    pool::NodePool,
    tree::Tree,
};

/// Checks that a [`Tree`] is formed properly.
///
/// Every reachable node is run through the per-node predicate (key,
/// ordering, heights, balance), then the pool is swept for entries the
/// root cannot reach.
pub struct TreeValidator<'a, N: Node, P: NodePool<N>> {
    tree: &'a Tree<N, P>,
}

impl<'a, N: Node, P: NodePool<N>> TreeValidator<'a, N, P> {
    /// Wrap a tree for validation.
    pub fn new(tree: &'a Tree<N, P>) -> Self {
        Self { tree }
    }

    /// Validate the whole tree.
    pub fn validate(&self) -> Result<()> {
        self.check_node(self.tree.root())?;

        if self.has_orphans()? {
            return Err(Error::InvalidTree("orphan node(s) found".into()));
        }

        Ok(())
    }

    fn check_node(&self, node: &N) -> Result<()> {
        let left = self.tree.child(node, true)?;
        let right = self.tree.child(node, false)?;

        validate_node(node, left.as_ref(), right.as_ref())?;

        if let Some(left) = left {
            self.check_node(&left)?;
        }
        if let Some(right) = right {
            self.check_node(&right)?;
        }

        Ok(())
    }

    fn has_orphans(&self) -> Result<bool> {
        let mut found = false;
        self.tree.pool().traverse(|node| {
            if self.tree.get(&node.key())?.is_none() {
                found = true;
                return Ok(false);
            }
            Ok(true)
        })?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{
        builder::TreeBuilder,
        node::{BasicNode, MutableNode, PlainNode},
        pool::MapPool,
    };

    #[test]
    fn a_built_tree_validates() {
        let mut builder = TreeBuilder::new();
        for key in [&b"100"[..], b"050", b"150", b"030", b"070"] {
            builder.add(BasicNode::new(key)).expect("add");
        }
        let tree = builder.into_tree().expect("tree");
        tree.is_valid().expect("valid");
    }

    #[test]
    fn orphans_are_reported() {
        let mut builder = TreeBuilder::new();
        for key in [&b"100"[..], b"050", b"150"] {
            builder.add(BasicNode::new(key)).expect("add");
        }
        let tree = builder.into_tree().expect("tree");

        let mut pool = tree.into_pool();
        pool.set(BasicNode::new(b"999")).expect("set orphan");
        let tree = Tree::new(b"100", pool).expect("tree");

        assert_matches!(tree.is_valid(), Err(Error::InvalidTree(_)));
    }

    #[test]
    fn broken_heights_are_reported() {
        let mut builder = TreeBuilder::new();
        for key in [&b"100"[..], b"050", b"150"] {
            builder.add(BasicNode::new(key)).expect("add");
        }
        let tree = builder.into_tree().expect("tree");
        tree.root().set_height(4).expect("corrupt");

        assert_matches!(tree.is_valid(), Err(Error::InvalidNode(_)));
    }

    #[test]
    fn plain_node_pools_validate_too() {
        let mut pool = MapPool::new();
        for (key, height, left, right) in [
            (&b"100"[..], 1i16, Some(b"050".to_vec()), Some(b"150".to_vec())),
            (b"050", 0, None, None),
            (b"150", 0, None, None),
        ] {
            pool.set(PlainNode::new(key, height, left, right).expect("node"))
                .expect("set");
        }

        let tree = Tree::new(b"100", pool).expect("tree");
        tree.is_valid().expect("valid");
    }
}
