//! The read side: key-directed descent and ordered traversal over a pool.

use std::cmp::Ordering;

use crate::{
    error::{Error, Result},
    key::compare_keys,
    node::Node,
    pool::NodePool,
    validator::TreeValidator,
};

/// A read view over an immutable node pool rooted at a given key.
///
/// Children are dereferenced through the pool on demand; a child key the
/// pool does not hold reads as an absent child.
#[derive(Debug)]
pub struct Tree<N: Node, P: NodePool<N>> {
    pool: P,
    root: N,
}

impl<N: Node, P: NodePool<N>> Tree<N, P> {
    /// Build a view of the tree rooted at `root_key` inside `pool`.
    ///
    /// Fails with [`Error::NodeNotFoundInPool`] when the key is empty or
    /// not resident.
    pub fn new(root_key: &[u8], pool: P) -> Result<Self> {
        if root_key.is_empty() {
            return Err(Error::NodeNotFoundInPool("empty root key".into()));
        }
        let root = pool.get(root_key)?.ok_or_else(|| {
            Error::NodeNotFoundInPool(format!("root key={}", hex::encode(root_key)))
        })?;

        Ok(Self { pool, root })
    }

    /// The root node.
    pub fn root(&self) -> &N {
        &self.root
    }

    /// The backing pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Consume the view, yielding the pool.
    pub fn into_pool(self) -> P {
        self.pool
    }

    /// Find the node holding `key` by descending from the root.
    pub fn get(&self, key: &[u8]) -> Result<Option<N>> {
        Ok(self.get_with_parents(key)?.map(|(node, _)| node))
    }

    /// As [`Tree::get`], also returning the ancestor chain from the root
    /// (first) down to the immediate parent (last).
    pub fn get_with_parents(&self, key: &[u8]) -> Result<Option<(N, Vec<N>)>> {
        let mut parents = Vec::new();
        let mut current = self.root.clone();

        loop {
            let cmp = compare_keys(key, &current.key());
            if cmp == Ordering::Equal {
                return Ok(Some((current, parents)));
            }

            let next = self.child(&current, cmp == Ordering::Less)?;
            parents.push(current);
            match next {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }
    }

    /// Visit every reachable node in pre-order: self, left subtree, right
    /// subtree.
    ///
    /// The visitor returns `Ok(true)` to descend into the node's
    /// children; `Ok(false)` prunes that branch and the traversal
    /// continues elsewhere. An error aborts the whole traversal.
    pub fn traverse<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>,
    {
        let root = self.root.clone();
        self.walk(&root, &mut visit)
    }

    /// Validate every reachable node and sweep the pool for orphans.
    pub fn is_valid(&self) -> Result<()> {
        TreeValidator::new(self).validate()
    }

    /// Resolve a child through the pool; a pool miss is an absent child.
    pub(crate) fn child(&self, node: &N, left: bool) -> Result<Option<N>> {
        let key = if left { node.left_key() } else { node.right_key() };
        match key {
            None => Ok(None),
            Some(key) => self.pool.get(&key),
        }
    }

    fn walk<F>(&self, node: &N, visit: &mut F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>,
    {
        if !visit(node)? {
            return Ok(());
        }

        if let Some(left) = self.child(node, true)? {
            self.walk(&left, visit)?;
        }
        if let Some(right) = self.child(node, false)? {
            self.walk(&right, visit)?;
        }

        Ok(())
    }
}
