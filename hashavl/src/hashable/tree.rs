//! The authenticated read view: lazy node hashing over a tree.

use crate::{
    error::{Error, Result},
    hashable::{
        HashableMutableNode,
        hash::NodeHasher,
        prover::{Proof, Prover},
    },
    node::Node,
    pool::NodePool,
    tree::Tree,
};

/// A [`Tree`] with hash bookkeeping.
///
/// Node hashes are computed on demand: asking for a node's hash first
/// fills the node's child hashes from the children (recursively), then
/// digests the canonical preimage and caches the result on the node.
/// Nodes whose cache survived untouched are not recomputed.
#[derive(Debug)]
pub struct HashableTree<N, P, H>
where
    N: HashableMutableNode,
    P: NodePool<N>,
    H: NodeHasher,
{
    tree: Tree<N, P>,
    prover: Prover<H>,
}

impl<N, P, H> HashableTree<N, P, H>
where
    N: HashableMutableNode,
    P: NodePool<N>,
    H: NodeHasher,
{
    /// Build an authenticated view rooted at `root_key` inside `pool`.
    pub fn new(root_key: &[u8], pool: P, prover: Prover<H>) -> Result<Self> {
        Ok(Self {
            tree: Tree::new(root_key, pool)?,
            prover,
        })
    }

    /// Wrap an existing tree view.
    pub fn from_tree(tree: Tree<N, P>, prover: Prover<H>) -> Self {
        Self { tree, prover }
    }

    /// The underlying plain view.
    pub fn tree(&self) -> &Tree<N, P> {
        &self.tree
    }

    /// The prover this view hashes with.
    pub fn prover(&self) -> &Prover<H> {
        &self.prover
    }

    /// The root node.
    pub fn root(&self) -> &N {
        self.tree.root()
    }

    /// See [`Tree::get`].
    pub fn get(&self, key: &[u8]) -> Result<Option<N>> {
        self.tree.get(key)
    }

    /// See [`Tree::get_with_parents`].
    pub fn get_with_parents(&self, key: &[u8]) -> Result<Option<(N, Vec<N>)>> {
        self.tree.get_with_parents(key)
    }

    /// See [`Tree::traverse`].
    pub fn traverse<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>,
    {
        self.tree.traverse(visit)
    }

    /// See [`Tree::is_valid`].
    pub fn is_valid(&self) -> Result<()> {
        self.tree.is_valid()
    }

    /// The hash of the node holding `key`, computing and caching it (and
    /// any missing descendant hashes) on the way.
    pub fn node_hash(&self, key: &[u8]) -> Result<Vec<u8>> {
        let node = self
            .tree
            .pool()
            .get(key)?
            .ok_or_else(|| Error::NodeNotFound(format!("key={}", hex::encode(key))))?;

        self.ensure_hash(&node)
    }

    /// The tree's authenticator: the root node's hash, with the whole
    /// reachable tree's hashes populated as a side effect.
    pub fn root_hash(&self) -> Result<Vec<u8>> {
        let root = self.tree.root().clone();
        self.ensure_hash(&root)
    }

    /// Build an inclusion proof for the node holding `key`.
    pub fn proof(&self, key: &[u8]) -> Result<Proof> {
        self.root_hash()?;

        let (node, parents) = self
            .tree
            .get_with_parents(key)?
            .ok_or_else(|| Error::NodeNotFound(format!("key={}", hex::encode(key))))?;

        self.prover.proof(&node, &parents)
    }

    fn ensure_hash(&self, node: &N) -> Result<Vec<u8>> {
        if let Some(hash) = node.hash() {
            return Ok(hash);
        }

        if let Some(key) = node.left_key() {
            let hash = self.child_hash(&key)?;
            node.set_left_hash(Some(hash))?;
        }
        if let Some(key) = node.right_key() {
            let hash = self.child_hash(&key)?;
            node.set_right_hash(Some(hash))?;
        }

        let hash = self.prover.generate_node_hash(node);
        node.set_hash(hash.clone())?;
        Ok(hash)
    }

    fn child_hash(&self, key: &[u8]) -> Result<Vec<u8>> {
        let child = self
            .tree
            .pool()
            .get(key)?
            .ok_or_else(|| Error::NodeNotFound(format!("child key={}", hex::encode(key))))?;

        self.ensure_hash(&child)
    }
}
