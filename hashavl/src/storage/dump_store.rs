use bincode::{Decode, Encode};
use hashavl_storage::Storage;

use crate::{
    error::{Error, Result},
    hashable::{HashNode, HashableTree, NodeHasher, Prover},
    key::keys_equal,
    node::Node,
    pool::{MapPool, NodePool},
};

/// The one-blob envelope a dumped tree is stored as. Node order is
/// insignificant on load.
#[derive(Debug, Encode, Decode)]
struct TreeDump {
    name: Vec<u8>,
    root_key: Vec<u8>,
    nodes: Vec<Vec<u8>>,
}

/// Whole-tree persistence: one raw blob per tree.
///
/// Saving forces the root hash, validates the tree, and writes a single
/// envelope holding the name, the root key, and every node record.
/// Loading decodes the envelope and repopulates a fresh in-memory pool,
/// so the loaded tree does not touch the storage again.
#[derive(Debug)]
pub struct DumpTreeStore<S: Storage> {
    name: Vec<u8>,
    storage: S,
}

impl<S: Storage> DumpTreeStore<S> {
    /// Claim `name` inside `storage` for a tree about to be dumped.
    ///
    /// Fails with [`Error::TreeAlreadyExists`] when the name is bound.
    pub fn create(name: &[u8], storage: S) -> Result<Self> {
        if storage.get_raw(name)?.is_some() {
            return Err(Error::TreeAlreadyExists(format!(
                "name={}",
                hex::encode(name)
            )));
        }

        Ok(Self {
            name: name.to_vec(),
            storage,
        })
    }

    /// Persist `tree` as one envelope under the claimed name.
    pub fn save<P, H>(&mut self, tree: &HashableTree<HashNode, P, H>) -> Result<()>
    where
        P: NodePool<HashNode>,
        H: NodeHasher,
    {
        tree.root_hash()?;
        tree.is_valid()?;

        let mut dump = TreeDump {
            name: self.name.clone(),
            root_key: tree.root().key(),
            nodes: Vec::new(),
        };
        tree.traverse(|node| {
            dump.nodes.push(node.encode()?);
            Ok(true)
        })?;

        let bytes = bincode::encode_to_vec(&dump, bincode::config::standard())
            .map_err(|e| Error::InvalidTree(format!("failed to encode tree dump: {e}")))?;
        self.storage.set_raw(&self.name, &bytes)?;
        Ok(())
    }

    /// Load the tree dumped under `name` into a fresh in-memory pool.
    ///
    /// Fails with [`Error::TreeNotExists`] when the name is unbound and
    /// with [`Error::InvalidTree`] when the envelope is damaged or was
    /// written under a different name.
    pub fn load<H: NodeHasher>(
        name: &[u8],
        storage: &S,
        prover: Prover<H>,
    ) -> Result<HashableTree<HashNode, MapPool<HashNode>, H>> {
        let bytes = storage
            .get_raw(name)?
            .ok_or_else(|| Error::TreeNotExists(format!("name={}", hex::encode(name))))?;

        let (dump, _): (TreeDump, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::InvalidTree(format!("failed to decode tree dump: {e}")))?;

        if !keys_equal(&dump.name, name) {
            return Err(Error::InvalidTree(format!(
                "dump name does not match: requested={} stored={}",
                hex::encode(name),
                hex::encode(&dump.name),
            )));
        }

        let mut pool = MapPool::new();
        for record in &dump.nodes {
            pool.set(HashNode::decode(record)?)?;
        }

        HashableTree::new(&dump.root_key, pool, prover)
    }

    /// Consume the store, yielding the storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
