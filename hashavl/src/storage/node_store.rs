use hashavl_storage::Storage;

use crate::{
    error::{Error, Result},
    hashable::{HashNode, HashableTree, NodeHasher, Prover},
    node::Node,
    pool::NodePool,
    storage::pool::StoragePool,
};

/// Per-node persistence: one record per node plus a root pointer.
///
/// Saving forces the root hash (so every record carries its hashes),
/// validates the tree, and commits the root pointer together with every
/// node record in a single batch. Loading reads only the root pointer;
/// nodes fault in lazily through a [`StoragePool`].
#[derive(Debug)]
pub struct NodeTreeStore<S: Storage> {
    name: Vec<u8>,
    storage: S,
}

impl<S: Storage> NodeTreeStore<S> {
    /// Claim `name` inside `storage` for a tree about to be saved.
    ///
    /// Fails with [`Error::TreeAlreadyExists`] when the name is bound.
    pub fn create(name: &[u8], storage: S) -> Result<Self> {
        if storage.get_root(name)?.is_some() {
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

    /// Persist `tree` under the claimed name.
    pub fn save<P, H>(&mut self, tree: &HashableTree<HashNode, P, H>) -> Result<()>
    where
        P: NodePool<HashNode>,
        H: NodeHasher,
    {
        tree.root_hash()?;
        tree.is_valid()?;

        let mut batch = self.storage.batch();
        batch.set_root(&self.name, &tree.root().key());

        tree.traverse(|node| {
            batch.set_node(&node.key(), &node.encode()?);
            Ok(true)
        })?;

        self.storage.commit_batch(batch)?;
        Ok(())
    }

    /// Load the tree saved under `name`, faulting nodes in on demand.
    ///
    /// Fails with [`Error::TreeNotExists`] when the name is unbound.
    pub fn load<H: NodeHasher>(
        name: &[u8],
        storage: S,
        prover: Prover<H>,
    ) -> Result<HashableTree<HashNode, StoragePool<S>, H>> {
        let root_key = storage
            .get_root(name)?
            .ok_or_else(|| Error::TreeNotExists(format!("name={}", hex::encode(name))))?;

        HashableTree::new(&root_key, StoragePool::new(storage), prover)
    }

    /// Consume the store, yielding the storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use hashavl_storage::MemStorage;

    use super::*;
    use crate::hashable::{Blake3Hasher, HashableTreeBuilder};

    fn sample_tree()
    -> HashableTree<HashNode, crate::pool::MapPool<HashNode>, Blake3Hasher> {
        let mut builder = HashableTreeBuilder::new();
        for i in [100u8, 50, 150, 30, 70] {
            builder
                .add(HashNode::with_value_hash(
                    format!("{i:03}").as_bytes(),
                    &[i; 32],
                ))
                .expect("add");
        }
        builder.into_tree(Prover::blake3()).expect("tree")
    }

    #[test]
    fn save_and_load_round_trip() {
        let tree = sample_tree();
        let root_hash = tree.root_hash().expect("root hash");

        let mut store = NodeTreeStore::create(b"balances", MemStorage::new()).expect("create");
        store.save(&tree).expect("save");
        let storage = store.into_storage();
        assert_eq!(storage.node_count(), 5);

        let loaded =
            NodeTreeStore::load(b"balances", storage, Prover::blake3())
                .expect("load");
        loaded.is_valid().expect("valid");
        assert_eq!(loaded.root_hash().expect("root hash"), root_hash);

        let node = loaded.get(b"030").expect("get").expect("present");
        assert_eq!(node.key(), b"030".to_vec());
    }

    #[test]
    fn saving_an_existing_name_is_refused() {
        let tree = sample_tree();
        let mut store = NodeTreeStore::create(b"balances", MemStorage::new()).expect("create");
        store.save(&tree).expect("save");

        assert_matches!(
            NodeTreeStore::create(b"balances", store.into_storage()),
            Err(Error::TreeAlreadyExists(_))
        );
    }

    #[test]
    fn loading_a_missing_name_is_refused() {
        assert_matches!(
            NodeTreeStore::load(
                b"missing",
                MemStorage::new(),
                Prover::blake3()
            ),
            Err(Error::TreeNotExists(_))
        );
    }
}
