use std::{cell::RefCell, collections::HashMap};

use hashavl_storage::Storage;

use crate::{
    error::Result,
    hashable::HashNode,
    node::Node,
    pool::NodePool,
};

/// A node pool layered over a backing [`Storage`].
///
/// Reads check the in-memory cache first and fall back to decoding the
/// stored record; decoded nodes stay cached. Writes are cache-only;
/// flushing records to the storage is the tree-store collaborators' job.
/// Traversal visits the resident cache, not the backing store.
#[derive(Debug)]
pub struct StoragePool<S: Storage> {
    cache: RefCell<HashMap<Vec<u8>, HashNode>>,
    storage: S,
}

impl<S: Storage> StoragePool<S> {
    /// Wrap `storage` with an empty cache.
    pub fn new(storage: S) -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
            storage,
        }
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the pool, yielding the backing storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Number of nodes currently resident in the cache.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<S: Storage> NodePool<HashNode> for StoragePool<S> {
    fn get(&self, key: &[u8]) -> Result<Option<HashNode>> {
        if let Some(node) = self.cache.borrow().get(key) {
            return Ok(Some(node.clone()));
        }

        let Some(bytes) = self.storage.get_node(key)? else {
            return Ok(None);
        };

        let node = HashNode::decode(&bytes)?;
        self.cache.borrow_mut().insert(node.key(), node.clone());
        Ok(Some(node))
    }

    fn set(&mut self, node: HashNode) -> Result<()> {
        self.cache.borrow_mut().insert(node.key(), node);
        Ok(())
    }

    fn traverse<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&HashNode) -> Result<bool>,
    {
        // clone the resident set out so the visitor may fault more
        // nodes in through the tree without re-entering the cache borrow
        let resident: Vec<HashNode> = self.cache.borrow().values().cloned().collect();
        for node in &resident {
            if !visit(node)? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hashavl_storage::MemStorage;

    use super::*;
    use crate::hashable::HashableMutableNode;

    fn stored_node(key: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let node = HashNode::new(key);
        node.set_hash(vec![0xaa; 32]).expect("set_hash");
        (key.to_vec(), node.encode().expect("encode"))
    }

    #[test]
    fn get_faults_in_and_caches() {
        let mut storage = MemStorage::new();
        let (key, bytes) = stored_node(b"100");
        storage.set_node(&key, &bytes).expect("set_node");

        let pool = StoragePool::new(storage);
        assert_eq!(pool.cached(), 0);

        let node = pool.get(b"100").expect("get").expect("resident");
        assert_eq!(node.key(), b"100".to_vec());
        assert_eq!(pool.cached(), 1);

        // the second read serves the same handle from the cache
        let again = pool.get(b"100").expect("get").expect("resident");
        assert!(again.same_node(&node));
    }

    #[test]
    fn miss_is_not_an_error() {
        let pool = StoragePool::new(MemStorage::new());
        assert!(pool.get(b"100").expect("get").is_none());
    }

    #[test]
    fn set_is_cache_only() {
        let mut pool = StoragePool::new(MemStorage::new());
        let node = HashNode::new(b"100");
        pool.set(node).expect("set");

        assert_eq!(pool.cached(), 1);
        assert!(
            pool.storage()
                .get_node(b"100")
                .expect("get_node")
                .is_none()
        );
    }
}
