use std::collections::BTreeMap;

use crate::{Result, Storage};

/// In-memory [`Storage`] backed by `BTreeMap`s, one per namespace.
///
/// Useful for tests and ephemeral trees. `Clone` produces an independent
/// snapshot of the whole store.
#[derive(Debug, Default, Clone)]
pub struct MemStorage {
    roots: BTreeMap<Vec<u8>, Vec<u8>>,
    nodes: BTreeMap<Vec<u8>, Vec<u8>>,
    raw: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of node records currently stored.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Storage for MemStorage {
    fn get_root(&self, name: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.roots.get(name).cloned())
    }

    fn set_root(&mut self, name: &[u8], root_key: &[u8]) -> Result<()> {
        self.roots.insert(name.to_vec(), root_key.to_vec());
        Ok(())
    }

    fn get_node(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.nodes.get(key).cloned())
    }

    fn set_node(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.nodes.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.raw.get(key).cloned())
    }

    fn set_raw(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.raw.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
