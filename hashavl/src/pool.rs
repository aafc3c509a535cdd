//! Key-indexed node pools.
//!
//! A pool is the sole owner of node records; trees and builders refer to
//! nodes by key. A `get` miss is `Ok(None)`, never an error, because the
//! tree algorithms read a miss as "absent child".

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::{error::Result, node::Node};

/// A mapping from key to node.
pub trait NodePool<N: Node> {
    /// Fetch the node stored under `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &[u8]) -> Result<Option<N>>;

    /// Store `node` under its own key, overwriting any previous entry.
    fn set(&mut self, node: N) -> Result<()>;

    /// Visit every resident node in implementation-defined order.
    ///
    /// The visitor returns `Ok(true)` to continue; `Ok(false)` or an
    /// error stops the iteration.
    fn traverse<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>;
}

/// The in-memory reference pool.
#[derive(Debug, Clone)]
pub struct MapPool<N> {
    nodes: HashMap<Vec<u8>, N>,
}

impl<N> MapPool<N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Wrap an existing key/node map.
    pub fn from_nodes(nodes: HashMap<Vec<u8>, N>) -> Self {
        Self { nodes }
    }

    /// Number of resident nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<N> Default for MapPool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> NodePool<N> for MapPool<N> {
    fn get(&self, key: &[u8]) -> Result<Option<N>> {
        Ok(self.nodes.get(key).cloned())
    }

    fn set(&mut self, node: N) -> Result<()> {
        self.nodes.insert(node.key(), node);
        Ok(())
    }

    fn traverse<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>,
    {
        for node in self.nodes.values() {
            if !visit(node)? {
                break;
            }
        }
        Ok(())
    }
}

/// A lock-guarded pool for interleaved readers.
///
/// Reads from multiple threads are safe; the single-writer rule on
/// mutation sessions still stands. Node types used here must themselves
/// be sendable value records, such as
/// [`PlainNode`](crate::node::PlainNode).
#[derive(Debug, Default)]
pub struct SyncMapPool<N> {
    nodes: RwLock<HashMap<Vec<u8>, N>>,
}

impl<N> SyncMapPool<N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }
}

impl<N: Node> NodePool<N> for SyncMapPool<N> {
    fn get(&self, key: &[u8]) -> Result<Option<N>> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(nodes.get(key).cloned())
    }

    fn set(&mut self, node: N) -> Result<()> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.insert(node.key(), node);
        Ok(())
    }

    fn traverse<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&N) -> Result<bool>,
    {
        // snapshot the resident set so the visitor may read through the
        // pool again without re-entering the lock
        let resident: Vec<N> = {
            let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
            nodes.values().cloned().collect()
        };
        for node in &resident {
            if !visit(node)? {
                break;
            }
        }
        Ok(())
    }
}
