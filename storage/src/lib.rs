//! Storage abstraction injected into hashavl tree persistence.
//!
//! A [`Storage`] is a key/value blob store with three independent
//! namespaces:
//!
//! - tree-root pointers (`get_root` / `set_root`), binding a tree name to
//!   the key of its root node;
//! - per-node records (`get_node` / `set_node`), holding the binary
//!   encoding of a single tree node under its key;
//! - raw blobs (`get_raw` / `set_raw`), used for whole-tree dumps.
//!
//! Writes that must land together go through a [`StorageBatch`]: pending
//! operations are accumulated and handed back to the storage with
//! [`Storage::commit_batch`]. The [`MemStorage`] reference implementation
//! keeps everything in process memory and is what the test suites run
//! against.

mod memory;

pub use memory::MemStorage;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backend failed internally (I/O, corruption, connection loss).
    #[error("storage internal error: {0}")]
    Internal(String),
}

/// A single pending write inside a [`StorageBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Bind a tree name to a root-node key.
    SetRoot {
        /// The tree name.
        name: Vec<u8>,
        /// The key of the root node.
        root_key: Vec<u8>,
    },
    /// Write one node record under its key.
    SetNode {
        /// The node key.
        key: Vec<u8>,
        /// The encoded node record.
        value: Vec<u8>,
    },
}

/// An ordered set of writes committed as one unit.
///
/// A batch does not touch the storage until it is passed to
/// [`Storage::commit_batch`]; dropping it discards the pending writes.
#[derive(Debug, Default)]
pub struct StorageBatch {
    ops: Vec<BatchOp>,
}

impl StorageBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a root-pointer write.
    pub fn set_root(&mut self, name: &[u8], root_key: &[u8]) {
        self.ops.push(BatchOp::SetRoot {
            name: name.to_vec(),
            root_key: root_key.to_vec(),
        });
    }

    /// Queue a node-record write.
    pub fn set_node(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::SetNode {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// The pending operations, in queue order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding the pending operations.
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// The injected key/value store behind tree persistence.
///
/// A missing entry is `Ok(None)`, never an error. Writes overwrite
/// unconditionally; name-lifecycle rules (refusing to clobber an existing
/// tree) are enforced by the callers, not the storage.
pub trait Storage {
    /// Read the root-node key bound to `name`.
    fn get_root(&self, name: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Bind `name` to `root_key`.
    fn set_root(&mut self, name: &[u8], root_key: &[u8]) -> Result<()>;

    /// Read the node record stored under `key`.
    fn get_node(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write the node record `value` under `key`.
    fn set_node(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Read the raw blob stored under `key`.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write the raw blob `value` under `key`.
    fn set_raw(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Start a write batch.
    fn batch(&self) -> StorageBatch {
        StorageBatch::new()
    }

    /// Apply every pending operation of `batch`.
    ///
    /// The default implementation replays the operations through the
    /// plain setters in queue order; backends with native batching
    /// should override it.
    fn commit_batch(&mut self, batch: StorageBatch) -> Result<()> {
        for op in batch.into_ops() {
            match op {
                BatchOp::SetRoot { name, root_key } => self.set_root(&name, &root_key)?,
                BatchOp::SetNode { key, value } => self.set_node(&key, &value)?,
            }
        }
        Ok(())
    }
}
