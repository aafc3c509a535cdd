//! Save/load collaborators over an injected
//! [`Storage`](hashavl_storage::Storage).
//!
//! Two strategies are provided. [`NodeTreeStore`] writes the root
//! pointer and one record per node in a single batch, and loads lazily
//! through a [`StoragePool`]. [`DumpTreeStore`] serializes the whole
//! tree into one raw blob and repopulates a fresh pool on load.
//!
//! Both refuse to save under a name the storage already binds and report
//! a missing name on load.

mod dump_store;
mod node_store;
mod pool;

pub use dump_store::DumpTreeStore;
pub use node_store::NodeTreeStore;
pub use pool::StoragePool;
