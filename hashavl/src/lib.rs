//! Append-only hash-authenticated AVL tree.
//!
//! An ordered key/node store that keeps the AVL height-balance invariant
//! under insertion, holds every node in a pluggable [`NodePool`], and can
//! produce Merkle-style inclusion proofs against a root hash.
//!
//! # Core types
//!
//! - [`TreeBuilder`] — the write side: insert-with-rebalance over mutable
//!   nodes held in memory, reporting the ancestors each insert touched.
//! - [`Tree`] — the read side: key-directed descent, pre-order traversal,
//!   and full structural validation over a pool rooted at a given key.
//! - [`hashable`] — the authenticated overlay: lazy per-node hashing,
//!   cache invalidation on mutation, inclusion proofs and verification.
//! - [`storage`] — save/load collaborators over an injected
//!   [`hashavl_storage::Storage`] (requires the `storage` feature).
//!
//! # Node contracts
//!
//! Nodes are referenced by opaque byte keys, never by pointer, so a node
//! can be rehydrated from any pool. The read side needs only [`Node`];
//! mutation needs [`MutableNode`]; the authenticated overlay adds the
//! capabilities of [`hashable::HashableNode`] and
//! [`hashable::HashableMutableNode`] on top.

mod builder;
mod error;
mod key;
pub mod node;
pub mod pool;
mod tree;
mod validator;

pub mod hashable;
#[cfg(feature = "storage")]
pub mod storage;

#[cfg(test)]
mod tests;

pub use builder::TreeBuilder;
pub use error::{Error, Result};
pub use key::{compare_keys, keys_equal};
pub use node::{BasicNode, MutableNode, Node, PlainNode, validate_node};
pub use pool::{MapPool, NodePool, SyncMapPool};
pub use tree::Tree;
pub use validator::TreeValidator;
