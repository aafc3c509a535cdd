//! The hash-authenticated overlay.
//!
//! Adds lazy per-node hashing on top of the plain tree: every node can
//! carry a cached hash over `key`, height, an opaque payload digest, and
//! the child hashes. Mutation invalidates exactly the ancestors a change
//! touched; [`HashableTree::root_hash`] recomputes the stale spine and
//! serves as the tree's authenticator. A [`Prover`] turns a node and its
//! ancestor chain into an inclusion [`Proof`] and verifies proofs
//! against a root hash.
//!
//! Both the hash algorithm and the proof wire format are injected: the
//! algorithm through [`NodeHasher`] ([`Blake3Hasher`] is provided), the
//! wire format by encoding [`Proof`] however the transport likes
//! ([`Proof::encode`] is the provided bincode form).

mod builder;
mod encoding;
mod hash;
mod node;
mod prover;
mod tree;

pub use builder::HashableTreeBuilder;
pub use hash::{Blake3Hasher, HEIGHT_ENCODING_LEN, NodeHasher, encode_height, node_hash_input};
pub use node::{HashNode, HashableMutableNode, HashableNode};
pub use prover::{Proof, ProofNode, Prover};
pub use tree::HashableTree;
