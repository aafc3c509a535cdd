/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for tree operations.
///
/// Each variant is a stable kind callers can match on; the message carries
/// the wrapped cause. Mutation errors leave the writer in a discard-only
/// state; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A node is malformed: empty key, negative height, or a violated
    /// structural predicate (ordering, heights, balance).
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// A node setter was given a forbidden value.
    #[error("failed to update node: {0}")]
    FailedToUpdateNode(String),

    /// A child key had to be dereferenced but is not in the pool.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Tree construction was given an absent or empty root key.
    #[error("node not found in pool: {0}")]
    NodeNotFoundInPool(String),

    /// A rotation precondition did not hold during insertion.
    #[error("failed to add node: {0}")]
    FailedToAddNode(String),

    /// The validator found orphans or structural damage.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Proof verification found a mismatch.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// A tree may not be saved under a name already bound in the storage.
    #[cfg(feature = "storage")]
    #[error("tree already exists in storage: {0}")]
    TreeAlreadyExists(String),

    /// No tree is bound to the requested name in the storage.
    #[cfg(feature = "storage")]
    #[error("tree does not exist in storage: {0}")]
    TreeNotExists(String),

    /// An error propagated from the storage collaborator.
    #[cfg(feature = "storage")]
    #[error("storage error: {0}")]
    Storage(#[from] hashavl_storage::Error),
}
