//! Node contracts and the per-node structural predicate.
//!
//! Two capability sets coexist. The read side only needs [`Node`]: key,
//! height, and child keys, enough to rehydrate a position from any pool.
//! The write side needs [`MutableNode`] on top: direct child handles and
//! setters, used by the tree builder while a mutation session assembles
//! the tree in memory.
//!
//! Implementations are cheap-to-clone shared handles; cloning a node
//! clones the handle, not the record, so setters take `&self`.

mod basic;
mod plain;

use std::cmp::Ordering;

pub use basic::BasicNode;
pub use plain::PlainNode;

use crate::{
    error::{Error, Result},
    key::compare_keys,
};

/// Read-only view of a tree node.
pub trait Node: Clone {
    /// The node key. Non-empty for any valid node.
    fn key(&self) -> Vec<u8>;

    /// The node height: 0 for a leaf, `1 + max(child heights)` otherwise.
    fn height(&self) -> i16;

    /// Key of the left child, if any.
    fn left_key(&self) -> Option<Vec<u8>>;

    /// Key of the right child, if any.
    fn right_key(&self) -> Option<Vec<u8>>;
}

/// A node the tree builder can link, re-link, and merge.
pub trait MutableNode: Node {
    /// Set the height. Negative heights are rejected with
    /// [`Error::FailedToUpdateNode`].
    fn set_height(&self, height: i16) -> Result<()>;

    /// Direct handle to the left child, if attached.
    fn left(&self) -> Option<Self>;

    /// Direct handle to the right child, if attached.
    fn right(&self) -> Option<Self>;

    /// Attach or detach the left child.
    fn set_left(&self, node: Option<Self>) -> Result<()>;

    /// Attach or detach the right child.
    fn set_right(&self, node: Option<Self>) -> Result<()>;

    /// Copy the payload of `source` into this node on a duplicate-key
    /// insert. Key, height, and child links are never touched.
    fn merge(&self, source: &Self) -> Result<()>;

    /// The child on the given side; `left` selects which.
    fn child(&self, left: bool) -> Option<Self> {
        if left { self.left() } else { self.right() }
    }

    /// Set the child on the given side; `left` selects which.
    fn set_child(&self, left: bool, node: Option<Self>) -> Result<()> {
        if left {
            self.set_left(node)
        } else {
            self.set_right(node)
        }
    }
}

/// Check that a node is well formed relative to its children.
///
/// Verifies the non-empty key, child-key ordering, the leaf/parent height
/// equations, and the sibling balance. `left` and `right` are the resolved
/// children (absent children pass `None`).
pub fn validate_node<N: Node>(node: &N, left: Option<&N>, right: Option<&N>) -> Result<()> {
    let key = node.key();
    if key.is_empty() {
        return Err(Error::InvalidNode("key is empty".into()));
    }
    if node.height() < 0 {
        return Err(Error::InvalidNode(format!(
            "height must not be negative; height={}",
            node.height()
        )));
    }

    if let Some(left) = left
        && compare_keys(&left.key(), &key) != Ordering::Less
    {
        return Err(Error::InvalidNode(format!(
            "left key must be lesser: left={} node={}",
            hex::encode(left.key()),
            hex::encode(&key),
        )));
    }
    if let Some(right) = right
        && compare_keys(&right.key(), &key) != Ordering::Greater
    {
        return Err(Error::InvalidNode(format!(
            "right key must be greater: right={} node={}",
            hex::encode(right.key()),
            hex::encode(&key),
        )));
    }

    let left_height = left.map(Node::height);
    let right_height = right.map(Node::height);
    if left.is_none() && right.is_none() {
        if node.height() != 0 {
            return Err(Error::InvalidNode(format!(
                "height must be 0 without children; height={}",
                node.height()
            )));
        }
    } else if let Some(is_left) = sibling_violation(left_height, right_height) {
        return Err(Error::InvalidNode(format!(
            "sibling heights violated; is_left={is_left}"
        )));
    } else {
        let base = left_height.max(right_height).unwrap_or(-1);
        if node.height() != base + 1 {
            return Err(Error::InvalidNode(format!(
                "height must be one above the tallest child; child={} height={}",
                base,
                node.height()
            )));
        }
    }

    Ok(())
}

/// Check the balance of a sibling pair, given the child heights (`None`
/// for a missing child). Returns `Some(is_left)` when violated, with
/// `is_left` naming the side that is too tall.
pub(crate) fn sibling_violation(left: Option<i16>, right: Option<i16>) -> Option<bool> {
    match (left, right) {
        (None, None) => None,
        (None, Some(h)) => (h > 1).then_some(false),
        (Some(h), None) => (h > 1).then_some(true),
        (Some(l), Some(r)) => {
            let d = l - r;
            if (-1..=1).contains(&d) {
                None
            } else {
                Some(d > 1)
            }
        }
    }
}
