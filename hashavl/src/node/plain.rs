use std::fmt;

use crate::{
    error::{Error, Result},
    node::Node,
};

/// An immutable node record: key, height, and child keys by value.
///
/// The read-side counterpart of [`BasicNode`](crate::node::BasicNode).
/// It carries no child handles and no payload, is `Send + Sync`, and is
/// the natural element type for pools shared across reader threads.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainNode {
    key: Vec<u8>,
    height: i16,
    left_key: Option<Vec<u8>>,
    right_key: Option<Vec<u8>>,
}

impl PlainNode {
    /// Create a record, checking the key and height.
    pub fn new(
        key: &[u8],
        height: i16,
        left_key: Option<Vec<u8>>,
        right_key: Option<Vec<u8>>,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::InvalidNode("key is empty".into()));
        }
        if height < 0 {
            return Err(Error::InvalidNode(format!(
                "height must not be negative; height={height}"
            )));
        }
        Ok(Self::raw(key.to_vec(), height, left_key, right_key))
    }

    /// Snapshot any node into a plain record.
    pub fn from_node<N: Node>(node: &N) -> Self {
        Self::raw(
            node.key(),
            node.height(),
            node.left_key(),
            node.right_key(),
        )
    }

    pub(crate) fn raw(
        key: Vec<u8>,
        height: i16,
        left_key: Option<Vec<u8>>,
        right_key: Option<Vec<u8>>,
    ) -> Self {
        Self {
            key,
            height,
            left_key,
            right_key,
        }
    }
}

impl Node for PlainNode {
    fn key(&self) -> Vec<u8> {
        self.key.clone()
    }

    fn height(&self) -> i16 {
        self.height
    }

    fn left_key(&self) -> Option<Vec<u8>> {
        self.left_key.clone()
    }

    fn right_key(&self) -> Option<Vec<u8>> {
        self.right_key.clone()
    }
}

impl fmt::Debug for PlainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainNode")
            .field("key", &hex::encode(&self.key))
            .field("height", &self.height)
            .field("left", &self.left_key.as_deref().map(hex::encode))
            .field("right", &self.right_key.as_deref().map(hex::encode))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_matches_source() {
        let node = PlainNode::new(b"100", 2, Some(b"050".to_vec()), Some(b"150".to_vec()))
            .expect("valid node");
        let snap = PlainNode::from_node(&node);
        assert_eq!(snap, node);
    }

    #[test]
    fn rejects_negative_height() {
        assert!(PlainNode::new(b"100", -1, None, None).is_err());
    }
}
