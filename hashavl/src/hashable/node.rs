use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    error::{Error, Result},
    node::{MutableNode, Node},
};

/// Read-only view of a hash-carrying node.
///
/// All hash accessors return the cached bytes; computing and caching is
/// the overlay's job, through
/// [`HashableTree`](crate::hashable::HashableTree).
pub trait HashableNode: Node {
    /// The cached node hash, absent until computed or after an
    /// invalidating mutation.
    fn hash(&self) -> Option<Vec<u8>>;

    /// The cached hash of the left child.
    fn left_hash(&self) -> Option<Vec<u8>>;

    /// The cached hash of the right child.
    fn right_hash(&self) -> Option<Vec<u8>>;

    /// The user-supplied digest of the node payload. Opaque to the tree;
    /// folded into the node hash when present.
    fn value_hash(&self) -> Option<Vec<u8>>;
}

/// A hash-carrying node the builder and overlay can write to.
///
/// Implementations carry an invalidation duty: any mutation that changes
/// the hash preimage (height, a child key, a child hash) must drop the
/// cached hash.
pub trait HashableMutableNode: MutableNode + HashableNode {
    /// Store the computed node hash.
    fn set_hash(&self, hash: Vec<u8>) -> Result<()>;

    /// Drop the cached node hash.
    fn reset_hash(&self);

    /// Store or clear the left child's hash.
    fn set_left_hash(&self, hash: Option<Vec<u8>>) -> Result<()>;

    /// Store or clear the right child's hash.
    fn set_right_hash(&self, hash: Option<Vec<u8>>) -> Result<()>;
}

/// The provided hashable mutable node.
///
/// Like [`BasicNode`](crate::node::BasicNode) it is a shared handle.
/// During a builder session children are direct handles; a node decoded
/// from storage carries child keys and cached hashes instead. The child
/// keys exposed through [`Node`] prefer the live handle and fall back to
/// the stored key.
#[derive(Clone)]
pub struct HashNode {
    inner: Rc<RefCell<HashNodeInner>>,
}

struct HashNodeInner {
    key: Vec<u8>,
    height: i16,
    left: Option<HashNode>,
    right: Option<HashNode>,
    left_key: Option<Vec<u8>>,
    right_key: Option<Vec<u8>>,
    value_hash: Option<Vec<u8>>,
    left_hash: Option<Vec<u8>>,
    right_hash: Option<Vec<u8>>,
    hash: Option<Vec<u8>>,
}

impl HashNode {
    /// Create a leaf without a payload digest.
    pub fn new(key: &[u8]) -> Self {
        Self::from_inner(HashNodeInner {
            key: key.to_vec(),
            height: 0,
            left: None,
            right: None,
            left_key: None,
            right_key: None,
            value_hash: None,
            left_hash: None,
            right_hash: None,
            hash: None,
        })
    }

    /// Create a leaf whose payload digest is `value_hash`.
    pub fn with_value_hash(key: &[u8], value_hash: &[u8]) -> Self {
        let node = Self::new(key);
        node.inner.borrow_mut().value_hash = Some(value_hash.to_vec());
        node
    }

    /// Replace the payload digest, dropping the cached hash.
    pub fn set_value_hash(&self, value_hash: Option<Vec<u8>>) {
        let mut inner = self.inner.borrow_mut();
        inner.value_hash = value_hash;
        inner.hash = None;
    }

    /// Whether two handles refer to the same record.
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn from_inner(inner: HashNodeInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Rebuild a node from decoded record fields.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_record(
        key: Vec<u8>,
        height: i16,
        left_key: Option<Vec<u8>>,
        right_key: Option<Vec<u8>>,
        hash: Option<Vec<u8>>,
        left_hash: Option<Vec<u8>>,
        right_hash: Option<Vec<u8>>,
    ) -> Self {
        Self::from_inner(HashNodeInner {
            key,
            height,
            left: None,
            right: None,
            left_key,
            right_key,
            value_hash: None,
            left_hash,
            right_hash,
            hash,
        })
    }
}

impl Node for HashNode {
    fn key(&self) -> Vec<u8> {
        self.inner.borrow().key.clone()
    }

    fn height(&self) -> i16 {
        self.inner.borrow().height
    }

    fn left_key(&self) -> Option<Vec<u8>> {
        let inner = self.inner.borrow();
        match &inner.left {
            Some(node) => Some(node.key()),
            None => inner.left_key.clone(),
        }
    }

    fn right_key(&self) -> Option<Vec<u8>> {
        let inner = self.inner.borrow();
        match &inner.right {
            Some(node) => Some(node.key()),
            None => inner.right_key.clone(),
        }
    }
}

impl MutableNode for HashNode {
    fn set_height(&self, height: i16) -> Result<()> {
        if height < 0 {
            return Err(Error::FailedToUpdateNode(format!(
                "height must not be negative; height={height}"
            )));
        }

        let mut inner = self.inner.borrow_mut();
        if inner.height == height {
            return Ok(());
        }
        inner.height = height;
        inner.hash = None;
        Ok(())
    }

    fn left(&self) -> Option<Self> {
        self.inner.borrow().left.clone()
    }

    fn right(&self) -> Option<Self> {
        self.inner.borrow().right.clone()
    }

    fn set_left(&self, node: Option<Self>) -> Result<()> {
        let key = node.as_ref().map(|n| n.key());
        let mut inner = self.inner.borrow_mut();
        inner.left = node;
        inner.left_key = key;
        inner.left_hash = None;
        inner.hash = None;
        Ok(())
    }

    fn set_right(&self, node: Option<Self>) -> Result<()> {
        let key = node.as_ref().map(|n| n.key());
        let mut inner = self.inner.borrow_mut();
        inner.right = node;
        inner.right_key = key;
        inner.right_hash = None;
        inner.hash = None;
        Ok(())
    }

    fn merge(&self, source: &Self) -> Result<()> {
        let value_hash = source.value_hash();
        let mut inner = self.inner.borrow_mut();
        if inner.value_hash != value_hash {
            inner.value_hash = value_hash;
            inner.hash = None;
        }
        Ok(())
    }
}

impl HashableNode for HashNode {
    fn hash(&self) -> Option<Vec<u8>> {
        self.inner.borrow().hash.clone()
    }

    fn left_hash(&self) -> Option<Vec<u8>> {
        self.inner.borrow().left_hash.clone()
    }

    fn right_hash(&self) -> Option<Vec<u8>> {
        self.inner.borrow().right_hash.clone()
    }

    fn value_hash(&self) -> Option<Vec<u8>> {
        self.inner.borrow().value_hash.clone()
    }
}

impl HashableMutableNode for HashNode {
    fn set_hash(&self, hash: Vec<u8>) -> Result<()> {
        if hash.is_empty() {
            return Err(Error::FailedToUpdateNode("hash must not be empty".into()));
        }
        self.inner.borrow_mut().hash = Some(hash);
        Ok(())
    }

    fn reset_hash(&self) {
        self.inner.borrow_mut().hash = None;
    }

    fn set_left_hash(&self, hash: Option<Vec<u8>>) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.left_hash = hash;
        inner.hash = None;
        Ok(())
    }

    fn set_right_hash(&self, hash: Option<Vec<u8>>) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.right_hash = hash;
        inner.hash = None;
        Ok(())
    }
}

impl fmt::Debug for HashNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HashNode")
            .field("key", &hex::encode(&inner.key))
            .field("height", &inner.height)
            .field("left", &self.left_key().as_deref().map(hex::encode))
            .field("right", &self.right_key().as_deref().map(hex::encode))
            .field("hash", &inner.hash.as_deref().map(hex::encode))
            .finish()
    }
}
