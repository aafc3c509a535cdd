use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    error::{Error, Result},
    node::{MutableNode, Node},
};

/// A mutable tree node with an opaque byte payload.
///
/// `BasicNode` is a shared handle: cloning it clones the handle, and every
/// clone observes the same record. Child links hold direct handles while a
/// builder session assembles the tree; the child keys exposed through
/// [`Node`] are derived from those handles.
///
/// [`MutableNode::merge`] copies the payload from the incoming duplicate,
/// leaving key, height, and child links untouched.
#[derive(Clone)]
pub struct BasicNode {
    inner: Rc<RefCell<BasicNodeInner>>,
}

struct BasicNodeInner {
    key: Vec<u8>,
    height: i16,
    left: Option<BasicNode>,
    right: Option<BasicNode>,
    value: Option<Vec<u8>>,
}

impl BasicNode {
    /// Create a payload-less leaf.
    pub fn new(key: &[u8]) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BasicNodeInner {
                key: key.to_vec(),
                height: 0,
                left: None,
                right: None,
                value: None,
            })),
        }
    }

    /// Create a leaf carrying `value` as its payload.
    pub fn with_value(key: &[u8], value: &[u8]) -> Self {
        let node = Self::new(key);
        node.inner.borrow_mut().value = Some(value.to_vec());
        node
    }

    /// The payload, if any.
    pub fn value(&self) -> Option<Vec<u8>> {
        self.inner.borrow().value.clone()
    }

    /// Replace the payload.
    pub fn set_value(&self, value: Option<Vec<u8>>) {
        self.inner.borrow_mut().value = value;
    }

    /// Whether two handles refer to the same record.
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Node for BasicNode {
    fn key(&self) -> Vec<u8> {
        self.inner.borrow().key.clone()
    }

    fn height(&self) -> i16 {
        self.inner.borrow().height
    }

    fn left_key(&self) -> Option<Vec<u8>> {
        self.inner.borrow().left.as_ref().map(BasicNode::key)
    }

    fn right_key(&self) -> Option<Vec<u8>> {
        self.inner.borrow().right.as_ref().map(BasicNode::key)
    }
}

impl MutableNode for BasicNode {
    fn set_height(&self, height: i16) -> Result<()> {
        if height < 0 {
            return Err(Error::FailedToUpdateNode(format!(
                "height must not be negative; height={height}"
            )));
        }
        self.inner.borrow_mut().height = height;
        Ok(())
    }

    fn left(&self) -> Option<Self> {
        self.inner.borrow().left.clone()
    }

    fn right(&self) -> Option<Self> {
        self.inner.borrow().right.clone()
    }

    fn set_left(&self, node: Option<Self>) -> Result<()> {
        self.inner.borrow_mut().left = node;
        Ok(())
    }

    fn set_right(&self, node: Option<Self>) -> Result<()> {
        self.inner.borrow_mut().right = node;
        Ok(())
    }

    fn merge(&self, source: &Self) -> Result<()> {
        let value = source.value();
        self.inner.borrow_mut().value = value;
        Ok(())
    }
}

impl fmt::Debug for BasicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("BasicNode")
            .field("key", &hex::encode(&inner.key))
            .field("height", &inner.height)
            .field("left", &self.left_key().as_deref().map(hex::encode))
            .field("right", &self.right_key().as_deref().map(hex::encode))
            .finish()
    }
}
