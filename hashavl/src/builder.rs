//! The mutation engine: insert-with-rebalance over mutable nodes.
//!
//! A [`TreeBuilder`] owns one write session. Nodes go in through
//! [`TreeBuilder::add`], which links the node into place, refreshes
//! heights bottom-up, and performs at most one rotation to restore the
//! AVL balance. Each `add` returns the ancestors whose content changed,
//! which is exactly the set the hash overlay must invalidate.
//!
//! Rebalancing distinguishes three shapes:
//!
//! - a "single" rotation when the last two ancestors each hold at most
//!   one child, where the fix is a local three-node promotion;
//! - a same-side rotation (left-left or right-right) when the new key
//!   descended on the same side as the violation;
//! - a curved rotation (left-right or right-left) otherwise, promoting a
//!   grandchild to the subtree top.

use std::{cmp::Ordering, collections::HashMap};

use crate::{
    error::{Error, Result},
    key::{compare_keys, keys_equal},
    node::{MutableNode, Node, sibling_violation, validate_node},
    pool::MapPool,
    tree::Tree,
};

/// Builds an AVL tree one insertion at a time.
///
/// The builder holds direct node handles for the duration of the session;
/// converting into a [`Tree`] moves the finished nodes into a
/// [`MapPool`]. A failed `add` leaves the session in an undefined
/// intermediate state, and the builder should be discarded.
pub struct TreeBuilder<N: MutableNode> {
    root: Option<N>,
    nodes: HashMap<Vec<u8>, N>,
}

impl<N: MutableNode> TreeBuilder<N> {
    /// Start an empty session.
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: HashMap::new(),
        }
    }

    /// The current root, if any node has been added.
    pub fn root(&self) -> Option<N> {
        self.root.clone()
    }

    /// Every node added so far, by key.
    pub fn nodes(&self) -> &HashMap<Vec<u8>, N> {
        &self.nodes
    }

    /// Number of distinct keys added.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the session holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `node`, or merge it into the resident node of the same key.
    ///
    /// The incoming node is reset to a leaf (`height = 0`, no children)
    /// before insertion. Returns the ancestors whose height, child links,
    /// or position changed, the former root included when a rotation
    /// promoted a new one; the inserted node itself is never in the list.
    pub fn add(&mut self, node: N) -> Result<Vec<N>> {
        node.set_height(0)?;
        node.set_left(None)?;
        node.set_right(None)?;
        validate_node(&node, None, None)?;

        let Some(root) = self.root.clone() else {
            self.nodes.insert(node.key(), node.clone());
            self.root = Some(node);
            return Ok(Vec::new());
        };

        if keys_equal(&root.key(), &node.key()) {
            root.merge(&node)?;
            return Ok(Vec::new());
        }

        let parents = self.insert(&node, root)?;
        self.nodes.entry(node.key()).or_insert(node);
        Ok(parents)
    }

    /// Finish the session, yielding a read view over the built nodes.
    pub fn into_tree(self) -> Result<Tree<N, MapPool<N>>> {
        let root = self
            .root
            .ok_or_else(|| Error::InvalidTree("empty session has no tree".into()))?;
        Tree::new(&root.key(), MapPool::from_nodes(self.nodes))
    }

    fn insert(&mut self, node: &N, root: N) -> Result<Vec<N>> {
        let mut parents: Vec<N> = Vec::new();
        let mut parent = root;

        loop {
            let (next, cmp) = descend(node, &parent)?;
            if cmp == Ordering::Equal {
                parent.merge(node)?;
                return Ok(parents);
            }

            parents.push(parent);
            match next {
                Some(p) => parent = p,
                None => break,
            }
        }

        if parents.len() < 2 {
            return Ok(parents);
        }

        let p1 = parents[parents.len() - 1].clone();
        let p2 = parents[parents.len() - 2].clone();
        if single_violation(&p1, &p2) {
            let head = (parents.len() > 2).then(|| parents[parents.len() - 3].clone());
            self.single_rotation(head.as_ref(), &p2, &p1, node)?;
            return Ok(parents);
        }

        let (head, violated) = refresh_parent_heights(&parents)?;
        let Some((violated, is_left)) = violated else {
            return Ok(parents);
        };

        let child = violated.child(is_left).ok_or_else(|| {
            Error::FailedToAddNode(format!(
                "violated node {} has no child on the violated side",
                hex::encode(violated.key()),
            ))
        })?;

        if is_left == (compare_keys(&node.key(), &child.key()) == Ordering::Less) {
            self.same_side_rotation(head.as_ref(), &violated, is_left)?;
        } else {
            self.curved_rotation(head.as_ref(), &violated, node, is_left)?;
        }

        Ok(parents)
    }

    /// Three-node promotion for the shallow case where the last two
    /// ancestors hold at most one child each.
    fn single_rotation(&mut self, head: Option<&N>, p2: &N, p1: &N, node: &N) -> Result<()> {
        let is_left = compare_keys(&p1.key(), &p2.key()) == Ordering::Less;

        let top = if is_left == (compare_keys(&node.key(), &p1.key()) == Ordering::Less) {
            // p1 keeps the new node and picks up p2 on the other side
            p2.set_child(is_left, None)?;
            reset_height(p2, false)?;
            p1.set_child(!is_left, Some(p2.clone()))?;
            p1.clone()
        } else {
            // the new node itself becomes the subtree top
            p2.set_child(is_left, None)?;
            reset_height(p2, false)?;
            p1.set_child(!is_left, None)?;
            reset_height(p1, false)?;
            node.set_child(is_left, Some(p1.clone()))?;
            node.set_child(!is_left, Some(p2.clone()))?;
            reset_height(node, false)?;
            node.clone()
        };

        self.relink(head, &top, &top)
    }

    /// Left-left rotation, mirrored for right-right when `is_left` is
    /// false.
    fn same_side_rotation(&mut self, head: Option<&N>, violated: &N, is_left: bool) -> Result<()> {
        let p2 = violated.child(is_left).ok_or_else(|| {
            Error::FailedToAddNode(format!(
                "violated node {} is missing its rotation child",
                hex::encode(violated.key()),
            ))
        })?;
        let p2r = p2.child(!is_left);

        violated.set_child(is_left, p2r)?;
        p2.set_child(!is_left, Some(violated.clone()))?;
        reset_height(violated, false)?;

        self.relink(head, &p2, violated)
    }

    /// Left-right rotation, mirrored for right-left when `is_left` is
    /// false. Promotes the grandchild `p1` and redistributes its children
    /// to the outer positions.
    fn curved_rotation(
        &mut self,
        head: Option<&N>,
        violated: &N,
        node: &N,
        is_left: bool,
    ) -> Result<()> {
        let p2 = violated.child(is_left).ok_or_else(|| {
            Error::FailedToAddNode(format!(
                "violated node {} is missing its rotation child",
                hex::encode(violated.key()),
            ))
        })?;
        let p1 = p2.child(!is_left).ok_or_else(|| {
            Error::FailedToAddNode(format!(
                "rotation child {} is missing its inner child",
                hex::encode(p2.key()),
            ))
        })?;

        let toward_left = compare_keys(&node.key(), &p1.key()) == Ordering::Less;
        let n0 = p1.child(toward_left).ok_or_else(|| {
            Error::FailedToAddNode(format!(
                "promoted node {} is missing the child on the insertion side",
                hex::encode(p1.key()),
            ))
        })?;
        let n1 = p1.child(!toward_left);

        // which grandchild lands under p2 and which under the violated
        // node depends on the side the new key descended through p1
        let (inner, outer) = if is_left == toward_left {
            (Some(n0), n1)
        } else {
            (n1, Some(n0))
        };

        p2.set_child(!is_left, inner)?;
        violated.set_child(is_left, outer)?;
        reset_height(&p2, false)?;
        reset_height(violated, false)?;

        p1.set_child(is_left, Some(p2.clone()))?;
        p1.set_child(!is_left, Some(violated.clone()))?;
        reset_height(&p1, false)?;

        self.relink(head, &p1, violated)
    }

    /// Point `head` (or the root, when the rotation happened at the top)
    /// at the new subtree root. `old_top` decides the side under `head`.
    fn relink(&mut self, head: Option<&N>, new_top: &N, old_top: &N) -> Result<()> {
        match head {
            None => {
                self.root = Some(new_top.clone());
                Ok(())
            }
            Some(head) => {
                let left = compare_keys(&old_top.key(), &head.key()) == Ordering::Less;
                head.set_child(left, Some(new_top.clone()))
            }
        }
    }
}

impl<N: MutableNode> Default for TreeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// One descent step. Returns the next parent to walk into, or links the
/// node in place when the slot on its side is free, refreshing the
/// parent's height.
fn descend<N: MutableNode>(node: &N, parent: &N) -> Result<(Option<N>, Ordering)> {
    let cmp = compare_keys(&node.key(), &parent.key());
    match cmp {
        Ordering::Equal => Ok((None, cmp)),
        Ordering::Less => match parent.left() {
            Some(left) => Ok((Some(left), cmp)),
            None => {
                parent.set_left(Some(node.clone()))?;
                reset_height(parent, false)?;
                Ok((None, cmp))
            }
        },
        Ordering::Greater => match parent.right() {
            Some(right) => Ok((Some(right), cmp)),
            None => {
                parent.set_right(Some(node.clone()))?;
                reset_height(parent, false)?;
                Ok((None, cmp))
            }
        },
    }
}

/// Walk the ancestor chain upward from the grandparent of the new node,
/// refreshing heights until the first balance violation.
///
/// Returns the node above the violated one (`head`, when any) and the
/// violated node with the side that grew too tall. Ancestors above the
/// violation keep their heights; the rotation restores the subtree to its
/// pre-insert height.
fn refresh_parent_heights<N: MutableNode>(parents: &[N]) -> Result<(Option<N>, Option<(N, bool)>)> {
    // the immediate parent was refreshed when the node was linked
    for i in (0..=parents.len() - 2).rev() {
        let p = &parents[i];
        let left_height = p.left().map(|n| n.height());
        let right_height = p.right().map(|n| n.height());

        if let Some(is_left) = sibling_violation(left_height, right_height) {
            let head = (i > 0).then(|| parents[i - 1].clone());
            return Ok((head, Some((p.clone(), is_left))));
        }

        reset_height(p, false)?;
    }

    Ok((None, None))
}

/// Whether the two deepest ancestors qualify for the single-rotation
/// shortcut: neither holds both children at once.
fn single_violation<N: MutableNode>(p1: &N, p2: &N) -> bool {
    !(p1.left().is_some() && p1.right().is_some())
        && !(p2.left().is_some() && p2.right().is_some())
}

/// Recompute a node's height from its children, treating a missing child
/// as height -1. Equal heights are not rewritten, so an unchanged node
/// keeps its cached hash. With `dry_run` the value is returned without
/// writing.
pub(crate) fn reset_height<N: MutableNode>(node: &N, dry_run: bool) -> Result<i16> {
    let mut height = 0;
    if let Some(left) = node.left() {
        height = left.height() + 1;
    }
    if let Some(right) = node.right()
        && right.height() >= height
    {
        height = right.height() + 1;
    }

    if height == node.height() || dry_run {
        return Ok(height);
    }

    node.set_height(height)?;
    Ok(height)
}
