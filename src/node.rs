//! A single vertex of a [`Tree`](crate::Tree).

use crate::NodeIdx;

/// A tree node: optional content, the handle of its parent
/// (absent for a root) and the ordered handles of its children.
///
/// The structural fields are only ever modified by the owning
/// [`Tree`](crate::Tree), which keeps both directions of every
/// parent/child link in sync.
#[rustfmt::skip]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Node<T> {
    idx: NodeIdx,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
    content: Option<T>,
    garbage: bool,
}

impl<T> Node<T> {
    pub(crate) fn new(idx: NodeIdx, content: Option<T>) -> Self {
        Node {
            idx,
            parent: None,
            children: Vec::with_capacity(4),
            content,
            garbage: false,
        }
    }

    #[inline(always)]
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    #[inline(always)]
    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    #[inline(always)]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    #[inline(always)]
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    #[inline(always)]
    pub(crate) fn content_mut(&mut self) -> Option<&mut T> {
        self.content.as_mut()
    }

    /// Replace the content of `self`, returning the previous content.
    #[inline]
    pub(crate) fn set_content(&mut self, content: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.content, content)
    }

    #[inline]
    pub(crate) fn take_content(&mut self) -> Option<T> {
        self.content.take()
    }

    /// Return `true` iff `self` holds no content.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    #[inline(always)]
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.children.iter().copied()
    }

    #[inline(always)]
    pub fn count_children(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_branch(&self) -> bool {
        !self.is_leaf()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline(always)]
    pub(crate) fn set_parent_idx(&mut self, parent_idx: Option<NodeIdx>) {
        self.parent = parent_idx;
    }

    #[inline(always)]
    pub(crate) fn add_child_idx(&mut self, child_idx: NodeIdx) {
        self.children.push(child_idx);
    }

    /// Insert `child_idx` as the `pos`-th child of `self`.
    #[inline]
    pub(crate) fn insert_child_idx(&mut self, pos: usize, child_idx: NodeIdx) {
        self.children.insert(pos, child_idx);
    }

    /// Remove the first occurrence of `child_idx` from `self.children`.
    /// Return `false` if `self.children` does not contain `child_idx`.
    #[inline]
    pub(crate) fn remove_child_idx(&mut self, child_idx: NodeIdx) -> bool {
        match self.children.iter().position(|&cidx| cidx == child_idx) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    #[inline(always)]
    pub(crate) fn is_garbage(&self) -> bool {
        self.garbage
    }

    /// Reset `self` to a detached, empty, childless garbage node,
    /// returning whatever content it held.
    #[inline]
    pub(crate) fn recycle(&mut self) -> Option<T> {
        debug_assert!(self.is_leaf() && self.is_root());
        self.parent = None;
        self.children.clear();
        self.garbage = true;
        self.content.take()
    }

    /// Bring a garbage node back into use, holding `content`.
    #[inline]
    pub(crate) fn revive(&mut self, content: Option<T>) {
        debug_assert!(self.garbage);
        self.garbage = false;
        self.content = content;
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("Node");
        let ds = ds.field("idx", &self.idx);
        let ds = ds.field("parent", &self.parent);
        let ds = ds.field("children", &self.children);
        let ds = ds.field("content", &self.content);
        let ds = ds.field("garbage", &self.garbage);
        ds.finish()
    }
}
