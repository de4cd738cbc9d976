//! The [`Tree`] handle: an arena of nodes plus a designated root.

use crate::arena::Arena;
pub use crate::{
    error::{Error, Result},
    node::Node,
    NodeCount, NodeIdx,
};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

#[macro_export]
/// Declaratively construct a `Tree<T>`, where the `$data`
/// arguments all have type `T` and every node has content.
/// The expansion evaluates to a `Result<Tree<T>>`.
///
/// ```
/// # fn main() -> constructs_tree::Result<()> {
/// let tree = constructs_tree::tree!(("A", ("B", ("D"), ("E")), ("C")))?;
/// assert_eq!(*tree.size(), 5);
/// assert_eq!(tree.height(), 2);
/// # Ok(())
/// # }
/// ```
macro_rules! tree {
    (
        ($data:expr $(, $($children:tt),+)?)
        $(,)?
    ) => {{
        (|| -> $crate::Result<$crate::Tree<_>> {
            let mut tree = $crate::Tree::default();
            #[allow(unused)]
            let root_idx = tree.add_node(None, $data)?;
            tree.set_root(root_idx)?;
            $(
                $(
                    $crate::place_tree! { [in tree] root_idx; $children }
                )+
            )?
            Ok(tree)
        })()
    }};
}

#[doc(hidden)]
#[macro_export]
// A "placement in" variant of the `tree!{}` macro.
// It must be expanded inside a fn returning `Result<_>`.
macro_rules! place_tree {
    (
        [in $tree:expr]
        $parent_idx:expr;
        ($data:expr $(, $($children:tt),+)?)
    ) => {{
        #[allow(unused)]
        let node_idx = $tree.add_node($parent_idx, $data)?;
        $(
            $(
                $crate::place_tree! { [in $tree] node_idx; $children }
            )+
        )?
    }};
}

/// A tree of nodes holding optional content of type `T`.
///
/// All nodes live in an arena owned by the tree, and are addressed
/// by [`NodeIdx`] handles.  The methods of `Tree` are the only way
/// to change the shape of the tree, and each of them keeps both
/// directions of every parent/child link in sync.  Attaching a node
/// beneath itself is rejected, so the structure is always acyclic.
///
/// Nodes are only ever handed out by shared reference, so their links
/// can't be overwritten from outside; content is changed through
/// [`Tree::set_content`] and [`Tree::content_mut`]:
///
/// ```compile_fail
/// let mut tree = constructs_tree::Tree::with_root("A");
/// let a = tree.root().unwrap();
/// let b = tree.add_node(a, "B").unwrap();
/// tree[a] = tree[b].clone();
/// ```
#[derive(Clone, Debug)]
pub struct Tree<T> {
    arena: Arena<T>,
    root: Option<NodeIdx>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl<T> Tree<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            arena: Arena::with_capacity(cap),
            root: None,
        }
    }

    /// Create a tree consisting of a single root node holding `content`.
    pub fn with_root(content: T) -> Self {
        let mut tree = Self::default();
        let root_idx = tree.arena.add_node(Some(content));
        tree.root = Some(root_idx);
        tree
    }

    #[inline]
    /// Get the logical size, which is defined as `physical size - garbage size`
    /// i.e. the number of allocated, non-garbage nodes in `self`.
    /// Unlike [`Self::size`], this includes detached nodes.
    pub fn logical_size(&self) -> NodeCount {
        self.arena.logical_size()
    }

    #[inline]
    /// Get the physical size, which is defined as the number of nodes
    /// allocated in the tree, whether they are garbage or not.
    pub fn physical_size(&self) -> NodeCount {
        self.arena.physical_size()
    }

    /// Get the garbage size i.e. the number of garbage nodes in `self`.
    #[inline]
    pub fn garbage_size(&self) -> NodeCount {
        self.arena.garbage_size()
    }

    #[inline(always)]
    pub fn root(&self) -> Option<NodeIdx> {
        self.root
    }

    #[inline]
    pub fn root_ref(&self) -> Option<&Node<T>> {
        self.root.map(|root_idx| &self[root_idx])
    }

    /// Make `self[root_idx]` the root of `self`, returning the previous root.
    /// The previous root and its descendants stay allocated as a detached
    /// subtree; use [`Self::rm_subtree`] to release them.
    pub fn set_root(&mut self, root_idx: NodeIdx) -> Result<Option<NodeIdx>> {
        self.arena.ensure_contains(root_idx)?;
        if self.arena[root_idx].has_parent() {
            return Err(Error::NotParentless { idx: root_idx });
        }
        let previous = self.root.replace(root_idx);
        tracing::trace!(?root_idx, ?previous, "set root");
        Ok(previous)
    }

    /// Make `self` empty without releasing any nodes,
    /// returning the previous root.
    pub fn take_root(&mut self) -> Option<NodeIdx> {
        let previous = self.root.take();
        tracing::trace!(?previous, "took root");
        previous
    }

    /// Return `true` iff `self` has no root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The leaves of the tree, left to right.  Empty for an empty tree.
    #[inline]
    pub fn leaves(&self) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.root.into_iter()
            .flat_map(move |root_idx| self.arena.leaves_of(root_idx))
    }

    /// The number of nodes reachable from the root, or 0 for an empty tree.
    #[inline]
    pub fn size(&self) -> NodeCount {
        self.root
            .map(|root_idx| self.arena.size_of(root_idx))
            .unwrap_or_default()
    }

    /// The height of the root, or 0 for an empty tree.
    #[inline]
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root_idx| self.arena.height_of(root_idx))
    }

    /// The depth of the root, or 0 for an empty tree.
    #[inline]
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root_idx| self.arena.depth_of(root_idx))
    }

    /// Return `true` iff `node_idx` addresses a live node of `self`.
    #[inline]
    pub fn contains(&self, node_idx: NodeIdx) -> bool {
        self.arena.contains(node_idx)
    }

    #[inline]
    pub fn get(&self, node_idx: NodeIdx) -> Option<&Node<T>> {
        self.arena.get(node_idx)
    }

    /// Mutable access to the content of `self[node_idx]`.  `None` if the
    /// node holds no content or `node_idx` doesn't address a live node.
    #[inline]
    pub fn content_mut(&mut self, node_idx: NodeIdx) -> Option<&mut T> {
        self.arena.get_mut(node_idx).and_then(Node::content_mut)
    }

    /// Replace the content of `self[node_idx]`, returning the previous content.
    pub fn set_content(
        &mut self,
        node_idx: NodeIdx,
        content: Option<T>,
    ) -> Result<Option<T>> {
        self.arena.get_mut(node_idx)
            .map(|node| node.set_content(content))
            .ok_or(Error::NodeNotFound { idx: node_idx })
    }

    #[inline]
    pub fn take_content(&mut self, node_idx: NodeIdx) -> Result<Option<T>> {
        self.set_content(node_idx, None)
    }

    /// Allocate a node holding `content`.  If `parent_idx` is given the
    /// node becomes its last child, otherwise the node is detached.
    /// A garbage node is recycled if there is one.
    pub fn add_node(
        &mut self,
        parent_idx: impl Into<Option<NodeIdx>>,
        content: T,
    ) -> Result<NodeIdx> {
        self.alloc_node(parent_idx.into(), Some(content))
    }

    /// Like [`Self::add_node`], for a node without content.
    pub fn add_empty_node(
        &mut self,
        parent_idx: impl Into<Option<NodeIdx>>,
    ) -> Result<NodeIdx> {
        self.alloc_node(parent_idx.into(), None)
    }

    fn alloc_node(
        &mut self,
        parent_idx: Option<NodeIdx>,
        content: Option<T>,
    ) -> Result<NodeIdx> {
        if let Some(parent_idx) = parent_idx {
            self.arena.ensure_contains(parent_idx)?;
        }
        let node_idx = self.arena.add_node(content);
        if let Some(parent_idx) = parent_idx {
            self.arena.add_edge(parent_idx, node_idx);
        }
        Ok(node_idx)
    }

    /// Make `self[child_idx]` the last child of `self[parent_idx]`,
    /// detaching it from its current parent first.
    pub fn add_child(
        &mut self,
        parent_idx: NodeIdx,
        child_idx: NodeIdx,
    ) -> Result<()> {
        self.attach(parent_idx, None, child_idx)
    }

    /// Make `self[child_idx]` the `pos`-th child of `self[parent_idx]`,
    /// detaching it from its current parent first.  `pos` is interpreted
    /// after that detachment, and may equal the number of children.
    pub fn insert_child(
        &mut self,
        parent_idx: NodeIdx,
        pos: usize,
        child_idx: NodeIdx,
    ) -> Result<()> {
        self.attach(parent_idx, Some(pos), child_idx)
    }

    fn attach(
        &mut self,
        parent_idx: NodeIdx,
        pos: Option<usize>,
        child_idx: NodeIdx,
    ) -> Result<()> {
        self.ensure_attachable(parent_idx, child_idx)?;
        let old_parent_idx = self.arena.parent_of(child_idx);
        if let Some(pos) = pos {
            let mut len = self.arena[parent_idx].count_children();
            if old_parent_idx == Some(parent_idx) {
                len -= 1;
            }
            if pos > len {
                return Err(Error::ChildPosOutOfBounds {
                    parent: parent_idx,
                    pos,
                    len,
                });
            }
        }
        if let Some(old_parent_idx) = old_parent_idx {
            self.arena.rm_edge(old_parent_idx, child_idx);
        }
        match pos {
            Some(pos) => self.arena.insert_edge(parent_idx, pos, child_idx),
            None => self.arena.add_edge(parent_idx, child_idx),
        }
        tracing::trace!(?parent_idx, ?child_idx, ?old_parent_idx, "attached child");
        Ok(())
    }

    /// Check that `self[child_idx]` can be linked beneath `self[parent_idx]`.
    fn ensure_attachable(
        &self,
        parent_idx: NodeIdx,
        child_idx: NodeIdx,
    ) -> Result<()> {
        self.arena.ensure_contains(parent_idx)?;
        self.arena.ensure_contains(child_idx)?;
        if self.root == Some(child_idx) {
            return Err(Error::RootNotAttachable { idx: child_idx });
        }
        if self.arena.self_or_ancestors_of(parent_idx).contains(&child_idx) {
            return Err(Error::CycleDetected {
                parent: parent_idx,
                child: child_idx,
            });
        }
        Ok(())
    }

    /// Detach `self[child_idx]` from `self[parent_idx]`.  The child and its
    /// descendants stay allocated, as a detached subtree.
    /// Return `Ok(false)` and leave `self` untouched if `self[child_idx]`
    /// is not a child of `self[parent_idx]`.
    pub fn remove_child(
        &mut self,
        parent_idx: NodeIdx,
        child_idx: NodeIdx,
    ) -> Result<bool> {
        self.arena.ensure_contains(parent_idx)?;
        self.arena.ensure_contains(child_idx)?;
        let removed = self.arena.rm_edge(parent_idx, child_idx);
        if removed {
            tracing::trace!(?parent_idx, ?child_idx, "detached child");
        }
        Ok(removed)
    }

    /// Make `self[parent_idx]` the parent of `self[child_idx]`, or
    /// detach `self[child_idx]` from its parent if `parent_idx` is `None`.
    pub fn set_parent(
        &mut self,
        child_idx: NodeIdx,
        parent_idx: impl Into<Option<NodeIdx>>,
    ) -> Result<()> {
        match parent_idx.into() {
            Some(parent_idx) => self.add_child(parent_idx, child_idx),
            None => {
                self.arena.ensure_contains(child_idx)?;
                if let Some(parent_idx) = self.arena.parent_of(child_idx) {
                    self.remove_child(parent_idx, child_idx)?;
                }
                Ok(())
            }
        }
    }

    /// Replace the children of `self[parent_idx]` with `child_idxs`, in
    /// order.  The previous children that are not listed again become
    /// detached subtrees.  Either every change is applied, or none is.
    pub fn set_children(
        &mut self,
        parent_idx: NodeIdx,
        child_idxs: impl IntoIterator<Item = NodeIdx>,
    ) -> Result<()> {
        let child_idxs: Vec<NodeIdx> = child_idxs.into_iter().collect();
        self.arena.ensure_contains(parent_idx)?;
        for &child_idx in &child_idxs {
            self.ensure_attachable(parent_idx, child_idx)?;
        }
        if let Some(&child_idx) = child_idxs.iter().duplicates().next() {
            return Err(Error::DuplicateChild {
                parent: parent_idx,
                child: child_idx,
            });
        }
        let old_child_idxs: Vec<NodeIdx> = self.arena.children_of(parent_idx).collect();
        for old_child_idx in old_child_idxs {
            self.arena.rm_edge(parent_idx, old_child_idx);
        }
        for &child_idx in &child_idxs {
            if let Some(old_parent_idx) = self.arena.parent_of(child_idx) {
                self.arena.rm_edge(old_parent_idx, child_idx);
            }
            self.arena.add_edge(parent_idx, child_idx);
        }
        tracing::trace!(?parent_idx, ?child_idxs, "set children");
        Ok(())
    }

    /// Recycle `self[node_idx]`.  Since a node conceptually owns
    /// its children, all descendant nodes are recycled as well, and
    /// their contents are dropped.  If `node_idx` is the root of
    /// `self`, then `self` becomes empty.
    pub fn rm_subtree(&mut self, node_idx: NodeIdx) -> Result<()> {
        let count = self.arena.rm_node(node_idx)?;
        if self.root == Some(node_idx) {
            self.root = None;
        }
        tracing::debug!(?node_idx, %count, "recycled subtree");
        Ok(())
    }

    #[inline]
    pub fn parent_of(&self, node_idx: NodeIdx) -> Option<NodeIdx> {
        self.arena.parent_of(node_idx)
    }

    #[inline(always)]
    pub fn children_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.arena.children_of(node_idx)
    }

    /// `self[node_idx]` followed by its ancestors, nearest first.
    #[inline(always)]
    pub fn self_or_ancestors_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl Iterator<Item = NodeIdx> + '_ {
        self.arena.self_or_ancestors_of(node_idx)
    }

    /// The ancestors of `self[node_idx]`, nearest first i.e. its parent,
    /// then its grandparent etc.  Empty for a parentless node.
    #[inline(always)]
    pub fn ancestors_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl Iterator<Item = NodeIdx> + '_ {
        self.arena.ancestors_of(node_idx)
    }

    /// The other children of the parent of `self[node_idx]`, in order.
    #[inline(always)]
    pub fn siblings_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.arena.siblings_of(node_idx)
    }

    #[inline(always)]
    pub fn self_or_descendants_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        self.arena.self_or_descendants_of(node_idx)
    }

    /// All descendants of `self[node_idx]` as one flat, pre-order sequence.
    #[inline(always)]
    pub fn descendants_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        self.arena.descendants_of(node_idx)
    }

    /// The leaves of the subtree rooted in `self[node_idx]`, left to right.
    /// This is just `[node_idx]` if `self[node_idx]` is a leaf.
    ///
    /// Like all queries taking a handle, this doesn't check that `node_idx`
    /// is live: on a recycled handle it describes the garbage slot (or
    /// whatever node reuses it).  Use [`Self::contains`] first if unsure.
    #[inline(always)]
    pub fn leaves_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.arena.leaves_of(node_idx)
    }

    /// The number of ancestors of `self[node_idx]`; 0 for a parentless node.
    ///
    /// Like all queries taking a handle, this doesn't check that `node_idx`
    /// is live: on a recycled handle it describes the garbage slot (or
    /// whatever node reuses it).  Use [`Self::contains`] first if unsure.
    #[inline(always)]
    pub fn depth_of(&self, node_idx: NodeIdx) -> usize {
        self.arena.depth_of(node_idx)
    }

    /// Like [`Self::depth_of`], this doesn't check that `node_idx` is live.
    #[inline(always)]
    pub fn height_of(&self, node_idx: NodeIdx) -> usize {
        self.arena.height_of(node_idx)
    }

    /// Like [`Self::depth_of`], this doesn't check that `node_idx` is live.
    #[inline(always)]
    pub fn size_of(&self, node_idx: NodeIdx) -> NodeCount {
        self.arena.size_of(node_idx)
    }

    #[inline(always)]
    pub fn dfs(
        &self,
        start_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        self.arena.dfs(start_idx)
    }

    #[inline(always)]
    pub fn bfs(
        &self,
        start_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        self.arena.bfs(start_idx)
    }
}

impl<T> std::ops::Index<NodeIdx> for Tree<T> {
    type Output = Node<T>;

    fn index(&self, idx: NodeIdx) -> &Self::Output {
        &self.arena[idx]
    }
}

impl<T> PartialEq<Self> for Tree<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        // NOTE: The idea is to do a logical comparison where:
        // 1. Only nodes reachable from the root are compared
        // 2. Those nodes are compared in DFS order
        let (sroot_idx, oroot_idx) = match (self.root, other.root) {
            (None, None) => return true,
            (Some(sroot_idx), Some(oroot_idx)) => (sroot_idx, oroot_idx),
            _ => return false,
        };
        if self.size() != other.size() {
            return false;
        }
        let mut map = HashMap::new();
        for (sidx, oidx) in self.dfs(sroot_idx).zip(other.dfs(oroot_idx)) {
            map.insert(sidx, oidx);
            let (snode, onode) = (&self[sidx], &other[oidx]);
            if sidx != sroot_idx {
                match (snode.parent(), onode.parent()) {
                    (Some(spidx), Some(opidx)) if map.get(&spidx) == Some(&opidx) => {
                        // NOP
                    }
                    _ => return false,
                }
            }
            if snode.count_children() != onode.count_children() {
                return false;
            }
            if snode.content() != onode.content() {
                return false;
            }
        }
        true
    }
}

#[rustfmt::skip]
impl<T> Eq for Tree<T> where T: Eq {}

impl<T> fmt::Display for Tree<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(root_idx) = self.root else {
            return Ok(());
        };
        // NOTE: This loop is `O(D * N)`, where:
        //       - D is the maximum depth of `self`
        //       - N is the number of nodes in `self`
        for node_idx in self.dfs(root_idx) {
            for _ in self.ancestors_of(node_idx) {
                write!(f, "| ")?; // no newline
            }
            match self[node_idx].content() {
                Some(content) => writeln!(f, "{node_idx} {content}")?,
                None => writeln!(f, "{node_idx}")?,
            }
        }
        Ok(())
    }
}
