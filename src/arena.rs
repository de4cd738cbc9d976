//! This module deals with arena allocation.

use crate::{
    error::{Error, Result},
    node::Node,
    NodeCount, NodeIdx,
};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    garbage: VecDeque<NodeIdx>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl<T> Arena<T> {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(cap),
            garbage: VecDeque::with_capacity(cap),
        }
    }

    /// Get the logical size, which is defined as `physical size - garbage size`
    /// i.e. the number of allocated, non-garbage nodes in `self`.
    #[inline]
    pub fn logical_size(&self) -> NodeCount {
        self.physical_size() - self.garbage_size()
    }

    /// Get the physical size, which is defined as the number of nodes
    /// allocated in the arena, whether they are garbage or not.
    #[inline]
    pub fn physical_size(&self) -> NodeCount {
        NodeCount::from(self.nodes.len())
    }

    /// Get the garbage size i.e. the number of garbage nodes in `self`.
    #[inline]
    pub fn garbage_size(&self) -> NodeCount {
        NodeCount::from(self.garbage.len())
    }

    /// Return `true` iff `node_idx` addresses an allocated, non-garbage node.
    #[inline]
    pub fn contains(&self, node_idx: NodeIdx) -> bool {
        self.nodes.get(node_idx.0).is_some_and(|node| !node.is_garbage())
    }

    #[inline]
    pub fn ensure_contains(&self, node_idx: NodeIdx) -> Result<()> {
        if self.contains(node_idx) {
            Ok(())
        } else {
            Err(Error::NodeNotFound { idx: node_idx })
        }
    }

    #[inline]
    pub fn get(&self, node_idx: NodeIdx) -> Option<&Node<T>> {
        if self.contains(node_idx) {
            Some(&self.nodes[node_idx.0])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, node_idx: NodeIdx) -> Option<&mut Node<T>> {
        if self.contains(node_idx) {
            Some(&mut self.nodes[node_idx.0])
        } else {
            None
        }
    }

    /// If there is a garbage `Node<T>` in `self`, recycle it.
    /// Otherwise, allocate a new one.
    /// In either case, assign `content` to the node, and return its `NodeIdx`.
    pub fn add_node(&mut self, content: Option<T>) -> NodeIdx {
        if let Some(node_idx) = self.garbage.pop_front() {
            self[node_idx].revive(content);
            node_idx
        } else {
            let node_idx = NodeIdx(self.nodes.len());
            self.nodes.push(Node::new(node_idx, content));
            node_idx
        }
    }

    /// Recycle `self[node_idx]`.  Since a node conceptually owns
    /// its children, all descendant nodes and all edges between
    /// them are removed as well.  Return the number of recycled nodes.
    pub fn rm_node(&mut self, node_idx: NodeIdx) -> Result<NodeCount> {
        self.ensure_contains(node_idx)?;
        let doomed: Vec<NodeIdx> = self.dfs(node_idx).collect();
        for &idx in doomed.iter().rev(/* leaves -> ... -> node_idx */) {
            debug_assert!(self[idx].is_leaf());
            if let Some(parent_idx) = self[idx].parent() {
                self.rm_edge(parent_idx, idx);
            }
            drop(self[idx].recycle());
            self.garbage.push_back(idx);
        }
        Ok(NodeCount::from(doomed.len()))
    }

    /// Add a bidirectional edge between `self[pidx]` and `self[cidx]`,
    /// appending `cidx` to the children of `pidx`.
    /// `self[cidx]` must be parentless.
    pub fn add_edge(&mut self, pidx: NodeIdx, cidx: NodeIdx) {
        debug_assert!(self[cidx].is_root());
        self[pidx].add_child_idx(cidx);
        self[cidx].set_parent_idx(Some(pidx));
    }

    /// Insert a bidirectional edge between `self[pidx]` and `self[cidx]`,
    /// making `cidx` the `pos`-th child of `pidx`.
    /// `self[cidx]` must be parentless.
    pub fn insert_edge(&mut self, pidx: NodeIdx, pos: usize, cidx: NodeIdx) {
        debug_assert!(self[cidx].is_root());
        self[pidx].insert_child_idx(pos, cidx);
        self[cidx].set_parent_idx(Some(pidx));
    }

    /// Remove the edge between `self[parent_idx]` and `self[child_idx]`.
    /// Return `false`, leaving both nodes untouched, if no such edge exists.
    pub fn rm_edge(&mut self, parent_idx: NodeIdx, child_idx: NodeIdx) -> bool {
        if self[child_idx].parent() != Some(parent_idx) {
            return false;
        }
        let removed = self[parent_idx].remove_child_idx(child_idx);
        debug_assert!(removed, "{child_idx:?} missing from children of {parent_idx:?}");
        self[child_idx].set_parent_idx(None);
        removed
    }

    #[inline]
    pub fn parent_of(&self, node_idx: NodeIdx) -> Option<NodeIdx> {
        self[node_idx].parent()
    }

    pub fn self_or_ancestors_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl Iterator<Item = NodeIdx> + '_ {
        std::iter::successors(Some(node_idx), move |&idx| self[idx].parent())
    }

    #[inline]
    pub fn ancestors_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl Iterator<Item = NodeIdx> + '_ {
        self.self_or_ancestors_of(node_idx).skip(1)
    }

    #[inline]
    pub fn siblings_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self[node_idx].parent().into_iter()
            .flat_map(move |pidx| self[pidx].children())
            .filter(move |&sidx| sidx != node_idx)
    }

    #[inline(always)]
    pub fn children_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self[node_idx].children()
    }

    #[inline(always)]
    pub fn self_or_descendants_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        self.dfs(node_idx)
    }

    #[inline]
    pub fn descendants_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        let mut descendants = self.dfs(node_idx);
        descendants.next(); // node_idx itself
        descendants
    }

    #[inline]
    pub fn leaves_of(
        &self,
        node_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + '_ {
        self.dfs(node_idx).filter(move |&idx| self[idx].is_leaf())
    }

    /// The number of edges between `self[node_idx]` and its root.
    #[inline]
    pub fn depth_of(&self, node_idx: NodeIdx) -> usize {
        self.ancestors_of(node_idx).count()
    }

    /// The number of edges on the longest downward
    /// path from `self[node_idx]` to a leaf.
    pub fn height_of(&self, node_idx: NodeIdx) -> usize {
        let mut height = 0;
        let mut stack = vec![(node_idx, 0)];
        while let Some((idx, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(self[idx].children().map(|cidx| (cidx, level + 1)));
        }
        height
    }

    /// The number of nodes in the subtree rooted in `self[node_idx]`,
    /// `self[node_idx]` itself included.
    #[inline]
    pub fn size_of(&self, node_idx: NodeIdx) -> NodeCount {
        NodeCount::from(self.dfs(node_idx).count())
    }

    /// Pre-order depth-first traversal, children visited left to right.
    pub fn dfs(
        &self,
        start_idx: NodeIdx,
    ) -> std::vec::IntoIter<NodeIdx> {
        let mut output = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start_idx];
        while let Some(node_idx) = stack.pop() {
            output.push(node_idx);
            stack.extend(self[node_idx].children().rev());
        }
        output.into_iter()
    }

    pub fn bfs(
        &self,
        start_idx: NodeIdx,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> {
        type Layer = Vec<NodeIdx>;
        let mut layers: Vec<Layer> = vec![Layer::from([start_idx])];
        while let Some(previous) = layers.last() {
            let current: Layer = previous.iter()
                .flat_map(|&idx| self[idx].children())
                .collect();
            if current.is_empty() {
                break;
            }
            layers.push(current);
        }
        layers.into_iter().flatten()
    }
}

impl<T> std::ops::Index<NodeIdx> for Arena<T> {
    type Output = Node<T>;

    fn index(&self, idx: NodeIdx) -> &Self::Output {
        &self.nodes[idx.0]
    }
}

impl<T> std::ops::IndexMut<NodeIdx> for Arena<T> {
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Self::Output {
        &mut self.nodes[idx.0]
    }
}
