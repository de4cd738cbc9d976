use crate::NodeIdx;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    displaydoc::Display,
    thiserror::Error,
)]
pub enum Error {
    /// Couldn't find a live node for the NodeIdx {idx:?}.
    NodeNotFound { idx: NodeIdx },
    /// Attaching {child:?} under {parent:?} would make {child:?} its own ancestor.
    CycleDetected { parent: NodeIdx, child: NodeIdx },
    /// {idx:?} is the root of the tree and can't be attached as a child.
    RootNotAttachable { idx: NodeIdx },
    /// {idx:?} has a parent, so it can't become the root of the tree.
    NotParentless { idx: NodeIdx },
    /// {child:?} is listed more than once as a child of {parent:?}.
    DuplicateChild { parent: NodeIdx, child: NodeIdx },
    /// Position {pos} is out of bounds for the {len} children of {parent:?}.
    ChildPosOutOfBounds { parent: NodeIdx, pos: usize, len: usize },
}
