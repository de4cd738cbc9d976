//! A generic, arena-allocated tree datastructure.
//!
//! Every node holds optional content and an ordered list of children,
//! and knows its parent.  Nodes are addressed by [`NodeIdx`] handles
//! into the arena of the [`Tree`] that owns them.  All structural
//! changes go through `Tree`, which keeps parent and child links in
//! sync and refuses to create cycles.
//!
//! The structure is not internally synchronized: mutation requires
//! `&mut Tree<T>`, and sharing across threads follows the usual
//! `Send`/`Sync` rules for `T`.
#![forbid(unsafe_code)]

mod arena;
pub mod error;
pub mod node;
pub mod node_count;
pub mod node_idx;
pub mod tree;

#[rustfmt::skip]
pub use crate::{
    error::{Error, Result},
    node::Node,
    node_count::NodeCount,
    node_idx::NodeIdx,
    tree::Tree,
};
