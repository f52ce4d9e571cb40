//! Route hierarchy built from discovered files.
//!
//! Branches mirror directory segments and leaves wrap individual files.

mod tree;

pub use tree::{HierarchyNode, Leaf, NodeId, RouteTree};
