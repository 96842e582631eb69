//! UCT node arena and tree (C8, C9): the concurrently-mutable search
//! tree. See `node`, `arena` and `tree` submodules for the three layers
//! (statistics, allocation, tree structure/iteration).

pub mod arena;
pub mod node;
pub mod tree;

pub use node::{Node, Stat};
pub use tree::{ChildIterator, NodeHandle, Tree, TreeIterator};
