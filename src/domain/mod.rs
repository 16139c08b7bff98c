//! Domain layer: the node model and the tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod node;
pub mod tree;

pub use arena::{NodeView, TreeArena};
pub use error::{DomainError, DomainResult};
pub use node::{FlatTree, FlatTreeNode, NodeId, NodeKind, NodeRef, TreeNode};
pub use tree::{ParentPolicy, Tree};
