//! Mutable directory/file tree with a flattened, render-ready view.
//!
//! [`domain::Tree`] owns the canonical tree and rebuilds an id → record
//! mapping after every mutation. The [`application`] layer keeps
//! presentation state next to it, and [`cli`] drives both from the terminal.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{
    DomainError, FlatTree, FlatTreeNode, NodeId, NodeKind, NodeRef, NodeView, ParentPolicy, Tree,
};
