//! Node model: canonical nodes and their flattened, render-ready counterparts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::DomainError;

const ID_PREFIX: &str = "tree-node-";

/// Opaque node identity, minted from a per-tree monotonic counter.
///
/// The string form is `tree-node-<n>`. Ids are never reused, even after the
/// node they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn from_counter(counter: u64) -> Self {
        Self(counter)
    }

    /// Position of this id in the minting sequence, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

impl FromStr for NodeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map(NodeId)
            .ok_or_else(|| DomainError::InvalidId(s.to_string()))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of a node, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "dir")]
    Directory,
    #[serde(rename = "file")]
    File,
}

impl NodeKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "dir"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Canonical tree node as stored in the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    /// Empty while a freshly created node is waiting for its first name
    pub name: String,
    pub kind: NodeKind,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Lightweight reference: identity, name and kind only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

impl From<&TreeNode> for NodeRef {
    fn from(node: &TreeNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            kind: node.kind,
        }
    }
}

/// Denormalized node record handed out to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTreeNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeRef>,
    #[serde(default)]
    pub children: Vec<NodeRef>,
}

impl FlatTreeNode {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind, parent: Option<NodeRef>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parent,
            children: Vec::new(),
        }
    }

    pub fn to_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Flattened mapping from node id to its denormalized record.
pub type FlatTree = BTreeMap<NodeId, FlatTreeNode>;
