//! Tree engine: owns the canonical tree and keeps its flattened view in sync.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{
    DomainError, DomainResult, FlatTree, FlatTreeNode, NodeId, NodeKind, NodeRef, NodeView,
    TreeArena, TreeNode,
};

/// Which nodes may receive children on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParentPolicy {
    /// Any node, files included
    #[default]
    Permissive,
    /// Only directories; a file target redirects to its nearest directory ancestor
    DirectoriesOnly,
}

impl fmt::Display for ParentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentPolicy::Permissive => write!(f, "permissive"),
            ParentPolicy::DirectoriesOnly => write!(f, "directories-only"),
        }
    }
}

impl FromStr for ParentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(ParentPolicy::Permissive),
            "directories-only" | "directories_only" => Ok(ParentPolicy::DirectoriesOnly),
            other => Err(format!("unknown parent policy: {}", other)),
        }
    }
}

/// Mutable directory/file tree with a derived id → [`FlatTreeNode`] mapping.
///
/// Every successful mutation ends by rebuilding the whole mapping from the
/// root, so [`Tree::get_flat`] never shows a partially updated state.
/// Failed operations change nothing and do not rebuild.
///
/// The engine is single-writer: wrap the whole instance in one lock if it has
/// to be shared between threads.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: TreeArena,
    flat: Arc<FlatTree>,
    counter: u64,
    policy: ParentPolicy,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ParentPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ParentPolicy {
        self.policy
    }

    fn next_id(&mut self) -> NodeId {
        self.counter += 1;
        NodeId::from_counter(self.counter)
    }

    /// Creates a node named `name` and returns it.
    ///
    /// The first node inserted into an empty tree becomes the root whatever
    /// `parent` says. Afterwards the node is appended as the last child of
    /// `parent`, or of the root when `parent` is None or unknown.
    #[instrument(level = "debug", skip(self, name))]
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        kind: NodeKind,
    ) -> NodeView<'_> {
        let id = self.next_id();
        let node = TreeNode::new(id, name, kind);

        let idx = match self.nodes.root() {
            None => self.nodes.insert_node(node, None),
            Some(root) => {
                let parent_idx = self.resolve_parent(parent, root);
                self.nodes.insert_node(node, Some(parent_idx))
            }
        };
        debug!(%id, "inserted node");

        self.flatten();
        self.nodes.view_at(idx)
    }

    fn resolve_parent(&self, parent: Option<NodeId>, root: Index) -> Index {
        let target = parent
            .and_then(|id| self.nodes.lookup(id))
            .unwrap_or(root);
        match self.policy {
            ParentPolicy::Permissive => target,
            ParentPolicy::DirectoriesOnly => self.nodes.nearest_directory(target).unwrap_or(root),
        }
    }

    /// Removes the node and its whole subtree. Unknown ids are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, id: NodeId) {
        let Some(idx) = self.nodes.lookup(id) else {
            debug!(%id, "remove: no such node");
            return;
        };
        let removed = self.nodes.detach(idx);
        debug!(%id, removed, "removed subtree");
        self.flatten();
    }

    /// Renames a node, refusing empty names and names already used by a
    /// sibling. Renaming a node to its current name is allowed.
    #[instrument(level = "debug", skip(self, name))]
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }

        let flat_node = self.flat.get(&id).ok_or(DomainError::NotFound(id))?;
        if let Some(parent) = &flat_node.parent {
            let collides = self
                .flat
                .get(&parent.id)
                .map(|p| p.children.iter().any(|c| c.id != id && c.name == name))
                .unwrap_or(false);
            if collides {
                return Err(DomainError::NameCollision {
                    name,
                    parent: parent.name.clone(),
                });
            }
        }

        let node = self
            .nodes
            .lookup(id)
            .and_then(|idx| self.nodes.get_node_mut(idx))
            .ok_or(DomainError::NotFound(id))?;
        debug!(%id, from = %node.name, to = %name, "renamed node");
        node.name = name;

        self.flatten();
        Ok(())
    }

    /// Rebuilds the flattened mapping from the canonical tree.
    #[instrument(level = "trace", skip(self))]
    fn flatten(&mut self) {
        let mut flat = FlatTree::new();
        for (_, node) in self.nodes.iter() {
            let parent = node
                .parent
                .and_then(|idx| self.nodes.get_node(idx))
                .map(NodeRef::from);
            let mut entry = FlatTreeNode::new(node.id, node.name.clone(), node.kind, parent);
            entry.children = node
                .children
                .iter()
                .filter_map(|&idx| self.nodes.get_node(idx))
                .map(NodeRef::from)
                .collect();
            flat.insert(node.id, entry);
        }
        self.flat = Arc::new(flat);
    }

    /// Current flattened mapping.
    pub fn get_flat(&self) -> &FlatTree {
        &self.flat
    }

    /// Shared handle to the current flattened mapping. It stays valid, and
    /// unchanged, after later mutations.
    pub fn snapshot(&self) -> Arc<FlatTree> {
        Arc::clone(&self.flat)
    }

    pub fn get_root(&self) -> Option<NodeView<'_>> {
        self.nodes.root().and_then(|idx| self.nodes.view(idx))
    }

    pub fn get_node_by_id(&self, id: NodeId) -> Option<NodeView<'_>> {
        self.nodes.lookup(id).and_then(|idx| self.nodes.view(idx))
    }

    pub fn get_flat_node_by_id(&self, id: NodeId) -> Option<&FlatTreeNode> {
        self.flat.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.nodes.depth()
    }

    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.nodes.leaf_nodes()
    }
}
