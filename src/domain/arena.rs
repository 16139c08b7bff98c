use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::{NodeId, NodeKind, TreeNode};

/// Arena-based storage for the canonical tree.
///
/// Nodes live in a generational arena and refer to each other by index.
/// An id → index map gives O(1) lookup by [`NodeId`]; it is updated on every
/// insert and detach so it always holds exactly the reachable nodes.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    index: HashMap<NodeId, Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            index: HashMap::new(),
        }
    }

    /// Stores `node` and links it under `parent`, or makes it the root when
    /// `parent` is None.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub fn insert_node(&mut self, mut node: TreeNode, parent: Option<Index>) -> Index {
        node.parent = parent;
        node.children.clear();
        let id = node.id;
        let node_idx = self.arena.insert(node);
        self.index.insert(id, node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn lookup(&self, id: NodeId) -> Option<Index> {
        self.index.get(&id).copied()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Read-only view of the node at `idx`, if it is still alive.
    pub fn view(&self, idx: Index) -> Option<NodeView<'_>> {
        self.arena.get(idx).map(|node| NodeView { arena: self, node })
    }

    /// Like [`TreeArena::view`] for an index known to be alive.
    ///
    /// Panics if `idx` has been freed.
    pub(crate) fn view_at(&self, idx: Index) -> NodeView<'_> {
        NodeView {
            arena: self,
            node: &self.arena[idx],
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.root = None;
    }

    /// Unlinks the subtree rooted at `idx` and frees every node in it.
    ///
    /// Remaining siblings keep their relative order. Returns the number of
    /// nodes removed.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, idx: Index) -> usize {
        if self.root == Some(idx) {
            let removed = self.arena.len();
            self.clear();
            return removed;
        }
        let Some(parent_idx) = self.arena.get(idx).and_then(|node| node.parent) else {
            return 0;
        };
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.retain(|&child| child != idx);
        }

        let doomed: Vec<Index> = PostOrderIterator::from_index(self, idx)
            .map(|(child_idx, _)| child_idx)
            .collect();
        for child_idx in &doomed {
            if let Some(node) = self.arena.remove(*child_idx) {
                self.index.remove(&node.id);
            }
        }
        doomed.len()
    }

    /// Walks up from `idx` to the first directory, including `idx` itself.
    pub fn nearest_directory(&self, idx: Index) -> Option<Index> {
        let mut current = Some(idx);
        while let Some(current_idx) = current {
            let node = self.arena.get(current_idx)?;
            if node.kind.is_dir() {
                return Some(current_idx);
            }
            current = node.parent;
        }
        None
    }

    /// Pre-order traversal from the root; children in insertion order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects all leaf nodes (nodes with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id)
            .collect()
    }
}

/// Borrowed, read-only view of a canonical node and its subtree.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    arena: &'a TreeArena,
    node: &'a TreeNode,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn node(&self) -> &'a TreeNode {
        self.node
    }

    pub fn parent(&self) -> Option<NodeView<'a>> {
        self.node.parent.and_then(|idx| self.arena.view(idx))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeView<'a>> + 'a {
        let arena = self.arena;
        let node = self.node;
        node.children
            .iter()
            .filter_map(move |&idx| arena.view(idx))
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("id", &self.node.id)
            .field("name", &self.node.name)
            .field("kind", &self.node.kind)
            .field("children", &self.node.children.len())
            .finish()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        match arena.root() {
            Some(root) => Self::from_index(arena, root),
            None => Self {
                arena,
                stack: Vec::new(),
            },
        }
    }

    fn from_index(arena: &'a TreeArena, start: Index) -> Self {
        Self {
            arena,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
