//! Per-node presentation state, kept outside the engine and merged with its
//! flat snapshot for rendering.

use std::collections::HashMap;

use crate::domain::{FlatTree, FlatTreeNode, NodeId};

/// Whether a node is shown as a label or as a name input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub mode: Mode,
    /// Set when the last rename attempt on this node was rejected
    pub is_error: bool,
    pub is_collapsed: bool,
}

/// A flat record merged with its presentation state.
#[derive(Debug, Clone, Copy)]
pub struct ViewNode<'a> {
    pub node: &'a FlatTreeNode,
    pub state: NodeState,
}

#[derive(Debug, Default)]
pub struct ViewState {
    states: HashMap<NodeId, NodeState>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-keys the state to a fresh snapshot.
    ///
    /// Ids missing from `flat` are dropped. Every node returns to read mode
    /// with its error flag cleared, except `writing`, which enters write mode.
    /// Collapse state survives.
    pub fn refresh(&mut self, flat: &FlatTree, writing: Option<NodeId>) {
        self.states.retain(|id, _| flat.contains_key(id));
        for id in flat.keys() {
            let state = self.states.entry(*id).or_default();
            state.mode = if Some(*id) == writing {
                Mode::Write
            } else {
                Mode::Read
            };
            state.is_error = false;
        }
    }

    pub fn get(&self, id: NodeId) -> NodeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn set_mode(&mut self, id: NodeId, mode: Mode) {
        self.states.entry(id).or_default().mode = mode;
    }

    pub fn mark_error(&mut self, id: NodeId) {
        self.states.entry(id).or_default().is_error = true;
    }

    /// Flips the collapse flag and returns the new value.
    pub fn toggle_collapse(&mut self, id: NodeId) -> bool {
        let state = self.states.entry(id).or_default();
        state.is_collapsed = !state.is_collapsed;
        state.is_collapsed
    }

    /// Looks up `id` in `flat`; stale ids yield None.
    pub fn merge<'a>(&self, flat: &'a FlatTree, id: NodeId) -> Option<ViewNode<'a>> {
        flat.get(&id).map(|node| ViewNode {
            node,
            state: self.get(id),
        })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
