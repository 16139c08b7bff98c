//! Editing session: a tree engine plus the presentation state around it.
//!
//! Mirrors a file-browser context menu: select a node, then create a file or
//! folder under it, rename it, or remove it.

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, Mode, ViewNode, ViewState};
use crate::config::{SeedConfig, Settings};
use crate::domain::{NodeId, NodeKind, Tree};

#[derive(Debug, Default)]
pub struct Session {
    tree: Tree,
    view: ViewState,
    /// Target of the context-menu actions
    active: Option<NodeId>,
}

impl Session {
    pub fn new(tree: Tree) -> Self {
        let mut view = ViewState::new();
        view.refresh(tree.get_flat(), None);
        Self {
            tree,
            view,
            active: None,
        }
    }

    /// Session over an engine configured and seeded from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut session = Self::new(Tree::with_policy(settings.parent_policy));
        session.seed(&settings.seed);
        session
    }

    /// Inserts the seed nodes through ordinary inserts. Returns the root id,
    /// or None when the seed has no root name.
    #[instrument(level = "debug", skip(self))]
    pub fn seed(&mut self, seed: &SeedConfig) -> Option<NodeId> {
        if seed.root.is_empty() {
            return None;
        }
        let root = self.tree.insert(seed.root.as_str(), None, NodeKind::Directory).id();
        for name in &seed.directories {
            self.tree.insert(name.as_str(), Some(root), NodeKind::Directory);
        }
        for name in &seed.files {
            self.tree.insert(name.as_str(), Some(root), NodeKind::File);
        }
        self.view.refresh(self.tree.get_flat(), None);
        Some(root)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Parses `raw` and checks that it names a node in the current snapshot.
    pub fn resolve(&self, raw: &str) -> ApplicationResult<NodeId> {
        raw.parse::<NodeId>()
            .ok()
            .filter(|id| self.tree.get_flat_node_by_id(*id).is_some())
            .ok_or_else(|| ApplicationError::UnknownNode(raw.to_string()))
    }

    /// Every node in the current snapshot merged with its presentation state.
    pub fn nodes(&self) -> impl Iterator<Item = ViewNode<'_>> {
        let flat = self.tree.get_flat();
        flat.keys().filter_map(move |id| self.view.merge(flat, *id))
    }

    pub fn get(&self, id: NodeId) -> Option<ViewNode<'_>> {
        self.view.merge(self.tree.get_flat(), id)
    }

    pub fn select(&mut self, id: NodeId) -> ApplicationResult<()> {
        if self.tree.get_flat_node_by_id(id).is_none() {
            return Err(ApplicationError::UnknownNode(id.to_string()));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Creates an unnamed node under the active node and puts it in write
    /// mode. The new node becomes active.
    #[instrument(level = "debug", skip(self))]
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let parent = self
            .active
            .and_then(|id| self.tree.get_node_by_id(id))
            .map(|node| node.id());
        let id = self.tree.insert("", parent, kind).id();
        self.view.refresh(self.tree.get_flat(), Some(id));
        self.active = Some(id);
        id
    }

    pub fn create_file(&mut self) -> NodeId {
        self.create(NodeKind::File)
    }

    pub fn create_folder(&mut self) -> NodeId {
        self.create(NodeKind::Directory)
    }

    /// Switches the active node to write mode and returns its current name
    /// as the initial input.
    pub fn mark_for_rename(&mut self) -> ApplicationResult<String> {
        let id = self.active.ok_or(ApplicationError::NoActiveNode)?;
        let name = self
            .tree
            .get_flat_node_by_id(id)
            .map(|node| node.name.clone())
            .ok_or_else(|| ApplicationError::UnknownNode(id.to_string()))?;
        self.view.set_mode(id, Mode::Write);
        Ok(name)
    }

    /// Commits `name` for the active node.
    ///
    /// On rejection the node stays in write mode with its error flag set and
    /// the failure is returned for display.
    pub fn commit_rename(&mut self, name: &str) -> ApplicationResult<()> {
        let id = self.active.ok_or(ApplicationError::NoActiveNode)?;
        self.rename(id, name)
    }

    /// Renames `id` directly; failures flag the node like [`Session::commit_rename`].
    #[instrument(level = "debug", skip(self))]
    pub fn rename(&mut self, id: NodeId, name: &str) -> ApplicationResult<()> {
        match self.tree.rename(id, name) {
            Ok(()) => {
                self.view.refresh(self.tree.get_flat(), None);
                Ok(())
            }
            Err(e) => {
                warn!(%id, error = %e, "rename rejected");
                if self.tree.get_flat_node_by_id(id).is_some() {
                    self.view.mark_error(id);
                }
                Err(e.into())
            }
        }
    }

    pub fn remove_active(&mut self) -> ApplicationResult<NodeId> {
        let id = self.active.ok_or(ApplicationError::NoActiveNode)?;
        self.remove(id);
        Ok(id)
    }

    pub fn insert(&mut self, name: &str, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = self.tree.insert(name, parent, kind).id();
        self.view.refresh(self.tree.get_flat(), None);
        id
    }

    pub fn remove(&mut self, id: NodeId) {
        self.tree.remove(id);
        self.view.refresh(self.tree.get_flat(), None);
        if self
            .active
            .is_some_and(|active| self.tree.get_flat_node_by_id(active).is_none())
        {
            debug!(%id, "active node removed");
            self.active = None;
        }
    }

    pub fn toggle_collapse(&mut self, id: NodeId) -> ApplicationResult<bool> {
        if self.tree.get_flat_node_by_id(id).is_none() {
            return Err(ApplicationError::UnknownNode(id.to_string()));
        }
        Ok(self.view.toggle_collapse(id))
    }
}
