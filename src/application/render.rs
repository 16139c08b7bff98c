//! Text rendering of trees via `termtree`.

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult, Mode, Session, ViewNode};
use crate::domain::{FlatTree, NodeId, NodeKind, NodeView, Tree};

const EMPTY_TREE: &str = "Tree is empty";

pub trait TreeRender {
    fn to_tree_string(&self) -> TermTree<String>;
}

/// Canonical tree, walked through the owned child links.
impl TreeRender for Tree {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        fn build(node: NodeView<'_>) -> TermTree<String> {
            let label = match node.kind() {
                NodeKind::Directory => format!("{}/ [{}]", node.name(), node.id()),
                NodeKind::File => format!("{} [{}]", node.name(), node.id()),
            };
            TermTree::new(label).with_leaves(node.children().map(build))
        }

        match self.get_root() {
            Some(root) => build(root),
            None => TermTree::new(EMPTY_TREE.to_string()),
        }
    }
}

/// Session view, walked through the flat snapshot's child references.
///
/// References missing from the snapshot are skipped and collapsed
/// directories hide their children.
impl TreeRender for Session {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        fn build(session: &Session, flat: &FlatTree, id: NodeId) -> Option<TermTree<String>> {
            let node = session.view().merge(flat, id)?;
            let mut tree = TermTree::new(label(&node));
            if !node.state.is_collapsed {
                for child in &node.node.children {
                    if let Some(subtree) = build(session, flat, child.id) {
                        tree.push(subtree);
                    }
                }
            }
            Some(tree)
        }

        let flat = self.tree().get_flat();
        self.tree()
            .get_root()
            .and_then(|root| build(self, flat, root.id()))
            .unwrap_or_else(|| TermTree::new(EMPTY_TREE.to_string()))
    }
}

/// One line of the session view: chevron for directories, a pencil while
/// editing, `!` after a rejected rename.
pub fn label(node: &ViewNode<'_>) -> String {
    let name = if node.node.name.is_empty() {
        "<unnamed>"
    } else {
        node.node.name.as_str()
    };
    let mut label = match (node.node.kind, node.state.is_collapsed) {
        (NodeKind::Directory, true) => format!("▸ {}/", name),
        (NodeKind::Directory, false) => format!("▾ {}/", name),
        (NodeKind::File, _) => name.to_string(),
    };
    if node.state.mode == Mode::Write {
        label = format!("✎ {}", label);
    }
    if node.state.is_error {
        label.push_str(" !");
    }
    format!("{} [{}]", label, node.node.id)
}

/// Flat mapping as TOML, one table per node id.
pub fn export_flat(flat: &FlatTree) -> ApplicationResult<String> {
    toml::to_string_pretty(flat).map_err(|e| ApplicationError::Export {
        message: e.to_string(),
    })
}
