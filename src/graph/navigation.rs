//! NavigationGraph - the single-active-path navigation policy.
//!
//! A navigation graph is a history tree of screens. New screens are attached
//! under the deepest active node and become active themselves, so the active
//! node is always the screen the host should show. Going back moves the active
//! flag to the parent without discarding the screen, which is what lets the
//! tree branch: the next screen opened after going back becomes a sibling.
//!
//! Active-ness is stored only on nodes. The graph never caches an "active"
//! pointer; every query walks the tree from the root.

use log::{debug, warn};

use super::error::NavigationError;
use super::node::{NodeId, ScreenNode};
use super::screen::Screen;
use super::tree::ScreenTree;

/// Navigation graph owned by one application session.
#[derive(Debug, Clone)]
pub struct NavigationGraph<S> {
    tree: ScreenTree<S>,
}

impl<S> NavigationGraph<S> {
    pub fn new() -> Self {
        Self {
            tree: ScreenTree::new(),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Attach a screen under the current active node and make it active.
    ///
    /// The first screen becomes the root. If the graph is non-empty but has no
    /// active node the call does nothing and returns
    /// [`NavigationError::NoActiveNode`].
    pub fn add_node(&mut self, screen: S) -> Result<NodeId, NavigationError> {
        self.attach(screen, None)
    }

    /// Like [`add_node`](Self::add_node) with an explicit display label.
    pub fn add_node_with_label(
        &mut self,
        screen: S,
        label: impl Into<String>,
    ) -> Result<NodeId, NavigationError> {
        self.attach(screen, Some(label.into()))
    }

    fn attach(&mut self, screen: S, label: Option<String>) -> Result<NodeId, NavigationError> {
        let Some(root) = self.tree.root() else {
            let id = self
                .tree
                .insert_root(screen, label)
                .ok_or(NavigationError::NoActiveNode)?;
            self.tree.set_active(id, true);
            debug!("{id} attached as root");
            return Ok(id);
        };

        let Some(active) = self.tree.find_last_active_node(root) else {
            warn!("add_node ignored: {} nodes but none active", self.tree.len());
            return Err(NavigationError::NoActiveNode);
        };

        let id = self
            .tree
            .add_child(active, screen, label)
            .ok_or(NavigationError::UnknownNode(active))?;
        debug!("{id} attached under {active}");
        Ok(id)
    }

    /// Remove a node and everything below it.
    ///
    /// If the active node was inside the removed subtree, the removed node's
    /// parent (the nearest surviving ancestor) becomes active. Removing the
    /// root empties the graph. Returns the ids that were removed, in pre-order.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, NavigationError> {
        if !self.tree.contains(id) {
            return Err(NavigationError::UnknownNode(id));
        }

        let removed = match self.tree.parent(id) {
            Some(parent) => {
                let held_active = self.tree.find_last_active_node(id).is_some();
                let removed = self
                    .tree
                    .remove_child(parent, id)
                    .ok_or(NavigationError::UnknownNode(id))?;
                if held_active {
                    self.activate_only(parent);
                    debug!("{id} removed, {parent} reactivated");
                } else if !self.has_active_node() {
                    warn!("{id} removed from a graph with no active node");
                }
                removed
            }
            None => {
                debug!("root {id} removed, graph is empty");
                self.tree.remove_root().unwrap_or_default()
            }
        };

        Ok(removed.iter().map(ScreenNode::id).collect())
    }

    /// Move the active flag from the active node to its parent.
    ///
    /// The screen stays in the graph. Returns the newly active node, or None
    /// when already at the root or when nothing is active.
    pub fn navigate_back(&mut self) -> Option<NodeId> {
        let active = self.active_node()?;
        let parent = self.tree.parent(active)?;
        self.activate_only(parent);
        debug!("back from {active} to {parent}");
        Some(parent)
    }

    /// Make an existing node the single active node.
    pub fn navigate_to(&mut self, id: NodeId) -> Result<(), NavigationError> {
        if !self.tree.contains(id) {
            return Err(NavigationError::UnknownNode(id));
        }
        self.activate_only(id);
        debug!("navigated to {id}");
        Ok(())
    }

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<(), NavigationError> {
        let node = self.tree.get_mut(id).ok_or(NavigationError::UnknownNode(id))?;
        node.set_label(label);
        Ok(())
    }

    /// Drop every screen.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    fn activate_only(&mut self, id: NodeId) {
        for active in self.tree.active_nodes() {
            self.tree.set_active(active, false);
        }
        self.tree.set_active(id, true);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn root_node(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// The deepest active node, i.e. the screen the host should show.
    pub fn active_node(&self) -> Option<NodeId> {
        self.tree
            .root()
            .and_then(|root| self.tree.find_last_active_node(root))
    }

    /// Whether any node is active. False for an empty graph, and false for a
    /// non-empty graph that has lost its active node.
    pub fn has_active_node(&self) -> bool {
        self.active_node().is_some()
    }

    /// Ids from the root down to the active node.
    pub fn active_path(&self) -> Vec<NodeId> {
        self.active_node()
            .map(|active| self.tree.path_from_root(active))
            .unwrap_or_default()
    }

    pub fn node(&self, id: NodeId) -> Option<&ScreenNode<S>> {
        self.tree.get(id)
    }

    pub fn screen(&self, id: NodeId) -> Option<&S> {
        self.tree.get(id).map(ScreenNode::screen)
    }

    pub fn screen_mut(&mut self, id: NodeId) -> Option<&mut S> {
        self.tree.get_mut(id).map(ScreenNode::screen_mut)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id).map(ScreenNode::label)
    }

    /// Read access to the underlying tree, for layout and drawing.
    pub fn tree(&self) -> &ScreenTree<S> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<S: Screen> NavigationGraph<S> {
    /// Render the active screen. None when nothing is active.
    pub fn render_active(&self) -> Option<S::Output> {
        self.active_node()
            .and_then(|id| self.screen(id))
            .map(Screen::render)
    }
}

impl<S> Default for NavigationGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}
