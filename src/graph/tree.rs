//! ScreenTree - arena-backed tree of screens.
//!
//! The tree stores its topology in petgraph's StableGraph (parent → child
//! edges) so node indices stay valid while other nodes are removed, and keeps
//! a map from stable NodeIds to those indices. Every node except the root has
//! exactly one incoming edge, and the only way to create an edge is
//! [`ScreenTree::add_child`], which always attaches a brand new node. A node
//! can therefore never become its own ancestor.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::node::{NodeId, ScreenNode};

/// The screen tree.
///
/// This struct manages:
/// - Tree topology via petgraph
/// - The root node, if any
/// - ID mapping between stable IDs and internal indices
#[derive(Debug, Clone)]
pub struct ScreenTree<S> {
    /// The underlying graph structure. Edges point from parent to child.
    graph: StableGraph<ScreenNode<S>, (), Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// The root node, None while the tree is empty
    root: Option<NodeId>,

    /// Next node ID to assign
    next_node_id: u32,
}

impl<S> ScreenTree<S> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            root: None,
            next_node_id: 0,
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Create the root node.
    ///
    /// Returns None if the tree already has a root. The root starts inactive;
    /// activation policy belongs to the caller.
    pub fn insert_root(&mut self, screen: S, label: Option<String>) -> Option<NodeId> {
        if self.root.is_some() {
            return None;
        }
        let (id, _) = self.allocate(screen, label);
        self.root = Some(id);
        Some(id)
    }

    /// Append a new child to `parent`.
    ///
    /// Attaching shifts activation to the new leaf: the parent and the
    /// parent's own parent are deactivated and the child is activated.
    /// Returns None if `parent` is not in the tree.
    pub fn add_child(&mut self, parent: NodeId, screen: S, label: Option<String>) -> Option<NodeId> {
        let parent_index = *self.node_id_to_index.get(&parent)?;
        let grandparent_index = self.parent_index(parent_index);

        let (id, index) = self.allocate(screen, label);
        self.graph.add_edge(parent_index, index, ());

        self.set_active_at(parent_index, false);
        if let Some(grandparent_index) = grandparent_index {
            self.set_active_at(grandparent_index, false);
        }
        self.set_active_at(index, true);

        Some(id)
    }

    /// Detach `child` from `parent`'s children.
    ///
    /// Only a direct child is matched. The detached subtree is no longer
    /// reachable from the root, so it is dropped from the arena and its nodes
    /// are handed back in pre-order. Returns None if `child` is not a direct
    /// child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Option<Vec<ScreenNode<S>>> {
        let parent_index = *self.node_id_to_index.get(&parent)?;
        let child_index = *self.node_id_to_index.get(&child)?;
        self.graph.find_edge(parent_index, child_index)?;

        Some(self.drop_subtree(child_index))
    }

    /// Drop the whole tree, returning its nodes in pre-order.
    pub fn remove_root(&mut self) -> Option<Vec<ScreenNode<S>>> {
        let root = self.root?;
        let root_index = *self.node_id_to_index.get(&root)?;
        let removed = self.drop_subtree(root_index);
        self.root = None;
        Some(removed)
    }

    /// Find the last active node reached by a depth-first walk from `from`.
    ///
    /// The walk pops a node, records it if active, then pushes all of its
    /// children in insertion order, so later siblings are visited first and
    /// deeper nodes after their ancestors. With a single active node this is
    /// simply that node. Returns None when nothing in the subtree is active.
    pub fn find_last_active_node(&self, from: NodeId) -> Option<NodeId> {
        let start = *self.node_id_to_index.get(&from)?;
        let mut stack = vec![start];
        let mut last_active = None;

        while let Some(index) = stack.pop() {
            if let Some(node) = self.graph.node_weight(index) {
                if node.is_active() {
                    last_active = Some(node.id());
                }
            }
            stack.extend(self.child_indices(index));
        }

        last_active
    }

    /// Set the active flag of a node.
    ///
    /// Returns false if the node is not in the tree.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> bool {
        match self.node_id_to_index.get(&id) {
            Some(&index) => {
                self.set_active_at(index, active);
                true
            }
            None => false,
        }
    }

    /// Clear all nodes, resetting the tree to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.root = None;
        self.next_node_id = 0;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&ScreenNode<S>> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ScreenNode<S>> {
        let index = *self.node_id_to_index.get(&id)?;
        self.graph.node_weight_mut(index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the parent of a node. None for the root and for unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let index = *self.node_id_to_index.get(&id)?;
        self.parent_index(index).and_then(|p| self.id_at(p))
    }

    /// Get the children of a node in insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node_id_to_index
            .get(&id)
            .map(|&index| {
                self.child_indices(index)
                    .into_iter()
                    .filter_map(|c| self.id_at(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Depth of a node (root = 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut index = *self.node_id_to_index.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = self.parent_index(index) {
            depth += 1;
            index = parent;
        }
        Some(depth)
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&start) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            if let Some(node_id) = self.id_at(index) {
                path.push(node_id);
            }
            current = self.parent_index(index);
        }
        path.reverse();
        path
    }

    /// Pre-order ids of the subtree rooted at `id`, children in insertion order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&start) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            if let Some(node_id) = self.id_at(index) {
                order.push(node_id);
            }
            stack.extend(self.child_indices(index).into_iter().rev());
        }
        order
    }

    /// Pre-order ids of the whole tree.
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.root.map(|root| self.subtree(root)).unwrap_or_default()
    }

    /// All nodes whose active flag is set, in no particular order.
    pub fn active_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_weights()
            .filter(|node| node.is_active())
            .map(|node| node.id())
            .collect()
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the number of parent → child links.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn allocate(&mut self, screen: S, label: Option<String>) -> (NodeId, NodeIndex) {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(ScreenNode::new(id, screen, label));
        self.node_id_to_index.insert(id, index);
        (id, index)
    }

    fn id_at(&self, index: NodeIndex) -> Option<NodeId> {
        self.graph.node_weight(index).map(|node| node.id())
    }

    fn parent_index(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .next()
    }

    /// Child indices in insertion order. Ids are handed out at attach time
    /// and nodes are never reparented, so id order is insertion order.
    fn child_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<(NodeId, NodeIndex)> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|c| self.id_at(c).map(|id| (id, c)))
            .collect();
        children.sort_unstable_by_key(|&(id, _)| id);
        children.into_iter().map(|(_, c)| c).collect()
    }

    fn set_active_at(&mut self, index: NodeIndex, active: bool) {
        if let Some(node) = self.graph.node_weight_mut(index) {
            node.set_active(active);
        }
    }

    fn drop_subtree(&mut self, start: NodeIndex) -> Vec<ScreenNode<S>> {
        let mut doomed = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(index) = dfs.next(&self.graph) {
            doomed.push(index);
        }

        let mut removed = Vec::with_capacity(doomed.len());
        for index in doomed {
            if let Some(node) = self.graph.remove_node(index) {
                self.node_id_to_index.remove(&node.id());
                removed.push(node);
            }
        }
        removed
    }
}

impl<S> Default for ScreenTree<S> {
    fn default() -> Self {
        Self::new()
    }
}
