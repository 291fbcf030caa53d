//! Node type and related structures.
//!
//! Nodes are the screens in the navigation tree. Each node has:
//! - A stable unique identifier (survives removal of other nodes)
//! - A display label
//! - An active flag (at most one node in the tree is active)
//! - The opaque screen payload supplied by the host

use std::fmt;

/// Identifier of a screen in the navigation tree.
///
/// The owning tree hands ids out in attach order and only reuses them after
/// `clear()`. Nodes are never reparented, so among siblings a smaller id was
/// attached earlier; `Ord` therefore gives insertion order. Displayed as
/// `Node(n)`, which is also the default label of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The value handed across the JS boundary.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Node(")?;
        fmt::Display::fmt(&self.0, f)?;
        f.write_str(")")
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.raw()
    }
}

/// A screen attached to the navigation tree.
///
/// Parent and child links are not stored here: they live in the owning
/// [`ScreenTree`](super::ScreenTree), which is the only place a node can be
/// attached. That keeps the parent link non-owning and makes cycles impossible.
#[derive(Debug, Clone)]
pub struct ScreenNode<S> {
    id: NodeId,
    label: String,
    active: bool,
    screen: S,
}

impl<S> ScreenNode<S> {
    pub(crate) fn new(id: NodeId, screen: S, label: Option<String>) -> Self {
        Self {
            id,
            label: label.unwrap_or_else(|| id.to_string()),
            active: false,
            screen,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Whether this node is on the active end of the navigation path.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[inline]
    pub fn screen(&self) -> &S {
        &self.screen
    }

    #[inline]
    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Consume the node, returning its payload.
    pub fn into_screen(self) -> S {
        self.screen
    }
}
