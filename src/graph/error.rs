use thiserror::Error;

use super::node::NodeId;

/// Recoverable navigation failures. None of these leave the graph modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The graph has nodes but none of them is active, so there is nowhere
    /// to attach a new screen.
    #[error("navigation graph has no active node")]
    NoActiveNode,
    /// The id does not name a node currently in the graph.
    #[error("{0} is not in the navigation graph")]
    UnknownNode(NodeId),
}
