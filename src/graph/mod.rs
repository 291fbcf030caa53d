//! Navigation graph data structures and operations.
//!
//! This module provides the screen tree (arena storage on petgraph's
//! StableGraph, so ids stay stable across removals) and the navigation policy
//! layered on top of it: screens attach under the active node and the active
//! flag marks the single path the user is currently on.

mod error;
mod navigation;
mod node;
mod screen;
mod tree;

pub use error::NavigationError;
pub use navigation::NavigationGraph;
pub use node::{NodeId, ScreenNode};
pub use screen::Screen;
pub use tree::ScreenTree;
