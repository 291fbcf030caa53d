//! Layout algorithms for the navigation graph view.
//!
//! This module turns a tree snapshot plus label measurements into a position
//! table. Layout is a pure function of its inputs; the renderer only reads the
//! resulting table.

pub mod metrics;
pub mod tree_layout;

pub use metrics::{LabelSize, MonospaceMetrics, TextMetrics};
pub use tree_layout::{LayoutConfig, LayoutInfo, TreeLayout, TreeLayoutEngine};
