//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over laid-out node
//! centres, used to resolve pointer positions to nodes.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
