//! R-tree based spatial index using the rstar crate.
//!
//! Indexes laid-out node centres so pointer input can be resolved to a node in
//! O(log n):
//! - Nearest node within a hit radius
//! - Nodes inside a rectangle (e.g. the visible viewport)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geometry::Vec2;
use crate::graph::NodeId;

/// A node centre in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    pub id: NodeId,
    pub center: Vec2,
}

impl NodePoint {
    pub fn new(id: NodeId, center: Vec2) -> Self {
        Self { id, center }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.center.x, self.center.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.center.x - point[0];
        let dy = self.center.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over node centres.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index; faster than inserting one point at a time.
    pub fn from_points(points: impl IntoIterator<Item = (NodeId, Vec2)>) -> Self {
        let points = points
            .into_iter()
            .filter(|(_, center)| center.is_finite())
            .map(|(id, center)| NodePoint::new(id, center))
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Find the node closest to a point, if it lies within `max_distance`.
    ///
    /// Non-finite points match nothing.
    pub fn nearest_within(&self, point: Vec2, max_distance: f32) -> Option<NodeId> {
        if !point.is_finite() {
            return None;
        }
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[point.x, point.y])
            .filter(|p| p.distance_2(&[point.x, point.y]) <= max_distance_sq)
            .map(|p| p.id)
    }

    /// Find all nodes whose centre lies in the rectangle spanned by two corners.
    pub fn in_rect(&self, corner_a: Vec2, corner_b: Vec2) -> Vec<NodeId> {
        if !corner_a.is_finite() || !corner_b.is_finite() {
            return Vec::new();
        }
        let envelope = AABB::from_corners([corner_a.x, corner_a.y], [corner_b.x, corner_b.y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|p| p.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
