//! Two-pass horizontal tree layout.
//!
//! Lays a screen tree out left to right: the root sits at the start point,
//! every level is `horizontal_spacing` further right, and siblings are stacked
//! top to bottom in insertion order. Vertical space is reserved per subtree,
//! so two subtrees never share a vertical range at the same depth.
//!
//! # Algorithm Overview
//!
//! 1. **Measure pass (bottom-up):** measure each label and aggregate the
//!    vertical space a subtree needs:
//!    `subtree_height = max(label_height + 2 * node_radius,
//!    sum(child subtree heights) + (children - 1) * vertical_spacing)`.
//! 2. **Position pass (top-down):** the root is centred in its own slot at
//!    `(start_x, start_y + subtree_height / 2)`. Each node's children take
//!    consecutive slots starting at the top of the parent's slot, each child
//!    centred in a slot `child_subtree_height` tall, separated by
//!    `vertical_spacing`.
//!
//! Both passes iterate over a pre-order listing of the tree instead of
//! recursing, so depth is unbounded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::metrics::{LabelSize, TextMetrics};
use crate::geometry::Vec2;
use crate::graph::{NodeId, ScreenTree};
use crate::spatial::SpatialIndex;

/// Configuration for the tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Distance between a parent's centre and its children's centres along x.
    pub horizontal_spacing: f32,
    /// Gap between consecutive sibling slots along y.
    pub vertical_spacing: f32,
    /// Radius of the node circle; reserves vertical room around each label.
    pub node_radius: f32,
    /// Root x coordinate.
    pub start_x: f32,
    /// Top of the root's slot.
    pub start_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 100.0,
            vertical_spacing: 24.0,
            node_radius: 20.0,
            start_x: 40.0,
            start_y: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Replace non-finite values with defaults and negative sizes with zero.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let size = |value: f32, fallback: f32| {
            if value.is_finite() { value.max(0.0) } else { fallback }
        };
        let coord = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            horizontal_spacing: size(self.horizontal_spacing, defaults.horizontal_spacing),
            vertical_spacing: size(self.vertical_spacing, defaults.vertical_spacing),
            node_radius: size(self.node_radius, defaults.node_radius),
            start_x: coord(self.start_x, defaults.start_x),
            start_y: coord(self.start_y, defaults.start_y),
        }
    }

    pub fn start(&self) -> Vec2 {
        Vec2::new(self.start_x, self.start_y)
    }
}

/// Per-node result of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub measured_label_width: f32,
    pub measured_label_height: f32,
    /// Vertical space reserved for this node and all of its descendants.
    pub subtree_height: f32,
    /// Node centre.
    pub position: Vec2,
    pub depth: usize,
}

impl LayoutInfo {
    /// Top and bottom of the vertical slot reserved for this subtree.
    pub fn slot(&self) -> (f32, f32) {
        let half = self.subtree_height / 2.0;
        (self.position.y - half, self.position.y + half)
    }
}

/// Positions for every node of a tree snapshot.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    infos: HashMap<NodeId, LayoutInfo>,
    order: Vec<NodeId>,
    spatial: SpatialIndex,
    node_radius: f32,
}

impl TreeLayout {
    pub fn get(&self, id: NodeId) -> Option<&LayoutInfo> {
        self.infos.get(&id)
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.infos.get(&id).map(|info| info.position)
    }

    /// Laid-out nodes in pre-order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Iterate over `(id, info)` in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LayoutInfo)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.infos.get(id).map(|info| (*id, info)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bounding box `(min, max)` of all node circles and their labels.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        if self.is_empty() {
            return None;
        }

        let r = self.node_radius;
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for info in self.infos.values() {
            let p = info.position;
            let half_label = info.measured_label_height / 2.0;
            min.x = min.x.min(p.x - r);
            min.y = min.y.min(p.y - r.max(half_label));
            max.x = max.x.max(p.x + r + info.measured_label_width);
            max.y = max.y.max(p.y + r.max(half_label));
        }
        Some((min, max))
    }

    /// The node whose circle contains `point`, if any. A NaN or infinite
    /// point hits nothing.
    pub fn node_at(&self, point: Vec2) -> Option<NodeId> {
        if !point.is_finite() {
            return None;
        }
        self.spatial.nearest_within(point, self.node_radius)
    }

    /// Nodes whose centre lies inside the rectangle spanned by two corners.
    pub fn nodes_in_rect(&self, corner_a: Vec2, corner_b: Vec2) -> Vec<NodeId> {
        self.spatial.in_rect(corner_a, corner_b)
    }
}

/// The tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct TreeLayoutEngine {
    config: LayoutConfig,
}

impl TreeLayoutEngine {
    /// Create a layout engine; invalid config values are sanitized.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay the tree out from the configured start point.
    pub fn compute<S, M>(&self, tree: &ScreenTree<S>, metrics: &M) -> TreeLayout
    where
        M: TextMetrics + ?Sized,
    {
        self.compute_at(tree, metrics, self.config.start())
    }

    /// Lay the tree out with the root slot's top-left at `start`.
    pub fn compute_at<S, M>(&self, tree: &ScreenTree<S>, metrics: &M, start: Vec2) -> TreeLayout
    where
        M: TextMetrics + ?Sized,
    {
        let config = &self.config;
        let start = if start.is_finite() { start } else { config.start() };
        let order = tree.pre_order();
        let Some(&root) = order.first() else {
            return TreeLayout {
                node_radius: config.node_radius,
                ..TreeLayout::default()
            };
        };

        let children: HashMap<NodeId, Vec<NodeId>> =
            order.iter().map(|&id| (id, tree.children(id))).collect();

        // Measure pass. Reverse pre-order visits every child before its parent.
        let mut labels: HashMap<NodeId, LabelSize> = HashMap::with_capacity(order.len());
        let mut heights: HashMap<NodeId, f32> = HashMap::with_capacity(order.len());
        for &id in order.iter().rev() {
            let label = tree
                .get(id)
                .map(|node| metrics.measure(node.label()).sanitized())
                .unwrap_or_default();
            let own_min_height = label.height + 2.0 * config.node_radius;

            let kids = children.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            let stacked = if kids.is_empty() {
                0.0
            } else {
                kids.iter()
                    .map(|kid| heights.get(kid).copied().unwrap_or(0.0))
                    .sum::<f32>()
                    + (kids.len() - 1) as f32 * config.vertical_spacing
            };

            labels.insert(id, label);
            heights.insert(id, own_min_height.max(stacked));
        }

        // Position pass.
        let mut infos: HashMap<NodeId, LayoutInfo> = HashMap::with_capacity(order.len());
        let mut slot_tops: HashMap<NodeId, f32> = HashMap::with_capacity(order.len());
        let root_height = heights.get(&root).copied().unwrap_or(0.0);
        let root_label = labels.get(&root).copied().unwrap_or_default();
        slot_tops.insert(root, start.y);
        infos.insert(
            root,
            LayoutInfo {
                measured_label_width: root_label.width,
                measured_label_height: root_label.height,
                subtree_height: root_height,
                position: Vec2::new(start.x, start.y + root_height / 2.0),
                depth: 0,
            },
        );

        for &id in &order {
            let (Some(parent), Some(&top)) = (infos.get(&id).copied(), slot_tops.get(&id)) else {
                continue;
            };
            let child_x = parent.position.x + config.horizontal_spacing;
            let mut cursor = top;

            for &kid in children.get(&id).map(Vec::as_slice).unwrap_or(&[]) {
                let height = heights.get(&kid).copied().unwrap_or(0.0);
                let label = labels.get(&kid).copied().unwrap_or_default();
                slot_tops.insert(kid, cursor);
                infos.insert(
                    kid,
                    LayoutInfo {
                        measured_label_width: label.width,
                        measured_label_height: label.height,
                        subtree_height: height,
                        position: Vec2::new(child_x, cursor + height / 2.0),
                        depth: parent.depth + 1,
                    },
                );
                cursor += height + config.vertical_spacing;
            }
        }

        let spatial = SpatialIndex::from_points(order.iter().filter_map(|&id| {
            infos.get(&id).map(|info| (id, info.position))
        }));

        TreeLayout {
            infos,
            order,
            spatial,
            node_radius: config.node_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceMetrics;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    /// Every label measures 10 x 14.
    fn fixed(_: &str) -> LabelSize {
        LabelSize::new(10.0, 14.0)
    }

    fn engine() -> TreeLayoutEngine {
        TreeLayoutEngine::new(LayoutConfig {
            horizontal_spacing: 100.0,
            vertical_spacing: 24.0,
            node_radius: 20.0,
            start_x: 0.0,
            start_y: 0.0,
        })
    }

    #[test]
    fn test_empty_tree() {
        let tree: ScreenTree<()> = ScreenTree::new();
        let layout = engine().compute(&tree, &fixed);
        assert!(layout.is_empty());
        assert_eq!(layout.bounds(), None);
        assert_eq!(layout.node_at(Vec2::ZERO), None);
    }

    #[test]
    fn test_single_node() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();

        let layout = engine().compute(&tree, &fixed);
        let info = layout.get(root).unwrap();
        // label 14 + 2 * radius 20
        assert!((info.subtree_height - 54.0).abs() < EPS);
        assert_eq!(info.position, Vec2::new(0.0, 27.0));
        assert_eq!(info.depth, 0);
        assert_eq!(info.measured_label_width, 10.0);
    }

    #[test]
    fn test_two_children() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();
        let a = tree.add_child(root, (), None).unwrap();
        let b = tree.add_child(root, (), None).unwrap();

        let layout = engine().compute_at(&tree, &fixed, Vec2::new(10.0, 5.0));

        let root_info = layout.get(root).unwrap();
        assert!((root_info.subtree_height - 132.0).abs() < EPS);
        assert_eq!(root_info.position, Vec2::new(10.0, 5.0 + 66.0));

        let a_info = layout.get(a).unwrap();
        let b_info = layout.get(b).unwrap();
        assert_eq!(a_info.position, Vec2::new(110.0, 5.0 + 27.0));
        assert_eq!(b_info.position, Vec2::new(110.0, 5.0 + 54.0 + 24.0 + 27.0));
        assert_eq!(a_info.depth, 1);
        assert_eq!(layout.order(), &[root, a, b]);
    }

    #[test]
    fn test_own_height_wins_over_small_children() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), Some("tall".into())).unwrap();
        let kid = tree.add_child(root, (), None).unwrap();

        let tall = |label: &str| {
            if label == "tall" {
                LabelSize::new(10.0, 200.0)
            } else {
                LabelSize::new(10.0, 10.0)
            }
        };
        let layout = engine().compute(&tree, &tall);

        let root_info = layout.get(root).unwrap();
        assert!((root_info.subtree_height - 240.0).abs() < EPS);
        assert_eq!(root_info.position.y, 120.0);
        // The child is packed at the top of the parent's slot.
        assert_eq!(layout.position(kid), Some(Vec2::new(100.0, 25.0)));
    }

    #[test]
    fn test_invalid_metrics_clamp_to_zero() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();

        let broken = |_: &str| LabelSize::new(f32::NAN, -50.0);
        let layout = engine().compute(&tree, &broken);
        let info = layout.get(root).unwrap();

        assert_eq!(info.measured_label_width, 0.0);
        assert_eq!(info.measured_label_height, 0.0);
        assert!((info.subtree_height - 40.0).abs() < EPS);
        assert!(info.position.is_finite());
    }

    #[test]
    fn test_invalid_config_is_sanitized() {
        let engine = TreeLayoutEngine::new(LayoutConfig {
            horizontal_spacing: f32::NAN,
            vertical_spacing: -10.0,
            node_radius: f32::INFINITY,
            start_x: f32::NEG_INFINITY,
            start_y: 3.0,
        });
        let config = engine.config();
        assert_eq!(config.horizontal_spacing, 100.0);
        assert_eq!(config.vertical_spacing, 0.0);
        assert_eq!(config.node_radius, 20.0);
        assert_eq!(config.start_x, 40.0);
        assert_eq!(config.start_y, 3.0);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut tree = ScreenTree::new();
        let mut last = tree.insert_root((), None).unwrap();
        for _ in 0..20_000 {
            last = tree.add_child(last, (), None).unwrap();
        }

        let layout = engine().compute(&tree, &fixed);
        let info = layout.get(last).unwrap();
        assert_eq!(info.depth, 20_000);
        assert!((info.position.x - 2_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_hit_testing() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();
        let a = tree.add_child(root, (), None).unwrap();

        let layout = engine().compute(&tree, &fixed);
        let a_pos = layout.position(a).unwrap();

        assert_eq!(layout.node_at(a_pos + Vec2::new(5.0, -5.0)), Some(a));
        assert_eq!(layout.node_at(Vec2::new(50.0, 27.0)), None);
        assert_eq!(
            layout.nodes_in_rect(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 100.0)),
            vec![root]
        );
    }

    #[test]
    fn test_hit_testing_non_finite_point() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();
        let a = tree.add_child(root, (), None).unwrap();
        tree.add_child(root, (), None).unwrap();
        tree.add_child(a, (), None).unwrap();

        let layout = engine().compute(&tree, &fixed);
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.node_at(Vec2::new(f32::NAN, 0.0)), None);
        assert_eq!(layout.node_at(Vec2::new(100.0, f32::NAN)), None);
        assert_eq!(layout.node_at(Vec2::new(f32::INFINITY, f32::NEG_INFINITY)), None);
        assert!(layout.nodes_in_rect(Vec2::new(f32::NAN, 0.0), Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_bounds_cover_circles_and_labels() {
        let mut tree = ScreenTree::new();
        let root = tree.insert_root((), None).unwrap();
        tree.add_child(root, (), None).unwrap();

        let layout = engine().compute(&tree, &fixed);
        let (min, max) = layout.bounds().unwrap();
        assert_eq!(min, Vec2::new(-20.0, 7.0));
        assert_eq!(max, Vec2::new(130.0, 47.0));
    }

    fn random_tree(parents: &[usize], labels: &[usize]) -> ScreenTree<()> {
        let mut tree = ScreenTree::new();
        let mut ids = vec![tree.insert_root((), Some("x".repeat(labels[0]))).unwrap()];
        for (i, &pick) in parents.iter().enumerate() {
            let parent = ids[pick % ids.len()];
            let label = "x".repeat(labels[(i + 1) % labels.len()]);
            ids.push(tree.add_child(parent, (), Some(label)).unwrap());
        }
        tree
    }

    proptest! {
        /// Sibling slots never overlap, children sit inside their parent's
        /// slot, and each level is one horizontal step to the right.
        #[test]
        fn prop_layout_non_overlap(
            parents in proptest::collection::vec(any::<usize>(), 0..60),
            labels in proptest::collection::vec(0usize..24, 1..8),
            vertical_spacing in 0.0f32..40.0,
            line_height in 1.0f32..30.0,
        ) {
            let tree = random_tree(&parents, &labels);
            let engine = TreeLayoutEngine::new(LayoutConfig {
                vertical_spacing,
                ..LayoutConfig::default()
            });
            let metrics = MonospaceMetrics { char_width: 6.0, line_height };
            let layout = engine.compute(&tree, &metrics);
            prop_assert_eq!(layout.len(), tree.len());

            for id in tree.pre_order() {
                let parent_info = *layout.get(id).unwrap();
                let (parent_top, parent_bottom) = parent_info.slot();
                let mut previous_bottom: Option<f32> = None;

                for kid in tree.children(id) {
                    let info = layout.get(kid).unwrap();
                    let (top, bottom) = info.slot();
                    prop_assert!((info.position.x - parent_info.position.x - 100.0).abs() < EPS);
                    prop_assert!(top >= parent_top - EPS);
                    prop_assert!(bottom <= parent_bottom + EPS);
                    if let Some(previous_bottom) = previous_bottom {
                        prop_assert!(top >= previous_bottom - EPS,
                            "sibling slots overlap: {} < {}", top, previous_bottom);
                    }
                    previous_bottom = Some(bottom);
                }
            }
        }
    }
}
