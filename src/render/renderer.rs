//! Draw pass for the navigation graph view.
//!
//! The renderer walks the tree pre-order and emits a flat list of draw
//! commands (edge, circle, label per node) for the host canvas to replay.
//! Positions come either from a precomputed [`TreeLayout`] or, for the quick
//! view, from an on-the-fly placement by depth. Rendering is stateless per
//! frame apart from the pan offset.

use log::trace;
use serde::{Deserialize, Serialize};

use super::viewport::Viewport;
use crate::geometry::Vec2;
use crate::graph::{NodeId, ScreenTree};
use crate::layout::TreeLayout;

/// Visual configuration of the graph view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderStyle {
    pub node_radius: f32,
    pub active_color: String,
    pub inactive_color: String,
    pub edge_color: String,
    pub edge_width: f32,
    pub label_color: String,
    pub label_size: f32,
    /// Gap between a circle's edge and the start of its label.
    pub label_gap: f32,
    /// Per-depth x step of the on-the-fly placement.
    pub horizontal_step: f32,
    /// Sibling spread of the on-the-fly placement.
    pub vertical_step: f32,
    /// Deepest level drawn; anything below is skipped.
    pub max_depth: usize,
}

/// Deepest `max_depth` a style may ask for; drawing recurses once per level.
pub const MAX_DEPTH_CEILING: usize = 64;

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_radius: 20.0,
            active_color: "#e53935".to_string(),
            inactive_color: "#1e88e5".to_string(),
            edge_color: "#9e9e9e".to_string(),
            edge_width: 2.0,
            label_color: "#212121".to_string(),
            label_size: 12.0,
            label_gap: 6.0,
            horizontal_step: 100.0,
            vertical_step: 100.0,
            max_depth: 10,
        }
    }
}

impl RenderStyle {
    /// Replace non-finite numbers with defaults, clamp sizes to zero and
    /// `max_depth` to [`MAX_DEPTH_CEILING`].
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let size = |value: f32, fallback: f32| {
            if value.is_finite() { value.max(0.0) } else { fallback }
        };
        let step = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            node_radius: size(self.node_radius, defaults.node_radius),
            edge_width: size(self.edge_width, defaults.edge_width),
            label_size: size(self.label_size, defaults.label_size),
            label_gap: size(self.label_gap, defaults.label_gap),
            horizontal_step: step(self.horizontal_step, defaults.horizontal_step),
            vertical_step: step(self.vertical_step, defaults.vertical_step),
            max_depth: self.max_depth.min(MAX_DEPTH_CEILING),
            ..self
        }
    }
}

/// One draw primitive, in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DrawCommand {
    Line {
        from: Vec2,
        to: Vec2,
        color: String,
        width: f32,
    },
    Circle {
        node: u32,
        center: Vec2,
        radius: f32,
        color: String,
    },
    Text {
        node: u32,
        position: Vec2,
        text: String,
        color: String,
        size: f32,
    },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub pan: Vec2,
    /// True when part of the tree lay below the depth cap.
    pub truncated: bool,
}

impl Frame {
    pub fn circles(&self) -> impl Iterator<Item = (u32, Vec2, &str)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Circle {
                node,
                center,
                color,
                ..
            } => Some((*node, *center, color.as_str())),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }
}

#[derive(Clone, Copy)]
enum Placement<'a> {
    Precomputed(&'a TreeLayout),
    Immediate { origin: Vec2 },
}

/// Renders a screen tree into draw commands and owns the pan state.
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    style: RenderStyle,
    viewport: Viewport,
}

impl GraphRenderer {
    /// Create a renderer; invalid style values are sanitized.
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style: style.sanitized(),
            viewport: Viewport::new(),
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    // =========================================================================
    // Pan
    // =========================================================================

    /// Apply one pointer-drag delta to the pan offset.
    pub fn drag(&mut self, delta: Vec2) {
        self.viewport.drag(delta);
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.viewport.offset()
    }

    pub fn reset_pan(&mut self) {
        self.viewport.reset();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Draw the tree at the positions of a precomputed layout, shifted by the
    /// pan offset. Nodes missing from the layout are skipped with their
    /// subtrees.
    pub fn render<S>(&self, tree: &ScreenTree<S>, layout: &TreeLayout) -> Frame {
        self.draw(tree, Placement::Precomputed(layout))
    }

    /// Draw the tree without a layout pass: each node sits
    /// `depth * horizontal_step` right of `origin`, and each child is shifted
    /// along y by `(index - children / 2) * vertical_step` relative to its
    /// parent's shift.
    pub fn render_immediate<S>(&self, tree: &ScreenTree<S>, origin: Vec2) -> Frame {
        self.draw(tree, Placement::Immediate { origin })
    }

    /// Resolve a canvas position to the node drawn there.
    pub fn node_at_screen(&self, layout: &TreeLayout, screen: Vec2) -> Option<NodeId> {
        layout.node_at(self.viewport.to_world(screen))
    }

    /// Nodes whose centre is drawn inside the canvas rectangle spanned by two
    /// corners, e.g. the visible area.
    pub fn nodes_in_screen_rect(
        &self,
        layout: &TreeLayout,
        corner_a: Vec2,
        corner_b: Vec2,
    ) -> Vec<NodeId> {
        layout.nodes_in_rect(self.viewport.to_world(corner_a), self.viewport.to_world(corner_b))
    }

    fn draw<S>(&self, tree: &ScreenTree<S>, placement: Placement<'_>) -> Frame {
        let pan = self.viewport.offset();
        let mut frame = Frame {
            commands: Vec::with_capacity(tree.len() * 3),
            pan,
            truncated: false,
        };
        if let Some(root) = tree.root() {
            self.draw_node(tree, root, 0, None, pan, placement, &mut frame);
        }
        frame
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_node<S>(
        &self,
        tree: &ScreenTree<S>,
        id: NodeId,
        depth: usize,
        parent_position: Option<Vec2>,
        offset: Vec2,
        placement: Placement<'_>,
        frame: &mut Frame,
    ) {
        if depth > self.style.max_depth {
            trace!("depth cap {} reached at {id}", self.style.max_depth);
            frame.truncated = true;
            return;
        }
        let Some(node) = tree.get(id) else {
            return;
        };

        let position = match placement {
            Placement::Precomputed(layout) => match layout.position(id) {
                Some(position) => position + offset,
                None => return,
            },
            Placement::Immediate { origin } => {
                origin + offset + Vec2::new(depth as f32 * self.style.horizontal_step, 0.0)
            }
        };

        if let Some(parent_position) = parent_position {
            frame.commands.push(DrawCommand::Line {
                from: parent_position,
                to: position,
                color: self.style.edge_color.clone(),
                width: self.style.edge_width,
            });
        }

        let color = if node.is_active() {
            &self.style.active_color
        } else {
            &self.style.inactive_color
        };
        frame.commands.push(DrawCommand::Circle {
            node: id.raw(),
            center: position,
            radius: self.style.node_radius,
            color: color.clone(),
        });
        frame.commands.push(DrawCommand::Text {
            node: id.raw(),
            position: Vec2::new(
                position.x + self.style.node_radius + self.style.label_gap,
                position.y,
            ),
            text: node.label().to_string(),
            color: self.style.label_color.clone(),
            size: self.style.label_size,
        });

        let children = tree.children(id);
        let middle = (children.len() / 2) as f32;
        for (index, child) in children.into_iter().enumerate() {
            let child_offset = match placement {
                Placement::Precomputed(_) => offset,
                Placement::Immediate { .. } => {
                    offset + Vec2::new(0.0, (index as f32 - middle) * self.style.vertical_step)
                }
            };
            self.draw_node(
                tree,
                child,
                depth + 1,
                Some(position),
                child_offset,
                placement,
                frame,
            );
        }
    }
}
