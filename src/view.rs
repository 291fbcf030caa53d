//! NavGraphView - one navigation session with its layout and renderer.
//!
//! Keeps the navigation graph, the last computed layout and the pan state
//! together. Every mutation recomputes the layout, so reads always see
//! positions for the current tree.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::graph::{NavigationError, NavigationGraph, NodeId, Screen};
use crate::layout::{LayoutConfig, MonospaceMetrics, TextMetrics, TreeLayout, TreeLayoutEngine};
use crate::render::{Frame, GraphRenderer, RenderStyle};

/// Combined layout and drawing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphViewConfig {
    pub layout: LayoutConfig,
    pub style: RenderStyle,
}

/// Navigation graph plus everything needed to draw it.
pub struct NavGraphView<S> {
    graph: NavigationGraph<S>,
    engine: TreeLayoutEngine,
    renderer: GraphRenderer,
    metrics: Box<dyn TextMetrics>,
    layout: TreeLayout,
}

impl<S> NavGraphView<S> {
    pub fn new(config: GraphViewConfig) -> Self {
        Self::with_metrics(config, Box::new(MonospaceMetrics::default()))
    }

    pub fn with_metrics(config: GraphViewConfig, metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            graph: NavigationGraph::new(),
            engine: TreeLayoutEngine::new(config.layout),
            renderer: GraphRenderer::new(config.style),
            metrics,
            layout: TreeLayout::default(),
        }
    }

    /// Swap the label measurer and lay the tree out again.
    pub fn set_metrics(&mut self, metrics: Box<dyn TextMetrics>) {
        self.metrics = metrics;
        self.relayout();
    }

    pub fn relayout(&mut self) {
        self.layout = self.engine.compute(self.graph.tree(), self.metrics.as_ref());
        debug!("laid out {} nodes", self.layout.len());
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn add_screen(&mut self, screen: S, label: Option<String>) -> Result<NodeId, NavigationError> {
        let id = match label {
            Some(label) => self.graph.add_node_with_label(screen, label)?,
            None => self.graph.add_node(screen)?,
        };
        self.relayout();
        Ok(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, NavigationError> {
        let removed = self.graph.remove_node(id)?;
        self.relayout();
        Ok(removed)
    }

    pub fn navigate_back(&mut self) -> Option<NodeId> {
        let active = self.graph.navigate_back()?;
        self.relayout();
        Some(active)
    }

    pub fn navigate_to(&mut self, id: NodeId) -> Result<(), NavigationError> {
        self.graph.navigate_to(id)?;
        self.relayout();
        Ok(())
    }

    pub fn set_label(&mut self, id: NodeId, label: String) -> Result<(), NavigationError> {
        self.graph.set_label(id, label)?;
        self.relayout();
        Ok(())
    }

    /// Drop every screen and reset the pan.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.renderer.reset_pan();
        self.relayout();
    }

    pub fn graph(&self) -> &NavigationGraph<S> {
        &self.graph
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// `[id, x, y]` triples for every laid-out node, in pre-order.
    pub fn layout_positions(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.layout.len() * 3);
        for (id, info) in self.layout.iter() {
            out.push(id.raw() as f32);
            out.push(info.position.x);
            out.push(info.position.y);
        }
        out
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    pub fn drag(&mut self, delta: Vec2) {
        self.renderer.drag(delta);
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.renderer.pan_offset()
    }

    pub fn reset_pan(&mut self) {
        self.renderer.reset_pan();
    }

    pub fn frame(&self) -> Frame {
        self.renderer.render(self.graph.tree(), &self.layout)
    }

    pub fn frame_immediate(&self, origin: Vec2) -> Frame {
        self.renderer.render_immediate(self.graph.tree(), origin)
    }

    /// The node drawn at a canvas position.
    pub fn node_at(&self, screen: Vec2) -> Option<NodeId> {
        self.renderer.node_at_screen(&self.layout, screen)
    }

    /// Nodes drawn inside a canvas rectangle.
    pub fn nodes_in_rect(&self, corner_a: Vec2, corner_b: Vec2) -> Vec<NodeId> {
        self.renderer
            .nodes_in_screen_rect(&self.layout, corner_a, corner_b)
    }
}

impl<S: Screen> NavGraphView<S> {
    pub fn render_active(&self) -> Option<S::Output> {
        self.graph.render_active()
    }
}

impl<S> Default for NavGraphView<S> {
    fn default() -> Self {
        Self::new(GraphViewConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LabelSize;

    struct Page(&'static str);

    impl Screen for Page {
        type Output = String;

        fn render(&self) -> String {
            format!("<{}>", self.0)
        }
    }

    #[test]
    fn test_layout_follows_mutations() {
        let mut view = NavGraphView::default();
        assert!(view.layout().is_empty());

        let home = view.add_screen(Page("home"), Some("Home".into())).unwrap();
        let list = view.add_screen(Page("list"), None).unwrap();
        assert_eq!(view.layout().len(), 2);
        assert!(view.layout().position(list).is_some());

        view.remove_node(list).unwrap();
        assert_eq!(view.layout().len(), 1);
        assert_eq!(view.layout().position(list), None);
        assert_eq!(view.graph().active_node(), Some(home));
    }

    #[test]
    fn test_render_active_follows_navigation() {
        let mut view = NavGraphView::default();
        assert_eq!(view.render_active(), None);

        view.add_screen(Page("home"), None).unwrap();
        view.add_screen(Page("detail"), None).unwrap();
        assert_eq!(view.render_active().as_deref(), Some("<detail>"));

        view.navigate_back();
        assert_eq!(view.render_active().as_deref(), Some("<home>"));
    }

    #[test]
    fn test_layout_positions_are_triples() {
        let mut view = NavGraphView::new(GraphViewConfig {
            layout: LayoutConfig {
                start_x: 0.0,
                start_y: 0.0,
                ..LayoutConfig::default()
            },
            ..GraphViewConfig::default()
        });
        view.set_metrics(Box::new(|_: &str| LabelSize::new(10.0, 14.0)));
        let root = view.add_screen((), None).unwrap();
        let child = view.add_screen((), None).unwrap();

        assert_eq!(
            view.layout_positions(),
            vec![root.raw() as f32, 0.0, 27.0, child.raw() as f32, 100.0, 27.0]
        );
    }

    #[test]
    fn test_relabel_changes_measurement() {
        let mut view = NavGraphView::default();
        let root = view.add_screen((), Some("ab".into())).unwrap();
        assert_eq!(view.layout().get(root).unwrap().measured_label_width, 14.0);

        view.set_label(root, "abcd".into()).unwrap();
        assert_eq!(view.layout().get(root).unwrap().measured_label_width, 28.0);
        assert_eq!(
            view.set_label(NodeId::new(9), "x".into()),
            Err(NavigationError::UnknownNode(NodeId::new(9)))
        );
    }

    #[test]
    fn test_hit_test_through_pan() {
        let mut view = NavGraphView::default();
        let root = view.add_screen((), None).unwrap();
        let at = view.layout().position(root).unwrap();

        view.drag(Vec2::new(50.0, 50.0));
        assert_eq!(view.node_at(at), None);
        assert_eq!(view.node_at(at + Vec2::new(50.0, 50.0)), Some(root));

        let frame = view.frame();
        assert_eq!(frame.pan, Vec2::new(50.0, 50.0));
        assert_eq!(frame.circles().count(), 1);

        assert_eq!(view.node_at(Vec2::new(f32::NAN, f32::NAN)), None);
        let shifted = at + Vec2::new(50.0, 50.0);
        assert_eq!(
            view.nodes_in_rect(shifted + Vec2::new(-1.0, -1.0), shifted + Vec2::new(1.0, 1.0)),
            vec![root]
        );
        assert!(view.nodes_in_rect(at + Vec2::new(-1.0, -1.0), at + Vec2::new(1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut view = NavGraphView::default();
        view.add_screen((), None).unwrap();
        view.add_screen((), None).unwrap();
        view.drag(Vec2::new(3.0, 4.0));

        view.clear();
        assert!(view.graph().is_empty());
        assert!(view.layout().is_empty());
        assert_eq!(view.pan_offset(), Vec2::ZERO);
        assert!(view.frame().commands.is_empty());

        // Ids restart after a clear.
        assert_eq!(view.add_screen((), None).unwrap(), NodeId::new(0));
    }
}
