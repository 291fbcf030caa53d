//! Nav Graph - WASM Module
//!
//! Screen navigation history as a tree. Every screen the user opens is
//! attached under the active screen and becomes active itself; going back
//! moves the active flag to the parent, so the next screen branches. The tree
//! is laid out left to right and drawn as circles, labels and edges on a
//! pannable canvas.
//!
//! # Architecture
//!
//! - `graph`: Screen tree on petgraph's StableGraph and the navigation policy
//! - `layout`: Two-pass tree layout (measure subtree heights, then position)
//! - `render`: Draw command generation and pan state
//! - `spatial`: R-tree spatial indexing for hit testing
//! - `view`: One session: graph, layout and renderer kept in sync

use js_sys::{Float32Array, Function, Reflect};
use log::{Level, info, warn};
use wasm_bindgen::prelude::*;

pub mod geometry;
pub mod graph;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod view;

use geometry::Vec2;
use graph::{NavigationError, NodeId, Screen};
use layout::{LabelSize, TextMetrics};
use view::{GraphViewConfig, NavGraphView};

/// Initialize logging and the panic hook.
#[wasm_bindgen(start)]
pub fn init() {
    let _ = console_log::init_with_level(Level::Debug);
    console_error_panic_hook::set_once();
    info!("nav-graph initialized");
}

/// A screen supplied by JavaScript: any object with a `render()` method.
#[derive(Debug, Clone)]
pub struct JsScreen(JsValue);

impl JsScreen {
    pub fn new(value: JsValue) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &JsValue {
        &self.0
    }
}

impl Screen for JsScreen {
    type Output = Result<JsValue, JsValue>;

    fn render(&self) -> Self::Output {
        let render = Reflect::get(&self.0, &JsValue::from_str("render"))?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str("screen has no render() method"))?;
        render.call0(&self.0)
    }
}

/// Label measurement delegated to a JS `measure(label) -> [width, height]`
/// function. Anything unusable measures as zero.
#[derive(Debug, Clone)]
pub struct JsTextMetrics(Function);

impl TextMetrics for JsTextMetrics {
    fn measure(&self, label: &str) -> LabelSize {
        let result = match self.0.call1(&JsValue::NULL, &JsValue::from_str(label)) {
            Ok(result) => result,
            Err(err) => {
                warn!("text measurer threw for {label:?}: {err:?}");
                return LabelSize::default();
            }
        };
        match serde_wasm_bindgen::from_value::<(f32, f32)>(result) {
            Ok((width, height)) => LabelSize::new(width, height),
            Err(err) => {
                warn!("text measurer returned an unusable size for {label:?}: {err}");
                LabelSize::default()
            }
        }
    }
}

fn nav_error(err: NavigationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Main entry point for the navigation graph.
///
/// Wraps one navigation session and exposes it to JavaScript. Node ids are
/// plain `u32`s on the JS side.
#[wasm_bindgen(js_name = NavGraph)]
pub struct NavGraphWasm {
    view: NavGraphView<JsScreen>,
}

impl Default for NavGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = NavGraph)]
impl NavGraphWasm {
    /// Create an empty graph with the default layout and style.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            view: NavGraphView::default(),
        }
    }

    /// Create an empty graph from a partial `{ layout, style }` object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<NavGraphWasm, JsValue> {
        let config: GraphViewConfig = if config.is_undefined() || config.is_null() {
            GraphViewConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            view: NavGraphView::new(config),
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Attach a screen under the active node and make it active.
    ///
    /// Returns the new node ID. Fails when the graph has nodes but none of
    /// them is active.
    #[wasm_bindgen(js_name = addScreen)]
    pub fn add_screen(&mut self, screen: JsValue, label: Option<String>) -> Result<u32, JsValue> {
        self.view
            .add_screen(JsScreen::new(screen), label)
            .map(NodeId::raw)
            .map_err(nav_error)
    }

    /// Remove a node and its subtree. Returns the removed IDs.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: u32) -> Result<Vec<u32>, JsValue> {
        self.view
            .remove_node(NodeId::new(id))
            .map(|removed| removed.into_iter().map(NodeId::raw).collect())
            .map_err(nav_error)
    }

    /// Move the active flag to the parent of the active node.
    #[wasm_bindgen(js_name = navigateBack)]
    pub fn navigate_back(&mut self) -> Option<u32> {
        self.view.navigate_back().map(NodeId::raw)
    }

    #[wasm_bindgen(js_name = navigateTo)]
    pub fn navigate_to(&mut self, id: u32) -> Result<(), JsValue> {
        self.view.navigate_to(NodeId::new(id)).map_err(nav_error)
    }

    #[wasm_bindgen(js_name = setLabel)]
    pub fn set_label(&mut self, id: u32, label: String) -> Result<(), JsValue> {
        self.view.set_label(NodeId::new(id), label).map_err(nav_error)
    }

    /// Remove all screens and reset the pan.
    pub fn clear(&mut self) {
        self.view.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[wasm_bindgen(js_name = rootNode)]
    pub fn root_node(&self) -> Option<u32> {
        self.view.graph().root_node().map(NodeId::raw)
    }

    #[wasm_bindgen(js_name = activeNode)]
    pub fn active_node(&self) -> Option<u32> {
        self.view.graph().active_node().map(NodeId::raw)
    }

    #[wasm_bindgen(js_name = hasActiveNode)]
    pub fn has_active_node(&self) -> bool {
        self.view.graph().has_active_node()
    }

    /// IDs from the root to the active node.
    #[wasm_bindgen(js_name = activePath)]
    pub fn active_path(&self) -> Vec<u32> {
        self.view
            .graph()
            .active_path()
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.view.graph().len() as u32
    }

    pub fn label(&self, id: u32) -> Option<String> {
        self.view.graph().label(NodeId::new(id)).map(str::to_string)
    }

    /// The JS screen object stored for a node.
    pub fn screen(&self, id: u32) -> Option<JsValue> {
        self.view
            .graph()
            .screen(NodeId::new(id))
            .map(|screen| screen.value().clone())
    }

    /// Call `render()` on the active screen. `undefined` when nothing is
    /// active.
    #[wasm_bindgen(js_name = renderActive)]
    pub fn render_active(&self) -> Result<JsValue, JsValue> {
        self.view.render_active().unwrap_or(Ok(JsValue::UNDEFINED))
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Use a JS `measure(label) -> [width, height]` function for labels.
    #[wasm_bindgen(js_name = setTextMeasurer)]
    pub fn set_text_measurer(&mut self, measure: Function) {
        self.view.set_metrics(Box::new(JsTextMetrics(measure)));
    }

    /// Recompute positions, e.g. after fonts finish loading.
    pub fn relayout(&mut self) {
        self.view.relayout();
    }

    /// Laid-out positions as `[id0, x0, y0, id1, x1, y1, ...]`, pre-order.
    #[wasm_bindgen(js_name = layoutPositions)]
    pub fn layout_positions(&self) -> Float32Array {
        Float32Array::from(&self.view.layout_positions()[..])
    }

    /// Content bounds as `[minX, minY, maxX, maxY]`, empty when there are
    /// no nodes.
    #[wasm_bindgen(js_name = layoutBounds)]
    pub fn layout_bounds(&self) -> Float32Array {
        match self.view.layout().bounds() {
            Some((min, max)) => Float32Array::from(&[min.x, min.y, max.x, max.y][..]),
            None => Float32Array::new_with_length(0),
        }
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Apply one pointer-drag delta to the pan offset.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.view.drag(Vec2::new(dx, dy));
    }

    /// Current pan offset as `[x, y]`.
    #[wasm_bindgen(js_name = panOffset)]
    pub fn pan_offset(&self) -> Float32Array {
        let offset = self.view.pan_offset();
        Float32Array::from(&[offset.x, offset.y][..])
    }

    #[wasm_bindgen(js_name = resetPan)]
    pub fn reset_pan(&mut self) {
        self.view.reset_pan();
    }

    /// Draw commands for the laid-out tree: `{ commands, pan, truncated }`.
    #[wasm_bindgen(js_name = drawCommands)]
    pub fn draw_commands(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.view.frame())?)
    }

    /// Draw commands placed by depth from `(x, y)`, without the layout pass.
    #[wasm_bindgen(js_name = drawCommandsImmediate)]
    pub fn draw_commands_immediate(&self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(
            &self.view.frame_immediate(Vec2::new(x, y)),
        )?)
    }

    /// The node drawn at canvas position `(x, y)`, if any.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<u32> {
        self.view.node_at(Vec2::new(x, y)).map(NodeId::raw)
    }

    /// IDs of nodes whose centre is drawn inside the canvas rectangle
    /// `(x0, y0)`-`(x1, y1)`.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<u32> {
        self.view
            .nodes_in_rect(Vec2::new(x0, y0), Vec2::new(x1, y1))
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }
}
