//! Drawing of the navigation graph view.
//!
//! The renderer produces a flat list of draw commands per frame; the host
//! replays them on its canvas. Pan state lives in the [`Viewport`].

mod renderer;
mod viewport;

pub use renderer::{DrawCommand, Frame, GraphRenderer, RenderStyle};
pub use viewport::Viewport;
