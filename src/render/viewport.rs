//! Pan state for the graph view.

use crate::geometry::Vec2;

/// Translation applied uniformly to every drawn position.
///
/// Drag deltas are accumulated without clamping. The running offset is kept
/// in f64, so undoing a drag restores the previous offset exactly as long as
/// every delta is a multiple of 2^-16 (1/65536 px) and the offset stays
/// within ±2^36 px. Outside that range a tiny offset next to a huge delta is
/// rounded away, e.g. 1e-30 + 1e30 - 1e30 == 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one pointer-drag delta. Non-finite deltas are dropped.
    pub fn drag(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.offset_x += f64::from(delta.x);
        self.offset_y += f64::from(delta.y);
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x as f32, self.offset_y as f32)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Canvas coordinates → layout coordinates.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.offset()
    }
}
