//! Text measurement for node labels.

use serde::{Deserialize, Serialize};

/// Measured size of a label, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSize {
    pub width: f32,
    pub height: f32,
}

impl LabelSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp negative, NaN and infinite measurements to zero.
    pub fn sanitized(self) -> Self {
        Self {
            width: non_negative(self.width),
            height: non_negative(self.height),
        }
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Measures label text. Supplied by the host, which owns the fonts.
pub trait TextMetrics {
    fn measure(&self, label: &str) -> LabelSize;
}

impl<F> TextMetrics for F
where
    F: Fn(&str) -> LabelSize,
{
    fn measure(&self, label: &str) -> LabelSize {
        self(label)
    }
}

/// Fixed-advance metrics: every character is `char_width` wide and a label is
/// one line of `line_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, label: &str) -> LabelSize {
        if label.is_empty() {
            return LabelSize::default();
        }
        LabelSize::new(
            label.chars().count() as f32 * self.char_width,
            self.line_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized() {
        assert_eq!(LabelSize::new(-3.0, 10.0).sanitized(), LabelSize::new(0.0, 10.0));
        assert_eq!(LabelSize::new(f32::NAN, f32::INFINITY).sanitized(), LabelSize::default());
        assert_eq!(LabelSize::new(4.5, 2.0).sanitized(), LabelSize::new(4.5, 2.0));
    }

    #[test]
    fn test_monospace() {
        let metrics = MonospaceMetrics::default();
        assert_eq!(metrics.measure("Home"), LabelSize::new(28.0, 14.0));
        assert_eq!(metrics.measure(""), LabelSize::default());
        // Counts characters, not bytes.
        assert_eq!(metrics.measure("ДОМ").width, 21.0);
    }

    #[test]
    fn test_closure_metrics() {
        let metrics = |label: &str| LabelSize::new(label.len() as f32, 1.0);
        assert_eq!(metrics.measure("abc"), LabelSize::new(3.0, 1.0));
    }
}
