//! The drawing backend contract.
//!
//! Arbor never rasterizes anything itself. Widgets draw through a [`Canvas`], an
//! immediate-mode surface supplied by the host, and measure text through a [`TextMeasurer`].

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::geom::{Point, Rect, Size};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    /// Paint color.
    pub color: Color,
    /// Stroke width. `None` fills the shape.
    pub stroke: Option<f32>,
    /// Blur radius, zero for none.
    pub blur: f32,
}

impl Paint {
    /// A solid fill.
    pub const fn fill(color: Color) -> Self {
        Self {
            color,
            stroke: None,
            blur: 0.0,
        }
    }

    /// An outline of the given width.
    pub const fn stroke(color: Color, width: f32) -> Self {
        Self {
            color,
            stroke: Some(width),
            blur: 0.0,
        }
    }
}

/// A font request. Typeface resolution belongs to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Family name.
    pub family: String,
    /// Size in device-independent pixels.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans".into(),
            size: 14.0,
            bold: false,
        }
    }
}

impl Font {
    /// The default family at a given size.
    pub fn sized(size: f32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// An immediate-mode drawing surface.
///
/// Coordinates are relative to the current transform. The core translates the canvas to each
/// node's top-left corner before calling `Widget::draw`, so widgets draw in local space.
pub trait Canvas {
    /// Push the current transform and clip.
    fn save(&mut self);
    /// Pop the transform and clip pushed by the matching `save`.
    fn restore(&mut self);
    /// Translate the current transform.
    fn translate(&mut self, by: Point);
    /// Intersect the clip with a rectangle.
    fn clip_rect(&mut self, rect: Rect);
    /// Draw a rectangle.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    /// Draw a rectangle with rounded corners.
    fn draw_round_rect(&mut self, rect: Rect, radius: f32, paint: &Paint);
    /// Draw a circle.
    fn draw_circle(&mut self, center: Point, radius: f32, paint: &Paint);
    /// Draw a single run of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, font: &Font, paint: &Paint);
}

/// Text measurement supplied by the host's shaping engine.
pub trait TextMeasurer: Send {
    /// The bounding box of `text` laid out on one line per `\n`.
    fn measure(&self, text: &str, font: &Font) -> Size;
}

/// A measurer that treats every column as `0.6 em` wide and every line as `1.2 em` tall.
///
/// Column counts come from `unicode-width`, so wide CJK characters take two columns and
/// combining marks take none. Good enough for tests and for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasurer;

impl MonospaceMeasurer {
    /// Advance of one column as a fraction of the font size.
    pub const ADVANCE: f32 = 0.6;
    /// Line height as a fraction of the font size.
    pub const LINE_HEIGHT: f32 = 1.2;
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font: &Font) -> Size {
        let mut lines = 0usize;
        let mut cols = 0usize;
        for line in text.split('\n') {
            lines += 1;
            cols = cols.max(line.width());
        }
        Size::new(
            cols as f32 * font.size * Self::ADVANCE,
            lines as f32 * font.size * Self::LINE_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_metrics() {
        let m = MonospaceMeasurer;
        let font = Font::sized(10.0);
        assert_eq!(m.measure("abcd", &font), Size::new(24.0, 12.0));
        assert_eq!(m.measure("ab\nabcdef", &font), Size::new(36.0, 24.0));
        assert_eq!(m.measure("", &font), Size::new(0.0, 12.0));
        // Wide characters take two columns.
        assert_eq!(m.measure("日本", &font).w, 24.0);
    }
}
