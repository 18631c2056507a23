//! Per-node layout properties.
//!
//! A [`Layout`] is plain data cached on each node. The core applies margin, padding, size
//! requests and clamps centrally, so widgets only ever deal with their content box.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geom::Thickness;

/// Alignment of a view within the slack space of the slot its parent grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Align {
    /// Pin to the leading edge at natural size.
    Start,
    /// Center at natural size.
    Center,
    /// Pin to the trailing edge at natural size.
    End,
    /// Stretch to the full slot. With an explicit size request the view is centered instead.
    #[default]
    Fill,
}

/// Flow direction for linear panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Children flow top to bottom.
    #[default]
    Vertical,
    /// Children flow left to right.
    Horizontal,
}

/// Layout properties for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    /// Space outside the view's box, applied by the parent's slot.
    pub margin: Thickness,
    /// Space between the view's box and its content.
    pub padding: Thickness,
    /// Horizontal alignment within the slot.
    pub horizontal: Align,
    /// Vertical alignment within the slot.
    pub vertical: Align,
    /// Explicit box width. Overrides the measured width.
    pub width: Option<f32>,
    /// Explicit box height. Overrides the measured height.
    pub height: Option<f32>,
    /// Minimum box width.
    pub min_width: Option<f32>,
    /// Maximum box width.
    pub max_width: Option<f32>,
    /// Minimum box height.
    pub min_height: Option<f32>,
    /// Maximum box height.
    pub max_height: Option<f32>,
    /// Ask linear panels for the remainder of the flow axis instead of the natural size.
    pub expand: bool,
    /// Clip drawing of this node and its children to the node's box.
    pub clip: bool,
}

impl Layout {
    /// Default layout: fill both axes, no insets, no requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the margin.
    pub fn margin(mut self, margin: Thickness) -> Self {
        self.margin = margin;
        self
    }

    /// Set the padding.
    pub fn padding(mut self, padding: Thickness) -> Self {
        self.padding = padding;
        self
    }

    /// Set both alignments.
    pub fn align(mut self, horizontal: Align, vertical: Align) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    /// Set the horizontal alignment.
    pub fn align_horizontal(mut self, align: Align) -> Self {
        self.horizontal = align;
        self
    }

    /// Set the vertical alignment.
    pub fn align_vertical(mut self, align: Align) -> Self {
        self.vertical = align;
        self
    }

    /// Request an explicit width.
    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Request an explicit height.
    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Request an explicit width and height.
    pub fn size(self, width: f32, height: f32) -> Self {
        self.width(width).height(height)
    }

    /// Clamp the box width.
    pub fn width_range(mut self, min: Option<f32>, max: Option<f32>) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    /// Clamp the box height.
    pub fn height_range(mut self, min: Option<f32>, max: Option<f32>) -> Self {
        self.min_height = min;
        self.max_height = max;
        self
    }

    /// Take the remainder of a linear panel's flow axis.
    pub fn expand(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Clip drawing to the node's box.
    pub fn clip(mut self) -> Self {
        self.clip = true;
        self
    }

    /// The width request if layout can honor it. Non-finite or negative requests count as
    /// unset.
    pub fn requested_width(&self) -> Option<f32> {
        usable(self.width, "width")
    }

    /// The height request if layout can honor it. Non-finite or negative requests count as
    /// unset.
    pub fn requested_height(&self) -> Option<f32> {
        usable(self.height, "height")
    }

    /// The usable maximum width.
    pub fn width_cap(&self) -> Option<f32> {
        usable(self.max_width, "max_width")
    }

    /// The usable maximum height.
    pub fn height_cap(&self) -> Option<f32> {
        usable(self.max_height, "max_height")
    }

    /// Clamp a box width to `min_width..=max_width`. A minimum above the maximum wins.
    pub fn clamp_width(&self, w: f32) -> f32 {
        clamp_axis(w, self.min_width, self.max_width)
    }

    /// Clamp a box height to `min_height..=max_height`. A minimum above the maximum wins.
    pub fn clamp_height(&self, h: f32) -> f32 {
        clamp_axis(h, self.min_height, self.max_height)
    }
}

/// Keep a request or bound only if it is finite and non-negative.
fn usable(value: Option<f32>, field: &'static str) -> Option<f32> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(v) => {
            debug!(field, value = v, "unusable size request ignored");
            None
        }
        None => None,
    }
}

/// Clamp a value to optional bounds, applying the maximum first so the minimum wins.
/// Unusable bounds are ignored.
fn clamp_axis(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut v = value;
    if let Some(max) = usable(max, "max") {
        v = v.min(max);
    }
    if let Some(min) = usable(min, "min") {
        v = v.max(min);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_axis(5.0, None, None), 5.0);
        assert_eq!(clamp_axis(5.0, Some(8.0), None), 8.0);
        assert_eq!(clamp_axis(5.0, None, Some(3.0)), 3.0);
        assert_eq!(clamp_axis(5.0, Some(8.0), Some(3.0)), 8.0);
        assert_eq!(clamp_axis(f32::INFINITY, None, Some(3.0)), 3.0);
        assert_eq!(clamp_axis(5.0, Some(f32::INFINITY), Some(f32::NAN)), 5.0);
        assert_eq!(clamp_axis(5.0, Some(-2.0), Some(f32::NEG_INFINITY)), 5.0);
    }

    #[test]
    fn unusable_requests_count_as_unset() {
        let l = Layout::new().size(f32::INFINITY, f32::NAN);
        assert_eq!(l.requested_width(), None);
        assert_eq!(l.requested_height(), None);
        let l = Layout::new()
            .size(-1.0, 12.0)
            .width_range(None, Some(f32::INFINITY))
            .height_range(None, Some(f32::NAN));
        assert_eq!(l.requested_width(), None);
        assert_eq!(l.requested_height(), Some(12.0));
        assert_eq!(l.width_cap(), None);
        assert_eq!(l.height_cap(), None);
    }

    #[test]
    fn builder() {
        let l = Layout::new()
            .size(10.0, 20.0)
            .align(Align::Start, Align::End)
            .expand();
        assert_eq!(l.width, Some(10.0));
        assert_eq!(l.height, Some(20.0));
        assert_eq!(l.horizontal, Align::Start);
        assert_eq!(l.vertical, Align::End);
        assert!(l.expand);
        assert!(!l.clip);
    }
}
