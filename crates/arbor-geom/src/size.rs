use serde::{Deserialize, Serialize};

use super::{Rect, Thickness};

/// A width and height with no location.
///
/// Either dimension may be `f32::INFINITY` when a size is used as a measurement bound, which
/// reads as "unconstrained along this axis".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub w: f32,
    /// Vertical extent.
    pub h: f32,
}

impl Size {
    /// A zero size.
    pub const ZERO: Self = Self { w: 0.0, h: 0.0 };

    /// An unconstrained measurement bound.
    pub const INFINITY: Self = Self {
        w: f32::INFINITY,
        h: f32::INFINITY,
    };

    /// Construct a size.
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    /// True if neither dimension is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.h.is_finite()
    }

    /// True if either dimension is NaN.
    pub fn has_nan(&self) -> bool {
        self.w.is_nan() || self.h.is_nan()
    }

    /// The area of this size.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// True if this size can completely enclose the target size in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }

    /// Componentwise maximum.
    pub fn max(&self, other: Self) -> Self {
        Self {
            w: self.w.max(other.w),
            h: self.h.max(other.h),
        }
    }

    /// Componentwise minimum.
    pub fn min(&self, other: Self) -> Self {
        Self {
            w: self.w.min(other.w),
            h: self.h.min(other.h),
        }
    }

    /// Grow by an inset on every side.
    pub fn inflate(&self, t: Thickness) -> Self {
        Self {
            w: self.w + t.horizontal(),
            h: self.h + t.vertical(),
        }
    }

    /// Shrink by an inset on every side, never going below zero.
    pub fn deflate(&self, t: Thickness) -> Self {
        Self {
            w: (self.w - t.horizontal()).max(0.0),
            h: (self.h - t.vertical()).max(0.0),
        }
    }

    /// A rectangle with these dimensions located at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.w, self.h)
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(f32, f32)> for Size {
    fn from(v: (f32, f32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
