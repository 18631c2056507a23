use serde::{Deserialize, Serialize};

use super::{Point, Size, Thickness};

/// An axis-aligned rectangle with a top-left corner and a size.
///
/// Containment is half-open: a rectangle contains points on its left and top edges but not
/// on its right and bottom edges, so adjacent rectangles never both claim a point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Rect {
    /// A zero rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    /// Construct a rectangle.
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Construct a rectangle from an origin and a size.
    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    /// The top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The width and height.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Right edge, exclusive.
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge, exclusive.
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// True if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Does this rectangle contain the point? Left and top edges are inclusive, right and
    /// bottom edges exclusive. NaN coordinates are never contained.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Does this rectangle completely enclose the other?
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shift the rectangle by an offset.
    pub fn translate(&self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }

    /// Move the rectangle so its top-left corner sits at `origin`.
    pub fn at(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.w, self.h)
    }

    /// Shrink by an inset. Width and height never go below zero.
    pub fn deflate(&self, t: Thickness) -> Self {
        Self::new(
            self.x + t.left,
            self.y + t.top,
            (self.w - t.horizontal()).max(0.0),
            (self.h - t.vertical()).max(0.0),
        )
    }

    /// Grow by an inset.
    pub fn inflate(&self, t: Thickness) -> Self {
        Self::new(
            self.x - t.left,
            self.y - t.top,
            self.w + t.horizontal(),
            self.h + t.vertical(),
        )
    }

    /// The overlapping region of two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r > x && b > y {
            Some(Self::new(x, y, r - x, b - y))
        } else {
            None
        }
    }

    /// The smallest rectangle enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Self::new(x, y, r - x, b - y)
    }

    /// Clamp this rectangle's position so it lies within `bounds` where possible. If the
    /// rectangle is larger than `bounds` along an axis, it is aligned to the near edge.
    pub fn clamp_within(&self, bounds: &Self) -> Self {
        let x = if self.w >= bounds.w {
            bounds.x
        } else {
            self.x.clamp(bounds.x, bounds.right() - self.w)
        };
        let y = if self.h >= bounds.h {
            bounds.y
        } else {
            self.y.clamp(bounds.y, bounds.bottom() - self.h)
        };
        Self::new(x, y, self.w, self.h)
    }
}

impl From<Size> for Rect {
    fn from(s: Size) -> Self {
        s.rect()
    }
}

impl From<(f32, f32, f32, f32)> for Rect {
    fn from(v: (f32, f32, f32, f32)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains_point(Point::new(10.0, 10.0)));
        assert!(r.contains_point(Point::new(14.9, 14.9)));
        assert!(!r.contains_point(Point::new(15.0, 12.0)));
        assert!(!r.contains_point(Point::new(12.0, 15.0)));
        assert!(!r.contains_point(Point::new(f32::NAN, 12.0)));
    }

    #[test]
    fn intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        let c = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert_eq!(a.intersect(&c), None);
        assert_eq!(a.union(&c), Rect::new(0.0, 0.0, 15.0, 10.0));
    }

    #[test]
    fn deflate_inflate() {
        let r = Rect::new(0.0, 0.0, 20.0, 10.0);
        let t = Thickness::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.deflate(t), Rect::new(1.0, 2.0, 16.0, 4.0));
        assert_eq!(r.deflate(t).inflate(t), r);
        assert_eq!(r.deflate(Thickness::all(20.0)).size(), Size::ZERO);
    }

    #[test]
    fn clamp_within() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let r = Rect::new(90.0, -5.0, 20.0, 10.0);
        assert_eq!(r.clamp_within(&bounds), Rect::new(80.0, 0.0, 20.0, 10.0));
        let big = Rect::new(30.0, 30.0, 200.0, 10.0);
        assert_eq!(big.clamp_within(&bounds), Rect::new(0.0, 30.0, 200.0, 10.0));
    }

    proptest! {
        #[test]
        fn intersection_is_contained(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0, aw in 0.0f32..100.0, ah in 0.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0, bw in 0.0f32..100.0, bh in 0.0f32..100.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            if let Some(i) = a.intersect(&b) {
                prop_assert!(i.w > 0.0 && i.h > 0.0);
                prop_assert!(i.x >= a.x && i.x >= b.x);
                prop_assert!(i.right() <= a.right() + 1e-3 && i.right() <= b.right() + 1e-3);
            }
        }
    }
}
