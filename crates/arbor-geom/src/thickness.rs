use serde::{Deserialize, Serialize};

/// Four-sided inset used for margins and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thickness {
    /// Left inset.
    pub left: f32,
    /// Top inset.
    pub top: f32,
    /// Right inset.
    pub right: f32,
    /// Bottom inset.
    pub bottom: f32,
}

impl Thickness {
    /// A zero inset.
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Construct an inset from each side.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same inset on every side.
    pub const fn all(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Separate horizontal and vertical insets.
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Sum of the left and right insets.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// True if every side is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals() {
        let t = Thickness::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(t.horizontal(), 4.0);
        assert_eq!(t.vertical(), 6.0);
        assert!(Thickness::ZERO.is_zero());
        assert_eq!(Thickness::symmetric(2.0, 1.0), Thickness::new(2.0, 1.0, 2.0, 1.0));
    }
}
