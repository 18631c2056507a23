//! Geometry primitives used across arbor.
//!
//! All coordinates are `f32` device-independent pixels. Types are plain `Copy` values; none
//! of them validate their contents, so callers that can receive NaN or infinite values from
//! upstream measurement are expected to sanitize first.

/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;
/// Width/height size type.
mod size;
/// Four-sided insets.
mod thickness;

pub use point::Point;
pub use rect::Rect;
pub use size::Size;
pub use thickness::Thickness;

/// Cardinal directions.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Direction {
    /// Upward direction.
    Up,
    /// Downward direction.
    Down,
    /// Leftward direction.
    Left,
    /// Rightward direction.
    Right,
}
