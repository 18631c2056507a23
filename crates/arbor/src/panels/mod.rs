//! Layout containers.
//!
//! Panels are ordinary widgets that override `measure` and `arrange`. They keep per-child
//! placement in side tables keyed by `NodeId` and prune those tables when a child leaves.

/// Absolute and proportional positioning.
pub mod absolute;
/// Track-based grid.
pub mod grid;
/// Single-axis flow.
pub mod stack;

pub use absolute::{AbsoluteFlags, AbsoluteLayout, AbsolutePlacement};
pub use grid::{Cell, Grid, TrackSize, size_tracks};
pub use stack::Stack;
