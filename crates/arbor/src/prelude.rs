//! Convenience re-exports for common arbor types.

pub use crate::{
    Context, Core, EventOutcome, FocusManager, HitTester, NodeId, PopupManager, ViewContext,
    Widget, Window, error,
    event::{Event, InputEvent, Key, KeyCode, Mods},
    geom::{Point, Rect, Size, Thickness},
    layout::{Align, Layout, Orientation},
    panels::{Grid, Stack, TrackSize},
    property::{ItemSource, Observable, Property},
    render::{Canvas, Color, Font, Paint},
};

/// Common result alias for arbor operations.
pub type Result<T> = error::Result<T>;
