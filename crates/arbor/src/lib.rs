//! Arbor: a retained-mode widget toolkit core.
//!
//! Arbor owns a tree of widgets and does the work every widget would otherwise repeat:
//! two-pass measure/arrange layout, hit-testing, input routing with bubbling, focus, pointer
//! capture, popups and frame scheduling. Widgets only describe how they size, draw and react.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Window`] - Owns a [`Core`] and turns host input into widget events and frames
//! - [`Core`] - The arena, layout engine and dispatcher
//! - [`Widget`] - The trait implemented by all widgets
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Point, Size, Rect, Thickness)
//! - [`layout`] - Per-node layout properties
//! - [`panels`] - Stack, grid and absolute layout containers
//! - [`widgets`] - Built-in widget implementations

#![warn(missing_docs)]

// Internal core module - re-export specific items below
mod core;

// Public modules
pub mod layout;
pub mod panels;
pub mod prelude;
pub mod widget;
pub mod widgets;

pub use arbor_geom as geom;
// Re-export core application types
pub use core::{
    Context, Core, DrawContext, FocusManager, FrameReport, Hit, HitTester, Invalidation,
    Invalidator, LayoutContext, NodeId, Overlay, Placement, PopupAnchor, PopupManager, TypedId,
    ViewContext, Window, place_popup,
};
// Re-export core submodules
pub use core::{
    config, dump, error, event, measure, name, node, property, render, testing, visual_state,
};
// Re-export widget trait and event outcome
pub use widget::{EventOutcome, Widget};
