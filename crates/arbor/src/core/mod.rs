#![allow(clippy::new_without_default)]
//! Core types and traits for the arbor widget toolkit.

// Core modules - public
/// Window configuration.
pub mod config;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Input event types.
pub mod event;
/// Pure measure/arrange arithmetic.
pub mod measure;
/// Node names.
pub mod name;
/// Node data stored in the arena.
pub mod node;
/// Observable properties and item sources.
pub mod property;
/// Drawing backend contract.
pub mod render;
/// Testing utilities.
pub mod testing;
/// Visual states and state tables.
pub mod visual_state;

// Core modules - internal
/// Context traits and implementations.
pub mod context;
/// Focus management.
pub mod focus;
/// Hit-testing and coordinate transforms.
pub mod hittest;
/// Node ID types.
pub mod id;
/// Invalidation handles.
pub mod invalidate;
/// Popup registry and placement.
pub mod popup;
/// Input and frame drivers.
pub mod window;
/// Arena, tree structure and layout recursion.
pub mod world;

// Public exports from internal modules
pub use context::{Context, DrawContext, LayoutContext, ViewContext};
pub use focus::FocusManager;
pub use hittest::{Hit, HitTester};
pub use id::{NodeId, TypedId};
pub use invalidate::{Invalidation, Invalidator};
pub use popup::{Overlay, Placement, PopupAnchor, PopupManager, place_popup};
pub use window::{FrameReport, Window};
pub use world::Core;
