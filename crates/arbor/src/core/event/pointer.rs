//! Pointer and scroll input primitives.
use crate::geom::Point;

use super::key::Mods;

/// Pointer buttons.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum Button {
    /// Primary button.
    #[default]
    Left,
    /// Secondary button.
    Right,
    /// Middle button.
    Middle,
    /// No button, used for plain moves.
    None,
}

/// What happened to the pointer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PointerAction {
    /// A button went down.
    Pressed,
    /// The pointer moved.
    Moved,
    /// A button went up.
    Released,
}

/// Which part of a node's hit area was struck.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum HitRegion {
    /// The node's regular bounds in the tree.
    #[default]
    Content,
    /// The node's open popup, which lives in screen space outside the tree.
    Popup,
}

/// A pointer event as delivered to a widget.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PointerEvent {
    /// Action kind.
    pub action: PointerAction,
    /// Button involved, `Button::None` for moves.
    pub button: Button,
    /// Position relative to the receiving node's top-left corner, or to the popup's top-left
    /// corner when `region` is `Popup`.
    pub position: Point,
    /// Position in window coordinates.
    pub screen: Point,
    /// Region of the receiving node under the pointer.
    pub region: HitRegion,
    /// Modifier state.
    pub mods: Mods,
}

/// A scroll event as delivered to a widget.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ScrollEvent {
    /// Scroll amount in notches. Positive `y` scrolls content up (towards the end).
    pub delta: Point,
    /// Position relative to the receiving node's top-left corner.
    pub position: Point,
    /// Position in window coordinates.
    pub screen: Point,
    /// Modifier state.
    pub mods: Mods,
}
