//! Input events: the raw values a host delivers, and the localized events widgets receive.

/// Keyboard primitives.
pub mod key;
/// Pointer primitives.
pub mod pointer;

use crate::geom::{Point, Size};
pub use key::{Key, KeyCode, Mods};
pub use pointer::{Button, HitRegion, PointerAction, PointerEvent, ScrollEvent};

/// A raw input event from the host, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A pointer button went down.
    PointerPressed {
        /// Window position.
        position: Point,
        /// Button pressed.
        button: Button,
        /// Modifier state.
        mods: Mods,
    },
    /// The pointer moved.
    PointerMoved {
        /// Window position.
        position: Point,
        /// Modifier state.
        mods: Mods,
    },
    /// A pointer button went up.
    PointerReleased {
        /// Window position.
        position: Point,
        /// Button released.
        button: Button,
        /// Modifier state.
        mods: Mods,
    },
    /// Scroll wheel or touchpad scroll.
    Scroll {
        /// Window position.
        position: Point,
        /// Scroll amount in notches.
        delta: Point,
        /// Modifier state.
        mods: Mods,
    },
    /// A key went down.
    KeyDown(Key),
    /// A key went up.
    KeyUp(Key),
    /// Committed text, after any input method composition.
    Text(String),
    /// The window was resized.
    Resize(Size),
}

impl InputEvent {
    /// A primary-button press at a window position.
    pub fn press(x: f32, y: f32) -> Self {
        Self::PointerPressed {
            position: Point::new(x, y),
            button: Button::Left,
            mods: Mods::NONE,
        }
    }

    /// A primary-button release at a window position.
    pub fn release(x: f32, y: f32) -> Self {
        Self::PointerReleased {
            position: Point::new(x, y),
            button: Button::Left,
            mods: Mods::NONE,
        }
    }

    /// A pointer move to a window position.
    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMoved {
            position: Point::new(x, y),
            mods: Mods::NONE,
        }
    }

    /// A vertical scroll at a window position.
    pub fn scroll(x: f32, y: f32, dy: f32) -> Self {
        Self::Scroll {
            position: Point::new(x, y),
            delta: Point::new(0.0, dy),
            mods: Mods::NONE,
        }
    }

    /// A key press.
    pub fn key(key: impl Into<Key>) -> Self {
        Self::KeyDown(key.into())
    }
}

/// An event delivered to a widget's `on_event`.
///
/// Pointer and scroll positions are local to the receiving node. When an event bubbles to a
/// parent the position is re-expressed in the parent's space.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pointer press, move or release.
    Pointer(PointerEvent),
    /// Scroll.
    Scroll(ScrollEvent),
    /// Key down.
    KeyDown(Key),
    /// Key up.
    KeyUp(Key),
    /// Committed text.
    Text(String),
    /// The pointer entered this node. Not bubbled.
    Entered,
    /// The pointer left this node. Not bubbled.
    Exited,
    /// This node gained focus. Not bubbled.
    FocusGained,
    /// This node lost focus. Not bubbled.
    FocusLost,
    /// A press landed outside this node and its popup; the popup should close. Not bubbled.
    DismissPopup,
}

impl Event {
    /// Short kind name used in logs and test transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pointer(p) => match p.action {
                PointerAction::Pressed => "pressed",
                PointerAction::Moved => "moved",
                PointerAction::Released => "released",
            },
            Self::Scroll(_) => "scroll",
            Self::KeyDown(_) => "key_down",
            Self::KeyUp(_) => "key_up",
            Self::Text(_) => "text",
            Self::Entered => "entered",
            Self::Exited => "exited",
            Self::FocusGained => "focus_gained",
            Self::FocusLost => "focus_lost",
            Self::DismissPopup => "dismiss_popup",
        }
    }

    /// Screen position for pointer and scroll events.
    pub fn screen(&self) -> Option<Point> {
        match self {
            Self::Pointer(p) => Some(p.screen),
            Self::Scroll(s) => Some(s.screen),
            _ => None,
        }
    }

    /// Is this a primary-button press?
    pub fn is_press(&self) -> bool {
        matches!(self, Self::Pointer(p) if p.action == PointerAction::Pressed && p.button == Button::Left)
    }

    /// Is this a primary-button release?
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Pointer(p) if p.action == PointerAction::Released && p.button == Button::Left)
    }
}
