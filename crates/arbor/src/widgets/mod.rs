//! A small widget catalog built on the core contract.
//!
//! Each widget contributes drawing and input semantics only. Layout, hit-testing, focus,
//! capture and popup placement all come from the core.

/// Push button.
pub mod button;
/// Two-state toggle with a label.
pub mod checkbox;
/// Date selection through a calendar popup.
pub mod date_picker;
/// Single selection from a popup list.
pub mod dropdown;
/// Single-line text editing.
pub mod entry;
/// Collection view over an item source.
pub mod items_view;
/// Static text.
pub mod label;
/// Full-window dialog host.
pub mod modal;
/// Vertically scrolling viewport.
pub mod scroll_view;
/// Numeric value on a track.
pub mod slider;

pub use button::{Button, ButtonSetter, ButtonStyle};
pub use checkbox::CheckBox;
pub use date_picker::DatePicker;
pub use dropdown::Dropdown;
pub use entry::Entry;
pub use items_view::ItemsView;
pub use label::Label;
pub use modal::Modal;
pub use scroll_view::ScrollView;
pub use slider::Slider;

use crate::core::render::{Color, Font, TextMeasurer};

/// Shared colors.
pub(crate) mod palette {
    use crate::core::render::Color;

    /// Default text.
    pub const TEXT: Color = Color::rgb(0x20, 0x20, 0x20);
    /// Text on disabled controls.
    pub const TEXT_DISABLED: Color = Color::rgb(0x90, 0x90, 0x90);
    /// Control background.
    pub const SURFACE: Color = Color::rgb(0xf4, 0xf4, 0xf4);
    /// Control background under the pointer.
    pub const SURFACE_HOVER: Color = Color::rgb(0xe6, 0xe6, 0xe6);
    /// Control background while pressed.
    pub const SURFACE_PRESSED: Color = Color::rgb(0xcc, 0xcc, 0xcc);
    /// Control outline.
    pub const BORDER: Color = Color::rgb(0x80, 0x80, 0x80);
    /// Accent for focus rings, selection and thumbs.
    pub const ACCENT: Color = Color::rgb(0x1e, 0x6f, 0xd9);
    /// Popup and list background.
    pub const PANEL: Color = Color::WHITE;
}

/// Height of one line of text in `font`.
pub(crate) fn line_height(text: &dyn TextMeasurer, font: &Font) -> f32 {
    text.measure("", font).h
}

/// Text color for an enabled or disabled control.
pub(crate) fn text_color(enabled: bool) -> Color {
    if enabled {
        palette::TEXT
    } else {
        palette::TEXT_DISABLED
    }
}
