use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-window behaviour knobs.
///
/// Every field has a default, so a JSON document only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Consecutive frames a node may request a follow-up layout from inside `draw` before
    /// its latest measurement is accepted and it is reported as unstable.
    pub max_relayout_passes: u32,
    /// Available sizes at or above this value are treated as unbounded by track sizing.
    pub unbounded_threshold: f32,
    /// Unhandled Tab and Shift+Tab move focus.
    pub tab_navigation: bool,
    /// A press outside an open popup asks the popup's owner to close it.
    pub dismiss_popups_on_outside_press: bool,
    /// Gap between a popup and its anchor.
    pub popup_gap: f32,
    /// Pixels scrolled per wheel notch.
    pub scroll_step: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_relayout_passes: 3,
            unbounded_threshold: 1.0e6,
            tab_navigation: true,
            dismiss_popups_on_outside_press: true,
            popup_gap: 2.0,
            scroll_step: 40.0,
        }
    }
}

impl Config {
    /// Parse a configuration from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
