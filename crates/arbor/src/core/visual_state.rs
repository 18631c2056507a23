//! Visual states and typed state-transition tables.
//!
//! The core computes one [`VisualState`] per node from its enabled, pressed, hover and focus
//! status and pushes changes to the widget. Widgets turn states into styling with a
//! [`VisualStateTable`]: a list of typed assignments per state, always applied to a fresh copy
//! of the base style so leaving a state needs no "restore original value" bookkeeping.

use std::{fmt, marker::PhantomData};

/// A named styling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    /// No special status.
    #[default]
    Normal,
    /// The pointer is over the node or one of its descendants.
    PointerOver,
    /// A press started on this node and has not been released.
    Pressed,
    /// The node holds focus.
    Focused,
    /// The node or an ancestor is disabled.
    Disabled,
}

impl VisualState {
    /// Resolve competing statuses. Disabled beats Pressed beats PointerOver beats Focused.
    pub fn resolve(enabled: bool, pressed: bool, pointer_over: bool, focused: bool) -> Self {
        if !enabled {
            Self::Disabled
        } else if pressed {
            Self::Pressed
        } else if pointer_over {
            Self::PointerOver
        } else if focused {
            Self::Focused
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::PointerOver => "pointer_over",
            Self::Pressed => "pressed",
            Self::Focused => "focused",
            Self::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// A single typed property assignment on a style value `T`.
pub trait Setter<T> {
    /// Apply the assignment.
    fn apply(&self, target: &mut T);
}

/// Maps visual states to lists of typed assignments on a style value `T`.
pub struct VisualStateTable<T, S> {
    /// Assignments per state, in declaration order.
    entries: Vec<(VisualState, Vec<S>)>,
    /// The style type the setters apply to.
    _style: PhantomData<fn(&mut T)>,
}

impl<T, S> Default for VisualStateTable<T, S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            _style: PhantomData,
        }
    }
}

impl<T: Clone, S: Setter<T>> VisualStateTable<T, S> {
    /// An empty table. Every state resolves to the base style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add assignments for a state, replacing any earlier entry for it.
    pub fn with(mut self, state: VisualState, setters: Vec<S>) -> Self {
        self.entries.retain(|(s, _)| *s != state);
        self.entries.push((state, setters));
        self
    }

    /// Does the table have an entry for this state?
    pub fn has(&self, state: VisualState) -> bool {
        self.entries.iter().any(|(s, _)| *s == state)
    }

    /// The style for a state: the base with that state's assignments applied.
    pub fn resolve(&self, base: &T, state: VisualState) -> T {
        let mut out = base.clone();
        if let Some((_, setters)) = self.entries.iter().find(|(s, _)| *s == state) {
            for s in setters {
                s.apply(&mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Style {
        fill: u8,
        border: u8,
    }

    enum Set {
        Fill(u8),
        Border(u8),
    }

    impl Setter<Style> for Set {
        fn apply(&self, target: &mut Style) {
            match self {
                Self::Fill(v) => target.fill = *v,
                Self::Border(v) => target.border = *v,
            }
        }
    }

    #[test]
    fn precedence() {
        use VisualState::*;
        assert_eq!(VisualState::resolve(false, true, true, true), Disabled);
        assert_eq!(VisualState::resolve(true, true, true, true), Pressed);
        assert_eq!(VisualState::resolve(true, false, true, true), PointerOver);
        assert_eq!(VisualState::resolve(true, false, false, true), Focused);
        assert_eq!(VisualState::resolve(true, false, false, false), Normal);
    }

    #[test]
    fn table_resolves_from_base() {
        let base = Style { fill: 1, border: 1 };
        let table = VisualStateTable::new()
            .with(VisualState::Pressed, vec![Set::Fill(9), Set::Border(8)])
            .with(VisualState::PointerOver, vec![Set::Fill(5)]);
        assert_eq!(table.resolve(&base, VisualState::Pressed), Style { fill: 9, border: 8 });
        assert_eq!(table.resolve(&base, VisualState::PointerOver), Style { fill: 5, border: 1 });
        // Leaving a state restores the base without extra bookkeeping.
        assert_eq!(table.resolve(&base, VisualState::Normal), base);
        assert!(!table.has(VisualState::Disabled));
    }
}
