//! Keyboard input primitives.
use std::ops::Add;

/// Modifier key state delivered with every keyboard, pointer and scroll event.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mods {
    /// Shift is held.
    pub shift: bool,
    /// Control is held.
    pub ctrl: bool,
    /// Alt is held.
    pub alt: bool,
    /// The super (logo) key is held.
    pub super_key: bool,
    /// Caps lock is engaged.
    pub caps_lock: bool,
    /// Num lock is engaged.
    pub num_lock: bool,
}

impl Mods {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        super_key: false,
        caps_lock: false,
        num_lock: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control only.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Alt only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Modifiers that change the meaning of a key. Lock keys are ignored.
    pub fn chord(&self) -> Self {
        Self {
            caps_lock: false,
            num_lock: false,
            ..*self
        }
    }

    /// True if no chord modifier is held.
    pub fn is_plain(&self) -> bool {
        self.chord() == Self::NONE
    }
}

impl Add<Self> for Mods {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            super_key: self.super_key || other.super_key,
            caps_lock: self.caps_lock || other.caps_lock,
            num_lock: self.num_lock || other.num_lock,
        }
    }
}

impl Add<KeyCode> for Mods {
    type Output = Key;

    fn add(self, key: KeyCode) -> Key {
        Key { mods: self, key }
    }
}

impl Add<char> for Mods {
    type Output = Key;

    fn add(self, c: char) -> Key {
        Key {
            mods: self,
            key: KeyCode::Char(c),
        }
    }
}

/// Logical key codes.
#[derive(Debug, PartialOrd, PartialEq, Hash, Eq, Clone, Copy)]
pub enum KeyCode {
    /// Backspace.
    Backspace,
    /// Enter/return.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Tab.
    Tab,
    /// Shift+Tab as reported by hosts that fold the modifier into the key.
    BackTab,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Escape.
    Esc,
    /// Function key, `F(1)` is F1.
    F(u8),
    /// A printable character.
    Char(char),
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

/// A key code along with modifiers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Key {
    /// Modifier state.
    pub mods: Mods,
    /// Key code.
    pub key: KeyCode,
}

impl Key {
    /// Construct a key with modifiers.
    pub fn new(mods: Mods, key: KeyCode) -> Self {
        Self { mods, key }
    }

    /// Is this a forward focus-navigation key?
    pub fn is_tab(&self) -> bool {
        self.key == KeyCode::Tab && !self.mods.shift && !self.mods.ctrl && !self.mods.alt
    }

    /// Is this a backward focus-navigation key?
    pub fn is_back_tab(&self) -> bool {
        self.key == KeyCode::BackTab
            || (self.key == KeyCode::Tab && self.mods.shift && !self.mods.ctrl && !self.mods.alt)
    }
}

/// Lock keys never prevent a match, other modifiers must be absent.
impl PartialEq<KeyCode> for Key {
    fn eq(&self, c: &KeyCode) -> bool {
        self.mods.is_plain() && self.key == *c
    }
}

impl PartialEq<char> for Key {
    fn eq(&self, c: &char) -> bool {
        *self == KeyCode::Char(*c)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self {
            mods: Mods::NONE,
            key: KeyCode::Char(c),
        }
    }
}

impl From<KeyCode> for Key {
    fn from(key: KeyCode) -> Self {
        Self {
            mods: Mods::NONE,
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_locks() {
        let caps = Mods {
            caps_lock: true,
            ..Mods::NONE
        };
        assert_eq!(caps + KeyCode::Enter, KeyCode::Enter);
        assert_ne!(Mods::CTRL + KeyCode::Enter, KeyCode::Enter);
        assert_eq!(Key::from('a'), 'a');
    }

    #[test]
    fn tab_detection() {
        assert!(Key::from(KeyCode::Tab).is_tab());
        assert!((Mods::SHIFT + KeyCode::Tab).is_back_tab());
        assert!(Key::from(KeyCode::BackTab).is_back_tab());
        assert!(!(Mods::CTRL + KeyCode::Tab).is_tab());
        assert_eq!(Mods::SHIFT + Mods::CTRL, Mods {
            shift: true,
            ctrl: true,
            ..Mods::NONE
        });
    }
}
