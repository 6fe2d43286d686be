//! Keyboard input as seen by the engine.

/// Keyboard modifier flags for key events.
///
/// This structure tracks the state of common keyboard modifiers
/// during key press and key release events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyMods {
    /// Whether the Control (Ctrl) key is pressed.
    pub ctrl: bool,
    /// Whether the Alt key is pressed.
    pub alt: bool,
    /// Whether the Shift key is pressed.
    pub shift: bool,
    /// Whether the Meta (Command / Windows) key is pressed.
    pub meta: bool,
}

impl KeyMods {
    /// Only shift held.
    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    /// True when a modifier that turns a character into a shortcut is held.
    #[must_use]
    pub const fn has_command_modifier(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Keys the engine reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// `ArrowDown`.
    ArrowDown,
    /// `ArrowUp`.
    ArrowUp,
    /// `ArrowLeft`.
    ArrowLeft,
    /// `ArrowRight`.
    ArrowRight,
    /// `Home`.
    Home,
    /// `End`.
    End,
    /// `PageUp`.
    PageUp,
    /// `PageDown`.
    PageDown,
    /// `Enter`.
    Enter,
    /// `Escape`.
    Escape,
    /// `Tab`.
    Tab,
    /// A printable character, including space.
    Character(char),
    /// Anything else.
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowDown" => Self::ArrowDown,
            "ArrowUp" => Self::ArrowUp,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) if !ch.is_control() => Self::Character(ch),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// A key press with its modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Modifier state at the time of the press.
    pub mods: KeyMods,
}

impl KeyEvent {
    /// Key press without modifiers.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            mods: KeyMods {
                ctrl: false,
                alt: false,
                shift: false,
                meta: false,
            },
        }
    }

    /// Key press with modifiers.
    #[must_use]
    pub const fn with_mods(key: Key, mods: KeyMods) -> Self {
        Self { key, mods }
    }

    /// Shift+Tab.
    #[must_use]
    pub const fn is_shift_tab(&self) -> bool {
        matches!(self.key, Key::Tab) && self.mods.shift
    }
}
