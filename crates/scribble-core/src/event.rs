#![forbid(unsafe_code)]

//! Canonical key event types.
//!
//! Hosts translate their native keyboard events into [`KeyEvent`] before
//! handing them to an editor backend. Both backends interpret the same
//! events, so the mapping lives here rather than in each backend.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; release events are ignored by editors
//! - `Modifiers` use bitflags for easy combination
//! - [`Modifiers::platform`] is the "Mod" key: Command on macOS, Ctrl elsewhere

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for `Mod-<c>` on the current platform.
    #[must_use]
    pub const fn chord(c: char) -> Self {
        Self::new(KeyCode::Char(c)).with_modifiers(Modifiers::platform())
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Whether the event should be acted on (press or auto-repeat).
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Check if the platform `Mod` key is held.
    #[must_use]
    pub const fn mod_key(&self) -> bool {
        self.modifiers.contains(Modifiers::platform())
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Whether this is the `Mod-/` comment toggle chord.
    #[must_use]
    pub fn is_toggle_comment(&self) -> bool {
        self.is_actionable() && self.mod_key() && self.is_char('/')
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Tab key.
    Tab,

    /// Backspace key.
    Backspace,

    /// Delete key.
    Delete,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Escape key.
    Escape,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    /// The platform `Mod` key: Command on macOS, Ctrl everywhere else.
    #[must_use]
    pub const fn platform() -> Self {
        if cfg!(target_os = "macos") {
            Self::SUPER
        } else {
            Self::CTRL
        }
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_uses_platform_modifier() {
        let ev = KeyEvent::chord('/');
        assert!(ev.mod_key());
        assert!(ev.is_toggle_comment());
        assert!(!ev.shift());
    }

    #[test]
    fn plain_slash_is_not_toggle() {
        let ev = KeyEvent::new(KeyCode::Char('/'));
        assert!(!ev.is_toggle_comment());
    }

    #[test]
    fn release_is_not_actionable() {
        let ev = KeyEvent::chord('/').with_kind(KeyEventKind::Release);
        assert!(!ev.is_actionable());
        assert!(!ev.is_toggle_comment());

        let repeat = KeyEvent::chord('/').with_kind(KeyEventKind::Repeat);
        assert!(repeat.is_toggle_comment());
    }

    #[test]
    fn extra_modifiers_still_match_mod() {
        let ev = KeyEvent::new(KeyCode::Char('/'))
            .with_modifiers(Modifiers::platform() | Modifiers::SHIFT);
        assert!(ev.mod_key());
        assert!(ev.shift());
    }

    #[test]
    fn default_modifiers_are_empty() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        assert!(Modifiers::default().is_empty());
    }
}
