#![forbid(unsafe_code)]

//! Editor theme and the style scope derived from it.
//!
//! A [`Theme`] carries the three colors a user picks: background, foreground,
//! and the color used for comment lines. Everything else the surface paints
//! (caret, gutter, active line) is derived in [`StyleScope::from_theme`], so
//! reconfiguring the surface is always "recompute the scope, swap it in".
//!
//! # Wire format
//!
//! Presets store themes as `{"bg": "#rrggbb", "fg": "#rrggbb", "comment": "#rrggbb"}`.
//! [`ThemeWire`] reads that form leniently: missing keys, non-string values,
//! and unparseable colors all fall back to the default for that slot rather
//! than rejecting the preset.

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::Rgb;

/// Default editor background (`#0f111a`).
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(0x0f, 0x11, 0x1a);
/// Default editor foreground (`#c0caf5`).
pub const DEFAULT_FOREGROUND: Rgb = Rgb::new(0xc0, 0xca, 0xf5);
/// Default comment line color (`#565f89`).
pub const DEFAULT_COMMENT: Rgb = Rgb::new(0x56, 0x5f, 0x89);

/// Gutter text color; fixed regardless of theme.
pub const GUTTER_FOREGROUND: Rgb = Rgb::new(0x6b, 0x71, 0x90);
/// Opacity of the white wash used for the active line.
pub const ACTIVE_LINE_ALPHA: f32 = 0.04;

/// The user-facing editor theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    /// Editor and panel background.
    pub background: Rgb,
    /// Editor and panel text color.
    pub foreground: Rgb,
    /// Color for lines the comment policy marks.
    pub comment: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Theme {
    /// The fixed default theme restored by "reset".
    pub const DEFAULT: Self = Self {
        background: DEFAULT_BACKGROUND,
        foreground: DEFAULT_FOREGROUND,
        comment: DEFAULT_COMMENT,
    };

    /// Replace the background color.
    #[must_use]
    pub const fn with_background(mut self, color: Rgb) -> Self {
        self.background = color;
        self
    }

    /// Replace the foreground color.
    #[must_use]
    pub const fn with_foreground(mut self, color: Rgb) -> Self {
        self.foreground = color;
        self
    }

    /// Replace the comment color.
    #[must_use]
    pub const fn with_comment(mut self, color: Rgb) -> Self {
        self.comment = color;
        self
    }

    /// Whether every slot holds its default value.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Build a theme from the wire form, defaulting any slot that is missing
    /// or not a valid color.
    #[must_use]
    pub fn from_wire(wire: &ThemeWire) -> Self {
        Self {
            background: lenient(wire.bg.as_deref(), DEFAULT_BACKGROUND, "bg"),
            foreground: lenient(wire.fg.as_deref(), DEFAULT_FOREGROUND, "fg"),
            comment: lenient(wire.comment.as_deref(), DEFAULT_COMMENT, "comment"),
        }
    }

    /// The wire form of this theme.
    #[must_use]
    pub fn to_wire(&self) -> ThemeWire {
        ThemeWire {
            bg: Some(self.background.to_hex()),
            fg: Some(self.foreground.to_hex()),
            comment: Some(self.comment.to_hex()),
        }
    }
}

fn lenient(raw: Option<&str>, fallback: Rgb, slot: &'static str) -> Rgb {
    match raw.map(str::parse::<Rgb>) {
        Some(Ok(color)) => color,
        Some(Err(err)) => {
            tracing::debug!(slot, error = %err, "theme color rejected, using default");
            fallback
        }
        None => fallback,
    }
}

/// Theme as it travels in presets.
///
/// Every field is optional. Non-string JSON values deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeWire {
    /// Background color string.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    /// Foreground color string.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    /// Comment color string.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ThemeWire {
    /// Whether no slot is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bg.is_none() && self.fg.is_none() && self.comment.is_none()
    }
}

impl From<Theme> for ThemeWire {
    fn from(theme: Theme) -> Self {
        theme.to_wire()
    }
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeString {
        Str(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match MaybeString::deserialize(deserializer)? {
        MaybeString::Str(s) => Some(s),
        MaybeString::Other(_) => None,
    })
}

/// Every concrete color the editor surface and its panel paint.
///
/// Derived from a [`Theme`]; applying a new scope never touches the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleScope {
    /// Panel and editor background.
    pub background: Rgb,
    /// Panel and editor text.
    pub foreground: Rgb,
    /// Caret color (tracks the foreground).
    pub caret: Rgb,
    /// Gutter background (tracks the background).
    pub gutter_background: Rgb,
    /// Gutter text (line numbers).
    pub gutter_foreground: Rgb,
    /// Active line wash.
    pub active_line: Rgb,
    /// Comment line text.
    pub comment: Rgb,
}

impl StyleScope {
    /// Derive the full scope from a theme.
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            background: theme.background,
            foreground: theme.foreground,
            caret: theme.foreground,
            gutter_background: theme.background,
            gutter_foreground: GUTTER_FOREGROUND,
            active_line: Rgb::WHITE.blend_over(theme.background, ACTIVE_LINE_ALPHA),
            comment: theme.comment,
        }
    }

    /// Effective text color of a line.
    #[must_use]
    pub const fn line_color(&self, commented: bool) -> Rgb {
        if commented {
            self.comment
        } else {
            self.foreground
        }
    }
}

impl Default for StyleScope {
    fn default() -> Self {
        Self::from_theme(&Theme::DEFAULT)
    }
}
