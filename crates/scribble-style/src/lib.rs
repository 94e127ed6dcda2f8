#![forbid(unsafe_code)]

//! Style primitives for the scribble editor surface.
//!
//! - [`Rgb`] - opaque color with `#rrggbb` parsing and blending
//! - [`Theme`] - the three user-facing colors (background, foreground, comment)
//! - [`ThemeWire`] - the lenient wire form used by presets
//! - [`StyleScope`] - every concrete color the surface paints, derived from a theme
//!
//! # Example
//! ```
//! use scribble_style::{Rgb, StyleScope, Theme};
//!
//! let theme = Theme::default().with_comment(Rgb::new(0x88, 0x88, 0x88));
//! let scope = StyleScope::from_theme(&theme);
//! assert_eq!(scope.line_color(true), Rgb::new(0x88, 0x88, 0x88));
//! assert_eq!(scope.line_color(false), theme.foreground);
//! ```

pub mod color;
pub mod theme;

pub use color::{ColorParseError, Rgb};
pub use theme::{StyleScope, Theme, ThemeWire};
