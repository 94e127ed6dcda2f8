#![forbid(unsafe_code)]

//! Text handling for the scribble editor surface.
//!
//! - [`comment`] - the comment policy evaluator ([`is_commented`], [`CommentPolicy`])
//! - [`toggle`] - the line comment toggle over a selection ([`toggle_comment`])
//! - [`strip`] - comment stripping and cheap size estimates
//! - [`editor`] - [`Editor`], a multi-selection buffer with undo history
//!
//! # Example
//! ```
//! use scribble_text::{CommentMode, is_commented, toggle_comment};
//!
//! assert!(!is_commented("  // x", "//", CommentMode::Strict));
//! assert!(is_commented("  // x", "//", CommentMode::Loose));
//!
//! let out = toggle_comment("a\nb\nc", 0, 3, "// ");
//! assert_eq!(out.text, "// a\n// b\nc");
//! let back = toggle_comment(&out.text, out.selection_start, out.selection_end, "// ");
//! assert_eq!(back.text, "a\nb\nc");
//! ```

pub mod comment;
pub mod editor;
pub mod strip;
pub mod toggle;

pub use comment::{CommentMode, CommentPolicy, DEFAULT_PREFIX, is_commented};
pub use editor::{Change, Editor, Selection};
pub use strip::{
    CleanSummary, TokenMode, char_count, clean_text, estimate_tokens, estimate_tokens_exact,
    estimate_tokens_light,
};
pub use toggle::{
    ToggleAction, ToggleOutcome, all_commented, floor_boundary, line_block, toggle_block,
    toggle_comment,
};
