#![forbid(unsafe_code)]

//! Comment policy evaluation.
//!
//! A line is "commented" when it begins with the policy prefix. The mode
//! decides where "begins" is measured from:
//!
//! | Mode | Rule |
//! |------|------|
//! | `strict` | prefix at column 0 |
//! | `loose` | prefix after leading whitespace |
//!
//! An empty prefix never matches. Evaluation is pure and runs over the whole
//! document on every text or policy change.

use std::fmt;
use std::str::FromStr;

/// Prefix used when the host control is empty.
pub const DEFAULT_PREFIX: &str = "//";

/// Where the comment prefix must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommentMode {
    /// Prefix must start at column 0.
    Strict,
    /// Prefix may follow leading whitespace.
    #[default]
    Loose,
}

impl CommentMode {
    /// Interpret the host's mode string: `"strict"` is strict, anything else
    /// (including empty) is loose.
    #[must_use]
    pub fn from_host(value: &str) -> Self {
        if value.trim() == "strict" {
            Self::Strict
        } else {
            Self::Loose
        }
    }

    /// The host string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
        }
    }
}

impl fmt::Display for CommentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            other => Err(format!("unknown comment mode {other:?}")),
        }
    }
}

/// Decide whether `line` counts as a comment under `prefix` and `mode`.
#[must_use]
pub fn is_commented(line: &str, prefix: &str, mode: CommentMode) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match mode {
        CommentMode::Strict => line.starts_with(prefix),
        CommentMode::Loose => line.trim_start().starts_with(prefix),
    }
}

/// A resolved (prefix, mode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentPolicy {
    prefix: String,
    mode: CommentMode,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, CommentMode::Loose)
    }
}

impl CommentPolicy {
    /// Create a policy with an exact prefix (empty allowed; it matches nothing).
    #[must_use]
    pub fn new(prefix: impl Into<String>, mode: CommentMode) -> Self {
        Self {
            prefix: prefix.into(),
            mode,
        }
    }

    /// Resolve a policy from the host's raw control values.
    ///
    /// An empty prefix control falls back to `default_prefix`; the mode string
    /// follows [`CommentMode::from_host`].
    #[must_use]
    pub fn from_host(prefix: &str, mode: &str, default_prefix: &str) -> Self {
        let prefix = if prefix.is_empty() {
            default_prefix
        } else {
            prefix
        };
        Self::new(prefix, CommentMode::from_host(mode))
    }

    /// The comment prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The comment mode.
    #[must_use]
    pub const fn mode(&self) -> CommentMode {
        self.mode
    }

    /// Whether `line` is a comment under this policy.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        is_commented(line, &self.prefix, self.mode)
    }

    /// Indices of commented lines in `text` (lines split on `\n`).
    #[must_use]
    pub fn commented_lines(&self, text: &str) -> Vec<usize> {
        if self.prefix.is_empty() {
            return Vec::new();
        }
        text.split('\n')
            .enumerate()
            .filter(|(_, line)| self.matches(line))
            .map(|(idx, _)| idx)
            .collect()
    }
}
