#![forbid(unsafe_code)]

//! Comment stripping and cheap size estimates for the text the node emits.
//!
//! [`clean_text`] drops every line the [`CommentPolicy`] marks, keeping line
//! endings and blank lines that are not comments. [`CleanSummary`] bundles
//! the cleaned text with its character count and a token estimate, counted
//! per [`TokenMode`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tiktoken_rs::CoreBPE;

use crate::comment::CommentPolicy;

/// Word runs or single non-space punctuation characters.
const TOKEN_UNIT_PATTERN: &str = r"\w+|[^\w\s]";

static TOKEN_UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_UNIT_PATTERN).expect("token unit pattern is valid"));

/// The cl100k encoder, or `None` if it could not be built.
static CL100K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| {
    tiktoken_rs::cl100k_base()
        .map_err(|err| tracing::warn!(error = %err, "cl100k tokenizer unavailable, exact counts fall back to light"))
        .ok()
});

/// How [`CleanSummary`] counts tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenMode {
    /// [`estimate_tokens_light`].
    #[default]
    Light,
    /// [`estimate_tokens_exact`].
    Exact,
}

impl TokenMode {
    /// Interpret the host's mode string: `"exact"` is exact, anything else
    /// is light.
    #[must_use]
    pub fn from_host(value: &str) -> Self {
        if value.trim() == "exact" {
            Self::Exact
        } else {
            Self::Light
        }
    }

    /// The host string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown token mode {other:?}")),
        }
    }
}

/// Remove comment lines while preserving order and non-comment blank lines.
#[must_use]
pub fn clean_text(text: &str, policy: &CommentPolicy) -> String {
    text.split_inclusive('\n')
        .filter(|line| !policy.matches(line))
        .collect()
}

/// Number of Unicode scalar values in `text`.
#[must_use]
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Cheap token estimate: each `\w+` run and each punctuation character
/// counts as one unit. Behaves tolerably for mixed CJK and Latin text.
#[must_use]
pub fn estimate_tokens_light(text: &str) -> usize {
    TOKEN_UNITS.find_iter(text).count()
}

/// Token count under the cl100k encoding. Falls back to
/// [`estimate_tokens_light`] when the encoder cannot be built.
#[must_use]
pub fn estimate_tokens_exact(text: &str) -> usize {
    count_with(CL100K.as_ref(), text)
}

fn count_with(encoder: Option<&CoreBPE>, text: &str) -> usize {
    match encoder {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => estimate_tokens_light(text),
    }
}

/// Token estimate of `text` under `mode`.
#[must_use]
pub fn estimate_tokens(text: &str, mode: TokenMode) -> usize {
    match mode {
        TokenMode::Light => estimate_tokens_light(text),
        TokenMode::Exact => estimate_tokens_exact(text),
    }
}

/// Output of stripping a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSummary {
    /// Text with comment lines removed.
    pub cleaned: String,
    /// Characters in `cleaned`.
    pub char_count: usize,
    /// Token estimate of `cleaned`.
    pub token_estimate: usize,
    /// How `token_estimate` was counted.
    pub token_mode: TokenMode,
}

impl CleanSummary {
    /// Strip `text` under `policy` and measure the result.
    #[must_use]
    pub fn compute(text: &str, policy: &CommentPolicy, mode: TokenMode) -> Self {
        let cleaned = clean_text(text, policy);
        Self {
            char_count: char_count(&cleaned),
            token_estimate: estimate_tokens(&cleaned, mode),
            token_mode: mode,
            cleaned,
        }
    }
}
