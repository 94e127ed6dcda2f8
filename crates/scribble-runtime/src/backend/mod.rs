//! The editor capability interface and its two implementations.
//!
//! [`EditorBackend`] is the only surface the session talks to. Exactly two
//! types implement it: [`RichBackend`] (multi-selection, undo history,
//! built on the loaded rich module) and [`FallbackBackend`] (one selection,
//! no history). Both answer the comment operations identically; code that
//! needs a rich-only affordance asks [`EditorBackend::kind`] or the
//! affordance's own query (such as [`EditorBackend::can_undo`]) first.
//!
//! Every mutation a backend performs is written to its [`BufferMirror`]
//! before the mutating call returns.

mod fallback;
mod rich;

pub use fallback::FallbackBackend;
pub use rich::RichBackend;

use scribble_core::KeyEvent;
use scribble_style::{Rgb, StyleScope};
use scribble_text::{CommentPolicy, Selection, ToggleAction};

use crate::mirror::BufferMirror;

/// Which implementation is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Built on the rich module.
    Rich,
    /// Plain text surface.
    Fallback,
}

impl BackendKind {
    /// Stable lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rich => "rich",
            Self::Fallback => "fallback",
        }
    }
}

/// Everything a backend needs at construction.
///
/// The initial text is read from `mirror`.
#[derive(Debug, Clone)]
pub struct BackendInit {
    /// Host text field; seeds the buffer and receives every mutation.
    pub mirror: BufferMirror,
    /// Comment policy for the first decoration pass.
    pub policy: CommentPolicy,
    /// Initial colors.
    pub scope: StyleScope,
    /// Undo depth (rich backend only).
    pub max_history: usize,
}

impl Default for BackendInit {
    fn default() -> Self {
        Self {
            mirror: BufferMirror::default(),
            policy: CommentPolicy::default(),
            scope: StyleScope::default(),
            max_history: scribble_text::editor::DEFAULT_MAX_HISTORY,
        }
    }
}

/// Uniform editing surface.
pub trait EditorBackend: Send {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Replace the whole buffer and recompute decorations from scratch.
    fn set_text(&mut self, text: &str);

    /// Current buffer content.
    fn text(&self) -> &str;

    /// Re-mark comment lines under `policy`. Selections and history are kept.
    fn refresh_comments(&mut self, policy: &CommentPolicy);

    /// Repaint with `scope`. The buffer, selections, and history are kept.
    fn apply_theme(&mut self, scope: StyleScope);

    /// Toggle line comments over the current selection(s) using the
    /// current policy's prefix. `None` when nothing changed.
    fn toggle_comment_selection(&mut self) -> Option<ToggleAction>;

    /// Interpret a key event. Returns whether it was consumed.
    fn handle_key(&mut self, event: &KeyEvent) -> bool;

    /// Current selections; the fallback always has exactly one.
    fn selections(&self) -> Vec<Selection>;

    /// Replace all selections with one.
    fn set_selection(&mut self, selection: Selection);

    /// Policy from the last refresh.
    fn policy(&self) -> &CommentPolicy;

    /// Colors from the last theme application.
    fn style(&self) -> &StyleScope;

    /// Indices of lines currently marked as comments.
    fn commented_lines(&self) -> &[usize];

    /// Effective text color of every line.
    fn line_colors(&self) -> Vec<Rgb> {
        let marked = self.commented_lines();
        let style = self.style();
        self.text()
            .split('\n')
            .enumerate()
            .map(|(idx, _)| style.line_color(marked.binary_search(&idx).is_ok()))
            .collect()
    }

    /// Whether an undo step is available. Always `false` for the fallback.
    fn can_undo(&self) -> bool {
        false
    }
}

/// Decoration state both backends carry: the policy, the colors, and the
/// cached comment-line marks derived from them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Decorations {
    policy: CommentPolicy,
    scope: StyleScope,
    /// Sorted line indices.
    marked: Vec<usize>,
}

impl Decorations {
    pub(crate) fn new(policy: CommentPolicy, scope: StyleScope, text: &str) -> Self {
        let mut deco = Self {
            policy,
            scope,
            marked: Vec::new(),
        };
        deco.recompute(text);
        deco
    }

    pub(crate) fn recompute(&mut self, text: &str) {
        self.marked = self.policy.commented_lines(text);
    }

    /// Drop cached marks, then rebuild them for `text`.
    pub(crate) fn reset(&mut self, text: &str) {
        self.marked.clear();
        self.recompute(text);
    }

    pub(crate) fn set_policy(&mut self, policy: &CommentPolicy, text: &str) {
        self.policy = policy.clone();
        self.recompute(text);
    }

    pub(crate) fn set_scope(&mut self, scope: StyleScope) {
        self.scope = scope;
    }

    pub(crate) fn policy(&self) -> &CommentPolicy {
        &self.policy
    }

    pub(crate) fn scope(&self) -> &StyleScope {
        &self.scope
    }

    pub(crate) fn marked(&self) -> &[usize] {
        &self.marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribble_text::CommentMode;

    #[test]
    fn decorations_follow_policy() {
        let text = "// a\n  // b\nc";
        let mut deco = Decorations::new(CommentPolicy::default(), StyleScope::default(), text);
        assert_eq!(deco.marked(), &[0, 1]);

        deco.set_policy(&CommentPolicy::new("//", CommentMode::Strict), text);
        assert_eq!(deco.marked(), &[0]);

        deco.reset("plain");
        assert!(deco.marked().is_empty());
    }

    #[test]
    fn kind_names() {
        assert_eq!(BackendKind::Rich.as_str(), "rich");
        assert_eq!(BackendKind::Fallback.as_str(), "fallback");
    }
}
