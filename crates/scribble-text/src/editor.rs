#![forbid(unsafe_code)]

//! Multi-selection text buffer with transactional undo.
//!
//! [`Editor`] owns the document as a `String` plus one or more
//! [`Selection`]s. Every edit is a transaction: a sorted list of
//! non-overlapping [`Change`]s applied at once, with selections mapped
//! through them. Undo and redo replay the inverse transaction and restore the
//! selections that were live before it.
//!
//! Offsets are byte offsets. Callers may pass any offset; it is clamped to the
//! document and snapped to a character boundary.
//!
//! # Example
//! ```
//! use scribble_text::{Editor, Selection};
//!
//! let mut ed = Editor::with_text("a\nb\nc");
//! ed.set_selection(Selection::new(0, 3));
//! ed.toggle_comments("// ");
//! assert_eq!(ed.text(), "// a\n// b\nc");
//!
//! ed.undo();
//! assert_eq!(ed.text(), "a\nb\nc");
//! ```

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::toggle::{ToggleAction, all_commented, floor_boundary, line_block};

/// Default undo depth.
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// A selection: `anchor` stays put, `head` moves with the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    /// The fixed end.
    pub anchor: usize,
    /// The moving end (the caret).
    pub head: usize,
}

impl Selection {
    /// Selection from `anchor` to `head`.
    #[must_use]
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Empty selection at `pos`.
    #[must_use]
    pub const fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Lower bound.
    #[must_use]
    pub const fn start(&self) -> usize {
        if self.anchor <= self.head {
            self.anchor
        } else {
            self.head
        }
    }

    /// Upper bound.
    #[must_use]
    pub const fn end(&self) -> usize {
        if self.anchor <= self.head {
            self.head
        } else {
            self.anchor
        }
    }

    /// `start..end`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Whether anchor and head coincide.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Replace `start..end` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    /// First replaced byte.
    pub start: usize,
    /// One past the last replaced byte.
    pub end: usize,
    /// Replacement text.
    pub insert: String,
}

impl Change {
    /// Pure insertion at `at`.
    #[must_use]
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            insert: text.into(),
        }
    }

    /// Pure deletion of `range`.
    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            insert: String::new(),
        }
    }

    /// Replace `range` with `text`.
    #[must_use]
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            insert: text.into(),
        }
    }
}

/// How selections follow a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Follow {
    /// Collapse each selection to a caret after any text inserted at it.
    Caret,
    /// Keep ranges; text inserted exactly at an endpoint lands after it.
    Range,
}

#[derive(Debug, Clone)]
struct Transaction {
    /// Changes that undo (or redo) the edit, in post-edit coordinates.
    changes: Vec<Change>,
    /// Selections to restore.
    selections: Vec<Selection>,
}

/// Text buffer with multiple selections and undo history.
#[derive(Debug, Clone)]
pub struct Editor {
    text: String,
    /// Never empty.
    selections: Vec<Selection>,
    primary: usize,
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    max_history: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an empty editor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Create an editor with initial text. The caret starts at the end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            selections: vec![Selection::caret(text.len())],
            primary: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    /// Set the maximum undo depth, dropping the oldest entries beyond it.
    pub fn set_max_history(&mut self, max: usize) {
        self.max_history = max;
        let excess = self.undo_stack.len().saturating_sub(max);
        self.undo_stack.drain(..excess);
    }

    /// The document.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines (an empty document has one).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Text of line `line` without its line break.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.text
            .split('\n')
            .nth(line)
            .map(|l| l.trim_end_matches('\r'))
    }

    /// All selections in document order.
    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// The selection keyboard movement and typing report against.
    #[must_use]
    pub fn primary_selection(&self) -> Selection {
        self.selections
            .get(self.primary)
            .copied()
            .unwrap_or_default()
    }

    /// Head of the primary selection.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.primary_selection().head
    }

    /// Replace all selections with one caret at `pos`.
    pub fn set_cursor(&mut self, pos: usize) {
        self.set_selection(Selection::caret(pos));
    }

    /// Replace all selections with `sel`.
    pub fn set_selection(&mut self, sel: Selection) {
        self.selections = vec![self.clamp_selection(sel)];
        self.primary = 0;
    }

    /// Replace all selections. `primary` indexes into `selections`; an empty
    /// list leaves a caret at the start of the document.
    pub fn set_selections(&mut self, selections: Vec<Selection>, primary: usize) {
        if selections.is_empty() {
            self.set_cursor(0);
            return;
        }
        let primary_sel = selections
            .get(primary)
            .copied()
            .unwrap_or(selections[0]);
        self.selections = selections
            .into_iter()
            .map(|s| self.clamp_selection(s))
            .collect();
        self.normalize_selections(self.clamp_selection(primary_sel));
    }

    /// Add a selection and make it primary.
    pub fn add_selection(&mut self, sel: Selection) {
        let sel = self.clamp_selection(sel);
        self.selections.push(sel);
        self.normalize_selections(sel);
    }

    /// Select the whole document.
    pub fn select_all(&mut self) {
        self.set_selection(Selection::new(0, self.text.len()));
    }

    /// Text under the primary selection, if non-empty.
    #[must_use]
    pub fn selected_text(&self) -> Option<&str> {
        let sel = self.primary_selection();
        if sel.is_empty() {
            None
        } else {
            self.text.get(sel.range())
        }
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable transactions.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    // ====================================================================
    // Editing
    // ====================================================================

    /// Insert a character at every selection.
    pub fn insert_char(&mut self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut buf))
    }

    /// Insert a line break at every selection.
    pub fn insert_newline(&mut self) -> bool {
        self.insert_text("\n")
    }

    /// Replace every selection with `text`, leaving carets after it.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let changes = self
            .selections
            .iter()
            .map(|sel| Change::replace(sel.range(), text))
            .collect();
        self.transact(changes, Follow::Caret)
    }

    /// Backspace: delete each non-empty selection, or the grapheme before
    /// each caret.
    pub fn delete_backward(&mut self) -> bool {
        let changes = self
            .selections
            .iter()
            .filter_map(|sel| {
                if !sel.is_empty() {
                    return Some(Change::delete(sel.range()));
                }
                let prev = prev_grapheme(&self.text, sel.head);
                (prev < sel.head).then(|| Change::delete(prev..sel.head))
            })
            .collect();
        self.transact(changes, Follow::Caret)
    }

    /// Delete key: delete each non-empty selection, or the grapheme after
    /// each caret.
    pub fn delete_forward(&mut self) -> bool {
        let changes = self
            .selections
            .iter()
            .filter_map(|sel| {
                if !sel.is_empty() {
                    return Some(Change::delete(sel.range()));
                }
                let next = next_grapheme(&self.text, sel.head);
                (next > sel.head).then(|| Change::delete(sel.head..next))
            })
            .collect();
        self.transact(changes, Follow::Caret)
    }

    /// Replace the whole document as one undoable edit.
    pub fn replace_all(&mut self, text: &str) -> bool {
        let change = Change::replace(0..self.text.len(), text);
        self.transact(vec![change], Follow::Caret)
    }

    /// Apply caller-built changes as one undoable transaction.
    ///
    /// Offsets refer to the current document. Overlapping changes after the
    /// first are dropped. Returns `false` when nothing changed.
    pub fn apply(&mut self, changes: Vec<Change>) -> bool {
        self.transact(changes, Follow::Range)
    }

    /// Toggle line comments for every selection.
    ///
    /// Each selection is widened to whole lines; blocks that touch the same
    /// lines are merged. A block whose lines all start with `prefix` (after
    /// indentation) loses the first occurrence of `prefix` on every line;
    /// any other block gets `prefix` prepended to every line.
    ///
    /// Returns `None` when nothing changed. With several blocks the result is
    /// [`ToggleAction::Commented`] if any block was commented.
    pub fn toggle_comments(&mut self, prefix: &str) -> Option<ToggleAction> {
        if prefix.is_empty() {
            return None;
        }
        let mut blocks: Vec<Range<usize>> = self
            .selections
            .iter()
            .map(|sel| line_block(&self.text, sel.start(), sel.end()))
            .collect();
        blocks.sort_by_key(|b| b.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last) if block.start <= last.end => last.end = last.end.max(block.end),
                _ => merged.push(block),
            }
        }

        let mut changes = Vec::new();
        let mut commented_any = false;
        for block in merged {
            let body = &self.text[block.clone()];
            let uncomment = all_commented(body, prefix);
            commented_any |= !uncomment;
            let mut line_start = block.start;
            for line in body.split('\n') {
                if uncomment {
                    if let Some(idx) = line.find(prefix) {
                        let at = line_start + idx;
                        changes.push(Change::delete(at..at + prefix.len()));
                    }
                } else {
                    changes.push(Change::insert(line_start, prefix));
                }
                line_start += line.len() + 1;
            }
        }

        if !self.transact(changes, Follow::Range) {
            return None;
        }
        let action = if commented_any {
            ToggleAction::Commented
        } else {
            ToggleAction::Uncommented
        };
        tracing::trace!(?action, selections = self.selections.len(), "toggled comments");
        Some(action)
    }

    // ====================================================================
    // Undo / redo
    // ====================================================================

    /// Undo the last transaction.
    pub fn undo(&mut self) -> bool {
        let Some(tx) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::take(&mut self.selections);
        let inverse = self.apply_raw(&tx.changes);
        self.redo_stack.push(Transaction {
            changes: inverse,
            selections: current,
        });
        self.restore_selections(tx.selections);
        true
    }

    /// Redo the last undone transaction.
    pub fn redo(&mut self) -> bool {
        let Some(tx) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::take(&mut self.selections);
        let inverse = self.apply_raw(&tx.changes);
        self.undo_stack.push(Transaction {
            changes: inverse,
            selections: current,
        });
        self.restore_selections(tx.selections);
        true
    }

    // ====================================================================
    // Cursor movement (collapses selections)
    // ====================================================================

    /// Move every caret left by one grapheme.
    pub fn move_left(&mut self) {
        self.move_each(|text, sel| {
            if sel.is_empty() {
                prev_grapheme(text, sel.head)
            } else {
                sel.start()
            }
        });
    }

    /// Move every caret right by one grapheme.
    pub fn move_right(&mut self) {
        self.move_each(|text, sel| {
            if sel.is_empty() {
                next_grapheme(text, sel.head)
            } else {
                sel.end()
            }
        });
    }

    /// Move every caret to the start of its line.
    pub fn move_to_line_start(&mut self) {
        self.move_each(|text, sel| line_block(text, sel.head, sel.head).start);
    }

    /// Move every caret to the end of its line.
    pub fn move_to_line_end(&mut self) {
        self.move_each(|text, sel| line_block(text, sel.head, sel.head).end);
    }

    /// Single caret at the start of the document.
    pub fn move_to_document_start(&mut self) {
        self.set_cursor(0);
    }

    /// Single caret at the end of the document.
    pub fn move_to_document_end(&mut self) {
        self.set_cursor(self.text.len());
    }

    // ====================================================================
    // Content replacement
    // ====================================================================

    /// Replace all content, put the caret at the end, and clear history.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.selections = vec![Selection::caret(self.text.len())];
        self.primary = 0;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Empty the document and clear history.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn transact(&mut self, changes: Vec<Change>, follow: Follow) -> bool {
        let changes = self.normalize_changes(changes);
        if changes.is_empty() {
            return false;
        }
        let mapped: Vec<Selection> = self
            .selections
            .iter()
            .map(|sel| match follow {
                Follow::Caret => Selection::caret(map_pos(&changes, sel.head, true)),
                Follow::Range => Selection::new(
                    map_pos(&changes, sel.anchor, sel.anchor > sel.head),
                    map_pos(&changes, sel.head, sel.head > sel.anchor),
                ),
            })
            .collect();
        let primary = mapped.get(self.primary).copied().unwrap_or_default();
        let before = std::mem::replace(&mut self.selections, mapped);

        let inverse = self.apply_raw(&changes);
        self.undo_stack.push(Transaction {
            changes: inverse,
            selections: before,
        });
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.normalize_selections(primary);
        true
    }

    /// Apply sorted, non-overlapping changes; return their inverse.
    fn apply_raw(&mut self, changes: &[Change]) -> Vec<Change> {
        let mut inverse = Vec::with_capacity(changes.len());
        let mut added = 0usize;
        let mut removed = 0usize;
        for change in changes {
            let start = change.start + added - removed;
            inverse.push(Change::replace(
                start..start + change.insert.len(),
                &self.text[change.start..change.end],
            ));
            added += change.insert.len();
            removed += change.end - change.start;
        }
        for change in changes.iter().rev() {
            self.text
                .replace_range(change.start..change.end, &change.insert);
        }
        inverse
    }

    fn normalize_changes(&self, changes: Vec<Change>) -> Vec<Change> {
        let mut changes: Vec<Change> = changes
            .into_iter()
            .map(|mut c| {
                let a = floor_boundary(&self.text, c.start);
                let b = floor_boundary(&self.text, c.end);
                (c.start, c.end) = if a <= b { (a, b) } else { (b, a) };
                c
            })
            .filter(|c| self.text[c.start..c.end] != *c.insert)
            .collect();
        changes.sort_by_key(|c| (c.start, c.end));

        let mut out: Vec<Change> = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some(last) = out.last()
                && change.start < last.end
            {
                tracing::debug!(
                    start = change.start,
                    end = change.end,
                    "dropping overlapping change"
                );
                continue;
            }
            out.push(change);
        }
        out
    }

    fn clamp_selection(&self, sel: Selection) -> Selection {
        Selection::new(
            floor_boundary(&self.text, sel.anchor),
            floor_boundary(&self.text, sel.head),
        )
    }

    fn restore_selections(&mut self, selections: Vec<Selection>) {
        let selections: Vec<Selection> = selections
            .into_iter()
            .map(|s| self.clamp_selection(s))
            .collect();
        let primary = selections.last().copied().unwrap_or_default();
        self.selections = selections;
        self.normalize_selections(primary);
    }

    /// Sort, merge overlapping selections, and re-find the primary one.
    fn normalize_selections(&mut self, primary: Selection) {
        if self.selections.is_empty() {
            self.selections.push(Selection::caret(0));
        }
        self.selections.sort_by_key(|s| (s.start(), s.end()));
        let mut merged: Vec<Selection> = Vec::with_capacity(self.selections.len());
        for sel in self.selections.drain(..) {
            match merged.last_mut() {
                Some(last) if sel == *last => {}
                Some(last)
                    if sel.start() < last.end()
                        || (sel.is_empty() && last.is_empty() && sel.head == last.head) =>
                {
                    *last = Selection::new(last.start(), last.end().max(sel.end()));
                }
                _ => merged.push(sel),
            }
        }
        self.primary = merged
            .iter()
            .position(|s| *s == primary)
            .or_else(|| {
                merged
                    .iter()
                    .position(|s| s.range().contains(&primary.head) || s.end() == primary.head)
            })
            .unwrap_or(0);
        self.selections = merged;
    }

    fn move_each(&mut self, f: impl Fn(&str, &Selection) -> usize) {
        let primary = self.primary_selection();
        let moved_primary = Selection::caret(f(&self.text, &primary));
        self.selections = self
            .selections
            .iter()
            .map(|sel| Selection::caret(f(&self.text, sel)))
            .collect();
        self.normalize_selections(moved_primary);
    }
}

/// Map `pos` through sorted, non-overlapping `changes`.
///
/// `after` decides where a position sitting exactly at an insertion (or
/// inside a replaced range) lands: after the new text or before it.
fn map_pos(changes: &[Change], pos: usize, after: bool) -> usize {
    let mut added = 0usize;
    let mut removed = 0usize;
    for change in changes {
        if pos < change.start {
            break;
        }
        let inserted = change.insert.len();
        if pos > change.end {
            added += inserted;
            removed += change.end - change.start;
            continue;
        }
        let base = change.start + added - removed;
        let at_end = pos == change.end && change.start < change.end;
        return if at_end || after { base + inserted } else { base };
    }
    pos + added - removed
}

fn prev_grapheme(text: &str, pos: usize) -> usize {
    let pos = floor_boundary(text, pos);
    text[..pos]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(i, _)| i)
}

fn next_grapheme(text: &str, pos: usize) -> usize {
    let pos = floor_boundary(text, pos);
    text[pos..]
        .graphemes(true)
        .next()
        .map_or(pos, |g| pos + g.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_editor_is_empty() {
        let ed = Editor::new();
        assert!(ed.is_empty());
        assert_eq!(ed.text(), "");
        assert_eq!(ed.cursor(), 0);
        assert_eq!(ed.line_count(), 1);
    }

    #[test]
    fn with_text_cursor_at_end() {
        let ed = Editor::with_text("hello\nworld");
        assert_eq!(ed.cursor(), 11);
        assert_eq!(ed.line_count(), 2);
        assert_eq!(ed.line_text(1), Some("world"));
        assert_eq!(ed.line_text(2), None);
    }

    #[test]
    fn typing_replaces_selection() {
        let mut ed = Editor::with_text("hello world");
        ed.set_selection(Selection::new(6, 11));
        assert!(ed.insert_text("there"));
        assert_eq!(ed.text(), "hello there");
        assert_eq!(ed.primary_selection(), Selection::caret(11));
    }

    #[test]
    fn typing_at_every_caret() {
        let mut ed = Editor::with_text("ab\ncd");
        ed.set_selections(vec![Selection::caret(0), Selection::caret(3)], 0);
        ed.insert_char('>');
        assert_eq!(ed.text(), ">ab\n>cd");
        assert_eq!(
            ed.selections(),
            &[Selection::caret(1), Selection::caret(5)]
        );
    }

    #[test]
    fn delete_backward_joins_lines() {
        let mut ed = Editor::with_text("hello\nworld");
        ed.set_cursor(6);
        assert!(ed.delete_backward());
        assert_eq!(ed.text(), "helloworld");
        assert_eq!(ed.cursor(), 5);
    }

    #[test]
    fn delete_backward_at_beginning() {
        let mut ed = Editor::with_text("hello");
        ed.set_cursor(0);
        assert!(!ed.delete_backward());
        assert!(!ed.can_undo());
    }

    #[test]
    fn delete_backward_removes_whole_grapheme() {
        let mut ed = Editor::with_text("ae\u{301}");
        assert!(ed.delete_backward());
        assert_eq!(ed.text(), "a");
    }

    #[test]
    fn delete_forward_at_end() {
        let mut ed = Editor::with_text("hello");
        assert!(!ed.delete_forward());
        ed.set_cursor(0);
        assert!(ed.delete_forward());
        assert_eq!(ed.text(), "ello");
    }

    #[test]
    fn undo_redo_restore_text_and_selection() {
        let mut ed = Editor::with_text("abc");
        ed.set_selection(Selection::new(0, 1));
        ed.insert_text("X");
        assert_eq!(ed.text(), "Xbc");

        assert!(ed.undo());
        assert_eq!(ed.text(), "abc");
        assert_eq!(ed.primary_selection(), Selection::new(0, 1));

        assert!(ed.redo());
        assert_eq!(ed.text(), "Xbc");
        assert_eq!(ed.cursor(), 1);
        assert!(!ed.redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut ed = Editor::with_text("");
        ed.insert_text("a");
        ed.undo();
        assert!(ed.can_redo());
        ed.insert_text("b");
        assert!(!ed.can_redo());
    }

    #[test]
    fn history_is_bounded() {
        let mut ed = Editor::new();
        ed.set_max_history(2);
        for ch in ['a', 'b', 'c'] {
            ed.insert_char(ch);
        }
        assert_eq!(ed.undo_depth(), 2);
        assert!(ed.undo());
        assert!(ed.undo());
        assert!(!ed.undo());
        assert_eq!(ed.text(), "a");
    }

    #[test]
    fn set_text_clears_history() {
        let mut ed = Editor::new();
        ed.insert_text("a");
        ed.set_text("fresh");
        assert!(!ed.can_undo());
        assert_eq!(ed.cursor(), 5);
    }

    #[test]
    fn replace_all_is_undoable() {
        let mut ed = Editor::with_text("old");
        assert!(ed.replace_all("new text"));
        assert_eq!(ed.text(), "new text");
        ed.undo();
        assert_eq!(ed.text(), "old");
        assert!(!ed.replace_all("old"));
    }

    #[test]
    fn toggle_comments_matches_block_toggle() {
        let mut ed = Editor::with_text("a\nb\nc");
        ed.set_selection(Selection::new(0, 3));
        assert_eq!(ed.toggle_comments("// "), Some(ToggleAction::Commented));
        assert_eq!(ed.text(), "// a\n// b\nc");
        assert_eq!(ed.primary_selection(), Selection::new(0, 9));

        assert_eq!(ed.toggle_comments("// "), Some(ToggleAction::Uncommented));
        assert_eq!(ed.text(), "a\nb\nc");
        assert_eq!(ed.primary_selection(), Selection::new(0, 3));
    }

    #[test]
    fn toggle_comments_per_selection_block() {
        let mut ed = Editor::with_text("// a\nb\n// c");
        ed.set_selections(vec![Selection::caret(1), Selection::caret(6)], 0);
        assert_eq!(ed.toggle_comments("// "), Some(ToggleAction::Commented));
        assert_eq!(ed.text(), "a\n// b\n// c");
    }

    #[test]
    fn toggle_comments_merges_shared_lines() {
        let mut ed = Editor::with_text("x\ny");
        ed.set_selections(vec![Selection::caret(0), Selection::new(1, 3)], 0);
        ed.toggle_comments("#");
        assert_eq!(ed.text(), "#x\n#y");
    }

    #[test]
    fn toggle_comments_uncomments_indented_lines() {
        let mut ed = Editor::with_text("  // a\n\t// b");
        ed.select_all();
        assert_eq!(ed.toggle_comments("//"), Some(ToggleAction::Uncommented));
        assert_eq!(ed.text(), "   a\n\t b");
    }

    #[test]
    fn toggle_is_one_undo_step() {
        let mut ed = Editor::with_text("a\nb");
        ed.select_all();
        ed.toggle_comments("#");
        assert_eq!(ed.undo_depth(), 1);
        ed.undo();
        assert_eq!(ed.text(), "a\nb");
    }

    #[test]
    fn empty_prefix_toggle_is_noop() {
        let mut ed = Editor::with_text("a");
        assert_eq!(ed.toggle_comments(""), None);
        assert!(!ed.can_undo());
    }

    #[test]
    fn apply_drops_overlaps_and_clamps() {
        let mut ed = Editor::with_text("abcdef");
        let applied = ed.apply(vec![
            Change::replace(1..3, "X"),
            Change::delete(2..4),
            Change::insert(99, "!"),
        ]);
        assert!(applied);
        assert_eq!(ed.text(), "aXdef!");
    }

    #[test]
    fn offsets_snap_to_char_boundaries() {
        let mut ed = Editor::with_text("é");
        ed.set_cursor(1);
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn movement_collapses_and_clamps() {
        let mut ed = Editor::with_text("ab\ncd");
        ed.set_selection(Selection::new(1, 4));
        ed.move_left();
        assert_eq!(ed.primary_selection(), Selection::caret(1));
        ed.move_to_line_end();
        assert_eq!(ed.cursor(), 2);
        ed.move_right();
        ed.move_right();
        ed.move_to_line_end();
        assert_eq!(ed.cursor(), 5);
        ed.move_right();
        assert_eq!(ed.cursor(), 5);
        ed.move_to_line_start();
        assert_eq!(ed.cursor(), 3);
        ed.move_to_document_start();
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn overlapping_selections_merge() {
        let mut ed = Editor::with_text("abcdef");
        ed.set_selections(vec![Selection::new(0, 3), Selection::new(2, 5)], 1);
        assert_eq!(ed.selections(), &[Selection::new(0, 5)]);
        assert_eq!(ed.selected_text(), Some("abcde"));
    }

    #[test]
    fn map_pos_assoc() {
        let changes = vec![Change::insert(2, "xx")];
        assert_eq!(map_pos(&changes, 2, false), 2);
        assert_eq!(map_pos(&changes, 2, true), 4);
        assert_eq!(map_pos(&changes, 5, false), 7);
        let del = vec![Change::delete(1..4)];
        assert_eq!(map_pos(&del, 2, false), 1);
        assert_eq!(map_pos(&del, 4, false), 1);
        assert_eq!(map_pos(&del, 6, false), 3);
    }
}
