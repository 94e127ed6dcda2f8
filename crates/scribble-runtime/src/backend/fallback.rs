use scribble_core::{KeyCode, KeyEvent};
use scribble_style::StyleScope;
use scribble_text::{CommentPolicy, Selection, ToggleAction, floor_boundary, toggle_comment};

use super::{BackendInit, BackendKind, Decorations, EditorBackend};
use crate::mirror::BufferMirror;

/// Plain text surface used when the rich module cannot be loaded.
///
/// One selection, no history, char-wise cursor movement. Comment marking
/// and toggling behave exactly as in the rich backend.
#[derive(Debug)]
pub struct FallbackBackend {
    text: String,
    selection: Selection,
    mirror: BufferMirror,
    deco: Decorations,
}

impl FallbackBackend {
    /// Build a fallback seeded from the mirror, caret at the end.
    #[must_use]
    pub fn new(init: BackendInit) -> Self {
        let text = init.mirror.seed();
        let deco = Decorations::new(init.policy, init.scope, &text);
        Self {
            selection: Selection::caret(text.len()),
            text,
            mirror: init.mirror,
            deco,
        }
    }

    fn commit(&mut self) {
        self.deco.recompute(&self.text);
        self.mirror.write(&self.text);
    }

    fn replace_selection(&mut self, insert: &str) -> bool {
        let range = self.selection.range();
        if range.is_empty() && insert.is_empty() {
            return false;
        }
        self.text.replace_range(range.clone(), insert);
        self.selection = Selection::caret(range.start + insert.len());
        self.commit();
        true
    }

    fn delete_range(&mut self, backward: bool) -> bool {
        if !self.selection.is_empty() {
            return self.replace_selection("");
        }
        let head = self.selection.head;
        let range = if backward {
            match self.text[..head].chars().next_back() {
                Some(ch) => head - ch.len_utf8()..head,
                None => return false,
            }
        } else {
            match self.text[head..].chars().next() {
                Some(ch) => head..head + ch.len_utf8(),
                None => return false,
            }
        };
        self.selection = Selection::new(range.start, range.end);
        self.replace_selection("")
    }

    fn move_caret(&mut self, to: usize) {
        self.selection = Selection::caret(floor_boundary(&self.text, to));
    }
}

impl EditorBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.selection = Selection::caret(self.text.len());
        self.deco.reset(&self.text);
        self.mirror.write(&self.text);
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn refresh_comments(&mut self, policy: &CommentPolicy) {
        self.deco.set_policy(policy, &self.text);
    }

    fn apply_theme(&mut self, scope: StyleScope) {
        self.deco.set_scope(scope);
    }

    fn toggle_comment_selection(&mut self) -> Option<ToggleAction> {
        let out = toggle_comment(
            &self.text,
            self.selection.start(),
            self.selection.end(),
            self.deco.policy().prefix(),
        );
        if out.action == ToggleAction::Unchanged || out.text == self.text {
            return None;
        }
        self.text = out.text;
        self.selection = Selection::new(out.selection_start, out.selection_end);
        self.commit();
        Some(out.action)
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if !event.is_actionable() {
            return false;
        }
        if event.is_toggle_comment() {
            self.toggle_comment_selection();
            return true;
        }
        if event.mod_key() {
            return false;
        }
        let head = self.selection.head;
        match event.code {
            KeyCode::Char(ch) => {
                let mut buf = [0u8; 4];
                self.replace_selection(ch.encode_utf8(&mut buf));
            }
            KeyCode::Tab => {
                self.replace_selection("\t");
            }
            KeyCode::Enter => {
                self.replace_selection("\n");
            }
            KeyCode::Backspace => {
                self.delete_range(true);
            }
            KeyCode::Delete => {
                self.delete_range(false);
            }
            KeyCode::Left => {
                let to = if self.selection.is_empty() {
                    self.text[..head]
                        .chars()
                        .next_back()
                        .map_or(head, |ch| head - ch.len_utf8())
                } else {
                    self.selection.start()
                };
                self.move_caret(to);
            }
            KeyCode::Right => {
                let to = if self.selection.is_empty() {
                    self.text[head..]
                        .chars()
                        .next()
                        .map_or(head, |ch| head + ch.len_utf8())
                } else {
                    self.selection.end()
                };
                self.move_caret(to);
            }
            KeyCode::Home => {
                let to = self.text[..head].rfind('\n').map_or(0, |i| i + 1);
                self.move_caret(to);
            }
            KeyCode::End => {
                let to = self.text[head..]
                    .find('\n')
                    .map_or(self.text.len(), |i| head + i);
                self.move_caret(to);
            }
            KeyCode::Escape => return false,
        }
        true
    }

    fn selections(&self) -> Vec<Selection> {
        vec![self.selection]
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(
            floor_boundary(&self.text, selection.anchor),
            floor_boundary(&self.text, selection.head),
        );
    }

    fn policy(&self) -> &CommentPolicy {
        self.deco.policy()
    }

    fn style(&self) -> &StyleScope {
        self.deco.scope()
    }

    fn commented_lines(&self) -> &[usize] {
        self.deco.marked()
    }
}
