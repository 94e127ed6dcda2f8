use std::sync::Arc;

use scribble_core::{KeyCode, KeyEvent};
use scribble_style::StyleScope;
use scribble_text::{CommentPolicy, Editor, Selection, ToggleAction};

use super::{BackendInit, BackendKind, Decorations, EditorBackend};
use crate::mirror::BufferMirror;
use crate::module::{ModuleCapabilities, RichModule};

/// Backend built on the rich module: multiple selections and undo history.
///
/// History is only kept when the module offers it. Replacing the text
/// through [`EditorBackend::set_text`] is itself undoable.
#[derive(Debug)]
pub struct RichBackend {
    module: Arc<RichModule>,
    editor: Editor,
    mirror: BufferMirror,
    deco: Decorations,
}

impl RichBackend {
    /// Build over `module`, seeding the buffer from the mirror.
    #[must_use]
    pub fn new(module: Arc<RichModule>, init: BackendInit) -> Self {
        let seed = init.mirror.seed();
        let mut editor = Editor::with_text(&seed);
        let history = if module.supports(ModuleCapabilities::HISTORY) {
            init.max_history
        } else {
            0
        };
        editor.set_max_history(history);
        let deco = Decorations::new(init.policy, init.scope, &seed);
        tracing::debug!(
            version = %module.version,
            origin = %module.origin,
            history,
            "rich backend ready"
        );
        Self {
            module,
            editor,
            mirror: init.mirror,
            deco,
        }
    }

    /// The module this backend was built on.
    #[must_use]
    pub fn module(&self) -> &RichModule {
        &self.module
    }

    /// The underlying editor.
    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Add a selection (ignored when the module lacks multi-selection).
    pub fn add_selection(&mut self, selection: Selection) -> bool {
        if !self.module.supports(ModuleCapabilities::MULTI_SELECTION) {
            return false;
        }
        self.editor.add_selection(selection);
        true
    }

    /// Undo the last edit.
    pub fn undo(&mut self) -> bool {
        let changed = self.editor.undo();
        if changed {
            self.after_edit();
        }
        changed
    }

    /// Redo the last undone edit.
    pub fn redo(&mut self) -> bool {
        let changed = self.editor.redo();
        if changed {
            self.after_edit();
        }
        changed
    }

    fn after_edit(&mut self) {
        self.deco.recompute(self.editor.text());
        self.mirror.write(self.editor.text());
    }

    fn edited(&mut self, changed: bool) -> bool {
        if changed {
            self.after_edit();
        }
        true
    }
}

impl EditorBackend for RichBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rich
    }

    fn set_text(&mut self, text: &str) {
        self.editor.replace_all(text);
        self.deco.reset(self.editor.text());
        self.mirror.write(self.editor.text());
    }

    fn text(&self) -> &str {
        self.editor.text()
    }

    fn refresh_comments(&mut self, policy: &CommentPolicy) {
        self.deco.set_policy(policy, self.editor.text());
    }

    fn apply_theme(&mut self, scope: StyleScope) {
        self.deco.set_scope(scope);
    }

    fn toggle_comment_selection(&mut self) -> Option<ToggleAction> {
        let prefix = self.deco.policy().prefix().to_string();
        let action = self.editor.toggle_comments(&prefix)?;
        self.after_edit();
        Some(action)
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
            let history = self.module.supports(ModuleCapabilities::HISTORY);
            match event.code {
                KeyCode::Char('z') if history && event.shift() => {
                    self.redo();
                }
                KeyCode::Char('z') if history => {
                    self.undo();
                }
                KeyCode::Char('y') if history => {
                    self.redo();
                }
                KeyCode::Char('a') => self.editor.select_all(),
                _ => return false,
            }
            return true;
        }
        match event.code {
            KeyCode::Char(ch) => {
                let changed = self.editor.insert_char(ch);
                self.edited(changed)
            }
            KeyCode::Tab => {
                let changed = self.editor.insert_char('\t');
                self.edited(changed)
            }
            KeyCode::Enter => {
                let changed = self.editor.insert_newline();
                self.edited(changed)
            }
            KeyCode::Backspace => {
                let changed = self.editor.delete_backward();
                self.edited(changed)
            }
            KeyCode::Delete => {
                let changed = self.editor.delete_forward();
                self.edited(changed)
            }
            KeyCode::Left => {
                self.editor.move_left();
                true
            }
            KeyCode::Right => {
                self.editor.move_right();
                true
            }
            KeyCode::Home => {
                self.editor.move_to_line_start();
                true
            }
            KeyCode::End => {
                self.editor.move_to_line_end();
                true
            }
            KeyCode::Escape => false,
        }
    }

    fn selections(&self) -> Vec<Selection> {
        self.editor.selections().to_vec()
    }

    fn set_selection(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
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

    fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribble_core::{HostField, Modifiers};
    use scribble_style::{Rgb, Theme};

    fn backend(text: &str) -> (RichBackend, HostField<String>) {
        let field = HostField::new(text.to_string());
        let init = BackendInit {
            mirror: BufferMirror::new(field.clone()),
            ..BackendInit::default()
        };
        (RichBackend::new(Arc::new(RichModule::bundled()), init), field)
    }

    #[test]
    fn seeds_from_host_and_marks_comments() {
        let (b, _) = backend("// a\nb");
        assert_eq!(b.text(), "// a\nb");
        assert_eq!(b.commented_lines(), &[0]);
    }

    #[test]
    fn typing_is_mirrored() {
        let (mut b, field) = backend("");
        for ch in "hi".chars() {
            assert!(b.handle_key(&KeyEvent::new(KeyCode::Char(ch))));
        }
        b.handle_key(&KeyEvent::new(KeyCode::Enter));
        assert_eq!(field.get(), "hi\n");
        b.handle_key(&KeyEvent::new(KeyCode::Backspace));
        assert_eq!(field.get(), "hi");
    }

    #[test]
    fn toggle_over_multiple_selections() {
        let (mut b, field) = backend("a\nb\nc\nd");
        b.set_selection(Selection::caret(0));
        assert!(b.add_selection(Selection::caret(4)));
        assert_eq!(b.toggle_comment_selection(), Some(ToggleAction::Commented));
        assert_eq!(field.get(), "//a\nb\n//c\nd");
        assert_eq!(b.commented_lines(), &[0, 2]);
    }

    #[test]
    fn undo_redo_chords() {
        let (mut b, field) = backend("x");
        b.handle_key(&KeyEvent::chord('/'));
        assert_eq!(field.get(), "//x");
        assert!(b.can_undo());

        b.handle_key(&KeyEvent::chord('z'));
        assert_eq!(field.get(), "x");
        assert!(b.commented_lines().is_empty());

        let redo = KeyEvent::new(KeyCode::Char('z'))
            .with_modifiers(Modifiers::platform() | Modifiers::SHIFT);
        b.handle_key(&redo);
        assert_eq!(field.get(), "//x");

        b.handle_key(&KeyEvent::chord('z'));
        b.handle_key(&KeyEvent::chord('y'));
        assert_eq!(b.text(), "//x");
    }

    #[test]
    fn module_without_history_keeps_none() {
        let module = RichModule {
            capabilities: ModuleCapabilities::DECORATIONS,
            ..RichModule::bundled()
        };
        let mut b = RichBackend::new(Arc::new(module), BackendInit::default());
        b.handle_key(&KeyEvent::new(KeyCode::Char('a')));
        assert!(!b.can_undo());
        assert!(!b.add_selection(Selection::caret(0)));
    }

    #[test]
    fn set_text_is_undoable_and_resets_marks() {
        let (mut b, field) = backend("// old");
        b.set_text("new");
        assert_eq!(field.get(), "new");
        assert!(b.commented_lines().is_empty());
        assert!(b.undo());
        assert_eq!(b.text(), "// old");
        assert_eq!(b.commented_lines(), &[0]);
    }

    #[test]
    fn theme_and_policy_changes_keep_history_and_selection() {
        let (mut b, _) = backend("a\n# b");
        b.handle_key(&KeyEvent::new(KeyCode::Char('!')));
        b.set_selection(Selection::new(0, 1));

        let red = Rgb::new(255, 0, 0);
        b.apply_theme(StyleScope::from_theme(&Theme::DEFAULT.with_comment(red)));
        b.refresh_comments(&CommentPolicy::new("#", scribble_text::CommentMode::Loose));

        assert!(b.can_undo());
        assert_eq!(b.selections(), vec![Selection::new(0, 1)]);
        assert_eq!(b.line_colors()[1], red);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut b, field) = backend("");
        let ev = KeyEvent::new(KeyCode::Char('q')).with_kind(scribble_core::KeyEventKind::Release);
        assert!(!b.handle_key(&ev));
        assert_eq!(field.get(), "");
    }
}
