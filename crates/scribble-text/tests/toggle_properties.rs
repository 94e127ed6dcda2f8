//! Cross-checks between the pure toggle, the editor's transactional toggle,
//! and the comment evaluator.

use proptest::prelude::*;
use scribble_text::{
    CommentMode, CommentPolicy, Editor, Selection, ToggleAction, is_commented, toggle_comment,
};

fn document() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z #/\t]{0,10}", 1..8).prop_map(|lines| lines.join("\n"))
}

#[test]
fn three_line_example() {
    let out = toggle_comment("a\nb\nc", 0, 3, "// ");
    assert_eq!(out.text, "// a\n// b\nc");
    let back = toggle_comment(&out.text, out.selection_start, out.selection_end, "// ");
    assert_eq!(back.text, "a\nb\nc");
}

#[test]
fn commented_block_is_colored_under_loose_policy() {
    let out = toggle_comment("x\n  y", 0, 5, "#");
    let policy = CommentPolicy::new("#", CommentMode::Loose);
    assert_eq!(policy.commented_lines(&out.text), vec![0, 1]);
}

proptest! {
    #[test]
    fn editor_toggle_agrees_with_pure_toggle(
        text in document(),
        a in 0usize..96,
        b in 0usize..96,
        prefix in "(//|#|-- )",
    ) {
        let expected = toggle_comment(&text, a, b, &prefix);

        let mut ed = Editor::with_text(&text);
        ed.set_selection(Selection::new(a, b));
        let action = ed.toggle_comments(&prefix);

        prop_assert_eq!(ed.text(), expected.text.as_str());
        prop_assert_eq!(action, Some(expected.action));
    }

    #[test]
    fn commenting_marks_every_block_line(
        text in document(),
        a in 0usize..96,
        b in 0usize..96,
    ) {
        let out = toggle_comment(&text, a, b, "//");
        if out.action == ToggleAction::Commented {
            let block = &out.text[out.selection_start..out.selection_end];
            for line in block.split('\n') {
                prop_assert!(is_commented(line, "//", CommentMode::Strict));
            }
        }
    }

    #[test]
    fn editor_toggle_undo_restores(
        text in document(),
        a in 0usize..96,
        b in 0usize..96,
    ) {
        let mut ed = Editor::with_text(&text);
        ed.set_selection(Selection::new(a, b));
        ed.toggle_comments("#");
        ed.undo();
        prop_assert_eq!(ed.text(), text.as_str());
    }
}
