#![forbid(unsafe_code)]

//! Line comment toggling over a selection.
//!
//! The selection is widened to whole lines, then the block is either
//! commented (prefix prepended to every line) or uncommented (first
//! occurrence of the prefix removed from every line).
//!
//! The "already commented" test always uses the loose rule: a line counts
//! when its whitespace-trimmed text starts with the prefix. This holds even
//! when the active coloring policy is strict, so a block indented under a
//! strict policy still uncomments on the second toggle.
//!
//! Offsets are byte offsets into UTF-8 text. Out-of-range or mid-character
//! offsets are clamped down to the nearest character boundary.

use std::ops::Range;

/// What a toggle did to the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Prefix prepended to every line.
    Commented,
    /// First prefix occurrence removed from every line.
    Uncommented,
    /// Nothing changed (empty prefix).
    Unchanged,
}

/// Result of [`toggle_comment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The full rewritten text.
    pub text: String,
    /// Start of the rewritten block.
    pub selection_start: usize,
    /// End of the rewritten block.
    pub selection_end: usize,
    /// What happened.
    pub action: ToggleAction,
}

/// Clamp `pos` into `text` and down to a character boundary.
#[must_use]
pub fn floor_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Byte range of the whole lines touched by `start..end`.
///
/// Runs from the start of the line containing `start` to the end of the line
/// containing `end` (excluding its line break), or the end of the document.
#[must_use]
pub fn line_block(text: &str, start: usize, end: usize) -> Range<usize> {
    let (start, end) = ordered(text, start, end);
    let block_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let block_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    block_start..block_end
}

/// Whether every line of `block` starts with `prefix` after its indentation.
#[must_use]
pub fn all_commented(block: &str, prefix: &str) -> bool {
    block
        .split('\n')
        .all(|line| line.trim_start().starts_with(prefix))
}

/// Toggle a block of whole lines, returning the rewritten block.
#[must_use]
pub fn toggle_block(block: &str, prefix: &str) -> (String, ToggleAction) {
    if prefix.is_empty() {
        return (block.to_string(), ToggleAction::Unchanged);
    }
    let all_commented = all_commented(block, prefix);

    let lines: Vec<String> = if all_commented {
        block
            .split('\n')
            .map(|line| line.replacen(prefix, "", 1))
            .collect()
    } else {
        block
            .split('\n')
            .map(|line| format!("{prefix}{line}"))
            .collect()
    };
    let action = if all_commented {
        ToggleAction::Uncommented
    } else {
        ToggleAction::Commented
    };
    (lines.join("\n"), action)
}

/// Toggle line comments for the lines touched by `start..end`.
///
/// The returned selection spans the rewritten block, so feeding it back in
/// toggles the same lines again.
#[must_use]
pub fn toggle_comment(text: &str, start: usize, end: usize, prefix: &str) -> ToggleOutcome {
    let block = line_block(text, start, end);
    let (rewritten, action) = toggle_block(&text[block.clone()], prefix);

    let mut out = String::with_capacity(text.len() + rewritten.len());
    out.push_str(&text[..block.start]);
    out.push_str(&rewritten);
    out.push_str(&text[block.end..]);

    tracing::trace!(
        block_start = block.start,
        block_end = block.end,
        ?action,
        "comment toggle"
    );

    ToggleOutcome {
        selection_start: block.start,
        selection_end: block.start + rewritten.len(),
        text: out,
        action,
    }
}

fn ordered(text: &str, a: usize, b: usize) -> (usize, usize) {
    let a = floor_boundary(text, a);
    let b = floor_boundary(text, b);
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn comments_selected_lines_only() {
        let out = toggle_comment("a\nb\nc", 0, 3, "// ");
        assert_eq!(out.text, "// a\n// b\nc");
        assert_eq!(out.action, ToggleAction::Commented);
        assert_eq!((out.selection_start, out.selection_end), (0, 9));
    }

    #[test]
    fn second_toggle_restores() {
        let first = toggle_comment("a\nb\nc", 0, 3, "// ");
        let second = toggle_comment(&first.text, first.selection_start, first.selection_end, "// ");
        assert_eq!(second.text, "a\nb\nc");
        assert_eq!(second.action, ToggleAction::Uncommented);
        assert_eq!((second.selection_start, second.selection_end), (0, 3));
    }

    #[test]
    fn caret_toggles_its_line() {
        let out = toggle_comment("one\ntwo\nthree", 5, 5, "#");
        assert_eq!(out.text, "one\n#two\nthree");
        assert_eq!((out.selection_start, out.selection_end), (4, 8));
    }

    #[test]
    fn mixed_block_gets_commented() {
        let out = toggle_comment("// a\nb", 0, 6, "//");
        assert_eq!(out.text, "//// a\n//b");
        assert_eq!(out.action, ToggleAction::Commented);
    }

    #[test]
    fn uncomment_removes_first_occurrence_after_indent() {
        let out = toggle_comment("  // a // b\n// c", 0, 14, "//");
        assert_eq!(out.text, "   a // b\n c");
    }

    #[test]
    fn indented_lines_count_as_commented_even_for_strict_coloring() {
        let out = toggle_comment("    // x", 0, 0, "//");
        assert_eq!(out.action, ToggleAction::Uncommented);
        assert_eq!(out.text, "     x");
    }

    #[test]
    fn empty_line_in_block_forces_comment() {
        let out = toggle_comment("// a\n\n// b", 0, 10, "//");
        assert_eq!(out.text, "//// a\n//\n//// b");
    }

    #[test]
    fn reversed_and_out_of_range_offsets_are_clamped() {
        let out = toggle_comment("a\nb", 99, 0, "-");
        assert_eq!(out.text, "-a\n-b");
    }

    #[test]
    fn mid_character_offsets_snap_to_boundary() {
        let text = "é\nb";
        let out = toggle_comment(text, 1, 1, "#");
        assert_eq!(out.text, "#é\nb");
    }

    #[test]
    fn empty_prefix_is_noop() {
        let out = toggle_comment("a\nb", 0, 3, "");
        assert_eq!(out.text, "a\nb");
        assert_eq!(out.action, ToggleAction::Unchanged);
    }

    #[test]
    fn selection_ending_at_line_start_includes_that_line() {
        let out = toggle_comment("a\nb\nc", 0, 4, "#");
        assert_eq!(out.text, "#a\n#b\n#c");
    }

    #[test]
    fn trailing_newline_is_preserved() {
        let out = toggle_comment("a\n", 0, 0, "#");
        assert_eq!(out.text, "#a\n");
    }

    #[test]
    fn line_block_bounds() {
        let text = "ab\ncd\nef";
        assert_eq!(line_block(text, 4, 4), 3..5);
        assert_eq!(line_block(text, 1, 7), 0..8);
        assert_eq!(line_block("", 0, 0), 0..0);
    }

    proptest! {
        #[test]
        fn comment_then_uncomment_restores_text(
            lines in proptest::collection::vec("[a-z /#]{0,8}", 1..6),
            a in 0usize..64,
            b in 0usize..64,
            prefix in "(//|#|-- |;)",
        ) {
            let text = lines.join("\n");
            let first = toggle_comment(&text, a, b, &prefix);
            prop_assume!(first.action == ToggleAction::Commented);
            let second = toggle_comment(&first.text, first.selection_start, first.selection_end, &prefix);
            prop_assert_eq!(second.action, ToggleAction::Uncommented);
            prop_assert_eq!(second.text, text);
        }

        #[test]
        fn text_outside_block_is_untouched(
            lines in proptest::collection::vec("[a-z #]{0,8}", 1..6),
            a in 0usize..64,
            b in 0usize..64,
        ) {
            let text = lines.join("\n");
            let block = line_block(&text, a, b);
            let out = toggle_comment(&text, a, b, "#");
            prop_assert_eq!(&out.text[..block.start], &text[..block.start]);
            prop_assert_eq!(&out.text[out.selection_end..], &text[block.end..]);
        }
    }
}
