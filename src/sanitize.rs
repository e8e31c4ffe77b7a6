//! Normalization of raw model output into one short terminal line.

/// Hard cap on the sanitized length, in characters
pub const MAX_CHARS: usize = 150;

/// Sentence breaks at or before this character index are too early to cut at
const MIN_SENTENCE_CUT: usize = 50;

/// Labels models like to put in front of the answer
const LABEL_PREFIXES: [&str; 3] = ["Response:", "Parrot says:", "🦜"];

/// Normalize raw model output.
///
/// Runs the cleanup pass until it stops changing the text, so the result is
/// stable under re-sanitizing. Every pass that changes anything shortens the
/// text, which bounds the loop.
pub fn sanitize(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of the cleanup pipeline.
fn clean_once(raw: &str) -> String {
    let text = raw.trim();
    let text = first_line(text);
    let text = strip_label(text);
    let text = strip_length_annotation(text);
    let text = strip_note(text);
    let text = strip_footnote(text);
    let text = strip_outer_quotes(text);
    let text = cap_length(text);
    text.trim().to_string()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

/// Strip at most one known label.
fn strip_label(text: &str) -> &str {
    LABEL_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .map(str::trim)
        .unwrap_or(text)
}

/// Drop a trailing "(97 characters)" style self-annotation.
fn strip_length_annotation(text: &str) -> &str {
    match text.find(" (") {
        Some(idx) => {
            let remaining = &text[idx..];
            if remaining.contains("character") && remaining.contains(')') {
                text[..idx].trim()
            } else {
                text
            }
        }
        None => text,
    }
}

fn strip_note(text: &str) -> &str {
    match text.find("Note:") {
        Some(idx) => text[..idx].trim(),
        None => text,
    }
}

/// Drop a " * footnote" tail.
fn strip_footnote(text: &str) -> &str {
    match text.find(" *") {
        Some(idx) if text[idx..].trim_start().starts_with("* ") => text[..idx].trim(),
        _ => text,
    }
}

fn strip_outer_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Enforce [`MAX_CHARS`], preferring to end on a full sentence.
fn cap_length(text: &str) -> String {
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }

    let head: Vec<char> = text.chars().take(MAX_CHARS).collect();
    match head.iter().rposition(|&c| c == '.') {
        Some(idx) if idx > MIN_SENTENCE_CUT => head[..=idx].iter().collect(),
        _ => {
            let mut cut: String = head[..MAX_CHARS - 3].iter().collect();
            cut.push_str("...");
            cut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_outer_quotes() {
        assert_eq!(sanitize("\"Nice job.\""), "Nice job.");
    }

    #[test]
    fn test_keeps_inner_quotes() {
        assert_eq!(
            sanitize("You call that a \"commit\"?"),
            "You call that a \"commit\"?"
        );
    }

    #[test]
    fn test_strips_response_prefix() {
        assert_eq!(sanitize("Response: Nice job."), "Nice job.");
        assert_eq!(sanitize("Parrot says: Squawk."), "Squawk.");
        assert_eq!(sanitize("🦜 Squawk."), "Squawk.");
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(sanitize("response: Nice job."), "response: Nice job.");
    }

    #[test]
    fn test_keeps_only_first_line() {
        assert_eq!(
            sanitize("  Git good? More like git rekt!\n\nThis roast targets git users.  "),
            "Git good? More like git rekt!"
        );
        assert_eq!(sanitize("first\r\nsecond"), "first");
    }

    #[test]
    fn test_strips_character_count_annotation() {
        assert_eq!(
            sanitize("Your Dockerfile needs therapy. (31 characters)"),
            "Your Dockerfile needs therapy."
        );
    }

    #[test]
    fn test_keeps_ordinary_parenthetical() {
        assert_eq!(
            sanitize("Pushed to main (again) without tests."),
            "Pushed to main (again) without tests."
        );
    }

    #[test]
    fn test_strips_note_annotation() {
        assert_eq!(
            sanitize("404: Competence not found. Note: this is a joke."),
            "404: Competence not found."
        );
    }

    #[test]
    fn test_strips_asterisk_footnote() {
        assert_eq!(
            sanitize("Node modules: where dependencies go to die. * kept under 100 chars"),
            "Node modules: where dependencies go to die."
        );
    }

    #[test]
    fn test_keeps_emphasis_asterisks() {
        assert_eq!(sanitize("That was *impressive*."), "That was *impressive*.");
    }

    #[test]
    fn test_truncates_without_sentence_break() {
        let input = "a".repeat(200);
        let output = sanitize(&input);
        assert_eq!(output.chars().count(), 150);
        assert!(output.ends_with("..."));
        assert_eq!(&output[..147], &input[..147]);
    }

    #[test]
    fn test_truncates_at_sentence_break() {
        let first = format!("{}.", "b".repeat(80));
        let input = format!("{first}{}", "c".repeat(120));
        assert_eq!(sanitize(&input), first);
    }

    #[test]
    fn test_ignores_early_sentence_break() {
        let input = format!("Short. {}", "d".repeat(200));
        let output = sanitize(&input);
        assert_eq!(output.chars().count(), 150);
        assert!(output.starts_with("Short. "));
        assert!(output.ends_with("..."));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let input = "é".repeat(200);
        let output = sanitize(&input);
        assert_eq!(output.chars().count(), 150);
        assert!(output.ends_with("..."));
    }

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(sanitize("Git good?"), "Git good?");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(sanitize("   \n\t "), "");
    }

    #[test]
    fn test_stacked_decorations_settle() {
        assert_eq!(sanitize("\"Response: Nice job.\""), "Nice job.");
        assert_eq!(sanitize("Response: Response: Nice job."), "Nice job.");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in ".{0,400}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_length_bound(s in ".{0,400}") {
            prop_assert!(sanitize(&s).chars().count() <= MAX_CHARS);
        }

        #[test]
        fn prop_single_line(s in "(?s).{0,400}") {
            prop_assert!(!sanitize(&s).contains('\n'));
        }

        #[test]
        fn prop_idempotent_on_model_like_text(
            label in prop::sample::select(vec!["", "Response: ", "Parrot says: "]),
            body in "[A-Za-z ,.!?\"*()]{0,220}",
            tail in prop::sample::select(vec!["", " (42 characters)", " Note: joke", " * footnote", "\nmore"]),
        ) {
            let raw = format!("{label}{body}{tail}");
            let once = sanitize(&raw);
            prop_assert_eq!(sanitize(&once), once.clone());
            prop_assert!(once.chars().count() <= MAX_CHARS);
        }
    }
}
