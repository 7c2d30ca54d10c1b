//! Deterministic cleanup of model-produced Markdown.
//!
//! Even well-prompted models occasionally wrap output in ``` fences despite
//! being told not to, emit Windows line endings, or pad paragraphs with runs
//! of blank lines. These are formatting quirks, not content problems, so they
//! are fixed here with cheap string passes instead of prompt escalation. Each
//! rule is a pure `&str → String` function, independently testable.
//!
//! Rule order matters: fences are stripped before whitespace normalisation so
//! the later passes see clean input, and the final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer ```/```markdown fence
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse runs of 2+ blank lines down to 1
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Ensure the text ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = trim_line_ends(&s);
    let s = collapse_blank_runs(&s);
    let s = strip_invisible(&s);
    finish_with_newline(&s)
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?\r?\n(.*)\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────

fn trim_line_ends(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse runs of blank lines ─────────────────────────────────

static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_runs(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n\n").to_string()
}

// ── Rule 5: Strip invisible Unicode ──────────────────────────────────────

fn strip_invisible(input: &str) -> String {
    input.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}'],
        "",
    )
}

// ── Rule 6: Single final newline ─────────────────────────────────────────

fn finish_with_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(
            strip_outer_fence("```markdown\n# Title\nBody\n```"),
            "# Title\nBody"
        );
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_outer_fence("```\n# Title\n```"), "# Title");
    }

    #[test]
    fn inner_fences_are_untouched() {
        let input = "Text before\n```rust\nfn main() {}\n```\nText after";
        assert_eq!(strip_outer_fence(input), input);
    }

    #[test]
    fn normalises_crlf() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn trims_trailing_spaces_only() {
        assert_eq!(trim_line_ends("  lead kept   \ntail gone  "), "  lead kept\ntail gone");
    }

    #[test]
    fn collapses_blank_runs_to_one_blank_line() {
        assert_eq!(collapse_blank_runs("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_runs("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn strips_invisible_chars() {
        assert_eq!(
            strip_invisible("he\u{200B}llo\u{FEFF} wor\u{00AD}ld"),
            "hello world"
        );
    }

    #[test]
    fn single_final_newline() {
        assert_eq!(finish_with_newline("hello"), "hello\n");
        assert_eq!(finish_with_newline("hello\n\n\n"), "hello\n");
        assert_eq!(finish_with_newline(""), "\n");
    }

    #[test]
    fn full_pipeline() {
        let input = "```markdown\n# Title\r\n\r\nBody text   \n\n\n\nMore\n```";
        let cleaned = clean_markdown(input);
        assert!(cleaned.starts_with("# Title"));
        assert!(cleaned.ends_with("More\n"));
        assert!(!cleaned.contains("\n\n\n"));
        assert!(!cleaned.contains('\r'));
    }
}
