//! Text normalization and semantic block splitting.
//!
//! Each normalization pass is a function `&str -> String` applied in
//! sequence, so the result is deterministic for any input.

use std::sync::LazyLock;

use regex::Regex;

/// Blocks with fewer non-whitespace characters than this are dropped.
pub const MIN_BLOCK_CHARS: usize = 40;

/// Canonicalize whitespace and line endings of raw extracted text.
///
/// Empty input (or input that is only whitespace) yields an empty string.
pub fn normalize(raw: &str) -> String {
    let mut result = strip_carriage_returns(raw);

    result = tabs_to_spaces(&result);
    result = collapse_spaces(&result);
    result = collapse_blank_lines(&result);

    result.trim().to_string()
}

/// Split normalized text into blank-line-delimited blocks.
///
/// Blocks are trimmed; blocks under [`MIN_BLOCK_CHARS`] non-whitespace
/// characters are dropped. Order is preserved.
pub fn split_blocks(text: &str) -> Vec<&str> {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

    BLANK_RUN_RE
        .split(text)
        .map(str::trim)
        .filter(|block| non_whitespace_len(block) >= MIN_BLOCK_CHARS)
        .collect()
}

/// Number of characters that are not whitespace.
pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Number of whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

fn strip_carriage_returns(text: &str) -> String {
    text.replace('\r', "")
}

fn tabs_to_spaces(text: &str) -> String {
    text.replace('\t', " ")
}

/// Collapse runs of space / no-break space into one space.
fn collapse_spaces(text: &str) -> String {
    static SPACE_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \u{00A0}]+").expect("valid regex"));

    SPACE_RUN_RE.replace_all(text, " ").into_owned()
}

/// Collapse 3+ consecutive newlines into exactly 2.
fn collapse_blank_lines(text: &str) -> String {
    static NEWLINE_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    NEWLINE_RUN_RE.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_canonicalizes_whitespace() {
        let input = "  Title\r\n\r\n\r\n\r\nBody\twith   gaps\u{00A0}\u{00A0}here \n\n\n\nEnd  ";
        assert_eq!(normalize(input), "Title\n\nBody with gaps here \n\nEnd");
    }

    #[test]
    fn normalize_keeps_double_newlines() {
        assert_eq!(normalize("a\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn normalize_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \r\n\t \n "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("x\t\ty\r\n\n\n\nz  z");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn split_blocks_drops_short_blocks() {
        let long_a = "This paragraph is comfortably longer than forty characters.";
        let long_b = "Another paragraph that also clears the forty character bar.";
        let text = format!("short\n\n{long_a}\n\n\n{long_b}\n\ntiny");
        let blocks = split_blocks(&text);
        assert_eq!(blocks, vec![long_a, long_b]);
    }

    #[test]
    fn split_blocks_counts_non_whitespace_only() {
        // 39 letters padded with spaces must still be dropped.
        let block = "a b c d e f g h i j k l m n o p q r s t u v w x y z a b c d e f g h i j k l m";
        assert_eq!(non_whitespace_len(block), 39);
        assert!(split_blocks(block).is_empty());
    }

    #[test]
    fn split_blocks_empty_text() {
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("one two\nthree\n\nfour"), 4);
        assert_eq!(word_count(""), 0);
    }
}
