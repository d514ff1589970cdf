//! Per-chunk skill item derivation (id, title, trigger, extracted metadata).

use std::sync::LazyLock;

use regex::Regex;
use skillpack_shared::{LanguageMode, SkillItem};
use skillpack_text::{
    Lexicon, extract_conditions, extract_keywords, extract_steps, resolve_language,
};

use crate::scoring;

/// Titles are cut to this many characters.
pub const MAX_TITLE_CHARS: usize = 42;

/// Triggers longer than this are ellipsized.
pub const MAX_TRIGGER_CHARS: usize = 24;

/// Build the skill item for the chunk at 1-based `index`.
///
/// With `requested == Auto` the chunk's own dominant script picks the
/// tokenizer; an explicit mode is used as-is.
pub fn build_item(
    index: usize,
    chunk: &str,
    requested: LanguageMode,
    lexicon: &Lexicon,
) -> SkillItem {
    let mode = resolve_language(requested, chunk);
    let keywords = extract_keywords(chunk, mode, lexicon);
    let steps = extract_steps(chunk, lexicon);
    let conditions = extract_conditions(chunk, lexicon);
    let base_score = scoring::routing_score(&keywords, &steps, &conditions);

    let title = derive_title(chunk, index);
    let trigger = derive_trigger(&title);

    SkillItem {
        id: item_id(index),
        title,
        trigger,
        content: chunk.to_string(),
        keywords,
        steps,
        conditions,
        base_score,
    }
}

/// Zero-padded sequential id: `1` -> `001`.
pub fn item_id(index: usize) -> String {
    format!("{index:03}")
}

/// First line of the chunk with markup stripped, truncated to
/// [`MAX_TITLE_CHARS`]; `skill-<index>` when nothing is left.
pub fn derive_title(chunk: &str, index: usize) -> String {
    let first_line = chunk.lines().next().unwrap_or_default();
    let stripped = strip_markup(first_line);
    let truncated: String = stripped.chars().take(MAX_TITLE_CHARS).collect();
    let title = truncated.trim();

    if title.is_empty() {
        format!("skill-{index}")
    } else {
        title.to_string()
    }
}

/// The title, ellipsized past [`MAX_TRIGGER_CHARS`].
pub fn derive_trigger(title: &str) -> String {
    if title.chars().count() <= MAX_TRIGGER_CHARS {
        return title.to_string();
    }
    let head: String = title.chars().take(MAX_TRIGGER_CHARS).collect();
    format!("{}...", head.trim_end())
}

/// Drop heading/quote/bullet prefixes and inline emphasis characters.
fn strip_markup(line: &str) -> String {
    static PREFIX_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[\s#>*+\-]+").expect("valid regex"));
    static INLINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[*_`]+").expect("valid regex"));

    let without_prefix = PREFIX_RE.replace(line, "");
    INLINE_RE.replace_all(&without_prefix, "").trim().to_string()
}
