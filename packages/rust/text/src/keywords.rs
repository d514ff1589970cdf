//! Language-aware tokenization and frequency-ranked keyword extraction.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use skillpack_shared::LanguageMode;

use crate::lexicon::Lexicon;

/// Keywords kept per skill item.
pub const MAX_KEYWORDS: usize = 12;

static CJK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{3400}-\u{4dbf}\u{4e00}-\u{9fff}]{2,}").expect("valid regex")
});

// Applied to lower-cased text.
static LATIN_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][a-z0-9_-]{2,}").expect("valid regex"));

static MIXED_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{3400}-\u{4dbf}\u{4e00}-\u{9fff}]{2,}|[a-z][a-z0-9_-]{2,}")
        .expect("valid regex")
});

/// Extract tokens from `text` in document order (duplicates kept).
///
/// `zh` tries CJK runs first and falls back to Latin runs; `en` is the
/// inverse; `auto` takes both in one pass against the combined stopwords.
pub fn tokenize(text: &str, mode: LanguageMode, lexicon: &Lexicon) -> Vec<String> {
    match mode {
        LanguageMode::Zh => {
            let tokens = cjk_tokens(text, lexicon);
            if tokens.is_empty() {
                latin_tokens(text, lexicon)
            } else {
                tokens
            }
        }
        LanguageMode::En => {
            let tokens = latin_tokens(text, lexicon);
            if tokens.is_empty() {
                cjk_tokens(text, lexicon)
            } else {
                tokens
            }
        }
        LanguageMode::Auto => {
            let lowered = text.to_lowercase();
            MIXED_RUN_RE
                .find_iter(&lowered)
                .map(|m| m.as_str())
                .filter(|token| !lexicon.is_stopword(token))
                .map(String::from)
                .collect()
        }
    }
}

/// Rank tokens by frequency (descending), ties by first appearance, and
/// keep the top `limit`. The result never holds duplicates.
pub fn rank_keywords(tokens: &[String], limit: usize) -> Vec<String> {
    let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        stats.entry(token.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = stats
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(token, _, _)| token.to_string())
        .collect()
}

/// Tokenize then rank: the item keyword list for one chunk.
pub fn extract_keywords(text: &str, mode: LanguageMode, lexicon: &Lexicon) -> Vec<String> {
    rank_keywords(&tokenize(text, mode, lexicon), MAX_KEYWORDS)
}

fn cjk_tokens(text: &str, lexicon: &Lexicon) -> Vec<String> {
    CJK_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !lexicon.is_zh_stopword(token))
        .map(String::from)
        .collect()
}

fn latin_tokens(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let lowered = text.to_lowercase();
    LATIN_RUN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !lexicon.is_en_stopword(token))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn en_tokens_are_lowercased_and_filtered() {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize("Open THE Valve, then check the valve gauge at 42 psi.", LanguageMode::En, &lexicon);
        assert_eq!(tokens, strings(&["open", "valve", "check", "valve", "gauge", "psi"]));
    }

    #[test]
    fn zh_tokens_are_runs_of_two_or_more() {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize("打开阀门，检查压力。我们 水", LanguageMode::Zh, &lexicon);
        assert_eq!(tokens, strings(&["打开阀门", "检查压力"]));
    }

    #[test]
    fn zh_falls_back_to_latin() {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize("Pressure relief procedure", LanguageMode::Zh, &lexicon);
        assert_eq!(tokens, strings(&["pressure", "relief", "procedure"]));
    }

    #[test]
    fn en_falls_back_to_cjk() {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize("压力 释放 12", LanguageMode::En, &lexicon);
        assert_eq!(tokens, strings(&["压力", "释放"]));
    }

    #[test]
    fn auto_takes_both_scripts_in_order() {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize("Valve 阀门 and 如果 pump", LanguageMode::Auto, &lexicon);
        assert_eq!(tokens, strings(&["valve", "阀门", "pump"]));
    }

    #[test]
    fn ranking_is_frequency_then_first_seen() {
        let tokens = strings(&["b", "a", "c", "a", "c", "d"]);
        assert_eq!(rank_keywords(&tokens, 10), strings(&["a", "c", "b", "d"]));
        assert_eq!(rank_keywords(&tokens, 2), strings(&["a", "c"]));
        assert!(rank_keywords(&[], 5).is_empty());
    }

    #[test]
    fn keywords_capped_distinct_and_stopword_free() {
        let lexicon = Lexicon::builtin();
        let text = (0..30)
            .map(|i| format!("term{i:02} the and term{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&text, LanguageMode::En, &lexicon);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "term00");
        let unique: std::collections::HashSet<_> = keywords.iter().collect();
        assert_eq!(unique.len(), keywords.len());
        assert!(keywords.iter().all(|k| !lexicon.is_stopword(k)));
    }
}
