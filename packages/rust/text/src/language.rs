//! Script-dominance language detection.

use skillpack_shared::{LanguageMode, is_cjk_ideograph};

/// Classify a span as CJK-dominant (`zh`), Latin-dominant (`en`), or
/// ambiguous (`auto`) when it contains neither script.
///
/// Ties go to `zh`.
pub fn detect_language(text: &str) -> LanguageMode {
    let (cjk, latin) = text.chars().fold((0usize, 0usize), |(cjk, latin), c| {
        if is_cjk_ideograph(c) {
            (cjk + 1, latin)
        } else if c.is_ascii_alphabetic() {
            (cjk, latin + 1)
        } else {
            (cjk, latin)
        }
    });

    match (cjk, latin) {
        (0, 0) => LanguageMode::Auto,
        (c, l) if c >= l => LanguageMode::Zh,
        _ => LanguageMode::En,
    }
}

/// Resolve the mode used for one span: an explicit mode wins, `auto` detects.
pub fn resolve_language(requested: LanguageMode, text: &str) -> LanguageMode {
    match requested {
        LanguageMode::Auto => detect_language(text),
        explicit => explicit,
    }
}
