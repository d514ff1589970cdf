//! Pattern-based extraction of procedural steps and conditional clauses.

use std::collections::HashSet;

use crate::lexicon::Lexicon;

/// Steps kept per chunk.
pub const MAX_STEPS: usize = 8;

/// Conditions kept per chunk.
pub const MAX_CONDITIONS: usize = 8;

/// Step text shorter than this many characters is discarded.
const MIN_STEP_CHARS: usize = 5;

/// Accepted clause length in characters, inclusive.
const CONDITION_CHARS: std::ops::RangeInclusive<usize> = 8..=100;

/// Extract up to [`MAX_STEPS`] ordered steps, one per matching line.
///
/// Patterns are tried in priority order and the first match wins for a
/// line, even when its remainder turns out too short to keep.
pub fn extract_steps(text: &str, lexicon: &Lexicon) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            lexicon
                .step_patterns()
                .iter()
                .find_map(|re| re.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
        })
        .filter(|step| step.chars().count() >= MIN_STEP_CHARS)
        .take(MAX_STEPS)
        .map(String::from)
        .collect()
}

/// Extract up to [`MAX_CONDITIONS`] distinct conditional clauses.
///
/// Every pattern runs over the whole text; matches are whitespace-collapsed,
/// length-filtered and deduplicated in first-seen order.
pub fn extract_conditions(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut conditions = Vec::new();

    for re in lexicon.condition_patterns() {
        for m in re.find_iter(text) {
            let clause = collapse_whitespace(m.as_str());
            if !CONDITION_CHARS.contains(&clause.chars().count()) {
                continue;
            }
            if seen.insert(clause.clone()) {
                conditions.push(clause);
                if conditions.len() == MAX_CONDITIONS {
                    return conditions;
                }
            }
        }
    }

    conditions
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
