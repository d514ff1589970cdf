//! Heuristic routing score for a skill item.
//!
//! The probe is the item's own top keywords, so the overlap term measures
//! keyword richness rather than relevance to any external query.
//! [`score_with_probe`] takes the probe explicitly for callers that want to
//! score against a query instead.

use std::collections::HashSet;

use skillpack_text::MAX_KEYWORDS;

/// Number of top keywords used as the self-probe.
pub const PROBE_SIZE: usize = 5;

/// Score assigned when the probe is empty.
pub const EMPTY_PROBE_SCORE: u8 = 60;

const OVERLAP_CAP: usize = 40;
const DENSITY_CAP: usize = 25;
const CONDITION_CAP: usize = 20;
const STEP_CAP: usize = 15;

/// Score an item against its own top [`PROBE_SIZE`] keywords.
pub fn routing_score(keywords: &[String], steps: &[String], conditions: &[String]) -> u8 {
    let probe = &keywords[..keywords.len().min(PROBE_SIZE)];
    score_with_probe(probe, keywords, steps.len(), conditions.len())
}

/// Score an item's metadata against an arbitrary probe.
pub fn score_with_probe(
    probe: &[String],
    keywords: &[String],
    step_count: usize,
    condition_count: usize,
) -> u8 {
    if probe.is_empty() {
        return EMPTY_PROBE_SCORE;
    }

    let keyword_set: HashSet<&str> = keywords.iter().map(String::as_str).collect();
    let overlap = probe
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&keyword_set)
        .count();

    let overlap_score = (8 * overlap).min(OVERLAP_CAP);
    let density_score = density(keywords.len()).min(DENSITY_CAP);
    let condition_bonus = (4 * condition_count).min(CONDITION_CAP);
    let step_bonus = (3 * step_count).min(STEP_CAP);

    let total = overlap_score + density_score + condition_bonus + step_bonus;
    total.min(100) as u8
}

/// `round(25 * keywords / 12)`, halves rounding up.
fn density(keyword_count: usize) -> usize {
    (DENSITY_CAP as f64 * keyword_count as f64 / MAX_KEYWORDS as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("kw{i}")).collect()
    }

    #[test]
    fn empty_keywords_score_sixty() {
        assert_eq!(routing_score(&[], &words(8), &words(8)), EMPTY_PROBE_SCORE);
    }

    #[test]
    fn full_item_hits_the_cap() {
        // 40 + 25 + 20 + 15
        assert_eq!(routing_score(&words(12), &words(8), &words(8)), 100);
    }

    #[test]
    fn partial_terms() {
        // 3 keywords: overlap 24, density round(6.25) = 6; 1 step: 3; 2 conditions: 8
        assert_eq!(routing_score(&words(3), &words(1), &words(2)), 41);
        // 6 keywords: overlap 40, density round(12.5) = 13
        assert_eq!(routing_score(&words(6), &[], &[]), 53);
    }

    #[test]
    fn external_probe_counts_real_overlap() {
        let keywords = words(12);
        let probe = vec!["kw0".to_string(), "absent".to_string()];
        // overlap 8 + density 25
        assert_eq!(score_with_probe(&probe, &keywords, 0, 0), 33);
    }

    #[test]
    fn score_always_in_bounds() {
        for k in 0..=12 {
            for s in 0..=8 {
                for c in 0..=8 {
                    let score = routing_score(&words(k), &words(s), &words(c));
                    assert!(score <= 100);
                }
            }
        }
    }
}
