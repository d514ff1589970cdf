//! Keyword-overlap dependency graph across all skill items.

use std::collections::{HashMap, HashSet};

use skillpack_shared::{DependencyEdge, SkillItem};
use tracing::debug;

/// Edges below this Jaccard similarity are dropped.
pub const MIN_EDGE_SIMILARITY: f64 = 0.22;

/// Jaccard similarity of two keyword sets; `0.0` when both are empty.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Build the directed graph over every ordered pair of distinct items.
///
/// Similarity is symmetric, so related pairs appear in both directions with
/// equal weight. Edges are emitted in enumeration order and deduplicated by
/// `(from, to)`, last value winning.
pub fn build_graph(items: &[SkillItem]) -> Vec<DependencyEdge> {
    let keyword_sets: Vec<HashSet<&str>> = items
        .iter()
        .map(|item| item.keywords.iter().map(String::as_str).collect())
        .collect();

    let mut edges: Vec<DependencyEdge> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for (i, from) in items.iter().enumerate() {
        for (j, to) in items.iter().enumerate() {
            if i == j {
                continue;
            }
            let similarity = jaccard(&keyword_sets[i], &keyword_sets[j]);
            if similarity < MIN_EDGE_SIMILARITY {
                continue;
            }

            let edge = DependencyEdge {
                from: from.id.clone(),
                to: to.id.clone(),
                weight: round2(similarity),
            };
            match positions.get(&(edge.from.clone(), edge.to.clone())) {
                Some(&pos) => edges[pos] = edge,
                None => {
                    positions.insert((edge.from.clone(), edge.to.clone()), edges.len());
                    edges.push(edge);
                }
            }
        }
    }

    debug!(items = items.len(), edges = edges.len(), "dependency graph built");
    edges
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, keywords: &[&str]) -> SkillItem {
        SkillItem {
            id: id.into(),
            title: format!("title {id}"),
            trigger: format!("title {id}"),
            content: String::new(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            steps: vec![],
            conditions: vec![],
            base_score: 50,
        }
    }

    fn set<'a>(words: &[&'a str]) -> HashSet<&'a str> {
        words.iter().copied().collect()
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&["a"])), 1.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&["b"])), 0.0);
    }

    #[test]
    fn related_pair_links_both_directions() {
        let items = vec![
            item("001", &["valve", "pressure", "pump", "seal"]),
            item("002", &["valve", "pressure", "gauge", "alarm"]),
        ];
        let edges = build_graph(&items);
        // 2 shared / 6 total = 0.333..
        assert_eq!(
            edges,
            vec![
                DependencyEdge { from: "001".into(), to: "002".into(), weight: 0.33 },
                DependencyEdge { from: "002".into(), to: "001".into(), weight: 0.33 },
            ]
        );
    }

    #[test]
    fn weak_overlap_is_dropped() {
        // 1 shared / 7 total = 0.14
        let items = vec![
            item("001", &["valve", "a", "b", "c"]),
            item("002", &["valve", "d", "e", "f"]),
        ];
        assert!(build_graph(&items).is_empty());
    }

    #[test]
    fn threshold_is_inclusive_before_rounding() {
        // 2 shared / 9 total = 0.222.. -> kept, rounded to 0.22
        let items = vec![
            item("001", &["a", "b", "c", "d", "e", "f"]),
            item("002", &["a", "b", "g", "h", "i"]),
        ];
        let edges = build_graph(&items);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].weight, 0.22);
    }

    #[test]
    fn no_self_loops_or_duplicates() {
        let items = vec![
            item("001", &["a", "b"]),
            item("002", &["a", "b"]),
            item("003", &["a", "b"]),
            item("004", &[]),
        ];
        let edges = build_graph(&items);
        assert_eq!(edges.len(), 6);
        assert!(edges.iter().all(|e| e.from != e.to));
        let pairs: HashSet<(&str, &str)> =
            edges.iter().map(|e| (e.from.as_str(), e.to.as_str())).collect();
        assert_eq!(pairs.len(), edges.len());
        assert!(edges.iter().all(|e| (MIN_EDGE_SIMILARITY..=1.0).contains(&e.weight)));
    }
}
