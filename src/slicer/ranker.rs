//! Deterministic candidate ordering. Score first, then a fixed strategy
//! priority, then emission order, then path. Fully reproducible given the
//! same plan.

use std::cmp::Ordering;

use super::candidate::SliceCandidate;
use super::plan::SlicePlan;
use super::registry::StrategyRegistry;

/// Tie-break priority between strategies, strongest first. Lower index wins.
const STRATEGY_PRIORITY: &[&str] = &[
    "explicit",
    "keyword",
    "symbols",
    "ast",
    "skeleton",
    "docs",
    "graph",
    "semantic",
    "complexity",
    "config",
    "diff",
    "forest",
    "inventory",
];

fn priority_of(strategy: &str) -> usize {
    STRATEGY_PRIORITY
        .iter()
        .position(|s| *s == strategy)
        .unwrap_or(STRATEGY_PRIORITY.len())
}

/// Coverage bonus: denser search hits score higher, logarithmically.
fn coverage_bonus(match_count: u32) -> f32 {
    1.0 + (1.0 + match_count as f32).ln()
}

/// Effective score: `strategy_weight × base_relevance × coverage_bonus`.
pub fn effective_score(candidate: &SliceCandidate, registry: &StrategyRegistry) -> f32 {
    let weight = registry
        .get(&candidate.strategy)
        .map(|s| s.weight())
        .unwrap_or(0.5);
    weight * candidate.relevance * coverage_bonus(candidate.match_count)
}

/// Plan candidates in selection order, best first.
pub fn rank(plan: &SlicePlan, registry: &StrategyRegistry) -> Vec<SliceCandidate> {
    let mut scored: Vec<(f32, SliceCandidate)> = plan
        .candidates
        .iter()
        .map(|c| (effective_score(c, registry), c.clone()))
        .collect();
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| priority_of(&a.strategy).cmp(&priority_of(&b.strategy)))
            .then_with(|| a.emit_seq.cmp(&b.emit_seq))
            .then_with(|| a.path.cmp(&b.path))
    });
    scored.into_iter().map(|(_, c)| c).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::candidate::Representation;
    use crate::slicer::request::SliceRequest;
    use std::collections::BTreeMap;

    fn make(strategy: &str, path: &str, relevance: f32, hits: u32, seq: u32) -> SliceCandidate {
        let mut c = SliceCandidate::new(
            strategy,
            path,
            Representation::Snippet,
            100,
            relevance,
            "test",
            "test",
        );
        c.match_count = hits;
        c.emit_seq = seq;
        c
    }

    fn plan_with(candidates: Vec<SliceCandidate>) -> SlicePlan {
        SlicePlan {
            request: SliceRequest::new("t", "/repo", 4000),
            candidates,
            strategy_totals: BTreeMap::new(),
            warnings: Vec::new(),
            tree: None,
            gross_tokens: 0,
        }
    }

    #[test]
    fn test_score_descending() {
        let registry = StrategyRegistry::builtin();
        let plan = plan_with(vec![
            make("keyword", "low.rs", 0.5, 1, 0),
            make("keyword", "high.rs", 0.9, 5, 1),
        ]);
        let ranked = rank(&plan, &registry);
        assert_eq!(ranked[0].path, "high.rs");
    }

    #[test]
    fn test_coverage_bonus_rewards_density() {
        assert!(coverage_bonus(5) > coverage_bonus(1));
        assert!((coverage_bonus(0) - (1.0 + 1.0f32.ln())).abs() < 1e-6);
    }

    #[test]
    fn test_strategy_priority_breaks_score_ties() {
        let registry = StrategyRegistry::builtin();
        // identical effective scores via relevance tuned to cancel the weights
        let mut keyword = make("keyword", "same.rs", 0.5, 0, 3);
        keyword.relevance = 0.5; // 0.9 weight
        let mut config = make("config", "same.rs", 0.9, 0, 0);
        config.relevance = 0.9; // 0.5 weight
        // 0.9 * 0.5 == 0.5 * 0.9
        let plan = plan_with(vec![config, keyword]);
        let ranked = rank(&plan, &registry);
        assert_eq!(ranked[0].strategy, "keyword");
    }

    #[test]
    fn test_emission_order_stable_within_strategy() {
        let registry = StrategyRegistry::builtin();
        let plan = plan_with(vec![
            make("keyword", "b.rs", 0.7, 2, 0),
            make("keyword", "a.rs", 0.7, 2, 1),
        ]);
        let ranked = rank(&plan, &registry);
        assert_eq!(ranked[0].path, "b.rs", "emission order wins on ties");
        assert_eq!(ranked[1].path, "a.rs");
    }

    #[test]
    fn test_rank_is_reproducible() {
        let registry = StrategyRegistry::builtin();
        let plan = plan_with(vec![
            make("keyword", "a.rs", 0.7, 2, 0),
            make("symbols", "b.rs", 0.8, 0, 0),
            make("docs", "c.md", 0.6, 1, 0),
        ]);
        let first = rank(&plan, &registry);
        let second = rank(&plan, &registry);
        let ids_first: Vec<&str> = first.iter().map(|c| c.id.as_str()).collect();
        let ids_second: Vec<&str> = second.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids_first, ids_second);
    }
}
