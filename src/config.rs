//! Engine policy knobs: per-strategy intensity tables, default strategy sets,
//! and the selection constants. Policy, not contract: callers override via
//! the request; nothing here is persisted.

use crate::slicer::Intensity;

// ── Selection constants ────────────────────────────────────────────────────────

/// Sidecars above this share of the budget are skipped with a warning.
pub const SIDECAR_MAX_SHARE_PCT: u32 = 25;
/// Selection stops once the remaining budget drops below this.
pub const MIN_REMAINING_TOKENS: u32 = 32;
/// Per-strategy soft-cap floor: even a tiny budget grants each strategy this.
pub const STRATEGY_CAP_FLOOR: u32 = 256;
/// Soft per-strategy wall-clock deadline.
pub const STRATEGY_DEADLINE_SECS: u64 = 30;

// ── Canonical strategy order ───────────────────────────────────────────────────

/// Producers before consumers: `symbols`, `graph`, and `semantic` read the
/// matched-file set seeded by the strategies before them.
pub const CANONICAL_ORDER: &[&str] = &[
    "explicit",
    "inventory",
    "skeleton",
    "keyword",
    "symbols",
    "ast",
    "config",
    "diff",
    "graph",
    "semantic",
    "complexity",
    "docs",
    "forest",
];

/// Strategies that consume the matched-file set, with the producers that
/// must run first for them to see anything.
pub const MATCHED_CONSUMERS: &[(&str, &[&str])] = &[
    ("symbols", &["explicit", "keyword"]),
    ("graph", &["explicit", "keyword", "symbols"]),
    ("semantic", &["explicit", "keyword"]),
];

/// Default strategy set per intensity, used when the request names none.
/// The original tooling disagreed with itself here; this table is the
/// decided policy (see DESIGN.md).
pub fn default_strategies(intensity: Intensity) -> Vec<String> {
    let names: &[&str] = match intensity {
        Intensity::Lite => &["explicit", "inventory", "keyword", "config"],
        Intensity::Standard => &[
            "explicit",
            "inventory",
            "skeleton",
            "keyword",
            "symbols",
            "config",
            "docs",
        ],
        Intensity::Deep => CANONICAL_ORDER,
    };
    names.iter().map(|s| s.to_string()).collect()
}

// ── Per-strategy intensity knobs ───────────────────────────────────────────────

/// The three numeric knobs every strategy scales by. `max_items` doubles as
/// tree depth for `inventory`.
#[derive(Debug, Clone, Copy)]
pub struct StrategyKnobs {
    pub max_items: usize,
    pub max_hits_per_file: usize,
    pub context_lines: usize,
}

pub fn knobs_for(strategy: &str, intensity: Intensity) -> StrategyKnobs {
    // (lite, standard, deep) per knob
    let (items, hits, ctx) = match strategy {
        "explicit" => ((8, 12, 16), (1, 1, 1), (0, 0, 0)),
        "inventory" => ((2, 4, 6), (1, 1, 1), (0, 0, 0)), // max_items = tree depth
        "skeleton" => ((3, 6, 10), (1, 1, 1), (0, 0, 0)),
        "keyword" => ((5, 10, 20), (2, 3, 5), (2, 4, 8)),
        "symbols" => ((5, 10, 20), (1, 1, 1), (0, 0, 0)),
        "ast" => ((4, 8, 16), (1, 1, 1), (0, 0, 0)),
        "config" => ((4, 8, 16), (1, 1, 1), (0, 0, 0)),
        "diff" => ((3, 6, 12), (1, 1, 1), (10, 20, 40)), // context_lines = head window
        "graph" => ((4, 8, 16), (1, 1, 1), (0, 0, 0)),
        "semantic" => ((3, 6, 12), (1, 1, 1), (0, 0, 0)),
        "complexity" => ((3, 6, 12), (1, 1, 1), (0, 0, 0)),
        "docs" => ((2, 4, 8), (1, 2, 3), (2, 4, 8)),
        "forest" => ((1, 1, 1), (1, 1, 1), (40, 80, 160)), // context_lines = digest head
        _ => ((4, 8, 16), (1, 2, 3), (2, 4, 8)),
    };
    let pick = |t: (usize, usize, usize)| match intensity {
        Intensity::Lite => t.0,
        Intensity::Standard => t.1,
        Intensity::Deep => t.2,
    };
    StrategyKnobs {
        max_items: pick(items),
        max_hits_per_file: pick(hits),
        context_lines: pick(ctx),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knobs_scale_with_intensity() {
        for name in CANONICAL_ORDER {
            let lite = knobs_for(name, Intensity::Lite);
            let standard = knobs_for(name, Intensity::Standard);
            let deep = knobs_for(name, Intensity::Deep);
            assert!(lite.max_items <= standard.max_items);
            assert!(standard.max_items <= deep.max_items);
            assert!(lite.context_lines <= deep.context_lines);
        }
    }

    #[test]
    fn test_default_sets_nest() {
        let lite = default_strategies(Intensity::Lite);
        let standard = default_strategies(Intensity::Standard);
        let deep = default_strategies(Intensity::Deep);
        for name in &lite {
            assert!(standard.contains(name), "standard must cover lite: {name}");
        }
        for name in &standard {
            assert!(deep.contains(name), "deep must cover standard: {name}");
        }
    }

    #[test]
    fn test_default_sets_follow_canonical_order() {
        for intensity in [Intensity::Lite, Intensity::Standard, Intensity::Deep] {
            let set = default_strategies(intensity);
            let positions: Vec<usize> = set
                .iter()
                .map(|n| CANONICAL_ORDER.iter().position(|c| c == n).unwrap())
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            assert_eq!(positions, sorted, "{intensity} set out of order");
        }
    }
}
