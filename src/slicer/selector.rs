//! Budget-bounded selection over a ranked candidate list. Never fails: an
//! empty selection is a valid outcome with a warning attached.

use std::collections::BTreeMap;

use crate::config::{MIN_REMAINING_TOKENS, SIDECAR_MAX_SHARE_PCT, STRATEGY_CAP_FLOOR};

use super::candidate::SliceCandidate;
use super::plan::SlicePlan;
use super::ranker::rank;
use super::registry::StrategyRegistry;

/// Selection outcome: candidates in final (rank) order with rewritten tokens,
/// plus whether the tree sidecar made the cut.
#[derive(Debug)]
pub struct Selection {
    pub selected: Vec<SliceCandidate>,
    pub include_tree: bool,
    /// Sidecar plus candidate tokens actually reserved.
    pub total_tokens: u32,
    pub warnings: Vec<String>,
}

/// Index of the representation that fits `remaining`: `None` for the chosen
/// one, `Some(i)` for an alternate, or `Err` when nothing fits.
fn fit(candidate: &SliceCandidate, remaining: u32) -> Result<Option<usize>, ()> {
    if candidate.tokens <= remaining {
        return Ok(None);
    }
    candidate
        .alternates
        .iter()
        .position(|a| a.tokens <= remaining)
        .map(Some)
        .ok_or(())
}

fn cap_tokens(budget: u32, fraction: f32) -> u32 {
    ((budget as f32 * fraction) as u32).max(STRATEGY_CAP_FLOOR)
}

pub fn select(plan: &SlicePlan, budget: u32, registry: &StrategyRegistry) -> Selection {
    let ranked = rank(plan, registry);
    let mut warnings: Vec<String> = Vec::new();
    let mut remaining = budget;
    let mut total_tokens = 0u32;
    let mut include_tree = false;

    // sidecar pass: the tree is reserved before any candidate, or skipped
    // entirely when it would eat more than its share
    if plan.request.with_tree {
        if let Some(tree) = &plan.tree {
            if (tree.tokens as u64) * 100 > (budget as u64) * SIDECAR_MAX_SHARE_PCT as u64 {
                warnings.push(format!(
                    "tree sidecar skipped: {} tokens exceeds {SIDECAR_MAX_SHARE_PCT}% of budget {budget}",
                    tree.tokens
                ));
            } else {
                include_tree = true;
                remaining -= tree.tokens;
                total_tokens += tree.tokens;
            }
        }
    }

    // candidates still ahead of the cursor, per strategy; drives the soft-cap
    // release ("no other strategy demands the remainder")
    let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in &ranked {
        *pending.entry(candidate.strategy.as_str()).or_insert(0) += 1;
    }

    // path -> winning strategy, for dedup diagnostics
    let mut admitted: BTreeMap<String, String> = BTreeMap::new();
    let mut strategy_tokens: BTreeMap<String, u32> = BTreeMap::new();
    // (rank position, candidate) deferred by its strategy cap
    let mut deferred: Vec<(usize, SliceCandidate)> = Vec::new();
    // (rank position, candidate) admitted; re-sorted to rank order at the end
    let mut selected: Vec<(usize, SliceCandidate)> = Vec::new();

    let mut admit = |position: usize,
                     candidate: &SliceCandidate,
                     alt: Option<usize>,
                     remaining: &mut u32,
                     total: &mut u32,
                     admitted: &mut BTreeMap<String, String>,
                     strategy_tokens: &mut BTreeMap<String, u32>,
                     selected: &mut Vec<(usize, SliceCandidate)>| {
        let mut winner = candidate.clone();
        if let Some(idx) = alt {
            winner.apply_alternate(idx);
        }
        *remaining -= winner.tokens;
        *total += winner.tokens;
        *strategy_tokens.entry(winner.strategy.clone()).or_insert(0) += winner.tokens;
        admitted.insert(winner.path.clone(), winner.strategy.clone());
        selected.push((position, winner));
    };

    for (position, candidate) in ranked.iter().enumerate() {
        if remaining < MIN_REMAINING_TOKENS {
            break;
        }
        if let Some(count) = pending.get_mut(candidate.strategy.as_str()) {
            *count -= 1;
        }

        if let Some(winner) = admitted.get(&candidate.path) {
            warnings.push(format!(
                "discarded {}: path already selected via {winner}",
                candidate.id
            ));
            continue;
        }
        let Ok(alt) = fit(candidate, remaining) else {
            continue;
        };
        let fitted_tokens = match alt {
            None => candidate.tokens,
            Some(idx) => candidate.alternates[idx].tokens,
        };

        // soft per-strategy cap: binds only while some other strategy still
        // has candidates in the queue
        if let Some(fraction) = registry.get(&candidate.strategy).and_then(|s| s.budget_cap()) {
            let used = strategy_tokens.get(&candidate.strategy).copied().unwrap_or(0);
            let over_cap = used + fitted_tokens > cap_tokens(budget, fraction);
            let others_pending = pending
                .iter()
                .any(|(name, count)| *name != candidate.strategy.as_str() && *count > 0);
            if over_cap && others_pending {
                deferred.push((position, candidate.clone()));
                continue;
            }
        }
        admit(
            position,
            candidate,
            alt,
            &mut remaining,
            &mut total_tokens,
            &mut admitted,
            &mut strategy_tokens,
            &mut selected,
        );
    }

    // second pass: budget nobody else claimed goes to the over-cap
    // candidates, still in rank order
    for (position, candidate) in &deferred {
        if remaining < MIN_REMAINING_TOKENS {
            break;
        }
        if admitted.contains_key(&candidate.path) {
            continue;
        }
        let Ok(alt) = fit(candidate, remaining) else {
            continue;
        };
        admit(
            *position,
            candidate,
            alt,
            &mut remaining,
            &mut total_tokens,
            &mut admitted,
            &mut strategy_tokens,
            &mut selected,
        );
    }

    selected.sort_by_key(|(position, _)| *position);
    let selected: Vec<SliceCandidate> = selected.into_iter().map(|(_, c)| c).collect();

    if selected.is_empty() {
        warnings.push("selection is empty: no candidate fits the budget".to_string());
    }

    Selection {
        selected,
        include_tree,
        total_tokens,
        warnings,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
