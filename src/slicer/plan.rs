//! Planner: validate, derive keywords, run strategies in order, aggregate
//! into an immutable `SlicePlan`. No budget enforcement happens here; a plan
//! may deliberately oversubscribe and be re-selected against any budget.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::config::{self, STRATEGY_DEADLINE_SECS};
use crate::inspector::{build_glob_set, glob_matches, Inspector};
use crate::tokens::{self, TokenEstimator};

use super::candidate::{SliceCandidate, StrategySidecar};
use super::embedding::EmbeddingIndex;
use super::keywords::derive_keywords;
use super::registry::StrategyRegistry;
use super::request::SliceRequest;
use super::strategy::{CancelToken, StrategyContext, StrategyOutput};
use super::SliceError;

// ── Plan model ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StrategyTotal {
    pub count: usize,
    pub tokens: u32,
}

/// The full planning output. Pure value: produced once, never mutated;
/// selection builds new results from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlicePlan {
    pub request: SliceRequest,
    /// Pre-selection candidates in strategy emission order.
    pub candidates: Vec<SliceCandidate>,
    pub strategy_totals: BTreeMap<String, StrategyTotal>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<StrategySidecar>,
    /// Sum of chosen-representation tokens, overlaps ignored.
    pub gross_tokens: u32,
}

// ── Options ────────────────────────────────────────────────────────────────────

pub struct PlanOptions {
    pub estimate: TokenEstimator,
    pub cancel: CancelToken,
    /// Soft per-strategy deadline; None disables the check.
    pub strategy_deadline: Option<Duration>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            estimate: tokens::estimate,
            cancel: CancelToken::new(),
            strategy_deadline: Some(Duration::from_secs(STRATEGY_DEADLINE_SECS)),
        }
    }
}

// ── Planner ────────────────────────────────────────────────────────────────────

/// Strategy list resolution plus existence check.
fn resolve_strategies(
    request: &SliceRequest,
    registry: &StrategyRegistry,
) -> Result<Vec<String>, SliceError> {
    let names = if request.strategies.is_empty() {
        config::default_strategies(request.intensity)
    } else {
        request.strategies.clone()
    };
    for name in &names {
        if !registry.contains(name) {
            return Err(SliceError::InvalidRequest(format!(
                "unknown strategy '{name}'"
            )));
        }
    }
    Ok(names)
}

/// Warn when a matched-set consumer is ordered before all of its producers.
fn ordering_warnings(names: &[String]) -> Vec<String> {
    let mut warnings = Vec::new();
    for (consumer, producers) in config::MATCHED_CONSUMERS {
        let Some(consumer_at) = names.iter().position(|n| n == consumer) else {
            continue;
        };
        let later_producer = producers.iter().find(|p| {
            names
                .iter()
                .position(|n| n == **p)
                .is_some_and(|at| at > consumer_at)
        });
        let any_before = producers.iter().any(|p| {
            names
                .iter()
                .position(|n| n == *p)
                .is_some_and(|at| at < consumer_at)
        });
        if let Some(producer) = later_producer {
            if !any_before {
                warnings.push(format!(
                    "strategy order places '{consumer}' before its producer '{producer}'; \
                     it will see an empty matched set"
                ));
            }
        }
    }
    warnings
}

pub fn plan(
    request: SliceRequest,
    inspector: &dyn Inspector,
    registry: &StrategyRegistry,
    opts: &PlanOptions,
) -> Result<SlicePlan, SliceError> {
    // DRAFT -> VALIDATED
    request.validate()?;
    let names = resolve_strategies(&request, registry)?;

    let keywords = derive_keywords(&request.task, &[]);
    let include_set = build_glob_set(&request.include)
        .map_err(|e| SliceError::InvalidRequest(e.to_string()))?;
    let exclude_set = build_glob_set(&request.exclude)
        .map_err(|e| SliceError::InvalidRequest(e.to_string()))?;

    let mut warnings = ordering_warnings(&names);
    let mut candidates: Vec<SliceCandidate> = Vec::new();
    let mut tree: Option<StrategySidecar> = None;
    let mut matched: BTreeSet<String> = BTreeSet::new();
    let embedding = EmbeddingIndex::load(&request.root);

    // VALIDATED -> EXECUTED: strategies in declared order, matched-set drained
    // between them
    for name in &names {
        if opts.cancel.is_cancelled() {
            return Err(SliceError::Cancelled);
        }
        let strategy = registry
            .get(name)
            .ok_or_else(|| SliceError::Internal(format!("registry lost strategy '{name}'")))?;

        let mut knobs = config::knobs_for(name, request.effective_intensity(name));
        let cap = request.cap_for(name);
        if let Some(max_items) = cap.max_items {
            knobs.max_items = knobs.max_items.min(max_items);
        }
        let gross_so_far: u32 = candidates.iter().map(|c| c.tokens).sum();
        let ctx = StrategyContext {
            request: &request,
            keywords: &keywords,
            matched: &matched,
            intensity: request.effective_intensity(name),
            knobs,
            remaining_budget: request.budget_tokens.saturating_sub(gross_so_far),
            inspector,
            estimate: opts.estimate,
            cancel: &opts.cancel,
            embedding: embedding.as_ref(),
            deadline: opts.strategy_deadline.map(|d| Instant::now() + d),
        };

        if !strategy.is_available(&ctx) {
            warnings.push(format!(
                "strategy '{name}' unavailable: {}",
                strategy.prerequisite()
            ));
            continue;
        }

        let mut output = match catch_unwind(AssertUnwindSafe(|| strategy.execute(&ctx))) {
            Ok(output) => output,
            Err(_) => StrategyOutput::warning(format!("strategy '{name}' failed: panicked")),
        };
        if opts.cancel.is_cancelled() {
            return Err(SliceError::Cancelled);
        }
        if ctx.deadline.is_some_and(|d| Instant::now() >= d) {
            warnings.push(format!("strategy '{name}' exceeded its deadline; output truncated"));
        }

        warnings.append(&mut output.warnings);

        // include/exclude applies to candidates from every source, not just
        // the listing-based strategies
        output.candidates.retain(|c| {
            (request.include.is_empty() || glob_matches(&include_set, &c.path))
                && !glob_matches(&exclude_set, &c.path)
        });

        // per-strategy invariants: id dedup, declared-token clamp, reference
        // alternate, emission sequence
        let mut seen_ids: BTreeSet<String> = BTreeSet::new();
        output.candidates.retain(|c| seen_ids.insert(c.id.clone()));
        for (seq, candidate) in output.candidates.iter_mut().enumerate() {
            candidate.emit_seq = seq as u32;
            candidate.ensure_reference_alternate(opts.estimate);
            if let Some(max_tokens) = cap.max_tokens {
                if candidate.tokens > max_tokens {
                    let fitting = candidate
                        .alternates
                        .iter()
                        .position(|a| a.tokens <= max_tokens)
                        .unwrap_or(candidate.alternates.len() - 1);
                    candidate.apply_alternate(fitting);
                }
            }
        }

        if let Some(sidecar) = output.sidecar {
            if tree.is_none() && sidecar.name == "tree" {
                tree = Some(sidecar);
            }
        }
        matched.extend(output.matched.drain(..));
        candidates.append(&mut output.candidates);
    }

    // EXECUTED -> PLANNED: aggregate
    let mut strategy_totals: BTreeMap<String, StrategyTotal> = BTreeMap::new();
    for candidate in &candidates {
        let entry = strategy_totals.entry(candidate.strategy.clone()).or_default();
        entry.count += 1;
        entry.tokens += candidate.tokens;
    }
    let gross_tokens = candidates.iter().map(|c| c.tokens).sum();

    Ok(SlicePlan {
        request,
        candidates,
        strategy_totals,
        warnings,
        tree,
        gross_tokens,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
