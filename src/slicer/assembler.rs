//! Assembler: materialize the selection, attach sidecars, compute
//! post-selection stats. Exactly one source of content per selected path.

use std::collections::BTreeMap;

use crate::inspector::Inspector;
use crate::tokens::TokenEstimator;

use super::candidate::{Representation, SliceCandidate};
use super::plan::{SlicePlan, StrategyTotal};
use super::registry::StrategyRegistry;
use super::result::{ContextFile, ContextResult, SliceResult};
use super::selector::select;
use super::strategy::CancelToken;
use super::SliceError;

/// Materialized-body drift tolerance: the estimator may disagree with the
/// planning-time count by 10% before the candidate is demoted.
const DRIFT_NUMERATOR: u64 = 11;
const DRIFT_DENOMINATOR: u64 = 10;

fn within_drift(actual: u32, declared: u32) -> bool {
    (actual as u64) * DRIFT_DENOMINATOR <= (declared as u64) * DRIFT_NUMERATOR
}

/// Load the body for a candidate whose content was deferred by its strategy.
fn materialize(
    candidate: &mut SliceCandidate,
    inspector: &dyn Inspector,
    estimate: TokenEstimator,
    warnings: &mut Vec<String>,
) {
    let declared = candidate.tokens;
    let body = match candidate.representation {
        Representation::Codemap => candidate.codemap.clone(),
        Representation::Reference => {
            if candidate.content.is_none() {
                candidate.content = Some(candidate.reference_line());
            }
            candidate.content.clone()
        }
        Representation::Full | Representation::Snippet => match &candidate.content {
            Some(content) => Some(content.clone()),
            None => match inspector.read_file(&candidate.path, None, None) {
                Ok(content) => {
                    candidate.content = Some(content.clone());
                    Some(content)
                }
                Err(e) => {
                    warnings.push(format!(
                        "assembly: cannot read {}: {e}; demoted to reference",
                        candidate.path
                    ));
                    None
                }
            },
        },
    };

    let drifted = body
        .as_deref()
        .is_some_and(|b| !within_drift(estimate(b), declared));
    if body.is_none() || drifted {
        if drifted {
            warnings.push(format!(
                "assembly: {} grew past its declared {declared} tokens; demoted to reference",
                candidate.path
            ));
        }
        // the reference alternate is always present and always last
        candidate.ensure_reference_alternate(estimate);
        candidate.apply_alternate(candidate.alternates.len() - 1);
        if candidate.content.is_none() {
            candidate.content = Some(candidate.reference_line());
        }
    }
}

/// Rank, select, and materialize a plan against `budget`. The plan itself is
/// untouched and may be re-assembled against a different budget.
pub fn assemble(
    plan: &SlicePlan,
    budget: u32,
    inspector: &dyn Inspector,
    registry: &StrategyRegistry,
    estimate: TokenEstimator,
    cancel: &CancelToken,
) -> Result<SliceResult, SliceError> {
    if cancel.is_cancelled() {
        return Err(SliceError::Cancelled);
    }

    // PLANNED -> SELECTED
    let mut selection = select(plan, budget, registry);

    // SELECTED -> ASSEMBLED
    let mut warnings: Vec<String> = plan.warnings.clone();
    warnings.append(&mut selection.warnings);

    let mut total_tokens = if selection.include_tree {
        plan.tree.as_ref().map(|t| t.tokens).unwrap_or(0)
    } else {
        0
    };
    for candidate in &mut selection.selected {
        if cancel.is_cancelled() {
            return Err(SliceError::Cancelled);
        }
        materialize(candidate, inspector, estimate, &mut warnings);
        total_tokens = total_tokens.saturating_add(candidate.tokens);
    }
    if total_tokens > budget {
        return Err(SliceError::Internal(format!(
            "assembled {total_tokens} tokens exceeds budget {budget}"
        )));
    }

    let mut strategy_stats: BTreeMap<String, StrategyTotal> = BTreeMap::new();
    for candidate in &selection.selected {
        let entry = strategy_stats.entry(candidate.strategy.clone()).or_default();
        entry.count += 1;
        entry.tokens += candidate.tokens;
    }

    let files: Vec<ContextFile> = selection
        .selected
        .iter()
        .map(|c| ContextFile {
            path: c.path.clone(),
            tokens: c.tokens,
            mode: c.representation,
            content: match c.representation {
                Representation::Codemap => None,
                _ => c.content.clone(),
            },
            codemap: c.codemap.clone(),
            strategy: c.strategy.clone(),
            reason: c.reason.clone(),
            relevance: c.relevance,
        })
        .collect();

    let context = ContextResult {
        task: plan.request.task.clone(),
        files,
        total_tokens,
        budget,
        strategy_stats,
        tree: if selection.include_tree {
            plan.tree.as_ref().map(|t| t.content.clone())
        } else {
            None
        },
        prompt: None,
        plan: None,
        chat_id: None,
        history: None,
    };

    Ok(SliceResult {
        selected: selection.selected,
        total_tokens,
        budget,
        warnings,
        context,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_tolerance_boundary() {
        assert!(within_drift(110, 100));
        assert!(!within_drift(111, 100));
        assert!(within_drift(0, 0));
    }
}
