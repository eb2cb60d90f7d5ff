//! Strategy plugin contract: named, stateless candidate producers.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::StrategyKnobs;
use crate::inspector::Inspector;
use crate::tokens::TokenEstimator;

use super::candidate::{SliceCandidate, StrategySidecar};
use super::embedding::EmbeddingIndex;
use super::request::{Intensity, SliceRequest};

// ── Cancellation ───────────────────────────────────────────────────────────────

/// Cooperative cancellation handle, checked at I/O boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Context ────────────────────────────────────────────────────────────────────

/// Everything one strategy execution may read. The matched-file set is an
/// immutable snapshot; newly implicated paths travel back through
/// [`StrategyOutput::matched`] and the planner drains them between strategies.
pub struct StrategyContext<'a> {
    pub request: &'a SliceRequest,
    pub keywords: &'a [String],
    pub matched: &'a BTreeSet<String>,
    pub intensity: Intensity,
    pub knobs: StrategyKnobs,
    pub remaining_budget: u32,
    pub inspector: &'a dyn Inspector,
    pub estimate: TokenEstimator,
    pub cancel: &'a CancelToken,
    pub embedding: Option<&'a EmbeddingIndex>,
    /// Soft deadline for this strategy; expiry is reported as a warning.
    pub deadline: Option<Instant>,
}

impl StrategyContext<'_> {
    pub fn interrupted(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

// ── Output ─────────────────────────────────────────────────────────────────────

/// Value-typed strategy result; failures travel as warnings, never as errors.
#[derive(Debug, Default)]
pub struct StrategyOutput {
    pub candidates: Vec<SliceCandidate>,
    /// At most one sidecar per strategy.
    pub sidecar: Option<StrategySidecar>,
    pub warnings: Vec<String>,
    /// Paths this strategy implicated, for downstream matched-set consumers.
    pub matched: Vec<String>,
}

impl StrategyOutput {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            warnings: vec![message.into()],
            ..Default::default()
        }
    }
}

// ── Trait ──────────────────────────────────────────────────────────────────────

pub trait Strategy: Sync + Send {
    /// Unique registry name.
    fn name(&self) -> &'static str;

    /// Base relevance multiplier in (0, 1].
    fn weight(&self) -> f32;

    /// Soft cap as a fraction of total budget, None = uncapped.
    fn budget_cap(&self) -> Option<f32> {
        None
    }

    /// Cheap pre-check; unavailable strategies are skipped with a warning.
    fn is_available(&self, _ctx: &StrategyContext) -> bool {
        true
    }

    /// Names the prerequisite reported when `is_available` returns false.
    fn prerequisite(&self) -> &'static str {
        "prerequisite not met"
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput;
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_roundtrip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled(), "clones share the flag");
    }
}
