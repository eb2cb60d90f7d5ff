//! Context slicer engine: plan a multi-strategy candidate set for a task,
//! then select and assemble a budget-bounded context bundle.
//!
//! The engine never touches standard streams and never terminates the
//! process; callers map [`SliceError`] to whatever surface they own.

mod assembler;
mod candidate;
mod embedding;
mod format;
mod keywords;
mod plan;
mod ranker;
mod registry;
mod request;
mod result;
mod selector;
mod strategies;
mod strategy;

pub use candidate::{Alternate, Representation, SliceCandidate, StrategySidecar};
pub use embedding::EmbeddingIndex;
pub use format::{format_result, format_result_at, OutputFormat};
pub use keywords::derive_keywords;
pub use plan::{plan, PlanOptions, SlicePlan, StrategyTotal};
pub use ranker::{effective_score, rank};
pub use registry::StrategyRegistry;
pub use request::{Intensity, SliceRequest, StrategyCap, MIN_BUDGET};
pub use result::{ContextFile, ContextResult, SliceResult};
pub use selector::{select, Selection};
pub use strategy::{CancelToken, Strategy, StrategyContext, StrategyOutput};

use thiserror::Error;

use crate::inspector::Inspector;
use crate::tokens::TokenEstimator;

// ── Errors ─────────────────────────────────────────────────────────────────────

/// Engine error taxonomy. Per-strategy failures never appear here; they are
/// swallowed into ordered plan warnings.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("inspector unavailable: {0}")]
    InspectorUnavailable(String),
    #[error("cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

// ── Top-level API ──────────────────────────────────────────────────────────────

/// Rank, select, and materialize a plan against `budget`. The plan is left
/// untouched and may be re-assembled against a different budget.
pub fn assemble(
    plan: &SlicePlan,
    budget: u32,
    inspector: &dyn Inspector,
    registry: &StrategyRegistry,
) -> Result<SliceResult, SliceError> {
    assembler::assemble(
        plan,
        budget,
        inspector,
        registry,
        crate::tokens::estimate,
        &CancelToken::new(),
    )
}

/// [`assemble`] with an injected estimator and cancellation token.
pub fn assemble_with(
    plan: &SlicePlan,
    budget: u32,
    inspector: &dyn Inspector,
    registry: &StrategyRegistry,
    estimate: TokenEstimator,
    cancel: &CancelToken,
) -> Result<SliceResult, SliceError> {
    assembler::assemble(plan, budget, inspector, registry, estimate, cancel)
}
