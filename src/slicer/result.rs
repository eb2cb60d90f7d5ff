//! Assembly output model: the selected set and the formatted-ready
//! `ContextResult`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::candidate::{Representation, SliceCandidate};
use super::plan::StrategyTotal;

/// One materialized file in the final bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    pub path: String,
    pub tokens: u32,
    pub mode: Representation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codemap: Option<String>,
    pub strategy: String,
    pub reason: String,
    pub relevance: f32,
}

/// The formatted-ready bundle. The auxiliary fields (`prompt`, `plan`,
/// `chat_id`, `history`) are set by collaborators, never by the engine core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResult {
    pub task: String,
    pub files: Vec<ContextFile>,
    pub total_tokens: u32,
    pub budget: u32,
    pub strategy_stats: BTreeMap<String, StrategyTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
}

/// Full assembly output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceResult {
    /// Selected candidates in final order, tokens rewritten to the admitted
    /// representation.
    pub selected: Vec<SliceCandidate>,
    pub total_tokens: u32,
    pub budget: u32,
    pub warnings: Vec<String>,
    pub context: ContextResult,
}

/// Budget usage in tenths of a percent, integer truncation throughout.
pub fn budget_usage_tenths(tokens: u32, budget: u32) -> u32 {
    if budget == 0 {
        return 0;
    }
    ((tokens as u64) * 1000 / budget as u64) as u32
}

// ── Tests ──────────────────────────────────────────────────────────────────────
