//! `symbols`: codemaps for files already implicated by earlier strategies.

use crate::inspector::StructureScope;
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for};

pub struct SymbolsStrategy;

impl Strategy for SymbolsStrategy {
    fn name(&self) -> &'static str {
        "symbols"
    }

    fn weight(&self) -> f32 {
        0.75
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.25)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        // BTreeSet iteration keeps the order stable across runs
        let paths: Vec<String> = ctx
            .matched
            .iter()
            .take(ctx.knobs.max_items)
            .cloned()
            .collect();
        if paths.is_empty() {
            return out;
        }

        for map in codemaps_for(ctx, &paths, StructureScope::Public) {
            if ctx.interrupted() {
                break;
            }
            out.candidates.push(codemap_candidate(
                ctx,
                "symbols",
                &map,
                0.65,
                "symbol map of matched file",
                "matched files",
            ));
        }
        out
    }
}
