//! `complexity`: largest source files by size, as codemaps. Big files are
//! where the coupling lives; a structural map is usually enough.

use crate::inspector::{language_of, StructureScope};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for};

pub struct ComplexityStrategy;

impl Strategy for ComplexityStrategy {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn weight(&self) -> f32 {
        0.5
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.15)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let stats = match ctx.inspector.file_stats() {
            Ok(stats) => stats,
            Err(e) => {
                return StrategyOutput::warning(format!("complexity: file stats failed: {e}"))
            }
        };

        let mut sized: Vec<(String, u64)> = stats
            .into_iter()
            .filter(|s| language_of(&s.path).is_some_and(|lang| lang != "markdown"))
            .map(|s| (s.path, s.bytes))
            .collect();
        sized.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sized.truncate(ctx.knobs.max_items);
        let largest = sized.first().map(|(_, b)| *b).unwrap_or(0).max(1);

        let paths: Vec<String> = sized.iter().map(|(p, _)| p.clone()).collect();
        for map in codemaps_for(ctx, &paths, StructureScope::Public) {
            if ctx.interrupted() {
                break;
            }
            let bytes = sized
                .iter()
                .find(|(p, _)| *p == map.path)
                .map(|(_, b)| *b)
                .unwrap_or(0);
            // 0.35..0.55 scaled by size relative to the largest file
            let relevance = 0.35 + 0.2 * (bytes as f32 / largest as f32);
            out.candidates.push(codemap_candidate(
                ctx,
                "complexity",
                &map,
                relevance,
                format!("large file ({} KiB)", bytes / 1024),
                "file stats",
            ));
        }
        out
    }
}
