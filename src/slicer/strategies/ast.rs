//! `ast`: full-scope structural codemaps for keyword hits in parseable
//! languages. Deeper than `symbols`, which stays on the public surface.

use std::collections::BTreeMap;

use crate::inspector::{language_of, SearchMode, SearchOptions, StructureScope};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for};

pub struct AstStrategy;

impl Strategy for AstStrategy {
    fn name(&self) -> &'static str {
        "ast"
    }

    fn weight(&self) -> f32 {
        0.7
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.20)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        if ctx.keywords.is_empty() {
            return out;
        }

        let opts = SearchOptions {
            mode: SearchMode::Content,
            extensions: Vec::new(),
            context_lines: 0,
            max_results: ctx.knobs.max_items * 40,
            regex: false,
        };
        let result = match ctx.inspector.search(ctx.keywords, &opts) {
            Ok(result) => result,
            Err(e) => return StrategyOutput::warning(format!("ast: search failed: {e}")),
        };

        let mut hits_per_file: BTreeMap<String, u32> = BTreeMap::new();
        for m in result.matches {
            *hits_per_file.entry(m.path).or_insert(0) += 1;
        }

        let mut parseable: Vec<(String, u32)> = hits_per_file
            .into_iter()
            .filter(|(path, _)| {
                language_of(path).is_some_and(|lang| lang != "markdown")
            })
            .collect();
        parseable.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        parseable.truncate(ctx.knobs.max_items);

        let hit_counts: BTreeMap<String, u32> = parseable.iter().cloned().collect();
        let paths: Vec<String> = parseable.into_iter().map(|(p, _)| p).collect();

        for map in codemaps_for(ctx, &paths, StructureScope::Full) {
            if ctx.interrupted() {
                break;
            }
            let hits = hit_counts.get(&map.path).copied().unwrap_or(0);
            let mut candidate = codemap_candidate(
                ctx,
                "ast",
                &map,
                super::keyword::hit_relevance(hits as usize) * 0.9,
                "structural map of keyword hit",
                "codemap extraction",
            );
            candidate.match_count = hits;
            out.matched.push(map.path.clone());
            out.candidates.push(candidate);
        }
        out
    }
}
