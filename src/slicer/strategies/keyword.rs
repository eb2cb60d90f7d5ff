//! `keyword`: files matching the derived keywords, rendered as snippets
//! around the top-scoring hit lines.

use std::collections::BTreeMap;

use crate::inspector::{SearchMode, SearchOptions, StructureScope};
use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{attach_codemap_alternate, codemaps_for, snippet_from_lines};

pub struct KeywordStrategy;

/// Relevance from hit density; saturates well before 1.0 so explicit
/// mentions keep outranking incidental matches.
pub(super) fn hit_relevance(hits: usize) -> f32 {
    (0.5 + 0.08 * hits as f32).min(0.95)
}

impl Strategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn weight(&self) -> f32 {
        0.9
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.40)
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
            Err(e) => return StrategyOutput::warning(format!("keyword: search failed: {e}")),
        };
        if result.truncated {
            out.warnings
                .push(format!("keyword: search truncated at {} matches", opts.max_results));
        }

        // group hit lines per file, preserving path order
        let mut per_file: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for m in result.matches {
            per_file.entry(m.path).or_default().push(m.line);
        }

        // densest files first, path ascending on ties
        let mut ranked: Vec<(String, Vec<usize>)> = per_file.into_iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(ctx.knobs.max_items);

        for (path, hit_lines) in ranked {
            if ctx.interrupted() {
                break;
            }
            let content = match ctx.inspector.read_file(&path, None, None) {
                Ok(content) => content,
                Err(e) => {
                    out.warnings.push(format!("keyword: cannot read {path}: {e}"));
                    continue;
                }
            };
            let hits = hit_lines.len();
            let kept: Vec<usize> = hit_lines
                .iter()
                .copied()
                .take(ctx.knobs.max_hits_per_file)
                .collect();
            let snippet = snippet_from_lines(&content, &kept, ctx.knobs.context_lines);
            if snippet.is_empty() {
                continue;
            }

            let mut candidate = SliceCandidate::new(
                "keyword",
                path.clone(),
                Representation::Snippet,
                (ctx.estimate)(&snippet),
                hit_relevance(hits),
                format!("{hits} keyword hits"),
                "keyword search",
            );
            candidate.match_count = hits as u32;
            candidate.content = Some(snippet);
            for map in codemaps_for(ctx, &[path.clone()], StructureScope::Public) {
                attach_codemap_alternate(ctx, &mut candidate, &map);
            }
            candidate.ensure_reference_alternate(ctx.estimate);
            out.matched.push(path);
            out.candidates.push(candidate);
        }
        out
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_grows_with_hits_and_saturates() {
        assert!(hit_relevance(5) > hit_relevance(3));
        assert!(hit_relevance(100) <= 0.95);
    }
}
