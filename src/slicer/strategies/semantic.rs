//! `semantic`: embedding-nearest neighbors of the matched files. Requires the
//! on-disk index; without it the strategy reports unavailable.

use std::collections::BTreeSet;

use crate::inspector::StructureScope;
use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::embedding::EmbeddingIndex;
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for};

pub struct SemanticStrategy;

impl Strategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn weight(&self) -> f32 {
        0.55
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.20)
    }

    fn is_available(&self, ctx: &StrategyContext) -> bool {
        ctx.embedding.is_some() || EmbeddingIndex::exists(&ctx.request.root)
    }

    fn prerequisite(&self) -> &'static str {
        "embedding index (.ivo/embeddings.json) not found"
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let Some(index) = ctx.embedding else {
            return StrategyOutput::warning("semantic: embedding index failed to load".to_string());
        };

        // blend the matched-file centroid with the keyword projection; either
        // alone is enough
        let matched_refs: Vec<&str> = ctx.matched.iter().map(String::as_str).collect();
        let centroid = index.centroid(&matched_refs);
        let query_vec = if ctx.keywords.is_empty() {
            None
        } else {
            Some(index.project_query(ctx.keywords))
        };
        let query = match (centroid, query_vec) {
            (Some(c), Some(q)) => Some(
                c.iter()
                    .zip(&q)
                    .map(|(a, b)| (a + b) / 2.0)
                    .collect::<Vec<f32>>(),
            ),
            (Some(c), None) => Some(c),
            (None, Some(q)) => Some(q),
            (None, None) => None,
        };
        let Some(query) = query else {
            return out; // nothing to anchor on; snapshot mode without matches
        };

        let exclude: BTreeSet<String> = ctx.matched.iter().cloned().collect();
        let neighbors = index.nearest(&query, &exclude, ctx.knobs.max_items);
        let paths: Vec<String> = neighbors.iter().map(|(p, _)| p.clone()).collect();
        let maps = codemaps_for(ctx, &paths, StructureScope::Public);

        for (path, similarity) in neighbors {
            if ctx.interrupted() {
                break;
            }
            let relevance = similarity.clamp(0.05, 1.0);
            let reason = format!("embedding neighbor (similarity {similarity:.2})");
            match maps.iter().find(|m| m.path == path) {
                Some(map) => {
                    out.candidates
                        .push(codemap_candidate(ctx, "semantic", map, relevance, reason, "embedding index"));
                }
                None => {
                    // indexed file without extractable structure: reference only
                    let mut candidate = SliceCandidate::new(
                        "semantic",
                        path.clone(),
                        Representation::Reference,
                        0,
                        relevance,
                        reason,
                        "embedding index",
                    );
                    candidate.ensure_reference_alternate(ctx.estimate);
                    candidate.apply_alternate(0);
                    out.candidates.push(candidate);
                }
            }
            out.matched.push(path);
        }
        out
    }
}
