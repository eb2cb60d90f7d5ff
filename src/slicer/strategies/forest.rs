//! `forest`: pre-rendered knowledge-graph digest for the repo, produced by
//! external tooling. One candidate, head-truncated at higher token counts.

use std::path::Path;

use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

pub struct ForestStrategy;

pub const DIGEST_RELATIVE_PATH: &str = ".ivo/forest.md";

fn digest_exists(root: &Path) -> bool {
    root.join(DIGEST_RELATIVE_PATH).is_file()
}

impl Strategy for ForestStrategy {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn weight(&self) -> f32 {
        0.4
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.10)
    }

    fn is_available(&self, ctx: &StrategyContext) -> bool {
        digest_exists(&ctx.request.root)
    }

    fn prerequisite(&self) -> &'static str {
        "knowledge-graph digest (.ivo/forest.md) not found"
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        // the digest lives outside the walk (dot-directory), so read it directly
        let raw = match std::fs::read_to_string(ctx.request.root.join(DIGEST_RELATIVE_PATH)) {
            Ok(raw) => raw,
            Err(e) => {
                return StrategyOutput::warning(format!("forest: cannot read digest: {e}"))
            }
        };

        let head_lines = ctx.knobs.context_lines.max(1);
        let total_lines = raw.lines().count();
        let mut candidate = if total_lines <= head_lines {
            let mut c = SliceCandidate::new(
                "forest",
                DIGEST_RELATIVE_PATH,
                Representation::Full,
                (ctx.estimate)(&raw),
                0.5,
                "knowledge-graph digest",
                "forest digest",
            );
            c.content = Some(raw);
            c
        } else {
            let head: String = raw
                .lines()
                .take(head_lines)
                .map(|l| format!("{l}\n"))
                .collect();
            let mut c = SliceCandidate::new(
                "forest",
                DIGEST_RELATIVE_PATH,
                Representation::Snippet,
                (ctx.estimate)(&head),
                0.5,
                format!("knowledge-graph digest (first {head_lines} of {total_lines} lines)"),
                "forest digest",
            );
            c.content = Some(head);
            c
        };
        candidate.ensure_reference_alternate(ctx.estimate);
        out.candidates.push(candidate);
        out
    }
}
