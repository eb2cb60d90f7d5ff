//! `diff`: recently changed files, newest first, as head snippets.

use std::time::{Duration, SystemTime};

use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

pub struct DiffStrategy;

const RECENT_WINDOW: Duration = Duration::from_secs(7 * 24 * 3600);

impl Strategy for DiffStrategy {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn weight(&self) -> f32 {
        0.45
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.15)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let stats = match ctx.inspector.file_stats() {
            Ok(stats) => stats,
            Err(e) => return StrategyOutput::warning(format!("diff: file stats failed: {e}")),
        };

        let now = SystemTime::now();
        let mut recent: Vec<(String, Duration)> = stats
            .into_iter()
            .filter_map(|s| {
                let age = now.duration_since(s.modified?).ok()?;
                (age <= RECENT_WINDOW).then_some((s.path, age))
            })
            .collect();
        recent.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        recent.truncate(ctx.knobs.max_items);

        for (path, age) in recent {
            if ctx.interrupted() {
                break;
            }
            let head = match ctx
                .inspector
                .read_file(&path, Some(0), Some(ctx.knobs.context_lines.max(1)))
            {
                Ok(head) => head,
                Err(e) => {
                    out.warnings.push(format!("diff: cannot read {path}: {e}"));
                    continue;
                }
            };
            if head.is_empty() {
                continue;
            }
            // fresher files score higher, 0.5..0.8
            let freshness =
                1.0 - (age.as_secs_f32() / RECENT_WINDOW.as_secs_f32()).clamp(0.0, 1.0);
            let mut candidate = SliceCandidate::new(
                "diff",
                path.clone(),
                Representation::Snippet,
                (ctx.estimate)(&head),
                0.5 + 0.3 * freshness,
                format!("changed {} ago", human_age(age)),
                "recent changes",
            );
            candidate.content = Some(head);
            candidate.ensure_reference_alternate(ctx.estimate);
            out.matched.push(path);
            out.candidates.push(candidate);
        }
        out
    }
}

fn human_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 24 * 3600 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / (24 * 3600))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
