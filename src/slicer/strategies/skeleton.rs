//! `skeleton`: entry points and structural files as codemaps.

use crate::inspector::StructureScope;
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for, file_name, ENTRY_POINT_NAMES};

pub struct SkeletonStrategy;

fn is_structural(path: &str) -> bool {
    let name = file_name(path);
    if ENTRY_POINT_NAMES.contains(&name) {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    lower.contains("router") || lower.contains("routes")
}

/// Shallow paths first: an entry point near the root outranks a nested one.
fn depth_of(path: &str) -> usize {
    path.matches('/').count()
}

impl Strategy for SkeletonStrategy {
    fn name(&self) -> &'static str {
        "skeleton"
    }

    fn weight(&self) -> f32 {
        0.65
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.20)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let files = match ctx
            .inspector
            .list_files(&ctx.request.include, &ctx.request.exclude)
        {
            Ok(files) => files,
            Err(e) => return StrategyOutput::warning(format!("skeleton: file listing failed: {e}")),
        };

        let mut structural: Vec<String> = files.into_iter().filter(|f| is_structural(f)).collect();
        structural.sort_by(|a, b| depth_of(a).cmp(&depth_of(b)).then_with(|| a.cmp(b)));
        structural.truncate(ctx.knobs.max_items);

        for map in codemaps_for(ctx, &structural, StructureScope::Public) {
            if ctx.interrupted() {
                break;
            }
            out.matched.push(map.path.clone());
            out.candidates.push(codemap_candidate(
                ctx,
                "skeleton",
                &map,
                0.7,
                "entry point / structural file",
                "tree scan",
            ));
        }
        out
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_detection() {
        assert!(is_structural("src/main.rs"));
        assert!(is_structural("src/api/routes.ts"));
        assert!(is_structural("app/router.py"));
        assert!(!is_structural("src/auth/login.ts"));
    }

    #[test]
    fn test_depth_ordering_key() {
        assert!(depth_of("main.rs") < depth_of("src/deep/mod.rs"));
    }
}
