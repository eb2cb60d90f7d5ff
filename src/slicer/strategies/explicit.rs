//! `explicit`: paths mentioned verbatim in the task that resolve to files.

use lazy_static::lazy_static;
use regex::Regex;

use crate::inspector::StructureScope;
use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{attach_codemap_alternate, codemaps_for};

lazy_static! {
    // path-shaped: at least one separator or a file extension
    static ref PATH_TOKEN: Regex =
        Regex::new(r"[A-Za-z0-9_][A-Za-z0-9_./-]*\.[A-Za-z0-9]{1,8}").unwrap();
}

pub struct ExplicitStrategy;

/// Resolve a task mention against the repo file list: exact match first,
/// then a unique suffix match ("login.ts" finds "src/auth/login.ts").
fn resolve(mention: &str, files: &[String]) -> Option<String> {
    let normalized = mention.trim_start_matches("./");
    if files.iter().any(|f| f == normalized) {
        return Some(normalized.to_string());
    }
    let suffix: Vec<&String> = files
        .iter()
        .filter(|f| {
            f.ends_with(normalized)
                && f.len() > normalized.len()
                && f.as_bytes()[f.len() - normalized.len() - 1] == b'/'
        })
        .collect();
    match suffix.as_slice() {
        [only] => Some((*only).clone()),
        _ => None,
    }
}

impl Strategy for ExplicitStrategy {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn weight(&self) -> f32 {
        1.0
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        if ctx.request.task.is_empty() {
            return out;
        }

        let files = match ctx
            .inspector
            .list_files(&ctx.request.include, &ctx.request.exclude)
        {
            Ok(files) => files,
            Err(e) => return StrategyOutput::warning(format!("explicit: file listing failed: {e}")),
        };

        let mut mentions: Vec<String> = PATH_TOKEN
            .find_iter(&ctx.request.task)
            .map(|m| m.as_str().to_string())
            .collect();
        mentions.dedup();

        for mention in mentions {
            if out.candidates.len() >= ctx.knobs.max_items || ctx.interrupted() {
                break;
            }
            let Some(path) = resolve(&mention, &files) else {
                continue;
            };
            if out.candidates.iter().any(|c| c.path == path) {
                continue;
            }
            let content = match ctx.inspector.read_file(&path, None, None) {
                Ok(content) => content,
                Err(e) => {
                    out.warnings.push(format!("explicit: cannot read {path}: {e}"));
                    continue;
                }
            };
            let mut candidate = SliceCandidate::new(
                "explicit",
                path.clone(),
                Representation::Full,
                (ctx.estimate)(&content),
                1.0,
                format!("mentioned in task as '{mention}'"),
                "task mention",
            );
            candidate.content = Some(content.clone());
            for map in codemaps_for(ctx, &[path.clone()], StructureScope::Full) {
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
