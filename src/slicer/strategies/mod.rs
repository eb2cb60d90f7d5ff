//! Builtin strategy plugins plus the helpers they share.

mod ast;
mod complexity;
mod config_files;
mod diff;
mod docs;
mod explicit;
mod forest;
mod graph;
mod inventory;
mod keyword;
mod semantic;
mod skeleton;
mod symbols;

use crate::inspector::{CodeMap, StructureOptions, StructureScope};

use super::candidate::{Alternate, Representation, SliceCandidate};
use super::strategy::{Strategy, StrategyContext};

/// All 13 builtins in canonical order.
pub fn builtin() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(explicit::ExplicitStrategy),
        Box::new(inventory::InventoryStrategy),
        Box::new(skeleton::SkeletonStrategy),
        Box::new(keyword::KeywordStrategy),
        Box::new(symbols::SymbolsStrategy),
        Box::new(ast::AstStrategy),
        Box::new(config_files::ConfigStrategy),
        Box::new(diff::DiffStrategy),
        Box::new(graph::GraphStrategy),
        Box::new(semantic::SemanticStrategy),
        Box::new(complexity::ComplexityStrategy),
        Box::new(docs::DocsStrategy),
        Box::new(forest::ForestStrategy),
    ]
}

// ── Shared helpers ─────────────────────────────────────────────────────────────

/// One codemap per path through the inspector; paths without structure are
/// silently dropped.
pub(crate) fn codemaps_for(
    ctx: &StrategyContext,
    paths: &[String],
    scope: StructureScope,
) -> Vec<CodeMap> {
    let opts = StructureOptions {
        scope,
        max_results: None,
    };
    match ctx.inspector.structure(paths, &opts) {
        Ok(result) => result.codemaps.into_iter().filter(|m| !m.is_empty()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Build a codemap-representation candidate with its reference alternate.
pub(crate) fn codemap_candidate(
    ctx: &StrategyContext,
    strategy: &str,
    map: &CodeMap,
    relevance: f32,
    reason: impl Into<String>,
    source: &str,
) -> SliceCandidate {
    let rendered = map.render();
    let mut candidate = SliceCandidate::new(
        strategy,
        map.path.clone(),
        Representation::Codemap,
        (ctx.estimate)(&rendered),
        relevance,
        reason,
        source,
    );
    candidate.codemap = Some(rendered);
    candidate.ensure_reference_alternate(ctx.estimate);
    candidate
}

/// Attach a codemap alternate when it is actually cheaper than the chosen
/// representation.
pub(crate) fn attach_codemap_alternate(
    ctx: &StrategyContext,
    candidate: &mut SliceCandidate,
    map: &CodeMap,
) {
    let rendered = map.render();
    let tokens = (ctx.estimate)(&rendered);
    if tokens < candidate.tokens {
        candidate.alternates.push(Alternate {
            representation: Representation::Codemap,
            tokens,
            content: Some(rendered),
        });
    }
}

/// Snippet text from 1-based hit lines: ± `context` lines per hit, overlapping
/// windows merged, gaps marked. Deterministic for a given hit list.
pub(crate) fn snippet_from_lines(content: &str, hit_lines: &[usize], context: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() || hit_lines.is_empty() {
        return String::new();
    }

    // merge windows
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut sorted_hits = hit_lines.to_vec();
    sorted_hits.sort_unstable();
    sorted_hits.dedup();
    for &hit in &sorted_hits {
        let idx = hit.saturating_sub(1);
        let lo = idx.saturating_sub(context);
        let hi = (idx + context + 1).min(lines.len());
        match ranges.last_mut() {
            Some((_, prev_hi)) if lo <= *prev_hi => *prev_hi = (*prev_hi).max(hi),
            _ => ranges.push((lo, hi)),
        }
    }

    let mut out = String::new();
    for (i, (lo, hi)) in ranges.iter().enumerate() {
        if i > 0 {
            out.push_str("...\n");
        }
        for line in &lines[*lo..*hi] {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Entry-point file names the skeleton strategy anchors on.
pub(crate) const ENTRY_POINT_NAMES: &[&str] = &[
    "main.rs",
    "lib.rs",
    "mod.rs",
    "build.rs",
    "index.ts",
    "index.tsx",
    "index.js",
    "main.ts",
    "main.tsx",
    "app.ts",
    "app.tsx",
    "cli.ts",
    "main.py",
    "app.py",
    "__main__.py",
    "main.go",
    "Main.java",
];

pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub(crate) fn is_doc_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".rst") || lower.ends_with(".txt")
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_single_hit_window() {
        let content = "l1\nl2\nl3\nl4\nl5\n";
        let snippet = snippet_from_lines(content, &[3], 1);
        assert_eq!(snippet, "l2\nl3\nl4\n");
    }

    #[test]
    fn test_snippet_merges_overlapping_windows() {
        let content = "l1\nl2\nl3\nl4\nl5\nl6\n";
        let snippet = snippet_from_lines(content, &[2, 3], 1);
        assert_eq!(snippet, "l1\nl2\nl3\nl4\n");
    }

    #[test]
    fn test_snippet_marks_gaps() {
        let content = (1..=20).map(|i| format!("l{i}\n")).collect::<String>();
        let snippet = snippet_from_lines(&content, &[2, 18], 1);
        assert!(snippet.contains("...\n"));
        assert!(snippet.contains("l1\n"));
        assert!(snippet.contains("l19\n"));
        assert!(!snippet.contains("l10\n"));
    }

    #[test]
    fn test_snippet_clamps_to_file_bounds() {
        let content = "only\n";
        let snippet = snippet_from_lines(content, &[1], 5);
        assert_eq!(snippet, "only\n");
    }
}
