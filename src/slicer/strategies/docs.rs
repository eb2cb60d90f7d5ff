//! `docs`: core documentation always, keyword-hit documentation on top.

use std::collections::BTreeMap;

use crate::inspector::{SearchMode, SearchOptions, StructureScope};
use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemaps_for, file_name, is_doc_path, snippet_from_lines};

pub struct DocsStrategy;

const SMALL_DOC_TOKENS: u32 = 800;

fn is_core_doc(path: &str) -> bool {
    let name = file_name(path).to_ascii_lowercase();
    let depth = path.matches('/').count();
    (depth == 0
        && (name.starts_with("readme")
            || name.starts_with("architecture")
            || name.starts_with("contributing")))
        || (path.to_ascii_lowercase().starts_with("docs/") && name.starts_with("index"))
}

impl DocsStrategy {
    fn build_doc_candidate(
        ctx: &StrategyContext,
        path: &str,
        content: &str,
        relevance: f32,
        reason: String,
        hits: &[usize],
    ) -> SliceCandidate {
        let tokens = (ctx.estimate)(content);
        let mut candidate = if tokens <= SMALL_DOC_TOKENS {
            let mut c = SliceCandidate::new(
                "docs",
                path,
                Representation::Full,
                tokens,
                relevance,
                reason,
                "docs scan",
            );
            c.content = Some(content.to_string());
            c
        } else if !hits.is_empty() {
            let snippet = snippet_from_lines(content, hits, ctx.knobs.context_lines);
            let mut c = SliceCandidate::new(
                "docs",
                path,
                Representation::Snippet,
                (ctx.estimate)(&snippet),
                relevance,
                reason,
                "docs scan",
            );
            c.content = Some(snippet);
            c
        } else {
            // large doc without hits: section outline instead of prose
            match codemaps_for(ctx, &[path.to_string()], StructureScope::Full).pop() {
                Some(map) => {
                    let rendered = map.render();
                    let mut c = SliceCandidate::new(
                        "docs",
                        path,
                        Representation::Codemap,
                        (ctx.estimate)(&rendered),
                        relevance,
                        reason,
                        "docs scan",
                    );
                    c.codemap = Some(rendered);
                    c
                }
                None => {
                    let head: String = content
                        .lines()
                        .take(40)
                        .map(|l| format!("{l}\n"))
                        .collect();
                    let mut c = SliceCandidate::new(
                        "docs",
                        path,
                        Representation::Snippet,
                        (ctx.estimate)(&head),
                        relevance,
                        reason,
                        "docs scan",
                    );
                    c.content = Some(head);
                    c
                }
            }
        };
        candidate.match_count = hits.len() as u32;
        candidate.ensure_reference_alternate(ctx.estimate);
        candidate
    }
}

impl Strategy for DocsStrategy {
    fn name(&self) -> &'static str {
        "docs"
    }

    fn weight(&self) -> f32 {
        0.6
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
            Err(e) => return StrategyOutput::warning(format!("docs: file listing failed: {e}")),
        };

        // keyword hits in docs, grouped per file
        let mut hits_by_doc: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        if !ctx.keywords.is_empty() {
            let opts = SearchOptions {
                mode: SearchMode::Content,
                extensions: vec!["md".to_string(), "rst".to_string(), "txt".to_string()],
                context_lines: 0,
                max_results: ctx.knobs.max_items * 20,
                regex: false,
            };
            if let Ok(result) = ctx.inspector.search(ctx.keywords, &opts) {
                for m in result.matches {
                    hits_by_doc.entry(m.path).or_default().push(m.line);
                }
            }
        }

        let core: Vec<String> = files.iter().filter(|f| is_core_doc(f)).cloned().collect();
        let mut hit_docs: Vec<(String, usize)> = hits_by_doc
            .iter()
            .filter(|(path, _)| is_doc_path(path) && !core.contains(path))
            .map(|(path, lines)| (path.clone(), lines.len()))
            .collect();
        hit_docs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut picked: Vec<(String, f32, String)> = core
            .into_iter()
            .map(|p| (p, 0.7, "core documentation".to_string()))
            .collect();
        for (path, hits) in hit_docs {
            picked.push((path, 0.5, format!("{hits} keyword hits in documentation")));
        }
        picked.truncate(ctx.knobs.max_items);

        for (path, relevance, reason) in picked {
            if ctx.interrupted() {
                break;
            }
            let content = match ctx.inspector.read_file(&path, None, None) {
                Ok(content) => content,
                Err(e) => {
                    out.warnings.push(format!("docs: cannot read {path}: {e}"));
                    continue;
                }
            };
            let hits: Vec<usize> = hits_by_doc
                .get(&path)
                .map(|lines| {
                    lines
                        .iter()
                        .copied()
                        .take(ctx.knobs.max_hits_per_file)
                        .collect()
                })
                .unwrap_or_default();
            let candidate =
                Self::build_doc_candidate(ctx, &path, &content, relevance, reason, &hits);
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
    fn test_core_doc_detection() {
        assert!(is_core_doc("README.md"));
        assert!(is_core_doc("ARCHITECTURE.md"));
        assert!(is_core_doc("docs/index.md"));
        assert!(!is_core_doc("src/README.md"));
        assert!(!is_core_doc("docs/guide/setup.md"));
    }
}
