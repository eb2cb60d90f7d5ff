//! Markdown rendering: a human-skimmable layout of the same bundle.

use crate::slicer::result::ContextResult;

use super::{fence_language, usage_percent};

pub fn format_markdown(result: &ContextResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Context: {}\n\n", result.task));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- Files: {}\n", result.files.len()));
    out.push_str(&format!("- Tokens: {}\n", result.total_tokens));
    out.push_str(&format!(
        "- Budget Usage: {}%\n",
        usage_percent(result.total_tokens, result.budget)
    ));
    out.push('\n');

    if !result.strategy_stats.is_empty() {
        out.push_str("| Strategy | Files | Tokens |\n");
        out.push_str("| --- | --- | --- |\n");
        for (name, total) in &result.strategy_stats {
            out.push_str(&format!("| {} | {} | {} |\n", name, total.count, total.tokens));
        }
        out.push('\n');
    }

    if let Some(prompt) = &result.prompt {
        out.push_str("## Prompt\n\n");
        out.push_str(prompt);
        out.push_str("\n\n");
    }

    if let Some(history) = &result.history {
        out.push_str("## History\n\n");
        out.push_str(history);
        out.push_str("\n\n");
    }

    if let Some(tree) = &result.tree {
        out.push_str("## Directory Structure\n\n```\n");
        out.push_str(tree);
        if !tree.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    out.push_str("## Files\n\n");
    for file in &result.files {
        out.push_str(&format!("### {}\n\n", file.path));
        out.push_str(&format!(
            "**Tokens**: {} | **Mode**: {} | **Strategy**: {}\n\n",
            file.tokens, file.mode, file.strategy
        ));
        let body = file
            .content
            .as_deref()
            .or(file.codemap.as_deref())
            .unwrap_or("");
        out.push_str(&format!("```{}\n", fence_language(&file.path)));
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    if let Some(plan) = &result.plan {
        out.push_str("## Implementation Plan\n\n");
        out.push_str(plan);
        out.push('\n');
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::candidate::Representation;
    use crate::slicer::result::ContextFile;
    use std::collections::BTreeMap;

    fn sample() -> ContextResult {
        ContextResult {
            task: "fix auth".to_string(),
            files: vec![ContextFile {
                path: "src/auth.rs".to_string(),
                tokens: 120,
                mode: Representation::Snippet,
                content: Some("fn login() {}".to_string()),
                codemap: None,
                strategy: "keyword".to_string(),
                reason: "hits".to_string(),
                relevance: 0.8,
            }],
            total_tokens: 120,
            budget: 1000,
            strategy_stats: BTreeMap::new(),
            tree: None,
            prompt: None,
            plan: Some("1. patch login".to_string()),
            chat_id: None,
            history: None,
        }
    }

    #[test]
    fn test_layout() {
        let md = format_markdown(&sample());
        assert!(md.starts_with("# Context: fix auth\n"));
        assert!(md.contains("## Summary\n\n- Files: 1\n- Tokens: 120\n- Budget Usage: 12.0%\n"));
        assert!(md.contains("### src/auth.rs\n\n**Tokens**: 120 | **Mode**: snippet | **Strategy**: keyword\n"));
        assert!(md.contains("```rust\nfn login() {}\n```"));
        assert!(md.contains("## Implementation Plan\n\n1. patch login\n"));
    }

    #[test]
    fn test_tree_fenced() {
        let mut result = sample();
        result.tree = Some("repo/\n  src/\n".to_string());
        let md = format_markdown(&result);
        assert!(md.contains("## Directory Structure\n\n```\nrepo/\n  src/\n```\n"));
    }
}
