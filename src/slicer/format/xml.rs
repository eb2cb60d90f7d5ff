//! XML rendering. Free text travels in CDATA; attribute values use the five
//! standard entity escapes. Child order is fixed and part of the contract.

use chrono::{DateTime, Utc};

use crate::slicer::result::ContextResult;

use super::{rfc3339, usage_percent};

/// The five standard entity escapes, ampersand first.
pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// CDATA wrapping; an embedded `]]>` is split across two sections.
pub(crate) fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn format_xml(result: &ContextResult, generated: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<ivo_context version=\"1.0\" generated=\"{}\">\n",
        escape_attr(&rfc3339(generated))
    ));

    if !result.task.is_empty() {
        out.push_str(&format!("  <task>{}</task>\n", cdata(&result.task)));
    }

    out.push_str("  <summary>\n");
    out.push_str(&format!(
        "    <total_files>{}</total_files>\n",
        result.files.len()
    ));
    out.push_str(&format!(
        "    <total_tokens>{}</total_tokens>\n",
        result.total_tokens
    ));
    out.push_str(&format!("    <budget>{}</budget>\n", result.budget));
    out.push_str(&format!(
        "    <budget_usage>{}%</budget_usage>\n",
        usage_percent(result.total_tokens, result.budget)
    ));
    out.push_str("  </summary>\n");

    out.push_str("  <context_summary>\n    <strategies_used>\n");
    for (name, total) in &result.strategy_stats {
        out.push_str(&format!(
            "      <strategy name=\"{}\" files=\"{}\" tokens=\"{}\" />\n",
            escape_attr(name),
            total.count,
            total.tokens
        ));
    }
    out.push_str("    </strategies_used>\n  </context_summary>\n");

    if let Some(prompt) = &result.prompt {
        out.push_str(&format!("  <prompt>{}</prompt>\n", cdata(prompt)));
    }
    if let Some(history) = &result.history {
        out.push_str(&format!("  <history>{}</history>\n", cdata(history)));
    }
    if let Some(tree) = &result.tree {
        out.push_str(&format!(
            "  <directory_structure>{}</directory_structure>\n",
            cdata(tree)
        ));
    }

    out.push_str("  <files>\n");
    for file in &result.files {
        out.push_str(&format!(
            "    <file path=\"{}\" tokens=\"{}\" mode=\"{}\" relevance=\"{:.2}\" strategy=\"{}\" reason=\"{}\">\n",
            escape_attr(&file.path),
            file.tokens,
            file.mode,
            file.relevance,
            escape_attr(&file.strategy),
            escape_attr(&file.reason)
        ));
        if let Some(content) = &file.content {
            out.push_str(&format!("      <content>{}</content>\n", cdata(content)));
        }
        if let Some(codemap) = &file.codemap {
            out.push_str(&format!("      <codemap>{}</codemap>\n", cdata(codemap)));
        }
        out.push_str("    </file>\n");
    }
    out.push_str("  </files>\n");

    if let Some(plan) = &result.plan {
        out.push_str(&format!("  <plan>{}</plan>\n", cdata(plan)));
    }

    out.push_str("</ivo_context>\n");
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
