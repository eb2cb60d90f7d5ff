//! Round-trip laws for the formatter outputs, driven through the real engine.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use ivo::inspector::FsInspector;
use ivo::slicer::{
    assemble, format_result_at, plan, ContextResult, Intensity, OutputFormat, PlanOptions,
    SliceRequest, StrategyRegistry,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture_result() -> ContextResult {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/auth.rs",
        "pub fn login(user: &str) -> bool {\n    // check auth token here\n    true\n}\n",
    );
    write(
        dir.path(),
        "src/session.rs",
        "pub fn session_token() -> String {\n    // auth session token mint\n    String::new()\n}\n",
    );
    write(dir.path(), "README.md", "# Service\n\nLogin and auth notes.\n");

    let inspector = FsInspector::new(dir.path()).unwrap();
    let registry = StrategyRegistry::builtin();
    let mut req = SliceRequest::new("auth token login", dir.path(), 4000);
    req.intensity = Intensity::Lite;
    req.strategies = vec!["keyword".to_string(), "docs".to_string()];
    let plan = plan(req, &inspector, &registry, &PlanOptions::default()).unwrap();
    assemble(&plan, 4000, &inspector, &registry)
        .unwrap()
        .context
}

fn stamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

// ── XML ─────────────────────────────────────────────────────

/// Pull path attributes back out of the `<files>` block, in order.
fn extract_paths(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in xml.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("<file path=\"") {
            if let Some(end) = rest.find('"') {
                out.push(rest[..end].to_string());
            }
        }
    }
    out
}

#[test]
fn xml_paths_roundtrip_in_order() {
    let result = fixture_result();
    assert!(!result.files.is_empty(), "fixture must select something");
    let xml = format_result_at(&result, OutputFormat::Xml, stamp());
    let expected: Vec<String> = result.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(extract_paths(&xml), expected);
}

#[test]
fn xml_formatting_is_idempotent() {
    let result = fixture_result();
    let first = format_result_at(&result, OutputFormat::Xml, stamp());
    let second = format_result_at(&result, OutputFormat::Xml, stamp());
    assert_eq!(first, second);
}

#[test]
fn xml_cdata_survives_terminator_in_content() {
    let mut result = fixture_result();
    result.files[0].content = Some("let s = \"]]>\";".to_string());
    let xml = format_result_at(&result, OutputFormat::Xml, stamp());
    assert!(xml.contains("]]]]><![CDATA[>"));
    // naive reassembly of the split sections restores the original text
    let reassembled = xml.replace("]]]]><![CDATA[>", "]]>");
    assert!(reassembled.contains("let s = \"]]>\";"));
}

// ── JSON ────────────────────────────────────────────────────

#[test]
fn json_roundtrip_is_structurally_equivalent() {
    let result = fixture_result();
    let text = format_result_at(&result, OutputFormat::Json, stamp());
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(parsed["version"], "1.0");
    assert_eq!(parsed["task"], result.task.as_str());
    assert_eq!(parsed["summary"]["files"], result.files.len() as u64);
    assert_eq!(parsed["summary"]["tokens"], result.total_tokens as u64);
    assert_eq!(parsed["summary"]["budget"], result.budget as u64);

    let files = parsed["files"].as_array().unwrap();
    assert_eq!(files.len(), result.files.len());
    for (json_file, file) in files.iter().zip(&result.files) {
        assert_eq!(json_file["path"], file.path.as_str());
        assert_eq!(json_file["tokens"], file.tokens as u64);
        assert_eq!(json_file["mode"], file.mode.to_string().as_str());
        match &file.content {
            Some(content) => assert_eq!(json_file["content"], content.as_str()),
            None => assert!(json_file.get("content").is_none()),
        }
    }
}

#[test]
fn json_omits_undefined_not_null() {
    let result = fixture_result();
    let text = format_result_at(&result, OutputFormat::Json, stamp());
    assert!(!text.contains("null"), "undefined fields are omitted: {text}");
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(parsed.get("chatId").is_none());
    assert!(parsed.get("plan").is_none());
}

// ── Markdown ────────────────────────────────────────────────

#[test]
fn markdown_layout_contains_all_sections() {
    let result = fixture_result();
    let md = format_result_at(&result, OutputFormat::Markdown, stamp());
    assert!(md.starts_with("# Context: auth token login\n"));
    assert!(md.contains("## Summary"));
    assert!(md.contains("- Files: "));
    assert!(md.contains("- Budget Usage: "));
    assert!(md.contains("## Files"));
    for file in &result.files {
        assert!(md.contains(&format!("### {}", file.path)));
    }
}
