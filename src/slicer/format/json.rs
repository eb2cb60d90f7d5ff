//! JSON rendering. Keys keep insertion order (`preserve_order`), undefined
//! fields are omitted rather than emitted as null.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::slicer::result::{budget_usage_tenths, ContextResult};

use super::rfc3339;

fn round2(value: f32) -> Value {
    json!((value as f64 * 100.0).round() / 100.0)
}

pub fn format_json(result: &ContextResult, generated: DateTime<Utc>) -> String {
    let mut root = Map::new();
    root.insert("version".to_string(), json!("1.0"));
    root.insert("generated".to_string(), json!(rfc3339(generated)));
    root.insert("task".to_string(), json!(result.task));

    let tenths = budget_usage_tenths(result.total_tokens, result.budget);
    let mut summary = Map::new();
    summary.insert("files".to_string(), json!(result.files.len()));
    summary.insert("tokens".to_string(), json!(result.total_tokens));
    summary.insert("budget".to_string(), json!(result.budget));
    summary.insert("budgetUsage".to_string(), json!(tenths as f64 / 10.0));
    root.insert("summary".to_string(), Value::Object(summary));

    if let Some(prompt) = &result.prompt {
        root.insert("prompt".to_string(), json!(prompt));
    }
    if let Some(tree) = &result.tree {
        root.insert("tree".to_string(), json!(tree));
    }

    let files: Vec<Value> = result
        .files
        .iter()
        .map(|file| {
            let mut obj = Map::new();
            obj.insert("path".to_string(), json!(file.path));
            obj.insert("tokens".to_string(), json!(file.tokens));
            obj.insert("mode".to_string(), json!(file.mode.to_string()));
            obj.insert("relevance".to_string(), round2(file.relevance));
            if let Some(content) = &file.content {
                obj.insert("content".to_string(), json!(content));
            }
            if let Some(codemap) = &file.codemap {
                obj.insert("codemap".to_string(), json!(codemap));
            }
            Value::Object(obj)
        })
        .collect();
    root.insert("files".to_string(), Value::Array(files));

    if let Some(plan) = &result.plan {
        root.insert("plan".to_string(), json!(plan));
    }
    if let Some(chat_id) = &result.chat_id {
        root.insert("chatId".to_string(), json!(chat_id));
    }

    serde_json::to_string_pretty(&Value::Object(root)).unwrap_or_else(|_| "{}".to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::candidate::Representation;
    use crate::slicer::result::ContextFile;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn sample() -> ContextResult {
        ContextResult {
            task: "fix auth".to_string(),
            files: vec![ContextFile {
                path: "src/auth.rs".to_string(),
                tokens: 100,
                mode: Representation::Codemap,
                content: None,
                codemap: Some("src/auth.rs (rust)\n".to_string()),
                strategy: "symbols".to_string(),
                reason: "symbol map".to_string(),
                relevance: 0.654,
            }],
            total_tokens: 100,
            budget: 4000,
            strategy_stats: BTreeMap::new(),
            tree: None,
            prompt: None,
            plan: None,
            chat_id: None,
            history: None,
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_shape_and_omission() {
        let parsed: Value = serde_json::from_str(&format_json(&sample(), stamp())).unwrap();
        assert_eq!(parsed["version"], "1.0");
        assert_eq!(parsed["generated"], "2025-06-01T12:00:00Z");
        assert_eq!(parsed["summary"]["files"], 1);
        assert_eq!(parsed["summary"]["budgetUsage"], 2.5);
        assert!(parsed.get("prompt").is_none(), "absent fields are omitted");
        assert!(parsed.get("tree").is_none());
        let file = &parsed["files"][0];
        assert_eq!(file["mode"], "codemap");
        assert_eq!(file["relevance"], 0.65);
        assert!(file.get("content").is_none());
        assert!(file["codemap"].is_string());
    }

    #[test]
    fn test_key_order_preserved() {
        let text = format_json(&sample(), stamp());
        let version_pos = text.find("\"version\"").unwrap();
        let generated_pos = text.find("\"generated\"").unwrap();
        let task_pos = text.find("\"task\"").unwrap();
        let files_pos = text.find("\"files\": [").unwrap();
        assert!(version_pos < generated_pos);
        assert!(generated_pos < task_pos);
        assert!(task_pos < files_pos);
    }
}
