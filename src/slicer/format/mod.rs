//! Output formatters for a `ContextResult`: XML, Markdown, JSON. Rendering
//! is pure; the timestamp is injected so output stays reproducible in tests.

mod json;
mod markdown;
mod xml;

use chrono::{DateTime, SecondsFormat, Utc};

use super::result::ContextResult;
use super::SliceError;

pub use json::format_json;
pub use markdown::format_markdown;
pub use xml::format_xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xml,
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(Self::Xml),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(SliceError::InvalidRequest(format!(
                "unknown output format '{other}' (expected xml, markdown, or json)"
            ))),
        }
    }
}

/// Render with an explicit timestamp.
pub fn format_result_at(
    result: &ContextResult,
    format: OutputFormat,
    generated: DateTime<Utc>,
) -> String {
    match format {
        OutputFormat::Xml => format_xml(result, generated),
        OutputFormat::Markdown => format_markdown(result),
        OutputFormat::Json => format_json(result, generated),
    }
}

/// Render stamped with the current time.
pub fn format_result(result: &ContextResult, format: OutputFormat) -> String {
    format_result_at(result, format, Utc::now())
}

pub(super) fn rfc3339(generated: DateTime<Utc>) -> String {
    generated.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `X.Y` percent string with integer truncation.
pub(super) fn usage_percent(tokens: u32, budget: u32) -> String {
    let tenths = super::result::budget_usage_tenths(tokens, budget);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Fenced-block language for a path, by extension.
pub(super) fn fence_language(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "rs" => "rust",
        "py" => "python",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" => "javascript",
        "go" => "go",
        "java" => "java",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yml" | "yaml" => "yaml",
        "sh" | "bash" => "bash",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        _ => "",
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_percent_truncates() {
        assert_eq!(usage_percent(3700, 4000), "92.5");
        assert_eq!(usage_percent(3999, 4000), "99.9");
        assert_eq!(usage_percent(4000, 4000), "100.0");
        assert_eq!(usage_percent(1, 3000), "0.0");
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("src/auth/login.ts"), "typescript");
        assert_eq!(fence_language("main.rs"), "rust");
        assert_eq!(fence_language("unknown.xyz"), "");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
