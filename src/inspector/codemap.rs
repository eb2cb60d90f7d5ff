//! Regex-based code-structure extraction: one `CodeMap` per source file.
//! Covers Rust, Python, TypeScript/JavaScript, Go, Java, plus Markdown
//! section structure. Line-oriented on purpose; a full parser buys little
//! for a structural summary.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::StructureScope;

// ── Model ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFunction {
    pub name: String,
    pub signature: String,
    pub is_async: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeType {
    pub name: String,
    /// "struct" | "enum" | "trait" | "interface" | "alias" | "const"
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownSection {
    pub depth: usize,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBlockStats {
    pub count: usize,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMap {
    pub path: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<CodeClass>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<CodeFunction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<CodeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<MarkdownSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frontmatter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_blocks: Option<CodeBlockStats>,
}

impl CodeMap {
    fn new(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            exports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            types: Vec::new(),
            dependencies: Vec::new(),
            sections: Vec::new(),
            frontmatter: Vec::new(),
            code_blocks: None,
        }
    }

    /// True when extraction found no structure worth keeping.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
            && self.classes.is_empty()
            && self.functions.is_empty()
            && self.types.is_empty()
            && self.dependencies.is_empty()
            && self.sections.is_empty()
    }

    /// Compact text form; this is what a codemap candidate materializes as.
    pub fn render(&self) -> String {
        let mut out = format!("{} ({})\n", self.path, self.language);
        if !self.exports.is_empty() {
            out.push_str(&format!("  exports: {}\n", self.exports.join(", ")));
        }
        for class in &self.classes {
            out.push_str(&format!("  class {}\n", class.name));
            if !class.methods.is_empty() {
                out.push_str(&format!("    methods: {}\n", class.methods.join(", ")));
            }
            if !class.properties.is_empty() {
                out.push_str(&format!("    properties: {}\n", class.properties.join(", ")));
            }
        }
        for func in &self.functions {
            let marker = if func.is_async { "async fn" } else { "fn" };
            out.push_str(&format!("  {} {}{}\n", marker, func.name, func.signature));
        }
        for ty in &self.types {
            out.push_str(&format!("  type {} ({})\n", ty.name, ty.kind));
        }
        if !self.dependencies.is_empty() {
            out.push_str(&format!("  deps: {}\n", self.dependencies.join(", ")));
        }
        for section in &self.sections {
            out.push_str(&format!(
                "  {} {}\n",
                "#".repeat(section.depth),
                section.title
            ));
        }
        if let Some(blocks) = &self.code_blocks {
            out.push_str(&format!(
                "  code blocks: {} [{}]\n",
                blocks.count,
                blocks.languages.join(", ")
            ));
        }
        out
    }
}

// ── Language detection ─────────────────────────────────────────────────────────

/// Language tag for a path, or None when no extractor covers it.
pub fn language_of(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "rs" => Some("rust"),
        "py" => Some("python"),
        "ts" | "tsx" => Some("typescript"),
        "js" | "jsx" | "mjs" => Some("javascript"),
        "go" => Some("go"),
        "java" => Some("java"),
        "md" | "markdown" => Some("markdown"),
        _ => None,
    }
}

/// Extract a codemap, or None for unsupported languages.
pub fn extract_codemap(path: &str, content: &str, scope: StructureScope) -> Option<CodeMap> {
    let language = language_of(path)?;
    let mut map = CodeMap::new(path, language);
    match language {
        "rust" => extract_rust(content, scope, &mut map),
        "python" => extract_python(content, scope, &mut map),
        "typescript" | "javascript" => extract_ts_js(content, scope, &mut map),
        "go" => extract_go(content, scope, &mut map),
        "java" => extract_java(content, &mut map),
        "markdown" => extract_markdown(content, &mut map),
        _ => return None,
    }
    Some(map)
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0i32;
    for ch in line.chars() {
        match ch {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

// ── Rust ───────────────────────────────────────────────────────────────────────

lazy_static! {
    static ref RS_FN: Regex = Regex::new(
        r"^\s*(pub(?:\([^)]*\))?\s+)?(async\s+)?fn\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:<[^>]*>\s*)?\(([^)]*)\)(?:\s*->\s*([^{;]+?))?\s*(?:\{|;|where)"
    )
    .unwrap();
    static ref RS_TYPE: Regex = Regex::new(
        r"^\s*(pub(?:\([^)]*\))?\s+)?(struct|enum|trait|type)\s+([a-zA-Z_][a-zA-Z0-9_]*)"
    )
    .unwrap();
    static ref RS_IMPL: Regex = Regex::new(
        r"^\s*impl(?:<[^>]*>)?\s+(?:[a-zA-Z_][a-zA-Z0-9_:]*(?:<[^>]*>)?\s+for\s+)?([a-zA-Z_][a-zA-Z0-9_]*)"
    )
    .unwrap();
    static ref RS_USE: Regex = Regex::new(r"^\s*(?:pub\s+)?use\s+([a-zA-Z_][a-zA-Z0-9_:]*)").unwrap();
    static ref RS_MOD: Regex = Regex::new(r"^\s*(pub\s+)?mod\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*;").unwrap();
}

fn extract_rust(content: &str, scope: StructureScope, map: &mut CodeMap) {
    let mut current_impl: Option<(String, i32)> = None;

    for line in content.lines() {
        if let Some((_, depth)) = &mut current_impl {
            *depth += brace_delta(line);
            if *depth <= 0 {
                current_impl = None;
            }
        }

        if let Some(caps) = RS_IMPL.captures(line) {
            if line.trim_start().starts_with("impl") {
                let name = caps[1].to_string();
                let depth = brace_delta(line);
                if !map.classes.iter().any(|c| c.name == name) {
                    map.classes.push(CodeClass {
                        name: name.clone(),
                        methods: Vec::new(),
                        properties: Vec::new(),
                    });
                }
                current_impl = Some((name, depth));
                continue;
            }
        }

        if let Some(caps) = RS_FN.captures(line) {
            let is_pub = caps.get(1).is_some();
            if scope == StructureScope::Public && !is_pub && current_impl.is_none() {
                continue;
            }
            let name = caps[3].to_string();
            let params = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
            let signature = match caps.get(5) {
                Some(ret) => format!("({}) -> {}", params, ret.as_str().trim()),
                None => format!("({params})"),
            };
            let is_async = caps.get(2).is_some();
            if let Some((impl_name, _)) = &current_impl {
                if let Some(class) = map.classes.iter_mut().find(|c| &c.name == impl_name) {
                    class.methods.push(name.clone());
                }
            } else {
                if is_pub {
                    map.exports.push(name.clone());
                }
                map.functions.push(CodeFunction {
                    name,
                    signature,
                    is_async,
                });
            }
            continue;
        }

        if let Some(caps) = RS_TYPE.captures(line) {
            let is_pub = caps.get(1).is_some();
            if scope == StructureScope::Public && !is_pub {
                continue;
            }
            let kind = match &caps[2] {
                "type" => "alias",
                other => other,
            };
            let name = caps[3].to_string();
            if is_pub {
                map.exports.push(name.clone());
            }
            map.types.push(CodeType {
                name,
                kind: kind.to_string(),
            });
            continue;
        }

        if let Some(caps) = RS_USE.captures(line) {
            let dep = caps[1].to_string();
            // keep crate-internal and external roots, drop std noise
            let root = dep.split("::").next().unwrap_or("");
            if root != "std" && root != "core" && root != "alloc" {
                push_unique(&mut map.dependencies, dep);
            }
            continue;
        }

        if let Some(caps) = RS_MOD.captures(line) {
            push_unique(&mut map.dependencies, format!("mod {}", &caps[2]));
        }
    }
}

// ── Python ─────────────────────────────────────────────────────────────────────

lazy_static! {
    static ref PY_DEF: Regex =
        Regex::new(r"^(\s*)(async\s+)?def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(([^)]*)").unwrap();
    static ref PY_CLASS: Regex =
        Regex::new(r"^class\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap();
    static ref PY_IMPORT: Regex =
        Regex::new(r"^(?:from\s+([a-zA-Z_][a-zA-Z0-9_.]*)\s+import|import\s+([a-zA-Z_][a-zA-Z0-9_.]*))").unwrap();
}

fn extract_python(content: &str, scope: StructureScope, map: &mut CodeMap) {
    let mut current_class: Option<String> = None;

    for line in content.lines() {
        if let Some(caps) = PY_CLASS.captures(line) {
            let name = caps[1].to_string();
            map.exports.push(name.clone());
            map.classes.push(CodeClass {
                name: name.clone(),
                methods: Vec::new(),
                properties: Vec::new(),
            });
            current_class = Some(name);
            continue;
        }
        if let Some(caps) = PY_DEF.captures(line) {
            let indent = caps[1].len();
            let name = caps[3].to_string();
            if scope == StructureScope::Public && name.starts_with('_') {
                continue;
            }
            let is_async = caps.get(2).is_some();
            if indent > 0 {
                if let Some(class_name) = &current_class {
                    if let Some(class) = map.classes.iter_mut().find(|c| c.name == *class_name) {
                        class.methods.push(name);
                    }
                }
            } else {
                current_class = None;
                map.exports.push(name.clone());
                let params = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
                map.functions.push(CodeFunction {
                    name,
                    signature: format!("({params})"),
                    is_async,
                });
            }
            continue;
        }
        if let Some(caps) = PY_IMPORT.captures(line) {
            let dep = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string());
            if let Some(dep) = dep {
                push_unique(&mut map.dependencies, dep);
            }
        }
    }
}

// ── TypeScript / JavaScript ────────────────────────────────────────────────────

lazy_static! {
    static ref TS_FN: Regex = Regex::new(
        r"^\s*(export\s+)?(default\s+)?(async\s+)?function\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*(?:<[^>]*>)?\(([^)]*)"
    )
    .unwrap();
    static ref TS_ARROW: Regex = Regex::new(
        r"^\s*(export\s+)?const\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*(?::[^=]+)?=\s*(async\s+)?(?:\([^)]*\)|[a-zA-Z_$][a-zA-Z0-9_$]*)\s*(?::[^=]+)?=>"
    )
    .unwrap();
    static ref TS_CLASS: Regex = Regex::new(
        r"^\s*(export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([a-zA-Z_$][a-zA-Z0-9_$]*)"
    )
    .unwrap();
    static ref TS_TYPE: Regex = Regex::new(
        r"^\s*(export\s+)?(interface|type|enum)\s+([a-zA-Z_$][a-zA-Z0-9_$]*)"
    )
    .unwrap();
    static ref TS_METHOD: Regex = Regex::new(
        r"^\s{2,}(?:public\s+|private\s+|protected\s+|static\s+|readonly\s+)*(async\s+)?([a-zA-Z_$][a-zA-Z0-9_$]*)\s*\([^)]*\)\s*(?::[^{]+)?\{"
    )
    .unwrap();
    static ref TS_IMPORT: Regex = Regex::new(
        r#"(?:import\s+(?:[^'"]*?\s+from\s+)?|require\s*\(\s*)['"]([^'"]+)['"]"#
    )
    .unwrap();
    static ref TS_EXPORT_LIST: Regex =
        Regex::new(r"^\s*export\s*\{\s*([^}]+)\s*\}").unwrap();
}

fn extract_ts_js(content: &str, scope: StructureScope, map: &mut CodeMap) {
    let mut current_class: Option<(String, i32)> = None;

    for line in content.lines() {
        if let Some((_, depth)) = &mut current_class {
            *depth += brace_delta(line);
            if *depth <= 0 {
                current_class = None;
            }
        }

        if let Some(caps) = TS_CLASS.captures(line) {
            let name = caps[2].to_string();
            if caps.get(1).is_some() {
                map.exports.push(name.clone());
            }
            map.classes.push(CodeClass {
                name: name.clone(),
                methods: Vec::new(),
                properties: Vec::new(),
            });
            current_class = Some((name, brace_delta(line)));
            continue;
        }

        if let Some(caps) = TS_FN.captures(line) {
            let exported = caps.get(1).is_some();
            if scope == StructureScope::Public && !exported {
                continue;
            }
            let name = caps[4].to_string();
            if exported {
                map.exports.push(name.clone());
            }
            let params = caps.get(5).map_or("", |m| m.as_str()).trim().to_string();
            map.functions.push(CodeFunction {
                name,
                signature: format!("({params})"),
                is_async: caps.get(3).is_some(),
            });
            continue;
        }

        if current_class.is_none() {
            if let Some(caps) = TS_ARROW.captures(line) {
                let exported = caps.get(1).is_some();
                if scope == StructureScope::Public && !exported {
                    continue;
                }
                let name = caps[2].to_string();
                if exported {
                    map.exports.push(name.clone());
                }
                map.functions.push(CodeFunction {
                    name,
                    signature: "()".to_string(),
                    is_async: caps.get(3).is_some(),
                });
                continue;
            }
        } else if let Some(caps) = TS_METHOD.captures(line) {
            let method = caps[2].to_string();
            if method != "if" && method != "for" && method != "while" && method != "switch" {
                if let Some((class_name, _)) = &current_class {
                    if let Some(class) = map.classes.iter_mut().find(|c| &c.name == class_name) {
                        class.methods.push(method);
                    }
                }
            }
            continue;
        }

        if let Some(caps) = TS_TYPE.captures(line) {
            let exported = caps.get(1).is_some();
            if scope == StructureScope::Public && !exported {
                continue;
            }
            let kind = match &caps[2] {
                "type" => "alias",
                other => other,
            };
            let name = caps[3].to_string();
            if exported {
                map.exports.push(name.clone());
            }
            map.types.push(CodeType {
                name,
                kind: kind.to_string(),
            });
            continue;
        }

        if let Some(caps) = TS_EXPORT_LIST.captures(line) {
            for name in caps[1].split(',') {
                let name = name.trim().split_whitespace().next().unwrap_or("");
                if !name.is_empty() {
                    push_unique(&mut map.exports, name.to_string());
                }
            }
        }

        for caps in TS_IMPORT.captures_iter(line) {
            push_unique(&mut map.dependencies, caps[1].to_string());
        }
    }
}

// ── Go ─────────────────────────────────────────────────────────────────────────

lazy_static! {
    static ref GO_FUNC: Regex = Regex::new(
        r"^func\s+(?:\(([^)]+)\)\s+)?([a-zA-Z_][a-zA-Z0-9_]*)\s*\(([^)]*)"
    )
    .unwrap();
    static ref GO_TYPE: Regex = Regex::new(
        r"^type\s+([a-zA-Z_][a-zA-Z0-9_]*)\s+(struct|interface)"
    )
    .unwrap();
    static ref GO_IMPORT: Regex = Regex::new(r#"^\s*(?:[a-zA-Z_]\w*\s+)?"([^"]+)"\s*$"#).unwrap();
}

fn extract_go(content: &str, scope: StructureScope, map: &mut CodeMap) {
    let mut in_import = false;

    for line in content.lines() {
        if line.starts_with("import (") {
            in_import = true;
            continue;
        }
        if in_import {
            if line.trim_start().starts_with(')') {
                in_import = false;
            } else if let Some(caps) = GO_IMPORT.captures(line) {
                push_unique(&mut map.dependencies, caps[1].to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("import ") {
            if let Some(caps) = GO_IMPORT.captures(rest) {
                push_unique(&mut map.dependencies, caps[1].to_string());
            }
            continue;
        }

        if let Some(caps) = GO_TYPE.captures(line) {
            let name = caps[1].to_string();
            let exported = name.chars().next().is_some_and(|c| c.is_uppercase());
            if scope == StructureScope::Public && !exported {
                continue;
            }
            if exported {
                map.exports.push(name.clone());
            }
            map.types.push(CodeType {
                name,
                kind: caps[2].to_string(),
            });
            continue;
        }

        if let Some(caps) = GO_FUNC.captures(line) {
            let receiver = caps.get(1).map(|m| m.as_str().to_string());
            let name = caps[2].to_string();
            let exported = name.chars().next().is_some_and(|c| c.is_uppercase());
            if scope == StructureScope::Public && !exported {
                continue;
            }
            match receiver {
                Some(recv) => {
                    // method: attach to the receiver's type as a class
                    let type_name = recv
                        .split_whitespace()
                        .last()
                        .unwrap_or("")
                        .trim_start_matches('*')
                        .to_string();
                    match map.classes.iter_mut().find(|c| c.name == type_name) {
                        Some(class) => class.methods.push(name),
                        None => map.classes.push(CodeClass {
                            name: type_name,
                            methods: vec![name],
                            properties: Vec::new(),
                        }),
                    }
                }
                None => {
                    if exported {
                        map.exports.push(name.clone());
                    }
                    let params = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
                    map.functions.push(CodeFunction {
                        name,
                        signature: format!("({params})"),
                        is_async: false,
                    });
                }
            }
        }
    }
}

// ── Java ───────────────────────────────────────────────────────────────────────

lazy_static! {
    static ref JAVA_CLASS: Regex = Regex::new(
        r"^\s*(?:public\s+|final\s+|abstract\s+)*\s*(class|interface|enum)\s+([a-zA-Z_][a-zA-Z0-9_]*)"
    )
    .unwrap();
    static ref JAVA_METHOD: Regex = Regex::new(
        r"^\s+(?:public|protected|private)\s+(?:static\s+)?(?:final\s+)?[\w<>\[\],\s]+?\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^)]*\)\s*(?:throws\s+[\w,\s]+)?\{"
    )
    .unwrap();
    static ref JAVA_IMPORT: Regex =
        Regex::new(r"^import\s+(?:static\s+)?([\w.]+)\s*;").unwrap();
}

fn extract_java(content: &str, map: &mut CodeMap) {
    let mut current_class: Option<String> = None;

    for line in content.lines() {
        if let Some(caps) = JAVA_CLASS.captures(line) {
            let name = caps[2].to_string();
            map.exports.push(name.clone());
            match &caps[1] {
                "class" => {
                    map.classes.push(CodeClass {
                        name: name.clone(),
                        methods: Vec::new(),
                        properties: Vec::new(),
                    });
                    current_class = Some(name);
                }
                kind => map.types.push(CodeType {
                    name,
                    kind: kind.to_string(),
                }),
            }
            continue;
        }
        if let Some(caps) = JAVA_METHOD.captures(line) {
            if let Some(class_name) = &current_class {
                if let Some(class) = map.classes.iter_mut().find(|c| c.name == *class_name) {
                    class.methods.push(caps[1].to_string());
                }
            }
            continue;
        }
        if let Some(caps) = JAVA_IMPORT.captures(line) {
            push_unique(&mut map.dependencies, caps[1].to_string());
        }
    }
}

// ── Markdown ───────────────────────────────────────────────────────────────────

lazy_static! {
    static ref MD_HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.+?)\s*$").unwrap();
    static ref MD_FENCE: Regex = Regex::new(r"^```\s*([a-zA-Z0-9+_-]*)").unwrap();
}

fn extract_markdown(content: &str, map: &mut CodeMap) {
    let mut lines = content.lines().peekable();

    // frontmatter: a leading `---` block
    if lines.peek() == Some(&"---") {
        lines.next();
        for line in lines.by_ref() {
            if line == "---" {
                break;
            }
            map.frontmatter.push(line.to_string());
        }
    }

    let mut in_fence = false;
    let mut block_count = 0usize;
    let mut block_langs: Vec<String> = Vec::new();

    for line in lines {
        if let Some(caps) = MD_FENCE.captures(line) {
            if !in_fence {
                block_count += 1;
                let lang = caps[1].to_string();
                if !lang.is_empty() {
                    push_unique(&mut block_langs, lang);
                }
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = MD_HEADING.captures(line) {
            map.sections.push(MarkdownSection {
                depth: caps[1].len(),
                title: caps[2].to_string(),
            });
        }
    }

    if block_count > 0 {
        map.code_blocks = Some(CodeBlockStats {
            count: block_count,
            languages: block_langs,
        });
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_functions_and_types() {
        let src = "pub fn login(user: &str) -> bool {\n}\nstruct Session {\n}\npub enum Mode { A }\nuse crate::auth;\n";
        let map = extract_codemap("src/auth.rs", src, StructureScope::Full).unwrap();
        assert_eq!(map.language, "rust");
        assert_eq!(map.functions[0].name, "login");
        assert_eq!(map.functions[0].signature, "(user: &str) -> bool");
        assert!(map.exports.contains(&"login".to_string()));
        assert!(map.types.iter().any(|t| t.name == "Session" && t.kind == "struct"));
        assert!(map.types.iter().any(|t| t.name == "Mode" && t.kind == "enum"));
        assert_eq!(map.dependencies, vec!["crate::auth"]);
    }

    #[test]
    fn test_rust_impl_methods_attach_to_class() {
        let src = "struct Auth;\nimpl Auth {\n    pub fn verify(&self) -> bool {\n        true\n    }\n}\n";
        let map = extract_codemap("a.rs", src, StructureScope::Full).unwrap();
        let class = map.classes.iter().find(|c| c.name == "Auth").unwrap();
        assert_eq!(class.methods, vec!["verify"]);
    }

    #[test]
    fn test_rust_public_scope_filters_private() {
        let src = "fn private_helper() {\n}\npub fn public_api() {\n}\n";
        let map = extract_codemap("a.rs", src, StructureScope::Public).unwrap();
        assert_eq!(map.functions.len(), 1);
        assert_eq!(map.functions[0].name, "public_api");
    }

    #[test]
    fn test_rust_async_fn() {
        let src = "pub async fn fetch(url: &str) -> Result<String> {\n}\n";
        let map = extract_codemap("a.rs", src, StructureScope::Full).unwrap();
        assert!(map.functions[0].is_async);
    }

    #[test]
    fn test_python_class_and_imports() {
        let src = "import os\nfrom flask import Flask\n\nclass Server:\n    def start(self):\n        pass\n\ndef main():\n    pass\n";
        let map = extract_codemap("server.py", src, StructureScope::Full).unwrap();
        assert_eq!(map.classes[0].name, "Server");
        assert_eq!(map.classes[0].methods, vec!["start"]);
        assert!(map.functions.iter().any(|f| f.name == "main"));
        assert!(map.dependencies.contains(&"os".to_string()));
        assert!(map.dependencies.contains(&"flask".to_string()));
    }

    #[test]
    fn test_typescript_exports_and_imports() {
        let src = "import { jwt } from './jwt';\nimport express from 'express';\n\nexport async function login(req: Request) {\n}\nexport interface Claims {\n}\nexport const logout = async () => {};\n";
        let map = extract_codemap("auth.ts", src, StructureScope::Full).unwrap();
        assert!(map.exports.contains(&"login".to_string()));
        assert!(map.exports.contains(&"logout".to_string()));
        assert!(map.types.iter().any(|t| t.name == "Claims" && t.kind == "interface"));
        assert_eq!(map.dependencies, vec!["./jwt", "express"]);
        assert!(map.functions.iter().find(|f| f.name == "login").unwrap().is_async);
    }

    #[test]
    fn test_typescript_class_methods() {
        let src = "export class AuthService {\n  async login(user: string): Promise<void> {\n  }\n  logout() {\n  }\n}\n";
        let map = extract_codemap("svc.ts", src, StructureScope::Full).unwrap();
        let class = map.classes.iter().find(|c| c.name == "AuthService").unwrap();
        assert_eq!(class.methods, vec!["login", "logout"]);
    }

    #[test]
    fn test_go_receiver_methods() {
        let src = "package auth\n\nimport (\n\t\"fmt\"\n)\n\ntype Server struct {\n}\n\nfunc (s *Server) Start() error {\n}\n\nfunc Helper(x int) {\n}\n";
        let map = extract_codemap("server.go", src, StructureScope::Full).unwrap();
        let class = map.classes.iter().find(|c| c.name == "Server").unwrap();
        assert_eq!(class.methods, vec!["Start"]);
        assert!(map.exports.contains(&"Helper".to_string()));
        assert_eq!(map.dependencies, vec!["fmt"]);
    }

    #[test]
    fn test_markdown_sections_and_fences() {
        let src = "---\ntitle: Guide\n---\n# Setup\nsome text\n## Install\n```bash\nmake\n```\n## Run\n";
        let map = extract_codemap("README.md", src, StructureScope::Full).unwrap();
        assert_eq!(map.frontmatter, vec!["title: Guide"]);
        assert_eq!(map.sections.len(), 3);
        assert_eq!(map.sections[0].depth, 1);
        assert_eq!(map.sections[1].title, "Install");
        let blocks = map.code_blocks.unwrap();
        assert_eq!(blocks.count, 1);
        assert_eq!(blocks.languages, vec!["bash"]);
    }

    #[test]
    fn test_heading_inside_fence_ignored() {
        let src = "# Real\n```\n# not a heading\n```\n";
        let map = extract_codemap("doc.md", src, StructureScope::Full).unwrap();
        assert_eq!(map.sections.len(), 1);
    }

    #[test]
    fn test_unsupported_language_is_none() {
        assert!(extract_codemap("image.png", "bytes", StructureScope::Full).is_none());
        assert!(extract_codemap("noext", "text", StructureScope::Full).is_none());
    }

    #[test]
    fn test_render_is_stable() {
        let src = "pub fn a() {\n}\npub fn b() {\n}\n";
        let map = extract_codemap("x.rs", src, StructureScope::Full).unwrap();
        assert_eq!(map.render(), map.render());
        assert!(map.render().starts_with("x.rs (rust)\n"));
    }
}
