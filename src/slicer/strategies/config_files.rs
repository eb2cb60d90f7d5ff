//! `config`: project configuration files. Build manifests are compacted to
//! their load-bearing tables; lockfiles are referenced, never inlined.

use crate::slicer::candidate::{Representation, SliceCandidate};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::file_name;

pub struct ConfigStrategy;

const MANIFEST_NAMES: &[&str] = &[
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Makefile",
    "Dockerfile",
    "CMakeLists.txt",
    "setup.py",
    "requirements.txt",
];

const LOCKFILE_NAMES: &[&str] = &[
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "go.sum",
    "poetry.lock",
];

fn is_manifest(path: &str) -> bool {
    let name = file_name(path);
    MANIFEST_NAMES.contains(&name)
        || name.starts_with("tsconfig")
        || name.starts_with("docker-compose")
        || name.starts_with(".eslintrc")
        || name == ".gitignore"
}

fn is_lockfile(path: &str) -> bool {
    LOCKFILE_NAMES.contains(&file_name(path))
}

/// Keep only the tables a reader needs to understand the build.
fn compact_cargo_toml(content: &str) -> Option<String> {
    let value: toml::Value = content.parse().ok()?;
    let mut out = toml::map::Map::new();
    for key in [
        "package",
        "lib",
        "bin",
        "workspace",
        "dependencies",
        "dev-dependencies",
        "build-dependencies",
        "features",
    ] {
        if let Some(v) = value.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    toml::to_string_pretty(&toml::Value::Table(out)).ok()
}

fn compact_package_json(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let mut out = serde_json::Map::new();
    for key in [
        "name",
        "version",
        "type",
        "workspaces",
        "main",
        "exports",
        "scripts",
        "dependencies",
        "devDependencies",
        "peerDependencies",
    ] {
        if let Some(v) = value.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(out)).ok()
}

const SMALL_CONFIG_TOKENS: u32 = 400;

impl Strategy for ConfigStrategy {
    fn name(&self) -> &'static str {
        "config"
    }

    fn weight(&self) -> f32 {
        0.5
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.15)
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let files = match ctx
            .inspector
            .list_files(&ctx.request.include, &ctx.request.exclude)
        {
            Ok(files) => files,
            Err(e) => return StrategyOutput::warning(format!("config: file listing failed: {e}")),
        };

        // root manifests first, nested after; lockfiles last
        let mut configs: Vec<String> = files.iter().filter(|f| is_manifest(f)).cloned().collect();
        configs.sort_by_key(|p| (p.matches('/').count(), p.clone()));
        let lockfiles: Vec<String> = files.iter().filter(|f| is_lockfile(f)).cloned().collect();

        for path in configs.into_iter().take(ctx.knobs.max_items) {
            if ctx.interrupted() {
                break;
            }
            let content = match ctx.inspector.read_file(&path, None, None) {
                Ok(content) => content,
                Err(e) => {
                    out.warnings.push(format!("config: cannot read {path}: {e}"));
                    continue;
                }
            };
            let name = file_name(&path);
            let compacted = match name {
                "Cargo.toml" => compact_cargo_toml(&content),
                "package.json" => compact_package_json(&content),
                _ => None,
            };
            let relevance = if path.contains('/') { 0.5 } else { 0.6 };
            let mut candidate = match compacted {
                Some(body) => {
                    let mut c = SliceCandidate::new(
                        "config",
                        path.clone(),
                        Representation::Snippet,
                        (ctx.estimate)(&body),
                        relevance,
                        "build manifest (compacted)",
                        "file listing",
                    );
                    c.content = Some(body);
                    c
                }
                None if (ctx.estimate)(&content) <= SMALL_CONFIG_TOKENS => {
                    let mut c = SliceCandidate::new(
                        "config",
                        path.clone(),
                        Representation::Full,
                        (ctx.estimate)(&content),
                        relevance,
                        "project configuration",
                        "file listing",
                    );
                    c.content = Some(content);
                    c
                }
                None => {
                    let head: String = content
                        .lines()
                        .take(60)
                        .map(|l| format!("{l}\n"))
                        .collect();
                    let mut c = SliceCandidate::new(
                        "config",
                        path.clone(),
                        Representation::Snippet,
                        (ctx.estimate)(&head),
                        relevance,
                        "project configuration (head)",
                        "file listing",
                    );
                    c.content = Some(head);
                    c
                }
            };
            candidate.ensure_reference_alternate(ctx.estimate);
            out.matched.push(path);
            out.candidates.push(candidate);
        }

        for path in lockfiles.into_iter().take(2) {
            let mut candidate = SliceCandidate::new(
                "config",
                path,
                Representation::Reference,
                0,
                0.3,
                "lockfile present",
                "file listing",
            );
            candidate.ensure_reference_alternate(ctx.estimate);
            // reference is the chosen representation here, not a fallback
            candidate.apply_alternate(0);
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
    fn test_manifest_detection() {
        assert!(is_manifest("Cargo.toml"));
        assert!(is_manifest("web/tsconfig.build.json"));
        assert!(is_manifest("docker-compose.dev.yml"));
        assert!(!is_manifest("src/main.rs"));
    }

    #[test]
    fn test_lockfile_detection() {
        assert!(is_lockfile("Cargo.lock"));
        assert!(is_lockfile("web/yarn.lock"));
        assert!(!is_lockfile("Cargo.toml"));
    }

    #[test]
    fn test_compact_cargo_toml_keeps_deps_drops_profile() {
        let manifest = "[package]\nname = \"x\"\n\n[dependencies]\nserde = \"1\"\n\n[profile.release]\nlto = true\n";
        let compact = compact_cargo_toml(manifest).unwrap();
        assert!(compact.contains("serde"));
        assert!(!compact.contains("lto"));
    }

    #[test]
    fn test_compact_package_json_keeps_scripts() {
        let manifest = r#"{"name": "x", "scripts": {"build": "tsc"}, "browserslist": ["defaults"]}"#;
        let compact = compact_package_json(manifest).unwrap();
        assert!(compact.contains("build"));
        assert!(!compact.contains("browserslist"));
    }
}
