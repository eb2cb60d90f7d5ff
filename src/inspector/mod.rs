//! Repository inspector: the engine's only window onto the repo under scan.
//! The trait keeps strategies testable against canned fixtures; `FsInspector`
//! is the bundled filesystem implementation (gitignore-aware, read-only).

mod codemap;
mod search;
mod tree;

pub use codemap::{
    extract_codemap, language_of, CodeBlockStats, CodeClass, CodeFunction, CodeMap, CodeType,
    MarkdownSection,
};
pub use search::{SearchMatch, SearchMode, SearchOptions, SearchResult};
pub use tree::{TreeMode, TreeOptions};

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

// ── Errors ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InspectorError {
    /// The repository cannot be reached at all (missing root, not a directory).
    #[error("inspector unavailable: {0}")]
    Unavailable(String),
    /// A single probe failed (unreadable file, bad glob). Strategies recover
    /// from these; they never abort a plan.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glob pattern '{0}'")]
    BadGlob(String),
}

impl InspectorError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ── Probe option / result types ────────────────────────────────────────────────

/// Structure extraction scope: everything, or public surface only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureScope {
    #[default]
    Full,
    Public,
}

#[derive(Debug, Clone, Default)]
pub struct StructureOptions {
    pub scope: StructureScope,
    /// Cap on codemaps returned; extra paths land in `files_without_codemap`.
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct StructureResult {
    pub codemaps: Vec<CodeMap>,
    pub files_without_codemap: Vec<String>,
}

/// Size + mtime per file; feeds the complexity and diff strategies.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub path: String,
    pub bytes: u64,
    pub modified: Option<SystemTime>,
}

// ── Trait ──────────────────────────────────────────────────────────────────────

/// Read-only repository probes. All paths in and out are repo-relative with
/// `/` separators.
pub trait Inspector: Sync {
    /// Human-readable indented directory tree, bounded depth.
    fn tree(&self, opts: &TreeOptions) -> Result<String, InspectorError>;

    /// Multi-pattern content search with per-file match lists and line numbers.
    fn search(&self, patterns: &[String], opts: &SearchOptions)
        -> Result<SearchResult, InspectorError>;

    /// Language-tagged code-structure extraction for the given paths.
    fn structure(
        &self,
        paths: &[String],
        opts: &StructureOptions,
    ) -> Result<StructureResult, InspectorError>;

    /// All repo files passing the include/exclude globs, sorted.
    fn list_files(&self, include: &[String], exclude: &[String])
        -> Result<Vec<String>, InspectorError>;

    /// File content, optionally a line window. Lossy UTF-8.
    fn read_file(
        &self,
        path: &str,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<String, InspectorError>;

    /// Size and mtime for every repo file (same walk as `list_files`).
    fn file_stats(&self) -> Result<Vec<FileStat>, InspectorError>;
}

// ── Filesystem implementation ──────────────────────────────────────────────────

/// Directories pruned from every walk regardless of gitignore state.
const IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "__pycache__",
    ".venv",
    "vendor",
    "dist",
    ".ivo",
];

const MAX_FILE_BYTES: u64 = 1_048_576; // skip blobs; nothing useful for context

#[derive(Debug)]
pub struct FsInspector {
    root: PathBuf,
}

impl FsInspector {
    /// Fails with `Unavailable` when the root does not resolve to a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, InspectorError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(InspectorError::Unavailable(format!(
                "repository root '{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Gitignore-aware walker with the fixed prune list applied.
    fn walker(&self) -> ignore::Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !IGNORE_DIRS.contains(&name.as_ref())
            });
        builder.build()
    }

    /// Relative `/`-separated path for a walked entry, or None outside root.
    fn rel_of(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let s = rel.to_string_lossy().replace('\\', "/");
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    fn walk_files(&self) -> Vec<(String, std::fs::Metadata)> {
        let mut out = Vec::new();
        for entry in self.walker().flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if meta.len() > MAX_FILE_BYTES {
                continue;
            }
            if let Some(rel) = self.rel_of(entry.path()) {
                out.push((rel, meta));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

pub(crate) fn build_glob_set(
    patterns: &[String],
) -> Result<Option<ignore::gitignore::Gitignore>, InspectorError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = ignore::gitignore::GitignoreBuilder::new("");
    for pat in patterns {
        builder
            .add_line(None, pat)
            .map_err(|_| InspectorError::BadGlob(pat.clone()))?;
    }
    let set = builder
        .build()
        .map_err(|_| InspectorError::BadGlob(patterns.join(",")))?;
    Ok(Some(set))
}

pub(crate) fn glob_matches(set: &Option<ignore::gitignore::Gitignore>, rel: &str) -> bool {
    match set {
        None => false,
        Some(g) => g
            .matched_path_or_any_parents(Path::new(rel), false)
            .is_ignore(),
    }
}

impl Inspector for FsInspector {
    fn tree(&self, opts: &TreeOptions) -> Result<String, InspectorError> {
        tree::render_tree(&self.root, opts)
    }

    fn search(
        &self,
        patterns: &[String],
        opts: &SearchOptions,
    ) -> Result<SearchResult, InspectorError> {
        search::run_search(self, patterns, opts)
    }

    fn structure(
        &self,
        paths: &[String],
        opts: &StructureOptions,
    ) -> Result<StructureResult, InspectorError> {
        let cap = opts.max_results.unwrap_or(usize::MAX);
        let mut result = StructureResult::default();
        for path in paths {
            if result.codemaps.len() >= cap {
                result.files_without_codemap.push(path.clone());
                continue;
            }
            let Ok(content) = self.read_file(path, None, None) else {
                result.files_without_codemap.push(path.clone());
                continue;
            };
            match extract_codemap(path, &content, opts.scope) {
                Some(map) => result.codemaps.push(map),
                None => result.files_without_codemap.push(path.clone()),
            }
        }
        Ok(result)
    }

    fn list_files(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, InspectorError> {
        let include_set = build_glob_set(include)?;
        let exclude_set = build_glob_set(exclude)?;
        let files = self
            .walk_files()
            .into_iter()
            .map(|(rel, _)| rel)
            .filter(|rel| include.is_empty() || glob_matches(&include_set, rel))
            .filter(|rel| !glob_matches(&exclude_set, rel))
            .collect();
        Ok(files)
    }

    fn read_file(
        &self,
        path: &str,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<String, InspectorError> {
        let abs = self.abs(path);
        let bytes = std::fs::read(&abs).map_err(|e| InspectorError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        match (offset, limit) {
            (None, None) => Ok(content),
            (offset, limit) => {
                let start = offset.unwrap_or(0);
                let take = limit.unwrap_or(usize::MAX);
                let window: Vec<&str> = content.lines().skip(start).take(take).collect();
                Ok(window.join("\n"))
            }
        }
    }

    fn file_stats(&self) -> Result<Vec<FileStat>, InspectorError> {
        Ok(self
            .walk_files()
            .into_iter()
            .map(|(path, meta)| FileStat {
                bytes: meta.len(),
                modified: meta.modified().ok(),
                path,
            })
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.path().join("src/lib.rs"), "pub mod auth;\n").unwrap();
        fs::write(dir.path().join("README.md"), "# fixture\n").unwrap();
        dir
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let err = FsInspector::new("/nonexistent/definitely/missing").unwrap_err();
        assert!(matches!(err, InspectorError::Unavailable(_)));
    }

    #[test]
    fn test_list_files_sorted_relative() {
        let dir = fixture_repo();
        let insp = FsInspector::new(dir.path()).unwrap();
        let files = insp.list_files(&[], &[]).unwrap();
        assert_eq!(files, vec!["README.md", "src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn test_list_files_include_glob() {
        let dir = fixture_repo();
        let insp = FsInspector::new(dir.path()).unwrap();
        let files = insp.list_files(&["*.rs".to_string()], &[]).unwrap();
        assert_eq!(files, vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn test_list_files_exclude_glob() {
        let dir = fixture_repo();
        let insp = FsInspector::new(dir.path()).unwrap();
        let files = insp.list_files(&[], &["src/**".to_string()]).unwrap();
        assert_eq!(files, vec!["README.md"]);
    }

    #[test]
    fn test_read_file_line_window() {
        let dir = fixture_repo();
        fs::write(dir.path().join("lines.txt"), "a\nb\nc\nd\ne\n").unwrap();
        let insp = FsInspector::new(dir.path()).unwrap();
        let window = insp.read_file("lines.txt", Some(1), Some(2)).unwrap();
        assert_eq!(window, "b\nc");
    }

    #[test]
    fn test_file_stats_cover_walked_files() {
        let dir = fixture_repo();
        let insp = FsInspector::new(dir.path()).unwrap();
        let stats = insp.file_stats().unwrap();
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.bytes > 0));
    }
}
