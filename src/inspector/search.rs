//! Multi-pattern content search over the repo walk.
//! Literal patterns go through one aho-corasick automaton; regex mode compiles
//! a case-insensitive alternation. Output order is deterministic (path, line).

use aho_corasick::AhoCorasick;
use memchr::memchr;
use rayon::prelude::*;
use regex::RegexBuilder;

use super::{FsInspector, Inspector, InspectorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Matching lines with content and optional context.
    #[default]
    Content,
    /// Paths only; match content is left empty.
    FilesOnly,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    /// Extension allowlist without dots ("rs", "ts"). Empty = all files.
    pub extensions: Vec<String>,
    pub context_lines: usize,
    pub max_results: usize,
    /// Treat patterns as regexes instead of literals.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Content,
            extensions: Vec::new(),
            context_lines: 0,
            max_results: 200,
            regex: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    /// Surrounding lines when `context_lines > 0` (match line excluded).
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub pattern: String,
    pub matches: Vec<SearchMatch>,
    pub total_matches: usize,
    pub truncated: bool,
}

enum Matcher {
    Literal(AhoCorasick),
    Regex(regex::Regex),
}

impl Matcher {
    fn build(patterns: &[String], use_regex: bool) -> Result<Self, InspectorError> {
        if use_regex {
            let alternation = patterns
                .iter()
                .map(|p| format!("(?:{p})"))
                .collect::<Vec<_>>()
                .join("|");
            let re = RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .map_err(|_| InspectorError::BadGlob(alternation.clone()))?;
            Ok(Self::Regex(re))
        } else {
            let ac = AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(patterns)
                .map_err(|_| InspectorError::BadGlob(patterns.join(",")))?;
            Ok(Self::Literal(ac))
        }
    }

    fn matches_hay(&self, hay: &str) -> bool {
        match self {
            Self::Literal(ac) => ac.is_match(hay),
            Self::Regex(re) => re.is_match(hay),
        }
    }
}

fn extension_allowed(path: &str, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let ext = path.rsplit('.').next().unwrap_or("");
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

fn scan_file(path: &str, content: &str, matcher: &Matcher, opts: &SearchOptions) -> Vec<SearchMatch> {
    // binary guard: NUL byte anywhere means skip
    if memchr(0, content.as_bytes()).is_some() {
        return Vec::new();
    }
    // cheap whole-file rejection before the per-line pass; literal only,
    // anchored regexes behave differently per-line than per-file
    if let Matcher::Literal(ac) = matcher {
        if !ac.is_match(content) {
            return Vec::new();
        }
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut out = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if !matcher.matches_hay(line) {
            continue;
        }
        let context = if opts.context_lines > 0 {
            let lo = idx.saturating_sub(opts.context_lines);
            let hi = (idx + opts.context_lines + 1).min(lines.len());
            lines[lo..hi]
                .iter()
                .enumerate()
                .filter(|(off, _)| lo + off != idx)
                .map(|(_, l)| l.to_string())
                .collect()
        } else {
            Vec::new()
        };
        out.push(SearchMatch {
            path: path.to_string(),
            line: idx + 1,
            content: line.to_string(),
            context,
        });
        if out.len() >= opts.max_results {
            break;
        }
    }
    out
}

pub(super) fn run_search(
    inspector: &FsInspector,
    patterns: &[String],
    opts: &SearchOptions,
) -> Result<SearchResult, InspectorError> {
    let pattern = patterns.join("|");
    if patterns.is_empty() {
        return Ok(SearchResult {
            pattern,
            ..Default::default()
        });
    }
    let matcher = Matcher::build(patterns, opts.regex)?;

    let files: Vec<String> = inspector
        .walk_files()
        .into_iter()
        .map(|(rel, _)| rel)
        .filter(|rel| extension_allowed(rel, &opts.extensions))
        .collect();

    // Parallel scan, then flatten in path order; par_iter preserves the
    // sorted input order, so output stays deterministic.
    let per_file: Vec<Vec<SearchMatch>> = files
        .par_iter()
        .map(|rel| match inspector.read_file(rel, None, None) {
            Ok(content) => scan_file(rel, &content, &matcher, opts),
            Err(_) => Vec::new(),
        })
        .collect();

    let mut matches: Vec<SearchMatch> = per_file.into_iter().flatten().collect();
    let total_matches = matches.len();
    let truncated = total_matches > opts.max_results;
    matches.truncate(opts.max_results);

    if opts.mode == SearchMode::FilesOnly {
        matches.dedup_by(|a, b| a.path == b.path);
        for m in &mut matches {
            m.content.clear();
            m.context.clear();
        }
    }

    Ok(SearchResult {
        pattern,
        matches,
        total_matches,
        truncated,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::super::Inspector;
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/auth.rs"),
            "fn login() {}\nfn logout() {}\nfn refresh_token() {}\n",
        )
        .unwrap();
        fs::write(dir.path().join("src/db.rs"), "fn connect() {}\n").unwrap();
        dir
    }

    #[test]
    fn test_literal_multi_pattern() {
        let dir = fixture();
        let insp = FsInspector::new(dir.path()).unwrap();
        let result = insp
            .search(
                &["login".to_string(), "token".to_string()],
                &SearchOptions::default(),
            )
            .unwrap();
        assert_eq!(result.total_matches, 2);
        assert_eq!(result.matches[0].path, "src/auth.rs");
        assert_eq!(result.matches[0].line, 1);
        assert_eq!(result.matches[1].line, 3);
    }

    #[test]
    fn test_case_insensitive() {
        let dir = fixture();
        let insp = FsInspector::new(dir.path()).unwrap();
        let result = insp
            .search(&["LOGIN".to_string()], &SearchOptions::default())
            .unwrap();
        assert_eq!(result.total_matches, 1);
    }

    #[test]
    fn test_context_lines_exclude_match_line() {
        let dir = fixture();
        let insp = FsInspector::new(dir.path()).unwrap();
        let opts = SearchOptions {
            context_lines: 1,
            ..Default::default()
        };
        let result = insp.search(&["logout".to_string()], &opts).unwrap();
        let m = &result.matches[0];
        assert_eq!(m.line, 2);
        assert_eq!(m.context.len(), 2);
        assert!(m.context[0].contains("login"));
        assert!(m.context[1].contains("refresh_token"));
    }

    #[test]
    fn test_max_results_truncates() {
        let dir = fixture();
        let insp = FsInspector::new(dir.path()).unwrap();
        let opts = SearchOptions {
            max_results: 1,
            ..Default::default()
        };
        let result = insp.search(&["fn ".to_string()], &opts).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert!(result.truncated);
    }

    #[test]
    fn test_extension_filter() {
        let dir = fixture();
        fs::write(dir.path().join("notes.md"), "login steps\n").unwrap();
        let insp = FsInspector::new(dir.path()).unwrap();
        let opts = SearchOptions {
            extensions: vec!["md".to_string()],
            ..Default::default()
        };
        let result = insp.search(&["login".to_string()], &opts).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].path, "notes.md");
    }

    #[test]
    fn test_regex_mode() {
        let dir = fixture();
        let insp = FsInspector::new(dir.path()).unwrap();
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        let result = insp
            .search(&[r"fn \w+_token".to_string()], &opts)
            .unwrap();
        assert_eq!(result.total_matches, 1);
        assert!(result.matches[0].content.contains("refresh_token"));
    }
}
