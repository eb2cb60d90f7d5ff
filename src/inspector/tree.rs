//! Indented directory tree rendering, bounded depth.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeMode {
    /// Directories and files.
    #[default]
    Full,
    /// Directories only.
    DirsOnly,
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub mode: TreeMode,
    /// Subtree to render, repo-relative. None renders from the root.
    pub path: Option<String>,
}

const DEFAULT_MAX_DEPTH: usize = 4;
const MAX_ENTRIES: usize = 800; // huge repos get a truncated tree, not a huge one

fn is_pruned(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    super::IGNORE_DIRS.contains(&name.as_ref())
        || (name.starts_with('.') && entry.depth() > 0 && entry.file_type().is_dir())
}

pub(super) fn render_tree(
    root: &Path,
    opts: &TreeOptions,
) -> Result<String, super::InspectorError> {
    let base = match &opts.path {
        Some(rel) => root.join(rel),
        None => root.to_path_buf(),
    };
    if !base.is_dir() {
        return Err(super::InspectorError::Unavailable(format!(
            "tree base '{}' is not a directory",
            base.display()
        )));
    }

    let max_depth = opts.max_depth.unwrap_or(DEFAULT_MAX_DEPTH).max(1);
    let label = match &opts.path {
        Some(rel) => rel.clone(),
        None => base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string()),
    };

    let mut out = String::new();
    out.push_str(&label);
    out.push_str("/\n");

    let mut entries = 0usize;
    let mut truncated = false;

    let walker = WalkDir::new(&base)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by(|a, b| {
            // directories before files at the same level, then by name
            let ad = a.file_type().is_dir();
            let bd = b.file_type().is_dir();
            bd.cmp(&ad).then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| !is_pruned(e));

    for entry in walker.flatten() {
        let is_dir = entry.file_type().is_dir();
        if opts.mode == TreeMode::DirsOnly && !is_dir {
            continue;
        }
        if entries >= MAX_ENTRIES {
            truncated = true;
            break;
        }
        entries += 1;
        let indent = "  ".repeat(entry.depth());
        out.push_str(&indent);
        out.push_str(&entry.file_name().to_string_lossy());
        if is_dir {
            out.push('/');
        }
        out.push('\n');
    }

    if truncated {
        out.push_str("  ... (truncated)\n");
    }
    Ok(out)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/auth")).unwrap();
        fs::write(dir.path().join("src/auth/login.rs"), "").unwrap();
        fs::write(dir.path().join("src/main.rs"), "").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        dir
    }

    #[test]
    fn test_tree_lists_dirs_before_files() {
        let dir = fixture();
        let tree = render_tree(dir.path(), &TreeOptions::default()).unwrap();
        let src_pos = tree.find("src/").unwrap();
        let toml_pos = tree.find("Cargo.toml").unwrap();
        assert!(src_pos < toml_pos, "directories sort before files:\n{tree}");
        assert!(tree.contains("login.rs"));
    }

    #[test]
    fn test_tree_respects_max_depth() {
        let dir = fixture();
        let opts = TreeOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let tree = render_tree(dir.path(), &opts).unwrap();
        assert!(tree.contains("src/"));
        assert!(!tree.contains("login.rs"), "depth 1 must not descend:\n{tree}");
    }

    #[test]
    fn test_tree_dirs_only() {
        let dir = fixture();
        let opts = TreeOptions {
            mode: TreeMode::DirsOnly,
            ..Default::default()
        };
        let tree = render_tree(dir.path(), &opts).unwrap();
        assert!(tree.contains("auth/"));
        assert!(!tree.contains("main.rs"));
    }

    #[test]
    fn test_tree_subpath() {
        let dir = fixture();
        let opts = TreeOptions {
            path: Some("src".to_string()),
            ..Default::default()
        };
        let tree = render_tree(dir.path(), &opts).unwrap();
        assert!(tree.starts_with("src/\n"));
        assert!(!tree.contains("Cargo.toml"));
    }
}
