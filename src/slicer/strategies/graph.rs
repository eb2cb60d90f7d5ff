//! `graph`: 1-hop import-graph neighbors of the matched files. Adjacency is
//! an index-based edge list over the listed source files; traversal is a
//! visited-set BFS, so import cycles terminate.

use std::collections::{BTreeMap, BTreeSet};

use crate::inspector::{language_of, StructureScope};
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

use super::{codemap_candidate, codemaps_for};

pub struct GraphStrategy;

/// Adjacency build ceiling; above this only the seeds' forward edges are used.
const FULL_GRAPH_FILE_CAP: usize = 300;

/// Collapse `.` and `..` segments in a joined relative path.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Resolve one dependency string from `from` to a repo path, against the
/// known file set. Language-specific, best effort.
fn resolve_dep(dep: &str, from: &str, files: &BTreeSet<String>) -> Option<String> {
    let dir = match from.rfind('/') {
        Some(idx) => &from[..idx],
        None => "",
    };

    // relative import (TS/JS style)
    if dep.starts_with("./") || dep.starts_with("../") {
        let base = normalize_path(&format!("{dir}/{dep}"));
        let tries = [
            base.clone(),
            format!("{base}.ts"),
            format!("{base}.tsx"),
            format!("{base}.js"),
            format!("{base}.jsx"),
            format!("{base}.py"),
            format!("{base}/index.ts"),
            format!("{base}/index.js"),
        ];
        return tries.into_iter().find(|t| files.contains(t));
    }

    // rust: `crate::a::b` / `mod x`
    if let Some(rest) = dep.strip_prefix("crate::") {
        let joined = rest.split("::").collect::<Vec<_>>().join("/");
        let tries = [
            format!("src/{joined}.rs"),
            format!("src/{joined}/mod.rs"),
            format!("src/{}.rs", rest.split("::").next().unwrap_or("")),
        ];
        return tries.into_iter().find(|t| files.contains(t));
    }
    if let Some(name) = dep.strip_prefix("mod ") {
        let tries = [
            format!("{dir}/{name}.rs"),
            format!("{dir}/{name}/mod.rs"),
            format!("{dir}/{name}.rs").trim_start_matches('/').to_string(),
        ];
        return tries.into_iter().find(|t| files.contains(t));
    }

    // python dotted module
    if dep.contains('.') && !dep.contains('/') {
        let joined = dep.split('.').collect::<Vec<_>>().join("/");
        let tries = [format!("{joined}.py"), format!("{joined}/__init__.py")];
        if let Some(hit) = tries.into_iter().find(|t| files.contains(t)) {
            return Some(hit);
        }
    }

    // bare name: unique stem match ("auth" finds "src/auth.py")
    let stem = dep.rsplit('/').next().unwrap_or(dep);
    let hits: Vec<&String> = files
        .iter()
        .filter(|f| {
            let name = f.rsplit('/').next().unwrap_or(f);
            name.rsplit_once('.')
                .is_some_and(|(file_stem, _)| file_stem == stem)
        })
        .collect();
    match hits.as_slice() {
        [only] => Some((*only).clone()),
        _ => None,
    }
}

impl Strategy for GraphStrategy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn weight(&self) -> f32 {
        0.6
    }

    fn budget_cap(&self) -> Option<f32> {
        Some(0.20)
    }

    fn is_available(&self, ctx: &StrategyContext) -> bool {
        !ctx.matched.is_empty()
    }

    fn prerequisite(&self) -> &'static str {
        "no matched files to expand from"
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let mut out = StrategyOutput::default();
        let files = match ctx
            .inspector
            .list_files(&ctx.request.include, &ctx.request.exclude)
        {
            Ok(files) => files,
            Err(e) => return StrategyOutput::warning(format!("graph: file listing failed: {e}")),
        };
        let source_files: Vec<String> = files
            .into_iter()
            .filter(|f| language_of(f).is_some_and(|lang| lang != "markdown"))
            .collect();
        let file_set: BTreeSet<String> = source_files.iter().cloned().collect();

        // structure() targets: seeds always; everything when small enough to
        // afford reverse edges
        let probe: Vec<String> = if source_files.len() <= FULL_GRAPH_FILE_CAP {
            source_files.clone()
        } else {
            ctx.matched.iter().cloned().collect()
        };

        let maps = codemaps_for(ctx, &probe, StructureScope::Full);
        if ctx.interrupted() {
            return out;
        }

        // index-based edge list: node ids are positions in `nodes`
        let mut nodes: Vec<String> = Vec::new();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        let mut intern = |path: &str, nodes: &mut Vec<String>, index: &mut BTreeMap<String, usize>| {
            *index.entry(path.to_string()).or_insert_with(|| {
                nodes.push(path.to_string());
                nodes.len() - 1
            })
        };
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for map in &maps {
            let from = intern(&map.path, &mut nodes, &mut index);
            for dep in &map.dependencies {
                if let Some(to_path) = resolve_dep(dep, &map.path, &file_set) {
                    let to = intern(&to_path, &mut nodes, &mut index);
                    if from != to {
                        edges.push((from, to));
                    }
                }
            }
        }

        // 1-hop BFS frontier from the seed set, both edge directions
        let seeds: BTreeSet<usize> = ctx
            .matched
            .iter()
            .filter_map(|p| index.get(p).copied())
            .collect();
        let visited: BTreeSet<usize> = seeds.clone();
        let mut frontier: BTreeSet<usize> = BTreeSet::new();
        for &(from, to) in &edges {
            if seeds.contains(&from) && !visited.contains(&to) {
                frontier.insert(to);
            }
            if seeds.contains(&to) && !visited.contains(&from) {
                frontier.insert(from);
            }
        }

        let mut neighbors: Vec<String> = frontier.into_iter().map(|i| nodes[i].clone()).collect();
        neighbors.sort();
        neighbors.truncate(ctx.knobs.max_items);

        for map in codemaps_for(ctx, &neighbors, StructureScope::Public) {
            if ctx.interrupted() {
                break;
            }
            out.matched.push(map.path.clone());
            out.candidates.push(codemap_candidate(
                ctx,
                "graph",
                &map,
                0.55,
                "import-graph neighbor of matched file",
                "import graph",
            ));
        }
        out
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn file_set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("src/auth/../utils/jwt"), "src/utils/jwt");
        assert_eq!(normalize_path("src/./a"), "src/a");
    }

    #[test]
    fn test_resolve_relative_ts() {
        let files = file_set(&["src/utils/jwt.ts", "src/auth/login.ts"]);
        assert_eq!(
            resolve_dep("../utils/jwt", "src/auth/login.ts", &files).as_deref(),
            Some("src/utils/jwt.ts")
        );
    }

    #[test]
    fn test_resolve_crate_path() {
        let files = file_set(&["src/auth/session.rs", "src/lib.rs"]);
        assert_eq!(
            resolve_dep("crate::auth::session", "src/main.rs", &files).as_deref(),
            Some("src/auth/session.rs")
        );
    }

    #[test]
    fn test_resolve_mod_decl() {
        let files = file_set(&["src/auth.rs", "src/main.rs"]);
        assert_eq!(
            resolve_dep("mod auth", "src/main.rs", &files).as_deref(),
            Some("src/auth.rs")
        );
    }

    #[test]
    fn test_resolve_python_dotted() {
        let files = file_set(&["app/models/user.py"]);
        assert_eq!(
            resolve_dep("app.models.user", "app/main.py", &files).as_deref(),
            Some("app/models/user.py")
        );
    }

    #[test]
    fn test_ambiguous_stem_unresolved() {
        let files = file_set(&["a/util.py", "b/util.py"]);
        assert_eq!(resolve_dep("util", "main.py", &files), None);
    }
}
