//! On-disk embedding index for the `semantic` strategy. The index is produced
//! by external tooling; the engine only reads it. Queries are hash-projected
//! into the index dimension so no model call happens at plan time.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

pub const INDEX_RELATIVE_PATH: &str = ".ivo/embeddings.json";

#[derive(Debug, Deserialize)]
pub struct EmbeddingIndex {
    pub dims: usize,
    /// Repo-relative path to unit-normalized vector.
    pub files: BTreeMap<String, Vec<f32>>,
}

impl EmbeddingIndex {
    pub fn exists(root: &Path) -> bool {
        root.join(INDEX_RELATIVE_PATH).is_file()
    }

    /// Loads and drops malformed rows (wrong dimension) rather than failing.
    pub fn load(root: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(root.join(INDEX_RELATIVE_PATH)).ok()?;
        let mut index: EmbeddingIndex = serde_json::from_str(&raw).ok()?;
        if index.dims == 0 {
            return None;
        }
        index.files.retain(|_, v| v.len() == index.dims);
        if index.files.is_empty() {
            None
        } else {
            Some(index)
        }
    }

    /// Deterministic pseudo-embedding for a keyword list: each term hashes to
    /// a signed unit contribution in one dimension.
    pub fn project_query(&self, terms: &[String]) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dims];
        for term in terms {
            let hash = xxh3_64(term.as_bytes());
            let dim = (hash % self.dims as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vec[dim] += sign;
        }
        normalize(&mut vec);
        vec
    }

    /// Mean of the vectors for `paths` that exist in the index.
    pub fn centroid(&self, paths: &[&str]) -> Option<Vec<f32>> {
        let mut acc = vec![0.0f32; self.dims];
        let mut count = 0usize;
        for path in paths {
            if let Some(v) = self.files.get(*path) {
                for (a, b) in acc.iter_mut().zip(v) {
                    *a += b;
                }
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        for a in &mut acc {
            *a /= count as f32;
        }
        normalize(&mut acc);
        Some(acc)
    }

    /// Paths ranked by cosine similarity to `query`, best first, skipping
    /// anything in `exclude`. Ties break by path so output is reproducible.
    pub fn nearest(&self, query: &[f32], exclude: &BTreeSet<String>, limit: usize) -> Vec<(String, f32)> {
        let mut scored: Vec<(String, f32)> = self
            .files
            .iter()
            .filter(|(path, _)| !exclude.contains(*path))
            .map(|(path, v)| (path.clone(), cosine(query, v)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(limit);
        scored
    }
}

fn normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vec {
            *x /= norm;
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    // index vectors are stored normalized; query is normalized at build
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
