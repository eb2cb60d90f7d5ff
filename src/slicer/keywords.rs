//! Keyword derivation: task text plus strategy hints to an ordered,
//! deduplicated keyword list. Rule-based, no ML.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

pub const MAX_KEYWORDS: usize = 20;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "in", "at", "of", "on", "to", "do", "be", "we", "it", "as", "by", "or",
    "and", "for", "with", "not", "are", "was", "were", "this", "that", "has", "have", "had",
    "will", "can", "should", "would", "when", "what", "how", "why", "who", "which", "from",
    "into", "about", "add", "fix", "make", "use", "all", "any", "its", "our", "your", "their",
    "them", "then", "than", "also", "but", "does", "did", "get", "set", "new", "old", "please",
];

lazy_static! {
    // identifier-shaped: snake_case, camelCase, kebab-case, dotted names
    static ref IDENTIFIER: Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_.-]*").unwrap();
}

/// Derive keywords from the task and optional hints. Lowercased, stopword
/// filtered, order-preserving dedup, capped at [`MAX_KEYWORDS`].
pub fn derive_keywords(task: &str, hints: &[String]) -> Vec<String> {
    let stopset: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    let mut push = |word: &str| {
        let lower = word.to_lowercase();
        let trimmed = lower.trim_matches(|c: char| c == '.' || c == '-' || c == '_');
        if trimmed.len() < 3 || stopset.contains(trimmed) {
            return;
        }
        if out.len() < MAX_KEYWORDS && seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    };

    for m in IDENTIFIER.find_iter(task) {
        push(m.as_str());
    }
    for hint in hints {
        for m in IDENTIFIER.find_iter(hint) {
            push(m.as_str());
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
