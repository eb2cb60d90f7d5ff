//! Candidate and sidecar model: the units strategies propose and the
//! selector admits or rejects.

use serde::{Deserialize, Serialize};

use crate::tokens::TokenEstimator;

// ── Representation ─────────────────────────────────────────────────────────────

/// How a candidate's bytes are rendered when materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Full,
    Snippet,
    Codemap,
    Reference,
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Snippet => write!(f, "snippet"),
            Self::Codemap => write!(f, "codemap"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

// ── Alternates ─────────────────────────────────────────────────────────────────

/// A cheaper rerepresentation the selector may fall back to. `content: None`
/// means the body is loaded on demand by the assembler (full files only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternate {
    pub representation: Representation,
    pub tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ── Candidate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceCandidate {
    /// Stable id, `"<strategy>:<path>"` by convention.
    pub id: String,
    /// Repo-relative path with `/` separators.
    pub path: String,
    pub strategy: String,
    pub representation: Representation,
    /// Token count of the currently chosen representation. Switching
    /// representation rewrites this field.
    pub tokens: u32,
    /// Base relevance in (0, 1], before strategy weighting.
    pub relevance: f32,
    pub reason: String,
    /// Free-form provenance label ("keyword search", "import graph", ...).
    pub source: String,
    /// Materialized body when the strategy already has it; None defers the
    /// read to the assembler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codemap: Option<String>,
    /// Search hit count feeding the coverage bonus; 0 for non-search candidates.
    pub match_count: u32,
    /// Per-strategy emission order, assigned by the planner. Tie-break key.
    pub emit_seq: u32,
    /// Cheaper fallbacks in preference order; always ends with `Reference`.
    pub alternates: Vec<Alternate>,
}

impl SliceCandidate {
    pub fn new(
        strategy: &str,
        path: impl Into<String>,
        representation: Representation,
        tokens: u32,
        relevance: f32,
        reason: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            id: format!("{strategy}:{path}"),
            path,
            strategy: strategy.to_string(),
            representation,
            tokens,
            relevance,
            reason: reason.into(),
            source: source.into(),
            content: None,
            codemap: None,
            match_count: 0,
            emit_seq: 0,
            alternates: Vec::new(),
        }
    }

    /// The bare reference line: path plus the one-line reason, reason capped
    /// so the line stays around 20 tokens.
    pub fn reference_line(&self) -> String {
        let mut reason = self.reason.as_str();
        if reason.len() > 60 {
            let mut cut = 60;
            while cut > 0 && !reason.is_char_boundary(cut) {
                cut -= 1;
            }
            reason = &reason[..cut];
        }
        format!("{}: {}", self.path, reason)
    }

    /// Guarantees the invariant that every candidate ends its alternate list
    /// with a `Reference` form.
    pub fn ensure_reference_alternate(&mut self, estimate: TokenEstimator) {
        if self
            .alternates
            .last()
            .is_some_and(|a| a.representation == Representation::Reference)
        {
            return;
        }
        let line = self.reference_line();
        self.alternates.push(Alternate {
            representation: Representation::Reference,
            tokens: estimate(&line),
            content: Some(line),
        });
    }

    /// Switch this candidate to the alternate at `idx`, rewriting `tokens`
    /// and the carried body.
    pub fn apply_alternate(&mut self, idx: usize) {
        let alt = self.alternates[idx].clone();
        self.representation = alt.representation;
        self.tokens = alt.tokens;
        match alt.representation {
            Representation::Codemap => {
                self.codemap = alt.content;
                self.content = None;
            }
            _ => {
                self.content = alt.content;
                self.codemap = None;
            }
        }
    }
}

// ── Sidecar ────────────────────────────────────────────────────────────────────

/// Non-candidate payload (e.g. the directory tree). Shares the budget and is
/// counted before any candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySidecar {
    pub name: String,
    pub content: String,
    pub tokens: u32,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::estimate;

    fn sample() -> SliceCandidate {
        SliceCandidate::new(
            "keyword",
            "src/auth/login.ts",
            Representation::Snippet,
            2800,
            0.9,
            "5 keyword hits",
            "keyword search",
        )
    }

    #[test]
    fn test_id_convention() {
        assert_eq!(sample().id, "keyword:src/auth/login.ts");
    }

    #[test]
    fn test_reference_alternate_appended_once() {
        let mut c = sample();
        c.ensure_reference_alternate(estimate);
        c.ensure_reference_alternate(estimate);
        assert_eq!(c.alternates.len(), 1);
        let alt = &c.alternates[0];
        assert_eq!(alt.representation, Representation::Reference);
        assert!(alt.tokens <= 20, "reference stays tiny, got {}", alt.tokens);
        assert!(alt.content.as_deref().unwrap().contains("src/auth/login.ts"));
    }

    #[test]
    fn test_apply_alternate_rewrites_tokens() {
        let mut c = sample();
        c.alternates.push(Alternate {
            representation: Representation::Codemap,
            tokens: 1200,
            content: Some("src/auth/login.ts (typescript)\n".to_string()),
        });
        c.ensure_reference_alternate(estimate);
        c.apply_alternate(0);
        assert_eq!(c.representation, Representation::Codemap);
        assert_eq!(c.tokens, 1200);
        assert!(c.codemap.is_some());
        assert!(c.content.is_none());
    }
}
